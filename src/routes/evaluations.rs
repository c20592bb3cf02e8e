use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::{assessment_access, category_access};
use crate::errors::PeerEvalError;
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::courses::CourseRole;
use crate::models::evaluations::{
    CreateEvaluationRequest, EvaluationListResponse, EvaluationQuery, NewEvaluation,
};
use crate::state::AppState;

/// 必须按 assessment 或 category 限定范围；学生只能查到自己写的评分
pub async fn list_evaluations(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<EvaluationQuery>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let mut query = query.into_inner();

    let role = if let Some(assessment) = &query.assessment {
        assessment_access(&state, assessment, &user.email).await?.2
    } else if let Some(category) = &query.category {
        category_access(&state, category, &user.email).await?.1
    } else {
        return Err(
            PeerEvalError::validation("Either assessment or category is required").into(),
        );
    };
    if role == CourseRole::Student {
        query.evaluator = Some(user.email.clone());
    }

    let items = state.evaluations.evaluations(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        EvaluationListResponse { items },
        "Evaluations retrieved",
    )))
}

/// 单条评分，被评人必须是当前学生的队友
pub async fn create_evaluation(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let body = body.into_inner();
    let (assessment, _, role) = assessment_access(&state, &body.assessment, &user.email).await?;
    if role != CourseRole::Student {
        return Err(
            PeerEvalError::validation("Only students take part in peer evaluation").into(),
        );
    }

    let evaluation = state
        .evaluations
        .add_evaluation(NewEvaluation {
            assessment: assessment.id,
            evaluator: user.email,
            evaluated: body.evaluated,
            score: body.score,
        })
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(evaluation, "Evaluation saved")))
}

pub async fn get_evaluation(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let evaluation = state.evaluations.get_evaluation(&id).await?;
    let (_, role) = category_access(&state, &evaluation.category, &user.email).await?;
    if role == CourseRole::Student && evaluation.evaluator != user.email {
        return Err(PeerEvalError::authorization(
            "Students can only read their own evaluations",
        )
        .into());
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(evaluation, "Evaluation retrieved")))
}

pub async fn delete_evaluation(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let evaluation = state.evaluations.get_evaluation(&id).await?;
    let (category, _) = category_access(&state, &evaluation.category, &user.email).await?;
    state
        .courses
        .require_teacher(category.nrc, &user.email)
        .await?;
    state.evaluations.delete_evaluation(&evaluation.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Evaluation deleted")))
}

// 配置路由
pub fn configure_evaluations_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/evaluations")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_evaluations))
                    .route(web::post().to(create_evaluation)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_evaluation))
                    .route(web::delete().to(delete_evaluation)),
            ),
    );
}
