use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::assessment_access;
use crate::errors::{PeerEvalError, Result};
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::courses::CourseRole;
use crate::models::evaluations::SubmitScoresRequest;
use crate::state::AppState;

// 教师不参与评分；私有评估标准同样可以评分，只是结果不对学生公开
fn require_student(role: CourseRole) -> Result<()> {
    match role {
        CourseRole::Teacher => Err(PeerEvalError::validation(
            "Only students take part in peer evaluation",
        )),
        CourseRole::Student => Ok(()),
    }
}

pub async fn get_assessment(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (assessment, _, _) = assessment_access(&state, &id, &user.email).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(assessment, "Assessment retrieved")))
}

pub async fn delete_assessment(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (assessment, category, _) = assessment_access(&state, &id, &user.email).await?;
    state
        .courses
        .require_teacher(category.nrc, &user.email)
        .await?;
    state.activities.delete_assessment(&assessment.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Assessment deleted")))
}

pub async fn get_progress(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (assessment, _, role) = assessment_access(&state, &id, &user.email).await?;
    require_student(role)?;

    let progress = state
        .evaluations
        .evaluation_progress(&assessment.id, &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(progress, "Progress retrieved")))
}

/// 当前学生一次提交对全部待评队友的评分
pub async fn submit_scores(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<SubmitScoresRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (assessment, _, role) = assessment_access(&state, &id, &user.email).await?;
    require_student(role)?;

    let progress = state
        .evaluations
        .submit_scores(&assessment.id, &user.email, &body.scores)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(progress, "Scores submitted")))
}

// 配置路由
pub fn configure_assessments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assessments/{id}")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(get_assessment))
                    .route(web::delete().to(delete_assessment)),
            )
            .route("/progress", web::get().to(get_progress))
            .route("/scores", web::post().to(submit_scores)),
    );
}
