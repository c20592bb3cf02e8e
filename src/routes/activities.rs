use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::activity_access;
use crate::errors::PeerEvalError;
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::activities::{AssessmentListResponse, CreateAssessmentRequest};
use crate::models::courses::CourseRole;
use crate::models::evaluations::ActivityProgressResponse;
use crate::state::AppState;

pub async fn get_activity(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (activity, _, _) = activity_access(&state, &id, &user.email).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(activity, "Activity retrieved")))
}

pub async fn delete_activity(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (activity, category, _) = activity_access(&state, &id, &user.email).await?;
    state
        .courses
        .require_teacher(category.nrc, &user.email)
        .await?;
    state
        .activities
        .delete_activity(&activity.name, &activity.category)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Activity deleted")))
}

pub async fn list_assessments(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (activity, _, _) = activity_access(&state, &id, &user.email).await?;
    let items = state.activities.activity_assessments(&activity.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssessmentListResponse { items },
        "Assessments retrieved",
    )))
}

pub async fn create_assessment(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<CreateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (activity, category, _) = activity_access(&state, &id, &user.email).await?;
    state
        .courses
        .require_teacher(category.nrc, &user.email)
        .await?;

    let body = body.into_inner();
    let assessment = state
        .activities
        .add_assessment(
            &body.name,
            &activity.id,
            body.visibility
                .unwrap_or_else(|| state.activities.default_visibility()),
            body.max.unwrap_or_else(|| state.activities.default_max()),
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(assessment, "Assessment created")))
}

pub async fn initialize_assessments(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (activity, category, _) = activity_access(&state, &id, &user.email).await?;
    state
        .courses
        .require_teacher(category.nrc, &user.email)
        .await?;

    let items = state.activities.initialize_assessments(&activity.id).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        AssessmentListResponse { items },
        "Default assessments created",
    )))
}

/// 当前学生在活动各评估标准上的完成情况
pub async fn activity_progress(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (activity, _, role) = activity_access(&state, &id, &user.email).await?;
    if role != CourseRole::Student {
        return Err(PeerEvalError::validation("Only students have evaluation progress").into());
    }

    let items = state
        .evaluations
        .activity_progress(&activity.id, &user.email)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ActivityProgressResponse {
            activity: activity.id,
            items,
        },
        "Progress retrieved",
    )))
}

// 配置路由
pub fn configure_activities_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/activities/{id}")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(get_activity))
                    .route(web::delete().to(delete_activity)),
            )
            .service(
                web::resource("/assessments")
                    .route(web::get().to(list_assessments))
                    .route(web::post().to(create_assessment)),
            )
            .route(
                "/assessments/initialize",
                web::post().to(initialize_assessments),
            )
            .route("/progress", web::get().to(activity_progress)),
    );
}
