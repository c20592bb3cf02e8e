use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use serde::Deserialize;

use super::{activity_access, category_access};
use crate::errors::PeerEvalError;
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::courses::CourseRole;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoresQuery {
    #[serde(default)]
    pub group: Option<i64>,
}

fn require_teacher_or_self(role: CourseRole, actor: &str, student: &str) -> Result<(), PeerEvalError> {
    if role == CourseRole::Student && actor != student {
        return Err(PeerEvalError::authorization(
            "Students can only read their own results",
        ));
    }
    Ok(())
}

pub async fn activity_average(
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
    let average = state.results.activity_average(&activity.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(average, "Activity average")))
}

/// 教师或该组成员可以查看组平均分；学生只看到公开评估标准的统计
pub async fn group_average(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, i64)>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (id, number) = path.into_inner();
    let (category, role) = category_access(&state, &id, &user.email).await?;
    if role == CourseRole::Student
        && state
            .categories
            .student_group(&category.id, &user.email)
            .await?
            != Some(number)
    {
        return Err(PeerEvalError::authorization(format!(
            "{} is not a member of group {number}",
            user.email
        ))
        .into());
    }
    let average = state
        .results
        .group_average(&category.id, number, role == CourseRole::Student)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(average, "Group average")))
}

pub async fn student_average(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (id, email) = path.into_inner();
    let (category, role) = category_access(&state, &id, &user.email).await?;
    require_teacher_or_self(role, &user.email, &email)?;
    let average = state
        .results
        .student_average(&email, &category.id, role == CourseRole::Student)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(average, "Student average")))
}

/// 学生查看自己时只包含公开的评估标准
pub async fn student_scores(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<ScoresQuery>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (id, email) = path.into_inner();
    let (category, role) = category_access(&state, &id, &user.email).await?;
    require_teacher_or_self(role, &user.email, &email)?;

    let scores = state
        .results
        .student_detailed_scores(
            &email,
            &category.id,
            query.group,
            role == CourseRole::Student,
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(scores, "Detailed scores")))
}

pub async fn category_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, _) = category_access(&state, &id, &user.email).await?;
    state
        .courses
        .require_teacher(category.nrc, &user.email)
        .await?;
    let report = state.results.category_report(&category.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, "Category report")))
}

// 配置路由
pub fn configure_results_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/results")
            .wrap(RequireJWT)
            .route("/activities/{id}/average", web::get().to(activity_average))
            .route(
                "/categories/{id}/groups/{number}/average",
                web::get().to(group_average),
            )
            .route(
                "/categories/{id}/students/{email}/average",
                web::get().to(student_average),
            )
            .route(
                "/categories/{id}/students/{email}/scores",
                web::get().to(student_scores),
            )
            .route("/categories/{id}/report", web::get().to(category_report)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activities::Visibility;
    use crate::models::evaluations::ScoreEntry;
    use crate::routes::test_support::{app_state, bearer, token_for};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_results_visibility() {
        let state = app_state().await;
        let teacher = token_for(&state, "t@uni.edu").await;
        let a = token_for(&state, "a@uni.edu").await;
        state.courses.add_course(1001, "Moviles", "t@uni.edu").await.unwrap();
        for email in ["a@uni.edu", "b@uni.edu"] {
            state.courses.enroll_student(email, 1001).await.unwrap();
        }
        state.categories.add_category("Proyecto", true, 1001, 2).await.unwrap();
        state.activities.add_activity("Sprint 1", "Proyecto-1001").await.unwrap();
        let activity = "Sprint 1-Proyecto-1001";
        state
            .activities
            .add_assessment("Actitud", activity, Visibility::Public, 5.0)
            .await
            .unwrap();
        state
            .activities
            .add_assessment("Compromiso", activity, Visibility::Private, 5.0)
            .await
            .unwrap();
        for (assessment, score) in [("Actitud", 4.0), ("Compromiso", 2.0)] {
            state
                .evaluations
                .submit_scores(
                    &format!("{assessment}-{activity}"),
                    "b@uni.edu",
                    &[ScoreEntry {
                        evaluated: "a@uni.edu".to_string(),
                        score,
                    }],
                )
                .await
                .unwrap();
        }

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_results_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/results/categories/Proyecto-1001/students/a@uni.edu/scores")
            .insert_header(bearer(&a))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body["data"],
            json!([{"criterion": "Actitud", "average": 4.0}])
        );

        let req = test::TestRequest::get()
            .uri("/api/v1/results/categories/Proyecto-1001/students/a@uni.edu/scores")
            .insert_header(bearer(&teacher))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri("/api/v1/results/categories/Proyecto-1001/students/b@uni.edu/average")
            .insert_header(bearer(&a))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/results/categories/Proyecto-1001/groups/1/average")
            .insert_header(bearer(&a))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["average"], json!(4.0));

        let req = test::TestRequest::get()
            .uri("/api/v1/results/categories/Proyecto-1001/students/a@uni.edu/average")
            .insert_header(bearer(&a))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["average"], json!(4.0));

        let req = test::TestRequest::get()
            .uri("/api/v1/results/categories/Proyecto-1001/students/a@uni.edu/average")
            .insert_header(bearer(&teacher))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["average"], json!(3.0));

        let req = test::TestRequest::get()
            .uri("/api/v1/results/categories/Proyecto-1001/report")
            .insert_header(bearer(&a))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/results/categories/Proyecto-1001/report")
            .insert_header(bearer(&teacher))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["overall_average"], json!(3.0));
        assert_eq!(body["data"]["groups"][0]["students"][0]["email"], json!("a@uni.edu"));
    }
}
