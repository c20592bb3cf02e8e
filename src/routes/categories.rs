use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::category_access;
use crate::errors::{PeerEvalError, Result};
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::activities::{ActivityListResponse, CreateActivityRequest};
use crate::models::categories::{
    AddMemberRequest, Category, GroupListResponse, ManualGroupRequest, MoveMemberRequest,
    StudentGroupResponse, TeammatesResponse,
};
use crate::models::courses::CourseRole;
use crate::state::AppState;

/// 学生只能调整自己，且随机分组的方案由教师管理
fn check_membership_change(
    category: &Category,
    role: CourseRole,
    actor: &str,
    student: &str,
) -> Result<()> {
    match role {
        CourseRole::Teacher => Ok(()),
        CourseRole::Student if student != actor => Err(PeerEvalError::authorization(
            "Students can only change their own group membership",
        )),
        CourseRole::Student if category.random => Err(PeerEvalError::authorization(format!(
            "Groups of {} are assigned by the teacher",
            category.id
        ))),
        CourseRole::Student => Ok(()),
    }
}

fn require_teacher_role(role: CourseRole) -> Result<()> {
    match role {
        CourseRole::Teacher => Ok(()),
        CourseRole::Student => Err(PeerEvalError::authorization(
            "Only the course teacher can do this",
        )),
    }
}

pub async fn get_category(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, _) = category_access(&state, &id, &user.email).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(category, "Category retrieved")))
}

pub async fn delete_category(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, role) = category_access(&state, &id, &user.email).await?;
    require_teacher_role(role)?;
    state.categories.delete_category(&category.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Category deleted")))
}

pub async fn list_groups(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, _) = category_access(&state, &id, &user.email).await?;
    let groups = state.categories.category_groups(&category.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        GroupListResponse {
            category: category.id,
            groups,
        },
        "Groups retrieved",
    )))
}

pub async fn create_manual_group(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<ManualGroupRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, role) = category_access(&state, &id, &user.email).await?;
    require_teacher_role(role)?;
    let group = state
        .categories
        .create_manual_group(&category.id, body.number, &body.students)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(group, "Group created")))
}

pub async fn add_member(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<AddMemberRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, role) = category_access(&state, &id, &user.email).await?;
    let body = body.into_inner();
    let student = body.student.unwrap_or_else(|| user.email.clone());
    check_membership_change(&category, role, &user.email, &student)?;

    let membership = state
        .categories
        .add_member(body.number, &category.id, &student)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(membership, "Joined group")))
}

pub async fn remove_member(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, i64, String)>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (id, number, student) = path.into_inner();
    let (category, role) = category_access(&state, &id, &user.email).await?;
    check_membership_change(&category, role, &user.email, &student)?;

    state
        .categories
        .remove_member(number, &category.id, &student)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Left group")))
}

pub async fn move_member(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<MoveMemberRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, role) = category_access(&state, &id, &user.email).await?;
    let body = body.into_inner();
    let student = body.student.unwrap_or_else(|| user.email.clone());
    check_membership_change(&category, role, &user.email, &student)?;

    let membership = state
        .categories
        .move_member(&student, &category.id, body.from, body.to)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(membership, "Group changed")))
}

pub async fn my_group(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, _) = category_access(&state, &id, &user.email).await?;
    let number = state
        .categories
        .student_group(&category.id, &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentGroupResponse {
            category: category.id,
            student: user.email,
            number,
        },
        "Group retrieved",
    )))
}

pub async fn my_teammates(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, _) = category_access(&state, &id, &user.email).await?;
    let number = state
        .categories
        .student_group(&category.id, &user.email)
        .await?
        .ok_or_else(|| {
            PeerEvalError::not_found(format!(
                "Student {} does not exist in any group of {}",
                user.email, category.id
            ))
        })?;
    let teammates = state
        .categories
        .teammates(&category.id, number, &user.email)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TeammatesResponse { number, teammates },
        "Teammates retrieved",
    )))
}

pub async fn list_activities(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, _) = category_access(&state, &id, &user.email).await?;
    let items = state.activities.category_activities(&category.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ActivityListResponse { items },
        "Activities retrieved",
    )))
}

pub async fn create_activity(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<CreateActivityRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (category, role) = category_access(&state, &id, &user.email).await?;
    require_teacher_role(role)?;

    let activity = state
        .activities
        .add_activity(&body.name, &category.id)
        .await?;
    if body.with_default_assessments {
        state.activities.initialize_assessments(&activity.id).await?;
    }
    Ok(HttpResponse::Created().json(ApiResponse::success(activity, "Activity created")))
}

// 配置路由
pub fn configure_categories_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/categories/{id}")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(get_category))
                    .route(web::delete().to(delete_category)),
            )
            .service(
                web::resource("/groups")
                    .route(web::get().to(list_groups))
                    .route(web::post().to(create_manual_group)),
            )
            .route("/groups/members", web::post().to(add_member))
            .route("/groups/move", web::post().to(move_member))
            .route(
                "/groups/{number}/members/{student}",
                web::delete().to(remove_member),
            )
            .route("/my-group", web::get().to(my_group))
            .route("/teammates", web::get().to(my_teammates))
            .service(
                web::resource("/activities")
                    .route(web::get().to(list_activities))
                    .route(web::post().to(create_activity)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{app_state, bearer, token_for};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    async fn seed(state: &AppState, random: bool) {
        state
            .courses
            .add_course(1001, "Moviles", "t@uni.edu")
            .await
            .unwrap();
        for student in ["a@uni.edu", "b@uni.edu"] {
            state.courses.enroll_student(student, 1001).await.unwrap();
        }
        state
            .categories
            .add_category("Proyecto", random, 1001, 2)
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn test_students_manage_their_own_membership() {
        let state = app_state().await;
        let teacher = token_for(&state, "t@uni.edu").await;
        let student = token_for(&state, "a@uni.edu").await;
        seed(&state, false).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_categories_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/categories/Proyecto-1001/groups/members")
            .insert_header(bearer(&student))
            .set_json(json!({"number": 1}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/v1/categories/Proyecto-1001/groups/members")
            .insert_header(bearer(&student))
            .set_json(json!({"number": 1, "student": "b@uni.edu"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/v1/categories/Proyecto-1001/groups/members")
            .insert_header(bearer(&teacher))
            .set_json(json!({"number": 1, "student": "b@uni.edu"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/v1/categories/Proyecto-1001/teammates")
            .insert_header(bearer(&student))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["teammates"], json!(["b@uni.edu"]));

        let req = test::TestRequest::post()
            .uri("/api/v1/categories/Proyecto-1001/groups/move")
            .insert_header(bearer(&student))
            .set_json(json!({"from": 1, "to": 2}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/categories/Proyecto-1001/groups")
            .insert_header(bearer(&teacher))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["groups"][0]["members"], json!(["b@uni.edu"]));
        assert_eq!(body["data"]["groups"][1]["number"], json!(2));

        let req = test::TestRequest::delete()
            .uri("/api/v1/categories/Proyecto-1001/groups/2/members/a@uni.edu")
            .insert_header(bearer(&student))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/categories/Proyecto-1001/my-group")
            .insert_header(bearer(&student))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["number"], Value::Null);
    }

    #[actix_web::test]
    async fn test_random_category_is_teacher_managed() {
        let state = app_state().await;
        let teacher = token_for(&state, "t@uni.edu").await;
        let student = token_for(&state, "a@uni.edu").await;
        seed(&state, true).await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_categories_routes),
        )
        .await;

        let number = state
            .categories
            .student_group("Proyecto-1001", "a@uni.edu")
            .await
            .unwrap()
            .unwrap();
        let req = test::TestRequest::delete()
            .uri(&format!(
                "/api/v1/categories/Proyecto-1001/groups/{number}/members/a@uni.edu"
            ))
            .insert_header(bearer(&student))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/v1/categories/Proyecto-1001/activities")
            .insert_header(bearer(&teacher))
            .set_json(json!({"name": "Sprint 1", "with_default_assessments": true}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/v1/categories/Proyecto-1001/activities")
            .insert_header(bearer(&student))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["items"][0]["has_assessment"], json!(true));

        let req = test::TestRequest::delete()
            .uri("/api/v1/categories/Proyecto-1001")
            .insert_header(bearer(&student))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
