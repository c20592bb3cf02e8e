use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::categories::{CategoryListResponse, CreateCategoryRequest};
use crate::models::courses::{
    CourseDetailResponse, CourseListResponse, CourseStudentsResponse,
    CreateCourseRequest, EnrollStudentRequest,
};
use crate::state::AppState;

pub async fn list_courses(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let response = CourseListResponse {
        teaching: state.courses.teacher_courses(&user.email).await?,
        enrolled: state.courses.student_courses(&user.email).await?,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Courses retrieved")))
}

pub async fn create_course(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let course = state
        .courses
        .add_course(body.nrc, &body.name, &user.email)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(course, "Course created")))
}

pub async fn get_course(
    req: HttpRequest,
    state: web::Data<AppState>,
    nrc: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let nrc = nrc.into_inner();
    let role = state.courses.require_member(nrc, &user.email).await?;
    let course = state.courses.get_course(nrc).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CourseDetailResponse { course, role },
        "Course retrieved",
    )))
}

pub async fn delete_course(
    req: HttpRequest,
    state: web::Data<AppState>,
    nrc: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let nrc = nrc.into_inner();
    state.courses.require_teacher(nrc, &user.email).await?;
    state.courses.delete_course(nrc).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Course deleted")))
}

pub async fn list_students(
    req: HttpRequest,
    state: web::Data<AppState>,
    nrc: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let nrc = nrc.into_inner();
    state.courses.require_member(nrc, &user.email).await?;
    let students = state.courses.course_students(nrc).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CourseStudentsResponse { nrc, students },
        "Students retrieved",
    )))
}

/// 教师可以加入任意学生；不写 email 时当前用户按 NRC 自助加入
pub async fn enroll_student(
    req: HttpRequest,
    state: web::Data<AppState>,
    nrc: web::Path<i64>,
    body: web::Json<EnrollStudentRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let nrc = nrc.into_inner();
    let email = body
        .into_inner()
        .email
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_else(|| user.email.clone());

    if email != user.email {
        state.courses.require_teacher(nrc, &user.email).await?;
    }
    let enrollment = state.courses.enroll_student(&email, nrc).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(enrollment, "Student enrolled")))
}

pub async fn remove_student(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(i64, String)>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let (nrc, email) = path.into_inner();
    if email != user.email {
        state.courses.require_teacher(nrc, &user.email).await?;
    }
    state.courses.remove_student(&email, nrc).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student removed")))
}

pub async fn list_categories(
    req: HttpRequest,
    state: web::Data<AppState>,
    nrc: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let nrc = nrc.into_inner();
    state.courses.require_member(nrc, &user.email).await?;
    let items = state.categories.course_categories(nrc).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CategoryListResponse { items },
        "Categories retrieved",
    )))
}

pub async fn create_category(
    req: HttpRequest,
    state: web::Data<AppState>,
    nrc: web::Path<i64>,
    body: web::Json<CreateCategoryRequest>,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    let nrc = nrc.into_inner();
    state.courses.require_teacher(nrc, &user.email).await?;

    let body = body.into_inner();
    let category = state
        .categories
        .add_category(&body.name, body.random, nrc, body.max)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(category, "Category created")))
}

// 配置路由
pub fn configure_courses_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_courses))
                    .route(web::post().to(create_course)),
            )
            .service(
                web::resource("/{nrc}")
                    .route(web::get().to(get_course))
                    .route(web::delete().to(delete_course)),
            )
            .service(
                web::resource("/{nrc}/students")
                    .route(web::get().to(list_students))
                    .route(web::post().to(enroll_student)),
            )
            .route("/{nrc}/students/{email}", web::delete().to(remove_student))
            .service(
                web::resource("/{nrc}/categories")
                    .route(web::get().to(list_categories))
                    .route(web::post().to(create_category)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{app_state, bearer, token_for};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_course_access_rules() {
        let state = app_state().await;
        let teacher = token_for(&state, "t@uni.edu").await;
        let student = token_for(&state, "a@uni.edu").await;
        let outsider = token_for(&state, "x@uni.edu").await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_courses_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/courses")
            .insert_header(bearer(&teacher))
            .set_json(json!({"nrc": 1001, "name": "Moviles"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        // 学生自助加入
        let req = test::TestRequest::post()
            .uri("/api/v1/courses/1001/students")
            .insert_header(bearer(&student))
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        // 学生不能替别人选课
        let req = test::TestRequest::post()
            .uri("/api/v1/courses/1001/students")
            .insert_header(bearer(&student))
            .set_json(json!({"email": "b@uni.edu"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/v1/courses/1001")
            .insert_header(bearer(&student))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["role"], json!("student"));

        let req = test::TestRequest::get()
            .uri("/api/v1/courses/1001/students")
            .insert_header(bearer(&outsider))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/v1/courses/1001/categories")
            .insert_header(bearer(&student))
            .set_json(json!({"name": "Proyecto", "max": 3}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/v1/courses/1001/categories")
            .insert_header(bearer(&teacher))
            .set_json(json!({"name": "Proyecto", "random": true, "max": 3}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/v1/courses")
            .insert_header(bearer(&student))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["enrolled"][0]["nrc"], json!(1001));

        let req = test::TestRequest::delete()
            .uri("/api/v1/courses/1001")
            .insert_header(bearer(&teacher))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/courses/1001")
            .insert_header(bearer(&teacher))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_malformed_body_is_rejected() {
        let state = app_state().await;
        let teacher = token_for(&state, "t@uni.edu").await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .app_data(
                    web::JsonConfig::default()
                        .error_handler(crate::utils::json_error_handler),
                )
                .configure(configure_courses_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/courses")
            .insert_header(bearer(&teacher))
            .set_json(json!({"nrc": "abc"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], json!(1000));
    }
}
