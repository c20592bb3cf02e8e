use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::errors::PeerEvalError;
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::auth::{
    LoginRequest, LoginResponse, RefreshTokenResponse, SignupRequest, TokenVerificationResponse,
    UserInfoResponse,
};
use crate::state::AppState;
use crate::utils::jwt::JwtUtils;

pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> ActixResult<HttpResponse> {
    let user = state.auth.signup(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        UserInfoResponse { user },
        "Signup successful",
    )))
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    let (user, tokens) = state.auth.login(body.into_inner()).await?;
    let jwt = state.auth.jwt();

    Ok(HttpResponse::Ok()
        .cookie(jwt.create_refresh_token_cookie(&tokens.refresh_token))
        .json(ApiResponse::success(
            LoginResponse {
                access_token: tokens.access_token,
                expires_in: jwt.access_expiry_secs(),
                user,
            },
            "Login successful",
        )))
}

pub async fn refresh_token(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let refresh_token = JwtUtils::extract_refresh_token_from_cookie(&req)
        .ok_or_else(|| PeerEvalError::authentication("Refresh token missing"))?;
    let access_token = state.auth.refresh(&refresh_token).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        RefreshTokenResponse {
            access_token,
            expires_in: state.auth.jwt().access_expiry_secs(),
        },
        "Token refreshed",
    )))
}

pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    if let Some(token) = RequireJWT::extract_token(&req) {
        state.auth.logout(&token).await?;
    }
    Ok(HttpResponse::Ok()
        .cookie(state.auth.jwt().create_empty_refresh_token_cookie())
        .json(ApiResponse::success_empty("Logout successful")))
}

pub async fn me(req: HttpRequest) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(&req)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserInfoResponse { user },
        "User information retrieved",
    )))
}

// 能到达这里说明中间件已校验通过
pub async fn verify_token() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TokenVerificationResponse { is_valid: true },
        "Token is valid",
    )))
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .route("/signup", web::post().to(signup))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh_token))
            .service(
                web::scope("")
                    .wrap(RequireJWT)
                    .route("/logout", web::post().to(logout))
                    .route("/verify-token", web::get().to(verify_token))
                    .route("/me", web::get().to(me)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{app_state, bearer};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_signup_login_me_logout() {
        let state = app_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_auth_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({"email": "Ana@Uni.edu", "password": "Secret123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({"email": "ana@uni.edu", "password": "Secret123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "ana@uni.edu", "password": "Secret123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().any(|c| c.name() == "refresh_token"));
        let body: Value = test::read_body_json(resp).await;
        let token = body["data"]["access_token"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["user"]["name"], json!("ana"));

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["user"]["email"], json!("ana@uni.edu"));

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        // 注销后的 token 不再可用
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_bad_credentials_and_missing_token() {
        let state = app_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_auth_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "nobody@uni.edu", "password": "Secret123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], json!("Email or password is incorrect"));

        let req = test::TestRequest::get()
            .uri("/api/v1/auth/verify-token")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
