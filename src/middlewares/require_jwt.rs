/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>`，成功后把当前用户和 access token
 * 放入请求扩展，失败返回 401。
 *
 * ```rust,ignore
 * web::scope("/api/v1/courses")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_courses))
 *
 * async fn list_courses(req: HttpRequest) -> ActixResult<HttpResponse> {
 *     let user = RequireJWT::current_user(&req)?;
 *     ...
 * }
 * ```
 */

use std::rc::Rc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, error, info};

use super::create_error_response;
use crate::errors::PeerEvalError;
use crate::models::ErrorCode;
use crate::models::auth::User;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

/// 请求扩展中保存的原始 access token，注销时使用
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

#[derive(Clone)]
pub struct RequireJWT;

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                error!("AppState not found in app data");
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Server state unavailable",
                    )
                    .map_into_right_body(),
                ));
            };

            let Some(token) = bearer_token(&req) else {
                info!("Missing bearer token for {}", req.path());
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Unauthorized: Missing or invalid Authorization header",
                    )
                    .map_into_right_body(),
                ));
            };

            match state.auth.authenticate(&token).await {
                Ok(user) => {
                    debug!("JWT authentication successful for {}", user.email);
                    req.extensions_mut().insert(user);
                    req.extensions_mut().insert(AccessToken(token));
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err.message()
                    );
                    let (status, code) = if err.is_client_error() {
                        (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized)
                    } else {
                        err.status_and_code()
                    };
                    Ok(req.into_response(
                        create_error_response(
                            status,
                            code,
                            &format!("Unauthorized: {}", err.message()),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 从请求扩展中取出当前用户
    pub fn extract_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_token(req: &HttpRequest) -> Option<String> {
        req.extensions().get::<AccessToken>().map(|t| t.0.clone())
    }

    /// 处理函数中使用；没有经过中间件时返回认证错误
    pub fn current_user(req: &HttpRequest) -> Result<User, PeerEvalError> {
        Self::extract_user(req)
            .ok_or_else(|| PeerEvalError::authentication("Authentication required"))
    }
}
