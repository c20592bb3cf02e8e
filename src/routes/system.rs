use actix_web::{HttpResponse, Result as ActixResult, web};
use tracing::warn;

use crate::models::ApiResponse;
use crate::models::system::HealthResponse;
use crate::state::AppState;

/// 存储不可用时返回 503，响应体仍带上诊断信息
pub async fn health(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let healthy = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check failed: {}", e);
            false
        }
    };

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage_backend: state.store.backend_name().to_string(),
        uptime_seconds: chrono::Utc::now()
            .signed_duration_since(state.start_time.start_datetime)
            .num_seconds(),
    };

    let mut builder = if healthy {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    Ok(builder.json(ApiResponse::success(response, "Health check")))
}

// 配置路由
pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1/system").route("/health", web::get().to(health)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::app_state;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_health_reports_backend() {
        let state = app_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_system_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/system/health")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], json!("ok"));
        assert_eq!(body["data"]["storage_backend"], json!("memory"));
    }
}
