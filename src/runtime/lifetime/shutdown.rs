use tokio::signal;
use tracing::{error, warn};

use crate::state::AppState;

pub async fn listen_for_shutdown() {
    // 等待 Ctrl+C 信号
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
}

/// 关闭表存储（注销远程会话或关闭连接池）
pub async fn close_resources(state: &AppState) {
    if let Err(e) = state.store.close().await {
        error!("Failed to close table store: {}", e);
    } else {
        warn!("Table store '{}' closed", state.store.backend_name());
    }
}
