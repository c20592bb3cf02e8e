use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{ObjectCache, create_cache};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::state::AppState;
use crate::storage::{TableStore, create_table_store};

pub struct StartupContext {
    pub state: AppState,
}

/// 安装 rustls 的 ring 加密后端，已安装时忽略
fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

async fn create_store(config: &AppConfig) -> Result<Arc<dyn TableStore>> {
    warn!(
        "Attempting to create {} table store backend",
        config.storage.backend
    );
    let store = create_table_store(config).await?;
    warn!("Table store backend '{}' initialized", store.backend_name());
    Ok(store)
}

async fn create_object_cache(config: &AppConfig) -> Result<Arc<dyn ObjectCache>> {
    let cache = create_cache(&config.cache).await?;
    warn!("Cache backend initialized");
    Ok(cache)
}

/// 准备服务器启动的上下文：表存储、缓存与共享状态
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    install_crypto_provider();

    let store = create_store(config).await?;
    let cache = create_object_cache(config).await?;

    if config.storage.backend == "memory" {
        warn!("Memory backend in use: all data is lost on restart");
    }

    Ok(StartupContext {
        state: AppState::new(config, store, cache),
    })
}
