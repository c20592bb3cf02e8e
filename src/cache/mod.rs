//! 对象缓存
//!
//! 仅用于认证：token 吊销标记与按 token 缓存的用户信息。表记录从不缓存。

pub mod object_cache;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::config::CacheConfig;
use crate::errors::{PeerEvalError, Result};
use object_cache::{moka::MokaCacheWrapper, redis::RedisObjectCache};

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// 后端出错或值无法解析
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// ttl 为 0 时使用默认 TTL
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
}

impl dyn ObjectCache {
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<T> {
        match self.get_raw(key).await {
            CacheResult::Found(raw) => match serde_json::from_str(&raw) {
                Ok(value) => CacheResult::Found(value),
                Err(e) => {
                    warn!("Failed to decode cached value for {}: {}", key, e);
                    CacheResult::ExistsButNoValue
                }
            },
            CacheResult::NotFound => CacheResult::NotFound,
            CacheResult::ExistsButNoValue => CacheResult::ExistsButNoValue,
        }
    }

    pub async fn insert<T: Serialize + Sync>(&self, key: String, value: &T, ttl: u64) {
        match serde_json::to_string(value) {
            Ok(raw) => self.insert_raw(key, raw, ttl).await,
            Err(e) => warn!("Failed to encode cache value for {}: {}", key, e),
        }
    }
}

/// 根据配置创建缓存；redis 不可用时回退到 moka
pub async fn create_cache(config: &CacheConfig) -> Result<Arc<dyn ObjectCache>> {
    let cache_type = config.cache_type.as_str();
    warn!("Attempting to create {} cache backend", cache_type);

    match cache_type {
        "moka" => Ok(Arc::new(MokaCacheWrapper::new(config))),
        "redis" => match RedisObjectCache::new(config).await {
            Ok(cache) => {
                warn!("Successfully created redis cache backend");
                Ok(Arc::new(cache))
            }
            Err(e) => {
                warn!("Failed to create redis cache: {}", e);
                warn!("Falling back to memory cache");
                Ok(Arc::new(MokaCacheWrapper::new(config)))
            }
        },
        other => Err(PeerEvalError::cache_backend_not_found(format!(
            "Unknown cache backend '{other}'. Supported: moka, redis"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_typed_round_trip_through_moka() {
        let cache = create_cache(&CacheConfig::default()).await.unwrap();

        cache.insert("k".to_string(), &vec![1, 2, 3], 0).await;
        assert_eq!(cache.get::<Vec<i32>>("k").await, CacheResult::Found(vec![1, 2, 3]));
        assert_eq!(
            cache.get::<String>("k").await,
            CacheResult::ExistsButNoValue
        );

        cache.remove("k").await;
        assert_eq!(cache.get::<Vec<i32>>("k").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back() {
        let mut config = CacheConfig::default();
        config.cache_type = "redis".to_string();
        config.redis.url = "redis://127.0.0.1:1/".to_string();

        let cache = create_cache(&config).await.unwrap();
        cache.insert_raw("a".to_string(), "1".to_string(), 0).await;
        assert_eq!(cache.get_raw("a").await, CacheResult::Found("1".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_cache_type() {
        let mut config = CacheConfig::default();
        config.cache_type = "memcached".to_string();
        let err = create_cache(&config).await.err().unwrap();
        assert_eq!(err.code(), "E002");
    }
}
