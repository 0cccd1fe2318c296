//! Redis-backed key-value store

use crate::{
    config::RedisConfig,
    error::AppError,
    store::{KeyValueStore, StoreError},
    Result,
};
use async_trait::async_trait;
use deadpool_redis::{Connection, Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    pub fn new(config: &RedisConfig) -> Result<Self> {
        info!("Initializing Redis pool (size {})", config.pool_size);

        let mut pool_config = PoolConfig::new(config.pool_size as usize);
        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);

        let mut redis_config = deadpool_redis::Config::from_url(config.url.as_str());
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| AppError::configuration(format!("Failed to create Redis pool: {}", e)))?;

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> std::result::Result<Connection, StoreError> {
        self.pool.get().await.map_err(|e| {
            error!("Failed to get Redis connection: {}", e);
            StoreError::unavailable(format!("connection pool error: {}", e))
        })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> std::result::Result<bool, StoreError> {
        let mut conn = self.get_connection().await?;
        let written: bool = conn.set_nx(key, value).await?;
        Ok(written)
    }

    async fn incr_by(&self, key: &str, delta: i64) -> std::result::Result<i64, StoreError> {
        let mut conn = self.get_connection().await?;
        conn.incr::<_, _, i64>(key, delta).await.map_err(|e| {
            if e.kind() == redis::ErrorKind::ResponseError && e.to_string().contains("not an integer") {
                StoreError::NotAnInteger {
                    key: key.to_string(),
                }
            } else {
                e.into()
            }
        })
    }

    async fn ping(&self) -> std::result::Result<(), StoreError> {
        let mut conn = self.get_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Cache key builders
pub struct CacheKeys;

impl CacheKeys {
    /// Balance record for one user. The `upv_` prefix is shared with existing data.
    pub fn user_balance(username: &str) -> String {
        format!("upv_{}", username)
    }
}
