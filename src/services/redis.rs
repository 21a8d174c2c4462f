//! Redis integration service implementation
//!
//! Thin key/value layer over a multiplexed connection. Every key is namespaced
//! with the configured prefix and values are stored as JSON.

use redis::{Client, AsyncCommands, RedisResult};
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};
use crate::config::RedisConfig;
use crate::utils::errors::Result;

/// Redis service for ephemeral state
#[derive(Clone, Debug)]
pub struct RedisService {
    client: Client,
    config: RedisConfig,
}

impl RedisService {
    /// Create a new RedisService instance
    pub fn new(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        Ok(Self { client, config })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    pub fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    /// Set a value with TTL (the configured default when `None`)
    pub async fn set<T>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) -> Result<()>
    where
        T: Serialize,
    {
        let mut conn = self.get_connection().await?;
        let serialized = serde_json::to_string(value)?;

        let full_key = self.full_key(key);
        let ttl = ttl_seconds.unwrap_or(self.config.ttl_seconds);

        let _: () = conn.set_ex(&full_key, serialized, ttl).await?;

        debug!(key = %full_key, ttl = ttl, "Value set in Redis");
        Ok(())
    }

    /// Read and delete a key in one round trip; at most one caller sees the value
    pub async fn take<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.get_connection().await?;
        let full_key = self.full_key(key);

        let (value, deleted): (Option<String>, i64) = redis::pipe()
            .atomic()
            .get(&full_key)
            .del(&full_key)
            .query_async(&mut conn)
            .await?;

        debug!(key = %full_key, found = value.is_some(), deleted = deleted, "Key taken from Redis");
        match value {
            Some(data) => Ok(Some(serde_json::from_str::<T>(&data)?)),
            None => Ok(None),
        }
    }

    /// Health check for Redis connection
    pub async fn health_check(&self) -> Result<bool> {
        match self.get_connection().await {
            Ok(mut conn) => {
                let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
                match result {
                    Ok(response) => Ok(response == "PONG"),
                    Err(e) => {
                        warn!(error = %e, "Redis health check failed");
                        Ok(false)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Redis connection failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_keys_carry_prefix() {
        let service = RedisService::new(Settings::default().redis).unwrap();
        assert_eq!(service.full_key("oauth_state:abc"), "tripbuddy:oauth_state:abc");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let mut config = Settings::default().redis;
        config.url = "not a url".to_string();
        assert!(RedisService::new(config).is_err());
    }
}
