//! OAuth state tokens
//!
//! A state token ties an authorization redirect to the request that started
//! it. Tokens live in Redis for a bounded time and can be consumed once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::config::OAuthConfig;
use crate::services::redis::RedisService;
use crate::utils::errors::{Result, TripBuddyError};
use crate::utils::helpers::{generate_random_string, is_http_url};

pub const STATE_TOKEN_LENGTH: usize = 48;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    pub provider: String,
    pub redirect_uri: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct OAuthStateStore {
    redis: RedisService,
    config: OAuthConfig,
}

fn state_key(token: &str) -> String {
    format!("oauth_state:{}", token)
}

impl OAuthStateStore {
    pub fn new(redis: RedisService, config: OAuthConfig) -> Self {
        Self { redis, config }
    }

    /// Store a fresh state and return its token
    pub async fn issue(&self, provider: &str, redirect_uri: Option<String>) -> Result<String> {
        if provider.trim().is_empty() {
            return Err(TripBuddyError::invalid("provider must not be empty"));
        }
        if let Some(uri) = redirect_uri.as_deref() {
            if !is_http_url(uri) {
                return Err(TripBuddyError::invalid(format!("invalid redirect uri: {}", uri)));
            }
        }

        let token = generate_random_string(STATE_TOKEN_LENGTH);
        let state = OAuthState {
            provider: provider.to_string(),
            redirect_uri,
            created_at: Utc::now(),
        };

        self.redis
            .set(&state_key(&token), &state, Some(self.config.state_ttl_seconds))
            .await?;

        info!(provider = provider, ttl = self.config.state_ttl_seconds, "OAuth state issued");
        Ok(token)
    }

    /// Return the stored state and forget it; unknown or spent tokens yield `None`
    pub async fn consume(&self, token: &str) -> Result<Option<OAuthState>> {
        if token.len() != STATE_TOKEN_LENGTH || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            debug!("Malformed OAuth state token");
            return Ok(None);
        }

        self.redis.take(&state_key(token)).await
    }
}
