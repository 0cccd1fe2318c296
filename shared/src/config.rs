//! Configuration management for the widget service

use serde::{Deserialize, Serialize};
use std::env;

use crate::{error::AppError, utils::validation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub redis: RedisConfig,
    pub reddit: RedditConfig,
    pub widget: WidgetConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub pool_size: u32,
    pub connection_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    pub api_base_url: String,
    pub oauth_base_url: String,
    /// Registered app name, sent in the user agent.
    pub api_name: Option<String>,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Starting `$UPV` balance written when a user is first initialized.
    pub default_balance: i64,
    pub session_ttl_seconds: u64,
    pub max_sessions: usize,
    pub initialize_on_first_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub log_level: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            default_balance: 100,
            session_ttl_seconds: 1800,
            max_sessions: 10_000,
            initialize_on_first_read: true,
        }
    }
}

impl RedditConfig {
    /// User agent with the registered app name when one is configured.
    pub fn effective_user_agent(&self) -> String {
        match &self.api_name {
            Some(name) if !name.is_empty() => format!("{} ({})", self.user_agent, name),
            _ => self.user_agent.clone(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let default_balance: i64 = env::var("DEFAULT_UPVOTES")
            .unwrap_or_else(|_| "100".to_string())
            .parse()?;
        let default_balance = validation::validate_default_balance(default_balance)
            .map_err(|e| AppError::configuration(format!("DEFAULT_UPVOTES: {}", e)))?;

        Ok(Config {
            redis: RedisConfig {
                url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
                pool_size: env::var("REDIS_POOL_SIZE")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                connection_timeout_seconds: env::var("REDIS_CONNECTION_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
            },
            reddit: RedditConfig {
                api_base_url: env::var("REDDIT_API_BASE_URL")
                    .unwrap_or_else(|_| "https://www.reddit.com".to_string()),
                oauth_base_url: env::var("REDDIT_OAUTH_BASE_URL")
                    .unwrap_or_else(|_| "https://oauth.reddit.com".to_string()),
                api_name: env::var("REDDIT_API_NAME").ok().filter(|v| !v.is_empty()),
                user_agent: env::var("REDDIT_USER_AGENT")
                    .unwrap_or_else(|_| "upv-widget/0.1".to_string()),
                timeout_seconds: env::var("REDDIT_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()?,
            },
            widget: WidgetConfig {
                default_balance,
                session_ttl_seconds: env::var("WIDGET_SESSION_TTL_SECONDS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse()?,
                max_sessions: env::var("WIDGET_MAX_SESSIONS")
                    .unwrap_or_else(|_| "10000".to_string())
                    .parse()?,
                initialize_on_first_read: env::var("WIDGET_INITIALIZE_ON_FIRST_READ")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
            },
            app: AppConfig {
                environment: env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "info".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
                request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }
}
