use shared::{Config, KeyValueStore, RedisStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::domains::ledger::BalanceLedger;
use crate::domains::widget::{SessionRegistry, WidgetServices};
use crate::services::{PlatformConnector, RedditClient};

/// Shared application state.
/// Holds the balance store, the Reddit connector and the mounted widget sessions.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn KeyValueStore>,
    pub widget_services: WidgetServices,
    pub sessions: SessionRegistry,
    pub platform: Arc<dyn PlatformConnector>,
}

impl AppState {
    /// Production wiring: Redis-backed ledger and the Reddit HTTP client.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = RedisStore::new(&config.redis)?;
        store.ping().await?;
        info!("✅ Redis connection established");

        let reddit = RedditClient::new(&config.reddit)?;
        info!(api = %config.reddit.api_base_url, "✅ Reddit client configured");

        Ok(Self::with_collaborators(config, Arc::new(store), Arc::new(reddit)))
    }

    /// Wiring with caller-supplied collaborators. Must run inside a tokio runtime.
    pub fn with_collaborators(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        platform: Arc<dyn PlatformConnector>,
    ) -> Self {
        let widget_services = WidgetServices {
            ledger: BalanceLedger::new(store.clone()),
            settings: Arc::new(config.widget.clone()),
            initialize_on_first_read: config.widget.initialize_on_first_read,
        };
        let sessions = SessionRegistry::new(
            Duration::from_secs(config.widget.session_ttl_seconds),
            config.widget.max_sessions,
        );

        Self {
            config: Arc::new(config),
            store,
            widget_services,
            sessions,
            platform,
        }
    }
}
