//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::config::{AppConfig, Config, RedditConfig, RedisConfig, WidgetConfig};
use shared::{
    AppError, CommunityInfo, CommunityStyles, CurrentUser, KeyValueStore, MemoryStore,
    StoreError, Username,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

use upv_widget::services::platform::{
    CommunityDirectory, IdentityProvider, ModeratorDirectory, PlatformConnector,
    PlatformContext, PostPublisher, PostRef, SubmitPost,
};

pub fn test_config() -> Config {
    Config {
        redis: RedisConfig {
            url: "redis://127.0.0.1:6379".into(),
            pool_size: 1,
            connection_timeout_seconds: 1,
        },
        reddit: RedditConfig {
            api_base_url: "http://127.0.0.1:1".into(),
            oauth_base_url: "http://127.0.0.1:1".into(),
            api_name: None,
            user_agent: "upv-widget-tests".into(),
            timeout_seconds: 2,
        },
        widget: WidgetConfig::default(),
        app: AppConfig {
            environment: "test".into(),
            log_level: "debug".into(),
            port: 0,
            request_timeout_seconds: 10,
        },
    }
}

pub fn community(name: &str, subscribers: u64, active: Option<u64>) -> CommunityInfo {
    CommunityInfo {
        id: Some(format!("t5_{}", name.to_lowercase())),
        name: name.to_string(),
        subscribers_count: subscribers,
        active_count: active,
    }
}

/// Configurable fake of the Reddit-facing collaborators.
#[derive(Default)]
pub struct FakeReddit {
    pub user: Option<String>,
    pub communities: HashMap<String, CommunityInfo>,
    /// Primary color per community id.
    pub colors: HashMap<String, String>,
    /// Community ids whose styles lookup fails.
    pub failing_styles: Vec<String>,
    /// (community, moderator) pairs.
    pub moderators: Vec<(String, String)>,
    pub submitted: Mutex<Vec<SubmitPost>>,
    /// Community name whose info lookup waits for `release`.
    pub gated: Option<String>,
    pub release: Notify,
}

impl FakeReddit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: &str) -> Self {
        self.user = Some(username.to_string());
        self
    }

    pub fn with_community(mut self, info: CommunityInfo, color: Option<&str>) -> Self {
        if let (Some(id), Some(color)) = (&info.id, color) {
            self.colors.insert(id.clone(), color.to_string());
        }
        self.communities.insert(info.name.to_lowercase(), info);
        self
    }

    pub fn with_failing_styles(mut self, community_id: &str) -> Self {
        self.failing_styles.push(community_id.to_string());
        self
    }

    pub fn with_moderator(mut self, community: &str, username: &str) -> Self {
        self.moderators.push((community.to_string(), username.to_string()));
        self
    }

    pub fn with_gate(mut self, community: &str) -> Self {
        self.gated = Some(community.to_lowercase());
        self
    }
}

#[async_trait]
impl IdentityProvider for FakeReddit {
    async fn current_user(&self) -> shared::Result<Option<CurrentUser>> {
        match &self.user {
            Some(name) => Ok(Some(CurrentUser {
                username: Username::parse(name)?,
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CommunityDirectory for FakeReddit {
    async fn community_info_by_name(&self, name: &str) -> shared::Result<CommunityInfo> {
        let key = name.to_lowercase();
        if self.gated.as_deref() == Some(key.as_str()) {
            self.release.notified().await;
        }
        self.communities
            .get(&key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("r/{}", name)))
    }

    async fn community_styles(&self, community_id: &str) -> shared::Result<CommunityStyles> {
        if self.failing_styles.iter().any(|id| id == community_id) {
            return Err(AppError::service_unavailable("reddit"));
        }
        Ok(CommunityStyles {
            primary_color: self.colors.get(community_id).cloned(),
        })
    }
}

#[async_trait]
impl ModeratorDirectory for FakeReddit {
    async fn is_moderator(&self, community: &str, username: &str) -> shared::Result<bool> {
        Ok(self
            .moderators
            .iter()
            .any(|(c, u)| c.eq_ignore_ascii_case(community) && u.eq_ignore_ascii_case(username)))
    }
}

#[async_trait]
impl PostPublisher for FakeReddit {
    async fn submit_post(&self, post: SubmitPost) -> shared::Result<PostRef> {
        let mut submitted = self.submitted.lock();
        submitted.push(post);
        Ok(PostRef {
            id: format!("post{}", submitted.len()),
            url: None,
        })
    }
}

struct Anonymous;

#[async_trait]
impl IdentityProvider for Anonymous {
    async fn current_user(&self) -> shared::Result<Option<CurrentUser>> {
        Ok(None)
    }
}

/// Hands out the fake; callers without a token are anonymous.
pub struct FakeConnector(pub Arc<FakeReddit>);

impl PlatformConnector for FakeConnector {
    fn connect(&self, access_token: Option<&str>) -> PlatformContext {
        let identity: Arc<dyn IdentityProvider> = match access_token {
            Some(_) => self.0.clone(),
            None => Arc::new(Anonymous),
        };
        PlatformContext {
            identity,
            directory: self.0.clone(),
            moderators: self.0.clone(),
            posts: self.0.clone(),
        }
    }
}

/// Memory store that records every key it is asked about.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub touched: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn keys(&self) -> Vec<String> {
        self.touched.lock().clone()
    }

    fn record(&self, key: &str) {
        self.touched.lock().push(key.to_string());
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.record(key);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.record(key);
        self.inner.set(key, value).await
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        self.record(key);
        self.inner.set_if_absent(key, value).await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.record(key);
        self.inner.incr_by(key, delta).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// Store whose every call fails as if Redis were down.
pub struct DownStore;

#[async_trait]
impl KeyValueStore for DownStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn set_if_absent(&self, _key: &str, _value: &str) -> Result<bool, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn incr_by(&self, _key: &str, _delta: i64) -> Result<i64, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }
}
