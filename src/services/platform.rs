//! Host platform collaborators.
//!
//! The widget never talks to the host directly; it goes through these traits.
//! `RedditClient` is the production implementation, tests plug in fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{CommunityInfo, CommunityStyles, CurrentUser, Result, Toast};
use std::sync::Arc;

use crate::domains::widget::view::ViewNode;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, `None` for logged-out visitors.
    async fn current_user(&self) -> Result<Option<CurrentUser>>;
}

#[async_trait]
pub trait CommunityDirectory: Send + Sync {
    async fn community_info_by_name(&self, name: &str) -> Result<CommunityInfo>;

    /// Visual style keyed by the community's internal identifier.
    async fn community_styles(&self, community_id: &str) -> Result<CommunityStyles>;
}

#[async_trait]
pub trait ModeratorDirectory: Send + Sync {
    async fn is_moderator(&self, community: &str, username: &str) -> Result<bool>;
}

#[async_trait]
pub trait PostPublisher: Send + Sync {
    async fn submit_post(&self, post: SubmitPost) -> Result<PostRef>;
}

/// Single tunable read by the ledger initializer.
pub trait SettingsProvider: Send + Sync {
    fn default_balance(&self) -> i64;
}

impl SettingsProvider for shared::config::WidgetConfig {
    fn default_balance(&self) -> i64 {
        self.default_balance
    }
}

pub trait Notifier: Send + Sync {
    fn show_toast(&self, toast: Toast);
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitPost {
    pub title: String,
    pub community: String,
    /// Shown by the host while the post loads.
    pub preview: ViewNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    pub id: String,
    pub url: Option<String>,
}

/// Collaborators bound to one caller.
#[derive(Clone)]
pub struct PlatformContext {
    pub identity: Arc<dyn IdentityProvider>,
    pub directory: Arc<dyn CommunityDirectory>,
    pub moderators: Arc<dyn ModeratorDirectory>,
    pub posts: Arc<dyn PostPublisher>,
}

/// Builds a `PlatformContext` for the caller's access token (if any).
pub trait PlatformConnector: Send + Sync {
    fn connect(&self, access_token: Option<&str>) -> PlatformContext;
}
