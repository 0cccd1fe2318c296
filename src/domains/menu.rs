//! Host-visible menu actions.

use serde::Serialize;
use shared::{AppError, Result, Toast};
use tracing::info;

use crate::domains::widget::ViewNode;
use crate::services::platform::{Notifier, PlatformContext, PostRef, SubmitPost};

pub const NEW_INSTANCE_ACTION: &str = "new-instance";
pub const NEW_INSTANCE_POST_TITLE: &str = "Invest your Subreddit!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuLocation {
    Subreddit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAudience {
    Moderator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub action: &'static str,
    pub label: &'static str,
    pub location: MenuLocation,
    pub for_user_type: MenuAudience,
}

pub fn menu_items() -> Vec<MenuItem> {
    vec![MenuItem {
        action: NEW_INSTANCE_ACTION,
        label: "New Investment Game",
        location: MenuLocation::Subreddit,
        for_user_type: MenuAudience::Moderator,
    }]
}

/// Creates a new widget post in `community`. Restricted to its moderators.
/// Failures are returned as-is to the caller.
pub async fn create_instance(
    platform: &PlatformContext,
    community: &str,
    notifier: &dyn Notifier,
) -> Result<PostRef> {
    let caller = platform
        .identity
        .current_user()
        .await?
        .ok_or_else(|| AppError::authentication("Sign in to create a widget post"))?;

    if !platform
        .moderators
        .is_moderator(community, caller.username.as_str())
        .await?
    {
        return Err(AppError::authorization(format!(
            "u/{} does not moderate r/{}",
            caller.username, community
        )));
    }

    let post = platform
        .posts
        .submit_post(SubmitPost {
            title: NEW_INSTANCE_POST_TITLE.into(),
            community: community.into(),
            preview: ViewNode::loading_preview(),
        })
        .await?;

    info!(community = %community, post = %post.id, moderator = %caller.username, "📝 Widget post created");
    notifier.show_toast(Toast::new("Created post!"));
    Ok(post)
}
