//! Reddit HTTP client backing the platform collaborator traits.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use shared::config::RedditConfig;
use shared::utils::validation::is_valid_community_name;
use shared::{AppError, CommunityInfo, CommunityStyles, CurrentUser, Result, Username};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::platform::{
    CommunityDirectory, IdentityProvider, ModeratorDirectory, PlatformConnector,
    PlatformContext, PostPublisher, PostRef, SubmitPost,
};

const SERVICE_NAME: &str = "reddit";

#[derive(Debug, Clone)]
pub struct RedditClient {
    client: Client,
    api_base_url: String,
    oauth_base_url: String,
    access_token: Option<String>,
}

// Listing envelopes, only the fields we read.

#[derive(Debug, Deserialize)]
struct Thing<T> {
    #[serde(default)]
    kind: Option<String>,
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Listing<T> {
    #[serde(default)]
    children: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SubredditAbout {
    name: Option<String>,
    display_name: Option<String>,
    subscribers: Option<u64>,
    active_user_count: Option<u64>,
    accounts_active: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SubredditStyle {
    primary_color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModeratorEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SubmitEnvelope {
    json: SubmitBody,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    id: String,
    url: Option<String>,
}

impl RedditClient {
    pub fn new(config: &RedditConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.effective_user_agent())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            oauth_base_url: config.oauth_base_url.trim_end_matches('/').to_string(),
            access_token: None,
        })
    }

    /// Copy of this client acting on behalf of the token's owner.
    pub fn with_access_token(&self, token: Option<&str>) -> Self {
        Self {
            access_token: token.filter(|t| !t.is_empty()).map(str::to_string),
            ..self.clone()
        }
    }

    /// Authenticated calls go to the OAuth host, anonymous reads to the public one.
    fn get(&self, path: &str) -> RequestBuilder {
        match &self.access_token {
            Some(token) => self
                .client
                .get(format!("{}{}", self.oauth_base_url, path))
                .bearer_auth(token),
            None => self.client.get(format!("{}{}", self.api_base_url, path)),
        }
    }

    fn require_token(&self, action: &str) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| AppError::authentication(format!("Sign in to {}", action)))
    }

    async fn send<T>(&self, request: RequestBuilder, resource: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request.send().await.map_err(map_reqwest_error)?;
        handle_response(response, resource).await
    }
}

/// Deserializes a success body; maps error statuses onto `AppError`.
async fn handle_response<T>(response: Response, resource: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();

    if status.is_success() {
        return response.json::<T>().await.map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("Failed to deserialize response: {}", e))
        });
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    debug!(status = %status, resource = %resource, "Reddit error body: {}", error_text);

    Err(match status {
        StatusCode::NOT_FOUND => AppError::not_found(resource),
        StatusCode::UNAUTHORIZED => AppError::authentication("Reddit rejected the access token"),
        StatusCode::FORBIDDEN => AppError::authorization(format!("Access to {} is restricted", resource)),
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            AppError::service_unavailable(SERVICE_NAME)
        }
        _ => AppError::external_service(SERVICE_NAME, format!("HTTP {} - {}", status, error_text)),
    })
}

fn map_reqwest_error(error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        AppError::timeout(format!("Request to {} timed out", SERVICE_NAME))
    } else if error.is_connect() {
        AppError::service_unavailable(SERVICE_NAME)
    } else {
        AppError::external_service(SERVICE_NAME, error.to_string())
    }
}

fn checked_community(name: &str) -> Result<&str> {
    if is_valid_community_name(name) {
        Ok(name)
    } else {
        Err(AppError::validation(format!("'{}' is not a valid subreddit name", name)))
    }
}

#[async_trait]
impl IdentityProvider for RedditClient {
    async fn current_user(&self) -> Result<Option<CurrentUser>> {
        if self.access_token.is_none() {
            return Ok(None);
        }

        let me: MeResponse = self.send(self.get("/api/v1/me"), "current user").await?;
        let username = Username::parse(&me.name)?;
        Ok(Some(CurrentUser { username }))
    }
}

#[async_trait]
impl CommunityDirectory for RedditClient {
    async fn community_info_by_name(&self, name: &str) -> Result<CommunityInfo> {
        let name = checked_community(name)?;
        let resource = format!("r/{}", name);
        let about: Thing<SubredditAbout> = self
            .send(self.get(&format!("/r/{}/about.json", name)), &resource)
            .await?;

        // Unknown names come back as a search listing instead of a 404.
        if about.kind.as_deref() != Some("t5") {
            return Err(AppError::not_found(resource));
        }

        let data = about.data;
        let display_name = data
            .display_name
            .ok_or_else(|| AppError::not_found(resource.clone()))?;
        Ok(CommunityInfo {
            id: data.name,
            name: display_name,
            subscribers_count: data.subscribers.unwrap_or_default(),
            active_count: data.active_user_count.or(data.accounts_active),
        })
    }

    async fn community_styles(&self, community_id: &str) -> Result<CommunityStyles> {
        let request = self.get("/api/info.json").query(&[("id", community_id)]);
        let listing: Thing<Listing<Thing<SubredditStyle>>> =
            self.send(request, "community styles").await?;

        let style = listing
            .data
            .children
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(format!("styles for {}", community_id)))?;

        Ok(CommunityStyles {
            primary_color: style.data.primary_color,
        })
    }
}

#[async_trait]
impl ModeratorDirectory for RedditClient {
    async fn is_moderator(&self, community: &str, username: &str) -> Result<bool> {
        self.require_token("check moderator status")?;
        let community = checked_community(community)?;

        let moderators: Thing<Listing<ModeratorEntry>> = self
            .send(
                self.get(&format!("/r/{}/about/moderators.json", community)),
                "moderator list",
            )
            .await?;

        Ok(moderators
            .data
            .children
            .iter()
            .any(|m| m.name.eq_ignore_ascii_case(username)))
    }
}

#[async_trait]
impl PostPublisher for RedditClient {
    async fn submit_post(&self, post: SubmitPost) -> Result<PostRef> {
        let token = self.require_token("submit posts")?;
        let community = checked_community(&post.community)?;
        let text = post.preview.plain_text();

        let request = self
            .client
            .post(format!("{}/api/submit", self.oauth_base_url))
            .bearer_auth(token)
            .form(&[
                ("sr", community),
                ("title", post.title.as_str()),
                ("kind", "self"),
                ("text", text.as_str()),
                ("api_type", "json"),
            ]);

        let envelope: SubmitEnvelope = self.send(request, "post submission").await?;
        if !envelope.json.errors.is_empty() {
            warn!(community = %community, errors = ?envelope.json.errors, "⚠️ Reddit refused the post");
            return Err(AppError::external_service(
                SERVICE_NAME,
                format!("Post rejected: {:?}", envelope.json.errors),
            ));
        }

        let data = envelope
            .json
            .data
            .ok_or_else(|| AppError::external_service(SERVICE_NAME, "Submit response had no data"))?;
        Ok(PostRef {
            id: data.id,
            url: data.url,
        })
    }
}

impl PlatformConnector for RedditClient {
    fn connect(&self, access_token: Option<&str>) -> PlatformContext {
        let client = Arc::new(self.with_access_token(access_token));
        PlatformContext {
            identity: client.clone(),
            directory: client.clone(),
            moderators: client.clone(),
            posts: client,
        }
    }
}
