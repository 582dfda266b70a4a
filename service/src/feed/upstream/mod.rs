//! Backend that reads posts from the upstream post API.
//!
//! Tag searches are one call. Author timelines are two: the handle is
//! resolved to a user first, and that user is then passed into
//! normalization of the timeline page, which carries no author expansion.

pub mod client;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use client::{HttpUpstreamClient, UpstreamApiClient, UpstreamApiError, DEFAULT_BASE_URL};
pub use types::{Includes, PostsPage, PublicMetrics, UpstreamPost, UpstreamUser};

#[cfg(any(test, feature = "test-utils"))]
pub use client::mock;

use super::datefmt::reformat_upstream;
use super::model::{extract_hashtags, Account, Post};
use super::{ensure_limit, normalize_handle, normalize_tag, FeedError, PostSource, MAX_LIMIT};
use crate::config::UpstreamConfig;

impl From<UpstreamApiError> for FeedError {
    fn from(err: UpstreamApiError) -> Self {
        match err {
            UpstreamApiError::Status { status: 401, .. } => Self::UpstreamAuth,
            UpstreamApiError::Status { status: 403, .. } => Self::UpstreamForbidden,
            UpstreamApiError::Status { status: 429, .. } => Self::UpstreamRateLimited,
            UpstreamApiError::UserNotFound(username) => Self::NotFound(username),
            other => Self::UpstreamFailure(other),
        }
    }
}

/// Upstream-backed [`PostSource`].
pub struct UpstreamSource {
    client: Arc<dyn UpstreamApiClient>,
}

impl UpstreamSource {
    /// Build the backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Configuration` if no bearer token is configured or
    /// the HTTP client cannot be built.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, FeedError> {
        let token = config
            .bearer_token()
            .ok_or_else(|| FeedError::Configuration("upstream bearer token is required".into()))?;

        let client = HttpUpstreamClient::new(
            config.base_url.clone(),
            token,
            Duration::from_secs(config.timeout_secs),
        )
        .map_err(|e| FeedError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(Arc::new(client)))
    }

    /// Build the backend over an existing client.
    #[must_use]
    pub fn with_client(client: Arc<dyn UpstreamApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PostSource for UpstreamSource {
    fn name(&self) -> &'static str {
        "upstream"
    }

    async fn posts_by_tag(&self, tag: &str, limit: u32) -> Result<Vec<Post>, FeedError> {
        let tag = normalize_tag(tag)?;
        let limit = ensure_limit(limit)?;

        let page = self
            .client
            .search_recent(&format!("#{tag}"), limit.min(MAX_LIMIT))
            .await?;

        Ok(truncate(normalize_page(page, None), limit))
    }

    async fn posts_by_author(&self, handle: &str, limit: u32) -> Result<Vec<Post>, FeedError> {
        let handle = normalize_handle(handle)?;
        let limit = ensure_limit(limit)?;

        let author = self.client.user_by_username(handle).await?;
        tracing::debug!(handle, user_id = %author.id, "resolved upstream user");

        let page = self
            .client
            .user_posts(&author.id, limit.min(MAX_LIMIT))
            .await?;

        Ok(truncate(normalize_page(page, Some(&author)), limit))
    }
}

fn truncate(mut posts: Vec<Post>, limit: u32) -> Vec<Post> {
    posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    posts
}

/// Convert an upstream page into canonical posts.
///
/// With `resolved_author`, that user replaces the page's own expansions and
/// is assumed for items that omit `author_id`. A page without `data` yields
/// no posts.
#[must_use]
pub fn normalize_page(page: PostsPage, resolved_author: Option<&UpstreamUser>) -> Vec<Post> {
    let PostsPage { data, includes, .. } = page;
    let Some(items) = data else {
        return Vec::new();
    };

    let users: HashMap<&str, &UpstreamUser> = match resolved_author {
        Some(user) => HashMap::from([(user.id.as_str(), user)]),
        None => includes
            .as_ref()
            .map(|inc| inc.users.iter().map(|u| (u.id.as_str(), u)).collect())
            .unwrap_or_default(),
    };

    items
        .into_iter()
        .map(|item| {
            let author_id = item
                .author_id
                .as_deref()
                .or_else(|| resolved_author.map(|u| u.id.as_str()));
            let account = account_for(author_id, author_id.and_then(|id| users.get(id).copied()));
            let metrics = item.public_metrics.unwrap_or_default();
            let display_date = item
                .created_at
                .as_deref()
                .map(reformat_upstream)
                .unwrap_or_default();

            Post {
                account,
                display_date,
                hashtags: extract_hashtags(&item.text),
                text: item.text,
                reply_count: metrics.reply_count,
                repost_count: metrics.retweet_count,
                like_count: metrics.like_count,
            }
        })
        .collect()
}

/// Author account, falling back to "Unknown" when the user is not expanded.
fn account_for(author_id: Option<&str>, user: Option<&UpstreamUser>) -> Account {
    let id = author_id
        .and_then(|id| id.parse::<u64>().ok())
        .unwrap_or(Account::UNKNOWN_ID);
    let fullname = user.and_then(|u| u.name.as_deref()).unwrap_or("Unknown");
    let username = user.and_then(|u| u.username.as_deref()).unwrap_or("unknown");
    Account::new(fullname, format!("/{username}"), id)
}
