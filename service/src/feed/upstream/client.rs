//! HTTP client for the upstream post API.
//!
//! The trait keeps [`super::UpstreamSource`] testable without a network:
//! use [`HttpUpstreamClient`] for real calls, or
//! [`mock::MockUpstreamClient`] in unit tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::types::{ErrorBody, PostsPage, UpstreamUser, UserLookup};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com/2";

const TWEET_FIELDS: &str = "created_at,public_metrics,text,author_id";
const USER_FIELDS: &str = "id,name,username";

/// Errors that can occur when calling the upstream API.
#[derive(Debug, Error)]
pub enum UpstreamApiError {
    /// Transport failure: timeout, connection error, undecodable body
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Handle lookup found no such user
    #[error("User not found: {0}")]
    UserNotFound(String),
}

/// Trait for upstream API operations.
#[async_trait]
pub trait UpstreamApiClient: Send + Sync {
    /// Search recent posts matching `query`, with author expansion.
    async fn search_recent(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<PostsPage, UpstreamApiError>;

    /// Resolve a handle (without `@`) to its user record.
    async fn user_by_username(&self, username: &str) -> Result<UpstreamUser, UpstreamApiError>;

    /// List recent posts of the user with numeric id `user_id`.
    async fn user_posts(
        &self,
        user_id: &str,
        max_results: u32,
    ) -> Result<PostsPage, UpstreamApiError>;
}

/// HTTP-based implementation of `UpstreamApiClient`.
pub struct HttpUpstreamClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl HttpUpstreamClient {
    /// Create a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamApiError::Request` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tweetfeed-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, bearer_token))
    }

    /// Create a client with a custom `reqwest::Client`.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(endpoint, "calling upstream API");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.message().map(String::from))
                .unwrap_or(body);
            warn!(endpoint, status = status.as_u16(), %message, "upstream API error");
            return Err(UpstreamApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl UpstreamApiClient for HttpUpstreamClient {
    #[instrument(skip(self))]
    async fn search_recent(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<PostsPage, UpstreamApiError> {
        let params = [
            ("query", query.to_string()),
            ("max_results", max_results.to_string()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
            ("expansions", "author_id".to_string()),
            ("user.fields", USER_FIELDS.to_string()),
        ];
        self.get_json("/tweets/search/recent", &params).await
    }

    #[instrument(skip(self))]
    async fn user_by_username(&self, username: &str) -> Result<UpstreamUser, UpstreamApiError> {
        let endpoint = format!("/users/by/username/{}", urlencoding::encode(username));
        let params = [("user.fields", USER_FIELDS.to_string())];

        let lookup: UserLookup = match self.get_json(&endpoint, &params).await {
            Err(UpstreamApiError::Status { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                return Err(UpstreamApiError::UserNotFound(username.to_string()));
            }
            other => other?,
        };

        lookup
            .data
            .ok_or_else(|| UpstreamApiError::UserNotFound(username.to_string()))
    }

    #[instrument(skip(self))]
    async fn user_posts(
        &self,
        user_id: &str,
        max_results: u32,
    ) -> Result<PostsPage, UpstreamApiError> {
        let endpoint = format!("/users/{}/tweets", urlencoding::encode(user_id));
        let params = [
            ("max_results", max_results.to_string()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
            ("user.fields", USER_FIELDS.to_string()),
        ];
        self.get_json(&endpoint, &params).await
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Mock implementation for unit testing.

    use super::{PostsPage, UpstreamApiClient, UpstreamApiError, UpstreamUser};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Mock implementation of `UpstreamApiClient` for unit tests.
    ///
    /// Each configured result is returned once. Unconfigured searches and
    /// timelines return an empty page; unconfigured lookups report the user
    /// as missing.
    pub struct MockUpstreamClient {
        search_result: Mutex<Option<Result<PostsPage, UpstreamApiError>>>,
        user_result: Mutex<Option<Result<UpstreamUser, UpstreamApiError>>>,
        user_posts_result: Mutex<Option<Result<PostsPage, UpstreamApiError>>>,
        search_calls: Mutex<Vec<(String, u32)>>,
        user_calls: Mutex<Vec<String>>,
        user_posts_calls: Mutex<Vec<(String, u32)>>,
    }

    impl MockUpstreamClient {
        pub fn new() -> Self {
            Self {
                search_result: Mutex::new(None),
                user_result: Mutex::new(None),
                user_posts_result: Mutex::new(None),
                search_calls: Mutex::new(Vec::new()),
                user_calls: Mutex::new(Vec::new()),
                user_posts_calls: Mutex::new(Vec::new()),
            }
        }

        /// Set the result for the next `search_recent` call.
        pub fn set_search_result(&self, result: Result<PostsPage, UpstreamApiError>) {
            *self.search_result.lock().unwrap() = Some(result);
        }

        /// Set the result for the next `user_by_username` call.
        pub fn set_user_result(&self, result: Result<UpstreamUser, UpstreamApiError>) {
            *self.user_result.lock().unwrap() = Some(result);
        }

        /// Set the result for the next `user_posts` call.
        pub fn set_user_posts_result(&self, result: Result<PostsPage, UpstreamApiError>) {
            *self.user_posts_result.lock().unwrap() = Some(result);
        }

        /// `(query, max_results)` of every `search_recent` call.
        pub fn search_calls(&self) -> Vec<(String, u32)> {
            self.search_calls.lock().unwrap().clone()
        }

        /// Usernames passed to `user_by_username`.
        pub fn user_calls(&self) -> Vec<String> {
            self.user_calls.lock().unwrap().clone()
        }

        /// `(user_id, max_results)` of every `user_posts` call.
        pub fn user_posts_calls(&self) -> Vec<(String, u32)> {
            self.user_posts_calls.lock().unwrap().clone()
        }
    }

    impl Default for MockUpstreamClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl UpstreamApiClient for MockUpstreamClient {
        async fn search_recent(
            &self,
            query: &str,
            max_results: u32,
        ) -> Result<PostsPage, UpstreamApiError> {
            self.search_calls
                .lock()
                .unwrap()
                .push((query.to_string(), max_results));

            self.search_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(PostsPage::default()))
        }

        async fn user_by_username(
            &self,
            username: &str,
        ) -> Result<UpstreamUser, UpstreamApiError> {
            self.user_calls.lock().unwrap().push(username.to_string());

            self.user_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(UpstreamApiError::UserNotFound(username.to_string())))
        }

        async fn user_posts(
            &self,
            user_id: &str,
            max_results: u32,
        ) -> Result<PostsPage, UpstreamApiError> {
            self.user_posts_calls
                .lock()
                .unwrap()
                .push((user_id.to_string(), max_results));

            self.user_posts_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(PostsPage::default()))
        }
    }
}
