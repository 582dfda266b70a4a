//! REST API handlers and `OpenAPI` documentation.
//!
//! Handlers validate the `limit` query parameter, call the shared
//! [`PostSource`], and translate [`FeedError`] kinds into RFC 7807 problem
//! responses.

// The OpenApi derive macro generates code that triggers this lint
#![allow(clippy::needless_for_each)]

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::feed::{validate_limit, Account, FeedError, Post, PostSource, DEFAULT_LIMIT};

const ERROR_TYPE_BASE: &str = "https://tweetfeed.dev/errors/";

/// Serialize a `StatusCode` as its `u16` representation.
#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires `&T` signature
fn serialize_status_code<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

/// RFC 7807 Problem Details error response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// URI reference identifying the problem type
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short human-readable summary
    pub title: String,
    /// HTTP status code
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub status: StatusCode,
    /// Human-readable explanation specific to this occurrence
    pub detail: String,
    /// URI reference identifying the specific occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ProblemExtensions>,
}

/// Machine-readable error classification.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemExtensions {
    /// Stable error code, e.g. `INVALID_INPUT`
    pub code: String,
}

impl ProblemDetails {
    fn new(status: StatusCode, slug: &str, code: &str, detail: String) -> Self {
        Self {
            problem_type: format!("{ERROR_TYPE_BASE}{slug}"),
            title: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            status,
            detail,
            instance: None,
            extensions: Some(ProblemExtensions {
                code: code.to_string(),
            }),
        }
    }

    /// Attach the request path that produced this problem.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }
}

impl From<&FeedError> for ProblemDetails {
    fn from(err: &FeedError) -> Self {
        let (status, slug, code) = match err {
            FeedError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid-input", "INVALID_INPUT"),
            FeedError::NotFound(_) => (StatusCode::NOT_FOUND, "not-found", "NOT_FOUND"),
            FeedError::UpstreamRateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate-limited",
                "UPSTREAM_RATE_LIMITED",
            ),
            FeedError::UpstreamAuth => (StatusCode::BAD_GATEWAY, "upstream-auth", "UPSTREAM_AUTH"),
            FeedError::UpstreamForbidden => (
                StatusCode::BAD_GATEWAY,
                "upstream-forbidden",
                "UPSTREAM_FORBIDDEN",
            ),
            FeedError::UpstreamFailure(_) => {
                (StatusCode::BAD_GATEWAY, "upstream-failure", "UPSTREAM_FAILURE")
            }
            FeedError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration",
                "CONFIGURATION_ERROR",
            ),
        };
        Self::new(status, slug, code, err.to_string())
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

/// Query parameters shared by the post listing endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Number of posts to return (1-100, default 30)
    #[param(value_type = Option<u32>, minimum = 1, maximum = 100)]
    pub limit: Option<String>,
}

/// Liveness response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

/// `OpenAPI` documentation for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TweetFeed API",
        version = "1.0.0",
        description = "RESTful API service for post data retrieval",
        license(name = "MIT")
    ),
    paths(get_posts_by_hashtag, get_posts_by_user, health_check),
    components(schemas(Post, Account, ProblemDetails, ProblemExtensions, HealthStatus))
)]
pub struct ApiDoc;

fn problem(err: &FeedError, instance: String) -> ProblemDetails {
    let problem = ProblemDetails::from(err).with_instance(instance);
    if problem.status.is_server_error() {
        tracing::error!(error = %err, instance = ?problem.instance, "post retrieval failed");
    } else {
        tracing::debug!(error = %err, instance = ?problem.instance, "post request rejected");
    }
    problem
}

/// Get posts containing a hashtag
///
/// The leading `#` is optional.
///
/// # Errors
///
/// Returns `ProblemDetails` for invalid input or upstream failures.
#[utoipa::path(
    get,
    path = "/hashtags/{hashtag}",
    tag = "Posts",
    params(
        ("hashtag" = String, Path, description = "Hashtag to search for"),
        LimitQuery
    ),
    responses(
        (status = 200, description = "Posts retrieved successfully", body = Vec<Post>),
        (status = 400, description = "Invalid hashtag or limit", body = ProblemDetails),
        (status = 429, description = "Upstream rate limit reached", body = ProblemDetails),
        (status = 502, description = "Upstream API failure", body = ProblemDetails)
    )
)]
pub async fn get_posts_by_hashtag(
    Extension(source): Extension<Arc<dyn PostSource>>,
    Path(hashtag): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Post>>, ProblemDetails> {
    let instance = format!("/hashtags/{hashtag}");
    let limit = validate_limit(query.limit.as_deref(), DEFAULT_LIMIT)
        .map_err(|e| problem(&FeedError::from(e), instance.clone()))?;

    let posts = source
        .posts_by_tag(&hashtag, limit)
        .await
        .map_err(|e| problem(&e, instance))?;

    Ok(Json(posts))
}

/// Get posts from a user's timeline
///
/// The leading `@` is optional.
///
/// # Errors
///
/// Returns `ProblemDetails` for invalid input, unknown users or upstream failures.
#[utoipa::path(
    get,
    path = "/users/{username}",
    tag = "Posts",
    params(
        ("username" = String, Path, description = "Handle of the author"),
        LimitQuery
    ),
    responses(
        (status = 200, description = "Posts retrieved successfully", body = Vec<Post>),
        (status = 400, description = "Invalid username or limit", body = ProblemDetails),
        (status = 404, description = "User not found", body = ProblemDetails),
        (status = 429, description = "Upstream rate limit reached", body = ProblemDetails),
        (status = 502, description = "Upstream API failure", body = ProblemDetails)
    )
)]
pub async fn get_posts_by_user(
    Extension(source): Extension<Arc<dyn PostSource>>,
    Path(username): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Post>>, ProblemDetails> {
    let instance = format!("/users/{username}");
    let limit = validate_limit(query.limit.as_deref(), DEFAULT_LIMIT)
        .map_err(|e| problem(&FeedError::from(e), instance.clone()))?;

    let posts = source
        .posts_by_author(&username, limit)
        .await
        .map_err(|e| problem(&e, instance))?;

    Ok(Json(posts))
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses((status = 200, description = "Service is up", body = HealthStatus))
)]
#[allow(clippy::unused_async)] // Required for Axum handler signature
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
    })
}
