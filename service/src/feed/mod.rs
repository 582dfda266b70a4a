//! Post retrieval layer.
//!
//! # Architecture
//!
//! - [`PostSource`] - Trait both backends implement
//! - [`SyntheticSource`] - Seeded generator over fixed sample data
//! - [`UpstreamSource`] - Adapter over the upstream post API
//! - [`select_source`] - Picks a backend once, from the credential
//!
//! Every backend returns canonical [`Post`] records or a [`FeedError`]. The
//! HTTP layer maps the error kind to a status code.

pub mod datefmt;
pub mod limit;
pub mod model;
pub mod select;
pub mod synthetic;
pub mod upstream;

use async_trait::async_trait;
use thiserror::Error;

pub use limit::{validate_limit, LimitError, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
pub use model::{Account, Post};
pub use select::select_source;
pub use synthetic::SyntheticSource;
pub use upstream::{UpstreamApiError, UpstreamSource};

/// Errors surfaced by a [`PostSource`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// Empty key or out-of-range limit
    #[error("{0}")]
    InvalidInput(String),

    /// Backend could not be constructed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Upstream has no such author
    #[error("User '{0}' not found")]
    NotFound(String),

    /// Credential rejected (upstream 401)
    #[error("Authentication failed. Please check your bearer token.")]
    UpstreamAuth,

    /// Credential lacks the required access tier (upstream 403)
    #[error("Access forbidden. This endpoint may require a higher API access tier.")]
    UpstreamForbidden,

    /// Upstream throttling (upstream 429)
    #[error("Rate limit exceeded. Please wait before making more requests.")]
    UpstreamRateLimited,

    /// Any other upstream status or transport failure
    #[error("API request failed: {0}")]
    UpstreamFailure(#[source] UpstreamApiError),
}

impl From<LimitError> for FeedError {
    fn from(err: LimitError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Trait for post retrieval backends.
///
/// Implementations are shared across requests behind an `Arc`, so any
/// mutable state must be synchronized internally.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Short backend name for logs ("synthetic", "upstream").
    fn name(&self) -> &'static str;

    /// Recent posts carrying `tag`, newest first.
    ///
    /// A single leading `#` is ignored.
    async fn posts_by_tag(&self, tag: &str, limit: u32) -> Result<Vec<Post>, FeedError>;

    /// Recent posts written by `handle`, newest first.
    ///
    /// A single leading `@` is ignored.
    async fn posts_by_author(&self, handle: &str, limit: u32) -> Result<Vec<Post>, FeedError>;
}

/// Strip surrounding whitespace and at most one leading `marker`.
fn strip_marker(key: &str, marker: char) -> &str {
    let key = key.trim();
    key.strip_prefix(marker).unwrap_or(key)
}

/// Normalize a tag search key, preserving case.
///
/// # Errors
///
/// Returns `FeedError::InvalidInput` if nothing remains after stripping `#`.
pub fn normalize_tag(tag: &str) -> Result<&str, FeedError> {
    let tag = strip_marker(tag, '#');
    if tag.is_empty() {
        return Err(FeedError::InvalidInput("Hashtag cannot be empty".into()));
    }
    Ok(tag)
}

/// Normalize an author handle, preserving case.
///
/// # Errors
///
/// Returns `FeedError::InvalidInput` if nothing remains after stripping `@`.
pub fn normalize_handle(handle: &str) -> Result<&str, FeedError> {
    let handle = strip_marker(handle, '@');
    if handle.is_empty() {
        return Err(FeedError::InvalidInput("Username cannot be empty".into()));
    }
    Ok(handle)
}

/// Re-check a limit that should already have passed [`validate_limit`].
///
/// # Errors
///
/// Returns `FeedError::InvalidInput` if `limit` is outside `MIN_LIMIT..=MAX_LIMIT`.
pub fn ensure_limit(limit: u32) -> Result<u32, FeedError> {
    Ok(limit::check_bounds(i64::from(limit))?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn tag_marker_is_optional() {
        assert_eq!(normalize_tag("#python").unwrap(), "python");
        assert_eq!(normalize_tag("python").unwrap(), "python");
        assert_eq!(
            normalize_tag("#python").unwrap(),
            normalize_tag(normalize_tag("#python").unwrap()).unwrap()
        );
    }

    #[test]
    fn handle_marker_is_optional() {
        assert_eq!(normalize_handle("@twitter").unwrap(), "twitter");
        assert_eq!(normalize_handle("twitter").unwrap(), "twitter");
    }

    #[test]
    fn only_one_marker_is_stripped() {
        assert_eq!(normalize_tag("##rust").unwrap(), "#rust");
        assert_eq!(normalize_handle("@@bob").unwrap(), "@bob");
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(normalize_tag("#Python").unwrap(), "Python");
        assert_eq!(normalize_handle("@ThePSF").unwrap(), "ThePSF");
    }

    #[test]
    fn empty_keys_are_rejected() {
        for key in ["", "#", "  ", " # "] {
            assert!(
                matches!(normalize_tag(key), Err(FeedError::InvalidInput(_))),
                "tag {key:?}"
            );
        }
        for key in ["", "@", "  "] {
            assert!(
                matches!(normalize_handle(key), Err(FeedError::InvalidInput(_))),
                "handle {key:?}"
            );
        }
    }

    #[test]
    fn ensure_limit_rejects_out_of_range() {
        assert_eq!(ensure_limit(1).unwrap(), 1);
        assert_eq!(ensure_limit(100).unwrap(), 100);
        assert!(matches!(ensure_limit(0), Err(FeedError::InvalidInput(_))));
        assert!(matches!(ensure_limit(101), Err(FeedError::InvalidInput(_))));
    }
}
