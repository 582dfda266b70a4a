//! Wire types for the upstream post API (v2 JSON shape).

use serde::Deserialize;

/// A page of posts with optional author expansions.
///
/// `data` is absent when the query matched nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostsPage {
    #[serde(default)]
    pub data: Option<Vec<UpstreamPost>>,

    #[serde(default)]
    pub includes: Option<Includes>,
}

/// Expanded objects referenced from `data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<UpstreamUser>,
}

/// A single upstream post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamPost {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub author_id: Option<String>,

    /// ISO-8601 creation time
    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
}

/// Engagement counters. Missing fields count as zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub reply_count: u64,

    #[serde(default)]
    pub retweet_count: u64,

    #[serde(default)]
    pub like_count: u64,
}

/// An upstream user object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamUser {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}

/// Response of the handle lookup endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserLookup {
    #[serde(default)]
    pub data: Option<UpstreamUser>,
}

/// Error body the upstream sends with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Most specific human-readable message in the body.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.detail.as_deref().or(self.title.as_deref())
    }
}
