//! Canonical post records returned by every backend.
//!
//! Both backends build these from already-validated fields; nothing here
//! checks its inputs. The `Serialize` impls are the wire mapping: field names
//! follow the public format (`href`, `date`, `replies`, ...) rather than the
//! Rust names.

use serde::Serialize;
use utoipa::ToSchema;

/// Author of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Account {
    /// Display name
    pub fullname: String,
    /// Path-like profile identifier (e.g. "/raymondh")
    #[serde(rename = "href")]
    pub profile_handle: String,
    /// Numeric account id, `0` when the author could not be resolved
    pub id: u64,
}

impl Account {
    /// Id carried by authors that could not be resolved.
    pub const UNKNOWN_ID: u64 = 0;

    #[must_use]
    pub fn new(fullname: impl Into<String>, profile_handle: impl Into<String>, id: u64) -> Self {
        Self {
            fullname: fullname.into(),
            profile_handle: profile_handle.into(),
            id,
        }
    }
}

/// A single post in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Post {
    pub account: Account,
    /// Pre-formatted display date, e.g. "2:30 PM - 15 Mar 2023"
    #[serde(rename = "date")]
    pub display_date: String,
    pub text: String,
    #[serde(rename = "replies")]
    pub reply_count: u64,
    #[serde(rename = "retweets")]
    pub repost_count: u64,
    #[serde(rename = "likes")]
    pub like_count: u64,
    /// `#`-prefixed tags in first-occurrence order
    pub hashtags: Vec<String>,
}

/// Collect whitespace-separated tokens that start with `#`, in text order.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|word| word.starts_with('#'))
        .map(String::from)
        .collect()
}
