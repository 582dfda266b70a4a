//! One-time choice between the synthetic and upstream backends.

use std::sync::Arc;

use super::{FeedError, PostSource, SyntheticSource, UpstreamSource};
use crate::config::UpstreamConfig;

/// Pick the backend for this process.
///
/// A non-blank bearer token selects the upstream API; otherwise posts are
/// generated locally.
///
/// # Errors
///
/// Returns `FeedError::Configuration` if the upstream backend is selected but
/// cannot be constructed.
pub fn select_source(config: &UpstreamConfig) -> Result<Arc<dyn PostSource>, FeedError> {
    if config.bearer_token().is_some() {
        Ok(Arc::new(UpstreamSource::from_config(config)?))
    } else {
        Ok(Arc::new(SyntheticSource::new()))
    }
}
