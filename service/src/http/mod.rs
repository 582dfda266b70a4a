//! Router assembly shared by the server binary and the integration tests.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Extension, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::feed::PostSource;
use crate::rest::{self, ApiDoc};

/// Build the full application router around `source`.
///
/// Layer order, innermost first: routes, the shared source extension, CORS,
/// request tracing.
#[must_use]
pub fn app(source: Arc<dyn PostSource>, config: &Config) -> Router {
    let mut router = Router::new()
        .route("/hashtags/{hashtag}", get(rest::get_posts_by_hashtag))
        .route("/users/{username}", get(rest::get_posts_by_user))
        .route("/health", get(rest::health_check));

    if config.swagger.enabled {
        router = router.merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(Extension(source))
        .layer(cors_layer(&config.cors.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS layer for the configured origins.
///
/// `"*"` allows any origin; an empty list blocks cross-origin requests.
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin: AllowOrigin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let header_values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(header_values)
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(allow_origin)
}
