use std::fmt;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_aux::prelude::deserialize_vec_from_string_or_vec;

use crate::feed::upstream::DEFAULT_BASE_URL;

/// Application configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Legacy variables `TWITTER_BEARER_TOKEN` and `PORT`
/// 4. Environment variables with TF_ prefix (always wins)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub swagger: SwaggerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP server bind address.
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error). `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests.
    /// Use `"*"` to allow any origin.
    /// Accepts either an array or comma-separated string.
    #[serde(default, deserialize_with = "deserialize_origins")]
    pub allowed_origins: Vec<String>,
}

/// Deserialize origins from comma-separated string or array, filtering empty values.
fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let origins: Vec<String> = deserialize_vec_from_string_or_vec(deserializer)?;
    Ok(origins.into_iter().filter(|s| !s.is_empty()).collect())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwaggerConfig {
    /// Serve Swagger UI at /docs and the document at /openapi.json.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Bearer token for the upstream API. Absent or blank selects the
    /// synthetic backend.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// API root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// The configured token, if it is non-blank.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field(
                "bearer_token",
                &self.bearer_token().map(|_| "<redacted>"),
            )
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_port() -> u16 {
    5000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout_secs() -> u64 {
    10
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Config {
    /// Load configuration from all sources, reading `config.yaml` if present.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(yaml_path).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(yaml_path: &str) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(
                Env::raw()
                    .only(&["TWITTER_BEARER_TOKEN"])
                    .map(|_| "upstream.bearer_token".into()),
            )
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
            .merge(Env::prefixed("TF_").split("__"))
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port cannot be 0".into()));
        }

        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "upstream.timeout_secs cannot be 0".into(),
            ));
        }

        let base_url = &self.upstream.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "upstream.base_url must start with http:// or https://, got: '{base_url}'"
            )));
        }

        // CORS origins must be valid URLs or "*"
        for origin in &self.cors.allowed_origins {
            if origin != "*" && !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "cors.allowed_origins contains invalid origin '{origin}'. Must be '*' or start with http:// or https://"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
        assert!(config.swagger.enabled);
        assert!(config.cors.allowed_origins.is_empty());
        assert!(config.upstream.bearer_token().is_none());
        assert_eq!(config.upstream.base_url, "https://api.twitter.com/2");
        assert_eq!(config.upstream.timeout_secs, 10);
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_blank_token_counts_as_absent() {
        let config = UpstreamConfig {
            bearer_token: Some("  ".into()),
            ..UpstreamConfig::default()
        };
        assert!(config.bearer_token().is_none());

        let config = UpstreamConfig {
            bearer_token: Some(" abc ".into()),
            ..UpstreamConfig::default()
        };
        assert_eq!(config.bearer_token(), Some("abc"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = UpstreamConfig {
            bearer_token: Some("super-secret".into()),
            ..UpstreamConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let mut config = Config::default();
        config.upstream.timeout_secs = 0;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_cors_deserialize_comma_separated_string() {
        let json = r#"{"allowed_origins": "http://localhost:5173,https://app.example.com"}"#;
        let config: CorsConfig = serde_json::from_str(json).expect("should parse");
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:5173", "https://app.example.com"]
        );
    }

    #[test]
    fn test_cors_deserialize_empty_string() {
        let json = r#"{"allowed_origins": ""}"#;
        let config: CorsConfig = serde_json::from_str(json).expect("should parse");
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn base_url_boundaries() {
        let cases = [
            ("https://api.twitter.com/2", true, "default"),
            ("http://127.0.0.1:9999", true, "plain http"),
            ("ftp://files.com", false, "ftp scheme"),
            ("api.twitter.com", false, "no scheme"),
            ("", false, "empty"),
        ];

        for (url, should_pass, desc) in cases {
            let mut config = Config::default();
            config.upstream.base_url = url.into();
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn port_boundaries() {
        let cases = [
            (0u16, false, "zero port"),
            (1, true, "minimum valid port"),
            (5000, true, "default port"),
            (65535, true, "maximum port"),
        ];

        for (port, should_pass, desc) in cases {
            let mut config = Config::default();
            config.server.port = port;
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn cors_origin_boundaries() {
        let cases = [
            (vec!["*"], true, "wildcard"),
            (vec!["http://localhost:3000"], true, "with port"),
            (vec![], true, "empty list"),
            (vec!["localhost"], false, "no scheme"),
        ];

        for (origins, should_pass, desc) in cases {
            let mut config = Config::default();
            config.cors.allowed_origins = origins.into_iter().map(String::from).collect();
            let result = config.validate();
            assert_eq!(result.is_ok(), should_pass, "case '{}': {:?}", desc, result);
        }
    }

    #[test]
    fn yaml_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r"
server:
  port: 6000
upstream:
  timeout_secs: 3
",
            )?;
            jail.set_env("TF_SERVER__PORT", "7000");

            let config = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 7000);
            assert_eq!(config.upstream.timeout_secs, 3);
            Ok(())
        });
    }

    #[test]
    fn legacy_variables_are_honoured() {
        Jail::expect_with(|jail| {
            jail.set_env("TWITTER_BEARER_TOKEN", "legacy-token");
            jail.set_env("PORT", "8123");

            let config = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(config.upstream.bearer_token(), Some("legacy-token"));
            assert_eq!(config.server.port, 8123);
            Ok(())
        });
    }

    #[test]
    fn prefixed_token_overrides_legacy() {
        Jail::expect_with(|jail| {
            jail.set_env("TWITTER_BEARER_TOKEN", "legacy-token");
            jail.set_env("TF_UPSTREAM__BEARER_TOKEN", "new-token");

            let config = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(config.upstream.bearer_token(), Some("new-token"));
            Ok(())
        });
    }
}
