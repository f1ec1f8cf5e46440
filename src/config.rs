//! Connection settings for the hosted backend.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Function invoked for bulk uploads unless configured otherwise.
pub const DEFAULT_BULK_INGEST_FUNCTION: &str = "bulk-leave-application-csv";
/// Function invoked for single leave applications unless configured otherwise.
pub const DEFAULT_LEAVE_FUNCTION: &str = "leave-application";

/// Settings for [`crate::remote::HostedClient`].
///
/// Loaded from JSON; only `base_url` and `anon_key` are required.
///
/// ```rust
/// use leave_ingest::config::ClientConfig;
///
/// let cfg = ClientConfig::from_json_str(
///     r#"{ "base_url": "https://example.supabase.co", "anon_key": "public-anon" }"#,
/// )
/// .unwrap();
/// assert_eq!(cfg.bulk_ingest_function, "bulk-leave-application-csv");
/// assert_eq!(cfg.request_timeout_secs, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    #[serde(default = "default_bulk_ingest_function")]
    pub bulk_ingest_function: String,
    #[serde(default = "default_leave_function")]
    pub leave_function: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_bulk_ingest_function() -> String {
    DEFAULT_BULK_INGEST_FUNCTION.to_string()
}

fn default_leave_function() -> String {
    DEFAULT_LEAVE_FUNCTION.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Config with default function names and timeout.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: anon_key.into(),
            bulk_ingest_function: default_bulk_ingest_function(),
            leave_function: default_leave_function(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::Invalid {
            message: message.to_string(),
        };
        if self.base_url.trim().is_empty() {
            return Err(invalid("base_url must not be empty"));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(invalid("base_url must start with http:// or https://"));
        }
        if self.anon_key.trim().is_empty() {
            return Err(invalid("anon_key must not be empty"));
        }
        if self.bulk_ingest_function.trim().is_empty() || self.leave_function.trim().is_empty() {
            return Err(invalid("function names must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `base_url` joined with `path` (which starts with `/`).
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
