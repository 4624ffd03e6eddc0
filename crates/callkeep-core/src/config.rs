//! API endpoint configuration for the upload backend.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default request timeout for upload and login calls, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Backend endpoints and network tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the recordings API (e.g., "https://api.example.com")
    #[serde(default)]
    pub base_url: String,

    /// Base URL for the auth API; falls back to `base_url` when empty
    #[serde(default)]
    pub auth_url: String,

    /// Request timeout in seconds for upload and login calls
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_url: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Base URL for auth requests, falling back to the recordings base URL.
    pub fn auth_base(&self) -> &str {
        if self.auth_url.is_empty() {
            &self.base_url
        } else {
            &self.auth_url
        }
    }
}

/// Validate a base URL and normalize it (no trailing slash).
///
/// # Errors
/// Returns an error if the URL is empty, has no http(s) scheme, or has no host.
pub fn validate_base_url(url: &str) -> Result<String> {
    if url.is_empty() {
        anyhow::bail!(
            "Upload server URL not configured.\n\
             Set with: callkeep config --base-url https://api.example.com"
        );
    }

    let trimmed = url.trim();
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        anyhow::bail!(
            "Invalid server URL: must start with http:// or https://\n\
             Got: {}\n\
             Example: callkeep config --base-url https://api.example.com",
            trimmed
        );
    }

    // Basic validation: ensure there's a host after the scheme
    let after_scheme = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .unwrap_or("");
    if after_scheme.is_empty() || after_scheme.starts_with('/') {
        anyhow::bail!(
            "Invalid server URL: missing host\n\
             Got: {}\n\
             Example: callkeep config --base-url https://api.example.com",
            trimmed
        );
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
