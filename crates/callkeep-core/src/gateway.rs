//! HTTP boundary to the backend: recording upload and agent login.
//!
//! The upload endpoint takes one multipart `file` part plus the record's
//! metadata as query parameters, authenticated with a bearer token:
//!
//! ```text
//! POST {base}/recordings/upload_recording?customer_number=..&call_duration=HH:MM:SS&agent_id=..
//! Authorization: Bearer <token>
//! ```
//!
//! A 2xx response with a JSON body is success; any other status is a failure
//! with the response body text as the error detail. Batch reconciliation
//! normalizes every `Err` from this boundary into its per-item failure shape,
//! so nothing here needs to (or may) escalate past the caller.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::config::{ApiConfig, validate_base_url};
use crate::record::RecordingRecord;

/// Content type for uploaded call audio
const AUDIO_MIME: &str = "audio/m4a";

/// One network operation: push a recording to the backend.
///
/// Kept as a trait so batch reconciliation can be exercised against stub
/// gateways in tests.
#[async_trait]
pub trait UploadGateway: Send + Sync {
    /// Upload one recording with the given bearer token.
    ///
    /// Returns the server's JSON response body on success.
    async fn upload(&self, record: &RecordingRecord, token: &str) -> Result<serde_json::Value>;
}

/// reqwest-backed gateway to the recordings backend.
pub struct HttpUploadGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUploadGateway {
    /// Build a gateway from API configuration (validates the base URL).
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = validate_base_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl UploadGateway for HttpUploadGateway {
    async fn upload(&self, record: &RecordingRecord, token: &str) -> Result<serde_json::Value> {
        let audio = tokio::fs::read(&record.uri)
            .await
            .with_context(|| format!("Failed to read recording file {}", record.uri))?;

        let file_name = Path::new(&record.uri)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("recording.m4a")
            .to_string();

        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(audio)
                .file_name(file_name)
                .mime_str(AUDIO_MIME)?,
        );

        let url = format!("{}/recordings/upload_recording", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[
                ("customer_number", record.customer_number.as_str()),
                ("call_duration", record.duration.as_str()),
                ("agent_id", record.agent_id.as_str()),
            ])
            .header("Authorization", format!("Bearer {token}"))
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Upload failed ({status}): {error_text}");
        }

        let text = response
            .text()
            .await
            .context("Failed to read upload response")?;
        serde_json::from_str(&text).context("Failed to parse upload response")
    }
}

/// Log in an agent, returning the bearer token to store.
///
/// `POST {auth_base}/auth/login` with a JSON `{email, password}` body. The
/// success body carries `access_token`; on failure the server's `detail`
/// field (when present) becomes the error message.
pub async fn login(config: &ApiConfig, email: &str, password: &str) -> Result<String> {
    let auth_base = validate_base_url(config.auth_base())?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .post(format!("{auth_base}/auth/login"))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .context("Failed to send login request")?;

    let status = response.status();
    let text = response
        .text()
        .await
        .context("Failed to read login response")?;

    let body: serde_json::Value = match serde_json::from_str(&text) {
        Ok(body) => body,
        Err(_) if status.is_success() => {
            anyhow::bail!("Login failed: received non-JSON response from server")
        }
        Err(_) => anyhow::bail!("Login failed ({status}): {text}"),
    };

    if !status.is_success() {
        let detail = body
            .get("detail")
            .and_then(|d| d.as_str())
            .unwrap_or("An unknown error occurred");
        anyhow::bail!("Login failed ({status}): {detail}");
    }

    body.get("access_token")
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .context("Login response did not contain an access token")
}
