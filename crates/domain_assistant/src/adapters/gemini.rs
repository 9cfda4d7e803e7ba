//! Gemini Completion Adapter
//!
//! Implements `CompletionPort` against the `models/{model}:generateContent`
//! REST endpoint. Structured requests switch the service into JSON response
//! mode with the request's schema attached; text requests ask for plain text.
//!
//! # Configuration
//!
//! ```rust,ignore
//! let adapter = GeminiAdapter::new(GeminiConfig {
//!     api_key: std::env::var("QUOTE_ASSISTANT_API_KEY")?,
//!     ..Default::default()
//! })?;
//! ```
//!
//! # Error Handling
//!
//! HTTP failures are mapped to `PortError` variants:
//! - 400 -> `PortError::Validation`
//! - 404 -> `PortError::NotFound`
//! - 401/403 -> `PortError::Unauthorized`
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Unreadable or empty payloads -> `PortError::Transformation`
//! - Other -> `PortError::Internal`

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};

use crate::ports::CompletionPort;
use crate::request::CompletionRequest;

const ADAPTER_ID: &str = "gemini-completion-adapter";
const SERVICE_NAME: &str = "gemini";
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, e.g. "https://generativelanguage.googleapis.com/v1beta"
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    config: GeminiConfig,
    client: Client,
}

impl GeminiAdapter {
    pub fn new(config: GeminiConfig) -> Result<Self, PortError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| PortError::Internal {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn generate_url(&self) -> String {
        format!("{}:generateContent", self.model_url())
    }

    fn ensure_key(&self) -> Result<&str, PortError> {
        if self.config.api_key.trim().is_empty() {
            return Err(PortError::Unauthorized {
                message: "assistant API key is not configured".to_string(),
            });
        }
        Ok(&self.config.api_key)
    }

    fn map_transport(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: "generateContent".to_string(),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else if error.is_connect() {
            PortError::Connection {
                message: error.to_string(),
                source: Some(Box::new(error)),
            }
        } else {
            PortError::Internal {
                message: error.to_string(),
                source: Some(Box::new(error)),
            }
        }
    }

    fn map_status(&self, status: StatusCode, retry_after: Option<u64>, body: &str) -> PortError {
        match status.as_u16() {
            400 => PortError::validation(service_message(body)),
            401 | 403 => PortError::Unauthorized {
                message: service_message(body),
            },
            404 => PortError::not_found("model", &self.config.model),
            429 => PortError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            },
            500..=599 => PortError::ServiceUnavailable {
                service: SERVICE_NAME.to_string(),
            },
            code => PortError::internal(format!("unexpected status {code}: {}", service_message(body))),
        }
    }
}

/// Request body in the `generateContent` shape
pub fn request_body(request: &CompletionRequest) -> Value {
    let mut parts = vec![json!({ "text": request.prompt })];
    parts.extend(request.images.iter().map(|image| {
        json!({
            "inlineData": { "mimeType": image.mime_type, "data": image.data }
        })
    }));

    let mut generation_config = json!({ "temperature": request.temperature });
    if let Some(schema) = &request.response_schema {
        generation_config["responseMimeType"] = json!("application/json");
        generation_config["responseSchema"] = schema.clone();
    }

    json!({
        "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": generation_config,
    })
}

/// Pulls the error message out of a service error body when there is one
fn service_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    pub fn into_text(self) -> Result<String, PortError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(PortError::validation(format!("prompt blocked: {reason}")));
        }
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| PortError::transformation("response carried no candidates"))?;
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(PortError::transformation(format!(
                "response carried no text (finish reason: {reason})"
            )));
        }
        Ok(text)
    }
}

impl DomainPort for GeminiAdapter {}

#[async_trait]
impl CompletionPort for GeminiAdapter {
    async fn complete(&self, request: CompletionRequest) -> Result<String, PortError> {
        let api_key = self.ensure_key()?;
        let started = Instant::now();

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key)
            .json(&request_body(&request))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let body = response.text().await.unwrap_or_default();
            let error = self.map_status(status, retry_after, &body);
            warn!(kind = ?request.kind, status = status.as_u16(), error = %error, "Completion request failed");
            return Err(error);
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PortError::transformation(format!("unreadable completion payload: {e}")))?;
        debug!(
            kind = ?request.kind,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completion received"
        );
        payload.into_text()
    }
}

#[async_trait]
impl HealthCheckable for GeminiAdapter {
    /// Fetches the configured model's metadata
    async fn health_check(&self) -> HealthCheckResult {
        let api_key = match self.ensure_key() {
            Ok(key) => key,
            Err(e) => return HealthCheckResult::now(ADAPTER_ID, AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        match self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", api_key)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                HealthCheckResult::now(ADAPTER_ID, AdapterHealth::Healthy, None)
            }
            Ok(response) => HealthCheckResult::now(
                ADAPTER_ID,
                AdapterHealth::Degraded,
                Some(format!("model lookup returned {}", response.status())),
            ),
            Err(e) => HealthCheckResult::now(
                ADAPTER_ID,
                AdapterHealth::Unhealthy,
                Some(self.map_transport(e).to_string()),
            ),
        }
    }
}
