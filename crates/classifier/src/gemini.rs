//! Gemini-shaped REST provider.
//!
//! Wraps the `models/{model}:{method}` generateContent endpoint using
//! [`reqwest`], with the request timeout bounding the whole call so a slow
//! provider can never hang ingestion.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::PgPool;

use fundmate_core::message::Extraction;
use fundmate_core::types::DbId;
use fundmate_db::models::classifier_log::CreateClassifierLog;
use fundmate_db::repositories::ClassifierLogRepo;

use crate::error::ClassifierError;
use crate::payload;
use crate::prompt;
use crate::provider::{Classifier, ClassifyRequest};

/// Default public Gemini endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_API_VERSION: &str = "v1beta";
const DEFAULT_METHOD: &str = "generateContent";
/// Default bound on the whole outbound call, in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base HTTP URL, e.g. `https://generativelanguage.googleapis.com`.
    pub base_url: String,
    /// API key sent via the `X-goog-api-key` header.
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// API version path segment, e.g. `v1`.
    pub api_version: String,
    /// Invocation method, e.g. `generateContent`.
    pub method: String,
    /// Upper bound on the whole HTTP call.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Load configuration from `CLASSIFIER_*` environment variables.
    ///
    /// Every field except the API key has a default; a missing key is left
    /// empty here and rejected by [`GeminiClassifier::new`].
    pub fn from_env() -> Self {
        let timeout_ms: u64 = std::env::var("CLASSIFIER_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            base_url: std::env::var("CLASSIFIER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("CLASSIFIER_API_KEY").unwrap_or_default(),
            model: std::env::var("CLASSIFIER_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_version: std::env::var("CLASSIFIER_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            method: std::env::var("CLASSIFIER_METHOD")
                .unwrap_or_else(|_| DEFAULT_METHOD.to_string()),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

/// HTTP client for the Gemini API.
pub struct GeminiClassifier {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClassifier {
    /// Create a new provider client.
    ///
    /// Fails when the base URL or API key is missing so a misconfigured
    /// deployment is caught at startup, not on the first message.
    pub fn new(config: GeminiConfig) -> Result<Self, ClassifierError> {
        if config.base_url.is_empty() || config.api_key.is_empty() {
            return Err(ClassifierError::NotConfigured(
                "classifier base URL and API key are required".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version,
            self.config.model,
            self.config.method
        )
    }

    /// Issue the POST and return the raw response JSON.
    async fn call(&self, body: &serde_json::Value) -> Result<serde_json::Value, ClassifierError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("X-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn classify(
        &self,
        pool: &PgPool,
        request: &ClassifyRequest,
    ) -> Result<Extraction, ClassifierError> {
        let instruction = prompt::build_prompt(&request.text, &request.categories);
        let body = prompt::build_request_body(&instruction);
        let offered: Vec<DbId> = request.categories.iter().map(|c| c.id).collect();

        let started = Instant::now();
        let outcome = self.call(&body).await;
        let latency_ms = started.elapsed().as_millis() as i64;

        match outcome {
            Ok(raw) => {
                let parsed = payload::response_text(&raw)
                    .ok_or(ClassifierError::EmptyResponse)
                    .and_then(|text| payload::parse_payload(text, &offered));

                if let Err(err) = &parsed {
                    tracing::error!(error = %err, latency_ms, "classifier output rejected");
                } else {
                    tracing::debug!(latency_ms, "classifier call succeeded");
                }

                ClassifierLogRepo::create(
                    pool,
                    &CreateClassifierLog {
                        model: self.config.model.clone(),
                        request: body,
                        response: Some(raw),
                        error_message: parsed.as_ref().err().map(|e| e.to_string()),
                        latency_ms,
                        fund_id: request.fund_id,
                        message_id: request.message_id,
                    },
                )
                .await?;

                parsed
            }
            Err(err) => {
                tracing::error!(error = %err, latency_ms, "classifier call failed");

                ClassifierLogRepo::create(
                    pool,
                    &CreateClassifierLog {
                        model: self.config.model.clone(),
                        request: body,
                        response: None,
                        error_message: Some(err.to_string()),
                        latency_ms,
                        fund_id: request.fund_id,
                        message_id: request.message_id,
                    },
                )
                .await?;

                Err(err)
            }
        }
    }
}
