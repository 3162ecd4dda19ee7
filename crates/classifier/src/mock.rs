//! Deterministic provider for tests and offline deployments.
//!
//! Outcomes can be scripted per call; once the script is drained a small
//! heuristic takes over (last numeric token is the amount, earn keywords
//! flip the direction) so a `mock` deployment still behaves sensibly.

use std::collections::VecDeque;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;

use fundmate_core::message::Extraction;
use fundmate_db::models::classifier_log::CreateClassifierLog;
use fundmate_db::repositories::ClassifierLogRepo;

use crate::error::ClassifierError;
use crate::provider::{Classifier, ClassifyRequest};

/// Earn keywords, mirroring the live prompt's rules.
const EARN_KEYWORDS: &[&str] = &["nhận", "thu", "earn", "kiếm"];

/// A scripted outcome for one mock classification.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Extraction(Extraction),
    Failure(String),
}

/// In-process classifier with scripted outcomes and a heuristic fallback.
#[derive(Default)]
pub struct MockClassifier {
    scripted: Mutex<VecDeque<MockOutcome>>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome; scripted outcomes are drained FIFO before the
    /// heuristic kicks in.
    pub async fn push(&self, outcome: MockOutcome) {
        self.scripted.lock().await.push_back(outcome);
    }

    pub async fn push_extraction(&self, extraction: Extraction) {
        self.push(MockOutcome::Extraction(extraction)).await;
    }

    pub async fn push_failure(&self, reason: &str) {
        self.push(MockOutcome::Failure(reason.to_string())).await;
    }

    /// Parse the text the way the prompt tells the real model to: the last
    /// numeric token is the amount, earn keywords flip the direction, and
    /// the remaining words become the content summary.
    fn heuristic(text: &str) -> Result<Extraction, ClassifierError> {
        let mut amount = None;
        let mut content_words: Vec<&str> = Vec::new();

        for token in text.split_whitespace() {
            match token.parse::<f64>() {
                Ok(value) if value.is_finite() => amount = Some(value),
                _ => content_words.push(token),
            }
        }

        let amount = amount.ok_or_else(|| {
            ClassifierError::Contract("no numeric amount in text".to_string())
        })?;

        let lowered = text.to_lowercase();
        let is_earning = EARN_KEYWORDS.iter().any(|k| lowered.contains(k));

        let content = if content_words.is_empty() {
            text.trim().to_string()
        } else {
            content_words.join(" ")
        };

        Ok(Extraction {
            spend_value: (!is_earning).then_some(amount),
            earn_value: is_earning.then_some(amount),
            content,
            category_id: None,
            metadata: None,
        })
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn classify(
        &self,
        pool: &PgPool,
        request: &ClassifyRequest,
    ) -> Result<Extraction, ClassifierError> {
        let scripted = self.scripted.lock().await.pop_front();
        let outcome = match scripted {
            Some(MockOutcome::Extraction(extraction)) => Ok(extraction),
            Some(MockOutcome::Failure(reason)) => Err(ClassifierError::Contract(reason)),
            None => Self::heuristic(&request.text),
        };

        ClassifierLogRepo::create(
            pool,
            &CreateClassifierLog {
                model: "mock".to_string(),
                request: serde_json::json!({ "text": request.text }),
                response: outcome
                    .as_ref()
                    .ok()
                    .and_then(|e| serde_json::to_value(e).ok()),
                error_message: outcome.as_ref().err().map(|e| e.to_string()),
                latency_ms: 0,
                fund_id: request.fund_id,
                message_id: request.message_id,
            },
        )
        .await?;

        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
