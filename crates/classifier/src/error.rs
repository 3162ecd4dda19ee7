//! Error types for classifier providers.

/// Errors from a classifier invocation.
///
/// Callers treat every variant the same way at the message level (the
/// message fails with the error as its reason); the split exists for
/// logging and for tests.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The provider is missing required configuration.
    #[error("Classifier is not configured: {0}")]
    NotConfigured(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Classifier API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider response carried no usable text.
    #[error("Classifier returned an empty response")]
    EmptyResponse,

    /// The model output could not be parsed as JSON.
    #[error("Classifier output is not valid JSON: {snippet}")]
    MalformedOutput {
        /// Truncated start of the offending text.
        snippet: String,
    },

    /// The output parsed, but violates the extraction contract.
    #[error("Classifier output violates the extraction contract: {0}")]
    Contract(String),

    /// Writing the audit log failed.
    #[error("Classifier log write failed: {0}")]
    Database(#[from] sqlx::Error),
}
