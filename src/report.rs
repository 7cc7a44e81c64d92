// Structured application errors with correlation ids.
//
// Errors raised anywhere in the app carry a correlation id so the toast that
// reports them can point back into the logs.

use serde::{Deserialize, Serialize};

use crate::toast::ToastOptions;

/// Application error with correlation ID for tracing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Correlation ID for tracing the error across boundaries
    pub correlation_id: String,
    /// Error code (e.g., `HTTP_REQUEST_FAILED`, `INVALID_URL`)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Create a new `AppError` with the given correlation ID, code and message.
    pub fn new(
        correlation_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Text for the toast's copyable details: the code, then any details
    /// pretty-printed.
    pub fn details_text(&self) -> String {
        match &self.details {
            Some(details) => {
                let body = serde_json::to_string_pretty(details)
                    .unwrap_or_else(|_| details.to_string());
                format!("{}\n{}", self.code, body)
            }
            None => self.code.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code, self.correlation_id, self.message
        )
    }
}

impl std::error::Error for AppError {}

impl From<&AppError> for ToastOptions {
    fn from(error: &AppError) -> Self {
        ToastOptions::new(error.message.clone())
            .details(error.details_text())
            .correlation_id(error.correlation_id.clone())
    }
}
