use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::llm_client::LlmError;
use crate::response_validator::ShapeError;
use crate::validation::FieldIssue;

const SUPPORT_MESSAGE: &str = "Please try again or contact support if this persists.";

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Profile failed deserialization or a field constraint.
    Validation(Vec<FieldIssue>),
    /// Missing or incorrect shared secret.
    Unauthorized(String),
    /// Transport-level failure talking to the model provider.
    ProviderUnavailable(String),
    /// The model never produced parseable JSON within the retry budget.
    MalformedModelOutput { attempts: u32, detail: String },
    /// The model's JSON is missing required top-level keys.
    IncompleteModelShape { domain: String, missing: Vec<String> },
    /// Provider credential missing or rejected.
    Configuration(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

/// Uniform error body returned to callers.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
    pub support: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<FieldIssue>>,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(issues) => {
                let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
                write!(f, "Validation error on: {}", fields.join(", "))
            }
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::ProviderUnavailable(msg) => write!(f, "Provider unavailable: {}", msg),
            AppError::MalformedModelOutput { attempts, detail } => write!(
                f,
                "Malformed model output after {} attempt(s): {}",
                attempts, detail
            ),
            AppError::IncompleteModelShape { domain, missing } => write!(
                f,
                "Incomplete {} from model, missing: {}",
                domain,
                missing.join(", ")
            ),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MalformedModelOutput { .. }
            | AppError::IncompleteModelShape { .. }
            | AppError::Configuration(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }

    /// Shorthand for a single-field validation failure.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldIssue::new(field, message)])
    }
}

impl IntoResponse for AppError {
    /// Maps each variant to a status code and the uniform envelope.
    /// Provider and parser detail is logged, never returned.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let envelope = match self {
            AppError::Validation(issues) => {
                tracing::info!("Profile rejected: {} issue(s)", issues.len());
                ErrorEnvelope {
                    error: "Validation failed".to_string(),
                    message: "One or more profile fields are invalid".to_string(),
                    support: "Check the detail list and resubmit the request.".to_string(),
                    detail: Some(issues),
                }
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                ErrorEnvelope {
                    error: "Unauthorized".to_string(),
                    message: "A valid X-API-Key header is required".to_string(),
                    support: SUPPORT_MESSAGE.to_string(),
                    detail: None,
                }
            }
            AppError::ProviderUnavailable(msg) => {
                tracing::error!("AI provider unavailable: {}", msg);
                ErrorEnvelope {
                    error: "AI service temporarily unavailable".to_string(),
                    message: "Please try again in a few seconds".to_string(),
                    support: SUPPORT_MESSAGE.to_string(),
                    detail: None,
                }
            }
            AppError::MalformedModelOutput { attempts, detail } => {
                tracing::error!(
                    "Model output unparseable after {} attempt(s): {}",
                    attempts,
                    detail
                );
                ErrorEnvelope {
                    error: "Malformed AI response".to_string(),
                    message: format!(
                        "The AI service returned invalid JSON after {} attempt(s)",
                        attempts
                    ),
                    support: SUPPORT_MESSAGE.to_string(),
                    detail: None,
                }
            }
            AppError::IncompleteModelShape { domain, missing } => {
                tracing::error!("Incomplete {} from model, missing: {:?}", domain, missing);
                ErrorEnvelope {
                    error: "Incomplete AI response".to_string(),
                    message: format!(
                        "The generated {} is incomplete (missing: {}); generation did not meet the completeness check",
                        domain,
                        missing.join(", ")
                    ),
                    support: SUPPORT_MESSAGE.to_string(),
                    detail: None,
                }
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                ErrorEnvelope {
                    error: "Service misconfigured".to_string(),
                    message: "The AI service is not configured correctly".to_string(),
                    support: SUPPORT_MESSAGE.to_string(),
                    detail: None,
                }
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorEnvelope {
                    error: "Internal server error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                    support: SUPPORT_MESSAGE.to_string(),
                    detail: None,
                }
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                return (*source).into_response();
            }
        };

        (status, Json(envelope)).into_response()
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Configuration(msg) => AppError::Configuration(msg),
            LlmError::Unavailable(msg) => AppError::ProviderUnavailable(msg),
            LlmError::MalformedOutput { attempts, detail } => {
                AppError::MalformedModelOutput { attempts, detail }
            }
        }
    }
}

impl From<ShapeError> for AppError {
    fn from(err: ShapeError) -> Self {
        let mut missing = err.missing_keys;
        if let Some(short) = err.short_list {
            missing.push(format!(
                "{} (expected at least {} entries, got {})",
                short.key, short.expected, short.actual
            ));
        }
        AppError::IncompleteModelShape {
            domain: err.domain.to_string(),
            missing,
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: context.into(),
        })
    }
}
