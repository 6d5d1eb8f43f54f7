//! Declarative profile validation.
//!
//! Profiles are deserialized by serde (types, enumerations, defaults) and then
//! checked by their [`Validate`] impl (ranges, list sizes, cross-field rules).
//! Every failing field is reported, not only the first one.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::errors::AppError;

/// Maximum number of entries in a free-text list field.
pub const MAX_LIST_ENTRIES: usize = 10;
/// Maximum length of a single free-text entry.
pub const MAX_TEXT_LEN: usize = 100;

/// One offending field and why it was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Constraint checks run after deserialization.
pub trait Validate {
    /// Keys that must be present in the request body.
    const REQUIRED_FIELDS: &'static [&'static str] = &[];

    fn validate(&self) -> Result<(), Vec<FieldIssue>>;
}

/// Accumulates issues while a profile is being checked.
#[derive(Debug, Default)]
pub struct Issues(Vec<FieldIssue>);

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldIssue::new(field, message));
    }

    pub fn check_range<T>(&mut self, field: &str, value: T, min: T, max: T)
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            self.push(
                field,
                format!("must be between {} and {} (got {})", min, max, value),
            );
        }
    }

    /// Finite check first so NaN and infinities never pass a range test.
    pub fn check_measure(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
            return;
        }
        self.check_range(field, value, min, max);
    }

    pub fn check_text_list(&mut self, field: &str, values: &[String]) {
        if values.len() > MAX_LIST_ENTRIES {
            self.push(
                field,
                format!("must contain at most {} entries", MAX_LIST_ENTRIES),
            );
        }
        for (idx, value) in values.iter().enumerate() {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                self.push(&format!("{}[{}]", field, idx), "must not be empty");
            } else if trimmed.chars().count() > MAX_TEXT_LEN {
                self.push(
                    &format!("{}[{}]", field, idx),
                    format!("must be at most {} characters", MAX_TEXT_LEN),
                );
            }
        }
    }

    pub fn finish(self) -> Result<(), Vec<FieldIssue>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

/// JSON body extractor that also runs [`Validate`].
///
/// Both serde rejections and constraint failures become
/// [`AppError::Validation`], so a bad profile is always answered with 422.
/// Every absent required key is reported, and a wrongly typed value is
/// reported under its own path.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(rejection_to_issue)?;

        let missing = missing_fields(&raw, T::REQUIRED_FIELDS);
        if !missing.is_empty() {
            return Err(AppError::Validation(missing));
        }

        let value: T = serde_path_to_error::deserialize(raw).map_err(|err| {
            let path = err.path().to_string();
            let field = if path == "." { "body".to_string() } else { path };
            AppError::invalid_field(field, err.into_inner().to_string())
        })?;
        value.validate().map_err(AppError::Validation)?;
        Ok(Self(value))
    }
}

fn rejection_to_issue(rejection: JsonRejection) -> AppError {
    let field = match &rejection {
        JsonRejection::MissingJsonContentType(_) => "content-type",
        _ => "body",
    };
    AppError::invalid_field(field, rejection.body_text())
}

/// Required keys absent from (or null in) a JSON object body.
fn missing_fields(body: &Value, required: &[&str]) -> Vec<FieldIssue> {
    let Value::Object(map) = body else {
        return Vec::new();
    };
    required
        .iter()
        .filter(|key| map.get(**key).map_or(true, Value::is_null))
        .map(|key| FieldIssue::new(*key, "field required"))
        .collect()
}
