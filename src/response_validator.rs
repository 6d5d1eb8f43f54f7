//! Shape check for model replies.
//!
//! Purely structural: every required key must be present at the top level
//! and, for list-shaped domains, the listed key must hold enough entries.
//! Nested values are not type-checked. A passing reply is returned unchanged.

use std::fmt;

use crate::llm_client::ModelReply;
use crate::response_schema::ResponseSchema;

/// A list that exists but is shorter than the schema demands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortList {
    pub key: &'static str,
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    pub domain: &'static str,
    pub missing_keys: Vec<String>,
    pub short_list: Option<ShortList>,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "incomplete {}", self.domain)?;
        if !self.missing_keys.is_empty() {
            write!(f, ", missing keys: {}", self.missing_keys.join(", "))?;
        }
        if let Some(short) = &self.short_list {
            write!(
                f,
                ", '{}' has {} entries (expected at least {})",
                short.key, short.actual, short.expected
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ShapeError {}

/// Returns the reply untouched if it satisfies `schema`.
pub fn validate_shape(reply: ModelReply, schema: &ResponseSchema) -> Result<ModelReply, ShapeError> {
    let body = reply.body();

    let missing_keys: Vec<String> = schema
        .required_keys
        .iter()
        .filter(|key| !body.contains_key(**key))
        .map(|key| key.to_string())
        .collect();

    let short_list = schema.min_items.and_then(|minimum| {
        // A missing key is already reported above
        let value = body.get(minimum.key)?;
        let actual = value.as_array().map(Vec::len).unwrap_or(0);
        (actual < minimum.min).then_some(ShortList {
            key: minimum.key,
            expected: minimum.min,
            actual,
        })
    });

    if missing_keys.is_empty() && short_list.is_none() {
        tracing::debug!("Model reply passed {} shape check", schema.domain);
        return Ok(reply);
    }

    let err = ShapeError {
        domain: schema.domain,
        missing_keys,
        short_list,
    };
    tracing::warn!("Model reply failed shape check: {}", err);
    Err(err)
}
