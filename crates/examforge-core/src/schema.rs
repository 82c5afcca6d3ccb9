//! Structured-output coercion.
//!
//! A model reply is trusted only after it has been pulled out of whatever
//! prose or markdown surrounds it, deserialized into the target type, and
//! checked by [`Validate`]. Any failure along the way is a
//! [`ExamError::SchemaViolation`].

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ExamError;
use crate::model::{EvaluationResults, Questions};

/// Name plus JSON schema of an output contract, as sent to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    /// Schema name (e.g. "Questions").
    pub name: String,
    /// JSON schema document.
    pub schema: serde_json::Value,
}

/// A type the model can be asked to produce.
pub trait StructuredOutput: DeserializeOwned + JsonSchema + Validate {
    /// Name used in schema-violation errors and provider requests.
    const NAME: &'static str;

    /// The schema to attach to the provider request.
    fn response_schema() -> ResponseSchema {
        let schema = schemars::schema_for!(Self);
        ResponseSchema {
            name: Self::NAME.to_string(),
            schema: serde_json::to_value(schema).unwrap_or_default(),
        }
    }
}

/// Checks on a deserialized reply that the type system cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl StructuredOutput for Questions {
    const NAME: &'static str = "Questions";
}

impl Validate for Questions {
    fn validate(&self) -> Result<(), String> {
        if let Some(pos) = self
            .questions
            .iter()
            .position(|q| q.question_text.trim().is_empty())
        {
            return Err(format!("question {} has empty question_text", pos + 1));
        }
        if self.checked_total_marks().is_none() {
            return Err("total marks do not fit in 32 bits".to_string());
        }
        Ok(())
    }
}

impl StructuredOutput for EvaluationResults {
    const NAME: &'static str = "EvaluationResults";
}

impl Validate for EvaluationResults {
    fn validate(&self) -> Result<(), String> {
        if self.checked_total_obtained().is_none() {
            return Err("total marks obtained do not fit in 32 bits".to_string());
        }
        Ok(())
    }
}

/// Coerce a raw model reply into `T`.
pub fn coerce<T: StructuredOutput>(content: &str) -> Result<T, ExamError> {
    let payload = extract_json_payload(content);
    let value: T = serde_json::from_str(payload).map_err(|e| ExamError::SchemaViolation {
        schema: T::NAME,
        reason: e.to_string(),
    })?;
    value.validate().map_err(|reason| ExamError::SchemaViolation {
        schema: T::NAME,
        reason,
    })?;
    Ok(value)
}

/// Find the JSON document inside a model reply.
///
/// Handles:
/// - A ```json fenced block (the first one wins)
/// - A generic ``` fenced block
/// - Bare JSON surrounded by prose (outermost `{` … `}`)
/// - Anything else is returned trimmed, and left for serde to reject
pub fn extract_json_payload(response: &str) -> &str {
    if let Some(block) = fenced_block(response, |lang| lang == "json") {
        return block;
    }
    if let Some(block) = fenced_block(response, str::is_empty) {
        return block;
    }
    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => response.trim(),
    }
}

fn fenced_block(response: &str, accept: impl Fn(&str) -> bool) -> Option<&str> {
    let mut rest = response;
    while let Some(open) = rest.find("```") {
        let after_ticks = &rest[open + 3..];
        let line_end = after_ticks.find('\n')?;
        let lang = after_ticks[..line_end].trim().to_lowercase();
        let body = &after_ticks[line_end + 1..];
        // Unclosed fences (truncated replies) run to the end.
        let close = body.find("```").unwrap_or(body.len());
        if accept(lang.as_str()) {
            return Some(body[..close].trim());
        }
        rest = body.get(close + 3..).unwrap_or("");
    }
    None
}
