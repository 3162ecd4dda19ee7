//! Parsing of model output into an [`Extraction`].
//!
//! The model is told to return bare JSON but in practice wraps it in prose
//! or markdown fences, so the object is cut out of the surrounding text
//! before deserializing. Anything that still fails to parse is reported
//! with a truncated snippet rather than the full (possibly huge) output.

use serde::Deserialize;
use serde_json::Value;

use fundmate_core::message::Extraction;
use fundmate_core::types::DbId;

use crate::error::ClassifierError;

/// Maximum characters of model output quoted in a parse error.
const SNIPPET_LEN: usize = 120;

/// The model's own JSON shape, before coercion. Older prompt revisions used
/// `spend`/`earn`, kept as aliases.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(default, alias = "spend")]
    spend_value: Option<Value>,
    #[serde(default, alias = "earn")]
    earn_value: Option<Value>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    category_id: Option<Value>,
    #[serde(default)]
    metadata: Option<Value>,
}

/// Drill the generated text out of the provider's response envelope.
pub fn response_text(raw: &Value) -> Option<&str> {
    raw.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

/// Slice the first `{` .. last `}` span out of the text. Falls back to the
/// whole text when no braces are found so the JSON parser produces the
/// error message.
pub fn extract_json(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Parse model output text into an [`Extraction`], enforcing the contract:
/// at most one amount, a non-empty content summary, and a category id
/// drawn from the offered set (anything else is dropped to null).
pub fn parse_payload(text: &str, offered: &[DbId]) -> Result<Extraction, ClassifierError> {
    let json_str = extract_json(text);
    let raw: RawPayload =
        serde_json::from_str(json_str).map_err(|_| ClassifierError::MalformedOutput {
            snippet: snippet(text),
        })?;

    let spend_value = raw.spend_value.as_ref().and_then(to_number);
    let earn_value = raw.earn_value.as_ref().and_then(to_number);
    if spend_value.is_some() && earn_value.is_some() {
        return Err(ClassifierError::Contract(
            "both spendValue and earnValue are set".to_string(),
        ));
    }

    let content = raw
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ClassifierError::Contract("missing content".to_string()))?
        .to_string();

    let category_id = raw.category_id.as_ref().and_then(to_id).and_then(|id| {
        if offered.contains(&id) {
            Some(id)
        } else {
            tracing::warn!(category_id = id, "classifier picked an unoffered category, dropping");
            None
        }
    });

    let metadata = raw.metadata.filter(|m| !m.is_null());

    Ok(Extraction {
        spend_value,
        earn_value,
        content,
        category_id,
        metadata,
    })
}

/// Coerce a JSON value to a finite number, tolerating numeric strings.
fn to_number(value: &Value) -> Option<f64> {
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    numeric.filter(|n| n.is_finite())
}

/// Coerce a JSON value to a database id, tolerating numeric strings.
fn to_id(value: &Value) -> Option<DbId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<DbId>().ok(),
        _ => None,
    }
}

/// Truncate model output for an error message, on a char boundary.
fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_LEN {
        text.to_string()
    } else {
        text.chars().take(SNIPPET_LEN).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
