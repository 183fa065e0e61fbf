//! Summary text extraction from heterogeneous webhook response bodies.
//!
//! The webhook answers with different shapes depending on how its flow is
//! configured. Extractors are tried in order and the first one that selects a
//! non-null value wins. The selected value must be a string. When nothing is
//! selected, the whole body is rendered as JSON text.

use serde_json::Value;

use crate::webhook::WebhookError;

/// Picks the value that carries the summary, if this shape is present.
pub type Extractor = fn(&Value) -> Option<&Value>;

/// Ordered by priority.
pub const SUMMARY_EXTRACTORS: &[(&str, Extractor)] = &[
    ("summary_field", summary_field),
    ("message_field", message_field),
    ("bare_string", bare_string),
];

pub const RAW_JSON_SOURCE: &str = "raw_json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSummary {
    pub source: &'static str,
    pub text: String,
}

pub fn extract_summary(body: &Value) -> Result<ExtractedSummary, WebhookError> {
    let Some((source, selected)) = SUMMARY_EXTRACTORS
        .iter()
        .find_map(|&(source, extractor)| extractor(body).map(|value| (source, value)))
    else {
        return Ok(ExtractedSummary {
            source: RAW_JSON_SOURCE,
            text: body.to_string(),
        });
    };
    match selected.as_str() {
        Some(text) => Ok(ExtractedSummary {
            source,
            text: text.to_owned(),
        }),
        None => Err(WebhookError::UnexpectedShape { extractor: source }),
    }
}

fn present_field<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|value| !value.is_null())
}

fn summary_field(body: &Value) -> Option<&Value> {
    present_field(body, "summary")
}

fn message_field(body: &Value) -> Option<&Value> {
    present_field(body, "message")
}

fn bare_string(body: &Value) -> Option<&Value> {
    body.is_string().then_some(body)
}
