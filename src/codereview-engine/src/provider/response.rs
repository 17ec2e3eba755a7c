//! Response-shape normalization.
//!
//! Providers answer with differently shaped JSON. Each known shape is a variant
//! with its own extractor; [`ResponseShape::classify`] picks the variant by
//! looking at which fields are present.

use serde_json::{Map, Value};

/// Text fields tried, in order, on candidate objects.
const TEXT_FIELDS: &[&str] = &["generated_text", "text"];

/// Known response layouts.
#[derive(Debug, Clone, Copy)]
pub enum ResponseShape<'a> {
    /// `{"choices": [{"message": {"content": ...}}]}`
    ChatChoices(&'a [Value]),
    /// `{"content": [{"type": "text", "text": ...}]}`
    ContentBlocks(&'a [Value]),
    /// `[{"generated_text": ...}, ...]`
    CandidateList(&'a [Value]),
    /// `{"generated_text": ...}` or `{"text": ...}`
    Object(&'a Map<String, Value>),
    /// Anything else.
    Unknown(&'a Value),
}

impl<'a> ResponseShape<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Self::CandidateList(items),
            Value::Object(map) => match (map.get("choices"), map.get("content")) {
                (Some(Value::Array(choices)), _) => Self::ChatChoices(choices),
                (_, Some(Value::Array(blocks))) => Self::ContentBlocks(blocks),
                _ => Self::Object(map),
            },
            other => Self::Unknown(other),
        }
    }

    /// Extract the generated text, if this shape carries any.
    pub fn extract(&self) -> Option<&'a str> {
        match *self {
            Self::ChatChoices(choices) => choices
                .first()
                .and_then(|c| c.get("message"))
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str),
            Self::ContentBlocks(blocks) => blocks
                .iter()
                .find_map(|b| b.get("text").and_then(Value::as_str)),
            Self::CandidateList(items) => items
                .first()
                .and_then(Value::as_object)
                .and_then(text_field),
            Self::Object(map) => text_field(map),
            Self::Unknown(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatChoices(_) => "chat_choices",
            Self::ContentBlocks(_) => "content_blocks",
            Self::CandidateList(_) => "candidate_list",
            Self::Object(_) => "object",
            Self::Unknown(_) => "unknown",
        }
    }
}

fn text_field(map: &Map<String, Value>) -> Option<&str> {
    TEXT_FIELDS
        .iter()
        .find_map(|field| map.get(*field).and_then(Value::as_str))
}

/// Extract review text from a successful response body.
///
/// Blank text is never returned. With `raw_fallback` a payload that has no
/// known text field at all is returned serialized, so an unrecognized 2xx body
/// still yields something.
pub fn extract_text(value: &Value, raw_fallback: bool) -> Option<String> {
    let shape = ResponseShape::classify(value);

    match shape.extract() {
        Some(text) if text.trim().is_empty() => {
            tracing::debug!(shape = shape.name(), "Response text is blank");
            None
        }
        Some(text) => Some(text.to_string()),
        None if raw_fallback => {
            tracing::debug!(shape = shape.name(), "No text field found, using raw payload");
            Some(value.to_string())
        }
        None => None,
    }
}
