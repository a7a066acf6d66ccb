//! Structured reply recovery: pulls the JSON object a model embeds in its
//! answer, whether the whole reply is JSON or the JSON sits in a
//! ```` ```json ```` fenced block after some prose.
//!
//! Applied identically to every provider. Never fails: when nothing parses,
//! the reply is returned as plain text with [`StructuredData::Unparsed`].

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Opening fence tag, inner content, closing fence. Non-greedy across lines.
const FENCED_JSON: &str = r"(?s)```json\n?(.*?)```";

static FENCED_JSON_RE: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn fenced_json_re() -> &'static Regex {
    FENCED_JSON_RE.get_or_init(|| Regex::new(FENCED_JSON).expect("static fence pattern must compile"))
}

/// Result of looking for a JSON object in model output.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredData {
    Parsed(Map<String, Value>),
    Unparsed,
}

impl StructuredData {
    pub fn is_parsed(&self) -> bool {
        matches!(self, StructuredData::Parsed(_))
    }

    #[cfg(test)]
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            StructuredData::Parsed(obj) => Some(obj),
            StructuredData::Unparsed => None,
        }
    }

    /// Wire form: `Some(object)` or `None` (serialized as `null`).
    pub fn into_option(self) -> Option<Map<String, Value>> {
        match self {
            StructuredData::Parsed(obj) => Some(obj),
            StructuredData::Unparsed => None,
        }
    }
}

/// Plain-text portion of a reply paired with any recovered JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredReply {
    pub assistant_text: String,
    pub structured: StructuredData,
}

/// Splits raw model output into display text and structured data.
///
/// 1. Whole text is a JSON object → parsed, text unchanged.
/// 2. First ```` ```json ```` block holds a JSON object → parsed, every json
///    block removed from the text and the remainder trimmed.
/// 3. Otherwise unparsed, text unchanged.
pub fn parse_reply(raw: &str) -> StructuredReply {
    if let Some(obj) = parse_object(raw) {
        return StructuredReply {
            assistant_text: raw.to_string(),
            structured: StructuredData::Parsed(obj),
        };
    }

    let first_inner = fenced_json_re()
        .captures(raw)
        .and_then(|caps| caps.get(1));
    if let Some(obj) = first_inner.and_then(|inner| parse_object(inner.as_str())) {
        // Every json fence is stripped from the display text, not just the parsed one.
        let text = fenced_json_re().replace_all(raw, "");
        return StructuredReply {
            assistant_text: text.trim().to_string(),
            structured: StructuredData::Parsed(obj),
        };
    }

    unparsed(raw)
}

fn unparsed(raw: &str) -> StructuredReply {
    StructuredReply {
        assistant_text: raw.to_string(),
        structured: StructuredData::Unparsed,
    }
}

/// Parses `text` as JSON and keeps it only when it is an object.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}
