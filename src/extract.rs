//! Locating the report object inside free-form generator text.
//!
//! Generators wrap JSON in prose, markdown fences or trailing remarks even
//! when told not to. Candidates are tried in this order:
//! 1. the first `{` from which a complete object parses and carries a known
//!    report key
//! 2. the first `{` from which any complete object parses
//! 3. the span from the first `{` to the last `}` (may still fail to decode)
//!
//! When there is no brace pair at all the caller gets `"{}"`, so the
//! normalizer still runs and decides whether that is a terminal failure.

use serde_json::{Deserializer, Value};
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::normalize::REPORT_KEYS;

pub const EMPTY_OBJECT: &str = "{}";

/// Candidate JSON substring, or `ExtractionError` if no `{ ... }` span exists.
pub fn extract(raw: &str) -> Result<&str, ExtractionError> {
    let starts: Vec<usize> = raw.match_indices('{').map(|(i, _)| i).collect();

    if let Some(span) = first_parsing_object(raw, &starts, true) {
        return Ok(span);
    }
    if let Some(span) = first_parsing_object(raw, &starts, false) {
        debug!("Extraction - parsed object without report keys, len={}", span.len());
        return Ok(span);
    }
    brace_span(raw).ok_or(ExtractionError::NoJsonObject(raw.chars().count()))
}

/// Like `extract`, but falls back to `"{}"` instead of failing.
pub fn extract_or_empty(raw: &str) -> &str {
    match extract(raw) {
        Ok(span) => span,
        Err(e) => {
            warn!("Extraction fallback - {}", e);
            EMPTY_OBJECT
        }
    }
}

/// First `{` to last `}` inclusive.
pub fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

// Re-parses from every `{`, so brace-heavy unbalanced text costs O(n²);
// generator replies are small enough for that to be fine.
fn first_parsing_object<'a>(raw: &'a str, starts: &[usize], require_schema: bool) -> Option<&'a str> {
    for &start in starts {
        let tail = &raw[start..];
        let mut stream = Deserializer::from_str(tail).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next() {
            if require_schema && !REPORT_KEYS.iter().any(|k| map.contains_key(*k)) {
                continue;
            }
            return Some(&tail[..stream.byte_offset()]);
        }
    }
    None
}
