use std::collections::HashSet;
use tracing::debug;

use crate::api_types::GroundingChunk;
use crate::models::Source;

pub const PLACEHOLDER_TITLE: &str = "Reference Source";

/// Turn grounding chunks into citation entries: chunks without a uri are
/// dropped, missing titles get a placeholder, and repeated uris keep only
/// their first occurrence.
pub fn dedupe(chunks: &[GroundingChunk]) -> Vec<Source> {
    let candidates = chunks.iter().filter_map(|chunk| {
        let web = chunk.web.as_ref()?;
        let uri = web.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Some(Source {
            title: title_or_placeholder(web.title.as_deref()),
            uri: uri.to_string(),
        })
    });
    let out = dedupe_sources(candidates);
    debug!("Sources extracted - chunks={}, unique={}", chunks.len(), out.len());
    out
}

/// Order-preserving dedup by exact uri.
pub fn dedupe_sources(sources: impl IntoIterator<Item = Source>) -> Vec<Source> {
    let mut seen: HashSet<String> = HashSet::new();
    sources
        .into_iter()
        .filter(|s| !s.uri.is_empty())
        .filter(|s| seen.insert(s.uri.clone()))
        .collect()
}

pub fn title_or_placeholder(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => PLACEHOLDER_TITLE.to_string(),
    }
}
