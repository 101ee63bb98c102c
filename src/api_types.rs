//! Wire types for the Gemini `generateContent` endpoint.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ApiGenerateRequest {
    pub contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ApiTool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>, // "user" | "model"
    #[serde(default)]
    pub parts: Vec<ApiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiTool {
    pub google_search: ApiGoogleSearch,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ApiGoogleSearch {}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiGenerateResponse {
    #[serde(default)]
    pub candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiCandidate {
    #[serde(default)]
    pub content: Option<ApiContent>,
    #[serde(default)]
    pub grounding_metadata: Option<ApiGroundingMetadata>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// One citation entry from grounding metadata; every field may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GroundingChunk {
    pub fn web(uri: &str, title: Option<&str>) -> Self {
        Self {
            web: Some(WebChunk {
                uri: Some(uri.to_string()),
                title: title.map(str::to_string),
            }),
        }
    }
}

impl ApiGenerateResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    pub fn grounding_chunks(&self) -> Vec<GroundingChunk> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|g| g.grounding_chunks.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_and_chunks() {
        let raw = r#"{
          "candidates": [{
            "content": {"role": "model", "parts": [{"text": "Sure: "}, {"text": "{\"a\":1}"}]},
            "groundingMetadata": {
              "groundingChunks": [
                {"web": {"uri": "https://a.example", "title": "A"}},
                {"web": {"title": "no uri"}},
                {}
              ]
            }
          }]
        }"#;
        let resp: ApiGenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.text(), "Sure: {\"a\":1}");
        let chunks = resp.grounding_chunks();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], GroundingChunk::web("https://a.example", Some("A")));
        assert!(chunks[2].web.is_none());
    }

    #[test]
    fn test_empty_response() {
        let resp: ApiGenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.text(), "");
        assert!(resp.grounding_chunks().is_empty());
    }

    #[test]
    fn test_request_serialises_search_tool() {
        let req = ApiGenerateRequest {
            contents: vec![ApiContent {
                role: Some("user".into()),
                parts: vec![ApiPart {
                    text: Some("hi".into()),
                }],
            }],
            tools: vec![ApiTool {
                google_search: ApiGoogleSearch::default(),
            }],
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["tools"][0]["google_search"], serde_json::json!({}));
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
    }
}
