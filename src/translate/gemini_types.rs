//! Wire types for the Gemini `generateContent` API.
//!
//! These cover the request we send to Gemini and the response it sends back.
//! Only the fields the relay reads or forwards are modelled.

use serde::{Deserialize, Serialize};

/// Finish reason Gemini reports when the model emitted a tool call it could not parse.
pub const FINISH_MALFORMED_FUNCTION_CALL: &str = "MALFORMED_FUNCTION_CALL";

// ---------------------------------------------------------------------------
// Request types (what we send TO Gemini)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<GeminiFunctionCall>,
    /// Opaque continuation token; forwarded, never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiFunctionCall {
    #[serde(default)]
    pub name: String,
    /// Carried through as-is; `null` or a non-object must not fail the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

impl GeminiContent {
    /// A content entry holding a single text part.
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            parts: vec![GeminiPart::text(text)],
        }
    }
}

impl GeminiPart {
    /// A text part. Empty text is left unset, so it serializes as `{}`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()).filter(|t| !t.is_empty()),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Response types (what Gemini sends BACK)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: GeminiContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_message: Option<String>,
}

impl Candidate {
    pub fn finished_with_malformed_call(&self) -> bool {
        self.finish_reason.as_deref() == Some(FINISH_MALFORMED_FUNCTION_CALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_without_empty_fields() {
        let req = GeminiRequest {
            contents: vec![GeminiContent::text("user", "hi")],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn test_response_with_function_call_and_signature() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {
                            "functionCall": {"name": "lookup", "args": {"q": "rust"}},
                            "thoughtSignature": "c2ln"
                        },
                        {"text": "done"}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 12}
        }"#;
        let resp: GeminiResponse = serde_json::from_str(body).unwrap();
        let candidate = &resp.candidates[0];
        let call = candidate.content.parts[0].function_call.as_ref().unwrap();
        assert_eq!(call.name, "lookup");
        assert_eq!(call.args.as_ref().unwrap()["q"], "rust");
        assert_eq!(candidate.content.parts[0].thought_signature.as_deref(), Some("c2ln"));
        assert_eq!(candidate.content.parts[1].text.as_deref(), Some("done"));
        assert!(!candidate.finished_with_malformed_call());
    }

    #[test]
    fn test_malformed_call_candidate() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{},"finishReason":"MALFORMED_FUNCTION_CALL",
                "finishMessage":"Malformed function call: x"}]}"#,
        )
        .unwrap();
        assert!(resp.candidates[0].finished_with_malformed_call());
        assert!(resp.candidates[0].content.parts.is_empty());
    }

    #[test]
    fn test_empty_text_part_serializes_as_empty_object() {
        let req = GeminiRequest {
            contents: vec![GeminiContent::text("user", "")],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contents": [{"role": "user", "parts": [{}]}]})
        );
    }

    #[test]
    fn test_loose_function_call_does_not_fail_response() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[
            {"functionCall":{"name":"f","args":null}},
            {"functionCall":{"args":[1,2]}},
            {"text":"hi"}
        ]}}]}"#;
        let resp: GeminiResponse = serde_json::from_str(body).unwrap();
        let parts = &resp.candidates[0].content.parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].function_call.as_ref().unwrap().name, "f");
        assert!(parts[0].function_call.as_ref().unwrap().args.is_none());
        assert_eq!(parts[1].function_call.as_ref().unwrap().name, "");
        assert_eq!(parts[2].text.as_deref(), Some("hi"));
    }
}
