//! Translate Gemini responses back into the caller's response shape.

use serde::Serialize;

use super::anthropic_types::{ErrorResponse, MessagesResponse};
use super::gemini_types::{Candidate, GeminiResponse};
use super::openai_types::{ChatCompletionResponse, ChatErrorResponse};
use crate::error::{RelayError, Result};

const MALFORMED_CALL_PREFIX: &str = "Malformed function call: ";

/// Which envelope the caller expects, chosen from the inbound request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Anthropic Messages (`/messages` anywhere in the path).
    Messages,
    /// OpenAI Chat Completions (everything else).
    ChatCompletion,
}

impl ResponseShape {
    pub fn from_path(path: &str) -> Self {
        if path.contains("/messages") {
            Self::Messages
        } else {
            Self::ChatCompletion
        }
    }

    pub fn error_body(self, error_type: &str, message: impl Into<String>) -> CallerError {
        match self {
            Self::Messages => CallerError::Messages(ErrorResponse::new(error_type, message)),
            Self::ChatCompletion => {
                CallerError::ChatCompletion(ChatErrorResponse::new(error_type, message))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CallerResponse {
    Messages(MessagesResponse),
    ChatCompletion(ChatCompletionResponse),
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CallerError {
    Messages(ErrorResponse),
    ChatCompletion(ChatErrorResponse),
}

/// Translate a Gemini response into the caller's envelope.
/// `created` is the Unix timestamp (seconds) used for the id and `created` field.
pub fn gemini_to_caller(
    resp: &GeminiResponse,
    shape: ResponseShape,
    model: &str,
    created: i64,
) -> Result<CallerResponse> {
    let text = response_text(resp)?;
    Ok(build_response(shape, model, text, created))
}

/// Best-effort answer text from the first candidate.
///
/// Falls back to the finish message when Gemini aborted on a malformed
/// function call and produced no parts.
pub fn response_text(resp: &GeminiResponse) -> Result<String> {
    let candidate = resp.candidates.first().ok_or(RelayError::NoCandidates)?;

    let mut text = candidate_text(candidate);

    if text.is_empty() && candidate.finished_with_malformed_call() {
        if let Some(message) = candidate.finish_message.as_deref().filter(|m| !m.is_empty()) {
            text = recover_malformed_call(message);
        }
    }

    if text.is_empty() {
        return Err(RelayError::EmptyContent);
    }
    Ok(text)
}

/// Concatenation of every non-empty text part, in order.
pub fn candidate_text(candidate: &Candidate) -> String {
    candidate
        .content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Recover prose from a `MALFORMED_FUNCTION_CALL` finish message.
///
/// The model tends to emit a hallucinated call such as `call_foo({...})`
/// followed by the answer it meant to give. Everything up to and including the
/// first `})` is dropped, falling back to the first `}` and then the first `)`.
/// Prose that itself contains one of these markers gets truncated.
pub fn recover_malformed_call(finish_message: &str) -> String {
    let message = finish_message
        .strip_prefix(MALFORMED_CALL_PREFIX)
        .unwrap_or(finish_message);

    let remainder = ["})", "}", ")"]
        .iter()
        .find_map(|marker| message.find(marker).map(|idx| &message[idx + marker.len()..]))
        .unwrap_or(message);

    remainder.trim().to_string()
}

pub fn build_response(
    shape: ResponseShape,
    model: &str,
    text: String,
    created: i64,
) -> CallerResponse {
    match shape {
        ResponseShape::Messages => {
            CallerResponse::Messages(MessagesResponse::new(format!("ant-{created}"), model, text))
        }
        ResponseShape::ChatCompletion => CallerResponse::ChatCompletion(
            ChatCompletionResponse::new(format!("chatcmpl-{created}"), created, model, text),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::gemini_types::{GeminiContent, GeminiPart};

    fn candidate(parts: Vec<GeminiPart>, reason: Option<&str>, message: Option<&str>) -> Candidate {
        Candidate {
            content: GeminiContent {
                role: Some("model".to_string()),
                parts,
            },
            finish_reason: reason.map(str::to_string),
            finish_message: message.map(str::to_string),
        }
    }

    fn response(candidates: Vec<Candidate>) -> GeminiResponse {
        GeminiResponse { candidates }
    }

    #[test]
    fn test_recover_strips_prefix_and_call() {
        let recovered = recover_malformed_call(
            "Malformed function call: call_foo({\"a\":1}) some trailing text",
        );
        assert_eq!(recovered, "some trailing text");
    }

    #[test]
    fn test_recover_marker_priority() {
        // "})" wins over an earlier lone ")".
        assert_eq!(recover_malformed_call("a) b}) c"), "c");
        // "}" wins over an earlier ")".
        assert_eq!(recover_malformed_call("f(x) {y} z"), "z");
        assert_eq!(recover_malformed_call("print(1)  done "), "done");
    }

    #[test]
    fn test_recover_without_markers() {
        assert_eq!(
            recover_malformed_call("Malformed function call:plain answer  "),
            "Malformed function call:plain answer"
        );
        assert_eq!(
            recover_malformed_call("Malformed function call: plain answer"),
            "plain answer"
        );
    }

    #[test]
    fn test_recover_truncates_prose_with_markers() {
        assert_eq!(
            recover_malformed_call("Malformed function call: The set {1, 2} is small"),
            "is small"
        );
    }

    #[test]
    fn test_primary_text_concatenated() {
        let parts = vec![
            GeminiPart::text("Hello"),
            GeminiPart {
                text: Some(String::new()),
                ..Default::default()
            },
            GeminiPart::default(),
            GeminiPart::text(", world"),
        ];
        let resp = response(vec![candidate(parts, Some("STOP"), None)]);
        assert_eq!(response_text(&resp).unwrap(), "Hello, world");
    }

    #[test]
    fn test_only_first_candidate_consulted() {
        let resp = response(vec![
            candidate(vec![GeminiPart::text("first")], Some("STOP"), None),
            candidate(vec![GeminiPart::text("second")], Some("STOP"), None),
        ]);
        assert_eq!(response_text(&resp).unwrap(), "first");
    }

    #[test]
    fn test_primary_text_wins_over_recovery() {
        let resp = response(vec![candidate(
            vec![GeminiPart::text("real answer")],
            Some("MALFORMED_FUNCTION_CALL"),
            Some("Malformed function call: f({}) recovered"),
        )]);
        assert_eq!(response_text(&resp).unwrap(), "real answer");
    }

    #[test]
    fn test_recovery_used_when_parts_empty() {
        let resp = response(vec![candidate(
            Vec::new(),
            Some("MALFORMED_FUNCTION_CALL"),
            Some("Malformed function call: call_foo({\"a\":1}) some trailing text"),
        )]);
        assert_eq!(response_text(&resp).unwrap(), "some trailing text");
    }

    #[test]
    fn test_recovery_requires_malformed_reason() {
        let resp = response(vec![candidate(
            Vec::new(),
            Some("SAFETY"),
            Some("Malformed function call: f({}) text"),
        )]);
        assert!(matches!(response_text(&resp), Err(RelayError::EmptyContent)));
    }

    #[test]
    fn test_recovery_yielding_nothing_is_empty_content() {
        let resp = response(vec![candidate(
            Vec::new(),
            Some("MALFORMED_FUNCTION_CALL"),
            Some("Malformed function call: call_foo({})"),
        )]);
        assert!(matches!(response_text(&resp), Err(RelayError::EmptyContent)));

        let resp = response(vec![candidate(Vec::new(), Some("MALFORMED_FUNCTION_CALL"), Some(""))]);
        assert!(matches!(response_text(&resp), Err(RelayError::EmptyContent)));
    }

    #[test]
    fn test_zero_candidates() {
        let result = gemini_to_caller(&response(Vec::new()), ResponseShape::Messages, "m", 0);
        assert!(matches!(result, Err(RelayError::NoCandidates)));
    }

    #[test]
    fn test_text_after_null_args_call() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"functionCall":{"name":"f","args":null}},{"text":"hi"}
            ]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(response_text(&resp).unwrap(), "hi");
    }

    #[test]
    fn test_shape_from_path() {
        assert_eq!(ResponseShape::from_path("/v1/messages"), ResponseShape::Messages);
        assert_eq!(
            ResponseShape::from_path("/v1/messages/count"),
            ResponseShape::Messages
        );
        assert_eq!(
            ResponseShape::from_path("/v1/chat/completions"),
            ResponseShape::ChatCompletion
        );
        assert_eq!(ResponseShape::from_path("/v1/anything"), ResponseShape::ChatCompletion);
    }

    #[test]
    fn test_messages_envelope() {
        let resp = response(vec![candidate(vec![GeminiPart::text("Hi")], Some("STOP"), None)]);
        let out = gemini_to_caller(
            &resp,
            ResponseShape::Messages,
            "gemini-3-flash-preview",
            1_700_000_000,
        )
        .unwrap();
        let json = serde_json::to_value(out).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "ant-1700000000",
                "type": "message",
                "role": "assistant",
                "model": "gemini-3-flash-preview",
                "content": [{"type": "text", "text": "Hi"}],
                "stop_reason": "end_turn",
            })
        );
    }

    #[test]
    fn test_chat_completion_envelope() {
        let resp = response(vec![candidate(vec![GeminiPart::text("Hi")], Some("STOP"), None)]);
        let out = gemini_to_caller(&resp, ResponseShape::ChatCompletion, "gpt-4o", 1_700_000_000)
            .unwrap();
        let json = serde_json::to_value(out).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "chatcmpl-1700000000",
                "object": "chat.completion",
                "created": 1_700_000_000,
                "model": "gpt-4o",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hi"},
                    "finish_reason": "stop",
                }],
            })
        );
    }

    #[test]
    fn test_error_body_shapes() {
        let json = serde_json::to_value(
            ResponseShape::Messages.error_body("api_error", "Gemini returned no candidates"),
        )
        .unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["error"]["type"], "api_error");
        assert_eq!(json["error"]["message"], "Gemini returned no candidates");

        let json =
            serde_json::to_value(ResponseShape::ChatCompletion.error_body("api_error", "boom"))
                .unwrap();
        assert_eq!(json["error"]["type"], "api_error");
        assert_eq!(json["error"]["message"], "boom");
        assert!(json.get("type").is_none());
    }
}
