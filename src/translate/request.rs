//! Translate generic chat requests into Gemini `generateContent` requests.
//!
//! Every message becomes exactly one Gemini content entry with a single text
//! part. Gemini has no system role here, so a system prompt is folded into the
//! conversation as a leading user turn.

use std::collections::HashMap;
use std::hash::BuildHasher;

use super::gemini_types::{GeminiContent, GeminiRequest};
use super::generic_types::{GenericRequest, MessageContent};

const SYSTEM_PREFIX: &str = "System Instruction: ";

/// Translate a generic request into a Gemini request.
/// Returns the Gemini model to call alongside the request body.
pub fn generic_to_gemini<S: BuildHasher>(
    req: &GenericRequest,
    model_map: &HashMap<String, String, S>,
) -> (String, GeminiRequest) {
    let target_model = model_map
        .get(&req.model)
        .cloned()
        .unwrap_or_else(|| req.model.clone());

    let mut contents = Vec::with_capacity(req.messages.len() + 1);

    let system = req.system.as_ref().map(extract_text).unwrap_or_default();
    if !system.is_empty() {
        contents.push(GeminiContent::text("user", format!("{SYSTEM_PREFIX}{system}")));
    }

    for msg in &req.messages {
        contents.push(GeminiContent::text(
            map_role(&msg.role),
            extract_text(&msg.content),
        ));
    }

    (target_model, GeminiRequest { contents })
}

/// Map a caller role onto Gemini's two roles. Anything that is not the
/// assistant speaking is treated as the user.
pub fn map_role(role: &str) -> &'static str {
    match role {
        "assistant" | "model" => "model",
        _ => "user",
    }
}

/// Flatten message content into plain text.
pub fn extract_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter(|b| b.is_text())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        MessageContent::Raw(raw) => raw.get().to_string(),
    }
}
