//! Request types for the generic chat API (what callers send TO us).
//!
//! Both OpenAI Chat Completions and Anthropic Messages bodies deserialize into
//! these types. Fields the relay does not use (`max_tokens`, `stream`, ...) are
//! accepted and ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenericRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<MessageContent>,
    #[serde(default)]
    pub messages: Vec<GenericMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenericMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: MessageContent,
}

/// A message's content, resolved by probing in a fixed order:
/// string, then array of `{type, text}` blocks, then the raw JSON as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    Raw(Box<RawValue>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub block_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

impl ContentBlock {
    pub fn is_text(&self) -> bool {
        self.block_type == "text"
    }
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}

impl MessageContent {
    /// Classify an already-captured JSON value. Never fails.
    pub fn from_raw(raw: Box<RawValue>) -> Self {
        if let Ok(text) = serde_json::from_str::<Option<String>>(raw.get()) {
            return Self::Text(text.unwrap_or_default());
        }
        if let Ok(blocks) = serde_json::from_str::<Vec<ContentBlock>>(raw.get()) {
            return Self::Blocks(blocks);
        }
        Self::Raw(raw)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
