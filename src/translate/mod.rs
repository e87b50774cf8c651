//! API translation between the generic chat formats and Gemini.
//!
//! The core of the relay: converts requests and responses between the caller's
//! OpenAI/Anthropic-style JSON and Gemini's `generateContent` format. All
//! translation functions are pure (no I/O).

pub mod anthropic_types;
pub mod gemini_types;
pub mod generic_types;
pub mod openai_types;
pub mod request;
pub mod response;
