//! Error types for the relay.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("No API key supplied (Authorization: Bearer, x-api-key, or a configured default)")]
    MissingCredential,

    #[error("Upstream request failed: {message}")]
    Gateway { message: String },

    #[error("Gemini returned no candidates")]
    NoCandidates,

    #[error("Gemini returned no content (possibly blocked by safety filters)")]
    EmptyContent,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RelayError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: msg.into(),
        }
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway {
            message: msg.into(),
        }
    }

    /// HTTP status reported to the caller for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::MissingCredential => 401,
            Self::Gateway { .. } | Self::Http(_) => 502,
            Self::NoCandidates
            | Self::EmptyContent
            | Self::Config { .. }
            | Self::Json(_)
            | Self::Toml(_) => 500,
        }
    }

    /// Error `type` string used in caller-facing error bodies.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request_error",
            Self::MissingCredential => "authentication_error",
            _ => "api_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
