//! Error types for the collaborator clients

use reqwest::StatusCode;
use thiserror::Error;

/// Why a reply could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponderError {
    #[error("AI provider unavailable: {0}")]
    Unavailable(String),

    #[error("AI provider rate limited the request, retry later")]
    RateLimited,

    #[error("AI provider rejected the API key")]
    Unauthorized,

    #[error("Malformed AI provider response: {0}")]
    Malformed(String),
}

impl ResponderError {
    /// Map a non-success HTTP status to an error.
    pub fn from_status(provider: &str, status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            _ => Self::Unavailable(format!("{} returned HTTP {}", provider, status.as_u16())),
        }
    }
}

impl From<reqwest::Error> for ResponderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Malformed(error.to_string())
        } else {
            Self::Unavailable(error.to_string())
        }
    }
}

/// Why audio could not be transcribed or synthesized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech provider not configured. Set OPENAI_API_KEY.")]
    NotConfigured,

    #[error("Could not understand audio")]
    Unrecognized,

    #[error("Cannot synthesize empty text")]
    EmptyText,

    #[error("Speech provider unavailable: {0}")]
    Unavailable(String),

    #[error("Speech provider rate limited the request, retry later")]
    RateLimited,

    #[error("Speech provider rejected the API key")]
    Unauthorized,

    #[error("Malformed audio or response: {0}")]
    Malformed(String),
}

impl SpeechError {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            _ => Self::Unavailable(format!("speech API returned HTTP {}", status.as_u16())),
        }
    }
}

impl From<reqwest::Error> for SpeechError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Malformed(error.to_string())
        } else {
            Self::Unavailable(error.to_string())
        }
    }
}

impl From<hound::Error> for SpeechError {
    fn from(error: hound::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}
