//! AI responder: turns a user utterance into a reply.
//!
//! [`ChatResponder`] calls an OpenAI-compatible chat completions endpoint
//! (Perplexity or OpenAI). With no API key configured it answers from a
//! small set of canned replies instead, see [`fallback_reply`].

mod chat;
mod fallback;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ResponderError;

pub use chat::{ChatResponder, ProviderEndpoint};
pub use fallback::fallback_reply;

/// Default completion length when the caller has no preference
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Supported remote providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Perplexity,
    #[serde(rename = "openai")]
    OpenAi,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::Perplexity => "perplexity",
            AiProvider::OpenAi => "openai",
        }
    }

    /// Name used in log lines and error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            AiProvider::Perplexity => "Perplexity",
            AiProvider::OpenAi => "OpenAI",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "perplexity" => Ok(AiProvider::Perplexity),
            "openai" => Ok(AiProvider::OpenAi),
            other => Err(format!("Invalid AI provider: {}", other)),
        }
    }
}

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "provider", rename_all = "lowercase")]
pub enum ReplySource {
    Provider(AiProvider),
    Fallback,
}

/// A successful reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

impl Reply {
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ReplySource::Fallback,
        }
    }
}

/// Maps an input string to a reply.
///
/// Implementations never panic; every upstream fault becomes a
/// [`ResponderError`].
#[async_trait]
pub trait Responder: Send + Sync {
    /// Provider currently used for replies
    fn provider(&self) -> &str;

    async fn respond(&self, text: &str, max_tokens: u32) -> Result<Reply, ResponderError>;

    /// Switch the active provider. Returns false for unknown names.
    fn set_provider(&self, _name: &str) -> bool {
        false
    }

    /// Cheap round trip to check the provider answers at all
    async fn test_connection(&self) -> bool {
        match self.respond("Hello", 10).await {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(error = %err, "Connection test failed");
                false
            }
        }
    }
}
