//! Outcomes of one conversation turn

use thiserror::Error;
use vocalis_ai::{Reply, ResponderError, SpeechError};

use crate::history::ChatMessage;

/// Result of a text turn. The turn is recorded even when the reply failed.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub message: ChatMessage,
    pub reply: Result<Reply, ResponderError>,
}

/// Result of a successful voice turn
#[derive(Debug, Clone)]
pub struct VoiceTurn {
    pub transcript: String,
    pub reply: Reply,
    pub message: ChatMessage,
    /// Synthesized reply, `None` when synthesis failed
    pub audio: Option<Vec<u8>>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    #[error("Transcription failed: {0}")]
    Transcription(#[source] SpeechError),

    #[error("Response failed: {0}")]
    Response(#[source] ResponderError),
}
