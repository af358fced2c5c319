//! Vocalis core: chat history and the turn pipeline.

pub mod history;
pub mod turn;

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use vocalis_ai::{DEFAULT_MAX_TOKENS, Responder, SpeechTranscoder};

pub use history::{ChatLog, ChatMessage, ChatSummary, SharedChatLog};
pub use turn::{ChatTurn, TurnError, VoiceTurn};

/// Everything a request handler needs, built once at startup.
pub struct AppCore {
    pub history: SharedChatLog,
    pub responder: Arc<dyn Responder>,
    pub speech: Arc<dyn SpeechTranscoder>,
    pub max_tokens: u32,
}

impl AppCore {
    pub fn new(
        history: SharedChatLog,
        responder: Arc<dyn Responder>,
        speech: Arc<dyn SpeechTranscoder>,
    ) -> Self {
        info!(
            capacity = history.capacity(),
            provider = responder.provider(),
            "Initializing Vocalis"
        );
        Self {
            history,
            responder,
            speech,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Respond to `text` and record the turn.
    ///
    /// A failed reply is recorded with empty assistant text.
    pub async fn chat(&self, text: &str) -> ChatTurn {
        let started = Instant::now();
        let reply = self.responder.respond(text, self.max_tokens).await;
        let elapsed = started.elapsed().as_secs_f64();

        let assistant = match &reply {
            Ok(reply) => reply.text.clone(),
            Err(err) => {
                warn!(error = %err, "No reply for chat turn");
                String::new()
            }
        };

        let message = self.history.append_with_duration(text, assistant, elapsed);
        ChatTurn { message, reply }
    }

    /// Transcribe, respond, record, then synthesize the reply.
    pub async fn voice_turn(&self, audio: &[u8]) -> Result<VoiceTurn, TurnError> {
        let transcript = self
            .speech
            .transcribe(audio)
            .await
            .map_err(TurnError::Transcription)?;
        info!("Transcribed: {}", transcript);

        let ChatTurn { message, reply } = self.chat(&transcript).await;
        let reply = reply.map_err(TurnError::Response)?;

        let audio = match self.speech.synthesize(&reply.text).await {
            Ok(audio) => Some(audio),
            Err(err) => {
                warn!(error = %err, "Speech synthesis failed, replying with text only");
                None
            }
        };

        Ok(VoiceTurn {
            transcript,
            reply,
            message,
            audio,
        })
    }
}
