//! Vocalis AI - external collaborators of the voice chat service
//!
//! This crate provides:
//! - [`Responder`]: chat completions against Perplexity or OpenAI, with a
//!   canned local fallback when no key is configured
//! - [`SpeechTranscoder`]: Whisper transcription and TTS synthesis
//!
//! Every upstream fault is reported as a typed error
//! ([`ResponderError`], [`SpeechError`]) instead of a panic.

pub mod error;
mod http_client;
pub mod responder;
pub mod speech;

// Re-export commonly used types
pub use error::{ResponderError, SpeechError};
pub use responder::{
    AiProvider, ChatResponder, DEFAULT_MAX_TOKENS, Reply, ReplySource, Responder, fallback_reply,
};
pub use speech::{OpenAiSpeech, SpeechTranscoder, VoiceSettings, audio_level};
