//! Speech-to-text and text-to-speech

mod openai;
mod wav;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SpeechError;

pub use openai::OpenAiSpeech;
pub use wav::{BROWSER_SAMPLE_RATE, audio_level, is_wav, pcm_to_wav, scale_wav_volume};

pub const MIN_RATE: u32 = 50;
pub const MAX_RATE: u32 = 300;
pub const DEFAULT_RATE: u32 = 150;
pub const DEFAULT_VOLUME: f32 = 0.9;

/// Voice used for synthesis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Words per minute
    pub rate: u32,
    /// 0.0 to 1.0
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl VoiceSettings {
    /// Build settings, clamping both values into range.
    pub fn new(rate: u32, volume: f32) -> Self {
        let volume = if volume.is_nan() {
            DEFAULT_VOLUME
        } else {
            volume.clamp(0.0, 1.0)
        };
        Self {
            rate: rate.clamp(MIN_RATE, MAX_RATE),
            volume,
        }
    }

    /// Playback speed multiplier relative to the default rate
    pub fn speed(&self) -> f32 {
        (self.rate as f32 / DEFAULT_RATE as f32).clamp(0.25, 4.0)
    }
}

/// Converts audio to text and text to audio.
#[async_trait]
pub trait SpeechTranscoder: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, SpeechError>;

    /// Returns WAV bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;

    fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings::default()
    }

    /// Apply new voice settings, returning the clamped values actually used
    fn set_voice_properties(&self, rate: u32, volume: f32) -> VoiceSettings {
        VoiceSettings::new(rate, volume)
    }
}
