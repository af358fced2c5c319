//! OpenAI speech client: Whisper transcription and TTS synthesis.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::wav::{BROWSER_SAMPLE_RATE, is_wav, pcm_to_wav, scale_wav_volume};
use super::{SpeechTranscoder, VoiceSettings};
use crate::error::SpeechError;
use crate::http_client::build_http_client;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const TRANSCRIPTION_MODEL: &str = "whisper-1";
const TRANSCRIPTION_LANGUAGE: &str = "en";
const TTS_MODEL: &str = "tts-1";
const TTS_VOICE: &str = "alloy";

pub struct OpenAiSpeech {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    settings: RwLock<VoiceSettings>,
}

impl Default for OpenAiSpeech {
    fn default() -> Self {
        Self::new(None)
    }
}

impl OpenAiSpeech {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: build_http_client(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: OPENAI_BASE_URL.to_string(),
            settings: RwLock::new(VoiceSettings::default()),
        }
    }

    /// Create a client keyed from `OPENAI_API_KEY`
    pub fn from_env() -> Self {
        let speech = Self::new(std::env::var("OPENAI_API_KEY").ok());
        tracing::info!(configured = speech.api_key.is_some(), "Speech service initialized");
        speech
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_voice_settings(self, settings: VoiceSettings) -> Self {
        *self.settings.write() = VoiceSettings::new(settings.rate, settings.volume);
        self
    }

    fn api_key(&self) -> Result<&str, SpeechError> {
        self.api_key.as_deref().ok_or(SpeechError::NotConfigured)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl std::fmt::Debug for OpenAiSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSpeech")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("settings", &*self.settings.read())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
    speed: f32,
}

#[async_trait]
impl SpeechTranscoder for OpenAiSpeech {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, SpeechError> {
        let api_key = self.api_key()?;

        let wav = if is_wav(audio) {
            audio.to_vec()
        } else if audio.len() < 2 {
            tracing::warn!("Could not understand audio: no samples");
            return Err(SpeechError::Unrecognized);
        } else {
            pcm_to_wav(audio, BROWSER_SAMPLE_RATE, 1)?
        };

        let file = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|err| SpeechError::Malformed(err.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("model", TRANSCRIPTION_MODEL)
            .text("language", TRANSCRIPTION_LANGUAGE);

        let response = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Speech recognition error");
            return Err(SpeechError::from_status(status));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|err| SpeechError::Malformed(err.to_string()))?;

        let text = body.text.trim().to_string();
        if text.is_empty() {
            tracing::warn!("Could not understand audio");
            return Err(SpeechError::Unrecognized);
        }

        tracing::info!(chars = text.chars().count(), "Transcribed audio");
        Ok(text)
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let api_key = self.api_key()?;
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let settings = *self.settings.read();
        let body = SpeechRequest {
            model: TTS_MODEL,
            voice: TTS_VOICE,
            input: text,
            response_format: "wav",
            speed: settings.speed(),
        };

        let response = self
            .client
            .post(self.url("audio/speech"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Speech synthesis error");
            return Err(SpeechError::from_status(status));
        }

        let audio = response.bytes().await?.to_vec();
        if audio.is_empty() {
            return Err(SpeechError::Malformed("empty audio response".to_string()));
        }

        let preview: String = text.chars().take(50).collect();
        tracing::info!(bytes = audio.len(), "Generated speech for: {}...", preview);

        if settings.volume >= 1.0 {
            return Ok(audio);
        }

        match scale_wav_volume(&audio, settings.volume) {
            Ok(Some(scaled)) => Ok(scaled),
            Ok(None) => Ok(audio),
            Err(err) => {
                tracing::debug!(error = %err, "Returning synthesized audio without volume scaling");
                Ok(audio)
            }
        }
    }

    fn voice_settings(&self) -> VoiceSettings {
        *self.settings.read()
    }

    fn set_voice_properties(&self, rate: u32, volume: f32) -> VoiceSettings {
        let settings = VoiceSettings::new(rate, volume);
        *self.settings.write() = settings;
        tracing::info!(
            rate = settings.rate,
            volume = settings.volume,
            "Voice properties set"
        );
        settings
    }
}
