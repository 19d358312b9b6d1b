//! Text-to-speech (TTS) processing

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::config::{ApiKeys, TtsConfig};
use crate::voice::REPLY_AUDIO_PREFIX;
use crate::{Error, Result};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
const OPENAI_DEFAULT_MODEL: &str = "tts-1";
const OPENAI_DEFAULT_VOICE: &str = "alloy";
const ELEVENLABS_DEFAULT_MODEL: &str = "eleven_monolingual_v1";
const ELEVENLABS_DEFAULT_VOICE: &str = "21m00Tcm4TlvDq8ikWAM";

/// TTS provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TtsProvider {
    OpenAI,
    ElevenLabs,
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    voice: String,
    speed: f32,
    model: String,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a TTS instance from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unknown or a required API key is missing
    pub fn from_config(config: &TtsConfig, keys: &ApiKeys) -> Result<Self> {
        let (provider, default_url, default_model, default_voice, api_key) =
            match config.provider.as_str() {
                "openai" => (
                    TtsProvider::OpenAI,
                    OPENAI_BASE_URL,
                    OPENAI_DEFAULT_MODEL,
                    OPENAI_DEFAULT_VOICE,
                    keys.openai.clone(),
                ),
                "elevenlabs" => (
                    TtsProvider::ElevenLabs,
                    ELEVENLABS_BASE_URL,
                    ELEVENLABS_DEFAULT_MODEL,
                    ELEVENLABS_DEFAULT_VOICE,
                    keys.elevenlabs.clone(),
                ),
                other => {
                    return Err(Error::Config(format!("unknown TTS provider: {other}")));
                }
            };

        let api_key = api_key.filter(|k| !k.is_empty());
        if api_key.is_none() && (config.base_url.is_none() || provider == TtsProvider::ElevenLabs)
        {
            return Err(Error::Config(format!(
                "{} API key required for TTS",
                config.provider
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(default_url)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            voice: config
                .voice
                .clone()
                .unwrap_or_else(|| default_voice.to_string()),
            speed: config.speed,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            provider,
        })
    }

    /// Synthesize text to speech
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        match self.provider {
            TtsProvider::OpenAI => self.synthesize_openai(text).await,
            TtsProvider::ElevenLabs => self.synthesize_elevenlabs(text).await,
        }
    }

    /// Synthesize text and write it under `dir`, returning the file path
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails or the file cannot be written
    pub async fn synthesize_to_file(&self, text: &str, dir: &Path) -> Result<PathBuf> {
        let audio = self.synthesize(text).await?;
        if audio.is_empty() {
            return Err(Error::Tts("provider returned no audio".to_string()));
        }

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(reply_file_name());
        tokio::fs::write(&path, &audio).await?;

        tracing::info!(path = %path.display(), bytes = audio.len(), "reply audio saved");
        Ok(path)
    }

    async fn synthesize_openai(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }

    async fn synthesize_elevenlabs(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice);

        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("xi-api-key", key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}

/// `reply-<utc timestamp>-<short id>.mp3`
fn reply_file_name() -> String {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S");
    let id = Uuid::new_v4().simple().to_string();
    format!("{REPLY_AUDIO_PREFIX}{stamp}-{}.mp3", &id[..8])
}
