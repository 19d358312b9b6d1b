//! Speech-to-text (STT) processing

use std::path::Path;

use crate::config::{ApiKeys, SttConfig};
use crate::voice::audio_mime_type;
use crate::{Error, Result};

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEEPGRAM_BASE_URL: &str = "https://api.deepgram.com";
const WHISPER_DEFAULT_MODEL: &str = "whisper-1";
const DEEPGRAM_DEFAULT_MODEL: &str = "nova-2";

/// Response from a Whisper-compatible transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Response from Deepgram transcription API
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// STT provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SttProvider {
    Whisper,
    Deepgram,
}

/// Transcribes speech to text
pub struct SpeechToText {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create an STT instance from configuration
    ///
    /// A Whisper-compatible server with a custom `base_url` may run without a
    /// key; the public `OpenAI` endpoint and Deepgram require one.
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unknown or a required API key is missing
    pub fn from_config(config: &SttConfig, keys: &ApiKeys) -> Result<Self> {
        let (provider, default_url, default_model, api_key) = match config.provider.as_str() {
            "openai" | "whisper" => (
                SttProvider::Whisper,
                OPENAI_BASE_URL,
                WHISPER_DEFAULT_MODEL,
                keys.openai.clone(),
            ),
            "deepgram" => (
                SttProvider::Deepgram,
                DEEPGRAM_BASE_URL,
                DEEPGRAM_DEFAULT_MODEL,
                keys.deepgram.clone(),
            ),
            other => {
                return Err(Error::Config(format!("unknown STT provider: {other}")));
            }
        };

        let api_key = api_key.filter(|k| !k.is_empty());
        if api_key.is_none() && (config.base_url.is_none() || provider == SttProvider::Deepgram) {
            return Err(Error::Config(format!(
                "{} API key required for STT",
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
            model: config
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            provider,
        })
    }

    /// Transcribe an audio file, returning the trimmed transcript
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or transcription fails
    pub async fn transcribe_file(&self, path: &Path) -> Result<String> {
        let audio = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "audio".to_string(), |n| n.to_string_lossy().into_owned());
        let mime = audio_mime_type(path);

        tracing::debug!(path = %path.display(), mime, "transcribing audio file");

        let transcript = self.transcribe(audio, &file_name, mime).await?;
        Ok(transcript.trim().to_string())
    }

    /// Transcribe raw audio bytes
    ///
    /// # Errors
    ///
    /// Returns error if transcription fails
    pub async fn transcribe(&self, audio: Vec<u8>, file_name: &str, mime: &str) -> Result<String> {
        match self.provider {
            SttProvider::Whisper => self.transcribe_whisper(audio, file_name, mime).await,
            SttProvider::Deepgram => self.transcribe_deepgram(audio, mime).await,
        }
    }

    async fn transcribe_whisper(&self, audio: Vec<u8>, file_name: &str, mime: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name(file_name.to_string())
                    .mime_str(mime)
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone());

        let mut request = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "Whisper request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            e
        })?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }

    async fn transcribe_deepgram(&self, audio: Vec<u8>, mime: &str) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting Deepgram transcription");

        let mut request = self
            .client
            .post(format!("{}/v1/listen", self.base_url))
            .query(&[("model", self.model.as_str()), ("punctuate", "true")])
            .header("Content-Type", mime)
            .body(audio);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Token {key}"));
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "Deepgram request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Deepgram API error");
            return Err(Error::Stt(format!("Deepgram API error {status}: {body}")));
        }

        let result: DeepgramResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Deepgram response");
            e
        })?;

        let transcript = result
            .results
            .channels
            .into_iter()
            .next()
            .and_then(|c| c.alternatives.into_iter().next())
            .map(|a| a.transcript)
            .unwrap_or_default();

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}
