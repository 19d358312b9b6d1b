//! One voice exchange: transcribe, chat, remember, speak

use std::path::{Path, PathBuf};

use crate::chat::OllamaClient;
use crate::history::HistoryStore;
use crate::persona::build_messages;
use crate::voice::{SpeechToText, TextToSpeech};
use crate::{Config, Error, Result};

/// Outcome of one processed recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub transcript: String,
    pub reply: String,

    /// Synthesized reply, `None` when TTS is disabled or failed
    pub audio: Option<PathBuf>,
}

/// Owns the services used for an exchange
///
/// Every collaborator is constructed by the caller and dropped with the
/// `Companion`; nothing is held in globals.
pub struct Companion {
    history: HistoryStore,
    chat: OllamaClient,
    stt: SpeechToText,
    tts: Option<TextToSpeech>,
    persona: String,
    audio_dir: PathBuf,
}

impl Companion {
    #[must_use]
    pub fn new(
        history: HistoryStore,
        chat: OllamaClient,
        stt: SpeechToText,
        tts: Option<TextToSpeech>,
        persona: String,
        audio_dir: PathBuf,
    ) -> Self {
        Self {
            history,
            chat,
            stt,
            tts,
            persona,
            audio_dir,
        }
    }

    /// Build every service from configuration
    ///
    /// TTS is optional: a TTS setup error only disables audio output.
    ///
    /// # Errors
    ///
    /// Returns error if the chat or STT client cannot be set up
    pub fn from_config(config: &Config) -> Result<Self> {
        let chat = OllamaClient::new(&config.llm)?;
        let stt = SpeechToText::from_config(&config.stt, &config.api_keys)?;

        let tts = if config.tts.enabled {
            match TextToSpeech::from_config(&config.tts, &config.api_keys) {
                Ok(tts) => Some(tts),
                Err(e) => {
                    tracing::warn!(error = %e, "TTS unavailable, replies will be text only");
                    None
                }
            }
        } else {
            tracing::debug!("TTS disabled by configuration");
            None
        };

        Ok(Self::new(
            HistoryStore::new(&config.history_path),
            chat,
            stt,
            tts,
            config.persona.clone(),
            config.audio_dir.clone(),
        ))
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Process one recording end to end
    ///
    /// # Errors
    ///
    /// Returns [`Error::AudioNotFound`] if `audio` is not a file,
    /// [`Error::EmptyTranscript`] if nothing was heard, and any error from
    /// [`Companion::respond`]
    pub async fn process_file(&self, audio: &Path) -> Result<Exchange> {
        if !audio.is_file() {
            return Err(Error::AudioNotFound(audio.to_path_buf()));
        }

        let transcript = self.stt.transcribe_file(audio).await?;
        if transcript.is_empty() {
            return Err(Error::EmptyTranscript);
        }

        self.respond(&transcript).await
    }

    /// Answer a transcript, record the exchange, and synthesize the reply
    ///
    /// The exchange is only recorded once a non-empty reply has been received.
    /// TTS failure is logged and leaves `audio` empty.
    ///
    /// # Errors
    ///
    /// Returns error if the chat request fails, the reply is empty, or the
    /// history cannot be written
    pub async fn respond(&self, transcript: &str) -> Result<Exchange> {
        let messages = build_messages(&self.persona, self.history.load(), transcript);

        let reply = self.chat.chat(&messages).await?.trim().to_string();
        if reply.is_empty() {
            return Err(Error::EmptyReply);
        }

        self.history.append(transcript, &reply)?;

        let audio = match &self.tts {
            Some(tts) => match tts.synthesize_to_file(&reply, &self.audio_dir).await {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(error = %e, "TTS failed, delivering text only");
                    None
                }
            },
            None => None,
        };

        Ok(Exchange {
            transcript: transcript.to_string(),
            reply,
            audio,
        })
    }
}
