//! Configuration management for Companion
//!
//! Precedence: environment variables, then the TOML file, then defaults.
//! Command-line flags are applied on top by the binary.

pub mod file;

use std::path::{Path, PathBuf};

use crate::persona::DEFAULT_PERSONA;

pub use file::{CompanionConfigFile, config_file_path, load_config_file};

/// Companion configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat model configuration
    pub llm: LlmConfig,

    /// System prompt sent ahead of every conversation
    pub persona: String,

    /// Speech-to-text configuration
    pub stt: SttConfig,

    /// Text-to-speech configuration
    pub tts: TtsConfig,

    /// Conversation history document
    pub history_path: PathBuf,

    /// Directory receiving synthesized replies
    pub audio_dir: PathBuf,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Chat endpoint configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub num_predict: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            num_predict: 120,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

/// Speech-to-text configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SttConfig {
    /// "openai" or "deepgram"
    pub provider: String,

    /// Overrides the provider's public endpoint (e.g. a local Whisper server)
    pub base_url: Option<String>,

    /// Provider default when unset (`whisper-1` or `nova-2`)
    pub model: Option<String>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: None,
            model: None,
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TtsConfig {
    pub enabled: bool,

    /// "openai" or "elevenlabs"
    pub provider: String,

    /// Overrides the provider's public endpoint
    pub base_url: Option<String>,

    /// Provider default when unset (`tts-1` or `eleven_monolingual_v1`)
    pub model: Option<String>,

    /// Voice name (`OpenAI`) or voice ID (`ElevenLabs`), provider default when unset
    pub voice: Option<String>,

    /// Speed multiplier (0.25 to 4.0, `OpenAI` only)
    pub speed: f32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "openai".to_string(),
            base_url: None,
            model: None,
            voice: None,
            speed: 1.0,
        }
    }
}

/// API keys for external services
#[derive(Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper and TTS)
    pub openai: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| k.as_ref().map(|_| "<redacted>");
        f.debug_struct("ApiKeys")
            .field("openai", &mask(&self.openai))
            .field("elevenlabs", &mask(&self.elevenlabs))
            .field("deepgram", &mask(&self.deepgram))
            .finish()
    }
}

/// Data directory: `~/.local/share/companion` on Linux
#[must_use]
pub fn data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".companion"),
        |d| d.data_dir().join("companion"),
    )
}

impl Config {
    /// Load configuration from the config file and the process environment
    ///
    /// `config_path` overrides the standard config file location.
    #[must_use]
    pub fn load(config_path: Option<&Path>) -> Self {
        let fc = load_config_file(config_path);
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    #[must_use]
    pub fn from_sources<F>(fc: CompanionConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_defaults = LlmConfig::default();
        let llm = LlmConfig {
            base_url: env("COMPANION_LLM_URL")
                .or(fc.llm.base_url)
                .unwrap_or(llm_defaults.base_url),
            model: env("COMPANION_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or(llm_defaults.model),
            num_predict: fc.llm.num_predict.unwrap_or(llm_defaults.num_predict),
            temperature: fc.llm.temperature.unwrap_or(llm_defaults.temperature),
            timeout_secs: fc.llm.timeout_secs.unwrap_or(llm_defaults.timeout_secs),
        };

        let stt = SttConfig {
            provider: fc
                .stt
                .provider
                .unwrap_or_else(|| SttConfig::default().provider),
            base_url: env("COMPANION_STT_URL").or(fc.stt.base_url),
            model: fc.stt.model,
        };

        let tts_defaults = TtsConfig::default();
        let tts = TtsConfig {
            enabled: env("COMPANION_TTS_ENABLED")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .or(fc.tts.enabled)
                .unwrap_or(tts_defaults.enabled),
            provider: fc.tts.provider.unwrap_or(tts_defaults.provider),
            base_url: env("COMPANION_TTS_URL").or(fc.tts.base_url),
            model: fc.tts.model,
            voice: env("COMPANION_TTS_VOICE").or(fc.tts.voice),
            speed: fc.tts.speed.unwrap_or(tts_defaults.speed).clamp(0.25, 4.0),
        };

        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY").or(fc.api_keys.openai),
            elevenlabs: env("ELEVENLABS_API_KEY").or(fc.api_keys.elevenlabs),
            deepgram: env("DEEPGRAM_API_KEY").or(fc.api_keys.deepgram),
        };

        let data_dir = data_dir();
        let history_path = env("COMPANION_HISTORY_PATH")
            .map(PathBuf::from)
            .or(fc.storage.history_path)
            .unwrap_or_else(|| data_dir.join("conversation.json"));
        let audio_dir = env("COMPANION_AUDIO_DIR")
            .map(PathBuf::from)
            .or(fc.storage.audio_dir)
            .unwrap_or_else(|| data_dir.join("audio"));

        let persona = fc
            .persona
            .prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PERSONA.to_string());

        Self {
            llm,
            persona,
            stt,
            tts,
            history_path,
            audio_dir,
            api_keys,
        }
    }
}
