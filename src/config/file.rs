//! TOML configuration file loading
//!
//! Supports `~/.config/companion/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct CompanionConfigFile {
    /// Chat model configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// System prompt override
    #[serde(default)]
    pub persona: PersonaFileConfig,

    /// Speech-to-text configuration
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Text-to-speech configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// Where history and generated audio live
    #[serde(default)]
    pub storage: StorageFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Chat endpoint base URL (e.g. "http://localhost:11434")
    pub base_url: Option<String>,

    /// Model identifier (e.g. "llama3.2:3b")
    pub model: Option<String>,

    pub num_predict: Option<u32>,
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PersonaFileConfig {
    pub prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    /// "openai" (any Whisper-compatible server) or "deepgram"
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    pub enabled: Option<bool>,

    /// "openai" or "elevenlabs"
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub speed: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    pub history_path: Option<PathBuf>,
    pub audio_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
    pub deepgram: Option<String>,
}

/// Load the TOML config file from `path`, or the standard path when `None`
///
/// Returns `CompanionConfigFile::default()` if the file doesn't exist or can't be parsed.
/// A missing file named explicitly is logged as a warning.
pub fn load_config_file(path: Option<&Path>) -> CompanionConfigFile {
    let explicit = path.is_some();
    let Some(path) = path.map(Path::to_path_buf).or_else(config_file_path) else {
        return CompanionConfigFile::default();
    };

    if !path.exists() {
        if explicit {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
        }
        return CompanionConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                CompanionConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            CompanionConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/companion/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("companion").join("config.toml"))
}
