use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub synthesis: SynthesisConfig,
    pub speakers: SpeakerConfig,
    pub output: OutputConfig,
}

/// Script generation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// OpenAI-compatible chat completions endpoint.
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key. Empty value means no auth
    /// header is sent (local deployments).
    pub api_key_env: String,
    pub target_minutes: u32,
    pub words_per_minute: u32,
    pub duration_variance_minutes: f64,
    pub max_chunk_chars: usize,
    pub max_chunks: usize,
    pub max_request_chars: usize,
    pub max_concurrent: usize,
    pub min_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesisConfig {
    /// OpenAI-compatible speech endpoint.
    pub endpoint: String,
    pub model: String,
    /// Engine tier: "standard", "neural", or "premium". Selects the default
    /// voice pair; explicit voice overrides below win.
    pub engine: String,
    pub host_a_voice: Option<String>,
    pub host_b_voice: Option<String>,
    pub max_request_chars: usize,
    pub request_timeout_secs: u64,
    pub sample_rate: u32,
}

/// Host presentation configuration. Display names appear in prompts and the
/// returned script; they never affect speaker identity internally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeakerConfig {
    pub host_a_name: String,
    pub host_b_name: String,
}

/// Output artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the assembled episode is written to.
    pub dir: PathBuf,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/v1/chat/completions".to_string(),
            model: "llama3.1".to_string(),
            api_key_env: "PAPERCAST_API_KEY".to_string(),
            target_minutes: defaults::TARGET_MINUTES,
            words_per_minute: defaults::WORDS_PER_MINUTE,
            duration_variance_minutes: defaults::DURATION_VARIANCE_MINUTES,
            max_chunk_chars: defaults::MAX_CHUNK_CHARS,
            max_chunks: defaults::MAX_CHUNKS,
            max_request_chars: defaults::MAX_REQUEST_CHARS,
            max_concurrent: defaults::MAX_CONCURRENT_REQUESTS,
            min_interval_ms: defaults::MIN_REQUEST_INTERVAL_MS,
            request_timeout_secs: defaults::GENERATION_TIMEOUT_SECS,
            max_tokens: 8192,
            temperature: 0.7,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8343/v1/audio/speech".to_string(),
            model: "kokoro".to_string(),
            engine: "standard".to_string(),
            host_a_voice: None,
            host_b_voice: None,
            max_request_chars: defaults::TTS_MAX_CHARS,
            request_timeout_secs: defaults::SYNTHESIS_TIMEOUT_SECS,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            host_a_name: "Alex".to_string(),
            host_b_name: "Jamie".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("podcasts"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Reject values that would wedge the pipeline before any work starts.
    fn validate(&self) -> anyhow::Result<()> {
        if self.generation.words_per_minute == 0 {
            anyhow::bail!("generation.words_per_minute must be positive");
        }
        if self.generation.target_minutes == 0 {
            anyhow::bail!("generation.target_minutes must be positive");
        }
        if self.generation.max_chunks < 2 {
            anyhow::bail!("generation.max_chunks must be at least 2");
        }
        if self.generation.max_concurrent == 0 {
            anyhow::bail!("generation.max_concurrent must be positive");
        }
        if self.generation.max_chunk_chars > self.generation.max_request_chars {
            anyhow::bail!(
                "generation.max_chunk_chars ({}) exceeds max_request_chars ({})",
                self.generation.max_chunk_chars,
                self.generation.max_request_chars
            );
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PAPERCAST_ENDPOINT → generation.endpoint
    /// - PAPERCAST_MODEL → generation.model
    /// - PAPERCAST_TTS_ENDPOINT → synthesis.endpoint
    /// - PAPERCAST_TTS_ENGINE → synthesis.engine
    /// - PAPERCAST_OUTPUT_DIR → output.dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("PAPERCAST_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.generation.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("PAPERCAST_MODEL")
            && !model.is_empty()
        {
            self.generation.model = model;
        }

        if let Ok(endpoint) = std::env::var("PAPERCAST_TTS_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.synthesis.endpoint = endpoint;
        }

        if let Ok(engine) = std::env::var("PAPERCAST_TTS_ENGINE")
            && !engine.is_empty()
        {
            self.synthesis.engine = engine;
        }

        if let Ok(dir) = std::env::var("PAPERCAST_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.output.dir = PathBuf::from(dir);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/papercast/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("papercast")
            .join("config.toml")
    }
}
