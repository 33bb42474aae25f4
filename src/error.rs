//! Error types for papercast.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PapercastError {
    // Input errors
    #[error("Source text is empty, nothing to generate a podcast from")]
    EmptySource,

    // Chunking errors
    #[error("Chunk of {size} characters exceeds the {limit}-character request ceiling")]
    ChunkTooLarge { size: usize, limit: usize },

    // Generation capability signals
    #[error("Generation capability rate limited the request")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Request payload too large for the generation capability")]
    PayloadTooLarge,

    #[error("Usage budget exhausted: {message}")]
    BudgetExhausted { message: String },

    #[error("Script generation failed: {message}")]
    Generation { message: String },

    // Synthesis errors
    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    // Assembly errors
    #[error("Audio assembly failed: {message}")]
    Assembly { message: String },

    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl PapercastError {
    /// True for failures worth retrying with backoff: rate limiting and
    /// generic upstream generation failures (timeouts, 5xx).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PapercastError::RateLimited { .. } | PapercastError::Generation { .. }
        )
    }

    /// True when a usage quota has been hit. Terminal: retrying cannot help
    /// until the caller's billing period or quota resets.
    pub fn is_budget_exhausted(&self) -> bool {
        matches!(self, PapercastError::BudgetExhausted { .. })
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, PapercastError>;
