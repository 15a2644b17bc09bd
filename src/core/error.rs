use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroundingError {
    /// The embedding provider failed, timed out, or returned malformed output.
    /// Nothing else in the pipeline can produce semantic scores, so this is fatal.
    #[error("Encoder unavailable: {0}")]
    EncoderUnavailable(String),

    #[error("Invalid phrase pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl GroundingError {
    /// True for the one error class that must reach the caller untouched
    pub fn is_encoder_failure(&self) -> bool {
        matches!(self, Self::EncoderUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, GroundingError>;
