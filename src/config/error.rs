use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by a decoder or a custom layer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError { path: PathBuf, source: BoxError },

    #[error("no decoder for config file '{0}'")]
    UnsupportedFormat(PathBuf),

    #[error("environment key separator must not be empty")]
    InvalidSeparator,

    #[error("failed to load configuration layer: {0}")]
    Load(#[source] BoxError),
}

impl ConfigError {
    /// Wraps an arbitrary error raised by a custom [`Layer`](crate::Layer).
    pub fn load(err: impl Into<BoxError>) -> Self {
        Self::Load(err.into())
    }
}
