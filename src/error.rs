//! Error types for YantraDrive

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// YantraDrive error types
///
/// Errors are confined to configuration loading and construction. The
/// per-tick control path never returns a `Result`; degraded conditions
/// there are guarded no-ops or sentinel values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
