//! Common error types for Agora

use thiserror::Error;

/// Common result type for Agora operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the Agora crates
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration; fatal before any request is served
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML config file could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
