// Error types for the toast center
//
// Store operations are total and never fail. The fallible edges (config files,
// clipboard, bus payloads) get their own error enums built with thiserror.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The file or its directory could not be written
    #[error("Failed to write config file: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not valid TOML for [`Config`](crate::config::Config)
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The config could not be written as TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The platform has no config directory
    #[error("Config directory not found")]
    NoConfigDir,

    /// A value is out of range
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Clipboard write errors
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// The display server refused or is not reachable
    #[error("Clipboard access failed: {0}")]
    Access(#[from] arboard::Error),

    /// The blocking write task panicked or was cancelled
    #[error("Clipboard task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// No clipboard is available
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Event bridge errors
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The payload does not decode as a toast request
    #[error("Invalid toast payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// The payload's message is blank
    #[error("Toast payload has an empty message")]
    EmptyMessage,
}

/// Result of config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
/// Result of clipboard writes
pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;
/// Result of decoding bus payloads
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
