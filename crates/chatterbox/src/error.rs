//! Error types for the bot's collaborators and configuration.
//!
//! The generation core has no error conditions of its own; everything here
//! comes from I/O, parsing, or an external collaborator.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The message store failed to persist or load messages.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("message store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The intent classifier could not label a text.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("failed to read intent data {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed intent data on line {line}: expected `label<TAB>phrase`")]
    Malformed { line: usize },

    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

/// The remote knowledge responder failed to produce a reply.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("knowledge responder returned no usable text")]
    EmptyReply,

    #[error("knowledge responder failed: {0}")]
    Failed(String),
}

/// Top-level error for bot operations that cannot degrade to a reply.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
