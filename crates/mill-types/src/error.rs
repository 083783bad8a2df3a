//! Error types for mill.

use std::io;

/// Errors produced by the mill command kernel and its commands.
///
/// Every variant is a user-facing command failure that aborts the current
/// dispatch and propagates to the top-level caller. Programming errors
/// (duplicate command registration, a failed document consistency check)
/// panic instead of going through this enum.
#[derive(Debug, thiserror::Error)]
pub enum MillError {
    #[error("command error: {0}")]
    Command(String),

    #[error("no such command: {0} (type 'help' for a command overview)")]
    UnknownCommand(String),

    #[error("no such frontend: {0}")]
    UnknownFrontend(String),

    #[error("no such backend: {0}")]
    UnknownBackend(String),

    #[error("command syntax error: {0}")]
    Syntax(String),

    #[error("unexpected end of script in here document `{0}'")]
    UnexpectedEof(String),

    #[error("missing end marker in here document")]
    MissingMarker,

    #[error("can't open input file `{filename}' for reading: {source}")]
    OpenInput {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("can't open output file `{filename}' for writing: {source}")]
    OpenOutput {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, MillError>;
