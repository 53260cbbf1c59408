//! Error type shared by the registry, interpreter and persistence codecs.
//!
//! Every message reads `"<name>: <reason>"` so front-ends can print it as is.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by console variable operations.
#[derive(Error, Debug)]
pub enum CVarError {
    /// The name is not registered.
    #[error("{0}: variable not found")]
    NotFound(String),

    /// A variable with this name already exists.
    #[error("{0}: variable already exists")]
    AlreadyExists(String),

    /// `true`, `false` and `not` are filter-list tokens and cannot name a variable.
    #[error("{0}: reserved name")]
    ReservedName(String),

    /// The name could never be addressed from a command line.
    #[error("{0}: invalid name")]
    InvalidName(String),

    /// Typed access with a type other than the one the variable was created with.
    #[error("{name}: variable does not hold a value of type {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    /// The variable's text conversion rejected the text.
    #[error("{name}: cannot parse \"{text}\"")]
    InvalidValue { name: String, text: String },

    /// A command line with no recognizable form.
    #[error("{0}: command not found")]
    ParseFailure(String),

    /// A file could not be opened, read or written.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted data is missing an expected element or is not well formed.
    #[error("{}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl CVarError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CVarError>;
