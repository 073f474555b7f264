// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every variant is fatal at startup; `main.rs` is the only place that turns
//! one into a process exit.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RfwConfigError {
    /// An applicable key is absent from the config file.
    #[error("Missing mandatory config key: {key}")]
    MissingKey { key: String },

    /// The key is present but its value fails validation.
    #[error("Wrong {key} value. {reason}")]
    InvalidValue { key: String, reason: String },

    /// The key was read while the feature it belongs to is switched off.
    #[error("{key} read while {condition}")]
    NotEnabled { key: String, condition: String },

    #[error("File not found for {key}: {}", .path.display())]
    FileNotFound { key: String, path: PathBuf },

    #[error("Wrong IP address format in {} (line {line}: {entry:?})", .file.display())]
    WhitelistInvalidEntry {
        file: PathBuf,
        line: usize,
        entry: String,
    },

    #[error("Could not find a valid IP address in {}", .file.display())]
    WhitelistEmpty { file: PathBuf },

    #[error("Parse error in {} at line {line}: {reason}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Duplicate config key {key} at line {line}")]
    DuplicateKey { key: String, line: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RfwConfigError>;
