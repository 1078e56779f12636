use std::io;
use thiserror::Error;

use crate::marker::MarkerError;

/// Errors that can occur while reading or validating a bundle manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("invalid marker expression: {0}")]
    Marker(#[from] MarkerError),

    #[error("conflicting requirements for '{name}' on {platform}: '{first}' vs '{second}'")]
    Conflict {
        name: String,
        platform: String,
        first: String,
        second: String,
    },

    #[error("unknown platform '{0}' (expected one of: linux, darwin, win32)")]
    UnknownPlatform(String),
}
