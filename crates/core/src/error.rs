//! Error types for conversion jobs.

use std::{io, path::PathBuf, result};

/// Errors that end a conversion job.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input file type {0:?}")]
    UnsupportedInputType(String),

    #[error("invalid destination folder path")]
    InvalidDestination,

    #[error("destination prompt failed: {0}")]
    Prompt(#[source] io::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to back up {}: {source}", path.display())]
    Backup { path: PathBuf, source: io::Error },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}

impl Error {
    /// Whether the job was rejected before any file was touched.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::UnsupportedInputType(_) | Error::InvalidDestination)
    }
}

/// An option value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} {value:?}, expected one of: {expected}")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

pub type Result<T> = result::Result<T, Error>;
