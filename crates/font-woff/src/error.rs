//! Error types for WOFF encoding.

use std::{io, result};

use read_fonts::ReadError;

/// Errors that can occur while encoding a WOFF file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("font has no tables")]
    NoTables,

    #[error("zlib compression failed: {0}")]
    Compress(#[from] io::Error),

    #[error("WOFF {0} does not fit in 32 bits")]
    Overflow(&'static str),
}

pub type Result<T> = result::Result<T, Error>;
