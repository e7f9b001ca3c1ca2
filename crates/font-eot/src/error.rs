//! Error types for EOT conversion.

use std::result;

use read_fonts::ReadError;

/// Errors that can occur while reading or writing EOT files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("EOT header is truncated")]
    Truncated,

    #[error("unsupported EOT version {0:#010x}")]
    UnsupportedVersion(u32),

    #[error("EOT magic number mismatch: {0:#06x}")]
    BadMagic(u16),

    #[error("MicroType Express compressed EOT files are not supported")]
    Compressed,

    #[error("EOT font data ({size} bytes) does not fit in a {total} byte file")]
    BadFontDataSize { size: u32, total: u32 },

    #[error("{0} does not fit in an EOT header")]
    Overflow(&'static str),
}

pub type Result<T> = result::Result<T, Error>;
