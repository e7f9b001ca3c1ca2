//! Error types for SVG font conversion.

use std::result;

use read_fonts::ReadError;

/// Errors that can occur while reading or writing SVG fonts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("invalid SVG document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("no <font> element in SVG document")]
    NoFont,

    #[error("invalid path data for glyph {glyph:?}: {message}")]
    PathData { glyph: String, message: String },

    #[error("invalid value {value:?} for attribute {attribute}")]
    Attribute { attribute: &'static str, value: String },

    #[error(transparent)]
    Build(#[from] anyhow::Error),
}

pub type Result<T> = result::Result<T, Error>;
