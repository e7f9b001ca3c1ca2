//! SVG font conversion.
//!
//! SVG fonts store one `<glyph>` element per character with its outline as
//! path data. [`encode`] writes them from any sfnt font that skrifa can draw;
//! [`decode`] rebuilds a TrueType font with quadratic outlines.

mod decode;
mod encode;
mod error;

pub use decode::decode;
pub use encode::encode;
pub use error::{Error, Result};

/// Escape a value for use inside a double-quoted XML attribute.
pub(crate) fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
