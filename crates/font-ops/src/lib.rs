//! Generic sfnt table rewriting utilities.
//!
//! Everything here works on raw font bytes in and raw font bytes out, so the
//! container codecs and the job pipeline can chain operations without sharing
//! any parsed state.

mod assemble;
mod glyph;
pub mod hinting;
pub mod optimize;
pub mod outline;

use anyhow::{Context, Result};
use read_fonts::{FontRef, TableProvider, types::Tag};
use write_fonts::FontBuilder;

pub use assemble::{NewGlyph, TrueTypeBuilder};
pub use hinting::strip_hinting;
pub use optimize::optimize_outlines;
pub use outline::{cff_to_glyf, has_cff_outlines};

/// Name IDs used by the container codecs.
pub mod name_id {
    pub const FAMILY: u16 = 1;
    pub const SUBFAMILY: u16 = 2;
    pub const UNIQUE_ID: u16 = 3;
    pub const FULL_NAME: u16 = 4;
    pub const VERSION: u16 = 5;
    pub const POSTSCRIPT_NAME: u16 = 6;
}

/// Copy every table except `dropped` into a new font, then let `f` add
/// replacements. Missing tables in `dropped` are ignored.
pub fn rewrite_without(
    data: &[u8],
    dropped: &[Tag],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let mut builder = FontBuilder::new();
    let kept = font.table_directory.table_records().iter().map(|r| r.tag()).filter(|t| !dropped.contains(t));
    for tag in kept {
        if let Some(table) = font.table_data(tag) {
            builder.add_raw(tag, table);
        }
    }
    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// Look up a name table string, preferring Windows English records.
pub fn name_string(font: &FontRef, name_id: u16) -> Option<String> {
    let name = font.name().ok()?;
    let mut fallback = None;

    for record in name.name_record() {
        if record.name_id().to_u16() != name_id {
            continue;
        }
        let Ok(s) = record.string(name.string_data()) else {
            continue;
        };
        let s = s.chars().collect::<String>();
        if record.platform_id() == 3 && record.language_id() == 0x409 {
            return Some(s);
        }
        fallback.get_or_insert(s);
    }

    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::tests::square_font;

    #[test]
    fn test_rewrite_without_drops_tables() {
        let data = square_font();
        let rewritten = rewrite_without(&data, &[Tag::new(b"post")], |_, _| Ok(())).unwrap();

        let font = FontRef::new(&rewritten).unwrap();
        assert!(font.table_data(Tag::new(b"post")).is_none());
        assert!(font.table_data(Tag::new(b"glyf")).is_some());
    }

    #[test]
    fn test_name_string_reads_family() {
        let data = square_font();
        let font = FontRef::new(&data).unwrap();
        assert_eq!(name_string(&font, name_id::FAMILY).as_deref(), Some("Square"));
        assert_eq!(name_string(&font, 255), None);
    }

    #[test]
    fn test_rewrite_rejects_garbage() {
        assert!(rewrite_without(b"not a font", &[], |_, _| Ok(())).is_err());
    }
}
