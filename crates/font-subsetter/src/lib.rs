//! Code point subsetting on top of hb-subset.
//!
//! ```no_run
//! use fontgen_font_subsetter::Subsetter;
//!
//! let font_data: &[u8] = &[];
//! let subset = Subsetter::new()
//!     .with_codepoints(['a', 'b', 'c'])
//!     .with_unicode_range(0x30..=0x39)
//!     .subset(font_data);
//! ```

use std::{collections::BTreeSet, ops::RangeInclusive};

use anyhow::{Result, bail};
use hb_subset::{Blob, FontFace, SubsetInput, Tag};
use log::debug;

/// Which code points, names and tables survive a subset.
#[derive(Debug, Default, Clone)]
pub struct Subsetter {
    codepoints: BTreeSet<char>,
    retain_glyph_names: bool,
    drop_tables: Vec<[u8; 4]>,
}

impl Subsetter {
    /// A subsetter that keeps nothing but `.notdef`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codepoints(mut self, codepoints: impl IntoIterator<Item = char>) -> Self {
        self.codepoints.extend(codepoints);
        self
    }

    /// Keep every scalar value in `range`; surrogates are skipped.
    pub fn with_unicode_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.codepoints.extend(range.filter_map(char::from_u32));
        self
    }

    /// Keep `post` glyph names, which the SVG writer uses for `glyph-name`.
    pub fn retain_glyph_names(mut self, retain: bool) -> Self {
        self.retain_glyph_names = retain;
        self
    }

    pub fn drop_tables(mut self, tables: impl IntoIterator<Item = [u8; 4]>) -> Self {
        self.drop_tables.extend(tables);
        self
    }

    /// Number of distinct code points requested.
    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }

    pub fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            bail!("No font data to subset");
        }

        let mut input = SubsetInput::new()?;
        if self.retain_glyph_names {
            input.flags().retain_glyph_names();
        }
        {
            let mut unicodes = input.unicode_set();
            for &ch in &self.codepoints {
                unicodes.insert(ch);
            }
        }
        if !self.drop_tables.is_empty() {
            let mut dropped = input.drop_table_tag_set();
            for table in &self.drop_tables {
                dropped.insert(Tag::new(table));
            }
        }

        let face = FontFace::new(Blob::from_bytes(data)?)?;
        let output = input.subset_font(&face)?.underlying_blob().to_vec();
        debug!("Subset to {} code points: {} -> {} bytes", self.len(), data.len(), output.len());
        Ok(output)
    }
}
