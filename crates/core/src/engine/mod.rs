//! Font parsing and serialization behind a swappable interface.

mod decode;

use std::borrow::Cow;

use anyhow::Context;
use fontgen_font_ops::{optimize_outlines, strip_hinting};
use fontgen_font_subsetter::Subsetter;
use log::debug;

use crate::{
    config::{InputType, TargetFormat},
    error::Result,
    subset::CodePointSubset,
};

/// Turns input bytes into an in-memory font.
pub trait FontEngine {
    type Font: FontModel;

    /// Parse `data` of the given type, keeping only the glyphs `subset` needs.
    fn parse(&self, data: &[u8], input_type: InputType, subset: &CodePointSubset)
    -> Result<Self::Font>;

    /// One-time runtime setup a format needs before its first use. Idempotent.
    fn prepare_format(&self, _format: TargetFormat) -> Result<()> {
        Ok(())
    }
}

/// An in-memory font produced by a [`FontEngine`].
pub trait FontModel {
    /// Simplify outlines without changing how the font renders.
    fn optimize(&mut self) -> Result<()>;

    /// Serialize to `format`, dropping hinting unless `hinting` is set.
    fn write(&self, format: TargetFormat, hinting: bool) -> Result<Vec<u8>>;
}

/// The default engine: every input becomes TrueType-flavoured sfnt data.
#[derive(Debug, Clone, Copy, Default)]
pub struct SfntEngine;

/// TrueType font data held by [`SfntEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfntFont {
    data: Vec<u8>,
}

impl SfntFont {
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl FontEngine for SfntEngine {
    type Font = SfntFont;

    fn parse(
        &self,
        data: &[u8],
        input_type: InputType,
        subset: &CodePointSubset,
    ) -> Result<SfntFont> {
        let mut sfnt = decode::to_truetype(data, input_type)?;

        if let Some(codepoints) = subset.codepoints() {
            sfnt = Subsetter::new()
                .with_codepoints(codepoints.iter().copied())
                .retain_glyph_names(true)
                .subset(&sfnt)
                .context("Failed to subset font")?;
            debug!("Subset to {} code points: {} bytes", codepoints.len(), sfnt.len());
        }
        Ok(SfntFont { data: sfnt })
    }

    fn prepare_format(&self, format: TargetFormat) -> Result<()> {
        if format == TargetFormat::Woff2 {
            fontgen_font_woff2::init();
        }
        Ok(())
    }
}

impl FontModel for SfntFont {
    fn optimize(&mut self) -> Result<()> {
        self.data = optimize_outlines(&self.data)?;
        Ok(())
    }

    fn write(&self, format: TargetFormat, hinting: bool) -> Result<Vec<u8>> {
        let data: Cow<[u8]> =
            if hinting { Cow::Borrowed(&self.data) } else { Cow::Owned(strip_hinting(&self.data)?) };

        let bytes = match format {
            TargetFormat::Ttf => data.into_owned(),
            TargetFormat::Woff => fontgen_font_woff::encode(&data).map_err(anyhow::Error::from)?,
            TargetFormat::Woff2 => fontgen_font_woff2::init().encode(&data)?,
            TargetFormat::Eot => fontgen_font_eot::encode(&data).map_err(anyhow::Error::from)?,
            TargetFormat::Svg => {
                fontgen_font_svg::encode(&data).map_err(anyhow::Error::from)?.into_bytes()
            }
        };
        debug!("Serialized {format}: {} bytes", bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use fontgen_font_ops::{NewGlyph, TrueTypeBuilder, outline::quadratic_glyph};
    use kurbo::{Rect, Shape};
    use read_fonts::{FontRef, TableProvider, types::Tag};

    use super::*;
    use crate::config::SubsetCategory;

    fn test_font() -> Vec<u8> {
        let mut builder = TrueTypeBuilder::new("Engine", 1000);
        let rect = |x: f64| quadratic_glyph(&Rect::new(x, 0.0, x + 200.0, 600.0).to_path(0.1)).unwrap();
        builder.add_glyph(NewGlyph::new(rect(0.0), 400));
        builder.add_glyph(NewGlyph::new(None, 250).with_codepoints([' ']));
        for (i, ch) in "abcXYZ19".chars().enumerate() {
            builder.add_glyph(NewGlyph::new(rect(i as f64 * 5.0), 500).with_codepoints([ch]));
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_parse_unrestricted_keeps_everything() {
        let data = test_font();
        let font = SfntEngine.parse(&data, InputType::Ttf, &CodePointSubset::Unrestricted).unwrap();
        assert_eq!(font.data(), data.as_slice());
    }

    #[test]
    fn test_parse_restricted_subsets_glyphs() {
        let subset = CodePointSubset::resolve(&[SubsetCategory::LowerCase], "");
        let font = SfntEngine.parse(&test_font(), InputType::Ttf, &subset).unwrap();

        let parsed = FontRef::new(font.data()).unwrap();
        let cmap = parsed.cmap().unwrap();
        for ch in [' ', 'a', 'b', 'c'] {
            assert!(cmap.map_codepoint(ch).is_some(), "{ch:?}");
        }
        assert!(cmap.map_codepoint('X').is_none());
        assert!(cmap.map_codepoint('1').is_none());
        assert_eq!(parsed.maxp().unwrap().num_glyphs(), 5);
    }

    #[test]
    fn test_every_format_serializes() {
        let mut font = SfntEngine.parse(&test_font(), InputType::Ttf, &CodePointSubset::Unrestricted).unwrap();
        font.optimize().unwrap();

        for format in TargetFormat::ALL {
            SfntEngine.prepare_format(format).unwrap();
            let bytes = font.write(format, false).unwrap();
            let recognized = match format {
                TargetFormat::Ttf => bytes.starts_with(&[0, 1, 0, 0]),
                TargetFormat::Woff => bytes.starts_with(b"wOFF"),
                TargetFormat::Woff2 => bytes.starts_with(b"wOF2"),
                TargetFormat::Eot => bytes[34..36] == [0x4C, 0x50],
                TargetFormat::Svg => bytes.starts_with(b"<?xml"),
            };
            assert!(recognized, "{format}");
        }
    }

    #[test]
    fn test_written_formats_parse_back() {
        let font = SfntEngine.parse(&test_font(), InputType::Ttf, &CodePointSubset::Unrestricted).unwrap();
        for (format, input_type) in [
            (TargetFormat::Woff, InputType::Woff),
            (TargetFormat::Woff2, InputType::Woff2),
            (TargetFormat::Eot, InputType::Eot),
            (TargetFormat::Svg, InputType::Svg),
        ] {
            let bytes = font.write(format, true).unwrap();
            let reparsed = SfntEngine.parse(&bytes, input_type, &CodePointSubset::Unrestricted).unwrap();
            let reparsed = FontRef::new(reparsed.data()).unwrap();
            assert!(reparsed.cmap().unwrap().map_codepoint('Z').is_some(), "{format}");
        }
    }

    #[test]
    fn test_parse_otf_converts_cff_outlines() {
        let data = font_test_data::CANTARELL_VF_TRIMMED;
        let source = FontRef::new(data).unwrap();
        let font = SfntEngine.parse(data, InputType::Otf, &CodePointSubset::Unrestricted).unwrap();

        let parsed = FontRef::new(font.data()).unwrap();
        assert!(parsed.table_data(Tag::new(b"CFF2")).is_none());
        assert!(parsed.table_data(Tag::new(b"CFF ")).is_none());
        assert!(parsed.glyf().is_ok());
        let num_glyphs = source.maxp().unwrap().num_glyphs();
        assert_eq!(parsed.maxp().unwrap().num_glyphs(), num_glyphs);
        assert_eq!(parsed.loca(None).unwrap().len(), num_glyphs as usize);

        let cmap = |font: &FontRef| font.table_data(Tag::new(b"cmap")).map(|d| d.as_bytes().to_vec());
        assert_eq!(cmap(&parsed), cmap(&source));
        assert!(font.write(TargetFormat::Ttf, true).unwrap().starts_with(&[0, 1, 0, 0]));
    }
}
