//! Normalizing every accepted input into TrueType-flavoured sfnt data.

use allsorts::{
    binary::read::ReadScope,
    font_data::FontData,
    tables::FontTableProvider,
};
use anyhow::{Context, Result, anyhow};
use fontgen_font_ops::{cff_to_glyf, has_cff_outlines};
use log::debug;
use read_fonts::FontRef;
use write_fonts::{FontBuilder, types::Tag};

use crate::config::InputType;

/// Decode input bytes into sfnt data with `glyf` outlines.
pub(crate) fn to_truetype(data: &[u8], input_type: InputType) -> Result<Vec<u8>> {
    let sfnt = match input_type {
        InputType::Ttf | InputType::Otf => data.to_vec(),
        InputType::Woff | InputType::Woff2 => unwrap_web_font(data, input_type)?,
        InputType::Eot => fontgen_font_eot::decode(data)?,
        InputType::Svg => {
            let text = std::str::from_utf8(data).context("SVG font is not valid UTF-8")?;
            fontgen_font_svg::decode(text)?
        }
    };

    let font = FontRef::new(&sfnt).with_context(|| format!("Failed to parse {input_type} font"))?;
    if has_cff_outlines(&font) {
        debug!("Converting CFF outlines to glyf");
        return cff_to_glyf(&sfnt);
    }
    Ok(sfnt)
}

/// Rebuild a plain sfnt from WOFF or WOFF2 data.
fn unwrap_web_font(data: &[u8], input_type: InputType) -> Result<Vec<u8>> {
    let font_file = ReadScope::new(data)
        .read::<FontData<'_>>()
        .map_err(|e| anyhow!("Failed to read {input_type} container: {e}"))?;
    let provider = font_file
        .table_provider(0)
        .map_err(|e| anyhow!("Failed to open {input_type} font: {e}"))?;
    let tags = provider
        .table_tags()
        .ok_or_else(|| anyhow!("{input_type} font has no table directory"))?;

    let mut builder = FontBuilder::new();
    for tag in &tags {
        let table = provider
            .read_table_data(*tag)
            .map_err(|e| anyhow!("Failed to read table {}: {e}", Tag::from_be_bytes(tag.to_be_bytes())))?;
        builder.add_raw(Tag::from_be_bytes(tag.to_be_bytes()), table.into_owned());
    }
    debug!("Unwrapped {} tables from {input_type}", tags.len());
    Ok(builder.build())
}
