//! TrueType hinting removal.
//!
//! Hinting lives in three places:
//!
//! - global programs and control values: `fpgm`, `prep`, `cvt `
//! - device metrics derived from hinted rendering: `hdmx`, `LTSH`, `VDMX`
//! - per-glyph instructions inside `glyf`
//!
//! Stripping removes all of them and zeroes the `maxp` limits that only
//! describe the instruction interpreter.

use anyhow::{Context, Result};
use log::debug;
use read_fonts::{FontRef, TableProvider, types::GlyphId};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{glyf::GlyfLocaBuilder, head::Head, maxp::Maxp},
    types::Tag,
};

use crate::{glyph::to_write_glyph, rewrite_without};

/// Tables that exist only to support hinted rendering.
pub const HINTING_TABLES: &[&[u8; 4]] = &[b"fpgm", b"prep", b"cvt ", b"hdmx", b"LTSH", b"VDMX"];

/// Check whether a font carries any TrueType hinting.
pub fn has_hinting(font: &FontRef) -> bool {
    if HINTING_TABLES.iter().any(|tag| font.table_data(Tag::new(tag)).is_some()) {
        return true;
    }

    let (Ok(glyf), Ok(loca)) = (font.glyf(), font.loca(None)) else {
        return false;
    };
    (0..loca.len()).any(|gid| {
        matches!(
            loca.get_glyf(GlyphId::new(gid as u32), &glyf),
            Ok(Some(glyph)) if crate::glyph::has_instructions(&glyph)
        )
    })
}

/// Remove all hinting from font data.
///
/// Fonts without a `glyf` table only lose the hinting tables.
pub fn strip_hinting(data: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    if !has_hinting(&font) {
        debug!("Font has no hinting to strip");
        return Ok(data.to_vec());
    }

    let has_glyf = font.glyf().is_ok() && font.loca(None).is_ok();
    let mut dropped: Vec<Tag> = HINTING_TABLES.iter().map(|t| Tag::new(t)).collect();
    if has_glyf {
        dropped.extend([Tag::new(b"glyf"), Tag::new(b"loca"), Tag::new(b"head")]);
    }
    dropped.push(Tag::new(b"maxp"));

    rewrite_without(data, &dropped, |font, builder| {
        if has_glyf {
            let glyf = font.glyf()?;
            let loca = font.loca(None)?;
            let mut glyf_builder = GlyfLocaBuilder::new();

            for gid in 0..loca.len() {
                let glyph = match loca.get_glyf(GlyphId::new(gid as u32), &glyf) {
                    Ok(Some(glyph)) => to_write_glyph(&glyph, false),
                    _ => write_fonts::tables::glyf::Glyph::Empty,
                };
                glyf_builder.add_glyph(&glyph)?;
            }

            let (new_glyf, new_loca, loca_format) = glyf_builder.build();
            builder.add_table(&new_glyf)?;
            builder.add_table(&new_loca)?;

            let mut head: Head = font.head()?.to_owned_table();
            head.index_to_loc_format = loca_format as i16;
            builder.add_table(&head)?;
        }

        let mut maxp: Maxp = font.maxp()?.to_owned_table();
        if maxp.max_zones.is_some() {
            maxp.max_zones = Some(1);
            maxp.max_twilight_points = Some(0);
            maxp.max_storage = Some(0);
            maxp.max_function_defs = Some(0);
            maxp.max_instruction_defs = Some(0);
            maxp.max_stack_elements = Some(0);
            maxp.max_size_of_instructions = Some(0);
        }
        builder.add_table(&maxp)?;

        debug!("Stripped hinting from {} glyphs", font.maxp()?.num_glyphs());
        Ok(())
    })
}
