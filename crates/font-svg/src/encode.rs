//! Writing SVG fonts from sfnt data.

use fontgen_font_ops::{name_id, name_string, outline::BezPathPen};
use log::{debug, warn};
use read_fonts::{TableProvider, types::GlyphId16};
use skrifa::{
    FontRef, GlyphId, MetadataProvider,
    instance::{LocationRef, Size},
    outline::DrawSettings,
};

use crate::{Result, escape};

/// Convert an sfnt font into an SVG font document.
///
/// Every code point mapping produces its own `<glyph>` element; glyphs
/// without a mapping are written with their name only, and glyph 0 becomes
/// the `<missing-glyph>`. Coordinates stay in font units with y pointing up.
pub fn encode(data: &[u8]) -> Result<String> {
    let font = FontRef::new(data)?;
    let num_glyphs = font.maxp()?.num_glyphs() as usize;
    let metrics = font.metrics(Size::unscaled(), LocationRef::default());
    let glyph_metrics = font.glyph_metrics(Size::unscaled(), LocationRef::default());
    let outlines = font.outline_glyphs();
    let post = font.post().ok();

    let mut codepoints: Vec<Vec<char>> = vec![Vec::new(); num_glyphs];
    for (cp, gid) in font.charmap().mappings() {
        if let (Some(ch), Some(slot)) = (char::from_u32(cp), codepoints.get_mut(gid.to_u32() as usize))
        {
            slot.push(ch);
        }
    }

    let family = name_string(&font, name_id::FAMILY).unwrap_or_else(|| "Untitled".to_string());
    let id = name_string(&font, name_id::POSTSCRIPT_NAME).unwrap_or_else(|| family.replace(' ', ""));
    let (weight, italic) = match font.os2() {
        Ok(os2) => (os2.us_weight_class(), os2.fs_selection().bits() & 0x0001 != 0),
        Err(_) => (400, false),
    };

    let advance = |gid: usize| {
        glyph_metrics.advance_width(GlyphId::new(gid as u32)).unwrap_or(0.0).round() as i32
    };
    let path_data = |gid: usize| {
        let mut pen = BezPathPen::default();
        let Some(outline) = outlines.get(GlyphId::new(gid as u32)) else {
            return String::new();
        };
        let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
        match outline.draw(settings, &mut pen) {
            Ok(_) => pen.0.to_svg(),
            Err(e) => {
                warn!("Glyph {gid}: could not draw outline: {e}");
                String::new()
            }
        }
    };
    let glyph_name = |gid: usize| {
        post.as_ref()
            .and_then(|post| post.glyph_name(GlyphId16::new(gid as u16)))
            .map(str::to_string)
            .or_else(|| codepoints[gid].first().map(|ch| format!("uni{:04X}", *ch as u32)))
            .unwrap_or_else(|| format!("glyph{gid}"))
    };

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" standalone=\"no\"?>\n");
    svg.push_str(
        "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
         \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
    );
    svg.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\">\n<defs>\n");
    svg.push_str(&format!(
        "<font id=\"{}\" horiz-adv-x=\"{}\">\n",
        escape(&id),
        if num_glyphs > 0 { advance(0) } else { 0 }
    ));

    let mut face = format!(
        "  <font-face font-family=\"{}\" font-weight=\"{weight}\" font-style=\"{}\" \
         units-per-em=\"{}\" ascent=\"{}\" descent=\"{}\"",
        escape(&family),
        if italic { "italic" } else { "normal" },
        metrics.units_per_em,
        metrics.ascent.round() as i32,
        metrics.descent.round() as i32,
    );
    if let Some(bounds) = metrics.bounds {
        face.push_str(&format!(
            " bbox=\"{} {} {} {}\"",
            bounds.x_min, bounds.y_min, bounds.x_max, bounds.y_max
        ));
    }
    face.push_str(" />\n");
    svg.push_str(&face);

    let mut written = 0usize;
    for gid in 0..num_glyphs {
        let d = path_data(gid);
        let d_attr = if d.is_empty() { String::new() } else { format!(" d=\"{d}\"") };
        let adv = advance(gid);

        if gid == 0 {
            svg.push_str(&format!("  <missing-glyph horiz-adv-x=\"{adv}\"{d_attr} />\n"));
        }

        let name = escape(&glyph_name(gid));
        if codepoints[gid].is_empty() {
            if gid != 0 {
                svg.push_str(&format!(
                    "  <glyph glyph-name=\"{name}\" horiz-adv-x=\"{adv}\"{d_attr} />\n"
                ));
                written += 1;
            }
            continue;
        }
        for ch in &codepoints[gid] {
            svg.push_str(&format!(
                "  <glyph glyph-name=\"{name}\" unicode=\"&#x{:X};\" horiz-adv-x=\"{adv}\"{d_attr} />\n",
                *ch as u32
            ));
            written += 1;
        }
    }

    svg.push_str("</font>\n</defs>\n</svg>\n");
    debug!("SVG: wrote {written} glyph elements for {num_glyphs} glyphs");
    Ok(svg)
}
