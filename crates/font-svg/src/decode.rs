//! Reading SVG fonts into TrueType data.

use std::collections::HashMap;

use fontgen_font_ops::{NewGlyph, TrueTypeBuilder, outline::quadratic_glyph};
use kurbo::BezPath;
use log::debug;
use roxmltree::{Document, Node, ParsingOptions};

use crate::{Error, Result};

const DEFAULT_UNITS_PER_EM: u16 = 1000;

/// Convert an SVG font document into a TrueType font.
///
/// Glyphs that share a name and outline are merged so a glyph written once
/// per code point comes back as a single glyph. Ligature `unicode` values
/// (more than one character) are kept as unmapped glyphs.
pub fn decode(svg: &str) -> Result<Vec<u8>> {
    let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
    let document = Document::parse_with_options(svg, options)?;
    let font = document
        .descendants()
        .find(|n| n.has_tag_name("font"))
        .ok_or(Error::NoFont)?;

    let face = font.children().find(|n| n.has_tag_name("font-face"));
    let units_per_em = match face.and_then(|f| f.attribute("units-per-em")) {
        Some(value) => number(value, "units-per-em")?.round() as u16,
        None => DEFAULT_UNITS_PER_EM,
    };
    let default_advance = optional_number(font, "horiz-adv-x")?.unwrap_or(units_per_em as f64);

    let family = face
        .and_then(|f| f.attribute("font-family"))
        .or_else(|| font.attribute("id"))
        .unwrap_or("Untitled");
    let mut builder = TrueTypeBuilder::new(family, units_per_em).style(style_name(face));
    if let Some(face) = face
        && let (Some(ascent), Some(descent)) =
            (optional_number(face, "ascent")?, optional_number(face, "descent")?)
    {
        builder = builder.metrics(ascent.round() as i16, descent.round() as i16);
    }

    let notdef = match font.children().find(|n| n.has_tag_name("missing-glyph")) {
        Some(node) => glyph_from_node(node, default_advance, ".notdef")?,
        None => NewGlyph::new(None, default_advance.round() as u16),
    };
    builder.add_glyph(notdef);

    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    let mut glyphs: Vec<NewGlyph> = Vec::new();
    for node in font.children().filter(|n| n.has_tag_name("glyph")) {
        let name = node.attribute("glyph-name").unwrap_or_default().to_string();
        let d = node.attribute("d").unwrap_or_default().to_string();
        let codepoint = single_char(node.attribute("unicode"));

        if !name.is_empty() {
            if let Some(&index) = seen.get(&(name.clone(), d.clone())) {
                glyphs[index].codepoints.extend(codepoint);
                continue;
            }
            seen.insert((name.clone(), d), glyphs.len());
        }
        glyphs.push(glyph_from_node(node, default_advance, &name)?.with_codepoints(codepoint));
    }

    debug!("SVG font {family:?}: {} glyphs", glyphs.len() + 1);
    for glyph in glyphs {
        builder.add_glyph(glyph);
    }
    Ok(builder.build()?)
}

fn glyph_from_node(node: Node, default_advance: f64, name: &str) -> Result<NewGlyph> {
    let advance = optional_number(node, "horiz-adv-x")?.unwrap_or(default_advance);
    let outline = match node.attribute("d").map(str::trim) {
        Some(d) if !d.is_empty() => {
            let path = BezPath::from_svg(d).map_err(|e| Error::PathData {
                glyph: name.to_string(),
                message: e.to_string(),
            })?;
            quadratic_glyph(&path)?
        }
        _ => None,
    };
    Ok(NewGlyph::new(outline, advance.max(0.0).round() as u16))
}

/// The code point of a one-character `unicode` attribute.
fn single_char(value: Option<&str>) -> Option<char> {
    let mut chars = value?.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

fn style_name(face: Option<Node>) -> String {
    let weight = face.and_then(|f| f.attribute("font-weight")).unwrap_or("normal");
    let italic = face
        .and_then(|f| f.attribute("font-style"))
        .is_some_and(|s| s.eq_ignore_ascii_case("italic") || s.eq_ignore_ascii_case("oblique"));
    let bold = weight.eq_ignore_ascii_case("bold") || weight.parse::<u16>().is_ok_and(|w| w >= 600);

    match (bold, italic) {
        (true, true) => "Bold Italic",
        (true, false) => "Bold",
        (false, true) => "Italic",
        (false, false) => "Regular",
    }
    .to_string()
}

fn number(value: &str, attribute: &'static str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Attribute { attribute, value: value.to_string() })
}

fn optional_number(node: Node, attribute: &'static str) -> Result<Option<f64>> {
    node.attribute(attribute).map(|v| number(v, attribute)).transpose()
}
