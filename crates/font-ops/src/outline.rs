//! Outline extraction and quadratic conversion.
//!
//! CFF-flavoured fonts are turned into TrueType-flavoured ones by drawing every
//! glyph through skrifa, approximating cubic segments with quadratics and
//! rebuilding `glyf`/`loca`.

use anyhow::{Context, Result, anyhow};
use kurbo::{BezPath, CubicBez, PathEl, Point};
use log::{debug, warn};
use read_fonts::{FontRef, TableProvider, types::Tag};
use skrifa::{
    GlyphId, MetadataProvider,
    instance::{LocationRef, Size},
    outline::{DrawSettings, OutlinePen},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::{GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::Head,
        maxp::Maxp,
    },
};

use crate::rewrite_without;

/// Maximum distance, in font units, between a cubic and its quadratic approximation.
pub const CUBIC_TOLERANCE: f64 = 1.0;

const CFF_TABLES: &[&[u8; 4]] = &[b"CFF ", b"CFF2", b"VORG"];

/// A pen that records skrifa drawing commands into a [`BezPath`].
#[derive(Debug, Default)]
pub struct BezPathPen(pub BezPath);

impl OutlinePen for BezPathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to((x as f64, y as f64));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to((x as f64, y as f64));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.0.quad_to((cx0 as f64, cy0 as f64), (x as f64, y as f64));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.curve_to((cx0 as f64, cy0 as f64), (cx1 as f64, cy1 as f64), (x as f64, y as f64));
    }

    fn close(&mut self) {
        self.0.close_path();
    }
}

/// Replace every cubic segment of `path` with quadratic approximations.
pub fn to_quadratic(path: &BezPath, tolerance: f64) -> BezPath {
    let mut out = BezPath::new();
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                out.move_to(p);
                current = p;
                start = p;
            }
            PathEl::LineTo(p) => {
                out.line_to(p);
                current = p;
            }
            PathEl::QuadTo(p1, p2) => {
                out.quad_to(p1, p2);
                current = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                for (_, _, quad) in CubicBez::new(current, p1, p2, p3).to_quads(tolerance) {
                    out.quad_to(quad.p1, quad.p2);
                }
                current = p3;
            }
            PathEl::ClosePath => {
                out.close_path();
                current = start;
            }
        }
    }

    out
}

/// Round all coordinates to integer font units.
fn round_path(path: &BezPath) -> BezPath {
    let round = |p: Point| Point::new(p.x.round(), p.y.round());
    path.elements()
        .iter()
        .map(|el| match *el {
            PathEl::MoveTo(p) => PathEl::MoveTo(round(p)),
            PathEl::LineTo(p) => PathEl::LineTo(round(p)),
            PathEl::QuadTo(p1, p2) => PathEl::QuadTo(round(p1), round(p2)),
            PathEl::CurveTo(p1, p2, p3) => PathEl::CurveTo(round(p1), round(p2), round(p3)),
            PathEl::ClosePath => PathEl::ClosePath,
        })
        .collect()
}

/// Convert an arbitrary outline into a TrueType simple glyph.
///
/// Returns `Ok(None)` for empty outlines.
pub fn quadratic_glyph(path: &BezPath) -> Result<Option<SimpleGlyph>> {
    if path.elements().iter().all(|el| matches!(el, PathEl::MoveTo(_) | PathEl::ClosePath)) {
        return Ok(None);
    }
    let quadratic = round_path(&to_quadratic(path, CUBIC_TOLERANCE));
    SimpleGlyph::from_bezpath(&quadratic)
        .map(Some)
        .map_err(|e| anyhow!("malformed outline: {e:?}"))
}

/// Check whether a font stores its outlines in CFF rather than `glyf`.
pub fn has_cff_outlines(font: &FontRef) -> bool {
    font.glyf().is_err()
        && (font.table_data(Tag::new(b"CFF ")).is_some()
            || font.table_data(Tag::new(b"CFF2")).is_some())
}

/// Rebuild a CFF-flavoured font with quadratic `glyf` outlines.
///
/// Glyphs whose outline cannot be drawn are kept as empty glyphs.
pub fn cff_to_glyf(data: &[u8]) -> Result<Vec<u8>> {
    let font = skrifa::FontRef::new(data).context("Failed to parse font")?;
    let num_glyphs = font.maxp().context("Failed to read maxp table")?.num_glyphs();
    let outlines = font.outline_glyphs();

    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut max_points = 0u16;
    let mut max_contours = 0u16;

    for gid in 0..num_glyphs {
        let glyph_id = GlyphId::new(gid as u32);
        let mut pen = BezPathPen::default();
        let drawn = match outlines.get(glyph_id) {
            Some(outline) => outline
                .draw(DrawSettings::unhinted(Size::unscaled(), LocationRef::default()), &mut pen)
                .map_err(|e| warn!("Glyph {gid}: could not draw outline: {e}"))
                .is_ok(),
            None => false,
        };

        let glyph = if drawn {
            match quadratic_glyph(&pen.0) {
                Ok(Some(simple)) => {
                    let points: usize = simple.contours.iter().map(|c| c.len()).sum();
                    max_points = max_points.max(points as u16);
                    max_contours = max_contours.max(simple.contours.len() as u16);
                    Glyph::Simple(simple)
                }
                Ok(None) => Glyph::Empty,
                Err(e) => {
                    warn!("Glyph {gid}: {e}");
                    Glyph::Empty
                }
            }
        } else {
            Glyph::Empty
        };
        glyf_builder.add_glyph(&glyph)?;
    }

    let (glyf, loca, loca_format) = glyf_builder.build();
    debug!("Converted {num_glyphs} CFF outlines to glyf");

    let mut dropped: Vec<Tag> = CFF_TABLES.iter().map(|t| Tag::new(t)).collect();
    dropped.extend([Tag::new(b"head"), Tag::new(b"maxp")]);

    rewrite_without(data, &dropped, |font, builder| {
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;

        let mut head: Head = font.head()?.to_owned_table();
        head.index_to_loc_format = loca_format as i16;
        builder.add_table(&head)?;

        let maxp = Maxp {
            num_glyphs,
            max_points: Some(max_points),
            max_contours: Some(max_contours),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };
        builder.add_table(&maxp)?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_quadratic_replaces_cubics() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((0.0, 100.0), (100.0, 100.0), (100.0, 0.0));
        path.close_path();

        let quadratic = to_quadratic(&path, CUBIC_TOLERANCE);
        assert!(quadratic.elements().iter().all(|el| !matches!(el, PathEl::CurveTo(..))));
        assert!(quadratic.elements().iter().any(|el| matches!(el, PathEl::QuadTo(..))));
        assert_eq!(quadratic.elements().last(), Some(&PathEl::ClosePath));
    }

    #[test]
    fn test_quadratic_glyph_bbox() {
        let mut path = BezPath::new();
        path.move_to((10.0, 0.0));
        path.line_to((10.0, 500.0));
        path.line_to((300.0, 500.0));
        path.line_to((300.0, 0.0));
        path.close_path();

        let glyph = quadratic_glyph(&path).unwrap().unwrap();
        assert_eq!(glyph.bbox.x_min, 10);
        assert_eq!(glyph.bbox.y_max, 500);
        assert_eq!(glyph.contours.len(), 1);
    }

    #[test]
    fn test_empty_path_has_no_glyph() {
        assert!(quadratic_glyph(&BezPath::new()).unwrap().is_none());
    }

    #[test]
    fn test_truetype_font_is_not_cff() {
        let data = crate::assemble::tests::square_font();
        assert!(!has_cff_outlines(&FontRef::new(&data).unwrap()));
    }

    #[test]
    fn test_pen_records_commands() {
        let mut pen = BezPathPen::default();
        pen.move_to(0.0, 0.0);
        pen.line_to(10.0, 0.0);
        pen.curve_to(10.0, 5.0, 5.0, 10.0, 0.0, 10.0);
        pen.close();
        assert_eq!(pen.0.elements().len(), 4);
    }

    #[test]
    fn test_cff2_font_becomes_truetype() {
        let data = font_test_data::CANTARELL_VF_TRIMMED;
        let source = FontRef::new(data).unwrap();
        assert!(has_cff_outlines(&source));
        let num_glyphs = source.maxp().unwrap().num_glyphs();

        let converted = cff_to_glyf(data).unwrap();
        let font = FontRef::new(&converted).unwrap();
        assert!(!has_cff_outlines(&font));
        for tag in CFF_TABLES {
            assert!(font.table_data(Tag::new(tag)).is_none(), "{tag:?}");
        }

        assert_eq!(font.maxp().unwrap().num_glyphs(), num_glyphs);
        let (glyf, loca) = (font.glyf().unwrap(), font.loca(None).unwrap());
        assert_eq!(loca.len(), num_glyphs as usize);
        let outlines = (0..num_glyphs)
            .map(|gid| loca.get_glyf(GlyphId::new(gid as u32), &glyf).unwrap())
            .filter(Option::is_some)
            .count();
        assert!(outlines > 0);

        let cmap = |font: &FontRef| font.table_data(Tag::new(b"cmap")).map(|d| d.as_bytes().to_vec());
        assert!(cmap(&source).is_some());
        assert_eq!(cmap(&font), cmap(&source));
    }
}
