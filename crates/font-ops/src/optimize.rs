//! Lossless outline reduction for TrueType glyphs.

use anyhow::{Context, Result};
use log::debug;
use read_fonts::{
    FontRef, TableProvider,
    tables::{
        glyf::{Anchor, CurvePoint, Glyf, Glyph as ReadGlyph},
        loca::Loca,
    },
    types::GlyphId,
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::{Contour, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::Head,
    },
    types::Tag,
};

use crate::{
    glyph::{contour_points, simple_bbox, to_write_glyph},
    hinting::has_hinting,
    rewrite_without,
};

/// Reduce redundant points in simple glyph outlines.
///
/// Consecutive duplicate on-curve points and on-curve points lying on the
/// straight line between two on-curve neighbours are removed; contours left
/// with fewer than two points are dropped. Hinted fonts, variable fonts,
/// fonts with point-matched composite components and fonts without `glyf`
/// are returned unchanged, as instructions, `gvar` deltas and component
/// anchors address points by index.
pub fn optimize_outlines(data: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let (Ok(glyf), Ok(loca)) = (font.glyf(), font.loca(None)) else {
        debug!("No glyf table, skipping outline reduction");
        return Ok(data.to_vec());
    };
    if has_hinting(&font) {
        debug!("Hinted font, skipping outline reduction");
        return Ok(data.to_vec());
    }
    if font.table_data(Tag::new(b"gvar")).is_some() {
        debug!("Variable font, skipping outline reduction");
        return Ok(data.to_vec());
    }
    if has_point_anchors(&glyf, &loca) {
        debug!("Composite glyphs anchored by point number, skipping outline reduction");
        return Ok(data.to_vec());
    }

    let mut removed = 0usize;
    let mut glyphs = Vec::with_capacity(loca.len());
    for gid in 0..loca.len() {
        let glyph = match loca.get_glyf(GlyphId::new(gid as u32), &glyf) {
            Ok(Some(ReadGlyph::Simple(simple))) => {
                let original: Vec<Vec<CurvePoint>> = contour_points(&simple);
                let before: usize = original.iter().map(Vec::len).sum();
                let contours: Vec<Vec<CurvePoint>> = original
                    .into_iter()
                    .map(reduce_contour)
                    .filter(|c| c.len() >= 2)
                    .collect();
                removed += before - contours.iter().map(Vec::len).sum::<usize>();

                if contours.is_empty() {
                    Glyph::Empty
                } else {
                    Glyph::Simple(SimpleGlyph {
                        bbox: simple_bbox(&simple),
                        contours: contours.into_iter().map(Contour::from).collect(),
                        instructions: vec![],
                    })
                }
            }
            Ok(Some(other)) => to_write_glyph(&other, false),
            _ => Glyph::Empty,
        };
        glyphs.push(glyph);
    }

    if removed == 0 {
        return Ok(data.to_vec());
    }
    debug!("Outline reduction removed {removed} points");

    let dropped = [Tag::new(b"glyf"), Tag::new(b"loca"), Tag::new(b"head")];
    rewrite_without(data, &dropped, |font, builder| {
        let mut glyf_builder = GlyfLocaBuilder::new();
        for glyph in &glyphs {
            glyf_builder.add_glyph(glyph)?;
        }
        let (new_glyf, new_loca, loca_format) = glyf_builder.build();
        builder.add_table(&new_glyf)?;
        builder.add_table(&new_loca)?;

        let mut head: Head = font.head()?.to_owned_table();
        head.index_to_loc_format = loca_format as i16;
        builder.add_table(&head)?;
        Ok(())
    })
}

/// Whether any composite glyph positions a component by matching point numbers.
fn has_point_anchors(glyf: &Glyf, loca: &Loca) -> bool {
    (0..loca.len()).any(|gid| match loca.get_glyf(GlyphId::new(gid as u32), glyf) {
        Ok(Some(ReadGlyph::Composite(composite))) => {
            composite.components().any(|c| matches!(c.anchor, Anchor::Point { .. }))
        }
        _ => false,
    })
}

/// Remove redundant points from one closed contour.
fn reduce_contour(mut points: Vec<CurvePoint>) -> Vec<CurvePoint> {
    // On-curve duplicates, including the closing point repeating the first
    // one. Repeated off-curve points still shape the curve.
    let same_on_curve = |a: &CurvePoint, b: &CurvePoint| a.on_curve && b.on_curve && a.x == b.x && a.y == b.y;
    points.dedup_by(|b, a| same_on_curve(a, b));
    while points.len() > 1 {
        if same_on_curve(&points[0], &points[points.len() - 1]) {
            points.pop();
        } else {
            break;
        }
    }

    // Collinear on-curve points between on-curve neighbours.
    let mut changed = true;
    while changed && points.len() > 2 {
        changed = false;
        let n = points.len();
        for i in 0..n {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            if cur.on_curve && prev.on_curve && next.on_curve && is_between(prev, cur, next) {
                points.remove(i);
                changed = true;
                break;
            }
        }
    }

    points
}

/// Whether `b` lies on the segment from `a` to `c`.
fn is_between(a: CurvePoint, b: CurvePoint, c: CurvePoint) -> bool {
    let (ax, ay) = (a.x as i64, a.y as i64);
    let (bx, by) = (b.x as i64, b.y as i64);
    let (cx, cy) = (c.x as i64, c.y as i64);
    let cross = (bx - ax) * (cy - ay) - (by - ay) * (cx - ax);
    cross == 0
        && bx >= ax.min(cx)
        && bx <= ax.max(cx)
        && by >= ay.min(cy)
        && by <= ay.max(cy)
}
