//! Conversion of parsed `glyf` entries into their writable form.

use read_fonts::tables::glyf::{
    Anchor as ReadAnchor, CompositeGlyphFlags, CurvePoint, Glyph as ReadGlyph,
    SimpleGlyph as ReadSimpleGlyph,
};
use write_fonts::tables::glyf::{
    Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, Glyph, SimpleGlyph,
    Transform,
};

/// Split a simple glyph's points into contours.
pub(crate) fn contour_points(simple: &ReadSimpleGlyph) -> Vec<Vec<CurvePoint>> {
    let mut contours = Vec::new();
    let mut points = simple.points();
    let mut current = 0usize;

    for end_pt in simple.end_pts_of_contours() {
        let end = end_pt.get() as usize;
        let mut contour = Vec::new();
        while current <= end {
            if let Some(pt) = points.next() {
                contour.push(CurvePoint { x: pt.x, y: pt.y, on_curve: pt.on_curve });
            }
            current += 1;
        }
        contours.push(contour);
    }

    contours
}

pub(crate) fn simple_bbox(simple: &ReadSimpleGlyph) -> Bbox {
    Bbox {
        x_min: simple.x_min(),
        y_min: simple.y_min(),
        x_max: simple.x_max(),
        y_max: simple.y_max(),
    }
}

/// Whether a glyph carries TrueType instructions.
pub(crate) fn has_instructions(glyph: &ReadGlyph) -> bool {
    match glyph {
        ReadGlyph::Simple(simple) => !simple.instructions().is_empty(),
        ReadGlyph::Composite(composite) => composite
            .components()
            .any(|c| c.flags.contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS)),
    }
}

/// Convert a read-fonts glyph to a write-fonts glyph.
///
/// Composite instructions are never carried over; simple glyph instructions
/// are kept only when `keep_instructions` is set.
pub(crate) fn to_write_glyph(glyph: &ReadGlyph, keep_instructions: bool) -> Glyph {
    match glyph {
        ReadGlyph::Simple(simple) => {
            let contours: Vec<Contour> =
                contour_points(simple).into_iter().map(Contour::from).collect();
            let instructions =
                if keep_instructions { simple.instructions().to_vec() } else { vec![] };

            Glyph::Simple(SimpleGlyph { bbox: simple_bbox(simple), contours, instructions })
        }
        ReadGlyph::Composite(composite) => {
            let mut components: Vec<Component> = composite
                .components()
                .map(|comp| {
                    let anchor = match comp.anchor {
                        ReadAnchor::Offset { x, y } => Anchor::Offset { x, y },
                        ReadAnchor::Point { base, component } => Anchor::Point { base, component },
                    };
                    let transform = Transform {
                        xx: comp.transform.xx,
                        yx: comp.transform.yx,
                        xy: comp.transform.xy,
                        yy: comp.transform.yy,
                    };
                    let flags: ComponentFlags = comp.flags.into();
                    Component { glyph: comp.glyph, anchor, transform, flags }
                })
                .collect();

            if components.is_empty() {
                return Glyph::Empty;
            }

            let bbox = Bbox {
                x_min: composite.x_min(),
                y_min: composite.y_min(),
                x_max: composite.x_max(),
                y_max: composite.y_max(),
            };

            let first = components.remove(0);
            let mut composite_glyph = CompositeGlyph::new(first, bbox);
            for comp in components {
                composite_glyph.add_component(comp, bbox);
            }

            Glyph::Composite(composite_glyph)
        }
    }
}
