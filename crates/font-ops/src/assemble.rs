//! Assembling a complete TrueType font from outlines.

use anyhow::{Result, anyhow};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{Bbox, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
    },
    types::{FWord, Fixed, GlyphId, LongDateTime, NameId, UfWord, Version16Dot16},
};

use crate::name_id;

/// Seconds between 1904-01-01 (the sfnt epoch) and 1970-01-01.
const SFNT_EPOCH_OFFSET: i64 = 2_082_844_800;

/// A glyph to be placed in an assembled font.
#[derive(Debug, Clone)]
pub struct NewGlyph {
    pub outline: Option<SimpleGlyph>,
    pub advance: u16,
    pub codepoints: Vec<char>,
}

impl NewGlyph {
    pub fn new(outline: Option<SimpleGlyph>, advance: u16) -> Self {
        Self { outline, advance, codepoints: Vec::new() }
    }

    pub fn with_codepoints(mut self, codepoints: impl IntoIterator<Item = char>) -> Self {
        self.codepoints.extend(codepoints);
        self
    }

    fn bbox(&self) -> Option<Bbox> {
        self.outline.as_ref().map(|g| g.bbox)
    }

    fn point_count(&self) -> (u16, u16) {
        let Some(outline) = &self.outline else {
            return (0, 0);
        };
        let points: usize = outline.contours.iter().map(|c| c.len()).sum();
        (points as u16, outline.contours.len() as u16)
    }
}

/// Builds the minimal table set of a TrueType font: `head`, `hhea`, `maxp`,
/// `OS/2`, `name`, `cmap`, `post`, `glyf`, `loca` and `hmtx`.
///
/// Glyph 0 is `.notdef`; the first glyph added takes that slot.
#[derive(Debug, Clone)]
pub struct TrueTypeBuilder {
    family: String,
    style: String,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    glyphs: Vec<NewGlyph>,
}

impl TrueTypeBuilder {
    pub fn new(family: impl Into<String>, units_per_em: u16) -> Self {
        let ascent = (units_per_em as f32 * 0.8).round() as i16;
        Self {
            family: family.into(),
            style: "Regular".to_string(),
            units_per_em,
            ascent,
            descent: ascent - units_per_em as i16,
            glyphs: Vec::new(),
        }
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Sets the vertical metrics. `descent` is negative below the baseline.
    pub fn metrics(mut self, ascent: i16, descent: i16) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self
    }

    pub fn add_glyph(&mut self, glyph: NewGlyph) -> &mut Self {
        self.glyphs.push(glyph);
        self
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        if self.glyphs.is_empty() {
            return Err(anyhow!("a font needs at least a .notdef glyph"));
        }
        let num_glyphs = u16::try_from(self.glyphs.len())
            .map_err(|_| anyhow!("too many glyphs: {}", self.glyphs.len()))?;

        let mut glyf_builder = GlyfLocaBuilder::new();
        for glyph in &self.glyphs {
            let glyph = match &glyph.outline {
                Some(outline) => Glyph::Simple(outline.clone()),
                None => Glyph::Empty,
            };
            glyf_builder.add_glyph(&glyph)?;
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let font_bbox = self
            .glyphs
            .iter()
            .filter_map(NewGlyph::bbox)
            .reduce(union_bbox)
            .unwrap_or(Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 });

        let mut h_metrics = Vec::with_capacity(self.glyphs.len());
        let mut min_lsb = i16::MAX;
        let mut min_rsb = i16::MAX;
        let mut max_extent = i16::MIN;
        for glyph in &self.glyphs {
            let lsb = glyph.bbox().map_or(0, |b| b.x_min);
            h_metrics.push(LongMetric { advance: glyph.advance, side_bearing: lsb });
            if let Some(bbox) = glyph.bbox() {
                min_lsb = min_lsb.min(bbox.x_min);
                min_rsb = min_rsb.min((glyph.advance as i32 - bbox.x_max as i32) as i16);
                max_extent = max_extent.max(bbox.x_max);
            }
        }
        if max_extent == i16::MIN {
            (min_lsb, min_rsb, max_extent) = (0, 0, 0);
        }
        let advance_width_max = self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0);

        let mut mappings = Vec::new();
        for (gid, glyph) in self.glyphs.iter().enumerate() {
            for ch in &glyph.codepoints {
                mappings.push((*ch, GlyphId::new(gid as u32)));
            }
        }
        mappings.sort_by_key(|(ch, _)| *ch);
        mappings.dedup_by_key(|(ch, _)| *ch);
        let first_char = mappings.first().map_or(0, |(ch, _)| (*ch as u32).min(0xFFFF) as u16);
        let last_char = mappings.last().map_or(0, |(ch, _)| (*ch as u32).min(0xFFFF) as u16);
        let cmap = Cmap::from_mappings(mappings).map_err(|e| anyhow!("cmap: {e:?}"))?;

        let now = LongDateTime::new(chrono::Utc::now().timestamp() + SFNT_EPOCH_OFFSET);
        let head = Head {
            font_revision: Fixed::from_f64(1.0),
            checksum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: Flags::from_bits_truncate(0b1011),
            units_per_em: self.units_per_em,
            created: now,
            modified: now,
            x_min: font_bbox.x_min,
            y_min: font_bbox.y_min,
            x_max: font_bbox.x_max,
            y_max: font_bbox.y_max,
            mac_style: MacStyle::empty(),
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: loca_format as i16,
        };

        let line_gap = 0;
        let hhea = Hhea {
            ascender: FWord::new(self.ascent),
            descender: FWord::new(self.descent),
            line_gap: FWord::new(line_gap),
            advance_width_max: UfWord::new(advance_width_max),
            min_left_side_bearing: FWord::new(min_lsb),
            min_right_side_bearing: FWord::new(min_rsb),
            x_max_extent: FWord::new(max_extent),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: num_glyphs,
        };
        let hmtx = Hmtx::new(h_metrics, vec![]);

        let (max_points, max_contours) = self
            .glyphs
            .iter()
            .map(NewGlyph::point_count)
            .fold((0, 0), |(p, c), (gp, gc)| (p.max(gp), c.max(gc)));
        let maxp = Maxp {
            num_glyphs,
            max_points: Some(max_points),
            max_contours: Some(max_contours),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(2),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };

        let avg_width = {
            let inked: Vec<u32> = self
                .glyphs
                .iter()
                .filter(|g| g.advance > 0)
                .map(|g| g.advance as u32)
                .collect();
            if inked.is_empty() { 0 } else { (inked.iter().sum::<u32>() / inked.len() as u32) as i16 }
        };
        let os2 = Os2 {
            x_avg_char_width: avg_width,
            us_weight_class: weight_class_for(&self.style),
            us_width_class: 5,
            s_typo_ascender: self.ascent,
            s_typo_descender: self.descent,
            s_typo_line_gap: line_gap,
            us_win_ascent: font_bbox.y_max.max(self.ascent).max(0) as u16,
            us_win_descent: (-(font_bbox.y_min.min(self.descent) as i32)).max(0) as u16,
            us_first_char_index: first_char,
            us_last_char_index: last_char,
            ..Default::default()
        };

        let post = Post {
            version: Version16Dot16::VERSION_3_0,
            italic_angle: Fixed::from_f64(0.0),
            underline_position: FWord::new(-(self.units_per_em as i16) / 10),
            underline_thickness: FWord::new((self.units_per_em / 20) as i16),
            is_fixed_pitch: 0,
            min_mem_type42: 0,
            max_mem_type42: 0,
            min_mem_type1: 0,
            max_mem_type1: 0,
            num_glyphs: None,
            glyph_name_index: None,
            string_data: None,
        };

        let name = self.name_table();

        let mut builder = FontBuilder::new();
        builder.add_table(&head)?;
        builder.add_table(&hhea)?;
        builder.add_table(&hmtx)?;
        builder.add_table(&maxp)?;
        builder.add_table(&os2)?;
        builder.add_table(&name)?;
        builder.add_table(&cmap)?;
        builder.add_table(&post)?;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;
        Ok(builder.build())
    }

    fn name_table(&self) -> Name {
        let full_name = format!("{} {}", self.family, self.style);
        let postscript = format!("{}-{}", self.family, self.style).replace(' ', "");
        let entries = [
            (name_id::FAMILY, self.family.clone()),
            (name_id::SUBFAMILY, self.style.clone()),
            (name_id::UNIQUE_ID, postscript.clone()),
            (name_id::FULL_NAME, full_name),
            (name_id::VERSION, "Version 1.0".to_string()),
            (name_id::POSTSCRIPT_NAME, postscript),
        ];

        let records = entries
            .into_iter()
            .map(|(id, value)| NameRecord::new(3, 1, 0x409, NameId::new(id), value.into()))
            .collect();
        Name::new(records)
    }
}

fn weight_class_for(style: &str) -> u16 {
    let style = style.to_ascii_lowercase();
    if style.contains("bold") {
        700
    } else if style.contains("light") {
        300
    } else {
        400
    }
}

fn union_bbox(a: Bbox, b: Bbox) -> Bbox {
    Bbox {
        x_min: a.x_min.min(b.x_min),
        y_min: a.y_min.min(b.y_min),
        x_max: a.x_max.max(b.x_max),
        y_max: a.y_max.max(b.y_max),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use read_fonts::{FontRef, TableProvider};
    use write_fonts::tables::glyf::{Contour, SimpleGlyph};

    use super::*;

    pub(crate) fn square(x0: i16, y0: i16, x1: i16, y1: i16) -> SimpleGlyph {
        use read_fonts::tables::glyf::CurvePoint;
        let points = vec![
            CurvePoint { x: x0, y: y0, on_curve: true },
            CurvePoint { x: x0, y: y1, on_curve: true },
            CurvePoint { x: x1, y: y1, on_curve: true },
            CurvePoint { x: x1, y: y0, on_curve: true },
        ];
        SimpleGlyph {
            bbox: Bbox { x_min: x0, y_min: y0, x_max: x1, y_max: y1 },
            contours: vec![Contour::from(points)],
            instructions: vec![],
        }
    }

    /// A three glyph font: `.notdef`, `A` and space.
    pub(crate) fn square_font() -> Vec<u8> {
        let mut builder = TrueTypeBuilder::new("Square", 1000);
        builder.add_glyph(NewGlyph::new(Some(square(50, 0, 450, 700)), 500));
        builder.add_glyph(NewGlyph::new(Some(square(100, 0, 500, 700)), 600).with_codepoints(['A']));
        builder.add_glyph(NewGlyph::new(None, 250).with_codepoints([' ']));
        builder.build().unwrap()
    }

    #[test]
    fn test_build_produces_parseable_font() {
        let data = square_font();
        let font = FontRef::new(&data).unwrap();

        assert_eq!(font.maxp().unwrap().num_glyphs(), 3);
        assert_eq!(font.head().unwrap().units_per_em(), 1000);
        let cmap = font.cmap().unwrap();
        assert_eq!(cmap.map_codepoint('A'), Some(GlyphId::new(1)));
        assert_eq!(cmap.map_codepoint(' '), Some(GlyphId::new(2)));
        assert_eq!(font.hhea().unwrap().advance_width_max().to_u16(), 600);
    }

    #[test]
    fn test_build_requires_glyphs() {
        assert!(TrueTypeBuilder::new("Empty", 1000).build().is_err());
    }

    #[test]
    fn test_weight_class_from_style() {
        assert_eq!(weight_class_for("Bold Italic"), 700);
        assert_eq!(weight_class_for("Regular"), 400);
    }
}
