//! WOFF2 encoding for sfnt fonts.
//!
//! Tables are stored untransformed (the WOFF2 "null transform") and the
//! concatenated table data is compressed as a single Brotli stream. The
//! encoder state is created once per process through [`init`].
//!
//! # Example
//!
//! ```no_run
//! let ttf_data: &[u8] = &[];
//! let woff2 = fontgen_font_woff2::init().encode(ttf_data).unwrap();
//! ```

use std::{io::Cursor, sync::OnceLock};

use anyhow::{Context, Result, bail};
use brotli::enc::{BrotliEncoderParams, backward_references::BrotliEncoderMode};
use log::debug;
use read_fonts::{FontRef, types::Tag};

const WOFF2_SIGNATURE: u32 = 0x774F_4632;
const WOFF2_HEADER_LEN: usize = 48;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_RECORD_LEN: usize = 16;

/// Flag value meaning "tag follows as four bytes".
const ARBITRARY_TAG: u8 = 63;
/// Transform version 3, the null transform for `glyf` and `loca`.
const NULL_TRANSFORM_GLYF: u8 = 0b1100_0000;

/// Tags with a one-byte encoding, indexed by their flag value.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

static ENCODER: OnceLock<Woff2Encoder> = OnceLock::new();

/// Returns the process-wide encoder, creating it on first use.
pub fn init() -> &'static Woff2Encoder {
    ENCODER.get_or_init(|| {
        debug!("Initializing WOFF2 encoder");
        Woff2Encoder::new()
    })
}

/// Encodes sfnt data as WOFF2 with the shared encoder.
pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    init().encode(data)
}

/// WOFF2 encoder configuration.
#[derive(Debug, Clone)]
pub struct Woff2Encoder {
    known_tags: Vec<Tag>,
    quality: i32,
    window_bits: i32,
}

impl Default for Woff2Encoder {
    fn default() -> Self {
        Self::new()
    }
}

struct TableEntry<'a> {
    tag: Tag,
    data: &'a [u8],
}

impl Woff2Encoder {
    pub fn new() -> Self {
        Self { known_tags: KNOWN_TAGS.iter().map(|t| Tag::new(t)).collect(), quality: 11, window_bits: 22 }
    }

    /// Sets the Brotli quality (0-11).
    pub fn quality(mut self, quality: i32) -> Self {
        self.quality = quality.clamp(0, 11);
        self
    }

    /// Encode an sfnt font (TrueType or CFF flavoured) as WOFF2.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let font = FontRef::new(data).context("Failed to parse font")?;
        let flavor = font.table_directory.sfnt_version();

        let tables: Vec<TableEntry> = font
            .table_directory
            .table_records()
            .iter()
            .filter_map(|record| {
                let tag = record.tag();
                font.table_data(tag).map(|data| TableEntry { tag, data: data.as_bytes() })
            })
            .collect();
        if tables.is_empty() {
            bail!("Font has no tables");
        }

        let mut stream = Vec::with_capacity(tables.iter().map(|t| t.data.len()).sum());
        for table in &tables {
            stream.extend_from_slice(table.data);
        }
        let compressed = self.compress(&stream)?;

        let mut directory = Vec::new();
        for table in &tables {
            self.write_entry(&mut directory, table)?;
        }

        let total_sfnt_size = SFNT_HEADER_LEN
            + SFNT_RECORD_LEN * tables.len()
            + tables.iter().map(|t| padded_len(t.data.len())).sum::<usize>();
        let file_len = padded_len(WOFF2_HEADER_LEN + directory.len() + compressed.len());

        let mut out = Vec::with_capacity(file_len);
        write_u32(&mut out, WOFF2_SIGNATURE);
        write_u32(&mut out, flavor);
        write_u32(&mut out, to_u32(file_len, "file length")?);
        write_u16(&mut out, u16::try_from(tables.len()).context("Too many tables")?);
        write_u16(&mut out, 0); // reserved
        write_u32(&mut out, to_u32(total_sfnt_size, "sfnt size")?);
        write_u32(&mut out, to_u32(compressed.len(), "compressed size")?);
        write_u16(&mut out, 1); // major version
        write_u16(&mut out, 0); // minor version
        for _ in 0..5 {
            // metadata offset, lengths and private block
            write_u32(&mut out, 0);
        }
        debug_assert_eq!(out.len(), WOFF2_HEADER_LEN);

        out.extend_from_slice(&directory);
        out.extend_from_slice(&compressed);
        out.resize(file_len, 0);

        debug!(
            "WOFF2: {} tables, {} -> {} bytes",
            tables.len(),
            data.len(),
            out.len()
        );
        Ok(out)
    }

    fn write_entry(&self, buffer: &mut Vec<u8>, table: &TableEntry) -> Result<()> {
        let known = self.known_tags.iter().position(|t| *t == table.tag);
        let mut flags = known.map_or(ARBITRARY_TAG, |index| index as u8);
        if table.tag == Tag::new(b"glyf") || table.tag == Tag::new(b"loca") {
            flags |= NULL_TRANSFORM_GLYF;
        }
        buffer.push(flags);
        if known.is_none() {
            buffer.extend_from_slice(&table.tag.to_be_bytes());
        }
        write_uint_base128(buffer, to_u32(table.data.len(), "table length")?);
        Ok(())
    }

    fn compress(&self, stream: &[u8]) -> Result<Vec<u8>> {
        let params = BrotliEncoderParams {
            quality: self.quality,
            lgwin: self.window_bits,
            mode: BrotliEncoderMode::BROTLI_MODE_FONT,
            size_hint: stream.len(),
            ..Default::default()
        };
        let mut compressed = Vec::new();
        brotli::BrotliCompress(&mut Cursor::new(stream), &mut compressed, &params)
            .context("Brotli compression failed")?;
        Ok(compressed)
    }
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).with_context(|| format!("WOFF2 {what} overflow: {value}"))
}

fn write_u16(buffer: &mut Vec<u8>, value: u16) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

fn write_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

fn uint_base128_len(value: u32) -> usize {
    if value == 0 { 1 } else { value.ilog2() as usize / 7 + 1 }
}

/// Variable-length big-endian base-128 integer, at most five bytes.
fn write_uint_base128(buffer: &mut Vec<u8>, value: u32) {
    let len = uint_base128_len(value);
    for i in (1..len).rev() {
        buffer.push(0x80 | ((value >> (7 * i)) & 0x7F) as u8);
    }
    buffer.push((value & 0x7F) as u8);
}

#[cfg(test)]
mod tests {
    use allsorts::{binary::read::ReadScope, font_data::FontData, tables::FontTableProvider};
    use fontgen_font_ops::{NewGlyph, TrueTypeBuilder, outline::quadratic_glyph};
    use kurbo::{Rect, Shape};
    use read_fonts::TableProvider;

    use super::*;

    fn test_font() -> Vec<u8> {
        let mut builder = TrueTypeBuilder::new("Woff Test", 1000);
        for (i, ch) in ['\0', 'H', 'i'].into_iter().enumerate() {
            let x = 40.0 + 20.0 * i as f64;
            let outline = quadratic_glyph(&Rect::new(x, 0.0, x + 300.0, 700.0).to_path(0.1)).unwrap();
            let glyph = NewGlyph::new(outline, 500);
            builder.add_glyph(if i == 0 { glyph } else { glyph.with_codepoints([ch]) });
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_uint_base128() {
        let samples: &[(u32, &[u8])] = &[
            (0, &[0]),
            (1, &[1]),
            (127, &[127]),
            (128, &[0x81, 0]),
            (16_383, &[0xFF, 0x7F]),
            (16_384, &[0x81, 0x80, 0]),
            (u32::MAX, &[0x8F, 0xFF, 0xFF, 0xFF, 0x7F]),
        ];
        for &(value, expected) in samples {
            let mut buffer = vec![];
            write_uint_base128(&mut buffer, value);
            assert_eq!(buffer, expected, "value {value}");
            assert_eq!(uint_base128_len(value), expected.len());
        }
    }

    #[test]
    fn test_known_tags_are_unique() {
        let encoder = Woff2Encoder::new();
        for (i, tag) in encoder.known_tags.iter().enumerate() {
            assert_eq!(encoder.known_tags.iter().position(|t| t == tag), Some(i));
        }
        assert_eq!(encoder.known_tags[10], Tag::new(b"glyf"));
    }

    #[test]
    fn test_init_returns_shared_encoder() {
        assert!(std::ptr::eq(init(), init()));
    }

    #[test]
    fn test_header_fields() {
        let ttf = test_font();
        let woff2 = encode(&ttf).unwrap();

        assert_eq!(&woff2[..4], b"wOF2");
        assert_eq!(&woff2[4..8], &[0, 1, 0, 0]);
        let length = u32::from_be_bytes(woff2[8..12].try_into().unwrap()) as usize;
        assert_eq!(length, woff2.len());
        assert_eq!(woff2.len() % 4, 0);

        let font = FontRef::new(&ttf).unwrap();
        let num_tables = u16::from_be_bytes(woff2[12..14].try_into().unwrap());
        assert_eq!(num_tables, font.table_directory.num_tables());
    }

    #[test]
    fn test_tables_survive_decoding() {
        let ttf = test_font();
        let woff2 = encode(&ttf).unwrap();

        let font_file = ReadScope::new(&woff2).read::<FontData>().unwrap();
        let provider = font_file.table_provider(0).unwrap();
        let original = FontRef::new(&ttf).unwrap();
        for record in original.table_directory.table_records() {
            let tag = record.tag();
            let decoded = provider.read_table_data(u32::from_be_bytes(tag.to_be_bytes())).unwrap();
            assert_eq!(decoded.as_ref(), original.table_data(tag).unwrap().as_bytes(), "{tag}");
        }
        assert!(original.cmap().is_ok());
    }

    #[test]
    fn test_encode_rejects_garbage() {
        assert!(encode(b"definitely not a font").is_err());
    }
}
