//! WOFF 1.0 encoding.
//!
//! Each table is zlib-compressed on its own and stored compressed only when
//! that makes it smaller. No metadata or private blocks are written.

mod error;

use std::io::Write;

use flate2::{Compression, write::ZlibEncoder};
use log::debug;
use read_fonts::{FontRef, types::Tag};

pub use error::{Error, Result};

const WOFF_SIGNATURE: u32 = 0x774F_4646;
const WOFF_HEADER_LEN: usize = 44;
const WOFF_ENTRY_LEN: usize = 20;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_RECORD_LEN: usize = 16;

struct Table {
    tag: Tag,
    checksum: u32,
    original_len: usize,
    stored: Vec<u8>,
}

/// Encode an sfnt font as WOFF using the best zlib compression.
pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    encode_with(data, Compression::best())
}

/// Encode an sfnt font as WOFF with the given zlib compression level.
pub fn encode_with(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let flavor = font.table_directory.sfnt_version();

    let mut tables = Vec::new();
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        let Some(table_data) = font.table_data(tag) else {
            continue;
        };
        let raw = table_data.as_bytes();
        let compressed = deflate(raw, level)?;
        let stored = if compressed.len() < raw.len() { compressed } else { raw.to_vec() };
        tables.push(Table { tag, checksum: record.checksum(), original_len: raw.len(), stored });
    }
    if tables.is_empty() {
        return Err(Error::NoTables);
    }
    tables.sort_by_key(|t| t.tag.to_be_bytes());

    let total_sfnt_size = SFNT_HEADER_LEN
        + SFNT_RECORD_LEN * tables.len()
        + tables.iter().map(|t| padded_len(t.original_len)).sum::<usize>();

    let data_start = WOFF_HEADER_LEN + WOFF_ENTRY_LEN * tables.len();
    let mut directory = Vec::with_capacity(WOFF_ENTRY_LEN * tables.len());
    let mut body = Vec::new();
    for table in &tables {
        directory.extend_from_slice(&table.tag.to_be_bytes());
        write_u32(&mut directory, to_u32(data_start + body.len(), "table offset")?);
        write_u32(&mut directory, to_u32(table.stored.len(), "table length")?);
        write_u32(&mut directory, to_u32(table.original_len, "table length")?);
        write_u32(&mut directory, table.checksum);

        body.extend_from_slice(&table.stored);
        body.resize(padded_len(body.len()), 0);
    }
    let file_len = WOFF_HEADER_LEN + directory.len() + body.len();

    let mut out = Vec::with_capacity(file_len);
    write_u32(&mut out, WOFF_SIGNATURE);
    write_u32(&mut out, flavor);
    write_u32(&mut out, to_u32(file_len, "file length")?);
    write_u16(&mut out, tables.len() as u16);
    write_u16(&mut out, 0); // reserved
    write_u32(&mut out, to_u32(total_sfnt_size, "sfnt size")?);
    write_u16(&mut out, 1); // major version
    write_u16(&mut out, 0); // minor version
    for _ in 0..5 {
        // metadata and private block
        write_u32(&mut out, 0);
    }
    debug_assert_eq!(out.len(), WOFF_HEADER_LEN);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&body);

    debug!("WOFF: {} tables, {} -> {} bytes", tables.len(), data.len(), out.len());
    Ok(out)
}

fn deflate(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

fn to_u32(value: usize, what: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Overflow(what))
}

fn write_u16(buffer: &mut Vec<u8>, value: u16) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

fn write_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use allsorts::{binary::read::ReadScope, font_data::FontData, tables::FontTableProvider};
    use fontgen_font_ops::{NewGlyph, TrueTypeBuilder, outline::quadratic_glyph};
    use kurbo::{Rect, Shape};

    use super::*;

    fn test_font() -> Vec<u8> {
        let mut builder = TrueTypeBuilder::new("Woff Test", 1000);
        builder.add_glyph(NewGlyph::new(None, 500));
        for (i, ch) in ('a'..='z').enumerate() {
            let x = 10.0 * i as f64;
            let outline = quadratic_glyph(&Rect::new(x, 0.0, x + 300.0, 500.0).to_path(0.1)).unwrap();
            builder.add_glyph(NewGlyph::new(outline, 550).with_codepoints([ch]));
        }
        builder.build().unwrap()
    }

    fn read_u32(data: &[u8], offset: usize) -> u32 {
        u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_fields() {
        let ttf = test_font();
        let woff = encode(&ttf).unwrap();

        assert_eq!(&woff[..4], b"wOFF");
        assert_eq!(read_u32(&woff, 4), 0x0001_0000);
        assert_eq!(read_u32(&woff, 8) as usize, woff.len());
        let num_tables = u16::from_be_bytes([woff[12], woff[13]]) as usize;
        assert_eq!(num_tables, FontRef::new(&ttf).unwrap().table_directory.num_tables() as usize);
        assert_eq!(woff.len() % 4, 0);
    }

    #[test]
    fn test_directory_is_sorted_and_aligned() {
        let woff = encode(&test_font()).unwrap();
        let num_tables = u16::from_be_bytes([woff[12], woff[13]]) as usize;

        let mut previous = [0u8; 4];
        for i in 0..num_tables {
            let entry = WOFF_HEADER_LEN + i * WOFF_ENTRY_LEN;
            let tag: [u8; 4] = woff[entry..entry + 4].try_into().unwrap();
            assert!(tag > previous);
            previous = tag;

            let offset = read_u32(&woff, entry + 4);
            let comp_len = read_u32(&woff, entry + 8);
            let orig_len = read_u32(&woff, entry + 12);
            assert_eq!(offset % 4, 0);
            assert!(comp_len <= orig_len);
        }
    }

    #[test]
    fn test_tables_survive_decoding() {
        let ttf = test_font();
        let woff = encode(&ttf).unwrap();

        let font_file = ReadScope::new(&woff).read::<FontData>().unwrap();
        let provider = font_file.table_provider(0).unwrap();
        let original = FontRef::new(&ttf).unwrap();
        for record in original.table_directory.table_records() {
            let tag = record.tag();
            let decoded = provider.read_table_data(u32::from_be_bytes(tag.to_be_bytes())).unwrap();
            assert_eq!(decoded.as_ref(), original.table_data(tag).unwrap().as_bytes(), "{tag}");
        }
    }

    #[test]
    fn test_uncompressed_level_stores_raw_tables() {
        let ttf = test_font();
        let woff = encode_with(&ttf, Compression::none()).unwrap();
        assert!(woff.len() > ttf.len());
    }

    #[test]
    fn test_encode_rejects_garbage() {
        assert!(matches!(encode(b"nope"), Err(Error::Parse(_))));
    }
}
