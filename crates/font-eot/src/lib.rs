//! Embedded OpenType (EOT) conversion.
//!
//! EOT wraps an uncompressed sfnt font in a little-endian header that repeats
//! a handful of `OS/2`, `head` and `name` values. Encoding writes version
//! 0x00020001 headers; decoding accepts versions 1.0, 2.1 and 2.2 as long as
//! the font data is not MicroType Express compressed.

mod error;

use fontgen_font_ops::{name_id, name_string};
use log::debug;
use read_fonts::{FontRef, TableProvider};

pub use error::{Error, Result};

const VERSION_1_0: u32 = 0x0001_0000;
const VERSION_2_1: u32 = 0x0002_0001;
const VERSION_2_2: u32 = 0x0002_0002;
const MAGIC_NUMBER: u16 = 0x504C;
const DEFAULT_CHARSET: u8 = 1;

/// Font data is compressed with MicroType Express.
pub const FLAG_COMPRESSED: u32 = 0x0000_0004;
/// Font data is XOR-obfuscated with [`XOR_KEY`].
pub const FLAG_XOR_ENCRYPTED: u32 = 0x1000_0000;
pub const XOR_KEY: u8 = 0x50;

const MAGIC_OFFSET: usize = 34;
/// Fixed part of the header, up to and including `Reserved4`.
const FIXED_HEADER_LEN: usize = 80;

/// Header values copied from the font's tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EotHeader {
    pub panose: [u8; 10],
    pub italic: bool,
    pub weight: u16,
    pub fs_type: u16,
    pub unicode_range: [u32; 4],
    pub code_page_range: [u32; 2],
    pub checksum_adjustment: u32,
    pub family_name: String,
    pub style_name: String,
    pub version_name: String,
    pub full_name: String,
}

impl EotHeader {
    /// Collect header values from a parsed sfnt font.
    pub fn from_font(font: &FontRef) -> Result<Self> {
        let os2 = font.os2()?;
        let head = font.head()?;

        let mut panose = [0u8; 10];
        let source = os2.panose_10();
        panose[..source.len().min(10)].copy_from_slice(&source[..source.len().min(10)]);

        let name = |id| name_string(font, id).unwrap_or_default();
        Ok(Self {
            panose,
            italic: os2.fs_selection().bits() & 0x0001 != 0,
            weight: os2.us_weight_class(),
            fs_type: os2.fs_type(),
            unicode_range: [
                os2.ul_unicode_range_1(),
                os2.ul_unicode_range_2(),
                os2.ul_unicode_range_3(),
                os2.ul_unicode_range_4(),
            ],
            code_page_range: [
                os2.ul_code_page_range_1().unwrap_or(0),
                os2.ul_code_page_range_2().unwrap_or(0),
            ],
            checksum_adjustment: head.checksum_adjustment(),
            family_name: name(name_id::FAMILY),
            style_name: name(name_id::SUBFAMILY),
            version_name: name(name_id::VERSION),
            full_name: name(name_id::FULL_NAME),
        })
    }
}

/// Wrap sfnt font data in an EOT container.
pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let header = EotHeader::from_font(&font)?;
    write_eot(&header, data)
}

/// Serialize an EOT file from header values and raw font data.
pub fn write_eot(header: &EotHeader, font_data: &[u8]) -> Result<Vec<u8>> {
    let mut names = Vec::new();
    for value in [&header.family_name, &header.style_name, &header.version_name, &header.full_name]
    {
        write_name(&mut names, value)?;
    }
    // Padding5 and an empty RootString.
    put_u16(&mut names, 0);
    put_u16(&mut names, 0);

    let font_data_size = u32::try_from(font_data.len()).map_err(|_| Error::Overflow("font data"))?;
    let eot_size = u32::try_from(FIXED_HEADER_LEN + names.len() + font_data.len())
        .map_err(|_| Error::Overflow("file size"))?;

    let mut out = Vec::with_capacity(eot_size as usize);
    put_u32(&mut out, eot_size);
    put_u32(&mut out, font_data_size);
    put_u32(&mut out, VERSION_2_1);
    put_u32(&mut out, 0); // flags
    out.extend_from_slice(&header.panose);
    out.push(DEFAULT_CHARSET);
    out.push(header.italic as u8);
    put_u32(&mut out, header.weight as u32);
    put_u16(&mut out, header.fs_type);
    put_u16(&mut out, MAGIC_NUMBER);
    for range in header.unicode_range {
        put_u32(&mut out, range);
    }
    for range in header.code_page_range {
        put_u32(&mut out, range);
    }
    put_u32(&mut out, header.checksum_adjustment);
    for _ in 0..4 {
        put_u32(&mut out, 0); // reserved
    }
    debug_assert_eq!(out.len(), FIXED_HEADER_LEN);

    out.extend_from_slice(&names);
    out.extend_from_slice(font_data);

    debug!("EOT: {} bytes of font data, {} byte file", font_data.len(), out.len());
    Ok(out)
}

/// Padding, size and UTF-16LE bytes of one header name.
fn write_name(out: &mut Vec<u8>, value: &str) -> Result<()> {
    let encoded: Vec<u8> = value.encode_utf16().flat_map(u16::to_le_bytes).collect();
    put_u16(out, 0);
    put_u16(out, u16::try_from(encoded.len()).map_err(|_| Error::Overflow("name"))?);
    out.extend_from_slice(&encoded);
    Ok(())
}

/// Extract the sfnt font data from an EOT file.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < FIXED_HEADER_LEN {
        return Err(Error::Truncated);
    }
    let eot_size = get_u32(data, 0);
    let font_data_size = get_u32(data, 4);
    let version = get_u32(data, 8);
    let flags = get_u32(data, 12);
    let magic = get_u16(data, MAGIC_OFFSET);

    if !matches!(version, VERSION_1_0 | VERSION_2_1 | VERSION_2_2) {
        return Err(Error::UnsupportedVersion(version));
    }
    if magic != MAGIC_NUMBER {
        return Err(Error::BadMagic(magic));
    }
    if flags & FLAG_COMPRESSED != 0 {
        return Err(Error::Compressed);
    }

    let total = (eot_size as usize).min(data.len());
    let size = font_data_size as usize;
    if size == 0 || size > total.saturating_sub(FIXED_HEADER_LEN) {
        return Err(Error::BadFontDataSize { size: font_data_size, total: total as u32 });
    }

    let mut font_data = data[total - size..total].to_vec();
    if flags & FLAG_XOR_ENCRYPTED != 0 {
        font_data.iter_mut().for_each(|b| *b ^= XOR_KEY);
    }

    FontRef::new(&font_data)?;
    debug!("EOT version {version:#010x}: extracted {size} bytes of font data");
    Ok(font_data)
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn get_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn get_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}
