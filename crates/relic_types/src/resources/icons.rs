//! Icon and cursor decoders.
//!
//! Monochrome icons (`ICON`, `ICN#`, `ics#`, `SICN`) are plain 1-bit
//! rasters, optionally with a second raster acting as a transparency
//! mask. The indexed variants (`icl4`/`ics4`/`icl8`/`ics8`) carry no
//! palette and index the system color tables. `cicn` and `crsr` embed a
//! full pixel map and color table.

use crate::error::DecodeError;
use crate::image::Image;
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::quickdraw::raster::{
	decode_indexed, decode_monochrome_packed, BitMapHeader, PixelMapHeader,
};
use crate::quickdraw::Point;
use crate::resources::system_cluts::{system_clut_4bit, system_clut_8bit};

/// Applies a 1-bit mask raster as the alpha channel of `img`.
fn apply_mask_bits(img: &mut Image, mask: &[u8], row_bytes: usize) -> Result<(), DecodeError> {
	for y in 0..img.height() {
		for x in 0..img.width() {
			let byte = *mask.get(y * row_bytes + x / 8).ok_or_else(|| {
				DecodeError::corrupt_size("mask raster shorter than icon".to_string())
			})?;
			if byte & (0x80 >> (x % 8)) == 0 {
				let mut px = img.read(x, y)?;
				px.a = 0;
				img.write(x, y, px)?;
			}
		}
	}
	Ok(())
}

/// Decodes a 32x32 monochrome `ICON` (128 bytes).
pub fn decode_icon(data: &[u8]) -> Result<Image, DecodeError> {
	decode_monochrome_packed(data, 32, 32)
}

fn decode_masked_mono(data: &[u8], side: usize) -> Result<Image, DecodeError> {
	let row_bytes = side / 8;
	let plane = row_bytes * side;
	let mut img = decode_monochrome_packed(&data[..plane.min(data.len())], side, side)?;
	let mask = data.get(plane..plane * 2).ok_or_else(|| {
		DecodeError::corrupt_size(format!("icon needs {} bytes, {} present", plane * 2, data.len()))
	})?;
	apply_mask_bits(&mut img, mask, row_bytes)?;
	Ok(img)
}

/// Decodes a 32x32 `ICN#` (icon plus mask).
pub fn decode_icnn(data: &[u8]) -> Result<Image, DecodeError> {
	decode_masked_mono(data, 32)
}

/// Decodes a 16x16 `ics#` (small icon plus mask).
pub fn decode_icsn(data: &[u8]) -> Result<Image, DecodeError> {
	decode_masked_mono(data, 16)
}

/// Decodes a `SICN` list: any number of 16x16 monochrome icons.
pub fn decode_sicn(data: &[u8]) -> Result<Vec<Image>, DecodeError> {
	if data.len() % 32 != 0 {
		return Err(DecodeError::corrupt_size(format!(
			"SICN length {} is not a multiple of 32",
			data.len()
		)));
	}
	data.chunks_exact(32).map(|chunk| decode_monochrome_packed(chunk, 16, 16)).collect()
}

fn decode_system_indexed(
	data: &[u8],
	side: usize,
	pixel_size: u16,
) -> Result<Image, DecodeError> {
	let clut = if pixel_size == 4 { system_clut_4bit() } else { system_clut_8bit() };
	let row_bytes = side * pixel_size as usize / 8;
	decode_indexed(data, side, side, row_bytes, pixel_size, &clut)
}

/// Decodes a 32x32 8-bit `icl8`.
pub fn decode_icl8(data: &[u8]) -> Result<Image, DecodeError> {
	decode_system_indexed(data, 32, 8)
}

/// Decodes a 16x16 8-bit `ics8`.
pub fn decode_ics8(data: &[u8]) -> Result<Image, DecodeError> {
	decode_system_indexed(data, 16, 8)
}

/// Decodes a 32x32 4-bit `icl4`.
pub fn decode_icl4(data: &[u8]) -> Result<Image, DecodeError> {
	decode_system_indexed(data, 32, 4)
}

/// Decodes a 16x16 4-bit `ics4`.
pub fn decode_ics4(data: &[u8]) -> Result<Image, DecodeError> {
	decode_system_indexed(data, 16, 4)
}

/// A decoded `CURS` cursor.
#[derive(Debug, Clone)]
pub struct DecodedCurs {
	/// 16x16 bitmap with the mask composited into alpha
	pub bitmap: Image,
	/// Hot spot (y, x per the Mac convention)
	pub hotspot: Point,
}

/// Decodes a `CURS`: 32 bytes bitmap, 32 bytes mask, hot spot point.
pub fn decode_curs(data: &[u8]) -> Result<DecodedCurs, DecodeError> {
	let mut r = ByteReader::new(data);
	let bits = r.get_bytes(32)?;
	let mask = r.get_bytes(32)?;
	let hotspot = Point::parse(&mut r)?;
	let mut bitmap = decode_monochrome_packed(bits, 16, 16)?;
	apply_mask_bits(&mut bitmap, mask, 2)?;
	Ok(DecodedCurs { bitmap, hotspot })
}

/// A decoded `crsr` color cursor.
#[derive(Debug, Clone)]
pub struct DecodedCrsr {
	/// Color image with the mask composited into alpha
	pub image: Image,
	/// Monochrome fallback bitmap
	pub bitmap: Image,
	/// Hot spot
	pub hotspot: Point,
}

/// Decodes a `crsr` color cursor.
///
/// The record stores offsets (relative to the resource start) to a pixel
/// map header and its data; the embedded color table sits at the pixel
/// map's table offset. The 1-bit data and mask live inline.
pub fn decode_crsr(data: &[u8]) -> Result<DecodedCrsr, DecodeError> {
	let mut r = ByteReader::new(data);
	let cursor_type = r.get_u16_be()?;
	if cursor_type & 0x8000 == 0 {
		return Err(DecodeError::unsupported(format!("crsr type {cursor_type:#06X}")));
	}
	let pixmap_offset = r.get_u32_be()? as usize;
	let pixel_data_offset = r.get_u32_be()? as usize;
	r.skip(10)?; // expanded data handle, expanded depth, reserved
	let _cursor_id = r.get_u32_be()?;
	let bits = r.get_bytes(32)?;
	let mask = r.get_bytes(32)?;
	let hotspot = Point::parse(&mut r)?;

	let mut bitmap = decode_monochrome_packed(bits, 16, 16)?;
	apply_mask_bits(&mut bitmap, mask, 2)?;

	let mut pixmap_r = ByteReader::new(data).sub_from(pixmap_offset)?;
	pixmap_r.skip(4)?; // base address, reserved in file
	let header = PixelMapHeader::parse(&mut pixmap_r)?;
	let mut clut_r = ByteReader::new(data).sub_from(header.color_table_offset as usize)?;
	let clut = ColorTable::parse(&mut clut_r)?;

	let pixels = &data[pixel_data_offset.min(data.len())..];
	let mut image = crate::quickdraw::raster::decode_pixel_map(&header, pixels, &clut)?;
	apply_mask_bits(&mut image, mask, 2)?;

	Ok(DecodedCrsr { image, bitmap, hotspot })
}

/// A decoded `cicn` color icon.
#[derive(Debug, Clone)]
pub struct DecodedCicn {
	/// Color image with the mask composited into alpha
	pub image: Image,
	/// Monochrome fallback, present when the record carries one
	pub bitmap: Option<Image>,
}

/// Decodes a `cicn` color icon.
pub fn decode_cicn(data: &[u8]) -> Result<DecodedCicn, DecodeError> {
	let mut r = ByteReader::new(data);

	r.skip(4)?; // pixel map base address
	let pixmap = PixelMapHeader::parse(&mut r)?;

	r.skip(4)?; // mask bitmap base address
	let mask_header = BitMapHeader::parse_plain(&mut r)?;
	r.skip(4)?; // icon bitmap base address
	let icon_header = BitMapHeader::parse_plain(&mut r)?;
	r.skip(4)?; // icon data handle

	let width = pixmap.bounds.width().max(0) as usize;
	let height = pixmap.bounds.height().max(0) as usize;

	let mask_bytes = mask_header.bytes();
	let mask = r.get_bytes(mask_bytes)?;

	let bitmap = if icon_header.row_bytes() != 0 {
		let bits = r.get_bytes(icon_header.bytes())?;
		let mut bmp = crate::quickdraw::raster::decode_monochrome(
			bits,
			icon_header.bounds.width().max(0) as usize,
			icon_header.bounds.height().max(0) as usize,
			icon_header.row_bytes(),
		)?;
		apply_mask_bits(&mut bmp, mask, mask_header.row_bytes())?;
		Some(bmp)
	} else {
		None
	};

	let clut = ColorTable::parse(&mut r)?;
	let pixel_data = r.get_bytes(pixmap.data_size())?;
	let mut image = crate::quickdraw::raster::decode_pixel_map(&pixmap, pixel_data, &clut)?;
	if image.width() != width || image.height() != height {
		return Err(DecodeError::corrupt_size("cicn pixel map dimensions".to_string()));
	}
	apply_mask_bits(&mut image, mask, mask_header.row_bytes())?;

	Ok(DecodedCicn { image, bitmap })
}
