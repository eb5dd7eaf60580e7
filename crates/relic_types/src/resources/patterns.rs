//! Fill pattern decoders: `PAT `, `PAT#`, `ppat`, `ppt#`.
//!
//! A `PAT ` is a bare 8x8 monochrome pattern. A `ppat` pixel pattern
//! wraps a pixel map with its own color table, plus the 8-byte
//! monochrome fallback the classic APIs still require.

use crate::error::DecodeError;
use crate::image::Image;
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::quickdraw::raster::{decode_monochrome, decode_pixel_map, PixelMapHeader};

/// Decodes a `PAT ` (8 bytes, 8x8 monochrome).
pub fn decode_pat(data: &[u8]) -> Result<Image, DecodeError> {
	if data.len() < 8 {
		return Err(DecodeError::corrupt_size(format!("PAT is {} bytes", data.len())));
	}
	decode_monochrome(&data[..8], 8, 8, 1)
}

/// Decodes a `PAT#` pattern list: u16 count, then 8 bytes per pattern.
pub fn decode_patn(data: &[u8]) -> Result<Vec<Image>, DecodeError> {
	let mut r = ByteReader::new(data);
	let count = r.get_u16_be()? as usize;
	let mut patterns = Vec::with_capacity(count);
	for _ in 0..count {
		patterns.push(decode_monochrome(r.get_bytes(8)?, 8, 8, 1)?);
	}
	Ok(patterns)
}

/// A decoded pixel pattern: the color tile plus its monochrome fallback.
#[derive(Debug, Clone)]
pub struct DecodedPpat {
	/// Color pattern tile
	pub image: Image,
	/// 8x8 monochrome fallback
	pub bitmap: Image,
}

/// Decodes a `ppat`.
///
/// The record holds offsets (relative to the resource start) to a pixel
/// map header and its pixel data; the color table sits at the header's
/// table offset. Pattern type 0 is an old-style monochrome pattern with
/// no pixel map; it decodes to the fallback tile in both slots.
pub fn decode_ppat(data: &[u8]) -> Result<DecodedPpat, DecodeError> {
	let mut r = ByteReader::new(data);
	let pat_type = r.get_u16_be()?;
	let pixmap_offset = r.get_u32_be()? as usize;
	let pixel_data_offset = r.get_u32_be()? as usize;
	r.skip(10)?; // expanded handles, valid flag
	r.skip(4)?; // reserved
	let mono = r.get_bytes(8)?;
	let bitmap = decode_monochrome(mono, 8, 8, 1)?;

	match pat_type {
		0 => Ok(DecodedPpat { image: bitmap.clone(), bitmap }),
		1 | 2 => {
			let mut pixmap_r = ByteReader::new(data).sub_from(pixmap_offset)?;
			pixmap_r.skip(4)?; // base address
			let header = PixelMapHeader::parse(&mut pixmap_r)?;
			let mut clut_r =
				ByteReader::new(data).sub_from(header.color_table_offset as usize)?;
			let clut = ColorTable::parse(&mut clut_r)?;
			let pixels = data.get(pixel_data_offset..).ok_or_else(|| {
				DecodeError::out_of_bounds("ppat pixel data offset".to_string())
			})?;
			let image = decode_pixel_map(&header, pixels, &clut)?;
			Ok(DecodedPpat { image, bitmap })
		}
		other => Err(DecodeError::unsupported(format!("ppat type {other}"))),
	}
}

/// Decodes a `ppt#` pattern list: u16 count, then u32 offsets to `ppat`
/// records laid out with offsets relative to each record.
pub fn decode_pptn(data: &[u8]) -> Result<Vec<DecodedPpat>, DecodeError> {
	let mut r = ByteReader::new(data);
	let count = r.get_u16_be()? as usize;
	let mut offsets = Vec::with_capacity(count);
	for _ in 0..count {
		offsets.push(r.get_u32_be()? as usize);
	}
	offsets
		.into_iter()
		.map(|offset| {
			let record = data.get(offset..).ok_or_else(|| {
				DecodeError::out_of_bounds(format!("ppt# record offset {offset:#X}"))
			})?;
			decode_ppat(record)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::image::Rgba;

	#[test]
	fn test_pat_checkerboard() {
		let data = [0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55];
		let img = decode_pat(&data).unwrap();
		assert_eq!(img.read(0, 0).unwrap(), Rgba::BLACK);
		assert_eq!(img.read(1, 0).unwrap(), Rgba::WHITE);
		assert_eq!(img.read(0, 1).unwrap(), Rgba::WHITE);
	}

	#[test]
	fn test_patn_list() {
		let mut data = vec![0x00, 0x02];
		data.extend_from_slice(&[0xFF; 8]);
		data.extend_from_slice(&[0x00; 8]);
		let patterns = decode_patn(&data).unwrap();
		assert_eq!(patterns.len(), 2);
		assert_eq!(patterns[0].read(3, 3).unwrap(), Rgba::BLACK);
		assert_eq!(patterns[1].read(3, 3).unwrap(), Rgba::WHITE);
	}

	#[test]
	fn test_ppat_type0_uses_fallback() {
		let mut data = vec![0x00, 0x00]; // type 0
		data.extend_from_slice(&[0; 22]); // offsets, handles, reserved
		data.extend_from_slice(&[0xFF; 8]); // solid black pattern
		let ppat = decode_ppat(&data).unwrap();
		assert_eq!(ppat.image.read(0, 0).unwrap(), Rgba::BLACK);
		assert_eq!(ppat.bitmap.read(7, 7).unwrap(), Rgba::BLACK);
	}
}
