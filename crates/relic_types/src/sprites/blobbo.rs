//! Blobbo raster resources: `BTMP` and `PMP8`.
//!
//! These are QuickDraw structures saved straight out of memory; the
//! in-memory pointer fields are still present (and meaningless) in the
//! file, so each record starts with four dead bytes.

use crate::error::DecodeError;
use crate::image::Image;
use crate::io::ByteReader;
use crate::quickdraw::color::{ColorTable, CLUT_FLAG_DEVICE};
use crate::quickdraw::raster::{decode_monochrome, decode_pixel_map, BitMapHeader, PixelMapHeader};
use crate::sprites::require_clut;

/// Decodes a `BTMP` monochrome bitmap.
pub fn decode_btmp(data: &[u8]) -> Result<Image, DecodeError> {
	let mut r = ByteReader::new(data);
	r.skip(4)?; // in-memory buffer pointer
	let header = BitMapHeader::parse_plain(&mut r)?;
	let bits = r.get_bytes(header.bytes())?;
	decode_monochrome(
		bits,
		header.bounds.width().max(0) as usize,
		header.bounds.height().max(0) as usize,
		header.row_bytes(),
	)
}

/// Decodes a `PMP8` 8-bit pixel map against the given clut.
///
/// The pixel values are device indices, so the clut is applied
/// positionally regardless of its stored entry ids.
pub fn decode_pmp8(data: &[u8], clut: &ColorTable) -> Result<Image, DecodeError> {
	require_clut(clut)?;
	let mut device_clut = clut.clone();
	device_clut.flags |= CLUT_FLAG_DEVICE;

	let mut r = ByteReader::new(data);
	r.skip(4)?; // in-memory buffer pointer
	let header = PixelMapHeader::parse(&mut r)?;
	if header.row_bytes_and_flags & 0x8000 == 0 {
		return Err(DecodeError::unsupported(
			"pixel map is missing its color flag".to_string(),
		));
	}
	let pixels = r.get_bytes(header.data_size())?;
	decode_pixel_map(&header, pixels, &device_clut)
}
