//! DinoPark Tycoon raster resources: `BMap`, `XMap`, and `XBig`.
//!
//! `BMap` is a bit map plus a QuickDraw region acting as its
//! transparency mask. `XMap` is the color analogue (pixel map plus two
//! regions, the second being the mask). `XBig` packs four bit maps into
//! one resource. All three may additionally be wrapped in the DinoPark
//! `'RLE '`/`'LZSS'` container codecs.

use crate::codecs::dinopark::decompress_data;
use crate::error::DecodeError;
use crate::image::Image;
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::quickdraw::raster::{decode_monochrome, decode_pixel_map, BitMapHeader, PixelMapHeader};
use crate::quickdraw::region::Region;
use crate::sprites::require_clut;

/// Applies a region mask: pixels outside the region go transparent.
fn apply_region_mask(img: &mut Image, region: &Region, bounds: &crate::quickdraw::Rect) {
	let mask = region.to_mask(bounds);
	let width = img.width();
	for y in 0..img.height() {
		for x in 0..width {
			let mut px = match img.read(x, y) {
				Ok(px) => px,
				Err(_) => continue,
			};
			px.a = if mask.get(y * width + x).copied().unwrap_or(false) { 0xFF } else { 0 };
			let _ = img.write(x, y, px);
		}
	}
}

/// Parses a region and checks it consumed exactly `expected` bytes.
fn parse_sized_region(
	r: &mut ByteReader<'_>,
	expected: usize,
) -> Result<Region, DecodeError> {
	let start = r.position();
	let region = Region::parse(r)?;
	if r.position() - start != expected {
		return Err(DecodeError::corrupt_size(format!(
			"region consumed {} bytes, expected {expected}",
			r.position() - start
		)));
	}
	Ok(region)
}

/// Decodes a `BMap` (bit map + mask region).
pub fn decode_bmap(data: &[u8]) -> Result<Image, DecodeError> {
	let decompressed = decompress_data(data)?;
	let mut r = ByteReader::new(&decompressed);
	r.skip(4)?; // in-memory buffer pointer
	let header = BitMapHeader::parse_plain(&mut r)?;
	let image_bytes = header.bytes();

	r.skip(4)?; // unknown
	let declared = r.get_u32_be()? as usize;
	if declared != image_bytes {
		return Err(DecodeError::corrupt_size(format!(
			"data size field says {declared}, header implies {image_bytes}"
		)));
	}
	let mask_region_size = r.get_u32_be()? as usize;

	let bits = r.get_bytes(image_bytes)?;
	let mut img = decode_monochrome(
		bits,
		header.bounds.width().max(0) as usize,
		header.bounds.height().max(0) as usize,
		header.row_bytes(),
	)?;

	let region = parse_sized_region(&mut r, mask_region_size)?;
	apply_region_mask(&mut img, &region, &header.bounds);
	Ok(img)
}

/// Decodes an `XMap` (pixel map + clip and mask regions).
pub fn decode_xmap(data: &[u8], clut: &ColorTable) -> Result<Image, DecodeError> {
	require_clut(clut)?;
	let decompressed = decompress_data(data)?;
	let mut r = ByteReader::new(&decompressed);
	r.skip(0x0C)?; // unknown
	let header = PixelMapHeader::parse(&mut r)?;
	if header.row_bytes_and_flags & 0x8000 == 0 {
		return Err(DecodeError::unsupported(
			"pixel map is missing its color flag".to_string(),
		));
	}

	let _clip_region = Region::parse(&mut r)?; // purpose unknown

	let pixel_data_size = r.get_u32_be()? as usize;
	let mask_region_size = r.get_u32_be()? as usize;
	let pixels = r.get_bytes(pixel_data_size)?;

	let mut img = decode_pixel_map(&header, pixels, clut)?;
	let region = parse_sized_region(&mut r, mask_region_size)?;
	apply_region_mask(&mut img, &region, &header.bounds);
	Ok(img)
}

/// Decodes an `XBig`: four stacked bit maps.
///
/// Absent images have all-zero headers and decode to nothing; the
/// returned vector skips them.
pub fn decode_xbig(data: &[u8]) -> Result<Vec<Image>, DecodeError> {
	let decompressed = decompress_data(data)?;
	let mut r = ByteReader::new(&decompressed);

	let mut headers = Vec::with_capacity(4);
	for _ in 0..4 {
		r.skip(4)?; // in-memory buffer pointer
		headers.push(BitMapHeader::parse_plain(&mut r)?);
	}
	r.skip(4)?; // total image bytes; recomputed from the headers

	let mut images = Vec::new();
	for header in headers {
		let image_bytes = header.bytes();
		if image_bytes == 0 {
			continue;
		}
		let bits = r.get_bytes(image_bytes)?;
		images.push(decode_monochrome(
			bits,
			header.bounds.width().max(0) as usize,
			header.bounds.height().max(0) as usize,
			header.row_bytes(),
		)?);
	}
	Ok(images)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::image::Rgba;

	fn bmap(region_words: &[i16]) -> Vec<u8> {
		let mut v = vec![0u8; 4];
		v.extend_from_slice(&1u16.to_be_bytes()); // row bytes
		v.extend_from_slice(&[0, 0, 0, 0, 0, 1, 0, 8]); // bounds 8x1
		v.extend_from_slice(&[0; 4]); // unknown
		v.extend_from_slice(&1u32.to_be_bytes()); // image bytes
		v.extend_from_slice(&((region_words.len() * 2) as u32).to_be_bytes());
		v.push(0x0F); // raster: right half black
		for w in region_words {
			v.extend_from_slice(&w.to_be_bytes());
		}
		v
	}

	#[test]
	fn test_bmap_rect_region() {
		// Rectangular region covering the left half
		let img = decode_bmap(&bmap(&[10, 0, 0, 1, 4])).unwrap();
		assert_eq!(img.read(0, 0).unwrap(), Rgba::new(0xFF, 0xFF, 0xFF, 0xFF));
		assert_eq!(img.read(4, 0).unwrap().a, 0); // outside the region
	}

	#[test]
	fn test_bmap_region_size_mismatch() {
		let mut data = bmap(&[10, 0, 0, 1, 4]);
		data[24] = 0;
		data[25] = 12; // mask_region_size now disagrees with the region
		assert!(matches!(decode_bmap(&data), Err(DecodeError::CorruptSize(_))));
	}

	#[test]
	fn test_xbig_skips_empty_slots() {
		let mut v = Vec::new();
		// First header: 8x1; remaining three all-zero
		v.extend_from_slice(&[0; 4]);
		v.extend_from_slice(&1u16.to_be_bytes());
		v.extend_from_slice(&[0, 0, 0, 0, 0, 1, 0, 8]);
		for _ in 0..3 {
			v.extend_from_slice(&[0; 14]);
		}
		v.extend_from_slice(&[0; 4]); // image bytes field
		v.push(0xAA);
		let images = decode_xbig(&v).unwrap();
		assert_eq!(images.len(), 1);
		assert_eq!(images[0].read(0, 0).unwrap(), Rgba::BLACK);
	}
}
