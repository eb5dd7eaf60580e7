//! Bit-map and pixel-map headers and the shared raster decode helpers.
//!
//! QuickDraw has two raster formats: the 1-bit-per-pixel bit map and the
//! multi-bit pixel map. Both store `row_bytes` in the low 14 bits of a
//! flags word; bits 0x8000/0x4000 mark the pixel-map variant and are
//! rejected where a plain bit map was expected.

use crate::error::DecodeError;
use crate::image::{Image, Rgba};
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::quickdraw::Rect;

/// Header of a 1-bit bit map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitMapHeader {
	/// Flags in the top two bits, row stride in the low 14
	pub row_bytes_and_flags: u16,
	/// Bounding rect; dimensions come from here
	pub bounds: Rect,
}

impl BitMapHeader {
	/// Reads the header fields.
	pub fn parse(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
		Ok(Self { row_bytes_and_flags: r.get_u16_be()?, bounds: Rect::parse(r)? })
	}

	/// Like [`BitMapHeader::parse`], but rejects pixel-map flag bits.
	pub fn parse_plain(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
		let header = Self::parse(r)?;
		if header.row_bytes_and_flags & 0xC000 != 0 {
			return Err(DecodeError::unsupported(
				"expected a bit map, found pixel-map flag bits".to_string(),
			));
		}
		Ok(header)
	}

	/// Row stride in bytes.
	#[must_use]
	pub fn row_bytes(&self) -> usize {
		(self.row_bytes_and_flags & 0x3FFF) as usize
	}

	/// Total raster size in bytes.
	#[must_use]
	pub fn bytes(&self) -> usize {
		self.row_bytes() * self.bounds.height().max(0) as usize
	}
}

/// Header of a multi-bit pixel map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelMapHeader {
	/// Flags in the top two bits, row stride in the low 14
	pub row_bytes_and_flags: u16,
	/// Bounding rect
	pub bounds: Rect,
	/// Format version
	pub version: u16,
	/// Packing scheme
	pub pack_format: u16,
	/// Packed data size
	pub pack_size: u32,
	/// Horizontal resolution (16.16 dpi)
	pub h_res: u32,
	/// Vertical resolution (16.16 dpi)
	pub v_res: u32,
	/// Indexed (0) or direct (16) pixels
	pub pixel_type: u16,
	/// Bits per pixel: 1, 2, 4, 8, 16, or 32
	pub pixel_size: u16,
	/// Channels per pixel
	pub component_count: u16,
	/// Bits per channel
	pub component_size: u16,
	/// Offset to the next plane
	pub plane_offset: u32,
	/// In memory, a handle to the color table
	pub color_table_offset: u32,
	/// Reserved
	pub reserved: u32,
}

impl PixelMapHeader {
	/// On-disk size in bytes.
	pub const SIZE: usize = 0x2E;

	/// Reads the header fields.
	pub fn parse(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
		Ok(Self {
			row_bytes_and_flags: r.get_u16_be()?,
			bounds: Rect::parse(r)?,
			version: r.get_u16_be()?,
			pack_format: r.get_u16_be()?,
			pack_size: r.get_u32_be()?,
			h_res: r.get_u32_be()?,
			v_res: r.get_u32_be()?,
			pixel_type: r.get_u16_be()?,
			pixel_size: r.get_u16_be()?,
			component_count: r.get_u16_be()?,
			component_size: r.get_u16_be()?,
			plane_offset: r.get_u32_be()?,
			color_table_offset: r.get_u32_be()?,
			reserved: r.get_u32_be()?,
		})
	}

	/// Row stride in bytes.
	#[must_use]
	pub fn row_bytes(&self) -> usize {
		(self.row_bytes_and_flags & 0x3FFF) as usize
	}

	/// Raster data size for this header's stride and height.
	#[must_use]
	pub fn data_size(&self) -> usize {
		self.row_bytes() * self.bounds.height().max(0) as usize
	}
}

/// Extracts the pixel value at (x, y) from packed index data.
///
/// `pixel_size` must be a power of two no larger than 32.
pub fn lookup_entry(
	data: &[u8],
	pixel_size: u16,
	row_bytes: usize,
	x: usize,
	y: usize,
) -> Result<u32, DecodeError> {
	let bit_offset = x * pixel_size as usize;
	let byte_index = y * row_bytes + bit_offset / 8;
	let fetch = |index: usize| -> Result<u32, DecodeError> {
		data.get(index).map(|&b| u32::from(b)).ok_or_else(|| {
			DecodeError::out_of_bounds(format!("pixel ({x}, {y}) outside raster data"))
		})
	};
	match pixel_size {
		1 | 2 | 4 => {
			let per_byte = 8 / pixel_size as usize;
			let shift = (per_byte - 1 - (x % per_byte)) * pixel_size as usize;
			let mask = (1u32 << pixel_size) - 1;
			Ok((fetch(byte_index)? >> shift) & mask)
		}
		8 => fetch(byte_index),
		16 => Ok((fetch(byte_index)? << 8) | fetch(byte_index + 1)?),
		32 => Ok((fetch(byte_index)? << 24)
			| (fetch(byte_index + 1)? << 16)
			| (fetch(byte_index + 2)? << 8)
			| fetch(byte_index + 3)?),
		_ => Err(DecodeError::unsupported(format!("pixel size {pixel_size}"))),
	}
}

/// Decodes 1-bit raster data: set bits render black, clear bits white.
pub fn decode_monochrome(
	data: &[u8],
	width: usize,
	height: usize,
	row_bytes: usize,
) -> Result<Image, DecodeError> {
	if row_bytes * height > data.len() {
		return Err(DecodeError::corrupt_size(format!(
			"monochrome raster needs {} bytes, {} present",
			row_bytes * height,
			data.len()
		)));
	}
	let mut img = Image::new(width, height)?;
	for y in 0..height {
		for x in 0..width {
			let byte = data[y * row_bytes + x / 8];
			let black = byte & (0x80 >> (x % 8)) != 0;
			img.write(x, y, if black { Rgba::BLACK } else { Rgba::WHITE })?;
		}
	}
	Ok(img)
}

/// Decodes 1-bit raster data with the minimal stride `ceil(width / 8)`.
pub fn decode_monochrome_packed(
	data: &[u8],
	width: usize,
	height: usize,
) -> Result<Image, DecodeError> {
	decode_monochrome(data, width, height, width.div_ceil(8))
}

/// Decodes indexed raster data of 1/2/4/8 bits per pixel through a color
/// table. Entry ids that are absent from the table are an error.
pub fn decode_indexed(
	data: &[u8],
	width: usize,
	height: usize,
	row_bytes: usize,
	pixel_size: u16,
	clut: &ColorTable,
) -> Result<Image, DecodeError> {
	let mut img = Image::new(width, height)?;
	for y in 0..height {
		for x in 0..width {
			let index = lookup_entry(data, pixel_size, row_bytes, x, y)?;
			let color = clut.get_color8(index as u16).ok_or_else(|| {
				DecodeError::out_of_bounds(format!("color id {index} not present in color table"))
			})?;
			img.write(x, y, Rgba::opaque(color))?;
		}
	}
	Ok(img)
}

/// Decodes a pixel map's raster through its header.
///
/// Indexed depths go through `clut`; 16-bit pixels are RGB555 and 32-bit
/// pixels are xRGB, both ignoring the color table.
pub fn decode_pixel_map(
	header: &PixelMapHeader,
	data: &[u8],
	clut: &ColorTable,
) -> Result<Image, DecodeError> {
	let width = header.bounds.width().max(0) as usize;
	let height = header.bounds.height().max(0) as usize;
	let row_bytes = header.row_bytes();
	match header.pixel_size {
		1 | 2 | 4 | 8 => decode_indexed(data, width, height, row_bytes, header.pixel_size, clut),
		16 => {
			let mut img = Image::new(width, height)?;
			for y in 0..height {
				for x in 0..width {
					let v = lookup_entry(data, 16, row_bytes, x, y)?;
					img.write(x, y, Rgba::opaque(rgb555_to_color8(v as u16)))?;
				}
			}
			Ok(img)
		}
		32 => {
			let mut img = Image::new(width, height)?;
			for y in 0..height {
				for x in 0..width {
					let v = lookup_entry(data, 32, row_bytes, x, y)?;
					img.write(
						x,
						y,
						Rgba::new((v >> 16) as u8, (v >> 8) as u8, v as u8, 0xFF),
					)?;
				}
			}
			Ok(img)
		}
		other => Err(DecodeError::unsupported(format!("pixel size {other}"))),
	}
}

/// Expands a 15-bit RGB555 value to 8-bit channels.
#[must_use]
pub fn rgb555_to_color8(v: u16) -> crate::quickdraw::color::Color8 {
	let expand = |c: u16| ((c & 0x1F) * 0xFF / 0x1F) as u8;
	crate::quickdraw::color::Color8::new(expand(v >> 10), expand(v >> 5), expand(v))
}

/// Reads `height` scan lines that may be PackBits-compressed.
///
/// Rows are stored raw when `row_bytes < 8`; otherwise each row is
/// PackBits data preceded by a 1-byte length when `row_bytes < 250` and a
/// 2-byte length otherwise. Every decompressed row must come out exactly
/// `row_bytes` long.
pub fn read_packbits_rows(
	r: &mut ByteReader<'_>,
	row_bytes: usize,
	height: usize,
) -> Result<Vec<u8>, DecodeError> {
	let mut out = Vec::with_capacity(row_bytes * height);
	if row_bytes < 8 {
		out.extend_from_slice(r.get_bytes(row_bytes * height)?);
		return Ok(out);
	}
	for row in 0..height {
		let packed_len = if row_bytes < 250 {
			r.get_u8()? as usize
		} else {
			r.get_u16_be()? as usize
		};
		let mut row_r = ByteReader::new(r.get_bytes(packed_len)?);
		let row_data = crate::codecs::packbits::unpack_bits_bounded(&mut row_r, row_bytes)?;
		if row_data.len() != row_bytes {
			return Err(DecodeError::corrupt_size(format!(
				"row {row} unpacked to {} bytes, expected {row_bytes}",
				row_data.len()
			)));
		}
		out.extend_from_slice(&row_data);
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::quickdraw::color::Color8;

	#[test]
	fn test_bitmap_header_flags() {
		let data = [0x80, 0x02, 0, 0, 0, 0, 0, 1, 0, 16];
		let mut r = ByteReader::new(&data);
		assert!(BitMapHeader::parse_plain(&mut r).is_err());

		let data = [0x00, 0x02, 0, 0, 0, 0, 0, 1, 0, 16];
		let mut r = ByteReader::new(&data);
		let h = BitMapHeader::parse_plain(&mut r).unwrap();
		assert_eq!(h.row_bytes(), 2);
		assert_eq!(h.bytes(), 2);
	}

	#[test]
	fn test_monochrome_row() {
		// One row, 16 pixels: 0xAA alternates starting black, 0x00 white
		let img = decode_monochrome(&[0xAA, 0x00], 16, 1, 2).unwrap();
		assert_eq!(img.width(), 16);
		assert_eq!(img.height(), 1);
		for x in 0..8 {
			let expected = if x % 2 == 0 { Rgba::BLACK } else { Rgba::WHITE };
			assert_eq!(img.read(x, 0).unwrap(), expected, "pixel {x}");
		}
		for x in 8..16 {
			assert_eq!(img.read(x, 0).unwrap(), Rgba::WHITE);
		}
	}

	#[test]
	fn test_lookup_entry_depths() {
		let data = [0b1001_0110, 0xAB];
		assert_eq!(lookup_entry(&data, 1, 2, 0, 0).unwrap(), 1);
		assert_eq!(lookup_entry(&data, 1, 2, 3, 0).unwrap(), 1);
		assert_eq!(lookup_entry(&data, 2, 2, 1, 0).unwrap(), 0b01);
		assert_eq!(lookup_entry(&data, 4, 2, 1, 0).unwrap(), 0x6);
		assert_eq!(lookup_entry(&data, 8, 2, 1, 0).unwrap(), 0xAB);
		assert_eq!(lookup_entry(&data, 16, 2, 0, 0).unwrap(), 0x96AB);
	}

	#[test]
	fn test_indexed_missing_color_is_error() {
		let clut = ColorTable::from_colors([Color8::new(1, 2, 3)]);
		assert!(decode_indexed(&[0x01], 1, 1, 1, 8, &clut).is_err());
		let img = decode_indexed(&[0x00], 1, 1, 1, 8, &clut).unwrap();
		assert_eq!(img.read(0, 0).unwrap(), Rgba::opaque(Color8::new(1, 2, 3)));
	}

	#[test]
	fn test_rgb555() {
		assert_eq!(rgb555_to_color8(0x7FFF), Color8::new(0xFF, 0xFF, 0xFF));
		assert_eq!(rgb555_to_color8(0x7C00), Color8::new(0xFF, 0, 0));
	}

	#[test]
	fn test_packbits_rows_length_checked() {
		// row_bytes = 8: each row carries a 1-byte length prefix
		let mut stream = Vec::new();
		stream.push(2); // packed length
		stream.extend_from_slice(&[0xF9, 0x42]); // 8 repeats of 0x42
		let mut r = ByteReader::new(&stream);
		let rows = read_packbits_rows(&mut r, 8, 1).unwrap();
		assert_eq!(rows, vec![0x42; 8]);
	}
}
