//! Prince of Persia 2 `SHAP` sprites.
//!
//! A `SHAP` header carries three compression flag bits which stack: an
//! LZ pass over a 1KB ring dictionary, a whole-stream RLE pass, and a
//! per-row RLE pass (which also changes where the real row width lives).
//! The decompressed bytes are color indices against the `ctbl` color
//! table; index 0 is transparent and unknown indices render white.

use crate::error::DecodeError;
use crate::image::{Image, Rgba};
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;

const FLAG_ROW_RLE: u16 = 0x0100;
const FLAG_RLE: u16 = 0x0200;
const FLAG_LZ: u16 = 0x0400;

/// Decompresses the SHAP LZ scheme: a 1KB ring dictionary with
/// control-bit selected literals and `(count, offset)` dictionary
/// copies. The stream's leading u32 is the decompressed size plus the
/// 12-byte header.
pub fn decompress_lz(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let decompressed_size = (r.get_u32_be()? as usize)
		.checked_sub(0x0C)
		.ok_or_else(|| DecodeError::corrupt_size("LZ size field below header size".to_string()))?;

	let mut dict = [0u8; 0x400];
	let mut dict_offset = 0x3BEusize;

	let mut out = Vec::with_capacity(decompressed_size);
	// Low 8 bits are control bits; the high bits track how many remain
	let mut control_bits: u16 = 0;
	while out.len() < decompressed_size {
		control_bits >>= 1;
		if control_bits & 0x100 == 0 {
			control_bits = u16::from(r.get_u8()?) | 0xFF00;
		}
		if control_bits & 1 != 0 {
			let v = r.get_u8()?;
			out.push(v);
			dict[dict_offset] = v;
			dict_offset = (dict_offset + 1) & 0x3FF;
		} else {
			// CCCCCCDD DDDDDDDD: count and dictionary offset
			let spec = r.get_u16_be()?;
			let offset = (spec & 0x3FF) as usize;
			let count = ((spec >> 10) & 0x3F) as usize + 3;
			for z in 0..count {
				if out.len() >= decompressed_size {
					break;
				}
				let v = dict[(offset + z) & 0x3FF];
				out.push(v);
				dict[dict_offset] = v;
				dict_offset = (dict_offset + 1) & 0x3FF;
			}
		}
	}
	Ok(out)
}

/// Decompresses the whole-stream RLE pass: `count & 0x80` repeats the
/// next byte `(count & 0x7F) + 3` times, otherwise `count` raw bytes.
pub fn decompress_stream_rle(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let mut out = Vec::new();
	while !r.is_eof() {
		let count = r.get_u8()?;
		if count & 0x80 != 0 {
			let v = r.get_u8()?;
			out.extend(std::iter::repeat_n(v, (count & 0x7F) as usize + 3));
		} else {
			out.extend_from_slice(r.get_bytes(count as usize)?);
		}
	}
	Ok(out)
}

/// Decompresses the per-row RLE pass: each row is a u16 byte count plus
/// commands (`cmd & 0x80` repeats `(cmd & 0x7F) + 1` times, otherwise
/// `cmd + 1` raw bytes). Every row must come out `row_bytes` long.
pub fn decompress_rows_rle(
	data: &[u8],
	num_rows: usize,
	row_bytes: usize,
) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let mut out = Vec::with_capacity(num_rows * row_bytes);
	for row in 0..num_rows {
		let bytes = r.get_u16_be()? as usize;
		let mut row_r = ByteReader::new(r.get_bytes(bytes)?);
		let before = out.len();
		while !row_r.is_eof() {
			let cmd = row_r.get_u8()?;
			if cmd & 0x80 != 0 {
				let v = row_r.get_u8()?;
				out.extend(std::iter::repeat_n(v, (cmd & 0x7F) as usize + 1));
			} else {
				out.extend_from_slice(row_r.get_bytes(cmd as usize + 1)?);
			}
		}
		if out.len() - before != row_bytes {
			return Err(DecodeError::corrupt_size(format!(
				"row {row} decompressed to {} bytes, expected {row_bytes}",
				out.len() - before
			)));
		}
	}
	Ok(out)
}

/// Decodes a `SHAP` sprite against its color table.
pub fn decode_shap(data: &[u8], ctbl: &ColorTable) -> Result<Image, DecodeError> {
	let mut r = ByteReader::new(data);
	let flags = r.get_u16_be()?;
	let width = r.get_i16_be()?;
	let row_bytes_field = r.get_i16_be()?;
	let height = r.get_i16_be()?;
	r.skip(4)?; // unknown
	if width <= 0 || height <= 0 {
		return Err(DecodeError::corrupt_size(format!("SHAP dimensions {width}x{height}")));
	}

	let mut body = r.get_bytes(r.remaining())?.to_vec();
	let mut row_bytes = width as usize;

	if flags & FLAG_LZ != 0 {
		body = decompress_lz(&body)?;
	}
	if flags & FLAG_RLE != 0 {
		body = decompress_stream_rle(&body)?;
	}
	if flags & FLAG_ROW_RLE != 0 {
		if row_bytes_field <= 0 {
			return Err(DecodeError::corrupt_size(format!("SHAP row bytes {row_bytes_field}")));
		}
		body = decompress_rows_rle(&body, height as usize, row_bytes_field as usize)?;
		// With row RLE, the width field is a lie; the stride field holds
		// the real width
		row_bytes = row_bytes_field as usize;
	}

	let area = row_bytes * height as usize;
	if body.len() != area {
		return Err(DecodeError::corrupt_size(format!(
			"SHAP data is {} bytes after decompression, expected {area}",
			body.len()
		)));
	}

	let mut img = Image::new_with_alpha(row_bytes, height as usize)?;
	for y in 0..height as usize {
		for x in 0..row_bytes {
			let v = body[y * row_bytes + x];
			let px = if v == 0 {
				Rgba::TRANSPARENT
			} else {
				match ctbl.get_color8(u16::from(v)) {
					Some(c) => Rgba::opaque(c),
					// Shipping tables are sparse; unknown ids show white
					None => Rgba::WHITE,
				}
			};
			img.write(x, y, px)?;
		}
	}
	Ok(img)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::quickdraw::color::{Color8, ColorTable, ColorTableEntry};

	fn sparse_ctbl() -> ColorTable {
		ColorTable::from_entries(vec![ColorTableEntry {
			id: 5,
			color: Color8::new(0xFF, 0, 0).as16(),
		}])
	}

	fn shap(flags: u16, width: i16, row_bytes: i16, height: i16, body: &[u8]) -> Vec<u8> {
		let mut v = Vec::new();
		v.extend_from_slice(&flags.to_be_bytes());
		v.extend_from_slice(&width.to_be_bytes());
		v.extend_from_slice(&row_bytes.to_be_bytes());
		v.extend_from_slice(&height.to_be_bytes());
		v.extend_from_slice(&[0; 4]);
		v.extend_from_slice(body);
		v
	}

	#[test]
	fn test_uncompressed_shap() {
		let img = decode_shap(&shap(0, 2, 2, 2, &[0, 5, 5, 9]), &sparse_ctbl()).unwrap();
		assert_eq!(img.read(0, 0).unwrap(), Rgba::TRANSPARENT);
		assert_eq!(img.read(1, 0).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
		// Unknown color id renders white
		assert_eq!(img.read(1, 1).unwrap(), Rgba::WHITE);
	}

	#[test]
	fn test_stream_rle_pass() {
		// 0x81 05 -> four 5s
		let img = decode_shap(&shap(FLAG_RLE, 2, 2, 2, &[0x81, 0x05]), &sparse_ctbl()).unwrap();
		assert_eq!(img.read(0, 1).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
	}

	#[test]
	fn test_rows_rle_uses_stride_field() {
		// Two rows, each: count=3, raw command 0x01 + 2 bytes
		let mut body = Vec::new();
		for _ in 0..2 {
			body.extend_from_slice(&3u16.to_be_bytes());
			body.extend_from_slice(&[0x01, 5, 0]);
		}
		let img =
			decode_shap(&shap(FLAG_ROW_RLE, 99, 2, 2, &body), &sparse_ctbl()).unwrap();
		assert_eq!(img.width(), 2);
		assert_eq!(img.read(0, 0).unwrap().a, 0xFF);
		assert_eq!(img.read(1, 0).unwrap().a, 0);
	}

	#[test]
	fn test_lz_literals() {
		// Control byte 0x0F: four literals (then the stream ends)
		let mut body = Vec::new();
		body.extend_from_slice(&(4u32 + 0x0C).to_be_bytes());
		body.extend_from_slice(&[0x0F, 5, 0, 5, 0]);
		let img = decode_shap(&shap(FLAG_LZ, 2, 2, 2, &body), &sparse_ctbl()).unwrap();
		assert_eq!(img.read(0, 0).unwrap().a, 0xFF);
		assert_eq!(img.read(1, 1).unwrap().a, 0);
	}

	#[test]
	fn test_size_mismatch() {
		assert!(matches!(
			decode_shap(&shap(0, 2, 2, 2, &[0; 5]), &sparse_ctbl()),
			Err(DecodeError::CorruptSize(_))
		));
	}
}
