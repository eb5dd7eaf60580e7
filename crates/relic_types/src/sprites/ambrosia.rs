//! Ambrosia sprite formats: `btSP`, `HrSp`, and `SprD`.
//!
//! All three are 24-bit-count command streams padded to 4-byte
//! boundaries. `btSP` stores no height, so the stream is walked once to
//! count rows before decoding. `HrSp` frames rows with a byte-count
//! command; `SprD` concatenates `HrSp`-style records.

use crate::error::DecodeError;
use crate::image::{Image, Rgba};
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::sprites::{clut_color, require_clut};

/// Decodes a `btSP` sprite.
pub fn decode_btsp(data: &[u8], clut: &ColorTable) -> Result<Image, DecodeError> {
	require_clut(clut)?;
	if data.len() < 8 {
		return Err(DecodeError::corrupt_size("btSP shorter than its header".to_string()));
	}
	if data.len() % 4 != 0 {
		return Err(DecodeError::corrupt_size(format!(
			"btSP length {} is not a multiple of 4",
			data.len()
		)));
	}

	let mut r = ByteReader::new(data);
	let width = r.get_u16_be()? as usize;
	r.skip(2)?; // unknown

	// Height is not stored; walk the stream counting row commands
	let mut height = 1usize;
	while !r.is_eof() {
		let cmd = r.get_u8()?;
		match cmd {
			1 => {
				let count = r.get_u24_be()? as usize;
				r.skip((count + 3) & !3)?;
			}
			2 => r.skip(3)?,
			3 => {
				r.skip(3)?;
				height += 1;
			}
			4 => r.skip(3)?,
			other => {
				return Err(DecodeError::BadOpcode { opcode: other, offset: r.position() - 1 });
			}
		}
	}

	r.seek(4)?;
	let mut img = Image::new_with_alpha(width, height)?;
	let mut x = 0isize;
	let mut y = 0isize;
	while !r.is_eof() {
		let cmd = r.get_u8()?;
		match cmd {
			1 => {
				// 01 XX XX XX <data>: copy X bytes, padded to 4
				let count = r.get_u24_be()? as usize;
				for _ in 0..count {
					let v = r.get_u8()?;
					img.write_clipped(x, y, Rgba::opaque(clut_color(clut, v)?));
					x += 1;
				}
				r.skip(((count + 3) & !3) - count)?;
			}
			2 => {
				// 02 00 00 XX: transparent run
				let count = r.get_u24_be()? as usize;
				x += count as isize;
			}
			3 => {
				// 03 00 00 00: next row
				if r.get_u24_be()? != 0 {
					return Err(DecodeError::corrupt_size(
						"row command with nonzero argument".to_string(),
					));
				}
				x = 0;
				y += 1;
			}
			4 => {
				// 04 00 00 00: end of sprite
				if r.get_u24_be()? != 0 {
					return Err(DecodeError::corrupt_size(
						"end command with nonzero argument".to_string(),
					));
				}
				if !r.is_eof() {
					return Err(DecodeError::corrupt_size(
						"end command before end of stream".to_string(),
					));
				}
			}
			other => {
				return Err(DecodeError::BadOpcode { opcode: other, offset: r.position() - 1 });
			}
		}
	}
	Ok(img)
}

/// Shared command interpreter for `HrSp` bodies and `SprD` records.
fn decode_hrsp_commands(
	r: &mut ByteReader<'_>,
	width: usize,
	height: usize,
	clut: &ColorTable,
) -> Result<Image, DecodeError> {
	let mut img = Image::new_with_alpha(width, height)?;
	let mut x = 0isize;
	let mut y = 0isize;
	let mut next_row_begin_offset = usize::MAX;
	while !r.is_eof() {
		if r.position() == next_row_begin_offset {
			x = 0;
			y += 1;
		}

		let cmd = r.get_u8()?;
		match cmd {
			0 => {
				// 00 00 00 00: end of sprite
				if r.get_u24_be()? != 0 {
					return Err(DecodeError::corrupt_size(
						"end command with nonzero argument".to_string(),
					));
				}
				if !r.is_eof() {
					return Err(DecodeError::corrupt_size(
						"end command before end of stream".to_string(),
					));
				}
			}
			1 => {
				// 01 XX XX XX: the next row starts X bytes from here
				let frame = r.get_u24_be()? as usize;
				next_row_begin_offset = frame + r.position();
			}
			2 => {
				// 02 XX XX XX <data>: copy X bytes, padded to 4
				let count = r.get_u24_be()? as usize;
				for _ in 0..count {
					let v = r.get_u8()?;
					img.write_clipped(x, y, Rgba::opaque(clut_color(clut, v)?));
					x += 1;
				}
				r.skip(((count + 3) & !3) - count)?;
			}
			3 => {
				// 03 XX XX XX: transparent run
				let count = r.get_u24_be()? as usize;
				x += count as isize;
			}
			other => {
				return Err(DecodeError::BadOpcode { opcode: other, offset: r.position() - 1 });
			}
		}
	}
	Ok(img)
}

/// Decodes an `HrSp` sprite; `header_size` is 0x10 for the games seen so
/// far but varies.
pub fn decode_hrsp(
	data: &[u8],
	clut: &ColorTable,
	header_size: usize,
) -> Result<Image, DecodeError> {
	require_clut(clut)?;
	if header_size < 8 || header_size % 4 != 0 {
		return Err(DecodeError::corrupt_size(format!("HrSp header size {header_size}")));
	}
	if data.len() < header_size + 4 || data.len() % 4 != 0 {
		return Err(DecodeError::corrupt_size(format!("HrSp length {}", data.len())));
	}

	let mut r = ByteReader::new(data);
	r.skip(4)?;
	let height = r.get_u16_be()? as usize;
	let width = r.get_u16_be()? as usize;
	r.seek(header_size)?;
	decode_hrsp_commands(&mut r, width, height, clut)
}

/// Decodes a `SprD` sprite directory: concatenated command records.
pub fn decode_sprd(data: &[u8], clut: &ColorTable) -> Result<Vec<Image>, DecodeError> {
	require_clut(clut)?;
	let mut r = ByteReader::new(data);
	let mut images = Vec::new();
	while !r.is_eof() {
		r.skip(4)?;
		let height = r.get_u16_be()? as usize;
		let width = r.get_u16_be()? as usize;
		let command_bytes = r.get_u32_be()? as usize;
		let end_offset = r.position() + command_bytes;
		r.skip(8)?;
		if end_offset < r.position() || end_offset > r.len() {
			return Err(DecodeError::corrupt_size(format!(
				"SprD record claims {command_bytes} command bytes"
			)));
		}
		let mut record_r = r.sub(r.position(), end_offset - r.position())?;
		images.push(decode_hrsp_commands(&mut record_r, width, height, clut)?);
		r.seek(end_offset)?;
	}
	Ok(images)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::quickdraw::color::Color8;

	fn test_clut() -> ColorTable {
		ColorTable::from_colors([
			Color8::new(0, 0, 0),
			Color8::new(0xFF, 0, 0),
			Color8::new(0, 0xFF, 0),
		])
	}

	fn cmd(op: u8, count: u32) -> [u8; 4] {
		let c = count.to_be_bytes();
		[op, c[1], c[2], c[3]]
	}

	#[test]
	fn test_btsp_two_rows() {
		let mut data = Vec::new();
		data.extend_from_slice(&2u16.to_be_bytes()); // width
		data.extend_from_slice(&[0, 0]);
		data.extend_from_slice(&cmd(1, 2)); // two pixels
		data.extend_from_slice(&[1, 2, 0, 0]); // indices + pad
		data.extend_from_slice(&cmd(3, 0)); // next row
		data.extend_from_slice(&cmd(2, 1)); // one transparent
		data.extend_from_slice(&cmd(1, 1));
		data.extend_from_slice(&[2, 0, 0, 0]);
		data.extend_from_slice(&cmd(4, 0)); // end

		let img = decode_btsp(&data, &test_clut()).unwrap();
		assert_eq!(img.width(), 2);
		assert_eq!(img.height(), 2);
		assert_eq!(img.read(0, 0).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
		assert_eq!(img.read(1, 0).unwrap(), Rgba::opaque(Color8::new(0, 0xFF, 0)));
		assert_eq!(img.read(0, 1).unwrap().a, 0);
		assert_eq!(img.read(1, 1).unwrap(), Rgba::opaque(Color8::new(0, 0xFF, 0)));
	}

	#[test]
	fn test_btsp_requires_clut() {
		let empty = ColorTable::from_entries(Vec::new());
		assert!(matches!(
			decode_btsp(&[0; 8], &empty),
			Err(DecodeError::MissingResource { .. })
		));
	}

	#[test]
	fn test_hrsp_row_frames() {
		let mut data = Vec::new();
		data.extend_from_slice(&[0; 4]); // unknown
		data.extend_from_slice(&2u16.to_be_bytes()); // height
		data.extend_from_slice(&1u16.to_be_bytes()); // width
		data.extend_from_slice(&[0; 8]); // rest of 0x10 header
		// Row frame: next row after 8 command bytes
		data.extend_from_slice(&cmd(1, 8));
		data.extend_from_slice(&cmd(2, 1));
		data.extend_from_slice(&[1, 0, 0, 0]);
		data.extend_from_slice(&cmd(2, 1));
		data.extend_from_slice(&[2, 0, 0, 0]);
		data.extend_from_slice(&cmd(0, 0));

		let img = decode_hrsp(&data, &test_clut(), 0x10).unwrap();
		assert_eq!(img.read(0, 0).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
		assert_eq!(img.read(0, 1).unwrap(), Rgba::opaque(Color8::new(0, 0xFF, 0)));
	}
}
