//! SimCity 2000 `SPRT` sprite sheets.
//!
//! A `SPRT` starts with a count and an entry table `{id, offset, height,
//! width}`. Sprite data is a word-aligned opcode stream: opcodes are two
//! bytes with the low byte selecting the operation and the high byte
//! carrying a count.

use crate::error::DecodeError;
use crate::image::{Image, Rgba};
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::sprites::{clut_color, require_clut};

fn decode_sprite_entry(
	r: &mut ByteReader<'_>,
	width: usize,
	height: usize,
	pltt: &ColorTable,
) -> Result<Image, DecodeError> {
	let mut img = Image::new_with_alpha(width, height)?;
	// The first row opcode moves y to 0
	let mut x = 0isize;
	let mut y = -1isize;
	loop {
		let opcode = r.get_u16_be()?;
		let count = (opcode >> 8) as usize;
		match opcode & 0xFF {
			0 => {} // no-op
			1 => {
				// End of row
				y += 1;
				x = 0;
			}
			2 => return Ok(img),
			3 => {
				// Transparent run
				x += count as isize;
			}
			4 => {
				// Literal pixels, padded to a word boundary
				for _ in 0..count {
					let v = r.get_u8()?;
					img.write_clipped(x, y, Rgba::opaque(clut_color(pltt, v)?));
					x += 1;
				}
				if count % 2 != 0 {
					r.skip(1)?;
				}
			}
			other => {
				return Err(DecodeError::BadOpcode {
					opcode: other as u8,
					offset: r.position() - 2,
				});
			}
		}
	}
}

/// Decodes a `SPRT` resource into its sprites.
pub fn decode_sprt(data: &[u8], pltt: &ColorTable) -> Result<Vec<Image>, DecodeError> {
	require_clut(pltt)?;
	let mut r = ByteReader::new(data);
	let count = r.get_u16_be()? as usize;

	let mut images = Vec::with_capacity(count);
	for _ in 0..count {
		let _id = r.get_u16_be()?;
		let offset = r.get_u32_be()? as usize;
		let height = r.get_u16_be()? as usize;
		let width = r.get_u16_be()? as usize;
		let mut sprite_r = ByteReader::new(data).sub_from(offset)?;
		images.push(decode_sprite_entry(&mut sprite_r, width, height, pltt)?);
	}
	Ok(images)
}
