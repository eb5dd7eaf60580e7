//! Presage engine sprite resources: `PPSS` and `Pak `.
//!
//! Both are image directories: a format word, an image count, and a
//! table of u32 section offsets (zero for absent slots). Sections hold
//! either an LZSS-compressed index raster or an opcode stream. The
//! opcode streams come in two revisions; the command byte is
//! `RGGCCCCC`: `R` advances to the next row, `GG` selects the group,
//! `CCCCC` is a count with an extended form.
//!
//! Loop control keeps an explicit stack of `(iterations, offset)`
//! frames; a group-0 command with count 1 pops or stops.

use crate::codecs::presage::decompress_lzss;
use crate::error::DecodeError;
use crate::image::{Image, Rgba};
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::sprites::{clut_color, require_clut};

/// `PPSS` opcode-stream format word.
const FORMAT_COMMANDS: u16 = 0xC211;
/// `PPSS` LZSS format word.
const FORMAT_LZSS: u16 = 0xC103;
/// `Pak ` opcode-stream format word.
const PAK_FORMAT_COMMANDS: u16 = 0x8002;
/// `Pak ` monochrome format word.
const PAK_FORMAT_MONO: u16 = 0x8101;

fn decode_lzss_section(
	r: &mut ByteReader<'_>,
	width: usize,
	height: usize,
	clut: &ColorTable,
) -> Result<Image, DecodeError> {
	let compressed = r.get_bytes(r.remaining())?;
	let decompressed = decompress_lzss(compressed, Some(width * height))?;
	if decompressed.len() < width * height {
		return Err(DecodeError::corrupt_size(format!(
			"LZSS section produced {} of {} bytes",
			decompressed.len(),
			width * height
		)));
	}

	let mut img = Image::new_with_alpha(width, height)?;
	for y in 0..height {
		for x in 0..width {
			let v = decompressed[y * width + x];
			img.write(x, y, Rgba::opaque(clut_color(clut, v)?))?;
		}
	}
	Ok(img)
}

/// Decodes a masked monochrome image: alternating words of mask and
/// color bits, width rounded up to 16.
///
/// With `use_and_compositing` (Prince of Persia) a set color bit renders
/// black regardless of the mask; otherwise the mask wins.
pub fn decode_mono_image(
	r: &mut ByteReader<'_>,
	width: usize,
	height: usize,
	use_and_compositing: bool,
) -> Result<Image, DecodeError> {
	let width = (width + 15) & !15;
	let mut img = Image::new_with_alpha(width, height)?;
	for y in 0..height {
		for x in (0..width).step_by(16) {
			let mut mask_bits = r.get_u16_be()?;
			let mut color_bits = r.get_u16_be()?;
			for z in 0..16 {
				let px = if use_and_compositing {
					if color_bits & 0x8000 != 0 {
						Rgba::BLACK
					} else if mask_bits & 0x8000 != 0 {
						Rgba::TRANSPARENT
					} else {
						Rgba::WHITE
					}
				} else if mask_bits & 0x8000 != 0 {
					Rgba::TRANSPARENT
				} else if color_bits & 0x8000 != 0 {
					Rgba::BLACK
				} else {
					Rgba::WHITE
				};
				img.write(x + z, y, px)?;
				mask_bits <<= 1;
				color_bits <<= 1;
			}
		}
	}
	Ok(img)
}

/// Decodes the v1 opcode stream (Prince of Persia).
///
/// Groups: 00 = stop / single-color run, 01 = literal bytes, 10 =
/// transparent run, 11 = loop control. Extended counts are one byte.
pub fn decode_v1_commands(
	r: &mut ByteReader<'_>,
	width: usize,
	height: usize,
	clut: &ColorTable,
) -> Result<Image, DecodeError> {
	let mut img = Image::new_with_alpha(width, height)?;
	let mut loc_stack: Vec<(usize, usize)> = Vec::new();
	let mut x = 0isize;
	let mut y = 0isize;

	loop {
		let cmd = r.get_u8()?;
		if cmd & 0x80 != 0 {
			y += 1;
			x = 0;
		}

		// Counts are stored minus one; the extended form follows
		let mut count = (cmd & 0x1F) as usize;
		if count == 0x1F {
			count = r.get_u8()? as usize + 0x20;
		} else {
			count += 1;
		}

		match cmd & 0x60 {
			0x00 => {
				// Stop when the raw count was zero, else a color run
				if count == 1 {
					break;
				}
				let c = clut_color(clut, r.get_u8()?)?;
				for _ in 0..count {
					img.write_clipped(x, y, Rgba::opaque(c));
					x += 1;
				}
			}
			0x20 => {
				// Literal bytes
				for _ in 0..count {
					let c = clut_color(clut, r.get_u8()?)?;
					img.write_clipped(x, y, Rgba::opaque(c));
					x += 1;
				}
			}
			0x40 => {
				// Transparent run
				x += count as isize;
			}
			_ => {
				// Loop control: push on nonzero count, else pop/repeat
				count -= 1;
				if count != 0 {
					loc_stack.push((count, r.position()));
					continue;
				}
				let Some(frame) = loc_stack.last_mut() else {
					break;
				};
				if frame.0 == 0 {
					loc_stack.pop();
				} else {
					frame.0 -= 1;
					let offset = frame.1;
					r.seek(offset)?;
				}
			}
		}
	}
	Ok(img)
}

/// Decodes the v2 opcode stream (Flashback, Mario Teaches Typing).
///
/// The groups move: 00 = loop control, 01 = transparent run, 10 = stop
/// or single-color run, 11 = literal bytes. Extended counts are words.
pub fn decode_v2_commands(
	r: &mut ByteReader<'_>,
	width: usize,
	height: usize,
	clut: &ColorTable,
) -> Result<Image, DecodeError> {
	let mut img = Image::new_with_alpha(width, height)?;
	let mut loc_stack: Vec<(usize, usize)> = Vec::new();
	let mut x = 0isize;
	let mut y = 0isize;

	loop {
		let cmd = r.get_u8()?;
		if cmd & 0x80 != 0 {
			y += 1;
			x = 0;
		}
		let mut count = (cmd & 0x1F) as usize;
		if count == 0 {
			count = r.get_u16_be()? as usize;
		}
		match cmd & 0x60 {
			0x00 => {
				// Loop control
				if count != 1 {
					loc_stack.push((count - 1, r.position()));
				} else if let Some(frame) = loc_stack.last_mut() {
					if frame.0 == 0 {
						loc_stack.pop();
					} else {
						frame.0 -= 1;
						let offset = frame.1;
						r.seek(offset)?;
					}
				} else {
					break;
				}
			}
			0x20 => {
				// Transparent run
				x += count as isize;
			}
			0x40 => {
				// Stop, or a single-color run
				if count == 1 {
					break;
				}
				let c = clut_color(clut, r.get_u8()?)?;
				for _ in 0..count {
					img.write_clipped(x, y, Rgba::opaque(c));
					x += 1;
				}
			}
			_ => {
				// Literal bytes
				for _ in 0..count {
					let c = clut_color(clut, r.get_u8()?)?;
					img.write_clipped(x, y, Rgba::opaque(c));
					x += 1;
				}
			}
		}
	}
	Ok(img)
}

/// Decodes a `PPSS` resource into its images.
///
/// A stream whose first byte lacks the high bit is itself
/// LZSS-compressed before the directory appears.
pub fn decode_ppss(data: &[u8], clut: &ColorTable) -> Result<Vec<Image>, DecodeError> {
	require_clut(clut)?;
	let decompressed;
	let mut r = ByteReader::new(data);
	if r.peek_u8()? & 0x80 == 0 {
		decompressed = decompress_lzss(data, None)?;
		r = ByteReader::new(&decompressed);
	}

	let format = r.get_u16_be()?;
	let num_images = r.get_u16_be()? as usize;
	r.skip(4)?; // unknown

	let mut images = Vec::new();
	for _ in 0..num_images {
		let start_offset = r.get_u32_be()? as usize;
		if start_offset == 0 {
			continue;
		}
		let mut section_r = r.sub_from(start_offset)?;
		let width = section_r.get_u16_be()? as usize;
		let height = section_r.get_u16_be()? as usize;
		match format {
			FORMAT_COMMANDS => {
				section_r.skip(4)?; // unknown; possibly origin coordinates
				images.push(decode_v2_commands(&mut section_r, width, height, clut)?);
			}
			FORMAT_LZSS => {
				images.push(decode_lzss_section(&mut section_r, width, height, clut)?);
			}
			other => {
				return Err(DecodeError::unsupported(format!("PPSS format {other:#06X}")));
			}
		}
	}
	Ok(images)
}

/// Decodes a `Pak ` resource into its images.
pub fn decode_pak(data: &[u8], clut: &ColorTable) -> Result<Vec<Image>, DecodeError> {
	let mut r = ByteReader::new(data);
	let format = r.get_u16_be()?;
	let num_images = r.get_u16_be()? as usize;
	r.skip(2)?; // unknown

	let mut images = Vec::new();
	for _ in 0..num_images {
		let start_offset = r.get_u32_be()? as usize;
		if start_offset == 0 {
			continue;
		}
		let mut section_r = r.sub_from(start_offset)?;
		section_r.skip(4)?; // unknown; possibly origin coordinates
		let width = section_r.get_u16_be()? as usize;
		let height = section_r.get_u16_be()? as usize;
		match format {
			PAK_FORMAT_COMMANDS => {
				require_clut(clut)?;
				images.push(decode_v2_commands(&mut section_r, width, height, clut)?);
			}
			PAK_FORMAT_MONO => {
				images.push(decode_mono_image(&mut section_r, width, height, false)?);
			}
			other => {
				return Err(DecodeError::unsupported(format!("Pak format {other:#06X}")));
			}
		}
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

	#[test]
	fn test_v2_color_run_and_literals() {
		// 0x42: group 10, count 2 -> run of color; 0x62: group 11 literals;
		// 0x41: stop
		let stream = [0x42, 0x01, 0x62, 0x02, 0x01, 0x41];
		let mut r = ByteReader::new(&stream);
		let img = decode_v2_commands(&mut r, 4, 1, &test_clut()).unwrap();
		assert_eq!(img.read(0, 0).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
		assert_eq!(img.read(1, 0).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
		assert_eq!(img.read(2, 0).unwrap(), Rgba::opaque(Color8::new(0, 0xFF, 0)));
		assert_eq!(img.read(3, 0).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
	}

	#[test]
	fn test_v2_row_advance_and_skip() {
		// Write one pixel, advance row + skip, write another, stop
		let stream = [0x62, 0x01, 0x02, 0xA1, 0x61, 0x02, 0x41];
		let mut r = ByteReader::new(&stream);
		let img = decode_v2_commands(&mut r, 2, 2, &test_clut()).unwrap();
		assert_eq!(img.read(0, 0).unwrap().a, 0xFF);
		assert_eq!(img.read(0, 1).unwrap().a, 0);
		assert_eq!(img.read(1, 1).unwrap(), Rgba::opaque(Color8::new(0, 0xFF, 0)));
	}

	#[test]
	fn test_v2_loop_repeats() {
		// Loop twice over a single literal write, then stop. 0x02 pushes
		// (1, offset); 0x01 at the end pops one iteration and repeats.
		let stream = [0x02, 0x61, 0x01, 0x01, 0x41];
		let mut r = ByteReader::new(&stream);
		let img = decode_v2_commands(&mut r, 4, 1, &test_clut()).unwrap();
		// Two literal writes happened
		assert_eq!(img.read(0, 0).unwrap().a, 0xFF);
		assert_eq!(img.read(1, 0).unwrap().a, 0xFF);
		assert_eq!(img.read(2, 0).unwrap().a, 0);
	}

	#[test]
	fn test_v1_stop_and_run() {
		// 0x01: group 00 count 2 -> run of color 1; 0x00: stop
		let stream = [0x01, 0x01, 0x00];
		let mut r = ByteReader::new(&stream);
		let img = decode_v1_commands(&mut r, 2, 1, &test_clut()).unwrap();
		assert_eq!(img.read(0, 0).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
		assert_eq!(img.read(1, 0).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
	}

	#[test]
	fn test_mono_image_rounding_and_masks() {
		// Width 8 rounds to 16; mask word 0xFF00, color word 0x0F00
		let stream = [0xFF, 0x00, 0x0F, 0x00];
		let mut r = ByteReader::new(&stream);
		let img = decode_mono_image(&mut r, 8, 1, false).unwrap();
		assert_eq!(img.width(), 16);
		assert_eq!(img.read(0, 0).unwrap().a, 0); // masked out
		assert_eq!(img.read(8, 0).unwrap(), Rgba::BLACK); // color bit set
		assert_eq!(img.read(12, 0).unwrap(), Rgba::WHITE);
	}

	#[test]
	fn test_ppss_directory() {
		let mut section = Vec::new();
		section.extend_from_slice(&1u16.to_be_bytes()); // width
		section.extend_from_slice(&1u16.to_be_bytes()); // height
		section.extend_from_slice(&[0; 4]);
		section.extend_from_slice(&[0x61, 0x01, 0x41]); // literal + stop

		let mut data = Vec::new();
		data.extend_from_slice(&FORMAT_COMMANDS.to_be_bytes());
		data.extend_from_slice(&2u16.to_be_bytes()); // two slots
		data.extend_from_slice(&[0; 4]);
		let table_end = data.len() + 8;
		data.extend_from_slice(&(table_end as u32).to_be_bytes());
		data.extend_from_slice(&0u32.to_be_bytes()); // absent slot
		data.extend_from_slice(&section);

		let images = decode_ppss(&data, &test_clut()).unwrap();
		assert_eq!(images.len(), 1);
		assert_eq!(images[0].read(0, 0).unwrap().a, 0xFF);
	}
}
