//! Swamp Gas `PPic` picture blocks.
//!
//! A `PPic` is a list of length-prefixed blocks, each either a pixel map
//! or a bit map. Pixel-map data is compressed in 4x4-pixel blocks
//! (stored as one u16 of 4-bit pixels per row) with commands for solid
//! runs, repeats, 2- and 4-color selector blocks, and raw blocks. Bitmap
//! data is a byte-RLE stream stored column-major.
//!
//! Opcodes `8x` and `9x` appear in some shipping files; the original
//! renderer's jump table had no entries for them and aborted, which is
//! preserved here as a hard error.

use crate::error::DecodeError;
use crate::image::Image;
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::quickdraw::raster::{decode_monochrome, decode_pixel_map, BitMapHeader, PixelMapHeader};

/// Decompresses pixel-map data into `row_bytes * height` bytes.
pub fn decompress_pixel_map_data(
	data: &[u8],
	row_bytes: usize,
	height: usize,
) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let mut out: Vec<u8> = Vec::with_capacity(row_bytes * height);
	let mut current_rows: [Vec<u8>; 4] = Default::default();

	let mut last_0x_word = [0u8; 2];
	let mut last_4x_colors = [0u8; 2];
	let mut last_6x_colors = [0u8; 4];

	let mut y = 0usize;
	while y < height {
		while current_rows[0].len() < row_bytes {
			let cmd = r.get_u8()?;
			let cmd_low = (cmd & 0x0F) as usize;

			match cmd & 0xF0 {
				// 0X XY: (XX + 1) solid blocks of color Y; remember Y
				// 1X: (X + 1) solid blocks of the remembered color
				0x00 | 0x10 => {
					let count;
					if cmd & 0x10 == 0 {
						let arg = r.get_u8()?;
						count = ((cmd_low << 4) | (arg >> 4) as usize) + 1;
						let color = arg & 0x0F;
						let packed = (color << 4) | color;
						last_0x_word = [packed, packed];
					} else {
						count = cmd_low + 1;
					}
					for row in &mut current_rows {
						for _ in 0..count {
							row.extend_from_slice(&last_0x_word);
						}
					}
				}

				// 2X: duplicate the previous block (X + 1) times
				// 3X: same, (X + 0x11) times
				0x20 | 0x30 => {
					let count = cmd_low + (cmd & 0x10) as usize + 1;
					for row in &mut current_rows {
						if row.len() < 2 {
							return Err(DecodeError::corrupt_size(
								"block repeat before any blocks were written".to_string(),
							));
						}
						let block = [row[row.len() - 2], row[row.len() - 1]];
						for _ in 0..count {
							row.extend_from_slice(&block);
						}
					}
				}

				// 4X YZ [...]: (X + 1) 2-color blocks; each block is a u16
				// of row-major 1-bit selectors (0 = Y, 1 = Z)
				// 5X [...]: same with the remembered YZ
				0x40 | 0x50 => {
					let count = cmd_low + 1;
					if cmd & 0x10 == 0 {
						let c = r.get_u8()?;
						last_4x_colors = [(c >> 4) & 0x0F, c & 0x0F];
					}
					for _ in 0..count {
						let mut block_bits = r.get_u16_be()?;
						for row in &mut current_rows {
							let mut packed = 0u16;
							for _ in 0..4 {
								let color = last_4x_colors[((block_bits >> 15) & 1) as usize];
								packed = (packed << 4) | u16::from(color);
								block_bits <<= 1;
							}
							row.extend_from_slice(&packed.to_be_bytes());
						}
					}
				}

				// 6X ABCD [...]: (X + 1) 4-color blocks with a u32 of
				// 2-bit selectors
				// 7X [...]: same with the remembered ABCD
				0x60 | 0x70 => {
					let count = cmd_low + 1;
					if cmd & 0x10 == 0 {
						let c = r.get_u8()?;
						last_6x_colors[0] = (c >> 4) & 0x0F;
						last_6x_colors[1] = c & 0x0F;
						let c = r.get_u8()?;
						last_6x_colors[2] = (c >> 4) & 0x0F;
						last_6x_colors[3] = c & 0x0F;
					}
					for _ in 0..count {
						let mut block_bits = r.get_u32_be()?;
						for row in &mut current_rows {
							let mut packed = 0u16;
							for _ in 0..4 {
								let color = last_6x_colors[((block_bits >> 30) & 3) as usize];
								packed = (packed << 4) | u16::from(color);
								block_bits <<= 2;
							}
							row.extend_from_slice(&packed.to_be_bytes());
						}
					}
				}

				// 8X / 9X: present in some files; the original aborted
				0x80 | 0x90 => {
					return Err(DecodeError::BadOpcode {
						opcode: cmd,
						offset: r.position() - 1,
					});
				}

				// AX [...]: (X + 1) raw blocks, one u64 each (u16 per row)
				// BX [...]: same, (X + 0x11) blocks
				0xA0 | 0xB0 => {
					let count = cmd_low + (cmd & 0x10) as usize + 1;
					for _ in 0..count {
						let block_bits = r.get_u64_be()?;
						for (line, row) in current_rows.iter_mut().enumerate() {
							let word = (block_bits >> (48 - 16 * line)) as u16;
							row.extend_from_slice(&word.to_be_bytes());
						}
					}
				}

				_ => {
					return Err(DecodeError::BadOpcode {
						opcode: cmd,
						offset: r.position() - 1,
					});
				}
			}
		}

		// When height is not a multiple of 4, the final band shifts up
		// and partially overwrites the previous one
		let remaining_rows = height - y;
		if remaining_rows < 4 {
			out.truncate(out.len() - row_bytes * (4 - remaining_rows));
		}

		for row in &mut current_rows {
			if row.len() != row_bytes {
				return Err(DecodeError::corrupt_size(format!(
					"block row is {} bytes, expected {row_bytes}",
					row.len()
				)));
			}
			out.append(row);
		}
		y += 4;
	}

	Ok(out)
}

/// Decompresses bitmap data (column-major byte RLE) and transposes it to
/// row-major order.
pub fn decompress_bitmap_data(
	data: &[u8],
	row_bytes: usize,
	height: usize,
) -> Result<Vec<u8>, DecodeError> {
	let total = row_bytes * height;
	let mut r = ByteReader::new(data);
	let mut out: Vec<u8> = Vec::with_capacity(total);
	while !r.is_eof() && out.len() < total {
		let cmd = r.get_u8()?;
		if cmd == 0 {
			// 00 XYYY <data>: repeat an (X + 1)-byte unit Y times
			let args = r.get_u16_be()? as usize;
			let unit_len = ((args >> 12) & 0xF) + 1;
			let count = args & 0x0FFF;
			let unit = r.get_bytes(unit_len)?.to_vec();
			for _ in 0..count {
				out.extend_from_slice(&unit);
			}
		} else if cmd & 0x80 != 0 {
			// 80-FF VV: V repeated (two's complement of cmd) times
			let v = r.get_u8()?;
			let count = (cmd as u8).wrapping_neg() as usize;
			out.extend(std::iter::repeat_n(v, count));
		} else {
			// 01-7F <data>: raw bytes
			out.extend_from_slice(r.get_bytes(cmd as usize)?);
		}
	}
	if out.len() != total {
		return Err(DecodeError::corrupt_size(format!(
			"bitmap decompression produced {} of {total} bytes",
			out.len()
		)));
	}

	// The original decompresses per-column; transpose back to rows
	let mut transposed = Vec::with_capacity(total);
	for dest_y in 0..height {
		for dest_x in 0..row_bytes {
			transposed.push(out[dest_x * height + dest_y]);
		}
	}
	Ok(transposed)
}

/// Decodes a `PPic` resource into its images.
///
/// Pixel-map blocks prefer their embedded color table (which must
/// immediately follow the header); a table offset of 0xFFFFFFFF means
/// "use the caller's clut".
pub fn decode_ppic(data: &[u8], clut: &ColorTable) -> Result<Vec<Image>, DecodeError> {
	let mut r = ByteReader::new(data);
	let count = r.get_u16_be()? as usize;
	let mut images = Vec::with_capacity(count);

	while images.len() < count {
		let block_start = r.position();
		let block_len = r.get_u32_be()? as usize;
		let block_end = block_start + block_len;
		r.skip(4)?; // data handle, reserved in file

		let flags = r.peek_bytes(2)?;
		if flags[0] & 0x80 != 0 {
			// Color block: pixel map
			let header = PixelMapHeader::parse(&mut r)?;

			let embedded;
			let effective_clut = match header.color_table_offset {
				0xFFFF_FFFF => {
					if clut.is_empty() {
						return Err(DecodeError::MissingResource {
							type_tag: crate::fourcc::fourcc(*b"clut"),
							id: 0,
						});
					}
					clut
				}
				0 => {
					embedded = ColorTable::parse(&mut r)?;
					&embedded
				}
				other => {
					return Err(DecodeError::corrupt_size(format!(
						"embedded color table at unexpected offset {other:#X}"
					)));
				}
			};

			let row_bytes = header.row_bytes();
			let height = header.bounds.height().max(0) as usize;
			let compressed = r.get_bytes(block_end.saturating_sub(r.position()))?;
			let raster = decompress_pixel_map_data(compressed, row_bytes, height)?;
			images.push(decode_pixel_map(&header, &raster, effective_clut)?);
		} else {
			// Monochrome block: bit map
			let header = BitMapHeader::parse(&mut r)?;
			let row_bytes = header.row_bytes();
			let height = header.bounds.height().max(0) as usize;
			let compressed = r.get_bytes(block_end.saturating_sub(r.position()))?;
			let raster = decompress_bitmap_data(compressed, row_bytes, height)?;
			images.push(decode_monochrome(
				&raster,
				header.bounds.width().max(0) as usize,
				height,
				row_bytes,
			)?);
		}

		r.seek(block_end)?;
	}
	Ok(images)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_pixel_map_solid_and_repeat() {
		// Row of 4 bytes (2 blocks), 4 rows tall: one solid block of
		// color 5, then a repeat
		let data = [0x00, 0x05, 0x20];
		let out = decompress_pixel_map_data(&data, 4, 4).unwrap();
		assert_eq!(out.len(), 16);
		assert!(out.iter().all(|&b| b == 0x55));
	}

	#[test]
	fn test_pixel_map_two_color_block() {
		// One 2-color block: colors 0xA and 0xB, selector rows 0000,
		// 1111, 0101, 1010
		let data = [0x40, 0xAB, 0b0000_1111, 0b0101_1010];
		let out = decompress_pixel_map_data(&data, 2, 4).unwrap();
		assert_eq!(&out[0..2], &[0xAA, 0xAA]);
		assert_eq!(&out[2..4], &[0xBB, 0xBB]);
		assert_eq!(&out[4..6], &[0xAB, 0xAB]);
		assert_eq!(&out[6..8], &[0xBA, 0xBA]);
	}

	#[test]
	fn test_pixel_map_nop_opcode_is_error() {
		assert!(matches!(
			decompress_pixel_map_data(&[0x80], 2, 4),
			Err(DecodeError::BadOpcode { .. })
		));
	}

	#[test]
	fn test_pixel_map_short_final_band() {
		// Height 6: two bands, the second truncated by two rows
		let data = [0x00, 0x05, 0x00, 0x03];
		let out = decompress_pixel_map_data(&data, 2, 6).unwrap();
		assert_eq!(out.len(), 12);
		assert_eq!(out[11], 0x33);
	}

	#[test]
	fn test_bitmap_rle_and_transpose() {
		// 2 columns x 2 rows: column-major bytes 1, 2, 3, 4
		let data = [0x04, 1, 2, 3, 4];
		let out = decompress_bitmap_data(&data, 2, 2).unwrap();
		assert_eq!(out, vec![1, 3, 2, 4]);
	}

	#[test]
	fn test_bitmap_repeat_unit() {
		// 00 2004: repeat the 3-byte unit 4 times = 12 bytes
		let data = [0x00, 0x20, 0x04, 0xAA, 0xBB, 0xCC];
		let out = decompress_bitmap_data(&data, 3, 4).unwrap();
		assert_eq!(out.len(), 12);
		// Column-major [AA BB CC AA BB CC ...] transposed to 3x4
		assert_eq!(out[0], 0xAA);
	}
}
