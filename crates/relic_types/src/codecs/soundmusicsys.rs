//! SoundMusicSys LZSS.
//!
//! Unlike the other LZSS variants there is no size header; the stream
//! simply ends when the input runs out, including mid-control-byte. The
//! window is a fixed 4096 bytes: a backreference word addresses
//! `out.len() - (4096 - (word & 0xFFF))`.

use crate::error::DecodeError;
use crate::io::ByteReader;

const WINDOW: usize = 1 << 12;

/// Decompresses a SoundMusicSys LZSS stream.
pub fn decompress_lzss(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let mut out: Vec<u8> = Vec::with_capacity(data.len() * 2);

	loop {
		if r.is_eof() {
			return Ok(out);
		}
		let control_bits = r.get_u8()?;

		let mut control_mask = 0x01u8;
		while control_mask != 0 {
			if control_bits & control_mask != 0 {
				if r.is_eof() {
					return Ok(out);
				}
				out.push(r.get_u8()?);
			} else {
				if r.remaining() < 2 {
					return Ok(out);
				}
				let params = r.get_u16_be()? as usize;
				let distance = WINDOW - (params & 0x0FFF);
				let count = ((params >> 12) & 0x0F) + 3;
				if distance > out.len() {
					return Err(DecodeError::out_of_bounds(format!(
						"backreference distance {distance} exceeds {} bytes of output",
						out.len()
					)));
				}
				let mut src = out.len() - distance;
				for _ in 0..count {
					let v = out[src];
					out.push(v);
					src += 1;
				}
			}
			control_mask <<= 1;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_literals_and_window_copy() {
		// Control 0x07: literals A, B, C; then a backreference with
		// params 0x0FFD: distance = 4096 - 0xFFD = 3, count = 3.
		let data = [0x07, 0x41, 0x42, 0x43, 0x0F, 0xFD];
		assert_eq!(decompress_lzss(&data).unwrap(), b"ABCABC");
	}

	#[test]
	fn test_terminates_at_input_end() {
		// One literal, then the stream just stops
		let data = [0x01, 0x41];
		assert_eq!(decompress_lzss(&data).unwrap(), b"A");
	}

	#[test]
	fn test_empty_input() {
		assert_eq!(decompress_lzss(&[]).unwrap(), Vec::<u8>::new());
	}

	#[test]
	fn test_window_underflow() {
		// Backreference before any output exists
		let data = [0x00, 0x0F, 0xFF];
		assert!(matches!(decompress_lzss(&data), Err(DecodeError::OutOfBounds(_))));
	}
}
