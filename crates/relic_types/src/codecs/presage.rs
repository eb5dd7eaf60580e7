//! Presage engine LZSS (Flashback, Prince of Persia, Mario Teaches Typing).
//!
//! A control byte is consumed LSB-first; a set bit reads a big-endian
//! word whose low 12 bits plus 1 are a back-offset and whose high 4 bits
//! plus 3 are the copy count, a clear bit emits one literal. The
//! decompressed size is either the leading u32 of the stream or supplied
//! by the caller when the stream is embedded without one.

use crate::error::DecodeError;
use crate::io::ByteReader;

/// Decompresses from `r`, reading the size prefix when `max_output_bytes`
/// is `None`.
pub fn decompress_lzss_reader(
	r: &mut ByteReader<'_>,
	max_output_bytes: Option<usize>,
) -> Result<Vec<u8>, DecodeError> {
	let decompressed_size = match max_output_bytes {
		Some(n) => n,
		None => r.get_u32_be()? as usize,
	};

	let mut out: Vec<u8> = Vec::with_capacity(decompressed_size);
	while out.len() < decompressed_size {
		let mut control_bits = r.get_u8()?;
		for _ in 0..8 {
			if out.len() >= decompressed_size {
				break;
			}
			let is_backreference = control_bits & 1 != 0;
			control_bits >>= 1;
			if is_backreference {
				let args = r.get_u16_be()? as usize;
				let distance = (args & 0x0FFF) + 1;
				let count = ((args >> 12) & 0x000F) + 3;
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
			} else {
				out.push(r.get_u8()?);
			}
		}
	}
	Ok(out)
}

/// Decompresses a standalone buffer; see [`decompress_lzss_reader`].
pub fn decompress_lzss(
	data: &[u8],
	max_output_bytes: Option<usize>,
) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	decompress_lzss_reader(&mut r, max_output_bytes)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_literals_then_backreference() {
		// Three literals (clear bits), then a set bit reading 0x0002:
		// distance 2 + 1 = 3, count 0 + 3 = 3.
		let data = [0x00, 0x00, 0x00, 0x06, 0x08, 0x41, 0x42, 0x43, 0x00, 0x02];
		assert_eq!(decompress_lzss(&data, None).unwrap(), b"ABCABC");
	}

	#[test]
	fn test_caller_supplied_size() {
		let data = [0x08, 0x41, 0x42, 0x43, 0x00, 0x02];
		assert_eq!(decompress_lzss(&data, Some(6)).unwrap(), b"ABCABC");
	}

	#[test]
	fn test_single_byte_period_run() {
		// Literal 'A', then distance 1 copies extend the last byte
		let data = [0x02, 0x41, 0x10, 0x00];
		assert_eq!(decompress_lzss(&data, Some(5)).unwrap(), b"AAAAA");
	}

	#[test]
	fn test_backreference_out_of_range() {
		let data = [0x00, 0x00, 0x00, 0x05, 0x02, 0x41, 0x0F, 0xFF];
		assert!(matches!(decompress_lzss(&data, None), Err(DecodeError::OutOfBounds(_))));
	}
}
