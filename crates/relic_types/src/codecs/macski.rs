//! The RUN4 / COOK / CO2K compression family.
//!
//! All three schemes begin with a four-byte magic and a big-endian
//! decompressed size, followed by a small table of reserved command
//! bytes. Any other byte in the stream is a literal. Shipping files are
//! sometimes compressed more than once; [`decompress_multi`] keeps
//! applying passes until the magic no longer matches.

use crate::error::DecodeError;
use crate::fourcc::fourcc;
use crate::io::ByteReader;

/// `'RUN4'`
pub const MAGIC_RUN4: u32 = fourcc(*b"RUN4");
/// `'COOK'`
pub const MAGIC_COOK: u32 = fourcc(*b"COOK");
/// `'CO2K'`
pub const MAGIC_CO2K: u32 = fourcc(*b"CO2K");

/// Decompresses a RUN4 stream.
///
/// Header: magic, decompressed size (u32 BE), then four command bytes
/// meaning repeat-3, repeat-4, repeat-5, and repeat-variable (count byte
/// follows). Every other byte is emitted as-is.
pub fn decompress_run4(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let magic = r.get_u32_be()?;
	if magic != MAGIC_RUN4 {
		return Err(DecodeError::BadMagic { expected: MAGIC_RUN4, actual: magic });
	}
	let decompressed_size = r.get_u32_be()? as usize;

	let repeat_3 = r.get_u8()?;
	let repeat_4 = r.get_u8()?;
	let repeat_5 = r.get_u8()?;
	let repeat_var = r.get_u8()?;

	// Some shipping files end the stream early; the declared size is an
	// upper bound, not a promise.
	let mut out = Vec::with_capacity(decompressed_size);
	while out.len() < decompressed_size && !r.is_eof() {
		let mut command = r.get_u8()?;
		let count;
		if command == repeat_3 {
			count = 3;
			command = r.get_u8()?;
		} else if command == repeat_4 {
			count = 4;
			command = r.get_u8()?;
		} else if command == repeat_5 {
			count = 5;
			command = r.get_u8()?;
		} else if command == repeat_var {
			count = r.get_u8()? as usize;
			command = r.get_u8()?;
		} else {
			count = 1;
		}
		out.extend(std::iter::repeat_n(command, count));

		if out.len() > decompressed_size {
			return Err(DecodeError::corrupt_size(format!(
				"RUN4 produced {} bytes, declared {decompressed_size}",
				out.len()
			)));
		}
	}
	Ok(out)
}

/// Decompresses a COOK or CO2K stream.
///
/// COOK copies always take a one-byte backward offset. CO2K adds a
/// version byte; version 2 reserves three more "far" commands whose
/// offsets are two bytes (high byte first). An offset of zero after a
/// copy command re-interprets the command byte as a literal.
pub fn decompress_cook_co2k(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let magic = r.get_u32_be()?;
	if magic != MAGIC_COOK && magic != MAGIC_CO2K {
		return Err(DecodeError::BadMagic { expected: MAGIC_COOK, actual: magic });
	}
	let mut is_co2k_v2 = magic == MAGIC_CO2K;

	let decompressed_size = r.get_u32_be()? as usize;

	let mut copy_far = 0u8;
	let mut copy_5_far = 0u8;
	let mut copy_4_far = 0u8;

	if magic == MAGIC_CO2K {
		let version = r.get_u8()?;
		if version == 0 {
			return Err(DecodeError::unsupported("CO2K version 0 is not valid"));
		}
		if version > 2 {
			return Err(DecodeError::unsupported(format!("CO2K version {version} not supported")));
		}
		if version == 1 {
			is_co2k_v2 = false;
		} else {
			copy_far = r.get_u8()?;
			copy_5_far = r.get_u8()?;
			copy_4_far = r.get_u8()?;
		}
	}

	let copy_3 = r.get_u8()?;
	let copy_4 = r.get_u8()?;
	let copy_5 = r.get_u8()?;
	let copy_var = r.get_u8()?;

	if !is_co2k_v2 {
		copy_far = copy_var;
		copy_5_far = copy_var;
		copy_4_far = copy_var;
	}

	let mut out: Vec<u8> = Vec::with_capacity(decompressed_size);
	while out.len() < decompressed_size {
		let command = r.get_u8()?;

		let mut size: usize;
		if command == copy_3 {
			size = 3;
		} else if command == copy_var || command == copy_far {
			size = r.get_u8()? as usize;
		} else if command == copy_4 {
			size = 4;
		} else if command == copy_5 {
			size = 5;
		} else if command == copy_4_far {
			if r.peek_u8()? == 0 {
				r.skip(1)?;
				size = 0;
			} else {
				size = 4;
			}
		} else if command == copy_5_far {
			if r.peek_u8()? == 0 {
				r.skip(1)?;
				size = 0;
			} else {
				size = 5;
			}
		} else {
			size = 0;
		}

		if size == 0 {
			out.push(command);
			continue;
		}

		let mut offset = 0usize;
		if is_co2k_v2 && (command == copy_4_far || command == copy_5_far || command == copy_far) {
			offset = (r.get_u8()? as usize) << 8;
		}
		offset += r.get_u8()? as usize;

		if offset == 0 {
			out.push(command);
			continue;
		}
		if offset > out.len() {
			return Err(DecodeError::out_of_bounds(format!(
				"backreference offset {offset} exceeds {} bytes of output",
				out.len()
			)));
		}
		let mut src = out.len() - offset;
		while size > 0 {
			let v = out[src];
			out.push(v);
			src += 1;
			size -= 1;
		}
	}

	if out.len() > decompressed_size {
		return Err(DecodeError::corrupt_size(format!(
			"COOK/CO2K produced {} bytes, declared {decompressed_size}",
			out.len()
		)));
	}
	Ok(out)
}

fn leading_magic(data: &[u8]) -> Option<u32> {
	if data.len() < 4 {
		return None;
	}
	let magic = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
	matches!(magic, MAGIC_RUN4 | MAGIC_COOK | MAGIC_CO2K).then_some(magic)
}

/// Repeatedly decompresses RUN4/COOK/CO2K passes until the output no
/// longer starts with a known magic. Returns the input unchanged if no
/// pass applies.
pub fn decompress_multi(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut current = data.to_vec();
	let mut passes = 0usize;
	while let Some(magic) = leading_magic(&current) {
		current = if magic == MAGIC_RUN4 {
			decompress_run4(&current)?
		} else {
			decompress_cook_co2k(&current)?
		};
		passes += 1;
	}
	if passes > 1 {
		log::debug!("multi-pass decompression applied {passes} passes");
	}
	Ok(current)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run4(body: &[u8], size: u32) -> Vec<u8> {
		let mut v = b"RUN4".to_vec();
		v.extend_from_slice(&size.to_be_bytes());
		// Command bytes C3, C4, C5, CV
		v.extend_from_slice(&[0xC3, 0xC4, 0xC5, 0xCF]);
		v.extend_from_slice(body);
		v
	}

	#[test]
	fn test_run4_repeat_and_literal() {
		// C3 'A' => AAA; then literal 'B'
		assert_eq!(decompress_run4(&run4(&[0xC3, 0x41, 0x42], 4)).unwrap(), b"AAAB");
	}

	#[test]
	fn test_run4_variable_repeat() {
		assert_eq!(decompress_run4(&run4(&[0xCF, 0x06, 0x58], 6)).unwrap(), b"XXXXXX");
	}

	#[test]
	fn test_run4_short_stream() {
		// Declared size 6 but the stream ends after one repeat command
		let data = [
			b'R', b'U', b'N', b'4', 0x00, 0x00, 0x00, 0x06, 0xC3, 0xC4, 0xC5, 0xCF, 0xC3, 0x41,
		];
		assert_eq!(decompress_run4(&data).unwrap(), b"AAA");
	}

	#[test]
	fn test_run4_overshoot_is_error() {
		assert!(matches!(
			decompress_run4(&run4(&[0xC5, 0x41], 4)),
			Err(DecodeError::CorruptSize(_))
		));
	}

	#[test]
	fn test_run4_bad_magic() {
		assert!(matches!(
			decompress_run4(b"NOPE\x00\x00\x00\x00"),
			Err(DecodeError::BadMagic { .. })
		));
	}

	fn cook(body: &[u8], size: u32) -> Vec<u8> {
		let mut v = b"COOK".to_vec();
		v.extend_from_slice(&size.to_be_bytes());
		// Command bytes: copy-3, copy-4, copy-5, copy-var
		v.extend_from_slice(&[0xF3, 0xF4, 0xF5, 0xFF]);
		v.extend_from_slice(body);
		v
	}

	#[test]
	fn test_cook_copy() {
		// Literals 'A' 'B' 'C', then copy 3 from offset 3 => ABCABC
		let out = decompress_cook_co2k(&cook(&[0x41, 0x42, 0x43, 0xF3, 0x03], 6)).unwrap();
		assert_eq!(out, b"ABCABC");
	}

	#[test]
	fn test_cook_zero_offset_literal() {
		// copy-3 command with offset 0 emits the command byte itself
		let out = decompress_cook_co2k(&cook(&[0xF3, 0x00], 1)).unwrap();
		assert_eq!(out, &[0xF3]);
	}

	#[test]
	fn test_cook_backreference_out_of_range() {
		assert!(matches!(
			decompress_cook_co2k(&cook(&[0x41, 0xF3, 0x05], 4)),
			Err(DecodeError::OutOfBounds(_))
		));
	}

	#[test]
	fn test_multi_identity() {
		let data = b"plain data".to_vec();
		assert_eq!(decompress_multi(&data).unwrap(), data);
	}

	#[test]
	fn test_multi_single_pass() {
		let packed = run4(&[0xC4, 0x5A], 4);
		assert_eq!(decompress_multi(&packed).unwrap(), b"ZZZZ");
	}
}
