//! Pathways Into Darkness run-length scheme.
//!
//! A u32 big-endian decompressed size, then commands: `cmd >= 0x80`
//! copies `cmd - 0x7F` literal bytes, `cmd < 0x80` repeats the next byte
//! `cmd + 3` times.

use crate::error::DecodeError;
use crate::io::ByteReader;

/// Decompresses a Pathways stream.
pub fn unpack_pathways(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let decompressed_size = r.get_u32_be()? as usize;

	let mut out = Vec::with_capacity(decompressed_size);
	while out.len() < decompressed_size {
		let cmd = r.get_u8()?;
		if cmd >= 0x80 {
			out.extend_from_slice(r.get_bytes(cmd as usize - 0x7F)?);
		} else {
			let v = r.get_u8()?;
			out.extend(std::iter::repeat_n(v, cmd as usize + 3));
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_run_and_literal() {
		// 0x00 'Q' => QQQ; 0x81 => 2 literal bytes
		let data = [0x00, 0x00, 0x00, 0x05, 0x00, 0x51, 0x81, 0x41, 0x42];
		assert_eq!(unpack_pathways(&data).unwrap(), b"QQQAB");
	}

	#[test]
	fn test_truncated() {
		let data = [0x00, 0x00, 0x00, 0x08, 0x00, 0x51];
		assert!(matches!(unpack_pathways(&data), Err(DecodeError::UnexpectedEof { .. })));
	}
}
