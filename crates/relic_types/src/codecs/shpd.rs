//! The SHPD data-fork LZSS used by Lemmings and Prince of Persia.
//!
//! Same control-bit discipline as the Presage scheme (set bit means
//! backreference), but the stream has no size header and the
//! backreference offset is measured in bytes back from the current output
//! end: `(word & 0xFFF) + 1` back, `((word >> 12) & 0xF) + 3` copied.

use crate::error::DecodeError;
use crate::io::ByteReader;

/// Decompresses a SHPD segment; stops when the reader is exhausted.
pub fn decompress_shpd(r: &mut ByteReader<'_>) -> Result<Vec<u8>, DecodeError> {
	let mut out: Vec<u8> = Vec::new();
	while !r.is_eof() {
		let mut control_bits = r.get_u8()?;
		for _ in 0..8 {
			if r.is_eof() {
				break;
			}
			let is_backreference = control_bits & 1 != 0;
			control_bits >>= 1;
			if is_backreference {
				let params = r.get_u16_be()? as usize;
				let distance = (params & 0x0FFF) + 1;
				let count = ((params >> 12) & 0x0F) + 3;
				if distance > out.len() {
					return Err(DecodeError::out_of_bounds(format!(
						"backreference distance {distance} exceeds {} bytes of output",
						out.len()
					)));
				}
				for _ in 0..count {
					let v = out[out.len() - distance];
					out.push(v);
				}
			} else {
				out.push(r.get_u8()?);
			}
		}
	}
	Ok(out)
}
