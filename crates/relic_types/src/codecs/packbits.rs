//! PackBits, the classic Mac OS run-length scheme, plus the icns variant.
//!
//! Commands (signed byte `c`):
//! - `c == -128`: no-op (QuickDraw 1.0 compatibility)
//! - `c < 0`: one value byte follows, repeated `1 - c` times
//! - `c >= 0`: `c + 1` literal bytes follow

use crate::error::DecodeError;
use crate::io::ByteReader;

/// Decompresses a whole PackBits stream.
pub fn unpack_bits(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let mut out = Vec::with_capacity(data.len() * 2);
	while !r.is_eof() {
		let cmd = r.get_i8()?;
		if cmd == -128 {
			continue;
		}
		if cmd < 0 {
			let v = r.get_u8()?;
			let count = 1 - cmd as isize;
			out.extend(std::iter::repeat_n(v, count as usize));
		} else {
			let count = cmd as usize + 1;
			out.extend_from_slice(r.get_bytes(count)?);
		}
	}
	Ok(out)
}

/// Decompresses PackBits until exactly `target_len` bytes are produced.
///
/// Stops at the earliest whole-command boundary that reaches the target;
/// a repeat run is clipped if it would overshoot, matching QuickDraw's
/// bounded row decoder. The reader is left positioned after the last
/// command consumed.
pub fn unpack_bits_bounded(
	r: &mut ByteReader<'_>,
	target_len: usize,
) -> Result<Vec<u8>, DecodeError> {
	let mut out = Vec::with_capacity(target_len);
	while out.len() < target_len {
		let cmd = r.get_i8()?;
		if cmd == -128 {
			continue;
		}
		if cmd < 0 {
			let v = r.get_u8()?;
			let count = (1 - cmd as isize) as usize;
			let count = count.min(target_len - out.len());
			out.extend(std::iter::repeat_n(v, count));
		} else {
			let count = (cmd as usize + 1).min(target_len - out.len());
			out.extend_from_slice(r.get_bytes(count)?);
		}
	}
	Ok(out)
}

/// Compresses with PackBits. `unpack_bits(&pack_bits(data))? == data`.
#[must_use]
pub fn pack_bits(data: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(data.len() + data.len() / 128 + 1);
	let mut pos = 0;
	while pos < data.len() {
		if pos + 1 == data.len() {
			// Lone final byte
			out.push(0x00);
			out.push(data[pos]);
			break;
		}

		if data[pos + 1] == data[pos] {
			// Run of the same byte, at most 128 long
			let mut end = pos + 2;
			while end < data.len() && end - pos < 128 && data[end] == data[pos] {
				end += 1;
			}
			out.push((1i8.wrapping_sub((end - pos) as i8)) as u8);
			out.push(data[pos]);
			pos = end;
		} else {
			// Run of differing bytes, at most 128 long
			let mut end = pos + 1;
			while end + 1 < data.len() && end - pos < 128 && data[end + 1] != data[end] {
				end += 1;
			}
			if end + 1 == data.len() && end - pos < 128 {
				end += 1;
			}
			out.push((end - pos - 1) as u8);
			out.extend_from_slice(&data[pos..end]);
			pos = end;
		}
	}
	out
}

/// Decompresses the icns RLE variant.
///
/// `c < 0x80` copies `c + 1` literal bytes; `c >= 0x80` repeats the next
/// byte `c - 0x80 + 3` times.
pub fn unpack_icns_rle(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let mut out = Vec::with_capacity(data.len() * 2);
	while !r.is_eof() {
		let cmd = r.get_u8()?;
		if cmd < 0x80 {
			out.extend_from_slice(r.get_bytes(cmd as usize + 1)?);
		} else {
			let v = r.get_u8()?;
			out.extend(std::iter::repeat_n(v, cmd as usize - 0x80 + 3));
		}
	}
	Ok(out)
}

/// Compresses one interleaved channel with the icns RLE.
///
/// Reads `data[0]`, `data[stride]`, `data[2 * stride]`, ... so a caller
/// can compress the R, G, and B planes of an interleaved image in three
/// passes. Runs must be at least 3 bytes long to be encoded as repeats.
#[must_use]
pub fn pack_icns_rle_strided(data: &[u8], stride: usize) -> Vec<u8> {
	assert!(stride > 0);
	let values: Vec<u8> = data.iter().step_by(stride).copied().collect();
	let mut out = Vec::new();
	let mut pos = 0;
	while pos < values.len() {
		if pos + 2 < values.len() && values[pos] == values[pos + 1] && values[pos] == values[pos + 2]
		{
			let mut count = 3;
			while count < 130 && pos + count < values.len() && values[pos + count] == values[pos] {
				count += 1;
			}
			out.push((count + 0x80 - 3) as u8);
			out.push(values[pos]);
			pos += count;
		} else {
			let mut count = 1;
			while count < 128
				&& pos + count < values.len()
				&& values[pos + count] != values[pos + count - 1]
			{
				count += 1;
			}
			out.push((count - 1) as u8);
			out.extend_from_slice(&values[pos..pos + count]);
			pos += count;
		}
	}
	out
}
