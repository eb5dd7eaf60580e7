//! DinoPark Tycoon LZSS and RLE.
//!
//! Both schemes share a 16-byte header: magic, compressed size,
//! decompressed size, and a reserved word (always zero in shipping
//! files). [`decompress_data`] routes on the magic and passes anything
//! unrecognized through unchanged.

use crate::error::DecodeError;
use crate::fourcc::fourcc;
use crate::io::ByteReader;

/// `'LZSS'`
pub const MAGIC_LZSS: u32 = fourcc(*b"LZSS");
/// `'RLE '`
pub const MAGIC_RLE: u32 = fourcc(*b"RLE ");

struct Header {
	compressed_size: usize,
	decompressed_size: usize,
}

fn read_header(r: &mut ByteReader<'_>, expected_magic: u32) -> Result<Header, DecodeError> {
	let magic = r.get_u32_be()?;
	if magic != expected_magic {
		return Err(DecodeError::BadMagic { expected: expected_magic, actual: magic });
	}
	let compressed_size = r.get_u32_be()? as usize;
	let decompressed_size = r.get_u32_be()? as usize;
	r.skip(4)?; // Reserved; seems to always be zero
	if r.remaining() < compressed_size {
		return Err(DecodeError::corrupt_size(format!(
			"header declares {compressed_size} compressed bytes, {} present",
			r.remaining()
		)));
	}
	Ok(Header { compressed_size, decompressed_size })
}

/// Decompresses an `'LZSS'` stream.
///
/// Control bytes are consumed LSB-first: a 1-bit emits a literal, a 0-bit
/// reads a little-endian word whose high 10 bits are a back-offset from
/// the current output end and whose low 6 bits plus 3 are the copy
/// length.
pub fn decompress_lzss(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let header = read_header(&mut r, MAGIC_LZSS)?;
	let _ = header.compressed_size;

	let mut out: Vec<u8> = Vec::with_capacity(header.decompressed_size);
	while out.len() < header.decompressed_size {
		let mut control_bits = r.get_u8()?;
		for _ in 0..8 {
			if out.len() >= header.decompressed_size {
				break;
			}
			if control_bits & 1 != 0 {
				out.push(r.get_u8()?);
			} else {
				let args = r.get_u16_le()? as usize;
				let distance = args >> 6;
				let count = (args & 0x3F) + 3;
				if distance > out.len() {
					return Err(DecodeError::out_of_bounds(format!(
						"backreference distance {distance} exceeds {} bytes of output",
						out.len()
					)));
				}
				let mut src = out.len() - distance;
				for _ in 0..count {
					let v = *out.get(src).ok_or_else(|| {
						DecodeError::out_of_bounds("backreference ran past output".to_string())
					})?;
					out.push(v);
					src += 1;
				}
			}
			control_bits >>= 1;
		}
	}

	if out.len() != header.decompressed_size {
		return Err(DecodeError::corrupt_size(format!(
			"LZSS produced {} bytes, declared {}",
			out.len(),
			header.decompressed_size
		)));
	}
	Ok(out)
}

/// Decompresses an `'RLE '` stream.
///
/// `cmd < 0x80` copies `cmd + 1` literal bytes; `cmd >= 0x80` repeats the
/// next byte `0x101 - cmd` times.
pub fn decompress_rle(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	let mut r = ByteReader::new(data);
	let header = read_header(&mut r, MAGIC_RLE)?;

	let mut out = Vec::with_capacity(header.decompressed_size);
	while !r.is_eof() {
		let cmd = r.get_u8()?;
		if cmd & 0x80 != 0 {
			let v = r.get_u8()?;
			out.extend(std::iter::repeat_n(v, 0x101 - cmd as usize));
		} else {
			out.extend_from_slice(r.get_bytes(cmd as usize + 1)?);
		}
	}

	if out.len() != header.decompressed_size {
		return Err(DecodeError::corrupt_size(format!(
			"RLE produced {} bytes, declared {}",
			out.len(),
			header.decompressed_size
		)));
	}
	Ok(out)
}

/// Peeks the magic and routes to LZSS, RLE, or identity.
pub fn decompress_data(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	if data.len() >= 4 {
		match u32::from_be_bytes([data[0], data[1], data[2], data[3]]) {
			MAGIC_LZSS => return decompress_lzss(data),
			MAGIC_RLE => return decompress_rle(data),
			_ => {}
		}
	}
	Ok(data.to_vec())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn with_header(magic: &[u8; 4], body: &[u8], decompressed: u32) -> Vec<u8> {
		let mut v = magic.to_vec();
		v.extend_from_slice(&(body.len() as u32).to_be_bytes());
		v.extend_from_slice(&decompressed.to_be_bytes());
		v.extend_from_slice(&[0; 4]);
		v.extend_from_slice(body);
		v
	}

	#[test]
	fn test_rle_literals_then_run() {
		// 0x01 => 2 literals; 0xFE => 0x101 - 0xFE = 3 repeats
		let data = with_header(b"RLE ", &[0x01, 0x41, 0x42, 0xFE, 0x43], 5);
		assert_eq!(decompress_rle(&data).unwrap(), b"ABCCC");
	}

	#[test]
	fn test_rle_size_mismatch() {
		let data = with_header(b"RLE ", &[0x00, 0x41], 9);
		assert!(matches!(decompress_rle(&data), Err(DecodeError::CorruptSize(_))));
	}

	#[test]
	fn test_lzss_literals_and_copy() {
		// Control 0x07 = three literal bits then a backreference.
		// Word 0x00C0 LE: distance = 0xC0 >> 6 = 3, count = 0 + 3 = 3.
		let data = with_header(b"LZSS", &[0x07, 0x41, 0x42, 0x43, 0xC0, 0x00], 6);
		assert_eq!(decompress_lzss(&data).unwrap(), b"ABCABC");
	}

	#[test]
	fn test_lzss_bad_backreference() {
		let data = with_header(b"LZSS", &[0x01, 0x41, 0xC0, 0x01], 5);
		assert!(matches!(decompress_lzss(&data), Err(DecodeError::OutOfBounds(_))));
	}

	#[test]
	fn test_data_dispatch() {
		let rle = with_header(b"RLE ", &[0x00, 0x58], 1);
		assert_eq!(decompress_data(&rle).unwrap(), b"X");
		assert_eq!(decompress_data(b"raw bytes").unwrap(), b"raw bytes");
	}
}
