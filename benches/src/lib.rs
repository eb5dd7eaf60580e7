//! Benchmark helper utilities for relic-rs
//!
//! Generates synthetic compressed payloads so the benchmarks run
//! without shipping game data in the repository. The generators aim for
//! a realistic opcode mix rather than best- or worst-case streams.

/// Generates PackBits data whose decoded form mixes runs and literals.
#[must_use]
pub fn generate_packbits_data(decoded_len: usize) -> Vec<u8> {
	let mut decoded = Vec::with_capacity(decoded_len);
	let mut value = 0u8;
	while decoded.len() < decoded_len {
		// Alternate short literal stretches with medium runs
		for _ in 0..7.min(decoded_len - decoded.len()) {
			decoded.push(value);
			value = value.wrapping_mul(31).wrapping_add(17);
		}
		let run = 20.min(decoded_len - decoded.len());
		decoded.extend(std::iter::repeat_n(value, run));
	}
	relic_types::codecs::packbits::pack_bits(&decoded)
}

/// Generates a synthetic 4-bit DC2 sprite of the given dimensions.
///
/// The stream is built from color-run opcodes over a 14-entry palette,
/// which is where real sprites spend most of their decode time.
#[must_use]
pub fn generate_dc2_data(width: i16, height: i16) -> Vec<u8> {
	let bits_per_pixel = 4u32;
	let mut bits: Vec<bool> = Vec::new();
	let put = |bits: &mut Vec<bool>, value: u32, count: u32| {
		for i in (0..count).rev() {
			bits.push(value & (1 << i) != 0);
		}
	};

	// Palette: 2^4 - 2 = 14 RGB555 entries
	for i in 0..14u32 {
		put(&mut bits, (i * 0x0842) & 0x7FFF, 16);
	}

	// The decoder's count-field width for this image width
	let mut chunk_count_bits = 7u32;
	let mut max_chunk_count = 0x80u32;
	while chunk_count_bits > 3 && max_chunk_count >= width as u32 {
		chunk_count_bits -= 1;
		max_chunk_count >>= 1;
	}

	let total = width as usize * height as usize;
	let mut written = 0usize;
	let mut color = 1u32;
	while written < total {
		let remaining = total - written;
		let count = remaining.min(1 << chunk_count_bits) - 1;
		put(&mut bits, 1, 3); // color-run opcode
		put(&mut bits, count as u32, chunk_count_bits);
		put(&mut bits, color, bits_per_pixel);
		written += count + 1;
		color = 1 + color % 13;
	}

	let mut data = Vec::new();
	data.extend_from_slice(&height.to_be_bytes());
	data.extend_from_slice(&width.to_be_bytes());
	data.push(bits_per_pixel as u8);
	data.extend_from_slice(&[0, 0]);
	data.push(0);
	for chunk in bits.chunks(8) {
		let mut byte = 0u8;
		for (i, &bit) in chunk.iter().enumerate() {
			if bit {
				byte |= 0x80 >> i;
			}
		}
		data.push(byte);
	}
	data
}

/// Common benchmark sizes.
pub mod sizes {
	/// Small payload: 4 KiB decoded
	pub const SMALL: usize = 4 << 10;
	/// Medium payload: 64 KiB decoded
	pub const MEDIUM: usize = 64 << 10;
	/// Large payload: 1 MiB decoded
	pub const LARGE: usize = 1 << 20;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_packbits_generator_roundtrips() {
		let packed = generate_packbits_data(1000);
		let decoded = relic_types::codecs::packbits::unpack_bits(&packed).unwrap();
		assert_eq!(decoded.len(), 1000);
	}

	#[test]
	fn test_dc2_generator_decodes() {
		let data = generate_dc2_data(64, 32);
		let img = relic_types::sprites::dark_castle::decode_dc2(&data).unwrap();
		assert_eq!(img.width(), 64);
		assert_eq!(img.height(), 32);
	}
}
