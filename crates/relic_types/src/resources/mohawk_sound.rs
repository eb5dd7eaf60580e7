//! The Mohawk sound resource (`tWAV`).
//!
//! The payload is a chunked stream: each chunk is a four-byte tag plus a
//! u32 length. `Cue#` chunks carry cue points (ignored here); the `Data`
//! chunk carries the format header and samples. Raw PCM (8- or 16-bit)
//! and IMA ADPCM encodings are decoded; MPEG-2 audio is reported as
//! unsupported.

use crate::error::DecodeError;
use crate::fourcc::{fourcc, fourcc_display};
use crate::io::ByteReader;
use crate::resources::sound::DecodedSound;

const TAG_DATA: u32 = fourcc(*b"Data");
const TAG_CUE: u32 = fourcc(*b"Cue#");

const ENCODING_PCM: u16 = 0;
const ENCODING_ADPCM: u16 = 1;
const ENCODING_MPEG2: u16 = 2;

/// Decodes a Mohawk sound resource to WAV bytes.
pub fn decode_mohawk_snd(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
	decode_mohawk_snd_to_pcm(data)?.to_wav()
}

/// Decodes a Mohawk sound resource to PCM.
pub fn decode_mohawk_snd_to_pcm(data: &[u8]) -> Result<DecodedSound, DecodeError> {
	let mut r = ByteReader::new(data);
	while !r.is_eof() {
		let tag = r.get_u32_be()?;
		let size = r.get_u32_be()? as usize;
		match tag {
			TAG_DATA => {
				let mut chunk = ByteReader::new(r.get_bytes(size)?);
				return decode_data_chunk(&mut chunk);
			}
			TAG_CUE => {
				r.skip(size)?;
			}
			other => {
				return Err(DecodeError::BadMagic { expected: TAG_DATA, actual: other });
			}
		}
	}
	Err(DecodeError::unsupported("sound resource has no Data chunk".to_string()))
}

fn decode_data_chunk(r: &mut ByteReader<'_>) -> Result<DecodedSound, DecodeError> {
	let sample_rate = u32::from(r.get_u16_be()?);
	let sample_count = r.get_u32_be()? as usize;
	let bits_per_sample = r.get_u8()?;
	let channels = u16::from(r.get_u8()?);
	let encoding = r.get_u16_be()?;
	let _loop_count = r.get_u16_be()?;
	let _loop_start = r.get_u32_be()?;
	let _loop_end = r.get_u32_be()?;
	if channels == 0 || channels > 2 {
		return Err(DecodeError::corrupt_size(format!("channel count {channels}")));
	}

	let total_samples = sample_count * channels as usize;
	let samples = match encoding {
		ENCODING_PCM => match bits_per_sample {
			8 => {
				let body = r.get_bytes(total_samples)?;
				body.iter().map(|&s| (i16::from(s) - 0x80) << 8).collect()
			}
			16 => {
				let mut out = Vec::with_capacity(total_samples);
				for _ in 0..total_samples {
					out.push(r.get_i16_be()?);
				}
				out
			}
			other => {
				return Err(DecodeError::unsupported(format!("{other}-bit PCM")));
			}
		},
		ENCODING_ADPCM => decode_ima_stream(r.get_bytes(r.remaining())?, total_samples),
		ENCODING_MPEG2 => {
			return Err(DecodeError::unsupported("MPEG-2 audio data".to_string()));
		}
		other => {
			return Err(DecodeError::unsupported(format!(
				"sound encoding {}",
				fourcc_display(u32::from(other))
			)));
		}
	};

	Ok(DecodedSound { samples, channels, sample_rate })
}

/// Decodes a bare IMA ADPCM nibble stream (no per-packet headers; state
/// starts at zero, low nibble first).
fn decode_ima_stream(data: &[u8], max_samples: usize) -> Vec<i16> {
	const INDEX_TABLE: [i16; 16] = [-1, -1, -1, -1, 2, 4, 6, 8, -1, -1, -1, -1, 2, 4, 6, 8];

	let mut predictor = 0i32;
	let mut step_index = 0i32;
	let mut out = Vec::with_capacity(max_samples);
	'outer: for &byte in data {
		let mut value = byte;
		for _ in 0..2 {
			if out.len() >= max_samples {
				break 'outer;
			}
			let nybble = value & 0x0F;
			value >>= 4;

			let step = i32::from(super::sound::ima_step(step_index));
			let mut diff = step >> 3;
			if nybble & 4 != 0 {
				diff += step;
			}
			if nybble & 2 != 0 {
				diff += step >> 1;
			}
			if nybble & 1 != 0 {
				diff += step >> 2;
			}
			if nybble & 8 != 0 {
				diff = -diff;
			}

			predictor = (predictor + diff).clamp(-0x8000, 0x7FFF);
			out.push(predictor as i16);
			step_index = (step_index + i32::from(INDEX_TABLE[nybble as usize])).clamp(0, 88);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn data_chunk(samples: &[u8], rate: u16, bits: u8, channels: u8, encoding: u16) -> Vec<u8> {
		let mut body = Vec::new();
		body.extend_from_slice(&rate.to_be_bytes());
		let per_sample = if bits == 16 { 2 } else { 1 };
		let count = samples.len() / per_sample / channels as usize;
		body.extend_from_slice(&(count as u32).to_be_bytes());
		body.push(bits);
		body.push(channels);
		body.extend_from_slice(&encoding.to_be_bytes());
		body.extend_from_slice(&[0; 10]); // loop fields
		body.extend_from_slice(samples);

		let mut v = Vec::new();
		v.extend_from_slice(&TAG_DATA.to_be_bytes());
		v.extend_from_slice(&(body.len() as u32).to_be_bytes());
		v.extend_from_slice(&body);
		v
	}

	#[test]
	fn test_pcm8_chunk() {
		let wav = decode_mohawk_snd(&data_chunk(&[0x80, 0xC0], 22050, 8, 1, ENCODING_PCM))
			.unwrap();
		assert_eq!(&wav[0..4], b"RIFF");
	}

	#[test]
	fn test_cue_chunk_skipped() {
		let mut data = Vec::new();
		data.extend_from_slice(&TAG_CUE.to_be_bytes());
		data.extend_from_slice(&2u32.to_be_bytes());
		data.extend_from_slice(&[0, 0]);
		data.extend(data_chunk(&[0x80], 11025, 8, 1, ENCODING_PCM));
		assert!(decode_mohawk_snd(&data).is_ok());
	}

	#[test]
	fn test_mpeg_unsupported() {
		assert!(matches!(
			decode_mohawk_snd(&data_chunk(&[], 44100, 16, 2, ENCODING_MPEG2)),
			Err(DecodeError::Unsupported(_))
		));
	}

	#[test]
	fn test_unknown_chunk_tag() {
		let mut data = Vec::new();
		data.extend_from_slice(b"Junk");
		data.extend_from_slice(&0u32.to_be_bytes());
		assert!(matches!(decode_mohawk_snd(&data), Err(DecodeError::BadMagic { .. })));
	}
}
