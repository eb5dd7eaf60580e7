//! Step On It! `sssf` sprite sets.
//!
//! The resource is an offset directory of images. Each image carries two
//! interleaved streams: the structure stream alternates
//! `(transparent_count, data_count)` byte pairs, and a separate data
//! stream (at `data_stream_offset`) supplies the pixel bytes. Index 0 is
//! transparent.

use crate::error::DecodeError;
use crate::image::{Image, Rgba};
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::sprites::{clut_color, require_clut};

fn decode_sssf_image(r: &ByteReader<'_>, clut: &ColorTable) -> Result<Image, DecodeError> {
	let mut structure_r = r.clone();
	let width = structure_r.get_u16_be()? as usize;
	let height = structure_r.get_u16_be()? as usize;
	structure_r.skip(4)?; // ignored by both the 68K and PPC decoders
	let data_stream_offset = structure_r.get_u32_be()? as usize;
	let mut data_r = r.sub_from(data_stream_offset)?;

	let target_size = width * height;
	let mut decoded = Vec::with_capacity(target_size);
	while decoded.len() < target_size {
		let num_zeroes = structure_r.get_u8()? as usize;
		if decoded.len() + num_zeroes > target_size {
			return Err(DecodeError::corrupt_size(
				"transparent run exceeds the image".to_string(),
			));
		}
		decoded.extend(std::iter::repeat_n(0u8, num_zeroes));
		if decoded.len() >= target_size {
			break;
		}
		let num_data_bytes = structure_r.get_u8()? as usize;
		if decoded.len() + num_data_bytes > target_size {
			return Err(DecodeError::corrupt_size("data run exceeds the image".to_string()));
		}
		for _ in 0..num_data_bytes {
			decoded.push(data_r.get_u8()?);
		}
	}

	let mut img = Image::new_with_alpha(width, height)?;
	for y in 0..height {
		for x in 0..width {
			let v = decoded[y * width + x];
			let px = if v == 0 {
				Rgba::TRANSPARENT
			} else {
				Rgba::opaque(clut_color(clut, v)?)
			};
			img.write(x, y, px)?;
		}
	}
	Ok(img)
}

/// Decodes an `sssf` resource into its images.
///
/// Image boundaries come from sorting the directory offsets; each
/// image's window runs to the next offset (or the end of the resource).
pub fn decode_sssf(data: &[u8], clut: &ColorTable) -> Result<Vec<Image>, DecodeError> {
	require_clut(clut)?;
	let mut r = ByteReader::new(data);
	let num_images = r.get_u32_be()? as usize;
	r.skip(8)?; // unknown

	let mut offsets = Vec::with_capacity(num_images);
	for slot in 0..num_images {
		offsets.push((r.get_u32_be()? as usize, slot));
	}

	// Windows are delimited by the sorted offsets
	let mut sorted = offsets.clone();
	sorted.sort_unstable();
	let mut images: Vec<Option<Image>> = (0..num_images).map(|_| None).collect();
	for (index, &(offset, slot)) in sorted.iter().enumerate() {
		let end = sorted.get(index + 1).map_or(data.len(), |&(next, _)| next);
		if end < offset {
			return Err(DecodeError::corrupt_size("overlapping image windows".to_string()));
		}
		let window = r.sub(offset, end - offset)?;
		images[slot] = Some(decode_sssf_image(&window, clut)?);
	}
	images
		.into_iter()
		.map(|img| {
			img.ok_or_else(|| DecodeError::corrupt_size("image slot left undecoded".to_string()))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::quickdraw::color::Color8;

	fn test_clut() -> ColorTable {
		ColorTable::from_colors([Color8::new(0, 0, 0), Color8::new(0, 0, 0xFF)])
	}

	fn sssf_image(width: u16, height: u16, structure: &[u8], pixels: &[u8]) -> Vec<u8> {
		let mut v = Vec::new();
		v.extend_from_slice(&width.to_be_bytes());
		v.extend_from_slice(&height.to_be_bytes());
		v.extend_from_slice(&[0; 4]);
		let data_offset = 12 + structure.len();
		v.extend_from_slice(&(data_offset as u32).to_be_bytes());
		v.extend_from_slice(structure);
		v.extend_from_slice(pixels);
		v
	}

	#[test]
	fn test_single_image() {
		// 4x1: 1 transparent, 2 data, 1 transparent
		let image = sssf_image(4, 1, &[1, 2, 1], &[1, 1]);
		let mut data = Vec::new();
		data.extend_from_slice(&1u32.to_be_bytes());
		data.extend_from_slice(&[0; 8]);
		data.extend_from_slice(&16u32.to_be_bytes());
		data.extend_from_slice(&image);

		let images = decode_sssf(&data, &test_clut()).unwrap();
		assert_eq!(images.len(), 1);
		let img = &images[0];
		assert_eq!(img.read(0, 0).unwrap().a, 0);
		assert_eq!(img.read(1, 0).unwrap(), Rgba::opaque(Color8::new(0, 0, 0xFF)));
		assert_eq!(img.read(3, 0).unwrap().a, 0);
	}

	#[test]
	fn test_overlong_run_is_error() {
		let image = sssf_image(2, 1, &[9], &[]);
		let mut data = Vec::new();
		data.extend_from_slice(&1u32.to_be_bytes());
		data.extend_from_slice(&[0; 8]);
		data.extend_from_slice(&16u32.to_be_bytes());
		data.extend_from_slice(&image);
		assert!(matches!(
			decode_sssf(&data, &test_clut()),
			Err(DecodeError::CorruptSize(_))
		));
	}
}
