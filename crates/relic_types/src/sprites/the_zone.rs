//! The Zone `Spri` sprites.
//!
//! A `Spri` is remarkable: after a small header and the indexed pixel
//! data, the rest of the resource is 68K machine code, the game's own
//! blitter for that sprite. Rendering means running that code against
//! color and alpha buffers. Executing 68K code is outside this crate, so
//! the decoder validates and splits the resource and delegates the run
//! to a [`SpriteBlitter`]; without one it reports unsupported.

use crate::error::DecodeError;
use crate::image::{Image, Rgba};
use crate::io::ByteReader;
use crate::quickdraw::color::ColorTable;
use crate::sprites::{clut_color, require_clut};

/// A parsed, not-yet-rendered `Spri`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriResource {
	/// Edge length; sprites are square
	pub side: usize,
	/// Indexed color data, `side * side` bytes
	pub data: Vec<u8>,
	/// The sprite's embedded 68K blitter code
	pub code: Vec<u8>,
}

/// Executes a sprite's embedded blitter (externally, via a 68K
/// emulator).
///
/// The blitter is called twice by the original game: once over the
/// color buffer and once over an all-0xFF alpha buffer. Implementations
/// return the resulting `(color, alpha)` buffers, each `side * side`
/// bytes.
pub trait SpriteBlitter {
	/// Runs `code` against the sprite's `data`.
	fn run(&self, sprite: &SpriResource) -> Result<(Vec<u8>, Vec<u8>), DecodeError>;
}

/// Parses and validates a `Spri` resource.
pub fn parse_spri(data: &[u8]) -> Result<SpriResource, DecodeError> {
	let mut r = ByteReader::new(data);
	let side = r.get_u16_be()? as usize;
	let area = r.get_u16_be()? as usize;
	let _mask_type = r.get_u8()?;
	let _unused = r.get_u8()?;
	if area != side * side {
		return Err(DecodeError::corrupt_size(format!(
			"sprite is not square: side {side}, area {area}"
		)));
	}
	let pixels = r.get_bytes(area)?.to_vec();
	let code = r.get_bytes(r.remaining())?.to_vec();
	Ok(SpriResource { side, data: pixels, code })
}

/// Decodes a `Spri` by running its blitter through `blitter`.
pub fn decode_spri(
	data: &[u8],
	clut: &ColorTable,
	blitter: Option<&dyn SpriteBlitter>,
) -> Result<Image, DecodeError> {
	require_clut(clut)?;
	let sprite = parse_spri(data)?;
	let blitter = blitter.ok_or_else(|| {
		DecodeError::unsupported(
			"Spri rendering requires an external 68K blitter executor".to_string(),
		)
	})?;

	let (color, alpha) = blitter.run(&sprite)?;
	if color.len() != sprite.side * sprite.side || alpha.len() != color.len() {
		return Err(DecodeError::corrupt_size(format!(
			"blitter produced {}/{} bytes for a {}-pixel sprite",
			color.len(),
			alpha.len(),
			sprite.side * sprite.side
		)));
	}

	let mut img = Image::new_with_alpha(sprite.side, sprite.side)?;
	for y in 0..sprite.side {
		for x in 0..sprite.side {
			let z = y * sprite.side + x;
			let c = clut_color(clut, color[z])?;
			img.write(x, y, Rgba::new(c.r, c.g, c.b, alpha[z]))?;
		}
	}
	Ok(img)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::quickdraw::color::Color8;

	fn spri(side: u16, pixels: &[u8], code: &[u8]) -> Vec<u8> {
		let mut v = Vec::new();
		v.extend_from_slice(&side.to_be_bytes());
		v.extend_from_slice(&(side * side).to_be_bytes());
		v.push(0);
		v.push(0);
		v.extend_from_slice(pixels);
		v.extend_from_slice(code);
		v
	}

	#[test]
	fn test_parse_splits_data_and_code() {
		let resource = spri(2, &[1, 2, 3, 4], &[0x4E, 0x75]);
		let sprite = parse_spri(&resource).unwrap();
		assert_eq!(sprite.side, 2);
		assert_eq!(sprite.data, vec![1, 2, 3, 4]);
		assert_eq!(sprite.code, vec![0x4E, 0x75]);
	}

	#[test]
	fn test_non_square_is_error() {
		let mut resource = spri(2, &[1, 2, 3, 4], &[]);
		resource[2..4].copy_from_slice(&5u16.to_be_bytes());
		assert!(matches!(parse_spri(&resource), Err(DecodeError::CorruptSize(_))));
	}

	struct IdentityBlitter;
	impl SpriteBlitter for IdentityBlitter {
		fn run(&self, sprite: &SpriResource) -> Result<(Vec<u8>, Vec<u8>), DecodeError> {
			Ok((sprite.data.clone(), vec![0xFF; sprite.data.len()]))
		}
	}

	#[test]
	fn test_decode_with_and_without_blitter() {
		let clut = ColorTable::from_colors([Color8::new(0, 0, 0), Color8::new(0xFF, 0, 0)]);
		let resource = spri(1, &[1], &[0x4E, 0x75]);
		assert!(matches!(
			decode_spri(&resource, &clut, None),
			Err(DecodeError::Unsupported(_))
		));
		let img = decode_spri(&resource, &clut, Some(&IdentityBlitter)).unwrap();
		assert_eq!(img.read(0, 0).unwrap(), Rgba::opaque(Color8::new(0xFF, 0, 0)));
	}
}
