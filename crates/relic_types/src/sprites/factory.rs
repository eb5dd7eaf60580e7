//! The Factory's fixed-size icon images: `1img`, `4img`, `8img`.
//!
//! Plain fixed-depth rasters with no header at all. The game draws
//! 20x20 icons but the stored height is 21 with a blank last row, and
//! the monochrome width is padded to 32 (row bytes must be even on 68K
//! QuickDraw); the color formats are 32 and 40 wide for no obvious
//! reason.

use crate::error::DecodeError;
use crate::image::Image;
use crate::quickdraw::color::ColorTable;
use crate::quickdraw::raster::{decode_indexed, decode_monochrome_packed};
use crate::sprites::require_clut;

/// Decodes a `1img` (32x21 monochrome).
pub fn decode_1img(data: &[u8]) -> Result<Image, DecodeError> {
	decode_monochrome_packed(data, 32, 21)
}

/// Decodes a `4img` (32x21, 4-bit indexed).
pub fn decode_4img(data: &[u8], clut: &ColorTable) -> Result<Image, DecodeError> {
	require_clut(clut)?;
	decode_indexed(data, 32, 21, 16, 4, clut)
}

/// Decodes an `8img` (40x21, 8-bit indexed).
pub fn decode_8img(data: &[u8], clut: &ColorTable) -> Result<Image, DecodeError> {
	require_clut(clut)?;
	decode_indexed(data, 40, 21, 40, 8, clut)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::image::Rgba;
	use crate::quickdraw::color::Color8;

	#[test]
	fn test_1img() {
		let mut data = vec![0u8; 4 * 21];
		data[0] = 0x80;
		let img = decode_1img(&data).unwrap();
		assert_eq!(img.width(), 32);
		assert_eq!(img.height(), 21);
		assert_eq!(img.read(0, 0).unwrap(), Rgba::BLACK);
	}

	#[test]
	fn test_8img_uses_clut() {
		let clut = ColorTable::from_colors([Color8::new(9, 9, 9)]);
		let data = vec![0u8; 40 * 21];
		let img = decode_8img(&data, &clut).unwrap();
		assert_eq!(img.read(39, 20).unwrap(), Rgba::opaque(Color8::new(9, 9, 9)));
	}
}
