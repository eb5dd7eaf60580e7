//! `PICT` handling.
//!
//! QuickDraw pictures are a full opcode language; rendering them is the
//! job of an external collaborator (historically `picttoppm`). The core
//! parses the frame header, validates the version opcode, and hands the
//! raw bytes to whatever [`PictDelegate`] the caller installed. Without
//! a delegate, decoding reports [`DecodeError::Unsupported`].

use crate::error::DecodeError;
use crate::image::Image;
use crate::io::ByteReader;
use crate::quickdraw::Rect;

/// Renders PICT data out-of-core (e.g. by spawning `picttoppm`).
pub trait PictDelegate {
	/// Renders the full resource bytes to an image.
	fn render(&self, pict_data: &[u8]) -> Result<Image, DecodeError>;
}

/// The PICT frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictHeader {
	/// Stored size field (meaningful for v1 only, where it is the low
	/// 16 bits of the picture length)
	pub size: u16,
	/// Picture frame
	pub frame: Rect,
	/// Version: 1 or 2
	pub version: u8,
}

/// Parses the frame header and version opcode.
pub fn parse_header(data: &[u8]) -> Result<PictHeader, DecodeError> {
	let mut r = ByteReader::new(data);
	let size = r.get_u16_be()?;
	let frame = Rect::parse(&mut r)?;

	// v1: opcode 0x11 0x01; v2: 0x0011 0x02FF
	let b0 = r.get_u8()?;
	let b1 = r.get_u8()?;
	let version = match (b0, b1) {
		(0x11, 0x01) => 1,
		(0x00, 0x11) => {
			let v = r.get_u16_be()?;
			if v != 0x02FF {
				return Err(DecodeError::BadMagic {
					expected: 0x02FF,
					actual: u32::from(v),
				});
			}
			2
		}
		_ => {
			return Err(DecodeError::BadMagic {
				expected: 0x1101,
				actual: (u32::from(b0) << 8) | u32::from(b1),
			});
		}
	};
	Ok(PictHeader { size, frame, version })
}

/// Decodes a `PICT` via the installed delegate.
pub fn decode_pict(
	data: &[u8],
	delegate: Option<&dyn PictDelegate>,
) -> Result<Image, DecodeError> {
	let header = parse_header(data)?;
	let delegate = delegate.ok_or_else(|| {
		DecodeError::unsupported(format!(
			"PICT v{} rendering requires an external delegate",
			header.version
		))
	})?;
	delegate.render(data)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn v2_pict(frame: Rect) -> Vec<u8> {
		let mut v = Vec::new();
		v.extend_from_slice(&0u16.to_be_bytes());
		for field in [frame.y1, frame.x1, frame.y2, frame.x2] {
			v.extend_from_slice(&field.to_be_bytes());
		}
		v.extend_from_slice(&[0x00, 0x11, 0x02, 0xFF]);
		v
	}

	#[test]
	fn test_parse_v2_header() {
		let header = parse_header(&v2_pict(Rect::new(0, 0, 10, 20))).unwrap();
		assert_eq!(header.version, 2);
		assert_eq!(header.frame.width(), 20);
	}

	#[test]
	fn test_decode_without_delegate() {
		assert!(matches!(
			decode_pict(&v2_pict(Rect::new(0, 0, 1, 1)), None),
			Err(DecodeError::Unsupported(_))
		));
	}

	struct SolidDelegate;
	impl PictDelegate for SolidDelegate {
		fn render(&self, pict_data: &[u8]) -> Result<Image, DecodeError> {
			let header = parse_header(pict_data)?;
			Image::new(header.frame.width() as usize, header.frame.height() as usize)
		}
	}

	#[test]
	fn test_decode_with_delegate() {
		let img = decode_pict(&v2_pict(Rect::new(0, 0, 3, 5)), Some(&SolidDelegate)).unwrap();
		assert_eq!(img.width(), 5);
		assert_eq!(img.height(), 3);
	}
}
