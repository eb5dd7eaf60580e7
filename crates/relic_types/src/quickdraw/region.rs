//! QuickDraw regions.
//!
//! A region is a bounding rect plus rows of "inversion points". Each
//! listed row carries x coordinates at which membership toggles, and a
//! row's toggles stay in effect for every row below it until toggled
//! again. A bare 10-byte region is its bounding rect.
//!
//! Decoders use regions as clip masks applied to an already-decoded
//! raster, so the main consumer API here is [`Region::to_mask`], which
//! rasterizes inside/outside flags over a frame rect in reading order.

use crate::error::DecodeError;
use crate::io::ByteReader;
use crate::quickdraw::Rect;

const END_MARKER: i16 = 0x7FFF;

/// A parsed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
	/// Bounding rect
	pub bounds: Rect,
	/// Rows of toggle coordinates, (y, sorted x list)
	rows: Vec<(i16, Vec<i16>)>,
}

impl Region {
	/// A rectangular region covering `bounds`.
	#[must_use]
	pub fn rect(bounds: Rect) -> Self {
		Self { bounds, rows: Vec::new() }
	}

	/// Parses a region blob, consuming exactly `size` bytes from `r`.
	pub fn parse(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
		let start = r.position();
		let size = r.get_u16_be()? as usize;
		if size < 10 || size % 2 != 0 {
			return Err(DecodeError::corrupt_size(format!("region size {size}")));
		}
		let bounds = Rect::parse(r)?;

		let mut rows = Vec::new();
		if size > 10 {
			loop {
				let y = r.get_i16_be()?;
				if y == END_MARKER {
					break;
				}
				let mut xs = Vec::new();
				loop {
					let x = r.get_i16_be()?;
					if x == END_MARKER {
						break;
					}
					xs.push(x);
				}
				rows.push((y, xs));
			}
			if r.position() - start != size {
				return Err(DecodeError::corrupt_size(format!(
					"region data consumed {} bytes, header declares {size}",
					r.position() - start
				)));
			}
		}
		Ok(Self { bounds, rows })
	}

	/// Returns true when the region is just its bounding rect.
	#[must_use]
	pub fn is_rect(&self) -> bool {
		self.rows.is_empty()
	}

	/// Point-in-region test.
	#[must_use]
	pub fn contains(&self, x: i16, y: i16) -> bool {
		if !self.bounds.contains(x as isize, y as isize) {
			return false;
		}
		if self.rows.is_empty() {
			return true;
		}
		let mut parity = false;
		for (row_y, xs) in &self.rows {
			if *row_y > y {
				break;
			}
			for x0 in xs {
				if *x0 <= x {
					parity = !parity;
				}
			}
		}
		parity
	}

	/// Rasterizes inside/outside flags over `frame` in reading order.
	///
	/// The returned vector has `frame.width() * frame.height()` entries;
	/// index `row * width + column` corresponds to the pixel at
	/// `(frame.x1 + column, frame.y1 + row)`.
	#[must_use]
	pub fn to_mask(&self, frame: &Rect) -> Vec<bool> {
		let width = frame.width().max(0) as usize;
		let height = frame.height().max(0) as usize;
		let mut mask = vec![false; width * height];
		if self.rows.is_empty() {
			for row in 0..height {
				for col in 0..width {
					mask[row * width + col] =
						self.bounds.contains(frame.x1 as isize + col as isize, frame.y1 as isize + row as isize);
				}
			}
			return mask;
		}

		// Accumulate the per-column toggle parity a row at a time
		let mut toggles = vec![false; width];
		let mut next_row = 0usize;
		for row in 0..height {
			let y = frame.y1 as isize + row as isize;
			while next_row < self.rows.len() && (self.rows[next_row].0 as isize) <= y {
				for &x0 in &self.rows[next_row].1 {
					let col = x0 as isize - frame.x1 as isize;
					// A toggle left of the frame flips the whole row
					let start = col.max(0) as usize;
					if col < width as isize {
						for t in &mut toggles[start..] {
							*t = !*t;
						}
					}
				}
				next_row += 1;
			}
			mask[row * width..(row + 1) * width].copy_from_slice(&toggles);
		}
		mask
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn words(values: &[i16]) -> Vec<u8> {
		values.iter().flat_map(|v| v.to_be_bytes()).collect()
	}

	#[test]
	fn test_rect_region() {
		let data = words(&[10, 0, 0, 4, 8]);
		let region = Region::parse(&mut ByteReader::new(&data)).unwrap();
		assert!(region.is_rect());
		assert!(region.contains(0, 0));
		assert!(region.contains(7, 3));
		assert!(!region.contains(8, 0));

		let mask = region.to_mask(&region.bounds);
		assert_eq!(mask.len(), 32);
		assert!(mask.iter().all(|&b| b));
	}

	#[test]
	fn test_two_span_region() {
		// Bounds 8x2; row 0 toggles at x=0,2,4,6: inside spans [0,2) and [4,6)
		let mut data = words(&[24, 0, 0, 2, 8]);
		data.extend(words(&[0, 0, 2, 4, 6, END_MARKER, END_MARKER]));
		let region = Region::parse(&mut ByteReader::new(&data)).unwrap();
		assert!(!region.is_rect());

		let mask = region.to_mask(&region.bounds);
		let expected_row = [true, true, false, false, true, true, false, false];
		assert_eq!(&mask[0..8], &expected_row);
		// Row 1 inherits row 0's toggles
		assert_eq!(&mask[8..16], &expected_row);
		assert!(region.contains(1, 1));
		assert!(!region.contains(3, 0));
	}

	#[test]
	fn test_size_mismatch() {
		let mut data = words(&[22, 0, 0, 2, 8]);
		data.extend(words(&[0, 0, 2, END_MARKER, END_MARKER]));
		assert!(matches!(
			Region::parse(&mut ByteReader::new(&data)),
			Err(DecodeError::CorruptSize(_))
		));
	}
}
