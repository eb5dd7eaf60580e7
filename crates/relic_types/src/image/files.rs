//! BMP and PPM emission and loading.
//!
//! Only the variants the original tools handled: 24-bit uncompressed
//! Windows bitmaps (bottom-up, BGR, rows padded to 4 bytes) and binary
//! PPM (`P6`; loading also accepts `P5` grayscale, expanded to equal
//! R=G=B). Alpha is dropped on save.

use crate::error::DecodeError;
use crate::image::{Image, Rgba};

/// Supported file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
	/// Binary P6 portable pixmap
	ColorPpm,
	/// 24-bit uncompressed BMP
	WindowsBitmap,
}

impl ImageFormat {
	/// The conventional file extension for this format.
	#[must_use]
	pub fn extension(&self) -> &'static str {
		match self {
			ImageFormat::ColorPpm => "ppm",
			ImageFormat::WindowsBitmap => "bmp",
		}
	}
}

const BMP_FILE_HEADER_SIZE: u32 = 14;
const BMP_INFO_HEADER_SIZE: u32 = 40;
const BMP_PPM_PER_METER: u32 = 0x0B12;

pub(super) fn save(img: &Image, format: ImageFormat) -> Result<Vec<u8>, DecodeError> {
	match format {
		ImageFormat::ColorPpm => Ok(save_ppm(img)),
		ImageFormat::WindowsBitmap => Ok(save_bmp(img)),
	}
}

fn save_ppm(img: &Image) -> Vec<u8> {
	let mut out = format!("P6 {} {} 255\n", img.width(), img.height()).into_bytes();
	for px in img.data().chunks_exact(4) {
		out.extend_from_slice(&px[0..3]);
	}
	out
}

fn save_bmp(img: &Image) -> Vec<u8> {
	let row_bytes = img.width() * 3;
	let row_padding = (4 - row_bytes % 4) % 4;
	let pixel_bytes = (row_bytes + row_padding) * img.height();
	let file_size = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE + pixel_bytes as u32;

	let mut out = Vec::with_capacity(file_size as usize);
	// File header
	out.extend_from_slice(b"BM");
	out.extend_from_slice(&file_size.to_le_bytes());
	out.extend_from_slice(&[0; 4]); // reserved
	out.extend_from_slice(&(BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE).to_le_bytes());
	// Info header
	out.extend_from_slice(&BMP_INFO_HEADER_SIZE.to_le_bytes());
	out.extend_from_slice(&(img.width() as i32).to_le_bytes());
	out.extend_from_slice(&(img.height() as i32).to_le_bytes());
	out.extend_from_slice(&1u16.to_le_bytes()); // planes
	out.extend_from_slice(&24u16.to_le_bytes()); // bit depth
	out.extend_from_slice(&0u32.to_le_bytes()); // compression
	out.extend_from_slice(&0u32.to_le_bytes()); // image size
	out.extend_from_slice(&BMP_PPM_PER_METER.to_le_bytes());
	out.extend_from_slice(&BMP_PPM_PER_METER.to_le_bytes());
	out.extend_from_slice(&0u32.to_le_bytes()); // used colors
	out.extend_from_slice(&0u32.to_le_bytes()); // important colors

	// Pixel data, bottom-to-top, BGR
	for y in (0..img.height()).rev() {
		for x in 0..img.width() {
			let px = img.read(x, y).unwrap_or(Rgba::BLACK);
			out.extend_from_slice(&[px.b, px.g, px.r]);
		}
		out.extend(std::iter::repeat_n(0u8, row_padding));
	}
	out
}

pub(super) fn load(data: &[u8]) -> Result<Image, DecodeError> {
	match data {
		[b'P', b'5', ..] => load_ppm(data, false),
		[b'P', b'6', ..] => load_ppm(data, true),
		[b'B', b'M', ..] => load_bmp(data),
		_ => Err(DecodeError::unsupported("unrecognized image signature".to_string())),
	}
}

fn load_ppm(data: &[u8], color: bool) -> Result<Image, DecodeError> {
	// Header tokens: magic, width, height, maxval, then one whitespace
	// byte before the raster
	let mut pos = 2;
	let mut fields = [0usize; 3];
	for field in &mut fields {
		while pos < data.len() && data[pos].is_ascii_whitespace() {
			pos += 1;
		}
		let start = pos;
		while pos < data.len() && data[pos].is_ascii_digit() {
			pos += 1;
		}
		if start == pos {
			return Err(DecodeError::corrupt_size("PPM header field missing".to_string()));
		}
		*field = std::str::from_utf8(&data[start..pos])
			.ok()
			.and_then(|s| s.parse().ok())
			.ok_or_else(|| DecodeError::corrupt_size("PPM header field unreadable".to_string()))?;
	}
	let [width, height, maxval] = fields;
	if maxval != 255 {
		return Err(DecodeError::unsupported(format!("PPM maxval {maxval}")));
	}
	pos += 1; // single whitespace after maxval

	let bytes_per_pixel = if color { 3 } else { 1 };
	let needed = width * height * bytes_per_pixel;
	if data.len() < pos + needed {
		return Err(DecodeError::UnexpectedEof {
			offset: data.len(),
			needed: pos + needed - data.len(),
		});
	}

	let mut img = Image::new(width, height)?;
	for y in 0..height {
		for x in 0..width {
			let o = pos + (y * width + x) * bytes_per_pixel;
			let px = if color {
				Rgba::new(data[o], data[o + 1], data[o + 2], 0xFF)
			} else {
				Rgba::new(data[o], data[o], data[o], 0xFF)
			};
			img.write(x, y, px)?;
		}
	}
	Ok(img)
}

fn load_bmp(data: &[u8]) -> Result<Image, DecodeError> {
	let mut r = crate::io::ByteReader::new(data);
	r.skip(2)?; // 'BM'
	r.skip(8)?; // file size + reserved
	let data_offset = r.get_u32_le()? as usize;
	let header_size = r.get_u32_le()?;
	if header_size < 40 {
		return Err(DecodeError::unsupported(format!("BMP header size {header_size}")));
	}
	let width = r.get_u32_le()? as usize;
	let height_raw = r.get_u32_le()? as i32;
	let height = height_raw.unsigned_abs() as usize;
	let planes = r.get_u16_le()?;
	let bit_depth = r.get_u16_le()?;
	let compression = r.get_u32_le()?;
	if planes != 1 {
		return Err(DecodeError::unsupported(format!("BMP with {planes} planes")));
	}
	if bit_depth != 24 {
		return Err(DecodeError::unsupported(format!("{bit_depth}-bit BMP")));
	}
	if compression != 0 {
		return Err(DecodeError::unsupported("compressed BMP".to_string()));
	}

	let row_bytes = width * 3;
	let row_padding = (4 - row_bytes % 4) % 4;
	let mut img = Image::new(width, height)?;
	let mut pos = data_offset;
	for row in 0..height {
		// Positive heights are stored bottom-up
		let y = if height_raw > 0 { height - 1 - row } else { row };
		for x in 0..width {
			let px = data.get(pos..pos + 3).ok_or(DecodeError::UnexpectedEof {
				offset: pos,
				needed: 3,
			})?;
			img.write(x, y, Rgba::new(px[2], px[1], px[0], 0xFF))?;
			pos += 3;
		}
		pos += row_padding;
	}
	Ok(img)
}
