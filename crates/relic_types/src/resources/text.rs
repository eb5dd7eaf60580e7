//! Text resource decoders: `TEXT`, `STR `, `STR#`, and `styl`.
//!
//! All classic Mac text is MacRoman; it is decoded to UTF-8 on the way
//! out, and carriage returns become line feeds. A `styl` resource is a
//! TextEdit style scrap describing font runs over a companion `TEXT`;
//! the pair renders to a minimal RTF document.

use crate::error::DecodeError;
use crate::io::{decode_macroman, ByteReader};

/// Decodes a `TEXT` resource to UTF-8 with `\n` line endings.
#[must_use]
pub fn decode_text(data: &[u8]) -> String {
	decode_macroman(data).replace('\r', "\n")
}

/// Decodes a `STR ` resource: one Pascal string, plus any trailing bytes
/// after it (some applications append binary data there).
pub fn decode_str(data: &[u8]) -> Result<(String, Vec<u8>), DecodeError> {
	let mut r = ByteReader::new(data);
	let text = r.read_pstring()?;
	let rest = r.get_bytes(r.remaining())?.to_vec();
	Ok((text, rest))
}

/// Decodes a `STR#` resource: u16 count, then that many Pascal strings.
pub fn decode_strn(data: &[u8]) -> Result<Vec<String>, DecodeError> {
	let mut r = ByteReader::new(data);
	let count = r.get_u16_be()? as usize;
	let mut strings = Vec::with_capacity(count);
	for _ in 0..count {
		strings.push(r.read_pstring()?);
	}
	Ok(strings)
}

/// One style run from a `styl` scrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRun {
	/// First character this run covers
	pub start_char: u32,
	/// Line height in points
	pub line_height: u16,
	/// Font ascent in points
	pub font_ascent: u16,
	/// Font family id
	pub font_id: u16,
	/// Style flags: bold 0x01, italic 0x02, underline 0x04
	pub style_flags: u8,
	/// Point size
	pub size: u16,
	/// Text color, 16 bits per channel
	pub color: crate::quickdraw::color::Color,
}

/// Parses the style scrap: u16 run count, then 20-byte runs.
pub fn parse_styl(data: &[u8]) -> Result<Vec<StyleRun>, DecodeError> {
	let mut r = ByteReader::new(data);
	let count = r.get_u16_be()? as usize;
	let mut runs = Vec::with_capacity(count);
	for _ in 0..count {
		let start_char = r.get_u32_be()?;
		let line_height = r.get_u16_be()?;
		let font_ascent = r.get_u16_be()?;
		let font_id = r.get_u16_be()?;
		let style_flags = r.get_u8()?;
		r.skip(1)?; // pad
		let size = r.get_u16_be()?;
		let color = crate::quickdraw::color::Color::parse(&mut r)?;
		runs.push(StyleRun {
			start_char,
			line_height,
			font_ascent,
			font_id,
			style_flags,
			size,
			color,
		});
	}
	Ok(runs)
}

fn font_name(font_id: u16) -> &'static str {
	match font_id {
		2 => "New York",
		3 => "Geneva",
		4 => "Monaco",
		20 => "Times",
		21 => "Helvetica",
		22 => "Courier",
		_ => "Geneva", // system default stand-in
	}
}

fn rtf_escape(text: &str, out: &mut String) {
	for ch in text.chars() {
		match ch {
			'\\' => out.push_str("\\\\"),
			'{' => out.push_str("\\{"),
			'}' => out.push_str("\\}"),
			'\n' => out.push_str("\\line "),
			c if (c as u32) < 0x80 => out.push(c),
			c => {
				// RTF unicode escapes are signed 16-bit decimal
				out.push_str(&format!("\\u{}?", c as u32 as i32 as i16));
			}
		}
	}
}

/// Renders a `styl` scrap plus its companion text as an RTF document.
pub fn decode_styl(styl_data: &[u8], text_data: &[u8]) -> Result<String, DecodeError> {
	let runs = parse_styl(styl_data)?;
	if runs.is_empty() {
		return Err(DecodeError::corrupt_size("styl has no style runs".to_string()));
	}
	let text = decode_text(text_data);
	let chars: Vec<char> = text.chars().collect();

	// Font and color tables are deduplicated in first-use order
	let mut fonts: Vec<u16> = Vec::new();
	let mut colors: Vec<(u8, u8, u8)> = Vec::new();
	for run in &runs {
		if !fonts.contains(&run.font_id) {
			fonts.push(run.font_id);
		}
		let c8 = run.color.as8();
		if !colors.contains(&(c8.r, c8.g, c8.b)) {
			colors.push((c8.r, c8.g, c8.b));
		}
	}

	let mut out = String::from("{\\rtf1\\ansi\n{\\fonttbl");
	for (index, font_id) in fonts.iter().enumerate() {
		out.push_str(&format!("{{\\f{index} {};}}", font_name(*font_id)));
	}
	out.push_str("}\n{\\colortbl;");
	for (r, g, b) in &colors {
		out.push_str(&format!("\\red{r}\\green{g}\\blue{b};"));
	}
	out.push_str("}\n");

	for (index, run) in runs.iter().enumerate() {
		let start = run.start_char as usize;
		let end = runs
			.get(index + 1)
			.map(|next| next.start_char as usize)
			.unwrap_or(chars.len());
		if start > chars.len() || end > chars.len() || start > end {
			return Err(DecodeError::corrupt_size(format!(
				"style run covers characters {start}..{end} of {}",
				chars.len()
			)));
		}

		let font_index = fonts.iter().position(|&f| f == run.font_id).unwrap_or(0);
		let c8 = run.color.as8();
		let color_index =
			colors.iter().position(|&c| c == (c8.r, c8.g, c8.b)).unwrap_or(0) + 1;
		out.push_str(&format!("\\f{font_index}\\fs{}\\cf{color_index}", run.size * 2));
		if run.style_flags & 0x01 != 0 {
			out.push_str("\\b");
		}
		if run.style_flags & 0x02 != 0 {
			out.push_str("\\i");
		}
		if run.style_flags & 0x04 != 0 {
			out.push_str("\\ul");
		}
		out.push(' ');
		let segment: String = chars[start..end].iter().collect();
		rtf_escape(&segment, &mut out);
		if run.style_flags & 0x01 != 0 {
			out.push_str("\\b0");
		}
		if run.style_flags & 0x02 != 0 {
			out.push_str("\\i0");
		}
		if run.style_flags & 0x04 != 0 {
			out.push_str("\\ul0");
		}
		out.push('\n');
	}
	out.push('}');
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_text_line_endings_and_macroman() {
		// 0x8E is e-acute in MacRoman
		assert_eq!(decode_text(b"caf\x8E\rdone"), "café\ndone");
	}

	#[test]
	fn test_str_with_trailing_data() {
		let (text, rest) = decode_str(b"\x02hi\xDE\xAD").unwrap();
		assert_eq!(text, "hi");
		assert_eq!(rest, vec![0xDE, 0xAD]);
	}

	#[test]
	fn test_strn() {
		let strings = decode_strn(b"\x00\x02\x01a\x02bc").unwrap();
		assert_eq!(strings, vec!["a".to_string(), "bc".to_string()]);
	}

	fn style_run(start: u32, font_id: u16, flags: u8, size: u16) -> Vec<u8> {
		let mut v = Vec::new();
		v.extend_from_slice(&start.to_be_bytes());
		v.extend_from_slice(&12u16.to_be_bytes()); // line height
		v.extend_from_slice(&9u16.to_be_bytes()); // ascent
		v.extend_from_slice(&font_id.to_be_bytes());
		v.push(flags);
		v.push(0);
		v.extend_from_slice(&size.to_be_bytes());
		v.extend_from_slice(&[0xFF, 0xFF, 0, 0, 0, 0]); // red
		v
	}

	#[test]
	fn test_styl_to_rtf() {
		let mut styl = 2u16.to_be_bytes().to_vec();
		styl.extend(style_run(0, 3, 0x01, 12));
		styl.extend(style_run(5, 22, 0x00, 10));
		let rtf = decode_styl(&styl, b"Hello world").unwrap();
		assert!(rtf.starts_with("{\\rtf1\\ansi"));
		assert!(rtf.contains("Geneva"));
		assert!(rtf.contains("Courier"));
		assert!(rtf.contains("\\fs24"));
		assert!(rtf.contains("\\b Hello"));
		assert!(rtf.ends_with('}'));
	}

	#[test]
	fn test_styl_bad_run_bounds() {
		let mut styl = 1u16.to_be_bytes().to_vec();
		styl.extend(style_run(40, 3, 0, 12));
		assert!(matches!(decode_styl(&styl, b"short"), Err(DecodeError::CorruptSize(_))));
	}
}
