//! The default system color tables.
//!
//! `icl4`/`ics4`/`icl8`/`ics8` icons carry no palette of their own; they
//! index the system 4-bit and 8-bit color tables. The 8-bit table is the
//! 6x6x6 color cube (215 entries, white first) followed by red, green,
//! blue, and gray ramps and final black; generating it beats carrying a
//! 256-entry literal.

use crate::quickdraw::color::{Color8, ColorTable};

/// The classic 16-color system palette.
pub const SYSTEM_4BIT: [Color8; 16] = [
	Color8 { r: 0xFF, g: 0xFF, b: 0xFF }, // white
	Color8 { r: 0xFC, g: 0xF3, b: 0x05 }, // yellow
	Color8 { r: 0xFF, g: 0x64, b: 0x02 }, // orange
	Color8 { r: 0xDD, g: 0x08, b: 0x06 }, // red
	Color8 { r: 0xF2, g: 0x08, b: 0x84 }, // magenta
	Color8 { r: 0x46, g: 0x00, b: 0xA5 }, // purple
	Color8 { r: 0x00, g: 0x00, b: 0xD4 }, // blue
	Color8 { r: 0x02, g: 0xAB, b: 0xEA }, // cyan
	Color8 { r: 0x1F, g: 0xB7, b: 0x14 }, // green
	Color8 { r: 0x00, g: 0x64, b: 0x11 }, // dark green
	Color8 { r: 0x56, g: 0x2C, b: 0x05 }, // brown
	Color8 { r: 0x90, g: 0x71, b: 0x3A }, // tan
	Color8 { r: 0xC0, g: 0xC0, b: 0xC0 }, // light gray
	Color8 { r: 0x80, g: 0x80, b: 0x80 }, // medium gray
	Color8 { r: 0x40, g: 0x40, b: 0x40 }, // dark gray
	Color8 { r: 0x00, g: 0x00, b: 0x00 }, // black
];

/// Builds the 4-bit system color table.
#[must_use]
pub fn system_clut_4bit() -> ColorTable {
	ColorTable::from_colors(SYSTEM_4BIT)
}

/// Builds the 8-bit system color table.
#[must_use]
pub fn system_clut_8bit() -> ColorTable {
	let mut colors = Vec::with_capacity(256);

	// 6x6x6 cube, white (FF FF FF) down to (00 00 33); pure black is
	// reserved for index 255
	for i in 0..215usize {
		let r = 0xFF - 0x33 * (i / 36) as u8;
		let g = 0xFF - 0x33 * ((i / 6) % 6) as u8;
		let b = 0xFF - 0x33 * (i % 6) as u8;
		colors.push(Color8::new(r, g, b));
	}

	// Ramps fill in the shades the cube skips
	const RAMP: [u8; 10] = [0xEE, 0xDD, 0xBB, 0xAA, 0x88, 0x77, 0x55, 0x44, 0x22, 0x11];
	for v in RAMP {
		colors.push(Color8::new(v, 0, 0));
	}
	for v in RAMP {
		colors.push(Color8::new(0, v, 0));
	}
	for v in RAMP {
		colors.push(Color8::new(0, 0, v));
	}
	for v in RAMP {
		colors.push(Color8::new(v, v, v));
	}
	colors.push(Color8::new(0, 0, 0));

	ColorTable::from_colors(colors)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_8bit_table_shape() {
		let clut = system_clut_8bit();
		assert_eq!(clut.len(), 256);
		assert_eq!(clut.get_color8(0).unwrap(), Color8::new(0xFF, 0xFF, 0xFF));
		assert_eq!(clut.get_color8(255).unwrap(), Color8::new(0, 0, 0));
		// Entry 215 is the first red-ramp shade
		assert_eq!(clut.get_color8(215).unwrap(), Color8::new(0xEE, 0, 0));
	}

	#[test]
	fn test_4bit_table() {
		let clut = system_clut_4bit();
		assert_eq!(clut.len(), 16);
		assert_eq!(clut.get_color8(15).unwrap(), Color8::new(0, 0, 0));
	}
}
