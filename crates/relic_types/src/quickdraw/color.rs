//! Color types and indexed color tables.
//!
//! QuickDraw colors carry 16 bits per channel; narrowing to 8 bits keeps
//! the high byte. A `clut` resource stores explicit entry ids that are
//! not necessarily contiguous or equal to the array position, so lookups
//! here go by id, not by index.

use crate::error::DecodeError;
use crate::io::ByteReader;

/// A 48-bit RGB color (16 bits per channel).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
	/// Red component
	pub r: u16,
	/// Green component
	pub g: u16,
	/// Blue component
	pub b: u16,
}

impl Color {
	/// Builds a color from wide channels.
	#[must_use]
	pub fn new(r: u16, g: u16, b: u16) -> Self {
		Self { r, g, b }
	}

	/// Reads three big-endian channels.
	pub fn parse(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
		Ok(Self { r: r.get_u16_be()?, g: r.get_u16_be()?, b: r.get_u16_be()? })
	}

	/// Narrows to 8 bits per channel (high byte).
	#[must_use]
	pub fn as8(&self) -> Color8 {
		Color8 { r: (self.r >> 8) as u8, g: (self.g >> 8) as u8, b: (self.b >> 8) as u8 }
	}
}

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color8 {
	/// Red component
	pub r: u8,
	/// Green component
	pub g: u8,
	/// Blue component
	pub b: u8,
}

impl Color8 {
	/// Builds a color from narrow channels.
	#[must_use]
	pub fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Widens to 16 bits per channel by byte duplication.
	#[must_use]
	pub fn as16(&self) -> Color {
		Color {
			r: u16::from(self.r) * 0x0101,
			g: u16::from(self.g) * 0x0101,
			b: u16::from(self.b) * 0x0101,
		}
	}
}

/// One `clut` entry: explicit id plus color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorTableEntry {
	/// Entry id; matched against pixel values, not the array position
	pub id: u16,
	/// Entry color
	pub color: Color,
}

/// An indexed color table.
///
/// Tables are small (at most 256 entries), so lookups are linear. No
/// mutation after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
	/// Table flags; bit 0x8000 marks a device-indexed palette
	pub flags: u16,
	entries: Vec<ColorTableEntry>,
}

/// Device-indexed palette flag.
pub const CLUT_FLAG_DEVICE: u16 = 0x8000;

impl ColorTable {
	/// Builds a table from entries, with no flags set.
	#[must_use]
	pub fn from_entries(entries: Vec<ColorTableEntry>) -> Self {
		Self { flags: 0, entries }
	}

	/// Builds a table whose entry ids are the positions `0..colors.len()`.
	#[must_use]
	pub fn from_colors(colors: impl IntoIterator<Item = Color8>) -> Self {
		let entries = colors
			.into_iter()
			.enumerate()
			.map(|(i, c)| ColorTableEntry { id: i as u16, color: c.as16() })
			.collect();
		Self { flags: 0, entries }
	}

	/// Parses an on-disk `clut`: seed, flags, entry count minus one, then
	/// `(id, r, g, b)` entries.
	pub fn parse(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
		r.skip(4)?; // seed
		let flags = r.get_u16_be()?;
		let num_entries_m1 = r.get_i16_be()?;
		if num_entries_m1 < -1 {
			return Err(DecodeError::corrupt_size(format!(
				"color table declares {num_entries_m1} entries"
			)));
		}
		let count = (num_entries_m1 + 1) as usize;
		let mut entries = Vec::with_capacity(count);
		for _ in 0..count {
			let id = r.get_u16_be()?;
			let color = Color::parse(r)?;
			entries.push(ColorTableEntry { id, color });
		}
		Ok(Self { flags, entries })
	}

	/// On-disk size in bytes for a table of `count` entries.
	#[must_use]
	pub fn size_bytes(count: usize) -> usize {
		8 + count * 8
	}

	/// Number of entries.
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if the table has no entries. Empty tables are legal;
	/// decoders that require a palette report [`DecodeError::MissingResource`].
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// All entries in table order.
	#[must_use]
	pub fn entries(&self) -> &[ColorTableEntry] {
		&self.entries
	}

	/// Looks up an entry by id.
	///
	/// On a device-indexed table (flag 0x8000) ids are positions instead.
	#[must_use]
	pub fn get_entry(&self, id: u16) -> Option<&Color> {
		if self.flags & CLUT_FLAG_DEVICE != 0 {
			return self.entries.get(id as usize).map(|e| &e.color);
		}
		self.entries.iter().find(|e| e.id == id).map(|e| &e.color)
	}

	/// Looks up an entry by id, narrowing to 8-bit channels.
	#[must_use]
	pub fn get_color8(&self, id: u16) -> Option<Color8> {
		self.get_entry(id).map(Color::as8)
	}
}

/// Parses a `pltt` resource into a color table.
///
/// Palette entries carry usage/tolerance metadata after the color; ids
/// are implicit positions.
pub fn parse_pltt(data: &[u8]) -> Result<ColorTable, DecodeError> {
	let mut r = ByteReader::new(data);
	let count = r.get_u16_be()? as usize;
	r.skip(14)?; // reserved: current entry + reserved handle fields
	let mut entries = Vec::with_capacity(count);
	for i in 0..count {
		let color = Color::parse(&mut r)?;
		r.skip(10)?; // usage, tolerance, private flags, unused
		entries.push(ColorTableEntry { id: i as u16, color });
	}
	Ok(ColorTable::from_entries(entries))
}
