//! Dark Castle data file parsing.
//!
//! A tiny container: `{unknown: u32, resource_count: u16 BE, unknown:
//! u16[2]}` then `resource_count` entries of `{offset: u32 BE, size: u32
//! BE, type: u32 LE, id: i16 BE}`. The type field alone is
//! little-endian, an artifact of how the original game wrote its tables.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::containers::ResourceSource;
use crate::error::DecodeError;
use crate::io::ByteReader;

#[derive(Debug, Clone, Copy)]
struct Entry {
	type_tag: u32,
	id: i16,
	offset: usize,
	size: usize,
}

/// A parsed Dark Castle data file.
#[derive(Debug)]
pub struct DarkCastleFile {
	data: Vec<u8>,
	entries: Vec<Entry>,
	by_key: HashMap<(u32, i16), usize>,
}

impl DarkCastleFile {
	/// Parses a data file from its bytes.
	pub fn parse(data: Vec<u8>) -> Result<Self, DecodeError> {
		let mut entries = Vec::new();
		{
			let mut r = ByteReader::new(&data);
			r.skip(4)?; // unknown
			let resource_count = r.get_u16_be()? as usize;
			r.skip(4)?; // unknown

			for _ in 0..resource_count {
				let offset = r.get_u32_be()? as usize;
				let size = r.get_u32_be()? as usize;
				let type_tag = r.get_u32_le()?;
				let id = r.get_i16_be()?;
				if offset + size > data.len() {
					return Err(DecodeError::corrupt_size(format!(
						"entry at {offset:#X}+{size:#X} exceeds file of {} bytes",
						data.len()
					)));
				}
				entries.push(Entry { type_tag, id, offset, size });
			}
		}

		let mut by_key = HashMap::with_capacity(entries.len());
		for (index, entry) in entries.iter().enumerate() {
			by_key.insert((entry.type_tag, entry.id), index);
		}
		Ok(Self { data, entries, by_key })
	}

	fn entry(&self, type_tag: u32, id: i16) -> Result<&Entry, DecodeError> {
		self.by_key
			.get(&(type_tag, id))
			.map(|&index| &self.entries[index])
			.ok_or(DecodeError::MissingResource { type_tag, id })
	}
}

impl ResourceSource for DarkCastleFile {
	fn all_resources(&self) -> Vec<(u32, i16)> {
		self.entries.iter().map(|e| (e.type_tag, e.id)).collect()
	}

	fn resource_exists(&self, type_tag: u32, id: i16) -> bool {
		self.by_key.contains_key(&(type_tag, id))
	}

	fn get_resource_data(&self, type_tag: u32, id: i16) -> Result<Cow<'_, [u8]>, DecodeError> {
		let entry = self.entry(type_tag, id)?;
		Ok(Cow::Borrowed(&self.data[entry.offset..entry.offset + entry.size]))
	}

	fn get_resource_name(&self, _type_tag: u32, _id: i16) -> Result<&str, DecodeError> {
		Ok("")
	}
}

/// Builds a synthetic Dark Castle file; test helper.
#[must_use]
pub fn build_file(resources: &[(u32, i16, &[u8])]) -> Vec<u8> {
	let header_len = 8 + resources.len() * 14;
	let mut payloads = Vec::new();
	let mut offsets = Vec::new();
	for &(_, _, data) in resources {
		offsets.push(header_len + payloads.len());
		payloads.extend_from_slice(data);
	}

	let mut out = Vec::with_capacity(header_len + payloads.len());
	out.extend_from_slice(&[0; 4]);
	out.extend_from_slice(&(resources.len() as u16).to_be_bytes());
	out.extend_from_slice(&[0; 4]);
	for (index, &(type_tag, id, data)) in resources.iter().enumerate() {
		out.extend_from_slice(&(offsets[index] as u32).to_be_bytes());
		out.extend_from_slice(&(data.len() as u32).to_be_bytes());
		out.extend_from_slice(&type_tag.to_le_bytes());
		out.extend_from_slice(&id.to_be_bytes());
	}
	out.extend_from_slice(&payloads);
	out
}
