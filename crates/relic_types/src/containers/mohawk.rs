//! Mohawk archive parsing (Broderbund's `'MHWK'` container).
//!
//! The index is a three-level structure: the file header points at a
//! resource directory; the directory starts with a type table whose
//! entries point at per-type resource tables; each resource record names
//! a file-table index, and the file table holds the actual offset and
//! size. Resolving a resource therefore crosses all three tables.
//!
//! Each resource's bytes begin with a 12-byte record header
//! `{signature, size, type}`; the payload is `size - 4` bytes after it.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::containers::ResourceSource;
use crate::error::DecodeError;
use crate::fourcc::fourcc;
use crate::io::ByteReader;

/// `'MHWK'`
pub const MAGIC_MHWK: u32 = fourcc(*b"MHWK");
/// `'RSRC'`
pub const MAGIC_RSRC: u32 = fourcc(*b"RSRC");

#[derive(Debug, Clone, Copy)]
struct Entry {
	type_tag: u32,
	id: i16,
	offset: usize,
	size: usize,
}

/// A parsed Mohawk archive.
#[derive(Debug)]
pub struct MohawkArchive {
	data: Vec<u8>,
	entries: Vec<Entry>,
	by_key: HashMap<(u32, i16), usize>,
}

impl MohawkArchive {
	/// Parses an archive from its bytes.
	pub fn parse(data: Vec<u8>) -> Result<Self, DecodeError> {
		let mut entries = Vec::new();
		{
			let mut r = ByteReader::new(&data);
			let signature = r.get_u32_be()?;
			if signature != MAGIC_MHWK {
				return Err(DecodeError::BadMagic { expected: MAGIC_MHWK, actual: signature });
			}
			let _remaining_file_size = r.get_u32_be()?;
			let resource_signature = r.get_u32_be()?;
			if resource_signature != MAGIC_RSRC {
				return Err(DecodeError::BadMagic {
					expected: MAGIC_RSRC,
					actual: resource_signature,
				});
			}
			let _version = r.get_u16_be()?;
			let _unused = r.get_u16_be()?;
			let _file_size = r.get_u32_be()?;
			let resource_dir_offset = r.get_u32_be()? as usize;
			let file_table_offset = r.get_u16_be()? as usize;
			let _file_table_size = r.get_u16_be()?;

			// Type table at the head of the resource directory
			let mut dir_r = r.sub_from(resource_dir_offset)?;
			let _name_list_offset = dir_r.get_u16_be()?;
			let type_count = dir_r.get_u16_be()? as usize;
			let mut type_entries = Vec::with_capacity(type_count);
			for _ in 0..type_count {
				let type_tag = dir_r.get_u32_be()?;
				let resource_table_offset = dir_r.get_u16_be()? as usize;
				let _name_table_offset = dir_r.get_u16_be()?;
				type_entries.push((type_tag, resource_table_offset));
			}

			// File table, offset relative to the resource directory
			let mut file_r = r.sub_from(resource_dir_offset + file_table_offset)?;
			let file_count = file_r.get_u32_be()? as usize;
			let mut file_entries = Vec::with_capacity(file_count);
			for _ in 0..file_count {
				let data_offset = file_r.get_u32_be()? as usize;
				let size_low = file_r.get_u16_be()? as usize;
				let size_high = file_r.get_u8()? as usize;
				let _flags = file_r.get_u8()?;
				let _unknown = file_r.get_u16_be()?;
				file_entries.push((data_offset, size_low | (size_high << 16)));
			}

			for (type_tag, resource_table_offset) in type_entries {
				let mut res_r = r.sub_from(resource_dir_offset + resource_table_offset)?;
				let res_count = res_r.get_u16_be()? as usize;
				for _ in 0..res_count {
					let id = res_r.get_i16_be()?;
					let file_index = res_r.get_u16_be()? as usize;
					// File table indices are one-based
					let &(offset, size) =
						file_entries.get(file_index.wrapping_sub(1)).ok_or_else(|| {
							DecodeError::out_of_bounds(format!(
								"file table index {file_index} out of {} entries",
								file_entries.len()
							))
						})?;
					entries.push(Entry { type_tag, id, offset, size });
				}
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

impl ResourceSource for MohawkArchive {
	fn all_resources(&self) -> Vec<(u32, i16)> {
		self.entries.iter().map(|e| (e.type_tag, e.id)).collect()
	}

	fn resource_exists(&self, type_tag: u32, id: i16) -> bool {
		self.by_key.contains_key(&(type_tag, id))
	}

	fn get_resource_data(&self, type_tag: u32, id: i16) -> Result<Cow<'_, [u8]>, DecodeError> {
		let entry = self.entry(type_tag, id)?;
		let header = self.data.get(entry.offset..entry.offset + 12).ok_or_else(|| {
			DecodeError::out_of_bounds(format!("resource record at {:#X}", entry.offset))
		})?;
		let size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
		if size < 4 {
			return Err(DecodeError::corrupt_size(format!("resource record size {size}")));
		}
		let start = entry.offset + 12;
		self.data.get(start..start + size - 4).map(Cow::Borrowed).ok_or_else(|| {
			DecodeError::UnexpectedEof { offset: self.data.len(), needed: start + size - 4 }
		})
	}

	fn get_resource_name(&self, _type_tag: u32, _id: i16) -> Result<&str, DecodeError> {
		// Mohawk name tables exist but the tools never consume them
		Ok("")
	}
}

/// Builds a synthetic single-type Mohawk archive; test helper.
#[must_use]
pub fn build_archive(type_tag: u32, resources: &[(i16, &[u8])]) -> Vec<u8> {
	// Data records first, after the 28-byte file header
	let mut records = Vec::new();
	let mut record_offsets = Vec::new();
	let base = 28usize;
	for &(_, payload) in resources {
		record_offsets.push(base + records.len());
		records.extend_from_slice(&MAGIC_RSRC.to_be_bytes()); // record signature
		records.extend_from_slice(&((payload.len() + 4) as u32).to_be_bytes());
		records.extend_from_slice(&type_tag.to_be_bytes());
		records.extend_from_slice(payload);
	}

	let resource_dir_offset = base + records.len();
	// Directory: name list offset, type count, one type entry
	let type_table_len = 4 + 8;
	let resource_table_offset = type_table_len;
	let resource_table_len = 2 + resources.len() * 4;
	let file_table_offset = resource_table_offset + resource_table_len;

	let mut dir = Vec::new();
	dir.extend_from_slice(&0u16.to_be_bytes()); // name list offset (unused)
	dir.extend_from_slice(&1u16.to_be_bytes()); // type count
	dir.extend_from_slice(&type_tag.to_be_bytes());
	dir.extend_from_slice(&(resource_table_offset as u16).to_be_bytes());
	dir.extend_from_slice(&0u16.to_be_bytes()); // name table offset

	dir.extend_from_slice(&(resources.len() as u16).to_be_bytes());
	for (index, &(id, _)) in resources.iter().enumerate() {
		dir.extend_from_slice(&id.to_be_bytes());
		dir.extend_from_slice(&((index + 1) as u16).to_be_bytes()); // one-based
	}

	dir.extend_from_slice(&(resources.len() as u32).to_be_bytes());
	for (index, &(_, payload)) in resources.iter().enumerate() {
		dir.extend_from_slice(&(record_offsets[index] as u32).to_be_bytes());
		let size = (payload.len() + 4) as u32 + 8; // record incl. header
		dir.extend_from_slice(&(size as u16).to_be_bytes());
		dir.push((size >> 16) as u8);
		dir.push(0); // flags
		dir.extend_from_slice(&0u16.to_be_bytes());
	}

	let total = resource_dir_offset + dir.len();
	let mut out = Vec::with_capacity(total);
	out.extend_from_slice(&MAGIC_MHWK.to_be_bytes());
	out.extend_from_slice(&((total - 8) as u32).to_be_bytes());
	out.extend_from_slice(&MAGIC_RSRC.to_be_bytes());
	out.extend_from_slice(&1u16.to_be_bytes()); // version
	out.extend_from_slice(&0u16.to_be_bytes());
	out.extend_from_slice(&(total as u32).to_be_bytes());
	out.extend_from_slice(&(resource_dir_offset as u32).to_be_bytes());
	out.extend_from_slice(&(file_table_offset as u16).to_be_bytes());
	out.extend_from_slice(&((2 + resources.len() * 10) as u16).to_be_bytes());
	out.extend_from_slice(&records);
	out.extend_from_slice(&dir);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_synthetic_archive() {
		let tag = fourcc(*b"tBMP");
		let bytes = build_archive(tag, &[(1, b"one"), (7, b"seven")]);
		let archive = MohawkArchive::parse(bytes).unwrap();

		assert_eq!(archive.all_resources(), vec![(tag, 1), (tag, 7)]);
		assert_eq!(archive.get_resource_data(tag, 7).unwrap().as_ref(), b"seven");
		assert!(archive.resource_exists(tag, 1));
		assert!(!archive.resource_exists(tag, 2));
	}

	#[test]
	fn test_bad_magic() {
		assert!(matches!(
			MohawkArchive::parse(b"NOPE\x00\x00\x00\x00".to_vec()),
			Err(DecodeError::BadMagic { .. })
		));
	}
}
