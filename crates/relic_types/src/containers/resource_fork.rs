//! Macintosh resource fork parsing.
//!
//! # Layout
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x00 | data segment offset (u32 BE) |
//! | 0x04 | map offset (u32 BE) |
//! | 0x08 | data segment size (u32 BE) |
//! | 0x0C | map size (u32 BE) |
//!
//! The map holds 22 reserved bytes, attributes, then offsets (relative to
//! the map start) of the type list and the name list. Each type-list
//! entry carries a reference-list offset relative to the type list; each
//! reference carries the id, a name-list offset (0xFFFF when unnamed),
//! and a word packing the attribute byte with a 24-bit data offset. Every
//! resource's bytes sit in the data segment behind a u32 length.
//!
//! # Compressed resources
//!
//! A reference whose attribute bit 0x01 is set points at a payload that
//! starts with `{header_len: u16, magic: u16 == 0xA89F, dcmp_id: i16}`.
//! The indicated `dcmp` resource holds 68K code which, executed, yields
//! the decompressed payload. Executing 68K code is outside this crate;
//! callers install a [`DcmpExecutor`] to supply it. Results are cached by
//! `(type, id)` for the life of the fork. A `dcmp` that is itself
//! compressed is refused rather than recursed into.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::containers::{Resource, ResourceSource, RES_ATTR_COMPRESSED};
use crate::error::DecodeError;
use crate::fourcc::{fourcc, fourcc_display};
use crate::io::ByteReader;

/// Compressed-payload signature (first half of the magic word).
const COMPRESSED_MAGIC: u16 = 0xA89F;

/// Resource type holding decompressor code.
pub const TYPE_DCMP: u32 = fourcc(*b"dcmp");

/// Executes a `dcmp` resource's 68K code against a compressed payload.
///
/// Implementations live outside this crate (they need a 68K emulator);
/// the fork only performs the dispatch, the recursion guard, and the
/// caching.
pub trait DcmpExecutor {
	/// Runs `dcmp_code` to decompress `payload` (the bytes after the
	/// compressed-resource header).
	fn decompress(&self, dcmp_code: &[u8], payload: &[u8]) -> Result<Vec<u8>, DecodeError>;
}

#[derive(Debug, Clone)]
struct Entry {
	type_tag: u32,
	id: i16,
	name: String,
	attrs: u8,
	data_offset: usize,
	data_len: usize,
}

/// A parsed resource fork. Owns its buffer; indexed once at
/// construction.
pub struct ResourceFork {
	data: Vec<u8>,
	entries: Vec<Entry>,
	by_key: HashMap<(u32, i16), usize>,
	executor: Option<Box<dyn DcmpExecutor>>,
	decompress_cache: RefCell<HashMap<(u32, i16), Vec<u8>>>,
}

impl std::fmt::Debug for ResourceFork {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResourceFork")
			.field("resources", &self.entries.len())
			.field("bytes", &self.data.len())
			.finish()
	}
}

impl ResourceFork {
	/// Parses a fork from its bytes.
	pub fn parse(data: Vec<u8>) -> Result<Self, DecodeError> {
		let mut entries = Vec::new();
		{
			let mut r = ByteReader::new(&data);
			let data_offset = r.get_u32_be()? as usize;
			let map_offset = r.get_u32_be()? as usize;
			let _data_size = r.get_u32_be()? as usize;
			let _map_size = r.get_u32_be()? as usize;

			let mut map_r = r.sub_from(map_offset)?;
			map_r.skip(22)?; // reserved header copy, handle, file ref num
			let _attributes = map_r.get_u16_be()?;
			let type_list_offset = map_r.get_u16_be()? as usize;
			let name_list_offset = map_r.get_u16_be()? as usize;

			let mut type_r = map_r.sub_from(type_list_offset)?;
			let num_types = type_r.get_u16_be()?.wrapping_add(1) as usize;
			for _ in 0..num_types {
				let type_tag = type_r.get_u32_be()?;
				let num_items = type_r.get_u16_be()? as usize + 1;
				let reference_list_offset = type_r.get_u16_be()? as usize;

				// Reference list offsets are relative to the type list start
				let mut ref_r =
					map_r.sub_from(type_list_offset + reference_list_offset)?;
				for _ in 0..num_items {
					let id = ref_r.get_i16_be()?;
					let name_offset = ref_r.get_u16_be()?;
					let attrs_and_offset = ref_r.get_u32_be()?;
					let _reserved = ref_r.get_u32_be()?;

					let attrs = (attrs_and_offset >> 24) as u8;
					let entry_offset = (attrs_and_offset & 0x00FF_FFFF) as usize;

					let name = if name_offset == 0xFFFF {
						String::new()
					} else {
						let mut name_r =
							map_r.sub_from(name_list_offset + name_offset as usize)?;
						name_r.read_pstring()?
					};

					let mut data_r = r.sub_from(data_offset + entry_offset)?;
					let data_len = data_r.get_u32_be()? as usize;
					if data_r.remaining() < data_len {
						return Err(DecodeError::corrupt_size(format!(
							"resource {}:{id} declares {data_len} bytes, {} present",
							fourcc_display(type_tag),
							data_r.remaining()
						)));
					}

					entries.push(Entry {
						type_tag,
						id,
						name,
						attrs,
						data_offset: data_offset + entry_offset + 4,
						data_len,
					});
				}
			}
		}

		let mut by_key = HashMap::with_capacity(entries.len());
		for (index, entry) in entries.iter().enumerate() {
			by_key.insert((entry.type_tag, entry.id), index);
		}
		Ok(Self {
			data,
			entries,
			by_key,
			executor: None,
			decompress_cache: RefCell::new(HashMap::new()),
		})
	}

	/// Installs the external 68K decompressor hook.
	pub fn set_dcmp_executor(&mut self, executor: Box<dyn DcmpExecutor>) {
		self.executor = Some(executor);
	}

	fn entry(&self, type_tag: u32, id: i16) -> Result<&Entry, DecodeError> {
		self.by_key
			.get(&(type_tag, id))
			.map(|&index| &self.entries[index])
			.ok_or(DecodeError::MissingResource { type_tag, id })
	}

	fn raw_data(&self, entry: &Entry) -> &[u8] {
		&self.data[entry.data_offset..entry.data_offset + entry.data_len]
	}

	/// Returns true if the resource's compressed-attribute bit is set.
	pub fn resource_is_compressed(&self, type_tag: u32, id: i16) -> Result<bool, DecodeError> {
		Ok(self.entry(type_tag, id)?.attrs & RES_ATTR_COMPRESSED != 0)
	}

	/// The resource's attribute byte.
	pub fn resource_attrs(&self, type_tag: u32, id: i16) -> Result<u8, DecodeError> {
		Ok(self.entry(type_tag, id)?.attrs)
	}

	/// Fetches payload bytes, optionally running the `dcmp` dispatch.
	///
	/// With `decompress` false the raw stored bytes come back even for
	/// compressed resources; the length then equals the map entry's
	/// recorded length.
	pub fn resource_data(
		&self,
		type_tag: u32,
		id: i16,
		decompress: bool,
	) -> Result<Cow<'_, [u8]>, DecodeError> {
		let entry = self.entry(type_tag, id)?;
		if !decompress || entry.attrs & RES_ATTR_COMPRESSED == 0 {
			return Ok(Cow::Borrowed(self.raw_data(entry)));
		}

		if let Some(cached) = self.decompress_cache.borrow().get(&(type_tag, id)) {
			return Ok(Cow::Owned(cached.clone()));
		}

		let decompressed = self.decompress_entry(entry)?;
		self.decompress_cache.borrow_mut().insert((type_tag, id), decompressed.clone());
		Ok(Cow::Owned(decompressed))
	}

	fn decompress_entry(&self, entry: &Entry) -> Result<Vec<u8>, DecodeError> {
		let raw = self.raw_data(entry);
		let mut r = ByteReader::new(raw);
		let header_len = r.get_u16_be()? as usize;
		let magic = r.get_u16_be()?;
		if magic != COMPRESSED_MAGIC {
			return Err(DecodeError::BadMagic {
				expected: u32::from(COMPRESSED_MAGIC),
				actual: u32::from(magic),
			});
		}
		r.skip(2)?; // remainder of the magic word
		let dcmp_id = r.get_i16_be()?;
		if header_len > raw.len() {
			return Err(DecodeError::corrupt_size(format!(
				"compressed header length {header_len} exceeds payload of {} bytes",
				raw.len()
			)));
		}

		let dcmp_entry = self.entry(TYPE_DCMP, dcmp_id)?;
		if dcmp_entry.attrs & RES_ATTR_COMPRESSED != 0 {
			// One level of recursion only; a compressed decompressor
			// would need itself to load.
			return Err(DecodeError::corrupt_size(format!(
				"dcmp {dcmp_id} is itself compressed"
			)));
		}
		let dcmp_code = self.raw_data(dcmp_entry);

		let executor = self.executor.as_ref().ok_or_else(|| {
			DecodeError::unsupported(format!(
				"resource is compressed (dcmp {dcmp_id}) and no 68K executor is installed"
			))
		})?;
		executor.decompress(dcmp_code, &raw[header_len..])
	}
}

impl ResourceSource for ResourceFork {
	fn all_resources(&self) -> Vec<(u32, i16)> {
		self.entries.iter().map(|e| (e.type_tag, e.id)).collect()
	}

	fn resource_exists(&self, type_tag: u32, id: i16) -> bool {
		self.by_key.contains_key(&(type_tag, id))
	}

	fn get_resource_data(&self, type_tag: u32, id: i16) -> Result<Cow<'_, [u8]>, DecodeError> {
		self.resource_data(type_tag, id, true)
	}

	fn get_resource_name(&self, type_tag: u32, id: i16) -> Result<&str, DecodeError> {
		Ok(&self.entry(type_tag, id)?.name)
	}

	fn get_resource(&self, type_tag: u32, id: i16) -> Result<Resource, DecodeError> {
		let entry = self.entry(type_tag, id)?;
		Ok(Resource {
			type_tag,
			id,
			name: entry.name.clone(),
			attrs: entry.attrs,
			data: self.resource_data(type_tag, id, true)?.into_owned(),
		})
	}
}

/// Builds a synthetic single-type resource fork; test and tool helper.
#[must_use]
pub fn build_fork(resources: &[(u32, i16, &str, &[u8])]) -> Vec<u8> {
	build_fork_with_attrs(
		&resources
			.iter()
			.map(|&(t, id, name, data)| (t, id, name, 0u8, data))
			.collect::<Vec<_>>(),
	)
}

/// Like [`build_fork`] but with explicit attribute bytes.
#[must_use]
pub fn build_fork_with_attrs(resources: &[(u32, i16, &str, u8, &[u8])]) -> Vec<u8> {
	// Data segment
	let mut data_segment = Vec::new();
	let mut data_offsets = Vec::new();
	for &(_, _, _, _, payload) in resources {
		data_offsets.push(data_segment.len());
		data_segment.extend_from_slice(&(payload.len() as u32).to_be_bytes());
		data_segment.extend_from_slice(payload);
	}

	// Name list
	let mut name_list = Vec::new();
	let mut name_offsets = Vec::new();
	for &(_, _, name, _, _) in resources {
		if name.is_empty() {
			name_offsets.push(0xFFFFu16);
		} else {
			name_offsets.push(name_list.len() as u16);
			name_list.push(name.len() as u8);
			name_list.extend_from_slice(name.as_bytes());
		}
	}

	// Group by type, preserving first-seen order
	let mut types: Vec<u32> = Vec::new();
	for &(t, _, _, _, _) in resources {
		if !types.contains(&t) {
			types.push(t);
		}
	}

	let type_list_len = 2 + types.len() * 8;
	let mut type_list = Vec::new();
	type_list.extend_from_slice(&((types.len() as u16).wrapping_sub(1)).to_be_bytes());
	let mut reference_lists = Vec::new();
	for &t in &types {
		let members: Vec<usize> = (0..resources.len()).filter(|&i| resources[i].0 == t).collect();
		let ref_offset = type_list_len + reference_lists.len();
		type_list.extend_from_slice(&t.to_be_bytes());
		type_list.extend_from_slice(&((members.len() as u16) - 1).to_be_bytes());
		type_list.extend_from_slice(&(ref_offset as u16).to_be_bytes());
		for i in members {
			let (_, id, _, attrs, _) = resources[i];
			reference_lists.extend_from_slice(&id.to_be_bytes());
			reference_lists.extend_from_slice(&name_offsets[i].to_be_bytes());
			let attrs_and_offset = (u32::from(attrs) << 24) | (data_offsets[i] as u32);
			reference_lists.extend_from_slice(&attrs_and_offset.to_be_bytes());
			reference_lists.extend_from_slice(&[0; 4]);
		}
	}

	// Map: 28-byte header, type list, reference lists, name list
	let map_header_len = 28;
	let type_list_offset = map_header_len;
	let name_list_offset = type_list_offset + type_list.len() + reference_lists.len();

	let data_offset = 16usize;
	let map_offset = data_offset + data_segment.len();

	let mut out = Vec::new();
	out.extend_from_slice(&(data_offset as u32).to_be_bytes());
	out.extend_from_slice(&(map_offset as u32).to_be_bytes());
	out.extend_from_slice(&(data_segment.len() as u32).to_be_bytes());
	out.extend_from_slice(
		&((map_header_len + type_list.len() + reference_lists.len() + name_list.len()) as u32)
			.to_be_bytes(),
	);
	out.extend_from_slice(&data_segment);
	out.extend_from_slice(&[0; 22]); // reserved map header fields
	out.extend_from_slice(&0u16.to_be_bytes()); // map attributes
	out.extend_from_slice(&(type_list_offset as u16).to_be_bytes());
	out.extend_from_slice(&(name_list_offset as u16).to_be_bytes());
	out.extend_from_slice(&type_list);
	out.extend_from_slice(&reference_lists);
	out.extend_from_slice(&name_list);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	const TYPE_TEXT: u32 = fourcc(*b"TEXT");

	#[test]
	fn test_synthetic_fork_index() {
		let fork_bytes = build_fork(&[(TYPE_TEXT, 128, "hello", b"Hi!\n")]);
		let fork = ResourceFork::parse(fork_bytes).unwrap();

		assert_eq!(fork.all_resources(), vec![(0x5445_5854, 128)]);
		assert_eq!(fork.get_resource_data(TYPE_TEXT, 128).unwrap().as_ref(), b"Hi!\n");
		assert_eq!(fork.get_resource_name(TYPE_TEXT, 128).unwrap(), "hello");
		assert!(!fork.resource_is_compressed(TYPE_TEXT, 128).unwrap());
		assert!(matches!(
			fork.get_resource_data(TYPE_TEXT, 129),
			Err(DecodeError::MissingResource { .. })
		));
	}

	#[test]
	fn test_enumeration_matches_per_type_walk() {
		let fork_bytes = build_fork(&[
			(TYPE_TEXT, 128, "", b"a"),
			(TYPE_TEXT, 200, "", b"b"),
			(fourcc(*b"PICT"), 1, "", b"c"),
		]);
		let fork = ResourceFork::parse(fork_bytes).unwrap();

		let mut by_walk = Vec::new();
		for t in fork.all_types() {
			for id in fork.all_resources_of_type(t) {
				by_walk.push((t, id));
			}
		}
		let mut all = fork.all_resources();
		all.sort_unstable();
		by_walk.sort_unstable();
		assert_eq!(all, by_walk);
	}

	#[test]
	fn test_raw_length_matches_map_entry() {
		let payload = vec![0xAB; 137];
		let fork_bytes = build_fork(&[(TYPE_TEXT, 1, "", &payload)]);
		let fork = ResourceFork::parse(fork_bytes).unwrap();
		assert_eq!(fork.resource_data(TYPE_TEXT, 1, false).unwrap().len(), 137);
	}

	struct UpperCaser;
	impl DcmpExecutor for UpperCaser {
		fn decompress(&self, _code: &[u8], payload: &[u8]) -> Result<Vec<u8>, DecodeError> {
			Ok(payload.to_ascii_uppercase())
		}
	}

	fn compressed_payload(dcmp_id: i16, body: &[u8]) -> Vec<u8> {
		let mut v = Vec::new();
		v.extend_from_slice(&8u16.to_be_bytes()); // header length
		v.extend_from_slice(&COMPRESSED_MAGIC.to_be_bytes());
		v.extend_from_slice(&[0x65, 0x72]); // rest of magic word
		v.extend_from_slice(&dcmp_id.to_be_bytes());
		v.extend_from_slice(body);
		v
	}

	#[test]
	fn test_compressed_resource_dispatch() {
		let payload = compressed_payload(2, b"abc");
		let fork_bytes = build_fork_with_attrs(&[
			(TYPE_TEXT, 5, "", RES_ATTR_COMPRESSED, &payload),
			(TYPE_DCMP, 2, "", 0, b"\x4E\x75"), // rts
		]);
		let mut fork = ResourceFork::parse(fork_bytes).unwrap();

		// Without an executor the fetch is Unsupported, raw still works
		assert!(matches!(
			fork.get_resource_data(TYPE_TEXT, 5),
			Err(DecodeError::Unsupported(_))
		));
		assert_eq!(fork.resource_data(TYPE_TEXT, 5, false).unwrap().len(), payload.len());

		fork.set_dcmp_executor(Box::new(UpperCaser));
		assert_eq!(fork.get_resource_data(TYPE_TEXT, 5).unwrap().as_ref(), b"ABC");
		// Second fetch comes from the cache
		assert_eq!(fork.get_resource_data(TYPE_TEXT, 5).unwrap().as_ref(), b"ABC");
	}

	#[test]
	fn test_compressed_dcmp_is_refused() {
		let payload = compressed_payload(2, b"abc");
		let dcmp_payload = compressed_payload(2, b"code");
		let fork_bytes = build_fork_with_attrs(&[
			(TYPE_TEXT, 5, "", RES_ATTR_COMPRESSED, &payload),
			(TYPE_DCMP, 2, "", RES_ATTR_COMPRESSED, &dcmp_payload),
		]);
		let mut fork = ResourceFork::parse(fork_bytes).unwrap();
		fork.set_dcmp_executor(Box::new(UpperCaser));
		assert!(matches!(
			fork.get_resource_data(TYPE_TEXT, 5),
			Err(DecodeError::CorruptSize(_))
		));
	}
}
