//! Container formats: anything that maps `(type, id)` to resource bytes.
//!
//! Three real layouts are supported: the Macintosh resource fork
//! ([`resource_fork::ResourceFork`]), the Mohawk archive
//! ([`mohawk::MohawkArchive`]), and the Dark Castle data file
//! ([`dark_castle::DarkCastleFile`]). [`single::SingleResource`] wraps a
//! lone payload so decoders that expect a container can run on loose
//! files.
//!
//! Containers index their buffer once at construction and are immutable
//! afterwards; decompression of compressed fork resources is lazy and
//! happens on fetch.

pub mod dark_castle;
pub mod mohawk;
pub mod resource_fork;
pub mod single;

pub use dark_castle::DarkCastleFile;
pub use mohawk::MohawkArchive;
pub use resource_fork::{DcmpExecutor, ResourceFork};
pub use single::SingleResource;

use std::borrow::Cow;

use crate::error::DecodeError;

/// One resource: its identity, metadata, and payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
	/// Four-byte type code
	pub type_tag: u32,
	/// Resource id
	pub id: i16,
	/// Name from the container's name table; empty when unnamed
	pub name: String,
	/// Attribute byte; bit 0x01 marks a compressed payload
	pub attrs: u8,
	/// Payload bytes (decompressed where applicable)
	pub data: Vec<u8>,
}

/// Attribute bit marking a payload that must run through a `dcmp`.
pub const RES_ATTR_COMPRESSED: u8 = 0x01;

/// Common lookup surface over every container kind.
///
/// Decoders that resolve cross-references (a `SONG`'s instruments, a
/// `SHPD`'s offset table) take `&dyn ResourceSource` so they work against
/// any container.
pub trait ResourceSource {
	/// Every `(type, id)` pair in the container, in index order.
	fn all_resources(&self) -> Vec<(u32, i16)>;

	/// Fetches a resource's payload. Compressed resources are
	/// decompressed.
	fn get_resource_data(&self, type_tag: u32, id: i16) -> Result<Cow<'_, [u8]>, DecodeError>;

	/// The resource's name; empty when the container stores none.
	fn get_resource_name(&self, type_tag: u32, id: i16) -> Result<&str, DecodeError>;

	/// Returns true if the container holds the given resource.
	fn resource_exists(&self, type_tag: u32, id: i16) -> bool {
		self.all_resources().contains(&(type_tag, id))
	}

	/// Every distinct type in the container, in first-seen order.
	fn all_types(&self) -> Vec<u32> {
		let mut types = Vec::new();
		for (type_tag, _) in self.all_resources() {
			if !types.contains(&type_tag) {
				types.push(type_tag);
			}
		}
		types
	}

	/// All ids of a given type, in index order.
	fn all_resources_of_type(&self, type_tag: u32) -> Vec<i16> {
		self.all_resources()
			.into_iter()
			.filter_map(|(t, id)| (t == type_tag).then_some(id))
			.collect()
	}

	/// Fetches a full [`Resource`] (payload plus metadata).
	fn get_resource(&self, type_tag: u32, id: i16) -> Result<Resource, DecodeError> {
		let data = self.get_resource_data(type_tag, id)?.into_owned();
		let name = self.get_resource_name(type_tag, id)?.to_string();
		Ok(Resource { type_tag, id, name, attrs: 0, data })
	}
}
