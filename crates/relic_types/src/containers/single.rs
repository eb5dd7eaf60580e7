//! A synthetic container wrapping one loose resource.
//!
//! Useful when a payload arrives outside any container (a file extracted
//! earlier, a Dark Castle `snd ` entry) but a decoder wants the
//! container surface.

use std::borrow::Cow;

use crate::containers::ResourceSource;
use crate::error::DecodeError;

/// A container holding exactly one resource.
#[derive(Debug, Clone)]
pub struct SingleResource {
	type_tag: u32,
	id: i16,
	data: Vec<u8>,
}

impl SingleResource {
	/// Wraps a payload as `(type_tag, id)`.
	#[must_use]
	pub fn new(type_tag: u32, id: i16, data: Vec<u8>) -> Self {
		Self { type_tag, id, data }
	}
}

impl ResourceSource for SingleResource {
	fn all_resources(&self) -> Vec<(u32, i16)> {
		vec![(self.type_tag, self.id)]
	}

	fn resource_exists(&self, type_tag: u32, id: i16) -> bool {
		type_tag == self.type_tag && id == self.id
	}

	fn get_resource_data(&self, type_tag: u32, id: i16) -> Result<Cow<'_, [u8]>, DecodeError> {
		if !self.resource_exists(type_tag, id) {
			return Err(DecodeError::MissingResource { type_tag, id });
		}
		Ok(Cow::Borrowed(&self.data))
	}

	fn get_resource_name(&self, _type_tag: u32, _id: i16) -> Result<&str, DecodeError> {
		Ok("")
	}
}
