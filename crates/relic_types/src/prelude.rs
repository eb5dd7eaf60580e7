//! Prelude module for `relic_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use relic_types::prelude::*;
//!
//! // Now you can use all common types directly
//! let fork = ResourceFork::parse(std::fs::read("Game Data.rsrc")?)?;
//! for (type_tag, id) in fork.all_resources() {
//!     println!("{} {id}", fourcc_display(type_tag));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[doc(inline)]
pub use crate::containers::{
	DarkCastleFile, DcmpExecutor, MohawkArchive, Resource, ResourceFork, ResourceSource,
	SingleResource,
};

#[doc(inline)]
pub use crate::decoder::{decode_resource, DecodedResource, DecoderContext};

#[doc(inline)]
pub use crate::error::DecodeError;

#[doc(inline)]
pub use crate::fourcc::{fourcc, fourcc_display, fourcc_filename};

#[doc(inline)]
pub use crate::image::{Image, ImageFormat, Rgba};

#[doc(inline)]
pub use crate::io::{BitReader, BitWriter, ByteReader};

#[doc(inline)]
pub use crate::pe::PeFile;

#[doc(inline)]
pub use crate::quickdraw::color::{Color, Color8, ColorTable, ColorTableEntry};

#[doc(inline)]
pub use crate::quickdraw::{Fixed, Point, Rect};

// Re-export the codec and decoder modules for advanced usage
#[doc(inline)]
pub use crate::{codecs, resources, sprites};
