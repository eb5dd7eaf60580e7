//! Core types and format support for the `relic-rs` project.
//!
//! This crate reads the binary containers of classic Macintosh and
//! early Windows software (resource forks, Mohawk archives, Dark Castle
//! data files, PE32 executables), walks their indexes, and decodes each
//! resource payload into a modern artifact: RGBA images, WAV audio,
//! UTF-8 text, RTF, JSON instrument maps, or 3-D meshes.
//!
//! # Layout
//!
//! - [`io`]: byte and bit readers over in-memory buffers
//! - [`codecs`]: the compression schemes the formats use
//! - [`quickdraw`]: geometry, color tables, raster headers, regions
//! - [`image`]: the RGBA raster and its drawing/output operations
//! - [`containers`]: `(type, id) -> bytes` indexes over the archives
//! - [`resources`]: decoders for the standard Mac resource types
//! - [`sprites`]: decoders for the per-game sprite formats
//! - [`decoder`]: the type-code dispatch tying it all together
//! - [`pe`]: the PE32 executable container
//!
//! # Examples
//!
//! ```rust
//! use relic_types::containers::resource_fork::{build_fork, ResourceFork};
//! use relic_types::containers::ResourceSource;
//! use relic_types::fourcc::fourcc;
//!
//! let bytes = build_fork(&[(fourcc(*b"TEXT"), 128, "greeting", b"Hi!\n")]);
//! let fork = ResourceFork::parse(bytes)?;
//! assert_eq!(fork.get_resource_name(fourcc(*b"TEXT"), 128)?, "greeting");
//! # Ok::<(), relic_types::error::DecodeError>(())
//! ```

pub mod codecs;
pub mod containers;
pub mod decoder;
pub mod error;
pub mod fourcc;
pub mod image;
pub mod io;
pub mod pe;
pub mod prelude;
pub mod quickdraw;
pub mod resources;
pub mod sprites;

// Re-export the types nearly every caller touches
pub use containers::{Resource, ResourceSource};
pub use decoder::{decode_resource, DecodedResource, DecoderContext};
pub use error::DecodeError;
pub use image::{Image, ImageFormat, Rgba};
