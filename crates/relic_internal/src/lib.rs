//! Internal crate for `relic-rs`.
//!
//! This module is separated into its own crate to enable simple dynamic linking for `relic-rs`,
//! and should not be used directly.
//!
//! # Examples
//!
//! ```rust
//! use relic_internal::prelude::*;
//!
//! // All commonly used types are available
//! let img = Image::new(16, 16).unwrap();
//! let reader = ByteReader::new(&[0u8; 4]);
//! assert_eq!((img.width(), reader.remaining()), (16, 4));
//! ```

/// `use relic_internal::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export relic_types for convenience
pub use relic_types;
