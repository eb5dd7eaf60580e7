//! Prelude module for `relic_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use relic_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let mut img = Image::new_with_alpha(32, 32).unwrap();
//! img.write(0, 0, Rgba::WHITE).unwrap();
//! ```

// Re-export everything from relic_types::prelude
#[doc(inline)]
pub use relic_types::prelude::*;

// Re-export the entire relic_types module for advanced usage
#[doc(inline)]
pub use relic_types;
