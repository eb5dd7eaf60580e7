//! Decoders for the standard Macintosh resource types.
//!
//! Everything here decodes one resource payload into a modern artifact:
//! an [`crate::image::Image`], WAV bytes, UTF-8 text, RTF, or JSON. The
//! per-game sprite formats live in [`crate::sprites`]; the dispatch that
//! routes a four-byte type code to the right decoder is
//! [`crate::decoder`].

pub mod icons;
pub mod mohawk_sound;
pub mod patterns;
pub mod pict;
pub mod song;
pub mod sound;
pub mod system_cluts;
pub mod text;
