//! Per-game sprite format decoders.
//!
//! Each module owns one game's opcode interpreter and composites into an
//! [`crate::image::Image`] through the shared palette and raster
//! primitives. All decoders are pure: bytes (plus an optional color
//! table) in, owned images out.

pub mod ambrosia;
pub mod blobbo;
pub mod dark_castle;
pub mod dino_park;
pub mod factory;
pub mod greebles;
pub mod presage;
pub mod prince2;
pub mod shpd;
pub mod sim_city;
pub mod spectre;
pub mod step_on_it;
pub mod swamp_gas;
pub mod the_zone;

use crate::error::DecodeError;
use crate::quickdraw::color::{Color8, ColorTable};

/// Looks up a color table entry for a sprite pixel, with the error most
/// decoders want when the entry is missing.
pub(crate) fn clut_color(clut: &ColorTable, index: u8) -> Result<Color8, DecodeError> {
	clut.get_color8(u16::from(index)).ok_or_else(|| {
		DecodeError::out_of_bounds(format!("color id {index} not present in color table"))
	})
}

/// Errors for decoders that require a palette and were given none.
pub(crate) fn require_clut(clut: &ColorTable) -> Result<(), DecodeError> {
	if clut.is_empty() {
		return Err(DecodeError::MissingResource {
			type_tag: crate::fourcc::fourcc(*b"clut"),
			id: 0,
		});
	}
	Ok(())
}
