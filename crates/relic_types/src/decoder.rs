//! Central resource dispatch: four-byte type code in, typed artifact
//! out.
//!
//! [`decode_resource`] routes a resource to its decoder and returns a
//! [`DecodedResource`]. Decoders that need collaborators get them from
//! the [`DecoderContext`]: a palette (either passed in or found as a
//! companion `clut`/`pltt`/`CTBL` resource with the same id), the
//! external PICT renderer, and the external 68K blitter executor.

use crate::containers::ResourceSource;
use crate::error::DecodeError;
use crate::fourcc::fourcc;
use crate::image::Image;
use crate::quickdraw::color::ColorTable;
use crate::resources::pict::PictDelegate;
use crate::resources::{icons, patterns, pict, song, sound, text};
use crate::sprites::the_zone::SpriteBlitter;
use crate::sprites::{
	ambrosia, blobbo, dark_castle, dino_park, factory, greebles, presage, prince2, sim_city,
	spectre, step_on_it, swamp_gas, the_zone,
};

/// A decoded artifact.
#[derive(Debug)]
pub enum DecodedResource {
	/// A single image
	Image(Image),
	/// A set of images (sprite sheets, icon lists)
	Images(Vec<Image>),
	/// An indexed color table
	ColorTable(ColorTable),
	/// A RIFF WAVE byte stream
	Wav(Vec<u8>),
	/// Plain UTF-8 text
	Text(String),
	/// An RTF document
	Rtf(String),
	/// A JSON document
	Json(String),
	/// A 3-D mesh
	Mesh(spectre::DecodedShap3d),
}

/// External collaborators and options for [`decode_resource`].
#[derive(Default)]
pub struct DecoderContext<'a> {
	/// Palette override; when absent, a companion color table resource
	/// with the same id is used if one exists
	pub clut: Option<&'a ColorTable>,
	/// External PICT renderer
	pub pict_delegate: Option<&'a dyn PictDelegate>,
	/// External 68K blitter executor for `Spri`
	pub sprite_blitter: Option<&'a dyn SpriteBlitter>,
	/// `HrSp` header size; 0x10 in every game seen so far
	pub hrsp_header_size: Option<usize>,
}

const TYPE_PICT: u32 = fourcc(*b"PICT");
const TYPE_CICN: u32 = fourcc(*b"cicn");
const TYPE_CURS: u32 = fourcc(*b"CURS");
const TYPE_CRSR: u32 = fourcc(*b"crsr");
const TYPE_ICL8: u32 = fourcc(*b"icl8");
const TYPE_ICS8: u32 = fourcc(*b"ics8");
const TYPE_ICL4: u32 = fourcc(*b"icl4");
const TYPE_ICS4: u32 = fourcc(*b"ics4");
const TYPE_ICNN: u32 = fourcc(*b"ICN#");
const TYPE_ICSN: u32 = fourcc(*b"ics#");
const TYPE_ICON: u32 = fourcc(*b"ICON");
const TYPE_SICN: u32 = fourcc(*b"SICN");
const TYPE_PAT: u32 = fourcc(*b"PAT ");
const TYPE_PATN: u32 = fourcc(*b"PAT#");
const TYPE_PPAT: u32 = fourcc(*b"ppat");
const TYPE_PPTN: u32 = fourcc(*b"ppt#");
const TYPE_PLTT: u32 = fourcc(*b"pltt");
const TYPE_PLTT_UC: u32 = fourcc(*b"PLTT");
const TYPE_CLUT: u32 = fourcc(*b"clut");
const TYPE_CTBL: u32 = fourcc(*b"CTBL");
const TYPE_SND: u32 = fourcc(*b"snd ");
const TYPE_TWAV: u32 = fourcc(*b"tWAV");
const TYPE_SONG: u32 = fourcc(*b"SONG");
const TYPE_STR: u32 = fourcc(*b"STR ");
const TYPE_STRN: u32 = fourcc(*b"STR#");
const TYPE_TEXT: u32 = fourcc(*b"TEXT");
const TYPE_STYL: u32 = fourcc(*b"styl");

const TYPE_BTSP: u32 = fourcc(*b"btSP");
const TYPE_HRSP: u32 = fourcc(*b"HrSp");
const TYPE_SPRD: u32 = fourcc(*b"SprD");
const TYPE_DC2: u32 = fourcc(*b"DC2 ");
const TYPE_PPCT: u32 = fourcc(*b"PPCT");
const TYPE_PSCR: u32 = fourcc(*b"PSCR");
const TYPE_PBLK: u32 = fourcc(*b"PBLK");
const TYPE_SHAP: u32 = fourcc(*b"SHAP");
const TYPE_SHPD: u32 = fourcc(*b"SHPD");
const TYPE_SPRT: u32 = fourcc(*b"SPRT");
const TYPE_SSSF: u32 = fourcc(*b"sssf");
const TYPE_SPRI: u32 = fourcc(*b"Spri");
const TYPE_PPIC: u32 = fourcc(*b"PPic");
const TYPE_PPSS: u32 = fourcc(*b"PPSS");
const TYPE_PAK: u32 = fourcc(*b"Pak ");
const TYPE_GSIF: u32 = fourcc(*b"GSIF");
const TYPE_BMAP: u32 = fourcc(*b"BMap");
const TYPE_XMAP: u32 = fourcc(*b"XMap");
const TYPE_XBIG: u32 = fourcc(*b"XBig");
const TYPE_1IMG: u32 = fourcc(*b"1img");
const TYPE_4IMG: u32 = fourcc(*b"4img");
const TYPE_8IMG: u32 = fourcc(*b"8img");
const TYPE_BTMP: u32 = fourcc(*b"BTMP");
const TYPE_PMP8: u32 = fourcc(*b"PMP8");
const TYPE_SHAP_3D: u32 = fourcc(*b"shap");

/// Returns true when [`decode_resource`] has a decoder for the type.
#[must_use]
pub fn is_decodable(type_tag: u32) -> bool {
	matches!(
		type_tag,
		TYPE_PICT
			| TYPE_CICN | TYPE_CURS | TYPE_CRSR | TYPE_ICL8 | TYPE_ICS8 | TYPE_ICL4
			| TYPE_ICS4 | TYPE_ICNN | TYPE_ICSN | TYPE_ICON | TYPE_SICN | TYPE_PAT
			| TYPE_PATN | TYPE_PPAT | TYPE_PPTN | TYPE_PLTT | TYPE_PLTT_UC | TYPE_CLUT
			| TYPE_CTBL | TYPE_SND | TYPE_TWAV | TYPE_SONG | TYPE_STR | TYPE_STRN
			| TYPE_TEXT | TYPE_STYL | TYPE_BTSP | TYPE_HRSP | TYPE_SPRD | TYPE_DC2
			| TYPE_PPCT | TYPE_PSCR | TYPE_PBLK | TYPE_SHAP | TYPE_SHPD | TYPE_SPRT
			| TYPE_SSSF | TYPE_SPRI | TYPE_PPIC | TYPE_PPSS | TYPE_PAK | TYPE_GSIF
			| TYPE_BMAP | TYPE_XMAP | TYPE_XBIG | TYPE_1IMG | TYPE_4IMG | TYPE_8IMG
			| TYPE_BTMP | TYPE_PMP8 | TYPE_SHAP_3D
	)
}

/// Resolves the palette for a sprite decode: the context's override, a
/// companion color table resource with the same id, or an empty table
/// (for decoders that can run without one).
fn effective_clut(
	source: &dyn ResourceSource,
	ctx: &DecoderContext<'_>,
	id: i16,
) -> Result<ColorTable, DecodeError> {
	if let Some(clut) = ctx.clut {
		return Ok(clut.clone());
	}
	for companion in [TYPE_CLUT, TYPE_PLTT, TYPE_CTBL] {
		if source.resource_exists(companion, id) {
			let data = source.get_resource_data(companion, id)?;
			return match companion {
				TYPE_PLTT => crate::quickdraw::color::parse_pltt(&data),
				_ => ColorTable::parse(&mut crate::io::ByteReader::new(&data)),
			};
		}
	}
	Ok(ColorTable::from_entries(Vec::new()))
}

/// Decodes one resource from `source` into a typed artifact.
pub fn decode_resource(
	source: &dyn ResourceSource,
	type_tag: u32,
	id: i16,
	ctx: &DecoderContext<'_>,
) -> Result<DecodedResource, DecodeError> {
	let data = source.get_resource_data(type_tag, id)?;
	let data = data.as_ref();

	match type_tag {
		TYPE_PICT => Ok(DecodedResource::Image(pict::decode_pict(data, ctx.pict_delegate)?)),

		TYPE_CICN => Ok(DecodedResource::Image(icons::decode_cicn(data)?.image)),
		TYPE_CURS => Ok(DecodedResource::Image(icons::decode_curs(data)?.bitmap)),
		TYPE_CRSR => Ok(DecodedResource::Image(icons::decode_crsr(data)?.image)),
		TYPE_ICL8 => Ok(DecodedResource::Image(icons::decode_icl8(data)?)),
		TYPE_ICS8 => Ok(DecodedResource::Image(icons::decode_ics8(data)?)),
		TYPE_ICL4 => Ok(DecodedResource::Image(icons::decode_icl4(data)?)),
		TYPE_ICS4 => Ok(DecodedResource::Image(icons::decode_ics4(data)?)),
		TYPE_ICNN => Ok(DecodedResource::Image(icons::decode_icnn(data)?)),
		TYPE_ICSN => Ok(DecodedResource::Image(icons::decode_icsn(data)?)),
		TYPE_ICON => Ok(DecodedResource::Image(icons::decode_icon(data)?)),
		TYPE_SICN => Ok(DecodedResource::Images(icons::decode_sicn(data)?)),

		TYPE_PAT => Ok(DecodedResource::Image(patterns::decode_pat(data)?)),
		TYPE_PATN => Ok(DecodedResource::Images(patterns::decode_patn(data)?)),
		TYPE_PPAT => Ok(DecodedResource::Image(patterns::decode_ppat(data)?.image)),
		TYPE_PPTN => Ok(DecodedResource::Images(
			patterns::decode_pptn(data)?.into_iter().map(|p| p.image).collect(),
		)),

		TYPE_CLUT | TYPE_CTBL => Ok(DecodedResource::ColorTable(ColorTable::parse(
			&mut crate::io::ByteReader::new(data),
		)?)),
		TYPE_PLTT | TYPE_PLTT_UC => {
			Ok(DecodedResource::ColorTable(crate::quickdraw::color::parse_pltt(data)?))
		}

		TYPE_SND => Ok(DecodedResource::Wav(sound::decode_snd(data)?)),
		TYPE_TWAV => Ok(DecodedResource::Wav(
			crate::resources::mohawk_sound::decode_mohawk_snd(data)?,
		)),
		TYPE_SONG => {
			let decoded = song::decode_song(source, data, |tag, res_id, ext| {
				format!("{}_{res_id}.{ext}", crate::fourcc::fourcc_filename(tag))
			})?;
			Ok(DecodedResource::Json(song::song_to_json(&decoded)?))
		}

		TYPE_TEXT => Ok(DecodedResource::Text(text::decode_text(data))),
		TYPE_STR => Ok(DecodedResource::Text(text::decode_str(data)?.0)),
		TYPE_STRN => Ok(DecodedResource::Text(text::decode_strn(data)?.join("\n"))),
		TYPE_STYL => {
			let companion = source.get_resource_data(TYPE_TEXT, id)?;
			Ok(DecodedResource::Rtf(text::decode_styl(data, &companion)?))
		}

		TYPE_DC2 => Ok(DecodedResource::Image(dark_castle::decode_dc2(data)?)),
		TYPE_PPCT => Ok(DecodedResource::Image(dark_castle::decode_ppct(data)?)),
		TYPE_PSCR => {
			// Both packers shipped under the same tag; try the newer one
			// first
			match dark_castle::decode_pscr(data, true) {
				Ok(img) => Ok(DecodedResource::Image(img)),
				Err(_) => Ok(DecodedResource::Image(dark_castle::decode_pscr(data, false)?)),
			}
		}
		TYPE_PBLK => Ok(DecodedResource::Image(dark_castle::decode_pblk(data)?)),

		TYPE_BTSP => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Image(ambrosia::decode_btsp(data, &clut)?))
		}
		TYPE_HRSP => {
			let clut = effective_clut(source, ctx, id)?;
			let header_size = ctx.hrsp_header_size.unwrap_or(0x10);
			Ok(DecodedResource::Image(ambrosia::decode_hrsp(data, &clut, header_size)?))
		}
		TYPE_SPRD => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Images(ambrosia::decode_sprd(data, &clut)?))
		}

		TYPE_SHAP => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Image(prince2::decode_shap(data, &clut)?))
		}
		TYPE_SHPD => Err(DecodeError::unsupported(
			"SHPD collections span the data fork; decode via sprites::shpd".to_string(),
		)),
		TYPE_SPRT => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Images(sim_city::decode_sprt(data, &clut)?))
		}
		TYPE_SSSF => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Images(step_on_it::decode_sssf(data, &clut)?))
		}
		TYPE_SPRI => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Image(the_zone::decode_spri(
				data,
				&clut,
				ctx.sprite_blitter,
			)?))
		}
		TYPE_PPIC => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Images(swamp_gas::decode_ppic(data, &clut)?))
		}
		TYPE_PPSS => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Images(presage::decode_ppss(data, &clut)?))
		}
		TYPE_PAK => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Images(presage::decode_pak(data, &clut)?))
		}
		TYPE_GSIF => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Image(greebles::decode_gsif(data, &clut)?))
		}

		TYPE_BMAP => Ok(DecodedResource::Image(dino_park::decode_bmap(data)?)),
		TYPE_XMAP => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Image(dino_park::decode_xmap(data, &clut)?))
		}
		TYPE_XBIG => Ok(DecodedResource::Images(dino_park::decode_xbig(data)?)),

		TYPE_1IMG => Ok(DecodedResource::Image(factory::decode_1img(data)?)),
		TYPE_4IMG => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Image(factory::decode_4img(data, &clut)?))
		}
		TYPE_8IMG => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Image(factory::decode_8img(data, &clut)?))
		}

		TYPE_BTMP => Ok(DecodedResource::Image(blobbo::decode_btmp(data)?)),
		TYPE_PMP8 => {
			let clut = effective_clut(source, ctx, id)?;
			Ok(DecodedResource::Image(blobbo::decode_pmp8(data, &clut)?))
		}

		TYPE_SHAP_3D => Ok(DecodedResource::Mesh(spectre::decode_shap_3d(data)?)),

		other => Err(DecodeError::unsupported(format!(
			"no decoder for type {}",
			crate::fourcc::fourcc_display(other)
		))),
	}
}
