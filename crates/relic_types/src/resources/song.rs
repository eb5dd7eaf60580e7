//! `SONG` and `INST` decoding to a JSON instrument map.
//!
//! A SoundMusicSys `SONG` names a MIDI sequence resource and optionally
//! overrides MIDI program numbers with `INST` resources. Each `INST`
//! points at a base `snd ` plus key regions mapping note ranges to
//! further `snd ` resources. The decoded artifact is a JSON document a
//! modern synth harness can consume, referencing the WAV files the
//! `snd ` decoder produces.

use serde::Serialize;

use crate::containers::ResourceSource;
use crate::error::DecodeError;
use crate::fourcc::fourcc;
use crate::io::ByteReader;

/// `'INST'`
pub const TYPE_INST: u32 = fourcc(*b"INST");
/// `'MIDI'`; `'Midi'` and `'midi'` also occur in the wild
pub const TYPE_MIDI: u32 = fourcc(*b"MIDI");

/// The MIDI type variants seen in shipping files.
pub const MIDI_TYPES: [u32; 3] = [TYPE_MIDI, fourcc(*b"Midi"), fourcc(*b"midi")];

/// One key region of an instrument.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KeyRegion {
	/// Lowest MIDI key this region covers
	pub key_low: u8,
	/// Highest MIDI key this region covers
	pub key_high: u8,
	/// MIDI key at which the sample plays un-transposed
	pub base_note: u8,
	/// `snd ` resource holding the sample
	pub snd_id: i16,
	/// Filename of the decoded sample
	pub snd_filename: String,
}

/// One decoded instrument.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Instrument {
	/// Instrument id (MIDI program or `INST` resource id)
	pub id: u16,
	/// Key regions in file order
	pub regions: Vec<KeyRegion>,
}

/// The decoded song environment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DecodedSong {
	/// Always "MIDI"
	pub sequence_type: &'static str,
	/// Resource id of the MIDI sequence
	pub midi_id: i16,
	/// Filename the MIDI sequence is exported under
	pub sequence_filename: String,
	/// Instruments referenced by the song
	pub instruments: Vec<Instrument>,
}

/// Parses an `INST` resource.
///
/// Layout: base `snd ` id (i16), base note (u8), flags (u8), two
/// modifier parameter bytes, then a u16 region count and 6-byte regions
/// `{key_low, key_high, base_note, pad, snd_id}`. A region count of zero
/// means the base sample covers the whole keyboard.
pub fn decode_inst(
	data: &[u8],
	name_for_snd: impl Fn(i16) -> String,
) -> Result<Vec<KeyRegion>, DecodeError> {
	let mut r = ByteReader::new(data);
	let base_snd_id = r.get_i16_be()?;
	let base_note = r.get_u8()?;
	let _flags = r.get_u8()?;
	r.skip(2)?; // sample modifier parameters
	let num_regions = r.get_u16_be()? as usize;

	let mut regions = Vec::with_capacity(num_regions.max(1));
	if num_regions == 0 {
		regions.push(KeyRegion {
			key_low: 0,
			key_high: 0x7F,
			base_note,
			snd_id: base_snd_id,
			snd_filename: name_for_snd(base_snd_id),
		});
	}
	for _ in 0..num_regions {
		let key_low = r.get_u8()?;
		let key_high = r.get_u8()?;
		let region_base_note = r.get_u8()?;
		r.skip(1)?;
		let snd_id = r.get_i16_be()?;
		regions.push(KeyRegion {
			key_low,
			key_high,
			base_note: region_base_note,
			snd_id,
			snd_filename: name_for_snd(snd_id),
		});
	}
	Ok(regions)
}

/// Decodes a `SONG` against its container.
///
/// Layout: MIDI resource id (i16), ten reserved bytes, then a u16
/// override count and `(midi_program: u16, inst_id: i16)` pairs. With no
/// overrides, every `INST` in the container is included (keyed by its
/// resource id); with overrides, only the named instruments are.
pub fn decode_song(
	source: &dyn ResourceSource,
	data: &[u8],
	name_for_resource: impl Fn(u32, i16, &str) -> String,
) -> Result<DecodedSong, DecodeError> {
	let mut r = ByteReader::new(data);
	let midi_id = r.get_i16_be()?;
	r.skip(10)?; // tempo bias, filter and reverb settings
	let num_overrides = r.get_u16_be()? as usize;
	let mut overrides = Vec::with_capacity(num_overrides);
	for _ in 0..num_overrides {
		let midi_program = r.get_u16_be()?;
		let inst_id = r.get_i16_be()?;
		overrides.push((midi_program, inst_id));
	}

	let midi_type = MIDI_TYPES
		.iter()
		.copied()
		.find(|&t| source.resource_exists(t, midi_id))
		.ok_or(DecodeError::MissingResource { type_tag: TYPE_MIDI, id: midi_id })?;

	let name_for_snd = |id: i16| name_for_resource(fourcc(*b"snd "), id, "wav");

	let mut instruments = Vec::new();
	if overrides.is_empty() {
		for inst_id in source.all_resources_of_type(TYPE_INST) {
			let inst_data = source.get_resource_data(TYPE_INST, inst_id)?;
			instruments.push(Instrument {
				id: inst_id as u16,
				regions: decode_inst(&inst_data, name_for_snd)?,
			});
		}
	} else {
		for (midi_program, inst_id) in overrides {
			let inst_data = source.get_resource_data(TYPE_INST, inst_id)?;
			instruments.push(Instrument {
				id: midi_program,
				regions: decode_inst(&inst_data, name_for_snd)?,
			});
		}
	}

	Ok(DecodedSong {
		sequence_type: "MIDI",
		midi_id,
		sequence_filename: name_for_resource(midi_type, midi_id, "midi"),
		instruments,
	})
}

/// Serializes a decoded song as pretty JSON.
pub fn song_to_json(song: &DecodedSong) -> Result<String, DecodeError> {
	serde_json::to_string_pretty(song)
		.map_err(|e| DecodeError::corrupt_size(format!("song serialization: {e}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::containers::resource_fork::{build_fork, ResourceFork};

	fn inst_payload(base_snd: i16, regions: &[(u8, u8, u8, i16)]) -> Vec<u8> {
		let mut v = Vec::new();
		v.extend_from_slice(&base_snd.to_be_bytes());
		v.push(60);
		v.push(0);
		v.extend_from_slice(&[0, 0]);
		v.extend_from_slice(&(regions.len() as u16).to_be_bytes());
		for &(low, high, base, snd) in regions {
			v.push(low);
			v.push(high);
			v.push(base);
			v.push(0);
			v.extend_from_slice(&snd.to_be_bytes());
		}
		v
	}

	fn song_payload(midi_id: i16, overrides: &[(u16, i16)]) -> Vec<u8> {
		let mut v = Vec::new();
		v.extend_from_slice(&midi_id.to_be_bytes());
		v.extend_from_slice(&[0; 10]);
		v.extend_from_slice(&(overrides.len() as u16).to_be_bytes());
		for &(program, inst) in overrides {
			v.extend_from_slice(&program.to_be_bytes());
			v.extend_from_slice(&inst.to_be_bytes());
		}
		v
	}

	fn plain_name(type_tag: u32, id: i16, ext: &str) -> String {
		format!("{}_{id}.{ext}", crate::fourcc::fourcc_filename(type_tag))
	}

	#[test]
	fn test_song_with_overrides() {
		let inst = inst_payload(100, &[(0, 60, 60, 100), (61, 127, 72, 101)]);
		let song = song_payload(1000, &[(1, 5)]);
		let fork_bytes = build_fork(&[
			(fourcc(*b"MIDI"), 1000, "", b"midi-bytes"),
			(TYPE_INST, 5, "", &inst),
			(fourcc(*b"SONG"), 1, "", &song),
		]);
		let fork = ResourceFork::parse(fork_bytes).unwrap();

		let decoded = decode_song(&fork, &song, plain_name).unwrap();
		assert_eq!(decoded.midi_id, 1000);
		assert_eq!(decoded.instruments.len(), 1);
		assert_eq!(decoded.instruments[0].id, 1);
		assert_eq!(decoded.instruments[0].regions.len(), 2);
		assert_eq!(decoded.instruments[0].regions[1].snd_filename, "snd _101.wav");

		let json = song_to_json(&decoded).unwrap();
		assert!(json.contains("\"sequence_type\": \"MIDI\""));
	}

	#[test]
	fn test_song_missing_midi() {
		let song = song_payload(77, &[]);
		let fork_bytes = build_fork(&[(fourcc(*b"SONG"), 1, "", &song)]);
		let fork = ResourceFork::parse(fork_bytes).unwrap();
		assert!(matches!(
			decode_song(&fork, &song, plain_name),
			Err(DecodeError::MissingResource { .. })
		));
	}

	#[test]
	fn test_inst_without_regions_covers_keyboard() {
		let regions = decode_inst(&inst_payload(42, &[]), |id| format!("{id}.wav")).unwrap();
		assert_eq!(regions.len(), 1);
		assert_eq!(regions[0].key_low, 0);
		assert_eq!(regions[0].key_high, 0x7F);
		assert_eq!(regions[0].snd_id, 42);
	}
}
