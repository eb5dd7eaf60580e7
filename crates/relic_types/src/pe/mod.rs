//! PE32 executable parsing.
//!
//! Covers what the disassembly tooling needs: the MZ stub, the PE
//! header with its optional header (PE32 only; PE32+ is rejected), the
//! section table, and the import directory. Sections can be loaded into
//! a flat address space, and imports can be labeled for disassembly
//! annotation.
//!
//! Everything in the PE region is little-endian; the `'PE\0\0'`
//! signature reads as 0x00004550 little-endian.

use std::collections::BTreeMap;

use crate::error::DecodeError;
use crate::io::ByteReader;

/// `'MZ'`
const MZ_SIGNATURE: u16 = 0x5A4D;
/// `'PE\0\0'` as read little-endian.
const PE_SIGNATURE: u32 = 0x0000_4550;
/// Optional-header magic for PE32.
const PE32_MAGIC: u16 = 0x010B;
/// Optional-header magic for PE32+ (unsupported).
const PE32_PLUS_MAGIC: u16 = 0x020B;

/// Offset of the PE header pointer inside the MZ stub.
const MZ_PE_OFFSET_FIELD: usize = 0x3C;

/// The fields of the PE and optional headers the tools consume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeHeader {
	/// Target architecture (0x014C is x86)
	pub architecture: u16,
	/// Number of section headers
	pub num_sections: u16,
	/// Link timestamp
	pub build_timestamp: u32,
	/// Size of the optional header that follows the flags field
	pub optional_header_size: u16,
	/// Characteristics flags
	pub flags: u16,
	/// Entry point RVA
	pub entrypoint_rva: u32,
	/// Preferred load address
	pub image_base: u32,
	/// Section alignment once loaded
	pub loaded_section_alignment: u32,
	/// Section alignment in the file
	pub file_section_alignment: u32,
	/// Import directory RVA
	pub import_table_rva: u32,
	/// Import directory size
	pub import_table_size: u32,
}

/// One loaded section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
	/// Section name, trailing NULs stripped
	pub name: String,
	/// RVA the section loads at
	pub rva: u32,
	/// Virtual size once loaded
	pub virtual_size: u32,
	/// Raw file bytes (may be shorter than `virtual_size`)
	pub data: Vec<u8>,
	/// Characteristics flags
	pub flags: u32,
}

impl Section {
	/// The section's preferred virtual address under `image_base`.
	#[must_use]
	pub fn address(&self, image_base: u32) -> u32 {
		self.rva.wrapping_add(image_base)
	}
}

/// One imported symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
	/// Ordinal, or the hint preceding the name
	pub ordinal_hint: u16,
	/// Symbol name; empty for import-by-ordinal
	pub name: String,
	/// RVA of the import's address-table slot
	pub addr_rva: u32,
}

/// A parsed PE32 image.
#[derive(Debug, Clone)]
pub struct PeFile {
	/// Header fields
	pub header: PeHeader,
	/// Sections in file order
	pub sections: Vec<Section>,
	/// Imports grouped by library name, in directory order
	pub import_libs: Vec<(String, Vec<Import>)>,
}

impl PeFile {
	/// Parses a PE32 file image.
	pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
		let mut r = ByteReader::new(data);
		let mz = r.get_u16_le()?;
		if mz != MZ_SIGNATURE {
			return Err(DecodeError::BadMagic {
				expected: u32::from(MZ_SIGNATURE),
				actual: u32::from(mz),
			});
		}
		r.seek(MZ_PE_OFFSET_FIELD)?;
		let pe_offset = r.get_u32_le()? as usize;

		r.seek(pe_offset)?;
		let signature = r.get_u32_le()?;
		if signature != PE_SIGNATURE {
			return Err(DecodeError::BadMagic { expected: PE_SIGNATURE, actual: signature });
		}

		let architecture = r.get_u16_le()?;
		let num_sections = r.get_u16_le()?;
		let build_timestamp = r.get_u32_le()?;
		r.skip(8)?; // deprecated symbol table fields
		let optional_header_size = r.get_u16_le()?;
		let flags = r.get_u16_le()?;

		let optional_start = r.position();
		let magic = r.get_u16_le()?;
		if magic == PE32_PLUS_MAGIC {
			return Err(DecodeError::unsupported("PE32+ format".to_string()));
		}
		if magic != PE32_MAGIC {
			return Err(DecodeError::BadMagic {
				expected: u32::from(PE32_MAGIC),
				actual: u32::from(magic),
			});
		}
		r.skip(2)?; // linker version
		r.skip(12)?; // code / data sizes
		let entrypoint_rva = r.get_u32_le()?;
		r.skip(8)?; // code and data base RVAs
		let image_base = r.get_u32_le()?;
		let loaded_section_alignment = r.get_u32_le()?;
		let file_section_alignment = r.get_u32_le()?;
		r.skip(16)?; // version fields
		r.skip(16)?; // image size, header size, checksum, subsystem, dll flags
		r.skip(16)?; // stack and heap sizes
		r.skip(4)?; // loader flags
		let data_directory_count = r.get_u32_le()?;
		// Directory 0 is exports, 1 is imports
		let mut import_table_rva = 0;
		let mut import_table_size = 0;
		for index in 0..data_directory_count {
			let rva = r.get_u32_le()?;
			let size = r.get_u32_le()?;
			if index == 1 {
				import_table_rva = rva;
				import_table_size = size;
			}
		}

		let header = PeHeader {
			architecture,
			num_sections,
			build_timestamp,
			optional_header_size,
			flags,
			entrypoint_rva,
			image_base,
			loaded_section_alignment,
			file_section_alignment,
			import_table_rva,
			import_table_size,
		};

		// Section table sits right after the declared optional header
		r.seek(optional_start + optional_header_size as usize)?;
		let mut sections = Vec::with_capacity(num_sections as usize);
		for _ in 0..num_sections {
			let name_bytes = r.get_bytes(8)?;
			let name = String::from_utf8_lossy(name_bytes)
				.trim_end_matches('\0')
				.to_string();
			let virtual_size = r.get_u32_le()?;
			let rva = r.get_u32_le()?;
			let file_data_size = r.get_u32_le()? as usize;
			let file_data_offset = r.get_u32_le()? as usize;
			r.skip(12)?; // relocation and line number fields
			let section_flags = r.get_u32_le()?;

			let data = if file_data_size == 0 {
				Vec::new()
			} else {
				data.get(file_data_offset..file_data_offset + file_data_size)
					.ok_or_else(|| {
						DecodeError::corrupt_size(format!(
							"section {name} data {file_data_offset:#X}+{file_data_size:#X} \
							 extends past the file"
						))
					})?
					.to_vec()
			};
			sections.push(Section { name, rva, virtual_size, data, flags: section_flags });
		}

		let mut pe = Self { header, sections, import_libs: Vec::new() };
		pe.check_section_overlap()?;
		pe.parse_imports()?;
		Ok(pe)
	}

	fn check_section_overlap(&self) -> Result<(), DecodeError> {
		let mut spans: Vec<(u32, u32, &str)> = self
			.sections
			.iter()
			.filter(|s| s.virtual_size > 0)
			.map(|s| (s.rva, s.rva.saturating_add(s.virtual_size), s.name.as_str()))
			.collect();
		spans.sort_unstable();
		for pair in spans.windows(2) {
			if pair[1].0 < pair[0].1 {
				return Err(DecodeError::corrupt_size(format!(
					"sections {} and {} overlap in virtual address space",
					pair[0].2, pair[1].2
				)));
			}
		}
		Ok(())
	}

	/// Creates a reader over loaded memory at `rva`, truncated to the
	/// containing section.
	pub fn read_from_rva(&self, rva: u32) -> Result<ByteReader<'_>, DecodeError> {
		for section in &self.sections {
			let offset = rva.wrapping_sub(section.rva) as usize;
			if offset < section.data.len() {
				return Ok(ByteReader::new(&section.data[offset..]));
			}
		}
		Err(DecodeError::out_of_bounds(format!(
			"rva {rva:#X} is not within any initialized section"
		)))
	}

	fn parse_imports(&mut self) -> Result<(), DecodeError> {
		if self.header.import_table_rva == 0 {
			return Ok(());
		}
		let mut libs = Vec::new();
		let mut dir_r = self.read_from_rva(self.header.import_table_rva)?;
		loop {
			let lookup_table_rva = dir_r.get_u32_le()?;
			let _flags = dir_r.get_u32_le()?;
			let _timestamp = dir_r.get_u32_le()?;
			let name_rva = dir_r.get_u32_le()?;
			let address_table_rva = dir_r.get_u32_le()?;
			if lookup_table_rva == 0 {
				break;
			}

			let name = self.read_from_rva(name_rva)?.read_cstr()?;
			if name.is_empty() {
				return Err(DecodeError::corrupt_size(
					"import library entry name is blank".to_string(),
				));
			}

			let mut imports = Vec::new();
			let mut lookup_r = self.read_from_rva(lookup_table_rva)?;
			loop {
				let slot_offset = lookup_r.position() as u32;
				let entry = lookup_r.get_u32_le()?;
				if entry == 0 {
					break;
				}
				let addr_rva = address_table_rva + slot_offset;
				if entry & 0x8000_0000 != 0 {
					imports.push(Import {
						ordinal_hint: (entry & 0xFFFF) as u16,
						name: String::new(),
						addr_rva,
					});
				} else {
					let mut name_r = self.read_from_rva(entry & 0x7FFF_FFFF)?;
					let ordinal_hint = name_r.get_u16_le()?;
					let import_name = name_r.read_cstr()?;
					imports.push(Import { ordinal_hint, name: import_name, addr_rva });
				}
			}
			libs.push((name, imports));
		}
		self.import_libs = libs;
		Ok(())
	}

	/// Pre-allocates a flat arena spanning every section and copies each
	/// section's file bytes in at its RVA. Returns the arena plus the
	/// RVA its first byte corresponds to.
	pub fn load_into_arena(&self) -> Result<(Vec<u8>, u32), DecodeError> {
		let mut min_rva = u32::MAX;
		let mut max_end = 0u32;
		for section in &self.sections {
			if section.virtual_size == 0 {
				continue;
			}
			min_rva = min_rva.min(section.rva);
			max_end = max_end.max(section.rva.saturating_add(section.virtual_size));
		}
		if min_rva > max_end {
			return Err(DecodeError::corrupt_size("image has no loadable sections".to_string()));
		}

		let mut arena = vec![0u8; (max_end - min_rva) as usize];
		for section in &self.sections {
			if section.virtual_size == 0 {
				continue;
			}
			let start = (section.rva - min_rva) as usize;
			let copy_len = section.data.len().min(section.virtual_size as usize);
			arena[start..start + copy_len].copy_from_slice(&section.data[..copy_len]);
		}
		Ok((arena, min_rva))
	}

	/// Produces `virtual address -> "lib:symbol"` labels for every
	/// import, for disassembly annotation. Ordinal imports label as
	/// `lib:<OrdinalNNNN>`.
	#[must_use]
	pub fn labels_for_loaded_imports(&self) -> BTreeMap<u32, String> {
		let mut labels = BTreeMap::new();
		for (lib_name, imports) in &self.import_libs {
			for import in imports {
				let label = if import.name.is_empty() {
					format!("{lib_name}:<Ordinal{:04X}>", import.ordinal_hint)
				} else {
					format!("{lib_name}:{}", import.name)
				};
				labels.insert(import.addr_rva.wrapping_add(self.header.image_base), label);
			}
		}
		labels
	}
}
