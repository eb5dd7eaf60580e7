//! PE32 CLI Utility
//!
//! Prints the header, section table, and import directory of a Windows
//! PE32 executable.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example pe_utils GAME.EXE
//! cargo run --example pe_utils --labels GAME.EXE
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use relic_rs::prelude::*;

#[derive(Parser)]
#[command(name = "pe_utils")]
#[command(author = "relic-rs project")]
#[command(version = "1.0")]
#[command(about = "PE32 executable inspector", long_about = None)]
struct Cli {
	/// Input executable
	#[arg(value_name = "EXE")]
	input: PathBuf,

	/// Print import labels keyed by virtual address
	#[arg(short, long)]
	labels: bool,
}

fn main() -> anyhow::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	let pe = PeFile::parse(&fs::read(&cli.input)?)
		.with_context(|| format!("parsing {}", cli.input.display()))?;

	println!("architecture:  {:#06X}", pe.header.architecture);
	println!("image base:    {:#010X}", pe.header.image_base);
	println!("entry point:   {:#010X}", pe.header.image_base + pe.header.entrypoint_rva);
	println!("sections:      {}", pe.sections.len());
	println!();

	println!("{:<10} {:>10} {:>10} {:>10} {:>10}", "name", "rva", "vsize", "fsize", "flags");
	for section in &pe.sections {
		println!(
			"{:<10} {:>10X} {:>10X} {:>10X} {:>10X}",
			section.name,
			section.rva,
			section.virtual_size,
			section.data.len(),
			section.flags
		);
	}

	if !pe.import_libs.is_empty() {
		println!();
		for (lib, imports) in &pe.import_libs {
			println!("{lib}:");
			for import in imports {
				if import.name.is_empty() {
					println!("  [{:08X}] <Ordinal{:04X}>", import.addr_rva, import.ordinal_hint);
				} else {
					println!("  [{:08X}] {}", import.addr_rva, import.name);
				}
			}
		}
	}

	if cli.labels {
		println!();
		for (address, label) in pe.labels_for_loaded_imports() {
			println!("{address:08X} {label}");
		}
	}
	Ok(())
}
