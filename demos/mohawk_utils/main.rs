//! Mohawk Archive CLI Utility
//!
//! Lists and extracts the resources of a Mohawk (`'MHWK'`) archive, and
//! converts its `tWAV` sounds to WAV.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example mohawk_utils list archive.mhk
//! cargo run --example mohawk_utils extract archive.mhk out/
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use relic_rs::prelude::*;
use relic_rs::relic_types::resources::mohawk_sound::decode_mohawk_snd;

#[derive(Parser)]
#[command(name = "mohawk_utils")]
#[command(author = "relic-rs project")]
#[command(version = "1.0")]
#[command(about = "Mohawk archive utility - list and extract resources", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// List every resource in the archive
	List {
		/// Input Mohawk archive
		#[arg(value_name = "ARCHIVE")]
		input: PathBuf,
	},

	/// Extract every resource; sounds convert to WAV
	Extract {
		/// Input Mohawk archive
		#[arg(value_name = "ARCHIVE")]
		input: PathBuf,

		/// Output directory
		#[arg(value_name = "OUT_DIR")]
		out_dir: PathBuf,
	},
}

fn main() -> anyhow::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	match cli.command {
		Commands::List { input } => {
			let archive = MohawkArchive::parse(fs::read(&input)?)
				.with_context(|| format!("parsing {}", input.display()))?;
			for (tag, id) in archive.all_resources() {
				let size = archive.get_resource_data(tag, id).map(|d| d.len()).unwrap_or(0);
				println!("{} {id:6} {size:8}", fourcc_display(tag));
			}
		}

		Commands::Extract { input, out_dir } => {
			let archive = MohawkArchive::parse(fs::read(&input)?)
				.with_context(|| format!("parsing {}", input.display()))?;
			fs::create_dir_all(&out_dir)?;

			let twav = fourcc(*b"tWAV");
			for (tag, id) in archive.all_resources() {
				let data = match archive.get_resource_data(tag, id) {
					Ok(data) => data,
					Err(err) => {
						log::warn!("failed to load {} {id}: {err}", fourcc_display(tag));
						continue;
					}
				};

				let (bytes, extension) = if tag == twav {
					match decode_mohawk_snd(&data) {
						Ok(wav) => (wav, "wav"),
						Err(err) => {
							log::warn!("failed to decode sound {id}: {err}");
							(data.into_owned(), "bin")
						}
					}
				} else {
					(data.into_owned(), "bin")
				};

				let path = out_dir.join(format!(
					"{}_{id}.{extension}",
					fourcc_filename(tag)
				));
				fs::write(&path, bytes)?;
				log::info!("... {}", path.display());
			}
		}
	}
	Ok(())
}
