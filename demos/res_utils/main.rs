//! Resource Fork CLI Utility
//!
//! A command-line tool for listing and decoding the resources in a
//! Macintosh resource fork.
//!
//! # Usage
//!
//! ```bash
//! # List every resource in a fork
//! cargo run --example res_utils list "Game Data.rsrc"
//!
//! # Decode everything decodable into ./out
//! cargo run --example res_utils decode "Game Data.rsrc" out/
//!
//! # Extract one resource's raw bytes
//! cargo run --example res_utils extract "Game Data.rsrc" PICT 128 pict.bin
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use relic_rs::prelude::*;

#[derive(Parser)]
#[command(name = "res_utils")]
#[command(author = "relic-rs project")]
#[command(version = "1.0")]
#[command(about = "Resource fork utility - list, extract, and decode resources", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// List every resource in the fork
	List {
		/// Input resource fork file
		#[arg(value_name = "FORK")]
		input: PathBuf,
	},

	/// Decode every decodable resource into a directory
	Decode {
		/// Input resource fork file
		#[arg(value_name = "FORK")]
		input: PathBuf,

		/// Output directory
		#[arg(value_name = "OUT_DIR")]
		out_dir: PathBuf,

		/// Also write raw bytes when a decoder fails
		#[arg(short, long)]
		raw_on_failure: bool,
	},

	/// Extract one resource's raw bytes
	Extract {
		/// Input resource fork file
		#[arg(value_name = "FORK")]
		input: PathBuf,

		/// Four-character resource type
		#[arg(value_name = "TYPE")]
		type_tag: String,

		/// Resource id
		#[arg(value_name = "ID")]
		id: i16,

		/// Output file
		#[arg(value_name = "OUTPUT")]
		output: PathBuf,
	},
}

fn parse_tag(text: &str) -> anyhow::Result<u32> {
	let bytes = text.as_bytes();
	if bytes.len() != 4 {
		bail!("resource types are exactly four characters, got {text:?}");
	}
	Ok(fourcc([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn artifact_name(base: &Path, tag: u32, id: i16, suffix: &str) -> PathBuf {
	base.join(format!("{}_{id}{suffix}", fourcc_filename(tag)))
}

fn write_decoded(
	out_dir: &Path,
	tag: u32,
	id: i16,
	artifact: DecodedResource,
) -> anyhow::Result<()> {
	match artifact {
		DecodedResource::Image(img) => {
			let path = artifact_name(out_dir, tag, id, ".bmp");
			img.save(&path, ImageFormat::WindowsBitmap)?;
			log::info!("... {}", path.display());
		}
		DecodedResource::Images(images) => {
			for (index, img) in images.iter().enumerate() {
				let path = artifact_name(out_dir, tag, id, &format!("_{index}.bmp"));
				img.save(&path, ImageFormat::WindowsBitmap)?;
				log::info!("... {}", path.display());
			}
		}
		DecodedResource::ColorTable(clut) => {
			// Render the palette as one 16x16 swatch per entry
			let height = (clut.len() * 16).max(16);
			let mut img = Image::new(64, height)?;
			for (index, entry) in clut.entries().iter().enumerate() {
				let c = entry.color.as8();
				img.fill_rect(0, (index * 16) as isize, 64, 16, Rgba::opaque(c));
			}
			let path = artifact_name(out_dir, tag, id, ".bmp");
			img.save(&path, ImageFormat::WindowsBitmap)?;
			log::info!("... {}", path.display());
		}
		DecodedResource::Wav(bytes) => {
			let path = artifact_name(out_dir, tag, id, ".wav");
			fs::write(&path, bytes)?;
			log::info!("... {}", path.display());
		}
		DecodedResource::Text(text) => {
			let path = artifact_name(out_dir, tag, id, ".txt");
			fs::write(&path, text)?;
			log::info!("... {}", path.display());
		}
		DecodedResource::Rtf(rtf) => {
			let path = artifact_name(out_dir, tag, id, ".rtf");
			fs::write(&path, rtf)?;
			log::info!("... {}", path.display());
		}
		DecodedResource::Json(json) => {
			let path = artifact_name(out_dir, tag, id, ".json");
			fs::write(&path, json)?;
			log::info!("... {}", path.display());
		}
		DecodedResource::Mesh(mesh) => {
			for (suffix, contents) in [
				(".stl", mesh.to_stl()),
				(".obj", mesh.to_obj()),
				("_top.svg", mesh.top_view_svg()),
			] {
				let path = artifact_name(out_dir, tag, id, suffix);
				fs::write(&path, contents)?;
				log::info!("... {}", path.display());
			}
		}
	}
	Ok(())
}

fn main() -> anyhow::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	match cli.command {
		Commands::List { input } => {
			let fork = ResourceFork::parse(fs::read(&input)?)
				.with_context(|| format!("parsing {}", input.display()))?;
			for (tag, id) in fork.all_resources() {
				let name = fork.get_resource_name(tag, id).unwrap_or("");
				let size = fork.resource_data(tag, id, false).map(|d| d.len()).unwrap_or(0);
				println!("{} {id:6} {size:8} {name}", fourcc_display(tag));
			}
		}

		Commands::Decode { input, out_dir, raw_on_failure } => {
			let fork = ResourceFork::parse(fs::read(&input)?)
				.with_context(|| format!("parsing {}", input.display()))?;
			fs::create_dir_all(&out_dir)?;

			let ctx = DecoderContext::default();
			let mut successes = 0usize;
			for (tag, id) in fork.all_resources() {
				match decode_resource(&fork, tag, id, &ctx) {
					Ok(artifact) => {
						write_decoded(&out_dir, tag, id, artifact)?;
						successes += 1;
					}
					Err(err) => {
						let name = fork.get_resource_name(tag, id).unwrap_or("");
						log::warn!(
							"failed to decode {} {id} {name:?}: {err}",
							fourcc_display(tag)
						);
						if raw_on_failure {
							if let Ok(raw) = fork.resource_data(tag, id, false) {
								let path = artifact_name(&out_dir, tag, id, ".bin");
								fs::write(&path, raw)?;
								log::info!("... {}", path.display());
							}
						}
					}
				}
			}
			if successes == 0 {
				bail!("no resource decoded successfully");
			}
		}

		Commands::Extract { input, type_tag, id, output } => {
			let fork = ResourceFork::parse(fs::read(&input)?)?;
			let tag = parse_tag(&type_tag)?;
			let data = fork.resource_data(tag, id, true)?;
			fs::write(&output, data)?;
			log::info!("... {}", output.display());
		}
	}
	Ok(())
}
