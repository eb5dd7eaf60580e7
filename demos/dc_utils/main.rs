//! Dark Castle CLI Utility
//!
//! Extracts a Dark Castle data file: `DC2 ` sprites render to BMP,
//! `snd ` entries convert to WAV, `CSTR` entries become text, and
//! everything else is written raw.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example dc_utils "DC Data" out/
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use relic_rs::prelude::*;
use relic_rs::relic_types::resources::sound::decode_snd;
use relic_rs::relic_types::sprites::dark_castle::decode_dc2;

#[derive(Parser)]
#[command(name = "dc_utils")]
#[command(author = "relic-rs project")]
#[command(version = "1.0")]
#[command(about = "Dark Castle data file extractor", long_about = None)]
struct Cli {
	/// Input data file (usually named "DC Data")
	#[arg(value_name = "DATA_FILE", default_value = "DC Data")]
	input: PathBuf,

	/// Output directory
	#[arg(value_name = "OUT_DIR", default_value = ".")]
	out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let cli = Cli::parse();

	let file = DarkCastleFile::parse(fs::read(&cli.input)?)
		.with_context(|| format!("parsing {}", cli.input.display()))?;
	fs::create_dir_all(&cli.out_dir)?;

	let dc2 = fourcc(*b"DC2 ");
	let snd = fourcc(*b"snd ");
	let cstr = fourcc(*b"CSTR");

	for (tag, id) in file.all_resources() {
		let data = match file.get_resource_data(tag, id) {
			Ok(data) => data,
			Err(err) => {
				log::warn!("failed to load {} {id}: {err}", fourcc_display(tag));
				continue;
			}
		};
		let prefix = cli.out_dir.join(format!("{}_{id}", fourcc_filename(tag)));

		if tag == dc2 {
			match decode_dc2(&data) {
				Ok(img) => {
					let path = prefix.with_extension("bmp");
					img.save(&path, ImageFormat::WindowsBitmap)?;
					log::info!("... {}", path.display());
					continue;
				}
				Err(err) => log::warn!("failed to decode DC2 {id}: {err}"),
			}
		} else if tag == snd {
			match decode_snd(&data) {
				Ok(wav) => {
					let path = prefix.with_extension("wav");
					fs::write(&path, wav)?;
					log::info!("... {}", path.display());
					continue;
				}
				Err(err) => log::warn!("failed to decode snd {id}: {err}"),
			}
		} else if tag == cstr {
			let mut text = data.to_vec();
			if text.last() == Some(&0) {
				text.pop();
			}
			let path = prefix.with_extension("txt");
			fs::write(&path, text)?;
			log::info!("... {}", path.display());
			continue;
		}

		let path = prefix.with_extension("bin");
		fs::write(&path, data.as_ref())?;
		log::info!("... {}", path.display());
	}
	Ok(())
}
