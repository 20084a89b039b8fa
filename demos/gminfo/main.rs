//! GameMaker Archive Info CLI Utility
//!
//! Lists the top-level chunks of a GameMaker data archive, its texture
//! pages, and the sprites/backgrounds resolved onto each page.
//!
//! # Usage
//!
//! ```bash
//! # Inspect an explicitly named archive
//! cargo run --example gminfo path/to/data.win
//!
//! # Or let it find the game archive in the usual Steam locations
//! cargo run --example gminfo
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gmatlas_rs::locate;
use gmatlas_rs::prelude::*;
use log::info;

#[derive(Parser)]
#[command(name = "gminfo")]
#[command(author = "gmatlas-rs project")]
#[command(version = "1.0")]
#[command(about = "List chunks, texture pages and sprites of a GameMaker data archive", long_about = None)]
struct Cli {
	/// Archive path; searched for in the usual Steam locations if omitted
	#[arg(value_name = "ARCHIVE")]
	archive: Option<PathBuf>,

	/// Also list every resolved sprite/background per texture page
	#[arg(short, long)]
	sprites: bool,
}

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	let archive_path = match cli.archive {
		Some(path) => path,
		None => locate::find_archive()
			.context("game archive not found; pass the archive path explicitly")?,
	};

	let archive = GmArchive::open(&archive_path)
		.with_context(|| format!("cannot read archive {}", archive_path.display()))?;

	info!("{}: {archive}", archive_path.display());
	info!("");
	info!("{:<8} {:>12} {:>12}", "chunk", "offset", "size");
	for chunk in archive.chunks() {
		info!(
			"{:<8} {:>12} {:>12}",
			chunk.tag.escape_ascii().to_string(),
			chunk.offset,
			chunk.size
		);
	}

	info!("");
	info!("{:<6} {:>10} {:>12} {:>8}", "page", "size", "bytes", "sprites");
	for entry in archive.atlases() {
		let sprites = archive.index().sprites_on(entry.index);
		info!(
			"{:<6} {:>10} {:>12} {:>8}",
			entry.index,
			format!("{}x{}", entry.info.width, entry.info.height),
			entry.info.total_length,
			sprites.len()
		);
		if cli.sprites {
			for sprite in sprites {
				info!("    {sprite}");
			}
		}
	}

	Ok(())
}
