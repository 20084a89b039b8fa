//! Sprite Dump CLI Utility
//!
//! Extracts every named sprite and background out of a GameMaker data
//! archive's texture pages.
//!
//! # Output Layout
//!
//! ```text
//! OUTDIR/00017.png           raw PNG bytes of texture page 17
//! OUTDIR/00017/<name>.png    one cropped image per sprite/background
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Dump from an explicitly named archive
//! cargo run --example gmdump dump/ path/to/data.win
//!
//! # Or let it find the game archive in the usual Steam locations
//! cargo run --example gmdump dump/
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gmatlas_rs::locate;
use gmatlas_rs::prelude::*;
use log::info;

#[derive(Parser)]
#[command(name = "gmdump")]
#[command(author = "gmatlas-rs project")]
#[command(version = "1.0")]
#[command(about = "Extract named sprites from a GameMaker data archive", long_about = None)]
struct Cli {
	/// Directory the texture pages and cropped sprites are written to
	#[arg(value_name = "OUTDIR")]
	outdir: PathBuf,

	/// Archive path; searched for in the usual Steam locations if omitted
	#[arg(value_name = "ARCHIVE")]
	archive: Option<PathBuf>,
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

	let summary = dump_sprites(&archive, &cli.outdir)?;
	info!(
		"dumped {} sprites from {} texture pages into {}",
		summary.sprites,
		summary.atlases,
		cli.outdir.display()
	);

	Ok(())
}
