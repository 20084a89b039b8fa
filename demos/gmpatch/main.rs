//! Atlas Patch CLI Utility
//!
//! Rebuilds texture pages of a GameMaker data archive from a directory of
//! replacement sprites and writes the result as a portable patch set: one
//! PNG per touched page plus a `patches.json` manifest for the downstream
//! build step that embeds them.
//!
//! Replacement files are matched case-sensitively by file name stem against
//! the archive's sprite/background names; each replacement must have exactly
//! the pixel dimensions of the rectangle it overwrites.
//!
//! # Usage
//!
//! ```bash
//! # Patch from sprites/ against an explicitly named archive
//! cargo run --example gmpatch sprites/ build/ path/to/data.win
//!
//! # Or let it find the game archive in the usual Steam locations
//! cargo run --example gmpatch sprites/ build/
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gmatlas_rs::locate;
use gmatlas_rs::prelude::*;
use log::info;

#[derive(Parser)]
#[command(name = "gmpatch")]
#[command(author = "gmatlas-rs project")]
#[command(version = "1.0")]
#[command(about = "Rebuild texture pages from replacement sprites", long_about = None)]
struct Cli {
	/// Directory holding replacement images, named `<sprite name>.png`
	#[arg(value_name = "SPRITEDIR")]
	spritedir: PathBuf,

	/// Directory the patch set and manifest are written to
	#[arg(value_name = "BUILDDIR")]
	builddir: PathBuf,

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

	let replacements = Replacements::from_dir(&cli.spritedir)
		.with_context(|| format!("cannot read replacement sprites from {}", cli.spritedir.display()))?;
	if replacements.is_empty() {
		bail!("no replacement images under {}", cli.spritedir.display());
	}
	info!("{} replacement images", replacements.len());

	let archive = GmArchive::open(&archive_path)
		.with_context(|| format!("cannot read archive {}", archive_path.display()))?;

	let patches = build_patch_set(&archive, &replacements)?;
	if patches.is_empty() {
		bail!("no replacement matched any sprite or background name");
	}

	let entries = write_patch_set(&patches, &cli.builddir)?;
	info!(
		"wrote {} patched texture pages into {}",
		entries.len(),
		cli.builddir.display()
	);

	Ok(())
}
