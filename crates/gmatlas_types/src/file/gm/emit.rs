//! Patch set emission: turn patched texture pages into linkable artifacts.
//!
//! The downstream build step only needs a declarative description of what to
//! embed: which page, its dimensions, and where its re-encoded bytes live.
//! The emitter writes one PNG file per patched page plus a `patches.json`
//! manifest listing them in ascending page order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::file::GmError;
use crate::file::gm::patch::PatchedAtlas;

/// Manifest file name written next to the page files.
pub const MANIFEST_NAME: &str = "patches.json";

/// One manifest record describing a patched texture page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
	/// Texture page index
	pub index: u16,
	/// Page width in pixels
	pub width: u32,
	/// Page height in pixels
	pub height: u32,
	/// File name of the re-encoded page, relative to the manifest
	pub file: String,
	/// Byte length of the re-encoded page
	pub size: usize,
}

/// Writes the patch set to `outdir`: `txtr_<index:05>.png` per page plus the
/// [`MANIFEST_NAME`] manifest.
///
/// Returns the manifest entries in the order they were written (ascending
/// page index, matching the patch set order).
///
/// # Errors
///
/// Fails with an IO error if a file cannot be written.
pub fn write_patch_set(
	patches: &[PatchedAtlas],
	outdir: impl AsRef<Path>,
) -> Result<Vec<ManifestEntry>, GmError> {
	let outdir = outdir.as_ref();
	std::fs::create_dir_all(outdir)?;

	let mut entries = Vec::with_capacity(patches.len());
	for patch in patches {
		let file = format!("txtr_{:05}.png", patch.index);
		let path = outdir.join(&file);
		std::fs::write(&path, &patch.data)?;
		log::info!("{}", path.display());

		entries.push(ManifestEntry {
			index: patch.index,
			width: patch.width,
			height: patch.height,
			file,
			size: patch.data.len(),
		});
	}

	let manifest_path = outdir.join(MANIFEST_NAME);
	let manifest = serde_json::to_string_pretty(&entries).map_err(std::io::Error::from)?;
	std::fs::write(&manifest_path, manifest)?;
	log::info!("{}", manifest_path.display());

	Ok(entries)
}
