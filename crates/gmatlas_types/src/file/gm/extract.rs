//! Sprite extraction: crop every resolved record out of its texture page.

use std::path::Path;

use crate::file::GmError;
use crate::file::gm::Archive;

/// What a dump run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpSummary {
	/// Texture pages written (only pages with at least one record)
	pub atlases: usize,
	/// Individual sprite/background images written
	pub sprites: usize,
}

/// Dumps every texture page that has resolved records, plus one cropped
/// image per record.
///
/// Output layout under `outdir`:
///
/// ```text
/// 00017.png           raw embedded PNG bytes of texture page 17
/// 00017/<name>.png    one crop per resolved sprite/background
/// ```
///
/// Each texture page is decoded at most once, no matter how many records
/// reference it. Pages without records are skipped entirely.
///
/// # Errors
///
/// Fails with [`GmError::RectOutOfBounds`] if a record's rectangle exceeds
/// the decoded page dimensions, or with an IO/image error if writing or
/// decoding fails. Already-written files are not removed on failure; a rerun
/// overwrites them.
pub fn dump_sprites(archive: &Archive, outdir: impl AsRef<Path>) -> Result<DumpSummary, GmError> {
	let outdir = outdir.as_ref();
	let mut summary = DumpSummary::default();

	for entry in archive.atlases() {
		let sprites = archive.index().sprites_on(entry.index);
		if sprites.is_empty() {
			continue;
		}

		let bytes = archive.atlas_bytes(entry);

		let atlas_path = outdir.join(format!("{:05}.png", entry.index));
		std::fs::create_dir_all(outdir)?;
		std::fs::write(&atlas_path, bytes)?;
		log::info!("{}", atlas_path.display());

		let image = image::load_from_memory(bytes)?;
		let sprite_dir = outdir.join(format!("{:05}", entry.index));
		std::fs::create_dir_all(&sprite_dir)?;

		for sprite in sprites {
			sprite.ensure_fits(image.width(), image.height())?;
			let crop = image.crop_imm(
				u32::from(sprite.rect.x),
				u32::from(sprite.rect.y),
				u32::from(sprite.rect.width),
				u32::from(sprite.rect.height),
			);

			let sprite_path = sprite_dir.join(format!("{}.png", sprite.name));
			crop.save(&sprite_path)?;
			log::info!("{}", sprite_path.display());
			summary.sprites += 1;
		}

		summary.atlases += 1;
	}

	Ok(summary)
}
