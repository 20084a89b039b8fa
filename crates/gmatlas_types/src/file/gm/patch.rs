//! Atlas patching: paste replacement sprites back into their texture pages.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::GenericImage;

use crate::file::GmError;
use crate::file::gm::Archive;

/// Replacement images gathered from a directory, keyed by file name stem.
///
/// The stem (file name minus extension) is matched case-sensitively against
/// resolved sprite/background names, the same way the archive's own
/// duplicate-name check works. Subdirectories are walked; layout carries no
/// meaning beyond grouping.
#[derive(Debug, Default, Clone)]
pub struct Replacements {
	by_name: BTreeMap<String, PathBuf>,
}

impl Replacements {
	/// Collects replacement images from a directory tree.
	///
	/// # Errors
	///
	/// Fails with [`GmError::DuplicateReplacement`] if two files collide on
	/// the same stem, or with an IO error if the walk fails.
	pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, GmError> {
		let mut by_name = BTreeMap::new();
		for entry in walkdir::WalkDir::new(dir.as_ref()) {
			let entry = entry.map_err(std::io::Error::from)?;
			if !entry.file_type().is_file() {
				continue;
			}
			let path = entry.into_path();
			let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
				continue;
			};
			if let Some(first) = by_name.insert(stem.to_string(), path.clone()) {
				return Err(GmError::DuplicateReplacement {
					name: stem.to_string(),
					first,
					second: path,
				});
			}
		}
		Ok(Self { by_name })
	}

	/// Path of the replacement image for `name`, if one was collected.
	pub fn get(&self, name: &str) -> Option<&Path> {
		self.by_name.get(name).map(PathBuf::as_path)
	}

	/// Number of collected replacement images.
	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	/// Whether the directory held no replacement images.
	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}
}

/// One re-encoded texture page with replacements pasted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedAtlas {
	/// Texture page index
	pub index: u16,
	/// Page width in pixels
	pub width: u32,
	/// Page height in pixels
	pub height: u32,
	/// Re-encoded PNG bytes of the whole page
	pub data: Vec<u8>,
}

/// Builds the patch set: every texture page with at least one matching
/// replacement, re-encoded with the replacements pasted in place.
///
/// Pages are processed in table order and each is decoded at most once.
/// Pages without a single match produce nothing, so the output is sparse.
///
/// # Errors
///
/// - [`GmError::SizeMismatch`] if a replacement's pixel dimensions differ
///   from its target rectangle; checked before the paste, the image is never
///   resized
/// - [`GmError::RectOutOfBounds`] if a rectangle exceeds the decoded page
/// - IO/image errors from loading replacement files or re-encoding
pub fn build_patch_set(
	archive: &Archive,
	replacements: &Replacements,
) -> Result<Vec<PatchedAtlas>, GmError> {
	let mut patched = Vec::new();

	for entry in archive.atlases() {
		let matched: Vec<_> = archive
			.index()
			.sprites_on(entry.index)
			.iter()
			.filter_map(|sprite| replacements.get(&sprite.name).map(|path| (sprite, path)))
			.collect();
		if matched.is_empty() {
			continue;
		}

		let mut image = image::load_from_memory(archive.atlas_bytes(entry))?;

		for (sprite, path) in matched {
			let replacement = image::open(path)?;
			if replacement.width() != u32::from(sprite.rect.width)
				|| replacement.height() != u32::from(sprite.rect.height)
			{
				return Err(GmError::SizeMismatch {
					name: sprite.name.clone(),
					expected_width: sprite.rect.width,
					expected_height: sprite.rect.height,
					actual_width: replacement.width(),
					actual_height: replacement.height(),
				});
			}
			sprite.ensure_fits(image.width(), image.height())?;

			image.copy_from(
				&replacement,
				u32::from(sprite.rect.x),
				u32::from(sprite.rect.y),
			)?;
			log::debug!("pasted {} from {}", sprite.name, path.display());
		}

		let mut buf = Cursor::new(Vec::new());
		image.write_to(&mut buf, image::ImageFormat::Png)?;
		log::info!("rebuilt texture page {}", entry.index);

		patched.push(PatchedAtlas {
			index: entry.index,
			width: image.width(),
			height: image.height(),
			data: buf.into_inner(),
		});
	}

	Ok(patched)
}
