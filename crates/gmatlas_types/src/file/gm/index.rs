//! Texture-page index: resolved records grouped by owning atlas.

use std::collections::BTreeMap;

use crate::file::GmError;
use crate::file::gm::record::ResolvedSprite;

/// All resolved sprites and backgrounds, keyed by texture page index.
///
/// Populated once while the archive is scanned and immutable afterwards, so
/// extraction and patching always see the complete record set no matter where
/// the table chunks sat relative to the `TXTR` chunk. Per page, records keep
/// discovery order; pages iterate in ascending index order.
#[derive(Debug, Default, Clone)]
pub struct AtlasIndex {
	by_page: BTreeMap<u16, Vec<ResolvedSprite>>,
	total: usize,
}

impl AtlasIndex {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Appends a resolved record under its texture page.
	///
	/// # Errors
	///
	/// Fails with [`GmError::DuplicateName`] if the page already holds a
	/// record with the same name. Names address sprites in both the dump and
	/// patch operations, so a collision is a parse error, never an overwrite.
	pub(crate) fn register(&mut self, sprite: ResolvedSprite) -> Result<(), GmError> {
		let page = sprite.page();
		let records = self.by_page.entry(page).or_default();
		if records.iter().any(|r| r.name == sprite.name) {
			return Err(GmError::DuplicateName {
				name: sprite.name,
				page,
			});
		}
		records.push(sprite);
		self.total += 1;
		Ok(())
	}

	/// Returns the records on one texture page, in discovery order.
	pub fn sprites_on(&self, page: u16) -> &[ResolvedSprite] {
		self.by_page.get(&page).map_or(&[], Vec::as_slice)
	}

	/// Iterates over the populated texture page indices, ascending.
	pub fn pages(&self) -> impl Iterator<Item = u16> + '_ {
		self.by_page.keys().copied()
	}

	/// Total number of resolved records across all pages.
	pub fn len(&self) -> usize {
		self.total
	}

	/// Whether no records were resolved at all.
	pub fn is_empty(&self) -> bool {
		self.total == 0
	}
}
