//! Sprite and background record resolution.
//!
//! Sprite-table (`SPRT`) and background-table (`BGND`) chunks hold a
//! count-prefixed table of absolute record offsets. Each record starts with a
//! pointer to its name string and ends (one or two words from the tail) with
//! a pointer to a 22-byte texture-page entry (`TPAG`). Resolving a record
//! means following both pointers and cross-checking every offset on the way.

use crate::file::GmError;
use crate::file::source::Source;

/// Sprite record: 17 little-endian u32 words.
const SPRITE_RECORD_WORDS: usize = 17;
/// Background record: 5 little-endian u32 words.
const BACKGROUND_RECORD_WORDS: usize = 5;
/// Texture-page entry: 11 little-endian u16 values.
const TPAG_SIZE: usize = 22;

/// Which table chunk a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
	/// A `SPRT` sprite record
	Sprite,
	/// A `BGND` background record
	Background,
}

impl RecordKind {
	/// Record size in bytes.
	fn record_len(self) -> usize {
		match self {
			RecordKind::Sprite => SPRITE_RECORD_WORDS * 4,
			RecordKind::Background => BACKGROUND_RECORD_WORDS * 4,
		}
	}

	/// Word index of the texture-page pointer within the record.
	fn tpag_word(self) -> usize {
		match self {
			// Second to last of 17 words; the trailing word is unused here.
			RecordKind::Sprite => SPRITE_RECORD_WORDS - 2,
			RecordKind::Background => BACKGROUND_RECORD_WORDS - 1,
		}
	}
}

impl std::fmt::Display for RecordKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RecordKind::Sprite => write!(f, "sprite"),
			RecordKind::Background => write!(f, "background"),
		}
	}
}

/// One texture-page entry (`TPAG`): where a sprite sits on its atlas.
///
/// Only the source rectangle and the page index drive extraction and
/// patching; the render/bound fields are carried for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasRect {
	/// X origin on the texture page
	pub x: u16,
	/// Y origin on the texture page
	pub y: u16,
	/// Width in pixels
	pub width: u16,
	/// Height in pixels
	pub height: u16,
	/// Render offset X
	pub target_x: u16,
	/// Render offset Y
	pub target_y: u16,
	/// Render width
	pub target_width: u16,
	/// Render height
	pub target_height: u16,
	/// Bounding width
	pub bound_width: u16,
	/// Bounding height
	pub bound_height: u16,
	/// Owning texture page (atlas) index
	pub page: u16,
}

impl AtlasRect {
	/// Reads a texture-page entry at an absolute offset.
	fn parse(src: &Source<'_>, offset: usize) -> Result<Self, GmError> {
		let b = src.slice(offset, TPAG_SIZE)?;
		let word = |i: usize| u16::from_le_bytes([b[i * 2], b[i * 2 + 1]]);
		Ok(Self {
			x: word(0),
			y: word(1),
			width: word(2),
			height: word(3),
			target_x: word(4),
			target_y: word(5),
			target_width: word(6),
			target_height: word(7),
			bound_width: word(8),
			bound_height: word(9),
			page: word(10),
		})
	}
}

/// A fully resolved sprite or background record: name, rectangle, and owning
/// texture page, with every internal pointer already followed and
/// bounds-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSprite {
	/// Record name, unique within its texture page
	pub name: String,
	/// Source rectangle on the texture page
	pub rect: AtlasRect,
	/// Whether this came from the sprite or the background table
	pub kind: RecordKind,
}

impl ResolvedSprite {
	/// Owning texture page (atlas) index.
	pub fn page(&self) -> u16 {
		self.rect.page
	}

	/// Checks that the rectangle lies inside a decoded atlas of the given
	/// pixel dimensions.
	///
	/// # Errors
	///
	/// Fails with [`GmError::RectOutOfBounds`] if any edge sticks out; a
	/// rectangle is never clamped.
	pub fn ensure_fits(&self, page_width: u32, page_height: u32) -> Result<(), GmError> {
		let right = u32::from(self.rect.x) + u32::from(self.rect.width);
		let bottom = u32::from(self.rect.y) + u32::from(self.rect.height);
		if right > page_width || bottom > page_height {
			return Err(GmError::RectOutOfBounds {
				name: self.name.clone(),
				page: self.rect.page,
				x: self.rect.x,
				y: self.rect.y,
				width: self.rect.width,
				height: self.rect.height,
				page_width,
				page_height,
			});
		}
		Ok(())
	}
}

impl std::fmt::Display for ResolvedSprite {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{} {:?}: {}x{} at ({}, {}) on page {}",
			self.kind, self.name, self.rect.width, self.rect.height, self.rect.x, self.rect.y, self.rect.page
		)
	}
}

/// Resolves every record of a sprite or background table chunk.
///
/// `payload` and `payload_end` bound the owning chunk; record offsets must
/// land fully inside it, while name and texture-page pointers may point
/// anywhere in the container (they address the string and `TPAG` chunks).
///
/// Any malformed pointer is fatal: the format has no partial-success mode,
/// and a corrupt record invalidates trust in the rest of the table.
pub(crate) fn resolve_table(
	src: &Source<'_>,
	payload: usize,
	payload_end: usize,
	kind: RecordKind,
) -> Result<Vec<ResolvedSprite>, GmError> {
	let count = src.u32_le(payload)? as usize;
	let table_fits = count
		.checked_mul(4)
		.and_then(|n| payload.checked_add(4 + n))
		.is_some_and(|end| end <= payload_end);
	if !table_fits {
		return Err(GmError::IllegalOffset {
			offset: payload as u64 + 4,
			start: payload as u64,
			end: payload_end as u64,
		});
	}

	let record_len = kind.record_len();
	let mut resolved = Vec::with_capacity(count);
	for i in 0..count {
		let offset = src.u32_le(payload + 4 + i * 4)? as usize;
		if offset < payload || offset.checked_add(record_len).is_none_or(|end| end > payload_end) {
			return Err(GmError::IllegalOffset {
				offset: offset as u64,
				start: payload as u64,
				end: payload_end as u64,
			});
		}

		let name_ptr = src.u32_le(offset)? as usize;
		let tpag_ptr = src.u32_le(offset + kind.tpag_word() * 4)? as usize;

		let name = read_string(src, name_ptr)?;
		let rect = AtlasRect::parse(src, tpag_ptr)?;

		log::debug!("resolved {kind} {name:?} -> page {}", rect.page);
		resolved.push(ResolvedSprite { name, rect, kind });
	}

	Ok(resolved)
}

/// Reads a length-prefixed string: the 4 bytes before `offset` hold the byte
/// length, the string data starts at `offset` itself.
fn read_string(src: &Source<'_>, offset: usize) -> Result<String, GmError> {
	if offset < 4 {
		return Err(GmError::IllegalOffset {
			offset: offset as u64,
			start: 4,
			end: src.len() as u64,
		});
	}
	let len = src.u32_le(offset - 4)? as usize;
	let bytes = src.slice(offset, len)?;
	String::from_utf8(bytes.to_vec()).map_err(|_| GmError::BadString {
		offset: offset as u64,
	})
}
