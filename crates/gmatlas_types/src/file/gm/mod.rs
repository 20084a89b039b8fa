//! GameMaker: Studio data archive support (`data.win` / `game.unx` /
//! `game.ios`).
//!
//! The archive is a single `FORM` chunk containing a flat sequence of tagged
//! sections. Every chunk header is 8 bytes: a 4-byte ASCII tag followed by a
//! little-endian u32 payload length.
//!
//! # File Structure
//!
//! ```text
//! Offset  Size  Field      Description
//! ------  ----  ---------  -------------------------------------------
//! 0x00    4     "FORM"     Container tag
//! 0x04    4     length     Payload length; length + 8 == file size
//! 0x08    ...   chunks     Tagged sections, back to back
//! ```
//!
//! Three section kinds carry the sprite data this crate consumes:
//!
//! - **`SPRT` / `BGND`** — count-prefixed tables of absolute offsets to
//!   fixed-size records. Each record points at its name string and at a
//!   22-byte `TPAG` texture-page entry (see [`record`]).
//! - **`TXTR`** — a count-prefixed table of `{unknown: u32, data_offset:
//!   u32}` entries followed by the embedded PNG streams themselves. An
//!   entry's position in the table is its texture page index.
//!
//! All other sections are recognized by tag for listing purposes and skipped
//! opaquely. Offsets in the archive are absolute file offsets; the parser
//! follows them only through bounds-checked reads and never trusts a
//! dispatched handler to leave the walk position intact: after each section
//! the cursor moves to `payload_offset + declared_length` unconditionally.
//!
//! Scanning is two-phase by construction: [`Archive::from_bytes`] walks the
//! whole chunk sequence once, resolving every sprite/background record and
//! validating every embedded PNG, and freezes the result. Extraction
//! ([`dump_sprites`]) and patching ([`build_patch_set`]) run afterwards
//! against that immutable snapshot, so a table chunk that appears *after* the
//! `TXTR` chunk still indexes it correctly.
//!
//! # Usage
//!
//! ```no_run
//! use gmatlas_types::file::gm::Archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = Archive::open("data.win")?;
//! for entry in archive.atlases() {
//! 	println!("page {}: {}", entry.index, entry.info);
//! 	for sprite in archive.index().sprites_on(entry.index) {
//! 		println!("  {sprite}");
//! 	}
//! }
//! # Ok(())
//! # }
//! ```

pub mod emit;
pub mod extract;
pub mod index;
pub mod patch;
pub mod record;

#[cfg(test)]
mod tests;

use crate::file::GmError;
use crate::file::png::PngInfo;
use crate::file::source::Source;

pub use emit::{ManifestEntry, write_patch_set};
pub use extract::{DumpSummary, dump_sprites};
pub use index::AtlasIndex;
pub use patch::{PatchedAtlas, Replacements, build_patch_set};
pub use record::{AtlasRect, RecordKind, ResolvedSprite};

/// Archive constants.
pub mod constants {
	/// Top-level container tag
	pub const FORM_MAGIC: [u8; 4] = *b"FORM";

	/// Size of a chunk header (4-byte tag + u32 length)
	pub const CHUNK_HEADER_SIZE: usize = 8;

	/// Size of one `TXTR` table entry (`{unknown: u32, data_offset: u32}`)
	pub const TXTR_ENTRY_SIZE: usize = 8;
}

/// Known section tags of a GameMaker data archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
	/// General info
	Gen8,
	/// Options
	Optn,
	/// Extensions
	Extn,
	/// Sounds
	Sond,
	/// Sprite table
	Sprt,
	/// Background table
	Bgnd,
	/// Paths
	Path,
	/// Scripts
	Scpt,
	/// Shaders
	Shdr,
	/// Fonts
	Font,
	/// Timelines
	Tmln,
	/// Objects
	Objt,
	/// Rooms
	Room,
	/// Data files
	Dafl,
	/// Texture page entries
	Tpag,
	/// Code
	Code,
	/// Variables
	Vari,
	/// Functions
	Func,
	/// String table
	Strg,
	/// Texture pages (embedded PNG streams)
	Txtr,
	/// Audio data
	Audo,
}

impl Section {
	/// Maps a raw chunk tag to a known section, if any.
	pub fn from_tag(tag: [u8; 4]) -> Option<Self> {
		match &tag {
			b"GEN8" => Some(Self::Gen8),
			b"OPTN" => Some(Self::Optn),
			b"EXTN" => Some(Self::Extn),
			b"SOND" => Some(Self::Sond),
			b"SPRT" => Some(Self::Sprt),
			b"BGND" => Some(Self::Bgnd),
			b"PATH" => Some(Self::Path),
			b"SCPT" => Some(Self::Scpt),
			b"SHDR" => Some(Self::Shdr),
			b"FONT" => Some(Self::Font),
			b"TMLN" => Some(Self::Tmln),
			b"OBJT" => Some(Self::Objt),
			b"ROOM" => Some(Self::Room),
			b"DAFL" => Some(Self::Dafl),
			b"TPAG" => Some(Self::Tpag),
			b"CODE" => Some(Self::Code),
			b"VARI" => Some(Self::Vari),
			b"FUNC" => Some(Self::Func),
			b"STRG" => Some(Self::Strg),
			b"TXTR" => Some(Self::Txtr),
			b"AUDO" => Some(Self::Audo),
			_ => None,
		}
	}

	/// The section's 4-byte chunk tag.
	pub fn tag(self) -> [u8; 4] {
		match self {
			Self::Gen8 => *b"GEN8",
			Self::Optn => *b"OPTN",
			Self::Extn => *b"EXTN",
			Self::Sond => *b"SOND",
			Self::Sprt => *b"SPRT",
			Self::Bgnd => *b"BGND",
			Self::Path => *b"PATH",
			Self::Scpt => *b"SCPT",
			Self::Shdr => *b"SHDR",
			Self::Font => *b"FONT",
			Self::Tmln => *b"TMLN",
			Self::Objt => *b"OBJT",
			Self::Room => *b"ROOM",
			Self::Dafl => *b"DAFL",
			Self::Tpag => *b"TPAG",
			Self::Code => *b"CODE",
			Self::Vari => *b"VARI",
			Self::Func => *b"FUNC",
			Self::Strg => *b"STRG",
			Self::Txtr => *b"TXTR",
			Self::Audo => *b"AUDO",
		}
	}
}

impl std::fmt::Display for Section {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let tag = self.tag();
		write!(f, "{}", tag.escape_ascii())
	}
}

/// One top-level chunk encountered during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
	/// Known section kind, if the tag is recognized
	pub section: Option<Section>,
	/// Raw chunk tag
	pub tag: [u8; 4],
	/// Absolute offset of the chunk payload
	pub offset: usize,
	/// Declared payload length in bytes
	pub size: usize,
}

/// One texture page: a validated embedded PNG stream inside the `TXTR`
/// chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasEntry {
	/// Texture page index (position in the `TXTR` table)
	pub index: u16,
	/// First entry field; purpose unknown, carried as-is
	pub unknown: u32,
	/// Absolute offset of the PNG stream
	pub data_offset: usize,
	/// Validated stream shape: exact byte length and pixel dimensions
	pub info: PngInfo,
}

/// A fully scanned GameMaker data archive.
///
/// Holds the raw bytes plus everything one walk of the chunk tree produced:
/// the chunk list, the validated texture pages, and the frozen
/// [`AtlasIndex`] of resolved sprite and background records.
#[derive(Debug, Clone)]
pub struct Archive {
	/// Complete file data
	raw: Vec<u8>,

	/// Top-level chunks in file order
	chunks: Vec<ChunkInfo>,

	/// Texture pages in table order
	atlases: Vec<AtlasEntry>,

	/// Resolved records grouped by texture page
	index: AtlasIndex,
}

impl Archive {
	/// Opens and scans an archive from the given path.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or fails any of the
	/// structural checks described in [`Archive::from_bytes`].
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, GmError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Scans an archive from any reader.
	///
	/// # Errors
	///
	/// Returns an error if reading fails or the data is malformed.
	pub fn from_reader<R: std::io::Read>(reader: &mut R) -> Result<Self, GmError> {
		let mut raw = Vec::new();
		reader.read_to_end(&mut raw)?;
		Self::from_bytes(&raw)
	}

	/// Scans an archive from a byte slice.
	///
	/// This is the single metadata pass over the container: it validates the
	/// `FORM` framing, walks every top-level chunk, resolves all sprite and
	/// background records, and validates every embedded texture page PNG.
	/// No pixel data is decoded here.
	///
	/// # Errors
	///
	/// - [`GmError::BadMagic`] if the container tag is not `FORM`
	/// - [`GmError::SizeUnderflow`] / [`GmError::SizeOverflow`] if the
	///   declared length plus 8 does not equal the byte length exactly
	/// - [`GmError::IllegalOffset`] if any chunk, table entry, or record
	///   pointer leaves its owning region
	/// - [`GmError::DuplicateName`] if two records collide on one texture
	///   page
	/// - any embedded PNG validation error (see
	///   [`PngInfo::parse`](crate::file::png::PngInfo::parse))
	pub fn from_bytes(data: &[u8]) -> Result<Self, GmError> {
		if data.len() < constants::CHUNK_HEADER_SIZE {
			return Err(GmError::InsufficientData {
				expected: constants::CHUNK_HEADER_SIZE,
				actual: data.len(),
			});
		}

		let src = Source::new(data);
		let magic = src.tag(0)?;
		if magic != constants::FORM_MAGIC {
			return Err(GmError::BadMagic(magic));
		}

		let declared = src.u32_le(4)? as u64 + constants::CHUNK_HEADER_SIZE as u64;
		let actual = data.len() as u64;
		if declared < actual {
			return Err(GmError::SizeUnderflow { declared, actual });
		}
		if declared > actual {
			return Err(GmError::SizeOverflow { declared, actual });
		}

		let end = data.len();
		let mut chunks = Vec::new();
		let mut atlases: Vec<AtlasEntry> = Vec::new();
		let mut index = AtlasIndex::new();

		let mut pos = constants::CHUNK_HEADER_SIZE;
		while pos < end {
			let tag = src.tag(pos)?;
			let size = src.u32_le(pos + 4)? as usize;
			let payload = pos + constants::CHUNK_HEADER_SIZE;
			let next = payload.checked_add(size).filter(|n| *n <= end).ok_or(
				GmError::IllegalOffset {
					offset: payload as u64,
					start: pos as u64,
					end: end as u64,
				},
			)?;

			let section = Section::from_tag(tag);
			log::debug!(
				"chunk {} at offset {pos}: {size} byte payload",
				tag.escape_ascii()
			);

			match section {
				Some(Section::Sprt) => {
					for sprite in record::resolve_table(&src, payload, next, RecordKind::Sprite)? {
						index.register(sprite)?;
					}
				}
				Some(Section::Bgnd) => {
					for bgnd in record::resolve_table(&src, payload, next, RecordKind::Background)? {
						index.register(bgnd)?;
					}
				}
				Some(Section::Txtr) => {
					parse_txtr(&src, payload, next, &mut atlases)?;
				}
				_ => {}
			}

			chunks.push(ChunkInfo {
				section,
				tag,
				offset: payload,
				size,
			});

			// Regardless of how much the section handler consumed.
			pos = next;
		}

		log::info!(
			"scanned archive: {} chunks, {} texture pages, {} records",
			chunks.len(),
			atlases.len(),
			index.len()
		);

		Ok(Self {
			raw: data.to_vec(),
			chunks,
			atlases,
			index,
		})
	}

	/// Top-level chunks in file order.
	pub fn chunks(&self) -> &[ChunkInfo] {
		&self.chunks
	}

	/// Texture pages in table order.
	pub fn atlases(&self) -> &[AtlasEntry] {
		&self.atlases
	}

	/// Resolved sprite and background records, grouped by texture page.
	pub fn index(&self) -> &AtlasIndex {
		&self.index
	}

	/// Total file size in bytes.
	pub fn len(&self) -> usize {
		self.raw.len()
	}

	/// Whether the archive holds no bytes (never true for a scanned one).
	pub fn is_empty(&self) -> bool {
		self.raw.is_empty()
	}

	/// The raw PNG stream of one texture page.
	pub fn atlas_bytes(&self, entry: &AtlasEntry) -> &[u8] {
		// Both bounds were validated during the scan.
		&self.raw[entry.data_offset..entry.data_offset + entry.info.total_length]
	}
}

impl std::fmt::Display for Archive {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GameMaker archive: {} bytes, {} chunks, {} texture pages, {} records",
			self.raw.len(),
			self.chunks.len(),
			self.atlases.len(),
			self.index.len()
		)
	}
}

/// Parses one `TXTR` chunk: the entry table plus the embedded PNG stream of
/// every texture page.
///
/// Table entries and stream offsets must stay inside the chunk payload, and
/// each stream's self-reported length must fit before `payload_end`.
fn parse_txtr(
	src: &Source<'_>,
	payload: usize,
	payload_end: usize,
	atlases: &mut Vec<AtlasEntry>,
) -> Result<(), GmError> {
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

	for i in 0..count {
		let entry_offset = src.u32_le(payload + 4 + i * 4)? as usize;
		if entry_offset < payload
			|| entry_offset
				.checked_add(constants::TXTR_ENTRY_SIZE)
				.is_none_or(|end| end > payload_end)
		{
			return Err(GmError::IllegalOffset {
				offset: entry_offset as u64,
				start: payload as u64,
				end: payload_end as u64,
			});
		}

		let unknown = src.u32_le(entry_offset)?;
		let data_offset = src.u32_le(entry_offset + 4)? as usize;
		if data_offset < payload || data_offset > payload_end {
			return Err(GmError::IllegalOffset {
				offset: data_offset as u64,
				start: payload as u64,
				end: payload_end as u64,
			});
		}

		// The stream must end before the chunk does; PngInfo::parse fails
		// with Overflow if its chunk walk runs past this slice.
		let info = PngInfo::parse(src.slice(data_offset, payload_end - data_offset)?)?;

		let index = u16::try_from(atlases.len()).map_err(|_| GmError::IllegalOffset {
			offset: entry_offset as u64,
			start: payload as u64,
			end: payload_end as u64,
		})?;
		atlases.push(AtlasEntry {
			index,
			unknown,
			data_offset,
			info,
		});
	}

	Ok(())
}
