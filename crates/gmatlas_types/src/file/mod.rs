//! File format support for `gmatlas-rs`.

mod error;
mod source;

pub mod gm;
pub mod png;

// Re-export unified error type
pub use error::GmError;

// Re-export main archive types
pub use gm::{
	Archive as GmArchive, AtlasEntry, AtlasIndex, AtlasRect, ChunkInfo, DumpSummary, ManifestEntry,
	PatchedAtlas, RecordKind, Replacements, ResolvedSprite, Section, build_patch_set, dump_sprites,
	write_patch_set,
};
pub use png::PngInfo;
