//! Prelude module for `gmatlas_types`.
//!
//! This module provides a convenient way to import commonly used types and
//! functions.
//!
//! # Examples
//!
//! ```no_run
//! use gmatlas_types::prelude::*;
//!
//! # fn main() -> Result<(), GmError> {
//! let archive = GmArchive::open("data.win")?;
//! let replacements = Replacements::from_dir("sprites")?;
//! let patches = build_patch_set(&archive, &replacements)?;
//! write_patch_set(&patches, "build")?;
//! # Ok(())
//! # }
//! ```

#[doc(inline)]
pub use crate::file::{
	// Archive types
	AtlasEntry,
	AtlasIndex,
	AtlasRect,
	ChunkInfo,
	DumpSummary,

	// Error type
	GmError,

	GmArchive,
	ManifestEntry,
	PatchedAtlas,

	// Embedded image validation
	PngInfo,

	RecordKind,
	Replacements,
	ResolvedSprite,
	Section,

	// Operations
	build_patch_set,
	dump_sprites,
	write_patch_set,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
