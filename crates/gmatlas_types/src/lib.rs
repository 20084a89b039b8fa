//! This crate provides parsing, extraction, and patching support for the
//! GameMaker: Studio data archive format used by `gmatlas-rs`.
//!
//! # What it does
//!
//! - **Scan** (`file::gm::Archive`): one bounds-checked pass over the
//!   archive's chunk tree that resolves every sprite/background record and
//!   validates every embedded texture page PNG.
//! - **Extract** (`file::gm::dump_sprites`): crop each named record out of
//!   its texture page into standalone images.
//! - **Patch** (`file::gm::build_patch_set` + `file::gm::write_patch_set`):
//!   paste replacement images into the right rectangles, re-encode the
//!   touched pages, and emit them with a manifest for a downstream build
//!   step.
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use gmatlas_types::prelude::*;
//!
//! # fn main() -> Result<(), GmError> {
//! let archive = GmArchive::open("data.win")?;
//! let summary = dump_sprites(&archive, "dump")?;
//! println!("{} sprites from {} pages", summary.sprites, summary.atlases);
//! # Ok(())
//! # }
//! ```

pub mod file;

/// `use gmatlas_types::prelude::*;` to import commonly used items.
pub mod prelude;
