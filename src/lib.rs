//! `gmatlas-rs` reads GameMaker: Studio data archives (`data.win`,
//! `game.unx`, `game.ios`), extracts named sprites and backgrounds out of
//! their texture atlases, and rebuilds patched atlases from replacement
//! images.
//!
//! All format support lives in [`gmatlas_types`]; this crate re-exports it
//! and adds the platform glue for locating a game archive on disk. The
//! `gminfo`, `gmdump`, and `gmpatch` example targets are thin CLI wrappers
//! over the same API.

pub use gmatlas_types::{file, prelude};

pub mod locate;
