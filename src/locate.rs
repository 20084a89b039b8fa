//! Platform glue for finding the game archive on disk.
//!
//! The archive ships with Cook, Serve, Delicious! under different names per
//! platform: `data.win` on Windows, `game.unx` on Linux, `game.ios` on
//! macOS. The search mirrors where Steam actually puts it; none of this is
//! load-bearing for parsing, and every CLI accepts an explicit path instead.
//!
//! Steam on Linux is inconsistent about directory casing (`SteamApps` vs
//! `steamapps`), so the Linux search matches path segments case-insensitively
//! while the archive format itself stays strictly case-sensitive about
//! sprite names.

use std::path::{Path, PathBuf};

/// Walks `segments` below `prefix`, matching each segment case-insensitively.
///
/// The final segment must name a file. Returns the first match found, in
/// directory-listing order.
pub fn find_path_ignore_case(prefix: &Path, segments: &[&str]) -> Option<PathBuf> {
	let (current, rest) = segments.split_first()?;
	let want = current.to_lowercase();

	let entries = std::fs::read_dir(prefix).ok()?;
	for entry in entries.flatten() {
		let Some(name) = entry.file_name().to_str().map(str::to_lowercase) else {
			continue;
		};
		if name != want {
			continue;
		}
		let path = entry.path();
		if rest.is_empty() {
			if path.is_file() {
				return Some(path);
			}
		} else if path.is_dir()
			&& let Some(found) = find_path_ignore_case(&path, rest)
		{
			return Some(found);
		}
	}

	None
}

/// Searches the known Steam install locations for the game archive.
///
/// Returns `None` when nothing is found; callers are expected to fall back
/// to an explicitly supplied path.
#[cfg(target_os = "linux")]
pub fn find_archive() -> Option<PathBuf> {
	let home = std::env::var_os("HOME").map(PathBuf::from)?;
	let candidates: [&[&str]; 2] = [
		&[".local/share", "Steam", "steamapps", "common", "CookServeDelicious", "assets", "game.unx"],
		&[".steam", "Steam", "steamapps", "common", "CookServeDelicious", "assets", "game.unx"],
	];

	for segments in candidates {
		// The first segment contains a separator; expand it here so the
		// case-insensitive walk only ever sees single path components.
		let expanded: Vec<&str> = segments
			.iter()
			.flat_map(|s| s.split('/'))
			.collect();
		if let Some(path) = find_path_ignore_case(&home, &expanded) {
			log::debug!("found game archive at {}", path.display());
			return Some(path);
		}
	}

	None
}

/// Searches the known Steam install locations for the game archive.
#[cfg(target_os = "macos")]
pub fn find_archive() -> Option<PathBuf> {
	let mut candidates = Vec::new();
	if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
		candidates.push(home.join(
			"Library/Application Support/Steam/SteamApps/common/CookServeDelicious/Cook Serve Delicious.app/Contents/Resources/game.ios",
		));
	}
	candidates.push(PathBuf::from(
		"/Applications/Cook Serve Delicious.app/Contents/Resources/game.ios",
	));

	let found = candidates.into_iter().find(|p| p.is_file());
	if let Some(path) = &found {
		log::debug!("found game archive at {}", path.display());
	}
	found
}

/// Searches the known Steam install locations for the game archive.
#[cfg(target_os = "windows")]
pub fn find_archive() -> Option<PathBuf> {
	// Registry probing would be more thorough; the default library under
	// Program Files covers the common case.
	let found = ["ProgramFiles(x86)", "ProgramFiles"]
		.iter()
		.filter_map(std::env::var_os)
		.map(|base| {
			PathBuf::from(base)
				.join("Steam")
				.join("steamapps")
				.join("common")
				.join("CookServeDelicious")
				.join("data.win")
		})
		.find(|p| p.is_file());
	if let Some(path) = &found {
		log::debug!("found game archive at {}", path.display());
	}
	found
}

/// Searches the known Steam install locations for the game archive.
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub fn find_archive() -> Option<PathBuf> {
	None
}
