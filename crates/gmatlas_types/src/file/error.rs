//! Error types for archive parsing and patching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when parsing or patching a GameMaker data archive.
#[derive(Debug, Error)]
pub enum GmError {
	/// The top-level container tag is not `FORM`
	#[error("illegal file magic: {0:02X?}")]
	BadMagic([u8; 4]),

	/// The container declares fewer bytes than the file holds
	#[error("file size underflow: file size = {actual}, read size = {declared}")]
	SizeUnderflow {
		/// Declared size plus the 8-byte header
		declared: u64,
		/// Actual file size in bytes
		actual: u64,
	},

	/// The container declares more bytes than the file holds
	#[error("file size overflow: file size = {actual}, read size = {declared}")]
	SizeOverflow {
		/// Declared size plus the 8-byte header
		declared: u64,
		/// Actual file size in bytes
		actual: u64,
	},

	/// A table entry or pointer falls outside its owning region
	#[error("illegal offset {offset}: not within region {start}..{end}")]
	IllegalOffset {
		/// The offending absolute byte offset
		offset: u64,
		/// Start of the owning region
		start: u64,
		/// End of the owning region
		end: u64,
	},

	/// A name string could not be decoded
	#[error("invalid string data at offset {offset}")]
	BadString {
		/// Absolute byte offset of the string data
		offset: u64,
	},

	/// An embedded image does not start with the PNG signature
	#[error("not a PNG stream: {0:02X?}")]
	BadSignature([u8; 8]),

	/// The first chunk of an embedded image is not IHDR
	#[error("expected IHDR chunk but got: {0:02X?}")]
	UnexpectedChunk([u8; 4]),

	/// An IHDR field holds a value outside its legal set
	#[error("unexpected {field} value: {value}")]
	InvalidHeader {
		/// Name of the offending header field
		field: &'static str,
		/// The value that was read
		value: u32,
	},

	/// An embedded image chunk tag contains non-alphabetic bytes
	#[error("unexpected chunk magic: {0:02X?}")]
	BadChunkTag([u8; 4]),

	/// Embedded image data runs past the end of its enclosing region
	#[error("embedded image overflows enclosing region: needs {required} bytes, region holds {available}")]
	Overflow {
		/// Number of bytes the image stream requires
		required: u64,
		/// Number of bytes the enclosing region holds
		available: u64,
	},

	/// Two records share one name within the same texture page
	#[error("duplicate sprite name {name:?} on texture page {page}")]
	DuplicateName {
		/// The colliding sprite/background name
		name: String,
		/// Texture page (atlas) index the collision occurred on
		page: u16,
	},

	/// Two replacement files collide on the same name stem
	#[error("duplicate replacement file for {name:?}: {first} and {second}", first = .first.display(), second = .second.display())]
	DuplicateReplacement {
		/// The colliding name stem
		name: String,
		/// File registered first
		first: PathBuf,
		/// File that collided with it
		second: PathBuf,
	},

	/// A replacement image's dimensions differ from its target rectangle
	#[error(
		"sprite {name:?} has incompatible size: PNG size: {actual_width} x {actual_height}, size in game archive: {expected_width} x {expected_height}"
	)]
	SizeMismatch {
		/// Name of the sprite being replaced
		name: String,
		/// Rectangle width declared by the archive
		expected_width: u16,
		/// Rectangle height declared by the archive
		expected_height: u16,
		/// Replacement image width
		actual_width: u32,
		/// Replacement image height
		actual_height: u32,
	},

	/// A sprite rectangle exceeds the decoded atlas dimensions
	#[error(
		"sprite {name:?} rectangle {x},{y} {width}x{height} exceeds texture page {page} ({page_width}x{page_height})"
	)]
	RectOutOfBounds {
		/// Name of the offending sprite
		name: String,
		/// Texture page index
		page: u16,
		/// Rectangle x origin
		x: u16,
		/// Rectangle y origin
		y: u16,
		/// Rectangle width
		width: u16,
		/// Rectangle height
		height: u16,
		/// Decoded atlas width
		page_width: u32,
		/// Decoded atlas height
		page_height: u32,
	},

	/// Not enough data to parse a fixed-size structure
	#[error("insufficient data: expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// Image decode/encode error
	#[error(transparent)]
	Image(#[from] image::ImageError),
}
