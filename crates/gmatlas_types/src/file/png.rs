//! Minimal PNG stream validation for embedded texture pages.
//!
//! Texture pages are stored inside the archive as plain PNG byte streams with
//! no external length field, so the only way to know where one ends is to
//! walk its own chunk sequence. This module does exactly that and nothing
//! more: it checks the signature, validates the IHDR header fields, and sums
//! chunk lengths until IEND.
//!
//! # Stream Structure
//!
//! ```text
//! 8 bytes   signature: 89 50 4E 47 0D 0A 1A 0A
//! repeated  chunk: { length: u32 BE, tag: 4 bytes, data[length], crc: u32 BE }
//! ```
//!
//! The first chunk must be IHDR with a fixed 13-byte layout (width, height,
//! bit depth, color type, compression, filter, interlace). The stream ends at
//! the IEND chunk.
//!
//! Chunk CRCs are not verified. The alphabetic-tag check on every chunk is
//! the same plausibility heuristic the format's other consumers rely on; a
//! stricter implementation can replace this module without touching callers.

use crate::file::GmError;

/// PNG stream signature.
pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Size of the signature plus the complete IHDR chunk.
const HEADER_SIZE: usize = 8 + 25;

/// Validated shape of one embedded PNG stream.
///
/// Produced by [`PngInfo::parse`]; `total_length` is the exact byte span of
/// the stream, which the container itself never records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngInfo {
	/// Exact byte length of the whole stream, signature through IEND
	pub total_length: usize,
	/// Image width in pixels
	pub width: u32,
	/// Image height in pixels
	pub height: u32,
	/// Bits per sample
	pub bitdepth: u8,
	/// PNG color type
	pub colortype: u8,
	/// Compression method
	pub compression: u8,
	/// Filter method
	pub filter: u8,
	/// Interlace method
	pub interlace: u8,
	/// Declared IHDR checksum (not verified)
	pub crc: u32,
}

impl PngInfo {
	/// Validates the PNG stream at the start of `data`.
	///
	/// `data` must extend to the end of the enclosing region: any read past
	/// it means the image's chunk stream does not fit where the container put
	/// it, and fails with [`GmError::Overflow`].
	///
	/// # Errors
	///
	/// - [`GmError::BadSignature`] if the stream does not begin with the PNG
	///   signature
	/// - [`GmError::UnexpectedChunk`] if the first chunk is not IHDR
	/// - [`GmError::InvalidHeader`] if an IHDR field holds an illegal value
	/// - [`GmError::BadChunkTag`] if a chunk tag contains non-alphabetic
	///   bytes
	/// - [`GmError::Overflow`] if the accumulated chunk lengths run past the
	///   end of `data`
	pub fn parse(data: &[u8]) -> Result<Self, GmError> {
		let sig = take(data, 0, 8)?;
		if sig != SIGNATURE {
			return Err(GmError::BadSignature([
				sig[0], sig[1], sig[2], sig[3], sig[4], sig[5], sig[6], sig[7],
			]));
		}

		let hdr = take(data, 8, 25)?;
		let magic = [hdr[4], hdr[5], hdr[6], hdr[7]];
		if magic != *b"IHDR" {
			return Err(GmError::UnexpectedChunk(magic));
		}

		let width = u32::from_be_bytes([hdr[8], hdr[9], hdr[10], hdr[11]]);
		let height = u32::from_be_bytes([hdr[12], hdr[13], hdr[14], hdr[15]]);
		let bitdepth = hdr[16];
		let colortype = hdr[17];
		let compression = hdr[18];
		let filter = hdr[19];
		let interlace = hdr[20];
		let crc = u32::from_be_bytes([hdr[21], hdr[22], hdr[23], hdr[24]]);

		if !matches!(bitdepth, 1 | 2 | 4 | 8 | 16) {
			return Err(GmError::InvalidHeader {
				field: "bitdepth",
				value: u32::from(bitdepth),
			});
		}

		if !matches!(colortype, 0 | 2 | 3 | 4 | 6) {
			return Err(GmError::InvalidHeader {
				field: "colortype",
				value: u32::from(colortype),
			});
		}

		// Both methods are always zero in spec-conforming streams; a stream
		// where both are non-zero is corrupt for certain.
		if compression != 0 && filter != 0 {
			return Err(GmError::InvalidHeader {
				field: "compression/filter",
				value: (u32::from(compression) << 8) | u32::from(filter),
			});
		}

		if interlace != 0 && interlace != 1 {
			return Err(GmError::InvalidHeader {
				field: "interlace",
				value: u32::from(interlace),
			});
		}

		let mut total_length = HEADER_SIZE;
		let mut pos = HEADER_SIZE;
		loop {
			let head = take(data, pos, 8)?;
			let chunk_size = u32::from_be_bytes([head[0], head[1], head[2], head[3]]) as usize;
			let chunk_magic = [head[4], head[5], head[6], head[7]];
			if !chunk_magic.iter().all(u8::is_ascii_alphabetic) {
				return Err(GmError::BadChunkTag(chunk_magic));
			}

			// Data and trailing CRC must be present inside the region.
			take(data, pos + 8, chunk_size + 4)?;
			total_length += chunk_size + 12;
			pos += chunk_size + 12;

			if chunk_magic == *b"IEND" {
				break;
			}
		}

		Ok(Self {
			total_length,
			width,
			height,
			bitdepth,
			colortype,
			compression,
			filter,
			interlace,
			crc,
		})
	}
}

impl std::fmt::Display for PngInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "PNG {}x{}, {} bytes", self.width, self.height, self.total_length)
	}
}

/// Region-bounded read: running past the end of `data` means the stream
/// overflows whatever region the caller trusted it to fit in.
fn take(data: &[u8], offset: usize, len: usize) -> Result<&[u8], GmError> {
	let end = offset.checked_add(len).ok_or(GmError::Overflow {
		required: u64::MAX,
		available: data.len() as u64,
	})?;
	if end > data.len() {
		return Err(GmError::Overflow {
			required: end as u64,
			available: data.len() as u64,
		});
	}
	Ok(&data[offset..end])
}
