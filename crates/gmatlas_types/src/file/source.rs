//! Bounds-checked access to the archive's byte buffer.
//!
//! The container addresses its own contents with absolute byte offsets, so
//! every dereference in the parser goes through [`Source::slice`]. Offsets
//! stay plain integers; they are never turned into anything that could read
//! outside the buffer.

use crate::file::GmError;

/// A read-only view over the raw archive bytes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Source<'a> {
	data: &'a [u8],
}

impl<'a> Source<'a> {
	pub(crate) fn new(data: &'a [u8]) -> Self {
		Self { data }
	}

	pub(crate) fn len(&self) -> usize {
		self.data.len()
	}

	/// Returns `len` bytes starting at `offset`.
	///
	/// The single bounds check every other accessor is built on; fails with
	/// [`GmError::IllegalOffset`] if the range is not fully inside the buffer.
	pub(crate) fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], GmError> {
		let end = offset.checked_add(len).ok_or(GmError::IllegalOffset {
			offset: offset as u64,
			start: 0,
			end: self.data.len() as u64,
		})?;
		if end > self.data.len() {
			return Err(GmError::IllegalOffset {
				offset: offset as u64,
				start: 0,
				end: self.data.len() as u64,
			});
		}
		Ok(&self.data[offset..end])
	}

	pub(crate) fn u16_le(&self, offset: usize) -> Result<u16, GmError> {
		let b = self.slice(offset, 2)?;
		Ok(u16::from_le_bytes([b[0], b[1]]))
	}

	pub(crate) fn u32_le(&self, offset: usize) -> Result<u32, GmError> {
		let b = self.slice(offset, 4)?;
		Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
	}

	pub(crate) fn tag(&self, offset: usize) -> Result<[u8; 4], GmError> {
		let b = self.slice(offset, 4)?;
		Ok([b[0], b[1], b[2], b[3]])
	}
}
