//! Write tags back into a stream.

use std::io::{Read, Seek, SeekFrom, Write};
use tracing::{debug, trace};

use super::index::{FileTagIndex, FileTagRegion};
use crate::{codec::v1::V1_LEN, stream::TagStream};

/// How to replace a region `[start, old_end)` with
/// new data that ends at `new_end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
	/// The new data is exactly as long as the old. Overwrite it.
	InPlace,

	/// Read everything after the old region, write the new data,
	/// then write what we read after it.
	Splice {
		/// How many bytes follow the old region
		remainder: u64,

		/// If the file shrinks, its new length
		truncate_to: Option<u64>,
	},
}

pub fn plan_resize(old_end: u64, new_end: u64, file_len: u64) -> ResizePlan {
	if old_end == new_end {
		return ResizePlan::InPlace;
	}

	let remainder = file_len.saturating_sub(old_end);
	let new_len = new_end + remainder;

	return ResizePlan::Splice {
		remainder,
		truncate_to: (new_len < file_len).then_some(new_len),
	};
}

/// Writes rendered tags over the regions we found them in.
pub(crate) struct FileRewriter<'a, S: TagStream> {
	stream: &'a mut S,
	index: &'a mut FileTagIndex,
}

impl<'a, S: TagStream> FileRewriter<'a, S> {
	pub fn new(stream: &'a mut S, index: &'a mut FileTagIndex) -> Self {
		Self { stream, index }
	}

	/// Replace the first region with `data`, growing
	/// or shrinking the stream as needed.
	///
	/// Does nothing if the file has no header tag.
	pub fn write_header(&mut self, data: &[u8]) -> std::io::Result<()> {
		if !self.index.header_exists() {
			trace!(message = "No header tag, not writing");
			return Ok(());
		}

		let Some(first) = self.index.first().copied() else {
			return Ok(());
		};

		let file_len = self.stream.seek(SeekFrom::End(0))?;
		let new_end = first.location + data.len() as u64;
		let plan = plan_resize(first.end(), new_end, file_len);

		match plan {
			ResizePlan::InPlace => {
				trace!(
					message = "Overwriting header tag",
					location = first.location,
					length = data.len()
				);
				self.stream.seek(SeekFrom::Start(first.location))?;
				self.stream.write_all(data)?;
				self.stream.flush()?;
			}

			ResizePlan::Splice {
				remainder,
				truncate_to,
			} => {
				debug!(
					message = "Resizing header tag",
					location = first.location,
					old_length = first.length,
					new_length = data.len(),
					remainder
				);

				self.stream.seek(SeekFrom::Start(first.end()))?;
				let mut rest = Vec::new();
				self.stream.read_to_end(&mut rest)?;

				self.stream.seek(SeekFrom::Start(first.location))?;
				self.stream.write_all(data)?;
				self.stream.write_all(&rest)?;
				self.stream.flush()?;

				if let Some(len) = truncate_to {
					self.stream.set_len(len)?;
				}
			}
		}

		self.index.resize_first(data.len() as u64);
		return Ok(());
	}

	/// Write, replace, or remove the trailing tag.
	///
	/// `Some(data)` writes `data` as the trailing tag.
	/// `None` removes the trailing tag, if there is one.
	pub fn write_trailing(&mut self, data: Option<&[u8]>) -> std::io::Result<()> {
		match data {
			Some(data) => {
				let has_trailing = self.index.has_trailing();
				let offset = if has_trailing { -(V1_LEN as i64) } else { 0 };
				let location = self.stream.seek(SeekFrom::End(offset))?;

				trace!(message = "Writing trailing tag", location, replace = has_trailing);
				self.stream.write_all(data)?;
				self.stream.flush()?;

				if !has_trailing {
					self.index.insert(FileTagRegion {
						tag: None,
						location,
						length: V1_LEN as u64,
					});
					self.index.set_has_trailing(true);
				}
			}

			None => {
				if !self.index.has_trailing() {
					return Ok(());
				}

				let len = self.stream.seek(SeekFrom::End(0))?;
				if len < V1_LEN as u64 {
					debug!(message = "Stream too short to hold trailing tag", len);
					return Ok(());
				}

				trace!(message = "Removing trailing tag", len);
				self.stream.set_len(len - V1_LEN as u64)?;
				self.index.remove_trailing();
			}
		}

		return Ok(());
	}
}
