//! Turn bytes into tags and tags into bytes.
//!
//! Nothing here touches a stream: every function works
//! on an in-memory blob.

use tracing::trace;

use crate::{
	errors::{Id3DecodeError, Id3EncodeError},
	tag::Tag,
};

pub mod header;
pub mod text;
pub mod unsynch;
pub mod v1;
pub mod v2read;
pub mod v2write;

use header::{HeaderKind, Id3v2Header, HEADER_LEN};
use v1::V1_LEN;

/// How many bytes [`TagCodec::probe`] needs to recognize an ID3v2 header or footer
pub const PROBE_LEN: usize = HEADER_LEN;

/// The binary side of tag handling.
///
/// [`crate::Id3File`] finds and splices tags through this trait,
/// so it never needs to know the format of the bytes it moves.
pub trait TagCodec {
	/// Look for a tag at the start of `data`.
	///
	/// Returns the length of the tag that starts here if positive,
	/// or the distance back to the start of a tag that ends here if negative.
	/// Zero means there is no tag.
	fn probe(&self, data: &[u8]) -> i64;

	/// Parse the tag that fills `data`
	fn parse(&self, data: &[u8]) -> Result<Tag, Id3DecodeError>;

	/// Render `tag`.
	/// An empty result means there is nothing to write.
	fn render(&self, tag: &Tag) -> Result<Vec<u8>, Id3EncodeError>;
}

/// The ID3v1 + ID3v2 codec
#[derive(Debug, Default, Clone, Copy)]
pub struct Id3Codec;

impl TagCodec for Id3Codec {
	fn probe(&self, data: &[u8]) -> i64 {
		if data.len() >= V1_LEN && data.starts_with(b"TAG") {
			return V1_LEN as i64;
		}

		match Id3v2Header::decode(data) {
			None => 0,
			Some(h) => match h.kind {
				HeaderKind::Header => h.total_len() as i64,
				HeaderKind::Footer => -(i64::from(h.size) + HEADER_LEN as i64),
			},
		}
	}

	fn parse(&self, data: &[u8]) -> Result<Tag, Id3DecodeError> {
		let tag = if data.starts_with(b"TAG") {
			v1::parse(data)?
		} else {
			v2read::parse(data)?
		};

		trace!(
			message = "Parsed tag",
			version = %tag.version(),
			frames = tag.n_frames(),
			bytes = data.len()
		);

		return Ok(tag);
	}

	fn render(&self, tag: &Tag) -> Result<Vec<u8>, Id3EncodeError> {
		if tag.options().is_id3v1() {
			return Ok(v1::render(tag).to_vec());
		}

		let out = v2write::render(tag)?;
		trace!(
			message = "Rendered tag",
			frames = tag.n_frames(),
			bytes = out.len()
		);
		return Ok(out);
	}
}
