//! Read and rewrite ID3v1 and ID3v2 tags in place.
//!
//! [`file::Id3File`] finds every tag region in a file, merges them
//! into one primary [`tag::Tag`], and writes changes back without
//! touching the audio data around them.

pub mod codec;
pub mod errors;
pub mod file;
pub mod stream;
pub mod tag;

pub use codec::{Id3Codec, TagCodec};
pub use file::{Id3File, OpenMode};
pub use tag::{Field, Frame, FrameId, Tag, TextEncoding};
