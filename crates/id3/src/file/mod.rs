//! Tags in files.
//!
//! A file may hold several physical tags: an ID3v1 tag in its last
//! 128 bytes, an ID3v2 tag at its start (possibly followed by more
//! tags it points to with `SEEK` frames), and an ID3v2 tag appended
//! after the audio. [`Id3File`] finds all of them, merges them into
//! one primary tag, and writes that tag back in their place.

use std::{
	fs::{File, OpenOptions},
	io::{Seek, SeekFrom},
	path::Path,
};
use tracing::debug;

use crate::{
	codec::{Id3Codec, TagCodec},
	errors::Id3FileError,
	stream::TagStream,
	tag::Tag,
};

mod index;
mod locate;
mod merge;
mod rewrite;

pub use index::{FileTagIndex, FileTagRegion, TagArena, TagId};
pub use rewrite::{plan_resize, ResizePlan};

use locate::TagLocator;
use merge::TagMerger;
use rewrite::FileRewriter;

/// How to open a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
	/// Read tags. [`Id3File::update`] will fail.
	ReadOnly,

	/// Read and rewrite tags
	ReadWrite,
}

/// A stream and the tags in it.
pub struct Id3File<S: TagStream, C: TagCodec = Id3Codec> {
	stream: S,
	codec: C,

	/// Every physical tag we found
	arena: TagArena,
	index: FileTagIndex,

	/// What [`Id3File::tag`] returns
	primary: Tag,
}

impl Id3File<File> {
	/// Open the file at `path` and find its tags.
	pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self, Id3FileError> {
		let path = path.as_ref();
		let file = match mode {
			OpenMode::ReadOnly => File::open(path)?,
			OpenMode::ReadWrite => OpenOptions::new().read(true).write(true).open(path)?,
		};

		debug!(message = "Opened file", path = %path.display(), write = mode == OpenMode::ReadWrite);
		Self::from_stream(file)
	}
}

impl<S: TagStream> Id3File<S> {
	/// Find the tags in `stream`.
	pub fn from_stream(stream: S) -> Result<Self, Id3FileError> {
		Self::with_codec(stream, Id3Codec)
	}
}

impl<S: TagStream, C: TagCodec> Id3File<S, C> {
	/// Find the tags in `stream` using `codec`.
	pub fn with_codec(mut stream: S, codec: C) -> Result<Self, Id3FileError> {
		let mut arena = TagArena::default();
		let mut index = FileTagIndex::new();
		let mut primary = Tag::new();

		let found = TagLocator::new(&mut stream, &codec, &mut index, &mut arena).locate()?;

		let mut merger = TagMerger::new(&mut primary);
		for tag in found.iter().filter_map(|id| arena.get(*id)) {
			merger.merge(tag);
		}
		merger.finish(&index);

		// Untagged files get an empty tag at the very start,
		// so that `update` has somewhere to write.
		if index.is_empty() {
			let tag = Tag::new();
			merger.merge(&tag);
			let id = arena.insert(tag);
			index.insert(FileTagRegion {
				tag: Some(id),
				location: 0,
				length: 0,
			});
		}

		primary.set_render_v1(index.has_trailing());

		return Ok(Self {
			stream,
			codec,
			arena,
			index,
			primary,
		});
	}

	/// The primary tag: the result of merging every tag in this file
	pub fn tag(&self) -> &Tag {
		&self.primary
	}

	/// Changes to the primary tag are written by [`Self::update`].
	pub fn tag_mut(&mut self) -> &mut Tag {
		&mut self.primary
	}

	pub fn regions(&self) -> &[FileTagRegion] {
		self.index.regions()
	}

	pub fn index(&self) -> &FileTagIndex {
		&self.index
	}

	pub fn has_trailing(&self) -> bool {
		self.index.has_trailing()
	}

	/// A tag exactly as we found it in this file
	pub fn physical_tag(&self, id: TagId) -> Option<&Tag> {
		self.arena.get(id)
	}

	/// Write the primary tag back to the stream.
	///
	/// The ID3v2 tag replaces the first tag region, resizing the
	/// stream if its length changed. If [`Tag::render_v1`] is set,
	/// an ID3v1 tag is written (or replaced) at the end of the stream.
	/// If it isn't, any ID3v1 tag we found is removed.
	pub fn update(&mut self) -> Result<(), Id3FileError> {
		let render_v1 = self.primary.render_v1();
		let result = self.write_tags(render_v1);
		self.primary.set_render_v1(render_v1);
		return result;
	}

	fn write_tags(&mut self, render_v1: bool) -> Result<(), Id3FileError> {
		let v1 = if render_v1 {
			Some(self.codec.render(&self.primary)?)
		} else {
			None
		};

		self.primary.set_render_v1(false);
		let v2 = self.codec.render(&self.primary)?;

		debug!(
			message = "Updating tags",
			frames = self.primary.n_frames(),
			v2_length = v2.len(),
			v1 = v1.is_some()
		);

		let mut rewriter = FileRewriter::new(&mut self.stream, &mut self.index);
		rewriter.write_header(&v2)?;
		rewriter.write_trailing(v1.as_deref())?;

		// The header region may have been resized,
		// pad to its new length next time.
		TagMerger::new(&mut self.primary).finish(&self.index);

		self.stream.seek(SeekFrom::Start(0))?;
		return Ok(());
	}

	/// Drop every tag and return the stream.
	pub fn close(self) -> S {
		let Self {
			stream,
			primary,
			arena,
			..
		} = self;
		drop(primary);
		drop(arena);
		stream
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		codec::{header::HEADER_LEN, v1::V1_LEN},
		tag::{Frame, FrameId},
	};
	use rand::{rngs::StdRng, Rng, SeedableRng};
	use sha2::{Digest, Sha256};
	use std::io::{Cursor, Read, Write};

	fn audio(len: usize, seed: u64) -> Vec<u8> {
		let mut rng = StdRng::seed_from_u64(seed);
		let mut data = vec![0u8; len];
		rng.fill(&mut data[..]);
		// Make sure no probe mistakes audio for a tag
		data[0] = 0xFF;
		data
	}

	fn hash(data: &[u8]) -> Vec<u8> {
		Sha256::digest(data).to_vec()
	}

	fn v2(titles: &[&str], length: u64, append: bool) -> Vec<u8> {
		let mut tag = Tag::new();
		for t in titles {
			tag.attach_frame(Frame::text(FrameId::TITLE, &[t]));
		}
		tag.set_length(length);
		tag.set_append(append);
		Id3Codec.render(&tag).unwrap()
	}

	fn v1(title: &str) -> Vec<u8> {
		let mut tag = Tag::new();
		tag.attach_frame(Frame::text(FrameId::TITLE, &[title]));
		tag.set_render_v1(true);
		Id3Codec.render(&tag).unwrap()
	}

	fn title(tag: &Tag) -> Option<&str> {
		tag.find_frame(Some(FrameId::TITLE), 0)
			.and_then(|f| f.text_value())
	}

	fn open(data: Vec<u8>) -> Id3File<Cursor<Vec<u8>>> {
		Id3File::from_stream(Cursor::new(data)).unwrap()
	}

	/// The length of the ID3v2 tag at the start of `data`, if there is one
	fn header_len(data: &[u8]) -> usize {
		Id3Codec.probe(&data[..HEADER_LEN]).max(0) as usize
	}

	#[test]
	fn header_only() {
		let tag = v2(&["hello"], 256, false);
		let mut data = tag.clone();
		data.extend(audio(2000, 1));

		let file = open(data);
		assert_eq!(file.regions().len(), 1);
		assert!(!file.has_trailing());
		assert!(!file.tag().append());
		assert!(!file.tag().render_v1());
		assert_eq!(file.tag().length(), tag.len() as u64);
		assert_eq!(title(file.tag()), Some("hello"));

		let id = file.regions()[0].tag.unwrap();
		assert_eq!(title(file.physical_tag(id).unwrap()), Some("hello"));
	}

	#[test]
	fn untagged_gets_empty_region() {
		let file = open(audio(1000, 2));
		assert_eq!(
			file.regions(),
			&[FileTagRegion {
				tag: file.regions()[0].tag,
				location: 0,
				length: 0
			}]
		);
		assert!(file.regions()[0].tag.is_some());
		assert!(!file.has_trailing());
		assert!(!file.tag().render_v1());
		assert!(!file.tag().append());
		assert_eq!(file.tag().n_frames(), 0);
	}

	#[test]
	fn tag_untagged_file() {
		let payload = audio(3000, 3);
		let mut file = open(payload.clone());
		file.tag_mut()
			.attach_frame(Frame::text(FrameId::TITLE, &["new"]));
		file.update().unwrap();

		let data = file.close().into_inner();
		let n = header_len(&data);
		assert!(n > 0);

		let blob = Id3Codec
			.render(&{
				let mut t = Tag::new();
				t.attach_frame(Frame::text(FrameId::TITLE, &["new"]));
				t
			})
			.unwrap();
		assert_eq!(n, blob.len());
		assert_eq!(&data[..n], &blob[..]);
		assert_eq!(hash(&data[n..]), hash(&payload));
		assert_eq!(data.len(), n + payload.len());
	}

	#[test]
	fn add_trailing_appends_128_bytes() {
		let payload = audio(3000, 4);
		let mut file = open(payload.clone());
		file.tag_mut().set_render_v1(true);
		file.update().unwrap();
		assert!(file.has_trailing());

		// `update` leaves the setting as it was
		assert!(file.tag().render_v1());

		let data = file.close().into_inner();
		assert_eq!(data.len(), payload.len() + V1_LEN);
		assert_eq!(&data[..payload.len()], &payload[..]);
		assert!(data[payload.len()..].starts_with(b"TAG"));
	}

	#[test]
	fn strip_trailing() {
		let payload = audio(3000, 5);
		let mut data = payload.clone();
		data.extend(v1("old"));

		let mut file = open(data);
		assert!(file.has_trailing());
		assert!(file.tag().render_v1());
		assert_eq!(title(file.tag()), Some("old"));

		file.tag_mut().set_render_v1(false);
		file.update().unwrap();
		assert!(!file.has_trailing());
		assert_eq!(file.close().into_inner(), payload);
	}

	#[test]
	fn header_and_trailing_update() {
		let payload = audio(5000, 6);
		let mut data = v2(&["head"], 512, false);
		data.extend(&payload);
		data.extend(v1("tail"));

		let mut file = open(data);
		assert_eq!(file.regions().len(), 2);
		assert!(file.has_trailing());

		// The header tag is found last, and isn't an update
		assert_eq!(title(file.tag()), Some("head"));

		file.tag_mut().clear_frames();
		file.tag_mut()
			.attach_frame(Frame::text(FrameId::TITLE, &["both"]));
		file.update().unwrap();

		let data = file.close().into_inner();

		// Fits in the old padding, so the file keeps its length
		assert_eq!(header_len(&data), 512);
		assert_eq!(hash(&data[512..512 + payload.len()]), hash(&payload));

		let file = open(data);
		assert_eq!(title(file.tag()), Some("both"));
		let trailing = file.regions()[1].tag.unwrap();
		assert_eq!(title(file.physical_tag(trailing).unwrap()), Some("both"));
	}

	#[test]
	fn repeated_resizes_keep_payload() {
		let payload = audio(4000, 7);
		let mut data = v2(&["a"], 0, false);
		data.extend(&payload);
		data.extend(v1("a"));

		let mut file = open(data);
		let long = "x".repeat(900);
		for (i, text) in ["grow", long.as_str(), "shrink", ""].into_iter().enumerate() {
			file.tag_mut().clear_frames();
			if !text.is_empty() {
				file.tag_mut()
					.attach_frame(Frame::text(FrameId::TITLE, &[text]));
			}
			file.tag_mut().set_length(0);
			file.update().unwrap();

			let data = file.stream.get_ref().clone();
			let n = header_len(&data);
			assert_eq!(file.regions()[0].length, n as u64, "round {i}");
			assert_eq!(
				hash(&data[n..n + payload.len()]),
				hash(&payload),
				"round {i}"
			);
			assert_eq!(data.len(), n + payload.len() + V1_LEN, "round {i}");
		}
	}

	#[test]
	fn removing_all_frames_removes_header() {
		let payload = audio(2000, 8);
		let mut data = v2(&["gone"], 0, false);
		data.extend(&payload);

		let mut file = open(data);
		file.tag_mut().clear_frames();
		file.update().unwrap();
		assert_eq!(file.regions()[0].length, 0);
		assert_eq!(file.close().into_inner(), payload);
	}

	#[test]
	fn appended_tag_sets_append() {
		let payload = audio(2000, 9);
		let appended = v2(&["appended"], 0, true);
		let mut data = payload.clone();
		data.extend(&appended);
		data.extend(v1("tail"));

		let mut file = open(data);
		assert_eq!(file.regions().len(), 2);
		assert_eq!(file.regions()[0].location, payload.len() as u64);
		assert!(file.tag().append());
		assert_eq!(title(file.tag()), Some("appended"));

		file.tag_mut()
			.attach_frame(Frame::text(FrameId::ARTIST, &["someone"]));
		file.update().unwrap();

		let data = file.close().into_inner();
		assert_eq!(&data[..payload.len()], &payload[..]);

		// The appended tag is still found, with its footer
		let file = open(data);
		assert_eq!(file.regions().len(), 2);
		assert!(file.tag().append());
		assert!(file.tag().find_frame(Some(FrameId::ARTIST), 0).is_some());
	}

	#[test]
	fn update_tags_accumulate() {
		let mut update = Tag::new();
		update.attach_frame(Frame::text(FrameId::ARTIST, &["extra"]));
		update.set_is_update(true);
		let update = Id3Codec.render(&update).unwrap();

		let mut first = Tag::new();
		first.attach_frame(Frame::text(FrameId::TITLE, &["first"]));
		first.attach_frame(Frame::seek(0));
		let first = Id3Codec.render(&first).unwrap();

		let mut data = first;
		data.extend(&update);
		data.extend(audio(1000, 10));

		let file = open(data);
		assert_eq!(file.regions().len(), 2);
		assert_eq!(title(file.tag()), Some("first"));
		assert!(file.tag().find_frame(Some(FrameId::ARTIST), 0).is_some());
	}

	#[test]
	fn render_errors_propagate() {
		let mut file = open(audio(500, 11));
		file.tag_mut().attach_frame(Frame::with_fields(
			FrameId::TITLE,
			vec![crate::tag::Field::Int32(0)],
		));
		assert!(matches!(file.update(), Err(Id3FileError::Encode(_))));
	}

	#[test]
	fn on_disk() {
		let payload = audio(10_000, 12);
		let mut tmp = tempfile::NamedTempFile::new().unwrap();
		tmp.write_all(&payload).unwrap();
		tmp.flush().unwrap();

		let mut file = Id3File::open(tmp.path(), OpenMode::ReadWrite).unwrap();
		file.tag_mut()
			.attach_frame(Frame::text(FrameId::TITLE, &["on disk"]));
		file.tag_mut().set_render_v1(true);
		file.update().unwrap();
		drop(file.close());

		let mut file = Id3File::open(tmp.path(), OpenMode::ReadOnly).unwrap();
		assert_eq!(title(file.tag()), Some("on disk"));
		assert!(file.has_trailing());

		// Read-only files can't be written
		file.tag_mut().clear_frames();
		assert!(matches!(file.update(), Err(Id3FileError::IoError(_))));
		drop(file.close());

		let mut data = Vec::new();
		std::fs::File::open(tmp.path())
			.unwrap()
			.read_to_end(&mut data)
			.unwrap();
		let n = header_len(&data);
		assert_eq!(data.len(), n + payload.len() + V1_LEN);
		assert_eq!(hash(&data[n..n + payload.len()]), hash(&payload));
	}
}
