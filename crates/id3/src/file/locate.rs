//! Find the tags in a stream.

use std::io::{Seek, SeekFrom};
use tracing::{debug, trace};

use super::index::{FileTagIndex, FileTagRegion, TagArena, TagId};
use crate::{
	codec::{v1::V1_LEN, TagCodec, PROBE_LEN},
	stream::{read_up_to, TagStream},
	tag::FrameId,
};

/// The result of trying to register a tag at the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Candidate {
	/// We parsed and registered a new tag
	New(TagId),

	/// We already found this exact region
	Duplicate(TagId),

	/// This region overlaps one we already found, and was ignored
	Overlap,

	/// This region doesn't hold a tag we can read
	Invalid,
}

/// Scans a stream for tags.
///
/// All regions go into `index`, all physical tags into `arena`.
pub(crate) struct TagLocator<'a, S: TagStream, C: TagCodec> {
	stream: &'a mut S,
	codec: &'a C,
	index: &'a mut FileTagIndex,
	arena: &'a mut TagArena,

	/// Every new tag we found, in the order we found it
	discovered: Vec<TagId>,
}

impl<'a, S: TagStream, C: TagCodec> TagLocator<'a, S, C> {
	pub fn new(
		stream: &'a mut S,
		codec: &'a C,
		index: &'a mut FileTagIndex,
		arena: &'a mut TagArena,
	) -> Self {
		Self {
			stream,
			codec,
			index,
			arena,
			discovered: Vec::new(),
		}
	}

	/// Run every probe.
	/// Returns the tags we found, in the order they were found.
	/// The stream's position is left unchanged.
	pub fn locate(mut self) -> std::io::Result<Vec<TagId>> {
		let start = self.stream.stream_position()?;

		self.find_trailing()?;
		self.find_header_chain()?;
		self.find_appended()?;

		self.stream.seek(SeekFrom::Start(start))?;

		debug!(
			message = "Located tags",
			regions = self.index.len(),
			has_trailing = self.index.has_trailing()
		);

		return Ok(self.discovered);
	}

	/// Probe for a tag at the current position,
	/// reading at most `window` bytes.
	/// Does not move the cursor.
	fn probe(&mut self, window: usize) -> std::io::Result<i64> {
		let pos = self.stream.stream_position()?;
		let mut buf = vec![0u8; window];
		let read = read_up_to(&mut *self.stream, &mut buf);
		self.stream.seek(SeekFrom::Start(pos))?;

		let n = read?;
		let size = self.codec.probe(&buf[..n]);
		trace!(message = "Probed", offset = pos, size);
		return Ok(size);
	}

	/// Try to register a tag of `length` bytes at the current position.
	///
	/// If a new tag is found, the cursor is left at the end of its region.
	/// Otherwise, the cursor is not moved.
	pub fn add_tag(&mut self, length: u64) -> std::io::Result<Candidate> {
		let location = self.stream.stream_position()?;

		if let Some(r) = self.index.find_duplicate(location, length) {
			trace!(message = "Duplicate region", location, length);
			return Ok(match r.tag {
				Some(id) => Candidate::Duplicate(id),
				None => Candidate::Overlap,
			});
		}

		if self.index.find_overlap(location, length).is_some() {
			debug!(message = "Ignoring overlapping region", location, length);
			return Ok(Candidate::Overlap);
		}

		let Ok(buf_len) = usize::try_from(length) else {
			return Ok(Candidate::Invalid);
		};

		let mut buf = vec![0u8; buf_len];
		let read = read_up_to(&mut *self.stream, &mut buf)?;
		if read != buf_len {
			debug!(message = "Region runs past end of stream", location, length);
			self.stream.seek(SeekFrom::Start(location))?;
			return Ok(Candidate::Invalid);
		}

		let tag = match self.codec.parse(&buf) {
			Ok(tag) => tag,
			Err(error) => {
				debug!(message = "Could not parse tag", location, length, %error);
				self.stream.seek(SeekFrom::Start(location))?;
				return Ok(Candidate::Invalid);
			}
		};

		trace!(
			message = "Found tag",
			location,
			length,
			version = %tag.version(),
			frames = tag.n_frames()
		);

		let id = self.arena.insert(tag);
		self.index.insert(FileTagRegion {
			tag: Some(id),
			location,
			length,
		});
		self.discovered.push(id);

		return Ok(Candidate::New(id));
	}

	/// Look for an ID3v1 tag in the last 128 bytes
	fn find_trailing(&mut self) -> std::io::Result<()> {
		let len = self.stream.seek(SeekFrom::End(0))?;
		if len < V1_LEN as u64 {
			return Ok(());
		}

		self.stream.seek(SeekFrom::End(-(V1_LEN as i64)))?;
		let size = self.probe(V1_LEN)?;
		if size <= 0 {
			return Ok(());
		}

		if let Candidate::New(id) = self.add_tag(size.unsigned_abs())? {
			if self.arena.get(id).is_some_and(|t| t.version().is_v1()) {
				self.index.set_has_trailing(true);
			}
		}

		return Ok(());
	}

	/// Look for a tag at the start of the stream,
	/// and follow any `SEEK` frames it has.
	fn find_header_chain(&mut self) -> std::io::Result<()> {
		self.stream.seek(SeekFrom::Start(0))?;
		let size = self.probe(PROBE_LEN)?;
		if size <= 0 {
			return Ok(());
		}

		let Candidate::New(mut id) = self.add_tag(size.unsigned_abs())? else {
			return Ok(());
		};

		loop {
			let offset = self
				.arena
				.get(id)
				.and_then(|t| t.find_frame(Some(FrameId::SEEK), 0))
				.and_then(|f| f.seek_offset());

			let Some(offset) = offset else {
				break;
			};

			if offset < 0 {
				debug!(message = "Not following negative seek", offset);
				break;
			}

			// We're at the end of the last tag
			self.stream.seek(SeekFrom::Current(i64::from(offset)))?;
			let size = self.probe(PROBE_LEN)?;
			if size <= 0 {
				break;
			}

			match self.add_tag(size.unsigned_abs())? {
				Candidate::New(next) => id = next,
				Candidate::Duplicate(seen) => {
					debug!(message = "Seek chain reached a known tag", tag = %seen);
					break;
				}
				Candidate::Overlap | Candidate::Invalid => break,
			}
		}

		return Ok(());
	}

	/// Look for a tag that ends right before the trailing tag
	/// (or right before the end of the stream, if there is none).
	/// Such tags have a footer that points back to their header.
	fn find_appended(&mut self) -> std::io::Result<()> {
		let len = self.stream.seek(SeekFrom::End(0))?;
		let end = if self.index.has_trailing() {
			len.saturating_sub(V1_LEN as u64)
		} else {
			len
		};

		let Some(footer_start) = end.checked_sub(PROBE_LEN as u64) else {
			return Ok(());
		};

		self.stream.seek(SeekFrom::Start(footer_start))?;
		let size = self.probe(PROBE_LEN)?;
		if size >= 0 {
			return Ok(());
		}

		let Some(header_start) = footer_start.checked_sub(size.unsigned_abs()) else {
			return Ok(());
		};

		self.stream.seek(SeekFrom::Start(header_start))?;
		let size = self.probe(PROBE_LEN)?;
		if size > 0 {
			self.add_tag(size.unsigned_abs())?;
		}

		return Ok(());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		codec::Id3Codec,
		tag::{Frame, Tag},
	};
	use std::io::Cursor;

	fn tag_bytes(title: &str, extra: Option<Frame>, append: bool) -> Vec<u8> {
		let mut tag = Tag::new();
		tag.attach_frame(Frame::text(FrameId::TITLE, &[title]));
		if let Some(f) = extra {
			tag.attach_frame(f);
		}
		tag.set_append(append);
		Id3Codec.render(&tag).unwrap()
	}

	fn v1_bytes(title: &str) -> Vec<u8> {
		let mut tag = Tag::new();
		tag.attach_frame(Frame::text(FrameId::TITLE, &[title]));
		tag.set_render_v1(true);
		Id3Codec.render(&tag).unwrap()
	}

	struct Scan {
		stream: Cursor<Vec<u8>>,
		index: FileTagIndex,
		arena: TagArena,
	}

	impl Scan {
		fn new(data: Vec<u8>) -> Self {
			Self {
				stream: Cursor::new(data),
				index: FileTagIndex::new(),
				arena: TagArena::default(),
			}
		}

		fn locator(&mut self) -> TagLocator<'_, Cursor<Vec<u8>>, Id3Codec> {
			TagLocator::new(&mut self.stream, &Id3Codec, &mut self.index, &mut self.arena)
		}

		fn title(&self, id: TagId) -> Option<&str> {
			self.arena
				.get(id)
				.and_then(|t| t.find_frame(Some(FrameId::TITLE), 0))
				.and_then(|f| f.text_value())
		}
	}

	#[test]
	fn untagged() {
		let mut scan = Scan::new(vec![0x55; 1000]);
		let found = scan.locator().locate().unwrap();
		assert!(found.is_empty());
		assert!(scan.index.is_empty());
		assert!(!scan.index.has_trailing());
	}

	#[test]
	fn short_untagged() {
		let mut scan = Scan::new(vec![0x55; 5]);
		assert!(scan.locator().locate().unwrap().is_empty());
	}

	#[test]
	fn header_and_trailing() {
		let header = tag_bytes("head", None, false);
		let mut data = header.clone();
		data.extend([0x55; 500]);
		data.extend(v1_bytes("tail"));
		let len = data.len() as u64;

		let mut scan = Scan::new(data);
		scan.stream.seek(SeekFrom::Start(42)).unwrap();
		let found = scan.locator().locate().unwrap();

		// The scan leaves the cursor where it was
		assert_eq!(scan.stream.position(), 42);

		// The trailing tag is found first
		assert_eq!(found.len(), 2);
		assert_eq!(scan.title(found[0]), Some("tail"));
		assert_eq!(scan.title(found[1]), Some("head"));

		assert!(scan.index.has_trailing());
		assert!(scan.index.header_exists());
		let regions = scan.index.regions();
		assert_eq!(regions[0].location, 0);
		assert_eq!(regions[0].length, header.len() as u64);
		assert_eq!(regions[1].location, len - 128);
		assert_eq!(regions[1].length, 128);
	}

	#[test]
	fn duplicate_returns_existing_tag() {
		let header = tag_bytes("head", None, false);
		let mut scan = Scan::new(header.clone());
		let mut locator = scan.locator();

		let first = locator.add_tag(header.len() as u64).unwrap();
		let Candidate::New(id) = first else {
			panic!("expected a new tag")
		};

		locator.stream.seek(SeekFrom::Start(0)).unwrap();
		let second = locator.add_tag(header.len() as u64).unwrap();
		assert_eq!(second, Candidate::Duplicate(id));
		assert_eq!(locator.discovered, [id]);

		drop(locator);
		assert_eq!(scan.index.len(), 1);
		assert_eq!(scan.arena.len(), 1);
	}

	#[test]
	fn overlap_and_invalid_leave_cursor() {
		let header = tag_bytes("head", None, false);
		let mut data = header.clone();
		data.extend([0x55; 100]);
		let mut scan = Scan::new(data);
		let mut locator = scan.locator();

		assert!(matches!(
			locator.add_tag(header.len() as u64).unwrap(),
			Candidate::New(_)
		));

		locator.stream.seek(SeekFrom::Start(5)).unwrap();
		assert_eq!(locator.add_tag(20).unwrap(), Candidate::Overlap);
		assert_eq!(locator.stream.position(), 5);

		// Not a tag
		let pos = header.len() as u64 + 10;
		locator.stream.seek(SeekFrom::Start(pos)).unwrap();
		assert_eq!(locator.add_tag(20).unwrap(), Candidate::Invalid);
		assert_eq!(locator.stream.position(), pos);

		// Runs past the end
		assert_eq!(locator.add_tag(5000).unwrap(), Candidate::Invalid);
		assert_eq!(locator.stream.position(), pos);
	}

	#[test]
	fn follows_seek_chain() {
		let second = tag_bytes("second", None, false);
		let gap = 37;
		let first = tag_bytes("first", Some(Frame::seek(gap)), false);

		let mut data = first.clone();
		data.extend(vec![0x55; gap as usize]);
		data.extend(&second);
		data.extend([0x55; 300]);

		let mut scan = Scan::new(data);
		let found = scan.locator().locate().unwrap();
		assert_eq!(found.len(), 2);
		assert_eq!(scan.title(found[1]), Some("second"));
		assert_eq!(
			scan.index.regions()[1].location,
			first.len() as u64 + gap as u64
		);
	}

	#[test]
	fn negative_seek_stops_chain() {
		let second = tag_bytes("second", None, false);
		let first = tag_bytes("first", Some(Frame::seek(-1)), false);

		let mut data = first.clone();
		data.extend(&second);
		data.extend([0x55; 300]);

		let mut scan = Scan::new(data);
		let found = scan.locator().locate().unwrap();
		assert_eq!(found.len(), 1);
		assert_eq!(scan.title(found[0]), Some("first"));
	}

	#[test]
	fn seek_chain_stops_at_duplicate() {
		// An ID3v2 tag in the last 128 bytes is found by the trailing probe,
		// so the chain reaches a region we already have.
		let mut last = Tag::new();
		last.attach_frame(Frame::text(FrameId::TITLE, &["last"]));
		last.set_length(128);
		let last = Id3Codec.render(&last).unwrap();
		assert_eq!(last.len(), 128);

		let gap = 20;
		let first = tag_bytes("first", Some(Frame::seek(gap)), false);
		let mut data = first.clone();
		data.extend(vec![0x55; gap as usize]);
		data.extend(&last);

		let mut scan = Scan::new(data);
		let found = scan.locator().locate().unwrap();
		assert_eq!(found.len(), 2);
		assert_eq!(scan.title(found[0]), Some("last"));
		assert_eq!(scan.title(found[1]), Some("first"));
		assert_eq!(scan.index.len(), 2);

		// Not ID3v1, so this isn't a trailing tag
		assert!(!scan.index.has_trailing());
	}

	#[test]
	fn appended_before_trailing() {
		let appended = tag_bytes("appended", None, true);
		let mut data = vec![0x55; 700];
		data.extend(&appended);
		data.extend(v1_bytes("tail"));

		let mut scan = Scan::new(data);
		let found = scan.locator().locate().unwrap();
		assert_eq!(found.len(), 2);
		assert_eq!(scan.title(found[1]), Some("appended"));

		let regions = scan.index.regions();
		assert_eq!(regions[0].location, 700);
		assert_eq!(regions[0].length, appended.len() as u64);
		assert!(scan.index.has_trailing());
		assert!(scan.index.header_exists());
	}

	#[test]
	fn appended_without_trailing() {
		let appended = tag_bytes("appended", None, true);
		let mut data = vec![0x55; 300];
		data.extend(&appended);

		let mut scan = Scan::new(data);
		let found = scan.locator().locate().unwrap();
		assert_eq!(found.len(), 1);
		assert!(!scan.index.has_trailing());
		assert_eq!(scan.index.regions()[0].location, 300);
	}
}
