//! The in-memory tag model shared by the codec and the file engine.

pub mod flags;
mod frame;
pub mod tables;

pub use frame::{Field, Frame, FrameId, TextEncoding};
pub(crate) use frame::FrameLayout;

use flags::{ExtendedFlags, TagFlags, TagOptions};
use std::fmt::Display;

/// The version a tag was read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TagVersion {
	pub major: u8,
	pub revision: u8,
}

impl TagVersion {
	/// The version we render ID3v2 tags as
	pub const V24: Self = Self {
		major: 4,
		revision: 0,
	};

	pub const V23: Self = Self {
		major: 3,
		revision: 0,
	};

	pub const V10: Self = Self {
		major: 1,
		revision: 0,
	};

	/// ID3v1 with a track number
	pub const V11: Self = Self {
		major: 1,
		revision: 1,
	};

	pub fn is_v1(&self) -> bool {
		self.major == 1
	}
}

impl Display for TagVersion {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.is_v1() {
			write!(f, "ID3v1.{}", self.revision)
		} else {
			write!(f, "ID3v2.{}.{}", self.major, self.revision)
		}
	}
}

/// An ID3 tag: an ordered list of frames, plus header state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
	pub(crate) version: TagVersion,
	pub(crate) flags: TagFlags,
	pub(crate) extended_flags: ExtendedFlags,
	pub(crate) options: TagOptions,

	/// Only meaningful if `extended_flags` has restrictions set
	pub(crate) restrictions: u8,

	/// The length this tag should be padded to when rendered.
	/// Zero means "no padding".
	pub(crate) length: u64,

	pub(crate) frames: Vec<Frame>,
}

impl Default for Tag {
	fn default() -> Self {
		Self::new()
	}
}

impl Tag {
	/// Make an empty ID3v2.4 tag
	pub fn new() -> Self {
		Self {
			version: TagVersion::V24,
			flags: TagFlags::empty(),
			extended_flags: ExtendedFlags::empty(),
			options: TagOptions::empty(),
			restrictions: 0,
			length: 0,
			frames: Vec::new(),
		}
	}

	pub fn version(&self) -> TagVersion {
		self.version
	}

	//
	// MARK: Frames
	//

	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	pub fn n_frames(&self) -> usize {
		self.frames.len()
	}

	pub fn frame(&self, index: usize) -> Option<&Frame> {
		self.frames.get(index)
	}

	pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
		self.frames.get_mut(index)
	}

	/// Find the `occurrence`-th frame with the given id.
	/// If `id` is `None`, this is the same as [`Tag::frame`].
	pub fn find_frame(&self, id: Option<FrameId>, occurrence: usize) -> Option<&Frame> {
		let i = self.find_position(id, occurrence)?;
		self.frames.get(i)
	}

	pub fn find_frame_mut(&mut self, id: Option<FrameId>, occurrence: usize) -> Option<&mut Frame> {
		let i = self.find_position(id, occurrence)?;
		self.frames.get_mut(i)
	}

	fn find_position(&self, id: Option<FrameId>, occurrence: usize) -> Option<usize> {
		match id {
			None => (occurrence < self.frames.len()).then_some(occurrence),
			Some(id) => self
				.frames
				.iter()
				.enumerate()
				.filter(|(_, f)| f.id == id)
				.nth(occurrence)
				.map(|(i, _)| i),
		}
	}

	pub fn attach_frame(&mut self, frame: Frame) {
		self.frames.push(frame);
	}

	/// Remove and return the frame at `index`.
	pub fn detach_frame(&mut self, index: usize) -> Option<Frame> {
		if index < self.frames.len() {
			Some(self.frames.remove(index))
		} else {
			None
		}
	}

	/// Remove every frame with the given id, returning how many we removed.
	pub fn remove_frames(&mut self, id: FrameId) -> usize {
		let before = self.frames.len();
		self.frames.retain(|f| f.id != id);
		return before - self.frames.len();
	}

	pub fn clear_frames(&mut self) {
		self.frames.clear();
	}

	/// Replace every frame with `frame`'s id by `frame`.
	/// The new frame takes the position of the first one it replaces.
	pub fn replace_frame(&mut self, frame: Frame) {
		match self.find_position(Some(frame.id), 0) {
			None => self.frames.push(frame),
			Some(i) => {
				let id = frame.id;
				self.frames[i] = frame;
				let mut seen = false;
				self.frames.retain(|f| {
					if f.id != id {
						return true;
					}
					let keep = !seen;
					seen = true;
					keep
				});
			}
		}
	}

	//
	// MARK: Header state
	//

	pub fn flags(&self) -> TagFlags {
		self.flags
	}

	pub fn set_flags(&mut self, flags: TagFlags) {
		self.flags = flags;
	}

	pub fn extended_flags(&self) -> ExtendedFlags {
		self.extended_flags
	}

	pub fn set_extended_flags(&mut self, flags: ExtendedFlags) {
		self.extended_flags = flags;
	}

	pub fn restrictions(&self) -> u8 {
		self.restrictions
	}

	pub fn set_restrictions(&mut self, restrictions: u8) {
		self.restrictions = restrictions;
	}

	pub fn options(&self) -> TagOptions {
		self.options
	}

	/// Set the options in `mask` to the matching bits of `value`.
	/// Returns the new options.
	pub fn set_options(&mut self, mask: TagOptions, value: TagOptions) -> TagOptions {
		self.options = (self.options & !mask) | (value & mask);
		self.options
	}

	pub fn length(&self) -> u64 {
		self.length
	}

	/// Set the length this tag is padded to when rendered.
	pub fn set_length(&mut self, length: u64) {
		self.length = length;
	}

	pub fn is_unsynchronized(&self) -> bool {
		self.flags.is_unsynchronisation()
	}

	pub fn set_unsynchronized(&mut self, value: bool) {
		self.flags.set_unsynchronisation(value)
	}

	pub fn has_extended_header(&self) -> bool {
		self.flags.is_extended_header()
	}

	pub fn set_has_extended_header(&mut self, value: bool) {
		self.flags.set_extended_header(value)
	}

	pub fn is_experimental(&self) -> bool {
		self.flags.is_experimental()
	}

	pub fn set_experimental(&mut self, value: bool) {
		self.flags.set_experimental(value)
	}

	pub fn has_footer(&self) -> bool {
		self.flags.is_footer()
	}

	pub fn set_has_footer(&mut self, value: bool) {
		self.flags.set_footer(value)
	}

	/// If true, this tag adds to the tags before it
	/// instead of replacing them.
	pub fn is_update(&self) -> bool {
		self.extended_flags.is_update()
	}

	pub fn set_is_update(&mut self, value: bool) {
		self.extended_flags.set_update(value)
	}

	/// If true, this tag renders as ID3v1.
	pub fn render_v1(&self) -> bool {
		self.options.is_id3v1()
	}

	pub fn set_render_v1(&mut self, value: bool) {
		self.options.set_id3v1(value)
	}

	/// If true, this tag renders with a footer, so it may
	/// be spliced in after audio data.
	pub fn append(&self) -> bool {
		self.options.is_append()
	}

	pub fn set_append(&mut self, value: bool) {
		self.options.set_append(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn sample() -> Tag {
		let mut t = Tag::new();
		t.attach_frame(Frame::text(FrameId::TITLE, &["one"]));
		t.attach_frame(Frame::text(FrameId::ARTIST, &["two"]));
		t.attach_frame(Frame::text(FrameId::TITLE, &["three"]));
		t
	}

	#[test]
	fn find_by_id_and_occurrence() {
		let t = sample();
		let f = t.find_frame(Some(FrameId::TITLE), 1).unwrap();
		assert_eq!(f.text_value(), Some("three"));
		assert!(t.find_frame(Some(FrameId::TITLE), 2).is_none());
		assert!(t.find_frame(Some(FrameId::ALBUM), 0).is_none());
	}

	#[test]
	fn find_by_index() {
		let t = sample();
		assert_eq!(t.find_frame(None, 1).unwrap().id(), FrameId::ARTIST);
		assert!(t.find_frame(None, 3).is_none());
		assert_eq!(t.frame(2).unwrap().text_value(), Some("three"));
	}

	#[test]
	fn replace_keeps_position() {
		let mut t = sample();
		t.replace_frame(Frame::text(FrameId::TITLE, &["new"]));
		assert_eq!(t.n_frames(), 2);
		assert_eq!(t.frame(0).unwrap().text_value(), Some("new"));
		assert_eq!(t.frame(1).unwrap().id(), FrameId::ARTIST);

		t.replace_frame(Frame::text(FrameId::ALBUM, &["album"]));
		assert_eq!(t.frame(2).unwrap().id(), FrameId::ALBUM);
	}

	#[test]
	fn detach_and_remove() {
		let mut t = sample();
		assert_eq!(t.detach_frame(1).unwrap().id(), FrameId::ARTIST);
		assert!(t.detach_frame(5).is_none());
		assert_eq!(t.remove_frames(FrameId::TITLE), 2);
		assert_eq!(t.n_frames(), 0);

		let mut t = sample();
		t.clear_frames();
		assert!(t.frames().is_empty());
	}

	#[test]
	fn options_mask() {
		let mut t = Tag::new();
		t.set_options(TagOptions::ALL, TagOptions::CRC | TagOptions::APPEND);
		let o = t.set_options(TagOptions::ID3V1, TagOptions::ALL);
		assert_eq!(o, TagOptions::CRC | TagOptions::APPEND | TagOptions::ID3V1);

		t.set_render_v1(false);
		assert!(!t.render_v1());
		assert!(t.append());
		assert!(t.options().is_crc());
	}

	#[test]
	fn header_flag_accessors() {
		let mut t = Tag::new();
		t.set_experimental(true);
		t.set_has_footer(true);
		assert_eq!(t.flags(), TagFlags::EXPERIMENTAL | TagFlags::FOOTER);
		t.set_experimental(false);
		assert!(!t.is_experimental());
		assert!(t.has_footer());

		t.set_is_update(true);
		assert!(t.is_update());
		assert_eq!(t.extended_flags(), ExtendedFlags::UPDATE);
	}

	#[test]
	fn version_display() {
		assert_eq!(TagVersion::V11.to_string(), "ID3v1.1");
		assert_eq!(TagVersion::V23.to_string(), "ID3v2.3.0");
		assert!(FrameId::from_str("TIT2").is_ok());
	}
}
