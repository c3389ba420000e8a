//! Where the tags in a file are.

use std::fmt::Display;

use crate::tag::Tag;

/// A handle to a physical tag in a [`TagArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(usize);

impl Display for TagId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Every physical tag we found in a file.
/// Tags are never removed, so a [`TagId`] stays valid
/// for as long as its arena lives.
#[derive(Debug, Default)]
pub struct TagArena {
	tags: Vec<Tag>,
}

impl TagArena {
	pub fn insert(&mut self, tag: Tag) -> TagId {
		self.tags.push(tag);
		TagId(self.tags.len() - 1)
	}

	pub fn get(&self, id: TagId) -> Option<&Tag> {
		self.tags.get(id.0)
	}

	pub fn len(&self) -> usize {
		self.tags.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tags.is_empty()
	}
}

/// A byte range in a file that holds a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTagRegion {
	/// The tag we parsed from this region.
	/// `None` if we wrote this region ourselves and never parsed it.
	pub tag: Option<TagId>,

	/// The offset of the first byte of this region
	pub location: u64,

	/// The length of this region, in bytes
	pub length: u64,
}

impl FileTagRegion {
	/// The offset of the first byte after this region
	pub fn end(&self) -> u64 {
		self.location + self.length
	}
}

/// An ordered list of tag regions.
#[derive(Debug, Default)]
pub struct FileTagIndex {
	regions: Vec<FileTagRegion>,

	/// If true, the last region is an ID3v1 tag
	/// at the very end of the file.
	has_trailing: bool,
}

impl FileTagIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a region, keeping regions sorted by location.
	///
	/// This does not check for duplicates or overlaps,
	/// see [`Self::find_duplicate`] and [`Self::find_overlap`].
	pub fn insert(&mut self, region: FileTagRegion) {
		self.regions.push(region);
		// `sort_by_key` is stable
		self.regions.sort_by_key(|r| r.location);
	}

	/// Find a region that covers exactly this range
	pub fn find_duplicate(&self, location: u64, length: u64) -> Option<&FileTagRegion> {
		self.regions
			.iter()
			.find(|r| r.location == location && r.length == length)
	}

	/// Find a region that shares at least one byte with this range
	pub fn find_overlap(&self, location: u64, length: u64) -> Option<&FileTagRegion> {
		let end = location + length;
		self.regions
			.iter()
			.find(|r| location < r.end() && end > r.location)
	}

	pub fn first(&self) -> Option<&FileTagRegion> {
		self.regions.first()
	}

	pub fn iter(&self) -> impl Iterator<Item = &FileTagRegion> {
		self.regions.iter()
	}

	pub fn regions(&self) -> &[FileTagRegion] {
		&self.regions
	}

	pub fn len(&self) -> usize {
		self.regions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.regions.is_empty()
	}

	pub fn has_trailing(&self) -> bool {
		self.has_trailing
	}

	pub(crate) fn set_has_trailing(&mut self, has_trailing: bool) {
		self.has_trailing = has_trailing;
	}

	/// Is there a region other than the trailing tag?
	/// If there is, it is the first one.
	pub fn header_exists(&self) -> bool {
		let n = self.regions.len();
		(n > 0 && !self.has_trailing) || (n > 1 && self.has_trailing)
	}

	/// The first region has been rewritten with a new length.
	/// Update it, and move every region after it by the same amount.
	pub(crate) fn resize_first(&mut self, new_length: u64) {
		let Some((first, rest)) = self.regions.split_first_mut() else {
			return;
		};

		let old_end = first.end();
		first.length = new_length;
		let new_end = first.end();

		for r in rest {
			if r.location >= old_end {
				r.location = r.location - old_end + new_end;
			}
		}
	}

	/// Forget the trailing region
	pub(crate) fn remove_trailing(&mut self) -> Option<FileTagRegion> {
		if !self.has_trailing {
			return None;
		}
		self.has_trailing = false;
		self.regions.pop()
	}
}
