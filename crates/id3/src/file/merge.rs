//! Fold physical tags into the primary tag.

use tracing::trace;

use super::index::FileTagIndex;
use crate::tag::Tag;

/// Builds the primary tag of a file from the physical tags we find in it.
pub(crate) struct TagMerger<'a> {
	primary: &'a mut Tag,
}

impl<'a> TagMerger<'a> {
	pub fn new(primary: &'a mut Tag) -> Self {
		Self { primary }
	}

	/// Merge one physical tag.
	/// Tags must be merged in the order we found them.
	pub fn merge(&mut self, tag: &Tag) {
		// A tag that isn't an update replaces everything before it
		if !tag.is_update() {
			self.primary.clear_frames();
		}

		for frame in tag.frames() {
			self.primary.attach_frame(frame.clone());
		}

		trace!(
			message = "Merged tag",
			update = tag.is_update(),
			frames = tag.n_frames(),
			primary_frames = self.primary.n_frames()
		);
	}

	/// Decide how the primary tag is written back,
	/// based on where the header tag is.
	pub fn finish(&mut self, index: &FileTagIndex) {
		if !index.header_exists() {
			return;
		}

		let Some(first) = index.first() else {
			return;
		};

		if first.location == 0 {
			// Padding to the old length lets us overwrite in place
			self.primary.set_length(first.length);
		} else {
			self.primary.set_append(true);
		}
	}
}
