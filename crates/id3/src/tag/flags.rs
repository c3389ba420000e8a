//! Bitsets for the flag groups of a tag and its frames.

use paste::paste;
use std::ops::{BitAnd, BitOr, Not};

/// Define a bitset newtype with one constant, one getter
/// and one setter for each named bit.
macro_rules! flag_group {
	(
		$(#[$meta:meta])*
		$name:ident($repr:ty) {
			$(
				$(#[$bit_meta:meta])*
				$konst:ident = $bit:literal => $accessor:ident,
			)*
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
		pub struct $name($repr);

		impl $name {
			$(
				$(#[$bit_meta])*
				pub const $konst: Self = Self($bit);
			)*

			/// Every bit this group defines.
			pub const ALL: Self = Self(0 $(| $bit)*);

			pub const fn empty() -> Self {
				Self(0)
			}

			pub const fn bits(&self) -> $repr {
				self.0
			}

			/// Make a bitset from raw bits, dropping bits this group doesn't define.
			pub const fn from_bits_truncate(bits: $repr) -> Self {
				Self(bits & Self::ALL.0)
			}

			pub const fn is_empty(&self) -> bool {
				self.0 == 0
			}

			/// True if every bit of `other` is set in `self`.
			pub const fn contains(&self, other: Self) -> bool {
				self.0 & other.0 == other.0
			}

			/// Set every bit of `other` if `value` is true, clear them otherwise.
			pub fn set(&mut self, other: Self, value: bool) {
				if value {
					self.0 |= other.0;
				} else {
					self.0 &= !other.0;
				}
			}

			paste! {
				$(
					pub fn [<is_ $accessor>](&self) -> bool {
						self.contains(Self::$konst)
					}

					pub fn [<set_ $accessor>](&mut self, value: bool) {
						self.set(Self::$konst, value)
					}
				)*
			}
		}

		impl BitOr for $name {
			type Output = Self;
			fn bitor(self, rhs: Self) -> Self {
				Self(self.0 | rhs.0)
			}
		}

		impl BitAnd for $name {
			type Output = Self;
			fn bitand(self, rhs: Self) -> Self {
				Self(self.0 & rhs.0)
			}
		}

		impl Not for $name {
			type Output = Self;
			fn not(self) -> Self {
				Self(!self.0 & Self::ALL.0)
			}
		}
	};
}

flag_group! {
	/// Flags in an ID3v2 tag header.
	TagFlags(u8) {
		UNSYNCHRONISATION = 0x80 => unsynchronisation,
		EXTENDED_HEADER = 0x40 => extended_header,
		EXPERIMENTAL = 0x20 => experimental,
		/// Only valid in ID3v2.4
		FOOTER = 0x10 => footer,
	}
}

flag_group! {
	/// Flags in an ID3v2 extended header.
	ExtendedFlags(u8) {
		/// This tag adds to earlier tags instead of replacing them.
		UPDATE = 0x40 => update,
		CRC = 0x20 => crc,
		RESTRICTIONS = 0x10 => restrictions,
	}
}

flag_group! {
	/// Options that control how a tag is rendered.
	/// These are never stored in a file.
	TagOptions(u16) {
		UNSYNCHRONISATION = 0x0001 => unsynchronisation,
		CRC = 0x0004 => crc,
		/// Render a footer and no padding, for tags that
		/// live after the audio data.
		APPEND = 0x0010 => append,
		/// Drop frames that ask to be discarded when the file is altered.
		FILE_ALTERED = 0x0020 => file_altered,
		/// Render ID3v1 instead of ID3v2.
		ID3V1 = 0x0100 => id3v1,
	}
}

flag_group! {
	/// ID3v2 frame flags, always in the ID3v2.4 layout.
	FrameFlags(u16) {
		TAG_ALTER_DISCARD = 0x4000 => tag_alter_discard,
		FILE_ALTER_DISCARD = 0x2000 => file_alter_discard,
		READ_ONLY = 0x1000 => read_only,
		GROUPING = 0x0040 => grouping,
		COMPRESSION = 0x0008 => compression,
		ENCRYPTION = 0x0004 => encryption,
		UNSYNCHRONISATION = 0x0002 => unsynchronisation,
		DATA_LENGTH = 0x0001 => data_length,
	}
}

impl FrameFlags {
	/// Translate ID3v2.3 frame flags to the ID3v2.4 layout.
	pub fn from_v23(bits: u16) -> Self {
		let mut out = Self::empty();
		out.set(Self::TAG_ALTER_DISCARD, bits & 0x8000 != 0);
		out.set(Self::FILE_ALTER_DISCARD, bits & 0x4000 != 0);
		out.set(Self::READ_ONLY, bits & 0x2000 != 0);
		// v2.3 compressed frames carry a 4-byte decompressed size,
		// which is what v2.4 calls a data length indicator.
		out.set(Self::COMPRESSION | Self::DATA_LENGTH, bits & 0x0080 != 0);
		out.set(Self::ENCRYPTION, bits & 0x0040 != 0);
		out.set(Self::GROUPING, bits & 0x0020 != 0);
		return out;
	}

	/// If true, this frame's payload can't be decoded into fields.
	pub fn is_opaque(&self) -> bool {
		self.is_compression() || self.is_encryption()
	}
}
