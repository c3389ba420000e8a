use std::{fmt::Display, str::FromStr};

use super::{flags::FrameFlags, tables::frame_description};
use crate::errors::FrameIdError;

/// A four-character ID3v2 frame id, like `TIT2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId([u8; 4]);

impl FrameId {
	pub const TITLE: Self = Self(*b"TIT2");
	pub const ARTIST: Self = Self(*b"TPE1");
	pub const ALBUM: Self = Self(*b"TALB");
	pub const RECORDING_TIME: Self = Self(*b"TDRC");
	pub const YEAR: Self = Self(*b"TYER");
	pub const COMMENT: Self = Self(*b"COMM");
	pub const TRACK: Self = Self(*b"TRCK");
	pub const GENRE: Self = Self(*b"TCON");
	pub const SEEK: Self = Self(*b"SEEK");

	/// Make a frame id from raw bytes, checking that they are valid.
	pub fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
		if bytes
			.iter()
			.all(|x| x.is_ascii_uppercase() || x.is_ascii_digit())
		{
			Some(Self(bytes))
		} else {
			None
		}
	}

	pub fn as_bytes(&self) -> &[u8; 4] {
		&self.0
	}

	pub fn as_str(&self) -> &str {
		// Always ascii, see `from_bytes`
		std::str::from_utf8(&self.0).unwrap_or("????")
	}

	/// The shape of the fields a frame with this id holds.
	pub(crate) fn layout(&self) -> FrameLayout {
		match &self.0 {
			b"TXXX" => FrameLayout::UserText,
			b"WXXX" => FrameLayout::UserUrl,
			b"COMM" | b"USLT" => FrameLayout::Comment,
			b"SEEK" => FrameLayout::Seek,
			[b'T', ..] => FrameLayout::Text,
			[b'W', ..] => FrameLayout::Url,
			_ => FrameLayout::Binary,
		}
	}
}

impl Display for FrameId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for FrameId {
	type Err = FrameIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let bytes: [u8; 4] = s
			.as_bytes()
			.try_into()
			.map_err(|_e: std::array::TryFromSliceError| FrameIdError::BadLength(s.len()))?;
		Self::from_bytes(bytes).ok_or(FrameIdError::BadCharacter)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameLayout {
	/// `[encoding, string list]`
	Text,
	/// `[encoding, description, value]`
	UserText,
	/// `[url]`
	Url,
	/// `[encoding, description, url]`
	UserUrl,
	/// `[encoding, language, description, text]`
	Comment,
	/// `[offset]`
	Seek,
	/// `[data]`
	Binary,
}

/// How text in a frame is encoded on disk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
	#[default]
	Latin1,
	/// UTF-16 with a byte order mark
	Utf16,
	Utf16Be,
	Utf8,
}

impl TextEncoding {
	pub fn from_byte(byte: u8) -> Option<Self> {
		Some(match byte {
			0 => Self::Latin1,
			1 => Self::Utf16,
			2 => Self::Utf16Be,
			3 => Self::Utf8,
			_ => return None,
		})
	}

	pub fn to_byte(self) -> u8 {
		match self {
			Self::Latin1 => 0,
			Self::Utf16 => 1,
			Self::Utf16Be => 2,
			Self::Utf8 => 3,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::Latin1 => "iso-8859-1",
			Self::Utf16 => "utf-16",
			Self::Utf16Be => "utf-16be",
			Self::Utf8 => "utf-8",
		}
	}
}

impl Display for TextEncoding {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

/// One field of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
	TextEncoding(TextEncoding),

	/// A latin-1 string, always stored as latin-1
	Latin1(String),

	/// A string stored in the frame's text encoding
	String(String),

	/// Several strings stored in the frame's text encoding
	StringList(Vec<String>),

	/// An ISO-639-2 language code
	Language([u8; 3]),

	Int32(i32),

	Binary(Vec<u8>),
}

impl Display for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::TextEncoding(e) => write!(f, "{e}"),
			Self::Latin1(s) | Self::String(s) => write!(f, "{s}"),
			Self::StringList(l) => write!(f, "{}", l.join(" / ")),
			Self::Language(l) => write!(f, "{}", String::from_utf8_lossy(l)),
			Self::Int32(x) => write!(f, "{x}"),
			Self::Binary(b) => write!(f, "<{} bytes>", b.len()),
		}
	}
}

/// A frame in an ID3v2 tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	pub(crate) id: FrameId,
	pub(crate) flags: FrameFlags,

	/// Grouping identifier, if `flags` has grouping set
	pub(crate) group_id: Option<u8>,

	/// Encryption method, if `flags` has encryption set
	pub(crate) encryption_method: Option<u8>,

	/// Data length indicator, if `flags` has data length set
	pub(crate) data_length: Option<u32>,

	pub(crate) fields: Vec<Field>,
}

impl Frame {
	/// Make an empty frame with the default fields for `id`.
	pub fn new(id: FrameId) -> Self {
		let fields = match id.layout() {
			FrameLayout::Text => vec![
				Field::TextEncoding(TextEncoding::Latin1),
				Field::StringList(Vec::new()),
			],
			FrameLayout::UserText => vec![
				Field::TextEncoding(TextEncoding::Latin1),
				Field::String(String::new()),
				Field::String(String::new()),
			],
			FrameLayout::Url => vec![Field::Latin1(String::new())],
			FrameLayout::UserUrl => vec![
				Field::TextEncoding(TextEncoding::Latin1),
				Field::String(String::new()),
				Field::Latin1(String::new()),
			],
			FrameLayout::Comment => vec![
				Field::TextEncoding(TextEncoding::Latin1),
				Field::Language(*b"XXX"),
				Field::String(String::new()),
				Field::String(String::new()),
			],
			FrameLayout::Seek => vec![Field::Int32(0)],
			FrameLayout::Binary => vec![Field::Binary(Vec::new())],
		};

		Self::with_fields(id, fields)
	}

	pub(crate) fn with_fields(id: FrameId, fields: Vec<Field>) -> Self {
		Self {
			id,
			flags: FrameFlags::empty(),
			group_id: None,
			encryption_method: None,
			data_length: None,
			fields,
		}
	}

	/// Make a text frame holding `values`.
	/// Text is stored as latin-1 if it can be, and as UTF-8 otherwise.
	pub fn text<S: AsRef<str>>(id: FrameId, values: &[S]) -> Self {
		let latin1 = values
			.iter()
			.all(|v| v.as_ref().chars().all(|c| u32::from(c) <= 0xFF));
		Self::with_fields(
			id,
			vec![
				Field::TextEncoding(if latin1 {
					TextEncoding::Latin1
				} else {
					TextEncoding::Utf8
				}),
				Field::StringList(values.iter().map(|x| x.as_ref().to_owned()).collect()),
			],
		)
	}

	/// Make a comment frame.
	pub fn comment(language: [u8; 3], description: &str, text: &str) -> Self {
		let latin1 = description
			.chars()
			.chain(text.chars())
			.all(|c| u32::from(c) <= 0xFF);
		Self::with_fields(
			FrameId::COMMENT,
			vec![
				Field::TextEncoding(if latin1 {
					TextEncoding::Latin1
				} else {
					TextEncoding::Utf8
				}),
				Field::Language(language),
				Field::String(description.to_owned()),
				Field::String(text.to_owned()),
			],
		)
	}

	/// Make a `SEEK` frame pointing `offset` bytes past the end of its tag.
	pub fn seek(offset: i32) -> Self {
		Self::with_fields(FrameId::SEEK, vec![Field::Int32(offset)])
	}

	pub fn id(&self) -> FrameId {
		self.id
	}

	/// A human-readable name for this frame's id
	pub fn description(&self) -> &'static str {
		frame_description(&self.id)
	}

	pub fn flags(&self) -> FrameFlags {
		self.flags
	}

	pub fn set_flags(&mut self, flags: FrameFlags) {
		self.flags = flags;
	}

	pub fn fields(&self) -> &[Field] {
		&self.fields
	}

	pub fn field(&self, n: usize) -> Option<&Field> {
		self.fields.get(n)
	}

	pub fn field_mut(&mut self, n: usize) -> Option<&mut Field> {
		self.fields.get_mut(n)
	}

	pub fn n_fields(&self) -> usize {
		self.fields.len()
	}

	/// The text encoding of this frame, if it has one.
	pub fn encoding(&self) -> Option<TextEncoding> {
		self.fields.iter().find_map(|f| match f {
			Field::TextEncoding(e) => Some(*e),
			_ => None,
		})
	}

	/// The first string this frame holds.
	///
	/// For text frames this is the first value, for comments and
	/// user-defined frames it is the value (not the description).
	pub fn text_value(&self) -> Option<&str> {
		match self.id.layout() {
			FrameLayout::Text => match self.fields.get(1) {
				Some(Field::StringList(l)) => l.first().map(|x| x.as_str()),
				_ => None,
			},
			FrameLayout::UserText | FrameLayout::Comment => match self.fields.last() {
				Some(Field::String(s)) => Some(s),
				_ => None,
			},
			FrameLayout::Url | FrameLayout::UserUrl => match self.fields.last() {
				Some(Field::Latin1(s)) => Some(s),
				_ => None,
			},
			FrameLayout::Seek | FrameLayout::Binary => None,
		}
	}

	/// The offset this `SEEK` frame points to.
	pub fn seek_offset(&self) -> Option<i32> {
		if self.id != FrameId::SEEK {
			return None;
		}

		match self.fields.first() {
			Some(Field::Int32(x)) => Some(*x),
			_ => None,
		}
	}
}
