//! ID3v1: a fixed 128-byte tag at the end of a file.

use super::text::encode_latin1_lossy;
use crate::{
	errors::Id3DecodeError,
	tag::{
		tables::{genre_index, GENRES},
		Field, Frame, FrameId, Tag, TagVersion,
	},
};

/// The length of every ID3v1 tag
pub const V1_LEN: usize = 128;

/// Language we give comments read from ID3v1 tags
const V1_LANGUAGE: [u8; 3] = *b"XXX";

/// Read a fixed-width ID3v1 text field
fn read_field(data: &[u8]) -> String {
	let end = data.iter().position(|x| *x == 0).unwrap_or(data.len());
	let s: String = data[..end].iter().map(|x| char::from(*x)).collect();
	s.trim_end().to_owned()
}

fn write_field(target: &mut [u8], value: &str) {
	let v = encode_latin1_lossy(value);
	let n = v.len().min(target.len());
	target[..n].copy_from_slice(&v[..n]);
}

pub fn parse(data: &[u8]) -> Result<Tag, Id3DecodeError> {
	let data: &[u8; V1_LEN] = data.try_into().ok().ok_or(Id3DecodeError::Truncated)?;
	if &data[0..3] != b"TAG" {
		return Err(Id3DecodeError::BadMagicBytes);
	}

	let mut tag = Tag::new();

	let title = read_field(&data[3..33]);
	let artist = read_field(&data[33..63]);
	let album = read_field(&data[63..93]);
	let year = read_field(&data[93..97]);

	// ID3v1.1 keeps a track number in the last byte of the comment
	let (comment, track) = if data[125] == 0 && data[126] != 0 {
		(read_field(&data[97..125]), Some(data[126]))
	} else {
		(read_field(&data[97..127]), None)
	};
	let genre = data[127];

	tag.version = if track.is_some() {
		TagVersion::V11
	} else {
		TagVersion::V10
	};

	for (id, value) in [
		(FrameId::TITLE, title),
		(FrameId::ARTIST, artist),
		(FrameId::ALBUM, album),
		(FrameId::RECORDING_TIME, year),
	] {
		if !value.is_empty() {
			tag.attach_frame(Frame::text(id, &[&value]));
		}
	}

	if !comment.is_empty() {
		tag.attach_frame(Frame::comment(V1_LANGUAGE, "", &comment));
	}

	if let Some(track) = track {
		tag.attach_frame(Frame::text(FrameId::TRACK, &[&track.to_string()]));
	}

	if genre != 0xFF {
		let name = match GENRES.get(usize::from(genre)) {
			Some(name) => (*name).to_owned(),
			None => genre.to_string(),
		};
		tag.attach_frame(Frame::text(FrameId::GENRE, &[&name]));
	}

	return Ok(tag);
}

fn first_text(tag: &Tag, id: FrameId) -> Option<&str> {
	tag.find_frame(Some(id), 0).and_then(|f| f.text_value())
}

/// Render `tag` as ID3v1.
/// Text that doesn't fit is truncated, characters latin-1 can't hold become `?`.
pub fn render(tag: &Tag) -> [u8; V1_LEN] {
	let mut out = [0u8; V1_LEN];
	out[0..3].copy_from_slice(b"TAG");

	write_field(&mut out[3..33], first_text(tag, FrameId::TITLE).unwrap_or(""));
	write_field(&mut out[33..63], first_text(tag, FrameId::ARTIST).unwrap_or(""));
	write_field(&mut out[63..93], first_text(tag, FrameId::ALBUM).unwrap_or(""));

	let year = first_text(tag, FrameId::RECORDING_TIME)
		.or_else(|| first_text(tag, FrameId::YEAR))
		.unwrap_or("");
	write_field(&mut out[93..97], year);

	// Only comments without a description belong in ID3v1
	let comment = tag
		.frames()
		.iter()
		.filter(|f| f.id() == FrameId::COMMENT)
		.find(|f| matches!(f.field(2), Some(Field::String(d)) if d.is_empty()))
		.and_then(|f| f.text_value())
		.unwrap_or("");

	// `3/12` is track 3
	let track = first_text(tag, FrameId::TRACK)
		.and_then(|t| t.split('/').next())
		.and_then(|t| t.trim().parse::<u8>().ok())
		.filter(|t| *t != 0);

	match track {
		Some(track) => {
			write_field(&mut out[97..125], comment);
			out[126] = track;
		}
		None => write_field(&mut out[97..127], comment),
	}

	out[127] = first_text(tag, FrameId::GENRE)
		.and_then(genre_index)
		.unwrap_or(0xFF);

	return out;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> [u8; V1_LEN] {
		let mut d = [0u8; V1_LEN];
		d[0..3].copy_from_slice(b"TAG");
		d[3..8].copy_from_slice(b"Title");
		d[33..39].copy_from_slice(b"Artist");
		d[93..97].copy_from_slice(b"1999");
		d[97..104].copy_from_slice(b"Comment");
		d[126] = 7;
		d[127] = 17;
		d
	}

	#[test]
	fn parse_v11() {
		let t = parse(&sample()).unwrap();
		assert_eq!(t.version(), TagVersion::V11);
		assert_eq!(first_text(&t, FrameId::TITLE), Some("Title"));
		assert_eq!(first_text(&t, FrameId::ARTIST), Some("Artist"));
		assert!(t.find_frame(Some(FrameId::ALBUM), 0).is_none());
		assert_eq!(first_text(&t, FrameId::RECORDING_TIME), Some("1999"));
		assert_eq!(first_text(&t, FrameId::COMMENT), Some("Comment"));
		assert_eq!(first_text(&t, FrameId::TRACK), Some("7"));
		assert_eq!(first_text(&t, FrameId::GENRE), Some("Rock"));
	}

	#[test]
	fn parse_v10_and_unknown_genre() {
		let mut d = sample();
		d[126] = 0;
		d[127] = 0xFF;
		let t = parse(&d).unwrap();
		assert_eq!(t.version(), TagVersion::V10);
		assert!(t.find_frame(Some(FrameId::TRACK), 0).is_none());
		assert!(t.find_frame(Some(FrameId::GENRE), 0).is_none());
	}

	#[test]
	fn parse_rejects_bad_input() {
		assert!(matches!(parse(&[0u8; 10]), Err(Id3DecodeError::Truncated)));
		assert!(matches!(
			parse(&[0u8; V1_LEN]),
			Err(Id3DecodeError::BadMagicBytes)
		));
	}

	#[test]
	fn render_matches_parse() {
		let d = sample();
		assert_eq!(render(&parse(&d).unwrap()), d);
	}

	#[test]
	fn render_truncates_and_replaces() {
		let mut t = Tag::new();
		t.attach_frame(Frame::text(FrameId::TITLE, &[&"x".repeat(40)]));
		t.attach_frame(Frame::text(FrameId::ARTIST, &["“Q”"]));
		t.attach_frame(Frame::text(FrameId::TRACK, &["3/12"]));
		t.attach_frame(Frame::text(FrameId::GENRE, &["(9)"]));

		let r = render(&t);
		assert_eq!(&r[3..33], "x".repeat(30).as_bytes());
		assert_eq!(&r[33..36], b"?Q?");
		assert_eq!(r[125], 0);
		assert_eq!(r[126], 3);
		assert_eq!(r[127], 9);
	}
}
