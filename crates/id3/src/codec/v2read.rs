//! Decode ID3v2.3 and ID3v2.4 tags.

use std::borrow::Cow;

use super::{
	header::{decode_synchsafe, decode_synchsafe5, HeaderKind, Id3v2Header, HEADER_LEN},
	text::{decode_list, decode_string, decode_terminated, split_terminated},
	unsynch,
};
use crate::{
	errors::Id3DecodeError,
	tag::{
		flags::{ExtendedFlags, FrameFlags},
		Field, Frame, FrameId, FrameLayout, Tag, TagVersion, TextEncoding,
	},
};

/// The length of an ID3v2.3/2.4 frame header
pub const FRAME_HEADER_LEN: usize = 10;

pub fn parse(data: &[u8]) -> Result<Tag, Id3DecodeError> {
	let header = Id3v2Header::decode(data).ok_or(Id3DecodeError::BadMagicBytes)?;
	if header.kind != HeaderKind::Header {
		return Err(Id3DecodeError::BadMagicBytes);
	}

	let major = header.major;
	if !matches!(major, 3 | 4) {
		return Err(Id3DecodeError::UnsupportedVersion(major));
	}

	let body_end = HEADER_LEN + header.size as usize;
	let body = data
		.get(HEADER_LEN..body_end)
		.ok_or(Id3DecodeError::Truncated)?;

	let mut tag = Tag::new();
	tag.version = TagVersion {
		major,
		revision: header.revision,
	};
	tag.flags = header.flags;
	tag.length = header.total_len();

	// ID3v2.3 unsynchronises the whole tag,
	// ID3v2.4 unsynchronises each frame.
	let body: Cow<'_, [u8]> = if major == 3 && header.flags.is_unsynchronisation() {
		Cow::Owned(unsynch::decode(body))
	} else {
		Cow::Borrowed(body)
	};

	let frames = if header.flags.is_extended_header() {
		if major == 3 {
			read_extended_v23(&mut tag, &body)?
		} else {
			read_extended_v24(&mut tag, &body)?
		}
	} else {
		&body[..]
	};

	let frame_unsynch = major == 4 && header.flags.is_unsynchronisation();
	read_frames(&mut tag, major, frame_unsynch, frames)?;

	return Ok(tag);
}

/// Read an ID3v2.4 extended header from the start of `body`.
/// Returns the data that follows it.
fn read_extended_v24<'a>(tag: &mut Tag, body: &'a [u8]) -> Result<&'a [u8], Id3DecodeError> {
	let head: [u8; 6] = body
		.get(0..6)
		.and_then(|x| x.try_into().ok())
		.ok_or(Id3DecodeError::MalformedExtendedHeader)?;

	let size = decode_synchsafe([head[0], head[1], head[2], head[3]])? as usize;
	if size < 6 || size > body.len() || head[4] != 1 {
		return Err(Id3DecodeError::MalformedExtendedHeader);
	}

	let flags = ExtendedFlags::from_bits_truncate(head[5]);
	let mut rest = &body[6..size];

	// Each flag is followed by a length byte, then that many bytes of data.
	let mut take_field = |len: usize| -> Result<&'a [u8], Id3DecodeError> {
		match rest.split_first() {
			Some((l, data)) if usize::from(*l) == len && data.len() >= len => {
				rest = &data[len..];
				Ok(&data[..len])
			}
			_ => Err(Id3DecodeError::MalformedExtendedHeader),
		}
	};

	if flags.is_update() {
		take_field(0)?;
	}

	let crc = if flags.is_crc() {
		let c: [u8; 5] = take_field(5)?
			.try_into()
			.ok()
			.ok_or(Id3DecodeError::MalformedExtendedHeader)?;
		Some(decode_synchsafe5(c)?)
	} else {
		None
	};

	if flags.is_restrictions() {
		tag.restrictions = take_field(1)?[0];
	}

	let after = &body[size..];
	if let Some(expected) = crc {
		let got = crc32fast::hash(after);
		if got != expected {
			return Err(Id3DecodeError::CrcMismatch { expected, got });
		}
	}

	tag.extended_flags = flags;
	return Ok(after);
}

/// Read an ID3v2.3 extended header from the start of `body`.
/// Returns the data that follows it.
fn read_extended_v23<'a>(tag: &mut Tag, body: &'a [u8]) -> Result<&'a [u8], Id3DecodeError> {
	let head: [u8; 10] = body
		.get(0..10)
		.and_then(|x| x.try_into().ok())
		.ok_or(Id3DecodeError::MalformedExtendedHeader)?;

	// Unlike v2.4, this size excludes itself
	let size = u32::from_be_bytes([head[0], head[1], head[2], head[3]]) as usize;
	let has_crc = head[4] & 0x80 != 0;
	if !matches!((size, has_crc), (6, false) | (10, true)) || size + 4 > body.len() {
		return Err(Id3DecodeError::MalformedExtendedHeader);
	}

	tag.extended_flags.set_crc(has_crc);
	return Ok(&body[size + 4..]);
}

fn read_frames(
	tag: &mut Tag,
	major: u8,
	tag_unsynch: bool,
	mut data: &[u8],
) -> Result<(), Id3DecodeError> {
	while data.len() >= FRAME_HEADER_LEN {
		// We've reached padding
		if data[0] == 0 {
			break;
		}

		let id_bytes = [data[0], data[1], data[2], data[3]];
		let id = FrameId::from_bytes(id_bytes).ok_or(Id3DecodeError::BadFrameId(id_bytes))?;

		let size_bytes = [data[4], data[5], data[6], data[7]];
		let size = if major == 4 {
			decode_synchsafe(size_bytes)?
		} else {
			u32::from_be_bytes(size_bytes)
		} as usize;

		let raw_flags = u16::from_be_bytes([data[8], data[9]]);
		let flags = if major == 4 {
			FrameFlags::from_bits_truncate(raw_flags)
		} else {
			FrameFlags::from_v23(raw_flags)
		};

		let payload = data
			.get(FRAME_HEADER_LEN..FRAME_HEADER_LEN + size)
			.ok_or(Id3DecodeError::FrameOverflow(id))?;
		data = &data[FRAME_HEADER_LEN + size..];

		tag.frames
			.push(decode_frame(id, flags, major, tag_unsynch, payload)?);
	}

	return Ok(());
}

/// Split `len` bytes off the front of `p`
fn take<'a>(p: &mut &'a [u8], len: usize, id: FrameId) -> Result<&'a [u8], Id3DecodeError> {
	if p.len() < len {
		return Err(Id3DecodeError::MalformedFrame(id));
	}
	let (head, tail) = p.split_at(len);
	*p = tail;
	return Ok(head);
}

fn decode_frame(
	id: FrameId,
	flags: FrameFlags,
	major: u8,
	tag_unsynch: bool,
	payload: &[u8],
) -> Result<Frame, Id3DecodeError> {
	let mut frame = Frame::with_fields(id, Vec::new());
	frame.flags = flags;

	let mut p = payload;

	// The extra bytes before frame data come in a different order in each version
	if major == 4 {
		if flags.is_grouping() {
			frame.group_id = Some(take(&mut p, 1, id)?[0]);
		}
		if flags.is_encryption() {
			frame.encryption_method = Some(take(&mut p, 1, id)?[0]);
		}
		if flags.is_data_length() {
			let x = take(&mut p, 4, id)?;
			frame.data_length = Some(decode_synchsafe([x[0], x[1], x[2], x[3]])?);
		}
	} else {
		if flags.is_compression() {
			let x = take(&mut p, 4, id)?;
			frame.data_length = Some(u32::from_be_bytes([x[0], x[1], x[2], x[3]]));
		}
		if flags.is_encryption() {
			frame.encryption_method = Some(take(&mut p, 1, id)?[0]);
		}
		if flags.is_grouping() {
			frame.group_id = Some(take(&mut p, 1, id)?[0]);
		}
	}

	let p: Cow<'_, [u8]> = if major == 4 && (tag_unsynch || flags.is_unsynchronisation()) {
		Cow::Owned(unsynch::decode(p))
	} else {
		Cow::Borrowed(p)
	};

	// Decoding undoes unsynchronisation, rendering decides whether to redo it.
	frame.flags.set_unsynchronisation(false);

	frame.fields = if flags.is_opaque() {
		vec![Field::Binary(p.into_owned())]
	} else {
		decode_fields(id, &p)?
	};

	return Ok(frame);
}

fn decode_fields(id: FrameId, p: &[u8]) -> Result<Vec<Field>, Id3DecodeError> {
	let layout = id.layout();

	if layout == FrameLayout::Url {
		let (url, _) = split_terminated(TextEncoding::Latin1, p);
		return Ok(vec![Field::Latin1(decode_string(TextEncoding::Latin1, url)?)]);
	}

	if layout == FrameLayout::Binary {
		return Ok(vec![Field::Binary(p.to_vec())]);
	}

	if layout == FrameLayout::Seek {
		let x: [u8; 4] = p
			.try_into()
			.ok()
			.ok_or(Id3DecodeError::MalformedFrame(id))?;
		return Ok(vec![Field::Int32(i32::from_be_bytes(x))]);
	}

	// Every other layout starts with a text encoding
	let (e, rest) = p.split_first().ok_or(Id3DecodeError::MalformedFrame(id))?;
	let encoding = TextEncoding::from_byte(*e).ok_or(Id3DecodeError::BadTextEncoding(*e))?;
	let mut fields = vec![Field::TextEncoding(encoding)];

	match layout {
		FrameLayout::Text => {
			fields.push(Field::StringList(decode_list(encoding, rest)?));
		}

		FrameLayout::UserText => {
			let (description, rest) = decode_terminated(encoding, rest)?;
			let (value, _) = decode_terminated(encoding, rest)?;
			fields.push(Field::String(description));
			fields.push(Field::String(value));
		}

		FrameLayout::UserUrl => {
			let (description, rest) = decode_terminated(encoding, rest)?;
			let (url, _) = decode_terminated(TextEncoding::Latin1, rest)?;
			fields.push(Field::String(description));
			fields.push(Field::Latin1(url));
		}

		FrameLayout::Comment => {
			if rest.len() < 3 {
				return Err(Id3DecodeError::MalformedFrame(id));
			}
			let (language, rest) = rest.split_at(3);
			let (description, rest) = decode_terminated(encoding, rest)?;
			let (text, _) = decode_terminated(encoding, rest)?;
			fields.push(Field::Language([language[0], language[1], language[2]]));
			fields.push(Field::String(description));
			fields.push(Field::String(text));
		}

		FrameLayout::Url | FrameLayout::Binary | FrameLayout::Seek => {
			return Err(Id3DecodeError::MalformedFrame(id))
		}
	}

	return Ok(fields);
}
