//! Render ID3v2.4 tags.

use super::{
	header::{encode_synchsafe, encode_synchsafe5, HeaderKind, Id3v2Header, HEADER_LEN},
	text::{encode_latin1, encode_string, encode_terminator},
	unsynch,
	v2read::FRAME_HEADER_LEN,
};
use crate::{
	errors::Id3EncodeError,
	tag::{flags::TagFlags, Field, Frame, FrameLayout, Tag},
};

/// Render `tag` as ID3v2.4.
/// Returns an empty vector if the tag has no frames to render.
pub fn render(tag: &Tag) -> Result<Vec<u8>, Id3EncodeError> {
	let options = tag.options;
	let unsynch = options.is_unsynchronisation();

	let mut body = Vec::new();
	for frame in &tag.frames {
		if options.is_file_altered() && frame.flags.is_file_alter_discard() {
			continue;
		}
		render_frame(frame, unsynch, &mut body)?;
	}

	if body.is_empty() {
		return Ok(Vec::new());
	}

	let append = options.is_append();
	let crc = options.is_crc() || tag.extended_flags.is_crc();
	let update = tag.extended_flags.is_update();
	let restrictions = tag.extended_flags.is_restrictions();

	let mut ext = Vec::new();
	if crc || update || restrictions {
		let mut ext_flags = tag.extended_flags;
		ext_flags.set_crc(crc);

		let ext_len = 6 + usize::from(update) + 6 * usize::from(crc) + 2 * usize::from(restrictions);
		ext.extend(encode_synchsafe(to_u32(ext_len)?)?);
		ext.push(0x01);
		ext.push(ext_flags.bits());

		if update {
			ext.push(0x00);
		}

		// Padding is covered by the crc, so we must place it first
		if !append {
			let used = HEADER_LEN + ext_len + body.len();
			pad_to(&mut body, tag.length, used);
		}

		if crc {
			ext.push(0x05);
			ext.extend(encode_synchsafe5(crc32fast::hash(&body)));
		}

		if restrictions {
			ext.push(0x01);
			ext.push(tag.restrictions);
		}
	} else if !append {
		let used = HEADER_LEN + body.len();
		pad_to(&mut body, tag.length, used);
	}

	let mut flags = TagFlags::empty();
	flags.set_unsynchronisation(unsynch);
	flags.set_extended_header(!ext.is_empty());
	flags.set_experimental(tag.flags.is_experimental());
	flags.set_footer(append);

	let mut header = Id3v2Header {
		kind: HeaderKind::Header,
		major: 4,
		revision: 0,
		flags,
		size: to_u32(ext.len() + body.len())?,
	};

	let mut out = Vec::with_capacity(HEADER_LEN * 2 + ext.len() + body.len());
	out.extend(header.encode()?);
	out.extend(ext);
	out.extend(body);

	if append {
		header.kind = HeaderKind::Footer;
		out.extend(header.encode()?);
	}

	return Ok(out);
}

fn to_u32(len: usize) -> Result<u32, Id3EncodeError> {
	u32::try_from(len)
		.ok()
		.ok_or(Id3EncodeError::TagTooLarge(len))
}

/// Pad `body` with zeros so that the whole tag is `length` bytes long.
/// `used` is the length of the tag without padding.
fn pad_to(body: &mut Vec<u8>, length: u64, used: usize) {
	let length = usize::try_from(length).unwrap_or(usize::MAX);
	if length > used {
		body.resize(body.len() + (length - used), 0);
	}
}

fn render_frame(frame: &Frame, unsynch: bool, target: &mut Vec<u8>) -> Result<(), Id3EncodeError> {
	let opaque = frame.flags.is_opaque();

	let payload = if opaque {
		match frame.fields.as_slice() {
			[Field::Binary(data)] => data.clone(),
			_ => return Err(Id3EncodeError::FieldMismatch(frame.id)),
		}
	} else {
		encode_fields(frame)?
	};

	// Opaque frames keep the length they were read with,
	// we can't know their decoded size.
	let data_length = if opaque {
		frame.data_length
	} else if frame.flags.is_data_length() {
		Some(to_u32(payload.len())?)
	} else {
		None
	};

	let mut flags = frame.flags;
	flags.set_unsynchronisation(unsynch);
	flags.set_grouping(frame.group_id.is_some());
	flags.set_encryption(frame.encryption_method.is_some());
	flags.set_data_length(data_length.is_some());

	let payload = if unsynch {
		unsynch::encode(&payload)
	} else {
		payload
	};

	let mut prelude = Vec::new();
	if let Some(g) = frame.group_id {
		prelude.push(g);
	}
	if let Some(m) = frame.encryption_method {
		prelude.push(m);
	}
	if let Some(l) = data_length {
		prelude.extend(encode_synchsafe(l)?);
	}

	let size = to_u32(prelude.len() + payload.len())?;

	target.reserve(FRAME_HEADER_LEN + prelude.len() + payload.len());
	target.extend(frame.id.as_bytes());
	target.extend(encode_synchsafe(size)?);
	target.extend(flags.bits().to_be_bytes());
	target.extend(prelude);
	target.extend(payload);

	return Ok(());
}

fn encode_fields(frame: &Frame) -> Result<Vec<u8>, Id3EncodeError> {
	let id = frame.id;
	let mut out = Vec::new();

	match (id.layout(), frame.fields.as_slice()) {
		(FrameLayout::Text, [Field::TextEncoding(e), Field::StringList(list)]) => {
			out.push(e.to_byte());
			for (i, s) in list.iter().enumerate() {
				if i != 0 {
					encode_terminator(*e, &mut out);
				}
				encode_string(*e, s, id, &mut out)?;
			}
		}

		(
			FrameLayout::UserText,
			[Field::TextEncoding(e), Field::String(description), Field::String(value)],
		) => {
			out.push(e.to_byte());
			encode_string(*e, description, id, &mut out)?;
			encode_terminator(*e, &mut out);
			encode_string(*e, value, id, &mut out)?;
		}

		(FrameLayout::Url, [Field::Latin1(url)]) => {
			encode_latin1(url, id, &mut out)?;
		}

		(
			FrameLayout::UserUrl,
			[Field::TextEncoding(e), Field::String(description), Field::Latin1(url)],
		) => {
			out.push(e.to_byte());
			encode_string(*e, description, id, &mut out)?;
			encode_terminator(*e, &mut out);
			encode_latin1(url, id, &mut out)?;
		}

		(
			FrameLayout::Comment,
			[Field::TextEncoding(e), Field::Language(language), Field::String(description), Field::String(text)],
		) => {
			out.push(e.to_byte());
			out.extend(language);
			encode_string(*e, description, id, &mut out)?;
			encode_terminator(*e, &mut out);
			encode_string(*e, text, id, &mut out)?;
		}

		(FrameLayout::Seek, [Field::Int32(offset)]) => {
			out.extend(offset.to_be_bytes());
		}

		(FrameLayout::Binary, [Field::Binary(data)]) => {
			out.extend(data);
		}

		_ => return Err(Id3EncodeError::FieldMismatch(id)),
	}

	return Ok(out);
}
