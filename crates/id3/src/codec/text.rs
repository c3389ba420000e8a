//! Text encodings used by ID3v2 frames

use crate::{
	errors::{Id3DecodeError, Id3EncodeError},
	tag::{FrameId, TextEncoding},
};

fn terminator_len(encoding: TextEncoding) -> usize {
	match encoding {
		TextEncoding::Latin1 | TextEncoding::Utf8 => 1,
		TextEncoding::Utf16 | TextEncoding::Utf16Be => 2,
	}
}

/// Split `data` at the first string terminator.
/// Returns `(string, rest)`, where `rest` excludes the terminator.
/// If there is no terminator, `string` is all of `data`.
pub fn split_terminated(encoding: TextEncoding, data: &[u8]) -> (&[u8], &[u8]) {
	let n = terminator_len(encoding);
	let mut i = 0;
	while i + n <= data.len() {
		if data[i..i + n].iter().all(|x| *x == 0) {
			return (&data[..i], &data[i + n..]);
		}
		i += n;
	}
	return (data, &[]);
}

/// Decode one string. `data` must not contain a terminator.
pub fn decode_string(encoding: TextEncoding, data: &[u8]) -> Result<String, Id3DecodeError> {
	match encoding {
		TextEncoding::Latin1 => Ok(data.iter().map(|x| char::from(*x)).collect()),
		TextEncoding::Utf8 => Ok(String::from_utf8(data.to_vec())?),
		TextEncoding::Utf16Be => decode_utf16(data, false),
		TextEncoding::Utf16 => match data {
			[0xFF, 0xFE, rest @ ..] => decode_utf16(rest, true),
			[0xFE, 0xFF, rest @ ..] => decode_utf16(rest, false),
			_ => decode_utf16(data, false),
		},
	}
}

fn decode_utf16(data: &[u8], little_endian: bool) -> Result<String, Id3DecodeError> {
	if data.len() % 2 != 0 {
		return Err(Id3DecodeError::FailedUtf16Decode);
	}

	let units: Vec<u16> = data
		.chunks_exact(2)
		.map(|c| {
			if little_endian {
				u16::from_le_bytes([c[0], c[1]])
			} else {
				u16::from_be_bytes([c[0], c[1]])
			}
		})
		.collect();

	String::from_utf16(&units)
		.ok()
		.ok_or(Id3DecodeError::FailedUtf16Decode)
}

/// Decode a terminated string, returning it and the rest of `data`.
pub fn decode_terminated(
	encoding: TextEncoding,
	data: &[u8],
) -> Result<(String, &[u8]), Id3DecodeError> {
	let (s, rest) = split_terminated(encoding, data);
	return Ok((decode_string(encoding, s)?, rest));
}

/// Decode a list of terminator-separated strings.
/// A trailing terminator does not start a new string.
pub fn decode_list(encoding: TextEncoding, mut data: &[u8]) -> Result<Vec<String>, Id3DecodeError> {
	let mut out = Vec::new();
	while !data.is_empty() {
		let (s, rest) = split_terminated(encoding, data);
		out.push(decode_string(encoding, s)?);
		data = rest;
	}
	return Ok(out);
}

/// Encode one string, without a terminator.
pub fn encode_string(
	encoding: TextEncoding,
	s: &str,
	frame: FrameId,
	target: &mut Vec<u8>,
) -> Result<(), Id3EncodeError> {
	match encoding {
		TextEncoding::Latin1 => {
			for c in s.chars() {
				let b = u8::try_from(u32::from(c)).ok().ok_or(
					Id3EncodeError::Unrepresentable {
						frame,
						encoding: encoding.name(),
					},
				)?;
				target.push(b);
			}
		}
		TextEncoding::Utf8 => target.extend(s.as_bytes()),
		TextEncoding::Utf16 => {
			target.extend([0xFF, 0xFE]);
			for u in s.encode_utf16() {
				target.extend(u.to_le_bytes());
			}
		}
		TextEncoding::Utf16Be => {
			for u in s.encode_utf16() {
				target.extend(u.to_be_bytes());
			}
		}
	}
	return Ok(());
}

pub fn encode_terminator(encoding: TextEncoding, target: &mut Vec<u8>) {
	target.extend(std::iter::repeat(0u8).take(terminator_len(encoding)));
}

/// Encode a latin-1 string that doesn't follow the frame's encoding.
pub fn encode_latin1(s: &str, frame: FrameId, target: &mut Vec<u8>) -> Result<(), Id3EncodeError> {
	encode_string(TextEncoding::Latin1, s, frame, target)
}

/// Encode `s` as latin-1, replacing characters that don't fit with `?`.
pub fn encode_latin1_lossy(s: &str) -> Vec<u8> {
	s.chars()
		.map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
		.collect()
}
