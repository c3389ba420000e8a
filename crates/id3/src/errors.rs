//! ID3 errors
use std::string::FromUtf8Error;
use thiserror::Error;

use crate::tag::FrameId;

#[derive(Debug, Error)]
pub enum Id3DecodeError {
	/// Data doesn't start with `ID3` or `TAG`
	#[error("id3 signature is missing or malformed")]
	BadMagicBytes,

	/// We only read ID3v2.3 and ID3v2.4
	#[error("unsupported id3v2 major version {0}")]
	UnsupportedVersion(u8),

	/// A size field had its high bit set
	#[error("malformed synchsafe integer")]
	BadSynchsafe,

	/// Data ended before the tag did
	#[error("tag data is truncated")]
	Truncated,

	/// The extended header is malformed
	#[error("malformed extended header")]
	MalformedExtendedHeader,

	/// We found a frame id with characters outside `A-Z0-9`
	#[error("invalid frame id `{}`", String::from_utf8_lossy(.0))]
	BadFrameId([u8; 4]),

	/// A frame claims to be longer than the tag that holds it
	#[error("frame {0} overflows its tag")]
	FrameOverflow(FrameId),

	/// A frame's fields don't match its layout
	#[error("malformed frame {0}")]
	MalformedFrame(FrameId),

	/// A text field declared an encoding we don't know
	#[error("invalid text encoding {0}")]
	BadTextEncoding(u8),

	/// We tried to decode a string, but found invalid UTF-8
	#[error("error while decoding string")]
	FailedStringDecode(#[from] FromUtf8Error),

	/// We tried to decode a string, but found invalid UTF-16
	#[error("error while decoding utf-16 string")]
	FailedUtf16Decode,

	/// The CRC in the extended header doesn't match the tag data
	#[error("crc mismatch: expected {expected:08x}, got {got:08x}")]
	CrcMismatch { expected: u32, got: u32 },
}

#[derive(Debug, Error)]
pub enum Id3EncodeError {
	/// Text can't be represented in the encoding its frame declares
	#[error("frame {frame} has text that can't be encoded as {encoding}")]
	Unrepresentable {
		frame: FrameId,
		encoding: &'static str,
	},

	/// A frame's fields don't fit its id
	#[error("fields of frame {0} don't match its layout")]
	FieldMismatch(FrameId),

	/// The rendered tag is too large for a synchsafe size
	#[error("tag of {0} bytes is too large to encode")]
	TagTooLarge(usize),
}

#[derive(Debug, Error)]
pub enum FrameIdError {
	#[error("frame ids are exactly four characters, got {0}")]
	BadLength(usize),

	#[error("frame ids may only contain A-Z and 0-9")]
	BadCharacter,
}

#[derive(Debug, Error)]
pub enum Id3FileError {
	/// We encountered an i/o error while reading or writing
	#[error("i/o error while accessing tagged file")]
	IoError(#[from] std::io::Error),

	/// The primary tag could not be rendered
	#[error("error while rendering tag")]
	Encode(#[from] Id3EncodeError),
}
