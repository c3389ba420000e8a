//! ID3v2 headers, footers, and synchsafe integers.

use crate::{
	errors::{Id3DecodeError, Id3EncodeError},
	tag::flags::TagFlags,
};

/// The length of an ID3v2 header or footer
pub const HEADER_LEN: usize = 10;

/// The largest number a 4-byte synchsafe integer can hold.
pub const SYNCHSAFE_MAX: u32 = (1 << 28) - 1;

/// Decode a 4-byte synchsafe integer: 7 bits per byte, big-endian.
pub fn decode_synchsafe(bytes: [u8; 4]) -> Result<u32, Id3DecodeError> {
	if bytes.iter().any(|x| x & 0x80 != 0) {
		return Err(Id3DecodeError::BadSynchsafe);
	}

	return Ok(bytes
		.iter()
		.fold(0u32, |acc, x| (acc << 7) | u32::from(*x)));
}

pub fn encode_synchsafe(value: u32) -> Result<[u8; 4], Id3EncodeError> {
	if value > SYNCHSAFE_MAX {
		return Err(Id3EncodeError::TagTooLarge(value as usize));
	}

	return Ok([
		((value >> 21) & 0x7F) as u8,
		((value >> 14) & 0x7F) as u8,
		((value >> 7) & 0x7F) as u8,
		(value & 0x7F) as u8,
	]);
}

/// Decode the 5-byte synchsafe integer that holds an
/// extended header CRC. Only the low 32 bits are kept.
pub fn decode_synchsafe5(bytes: [u8; 5]) -> Result<u32, Id3DecodeError> {
	if bytes.iter().any(|x| x & 0x80 != 0) {
		return Err(Id3DecodeError::BadSynchsafe);
	}

	let x = bytes
		.iter()
		.fold(0u64, |acc, x| (acc << 7) | u64::from(*x));
	return Ok((x & 0xFFFF_FFFF) as u32);
}

pub fn encode_synchsafe5(value: u32) -> [u8; 5] {
	let value = u64::from(value);
	[
		((value >> 28) & 0x7F) as u8,
		((value >> 21) & 0x7F) as u8,
		((value >> 14) & 0x7F) as u8,
		((value >> 7) & 0x7F) as u8,
		(value & 0x7F) as u8,
	]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
	/// `ID3`, at the start of a tag
	Header,
	/// `3DI`, at the end of a tag
	Footer,
}

/// An ID3v2 header or footer.
/// These share one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id3v2Header {
	pub kind: HeaderKind,
	pub major: u8,
	pub revision: u8,
	pub flags: TagFlags,

	/// The size of the tag, excluding header and footer
	pub size: u32,
}

impl Id3v2Header {
	/// Try to decode a header or footer from the start of `data`.
	/// Returns `None` if `data` doesn't start with one.
	pub fn decode(data: &[u8]) -> Option<Self> {
		let data: &[u8; HEADER_LEN] = data.get(..HEADER_LEN)?.try_into().ok()?;

		let kind = match &data[0..3] {
			b"ID3" => HeaderKind::Header,
			b"3DI" => HeaderKind::Footer,
			_ => return None,
		};

		if data[3] == 0xFF || data[4] == 0xFF {
			return None;
		}

		let size = decode_synchsafe([data[6], data[7], data[8], data[9]]).ok()?;

		Some(Self {
			kind,
			major: data[3],
			revision: data[4],
			flags: TagFlags::from_bits_truncate(data[5]),
			size,
		})
	}

	pub fn encode(&self) -> Result<[u8; HEADER_LEN], Id3EncodeError> {
		let magic = match self.kind {
			HeaderKind::Header => b"ID3",
			HeaderKind::Footer => b"3DI",
		};
		let size = encode_synchsafe(self.size)?;

		return Ok([
			magic[0],
			magic[1],
			magic[2],
			self.major,
			self.revision,
			self.flags.bits(),
			size[0],
			size[1],
			size[2],
			size[3],
		]);
	}

	/// The length of the whole tag this header describes,
	/// including header and footer.
	pub fn total_len(&self) -> u64 {
		let footer = if self.flags.is_footer() {
			HEADER_LEN as u64
		} else {
			0
		};
		HEADER_LEN as u64 + u64::from(self.size) + footer
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn synchsafe_values() {
		assert_eq!(decode_synchsafe([0x00, 0x00, 0x02, 0x01]).unwrap(), 257);
		assert_eq!(encode_synchsafe(257).unwrap(), [0x00, 0x00, 0x02, 0x01]);
		assert_eq!(
			encode_synchsafe(SYNCHSAFE_MAX).unwrap(),
			[0x7F, 0x7F, 0x7F, 0x7F]
		);
		assert!(encode_synchsafe(SYNCHSAFE_MAX + 1).is_err());
		assert!(matches!(
			decode_synchsafe([0x80, 0, 0, 0]),
			Err(Id3DecodeError::BadSynchsafe)
		));
	}

	#[test]
	fn synchsafe5_holds_a_crc() {
		let crc = 0xDEAD_BEEF;
		assert_eq!(decode_synchsafe5(encode_synchsafe5(crc)).unwrap(), crc);
		assert_eq!(encode_synchsafe5(crc)[0], 0x0D);
	}

	#[test]
	fn decode_header() {
		let h = Id3v2Header::decode(b"ID3\x04\x00\x10\x00\x00\x01\x00rest").unwrap();
		assert_eq!(h.kind, HeaderKind::Header);
		assert_eq!(h.major, 4);
		assert!(h.flags.is_footer());
		assert_eq!(h.size, 128);
		assert_eq!(h.total_len(), 148);
		assert_eq!(&h.encode().unwrap(), b"ID3\x04\x00\x10\x00\x00\x01\x00");
	}

	#[test]
	fn reject_non_headers() {
		assert!(Id3v2Header::decode(b"ID3\x04\x00").is_none());
		assert!(Id3v2Header::decode(b"ID3\xFF\x00\x00\x00\x00\x00\x00").is_none());
		assert!(Id3v2Header::decode(b"ID3\x04\x00\x00\x80\x00\x00\x00").is_none());
		assert!(Id3v2Header::decode(b"TAG\x04\x00\x00\x00\x00\x00\x00").is_none());
	}
}
