//! ID3v2 unsynchronisation.
//!
//! Unsynchronised data never contains `0xFF` followed by a byte
//! with its top three bits set, so it can't be mistaken for an
//! MPEG sync word. We get there by inserting `0x00` after
//! every `0xFF` that needs it.

/// Undo unsynchronisation: every `FF 00` becomes `FF`.
pub fn decode(data: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(data.len());
	let mut last_ff = false;
	for b in data {
		if last_ff && *b == 0x00 {
			last_ff = false;
			continue;
		}
		out.push(*b);
		last_ff = *b == 0xFF;
	}
	return out;
}

/// Apply unsynchronisation.
pub fn encode(data: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(data.len());
	for (i, b) in data.iter().enumerate() {
		out.push(*b);
		if *b == 0xFF {
			match data.get(i + 1) {
				// A trailing `FF` must also be escaped,
				// whatever comes after it could be a sync byte.
				None => out.push(0x00),
				Some(next) if *next >= 0xE0 || *next == 0x00 => out.push(0x00),
				Some(_) => {}
			}
		}
	}
	return out;
}
