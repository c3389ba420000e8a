//! Streams we can locate and rewrite tags in.

use std::io::{Cursor, ErrorKind, Read, Seek, Write};

/// A stream we can read, write, seek and truncate.
pub trait TagStream: Read + Write + Seek {
	/// Truncate or extend this stream to exactly `len` bytes.
	/// Does not move the cursor.
	fn set_len(&mut self, len: u64) -> std::io::Result<()>;
}

impl TagStream for std::fs::File {
	fn set_len(&mut self, len: u64) -> std::io::Result<()> {
		std::fs::File::set_len(self, len)
	}
}

impl TagStream for Cursor<Vec<u8>> {
	fn set_len(&mut self, len: u64) -> std::io::Result<()> {
		let len = usize::try_from(len)
			.map_err(|e| std::io::Error::new(ErrorKind::InvalidInput, e))?;
		self.get_mut().resize(len, 0);
		Ok(())
	}
}

/// Read into `buf` until it is full or the stream ends.
/// Returns the number of bytes read.
pub(crate) fn read_up_to<R: Read>(mut read: R, buf: &mut [u8]) -> std::io::Result<usize> {
	let mut filled = 0;
	while filled < buf.len() {
		match read.read(&mut buf[filled..]) {
			Ok(0) => break,
			Ok(n) => filled += n,
			Err(e) if e.kind() == ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		}
	}
	return Ok(filled);
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::SeekFrom;

	#[test]
	fn cursor_set_len_keeps_position() {
		let mut c = Cursor::new(vec![1u8; 10]);
		c.seek(SeekFrom::Start(8)).unwrap();
		TagStream::set_len(&mut c, 4).unwrap();
		assert_eq!(c.get_ref().len(), 4);
		assert_eq!(c.stream_position().unwrap(), 8);

		TagStream::set_len(&mut c, 6).unwrap();
		assert_eq!(c.get_ref(), &[1, 1, 1, 1, 0, 0]);
	}

	#[test]
	fn read_up_to_short_stream() {
		let mut buf = [0u8; 10];
		let n = read_up_to(Cursor::new([7u8; 4]), &mut buf).unwrap();
		assert_eq!(n, 4);
		assert_eq!(&buf[..5], &[7, 7, 7, 7, 0]);
	}
}
