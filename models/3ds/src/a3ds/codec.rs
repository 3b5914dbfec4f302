//! Byte level primitives of the chunk format.
//!
//! All multi-byte values are little endian. The reader never reports running
//! out of input as an error: it raises [`ChunkReader::at_eof`] and hands back
//! a zero value, leaving it to the caller to stop looping.

use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use std::io::{
	self,
	ErrorKind,
	Read,
	Write
};

use ultraviolet::vec::{
	Vec2,
	Vec3
};

use rgk_core::io_ext::{
	ReadBinExt,
	WriteBinExt
};

use super::{
	ChunkError,
	Result
};

/// Tag (2 bytes) plus length (4 bytes)
pub const HEADER_SIZE: u64 = 6;

pub const BYTE_SIZE: u64 = 1;
pub const WORD_SIZE: u64 = 2;
pub const DWORD_SIZE: u64 = 4;
pub const FLOAT_SIZE: u64 = 4;
pub const VEC2_SIZE: u64 = 2 * FLOAT_SIZE;
pub const VEC3_SIZE: u64 = 3 * FLOAT_SIZE;

/// Encoded size of a null-terminated string. Strings are stored one byte per
/// `char`.
pub fn cstr_size(s: &str) -> u64 {
	s.chars().count() as u64 + 1
}

/// Whether `s` can be stored as a single-byte null-terminated string
pub fn is_cstr_encodable(s: &str) -> bool {
	s.chars().all(|c| c != '\0' && u32::from(c) <= 0xFF)
}

/// Record header as found on the wire, plus the absolute offsets it spans.
///
/// `start` and `end` only exist while decoding; they bound the read loops and
/// are never written back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
	pub tag: u16,
	pub length: u32,
	pub start: u64,
	pub end: u64,
}

impl Header {
	/// Reads the length field of a record whose tag was just consumed.
	///
	/// Returns `None` if the stream ends inside the length field.
	#[cfg(feature = "import")]
	pub fn read<R>(reader: &mut ChunkReader<R>, tag: u16) -> Result<Option<Header>>
	where
		R: Read,
	{
		let start = reader.position().saturating_sub(WORD_SIZE);
		let length = reader.read_u32()?;

		if reader.at_eof() {
			return Ok(None);
		}

		if length == 0 {
			return Err(ChunkError::MalformedLength {
				tag: tag,
				offset: start,
			});
		}

		Ok(Some(Header {
			tag: tag,
			length: length,
			start: start,
			end: start + length as u64,
		}))
	}

	/// Number of bytes declared for the payload
	pub fn payload_len(&self) -> u64 {
		(self.length as u64).saturating_sub(HEADER_SIZE)
	}
}

/// Position tracking reader over any byte source
#[cfg(feature = "import")]
pub struct ChunkReader<R> {
	inner: R,
	position: u64,
	eof: bool,
}

#[cfg(feature = "import")]
impl<R> ChunkReader<R>
where
	R: Read,
{
	pub fn new(inner: R) -> Self {
		Self {
			inner: inner,
			position: 0,
			eof: false,
		}
	}

	/// Absolute offset of the next byte to be read
	pub fn position(&self) -> u64 {
		self.position
	}

	pub fn at_eof(&self) -> bool {
		self.eof
	}

	pub fn into_inner(self) -> R {
		self.inner
	}

	/// Converts an end-of-input failure into the EOF flag and a zero value
	fn settle<T>(&mut self, res: io::Result<T>, width: u64, zero: T) -> Result<T> {
		match res {
			Ok(v) => {
				self.position += width;
				Ok(v)
			},
			Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
				self.eof = true;
				Ok(zero)
			},
			Err(e) => Err(e.into()),
		}
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		if self.eof {
			return Ok(0);
		}

		let res = self.inner.read_u8();
		self.settle(res, BYTE_SIZE, 0)
	}

	/// Reads a one byte boolean. The format stores `true` as a zero byte.
	pub fn read_bool(&mut self) -> Result<bool> {
		Ok(self.read_u8()? == 0)
	}

	pub fn read_u16(&mut self) -> Result<u16> {
		if self.eof {
			return Ok(0);
		}

		let res = self.inner.read_u16::<LE>();
		self.settle(res, WORD_SIZE, 0)
	}

	/// Reads two 16-bit words, low word first
	pub fn read_u32(&mut self) -> Result<u32> {
		let lo = self.read_u16()? as u32;
		let hi = self.read_u16()? as u32;

		Ok(hi << 16 | lo)
	}

	pub fn read_f32(&mut self) -> Result<f32> {
		Ok(f32::from_bits(self.read_u32()?))
	}

	pub fn read_vec2(&mut self) -> Result<Vec2> {
		if self.eof {
			return Ok(Vec2::zero());
		}

		let res = self.inner.read_vec2_le();
		self.settle(res, VEC2_SIZE, Vec2::zero())
	}

	pub fn read_vec3(&mut self) -> Result<Vec3> {
		if self.eof {
			return Ok(Vec3::zero());
		}

		let res = self.inner.read_vec3_le();
		self.settle(res, VEC3_SIZE, Vec3::zero())
	}

	/// Reads a null-terminated string, terminator excluded. Each byte is taken
	/// as one `char` (Latin-1).
	pub fn read_cstr(&mut self) -> Result<String> {
		if self.eof {
			return Ok(String::new());
		}

		match self.inner.read_cstr() {
			Ok(s) => {
				self.position += cstr_size(&s);
				Ok(s)
			},
			Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
				self.eof = true;
				Ok(String::new())
			},
			Err(e) => Err(e.into()),
		}
	}

	/// Discards `count` bytes
	pub fn skip(&mut self, count: u64) -> Result<()> {
		if self.eof || count == 0 {
			return Ok(());
		}

		let skipped = io::copy(&mut (&mut self.inner).take(count), &mut io::sink())?;
		self.position += skipped;
		if skipped < count {
			self.eof = true;
		}

		Ok(())
	}

	/// Discards bytes up to the absolute offset `end`, if not already past it
	pub fn skip_to(&mut self, end: u64) -> Result<()> {
		if self.position < end {
			self.skip(end - self.position)?;
		}

		Ok(())
	}
}

/// Byte counting writer over any byte sink
#[cfg(feature = "export")]
pub struct ChunkWriter<W> {
	inner: W,
	written: u64,
}

#[cfg(feature = "export")]
impl<W> ChunkWriter<W>
where
	W: Write,
{
	pub fn new(inner: W) -> Self {
		Self {
			inner: inner,
			written: 0,
		}
	}

	/// Total number of bytes written so far
	pub fn written(&self) -> u64 {
		self.written
	}

	pub fn into_inner(self) -> W {
		self.inner
	}

	pub fn flush(&mut self) -> Result<()> {
		Ok(self.inner.flush()?)
	}

	/// Writes a record header. `size` is the full encoded size, header
	/// included.
	pub fn write_header(&mut self, tag: u16, size: u64) -> Result<()> {
		let length = u32::try_from(size).map_err(|_| ChunkError::RecordTooLarge {
			tag: tag,
			size: size,
		})?;

		log::debug!("write chunk {:#06x} at {} (length {})", tag, self.written, length);
		self.write_u16(tag)?;
		self.write_u32(length)
	}

	/// Writes an element count as a 16-bit word
	pub fn write_count(&mut self, tag: u16, count: usize) -> Result<()> {
		let count = u16::try_from(count).map_err(|_| ChunkError::CountOverflow {
			tag: tag,
			count: count,
		})?;

		self.write_u16(count)
	}

	pub fn write_u8(&mut self, v: u8) -> Result<()> {
		self.inner.write_u8(v)?;
		self.written += BYTE_SIZE;
		Ok(())
	}

	/// Writes a one byte boolean, `true` as zero
	pub fn write_bool(&mut self, v: bool) -> Result<()> {
		self.write_u8(if v { 0 } else { 1 })
	}

	pub fn write_u16(&mut self, v: u16) -> Result<()> {
		self.inner.write_u16::<LE>(v)?;
		self.written += WORD_SIZE;
		Ok(())
	}

	/// Writes two 16-bit words, low word first
	pub fn write_u32(&mut self, v: u32) -> Result<()> {
		self.write_u16((v & 0xFFFF) as u16)?;
		self.write_u16((v >> 16) as u16)
	}

	pub fn write_f32(&mut self, v: f32) -> Result<()> {
		self.write_u32(v.to_bits())
	}

	pub fn write_vec2(&mut self, v: Vec2) -> Result<()> {
		self.inner.write_vec2_le(v)?;
		self.written += VEC2_SIZE;
		Ok(())
	}

	pub fn write_vec3(&mut self, v: Vec3) -> Result<()> {
		self.inner.write_vec3_le(v)?;
		self.written += VEC3_SIZE;
		Ok(())
	}

	/// Writes a null-terminated string for the record `tag`
	pub fn write_cstr(&mut self, tag: u16, s: &str) -> Result<()> {
		if !is_cstr_encodable(s) {
			return Err(ChunkError::UnencodableString {
				tag: tag,
				text: s.to_string(),
			});
		}

		self.written += self.inner.write_cstr(s)? as u64;
		Ok(())
	}
}

#[cfg(all(test, feature = "import", feature = "export"))]
mod tests {
	use ultraviolet::vec::Vec3;

	use super::*;

	#[test]
	fn test_primitives() {
		let mut w = ChunkWriter::new(vec![]);
		w.write_u8(0x7F).unwrap();
		w.write_u16(0xBEEF).unwrap();
		w.write_u32(0x1234_5678).unwrap();
		w.write_f32(-1.5).unwrap();
		w.write_cstr(0x4000, "Box01").unwrap();
		w.write_vec3(Vec3::new(1.0, 2.0, 3.0)).unwrap();
		assert_eq!(1 + 2 + 4 + 4 + 6 + 12, w.written());

		let data = w.into_inner();
		assert_eq!(&[0x78, 0x56, 0x34, 0x12], &data[3..7]);

		let mut r = ChunkReader::new(data.as_slice());
		assert_eq!(0x7F, r.read_u8().unwrap());
		assert_eq!(0xBEEF, r.read_u16().unwrap());
		assert_eq!(0x1234_5678, r.read_u32().unwrap());
		assert_eq!(-1.5, r.read_f32().unwrap());
		assert_eq!("Box01", r.read_cstr().unwrap());
		assert_eq!(Vec3::new(1.0, 2.0, 3.0), r.read_vec3().unwrap());
		assert_eq!(29, r.position());
		assert!(!r.at_eof());
	}

	#[test]
	fn test_bool_is_inverted_on_the_wire() {
		let mut w = ChunkWriter::new(vec![]);
		w.write_bool(true).unwrap();
		w.write_bool(false).unwrap();
		let data = w.into_inner();
		assert_eq!(vec![0, 1], data);

		let mut r = ChunkReader::new(&[0u8, 1, 0xFF][..]);
		assert!(r.read_bool().unwrap());
		assert!(!r.read_bool().unwrap());
		assert!(!r.read_bool().unwrap());
	}

	#[test]
	fn test_read_past_end_yields_zero() {
		let mut r = ChunkReader::new(&[0x01u8][..]);
		assert_eq!(0, r.read_u16().unwrap());
		assert!(r.at_eof());
		assert_eq!(0, r.read_u32().unwrap());
		assert_eq!(0.0, r.read_f32().unwrap());
		assert_eq!("", r.read_cstr().unwrap());
		assert_eq!(Vec3::zero(), r.read_vec3().unwrap());
	}

	#[test]
	fn test_cstr_position_counts_bytes() {
		let mut r = ChunkReader::new(&[b'C', 0xE9, 0, 0x11][..]);
		assert_eq!("Cé", r.read_cstr().unwrap());
		assert_eq!(3, r.position());
		assert_eq!(0x11, r.read_u8().unwrap());
		assert_eq!(3, cstr_size("Cé"));
	}

	#[test]
	fn test_unencodable_cstr() {
		let mut w = ChunkWriter::new(vec![]);
		for s in ["a\0b", "Ω"] {
			match w.write_cstr(0xA000, s) {
				Err(ChunkError::UnencodableString { tag, text }) => {
					assert_eq!(0xA000, tag);
					assert_eq!(s, text);
				},
				other => panic!("unexpected result: {:?}", other),
			}
		}
		assert_eq!(0, w.written());

		w.write_cstr(0xA000, "Café").unwrap();
		assert_eq!(5, w.written());
		assert_eq!(vec![b'C', b'a', b'f', 0xE9, 0], w.into_inner());
	}

	#[test]
	fn test_skip() {
		let mut r = ChunkReader::new(&[1u8, 2, 3, 4, 5][..]);
		r.skip(3).unwrap();
		assert_eq!(3, r.position());
		assert_eq!(4, r.read_u8().unwrap());
		r.skip_to(2).unwrap();
		assert_eq!(4, r.position());
		r.skip(10).unwrap();
		assert!(r.at_eof());
		assert_eq!(5, r.position());
	}

	#[test]
	fn test_header() {
		let mut r = ChunkReader::new(&[0x4D, 0x4D, 0x0A, 0, 0, 0][..]);
		let tag = r.read_u16().unwrap();
		let header = Header::read(&mut r, tag).unwrap().unwrap();
		assert_eq!(Header { tag: 0x4D4D, length: 10, start: 0, end: 10 }, header);
		assert_eq!(4, header.payload_len());
	}

	#[test]
	fn test_header_zero_length() {
		let mut r = ChunkReader::new(&[0x10, 0x41, 0, 0, 0, 0][..]);
		let tag = r.read_u16().unwrap();
		match Header::read(&mut r, tag) {
			Err(ChunkError::MalformedLength { tag, offset }) => {
				assert_eq!(0x4110, tag);
				assert_eq!(0, offset);
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn test_header_truncated() {
		let mut r = ChunkReader::new(&[0x10, 0x41, 0x20][..]);
		let tag = r.read_u16().unwrap();
		assert_eq!(None, Header::read(&mut r, tag).unwrap());
	}

	#[test]
	fn test_oversized_count() {
		let mut w = ChunkWriter::new(vec![]);
		match w.write_count(0x4110, 70_000) {
			Err(ChunkError::CountOverflow { tag, count }) => {
				assert_eq!(0x4110, tag);
				assert_eq!(70_000, count);
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}
}
