use std::io::{
	Error,
	ErrorKind,
	Read,
	Result,
	Write
};

use ultraviolet::vec::{
	Vec2,
	Vec3
};

pub trait ReadBinExt: Read {
	/// Reads a null-terminated single-byte string. The terminator is consumed
	/// but not returned; every other byte becomes exactly one `char`.
	#[inline]
	fn read_cstr(&mut self) -> Result<String> {
		let mut s = String::new();
		let mut buf = [0; 1];

		loop {
			self.read_exact(&mut buf)?;
			if buf[0] == 0 {
				break;
			}
			s.push(buf[0] as char);
		}

		Ok(s)
	}

	/// Reads a little endian 2D vector
	#[inline]
	fn read_vec2_le(&mut self) -> Result<Vec2> {
		let mut x = [0; 4];
		let mut y = x;

		self.read_exact(&mut x)?;
		self.read_exact(&mut y)?;

		Ok(Vec2::new(f32::from_le_bytes(x), f32::from_le_bytes(y)))
	}

	/// Reads a little endian 3D vector
	#[inline]
	fn read_vec3_le(&mut self) -> Result<Vec3> {
		let mut x = [0; 4];
		let mut y = x;
		let mut z = y;

		self.read_exact(&mut x)?;
		self.read_exact(&mut y)?;
		self.read_exact(&mut z)?;

		Ok(Vec3::new(f32::from_le_bytes(x), f32::from_le_bytes(y), f32::from_le_bytes(z)))
	}
}

impl<R> ReadBinExt for R
where
	R: Read + ?Sized,
{
}

pub trait WriteBinExt: Write {
	/// Writes a string followed by a null terminator, one byte per `char`.
	/// Returns the number of bytes written.
	///
	/// Fails with [`ErrorKind::InvalidInput`] before writing anything if the
	/// string holds a NUL or a `char` above U+00FF.
	#[inline]
	fn write_cstr(&mut self, s: &str) -> Result<usize> {
		let mut buf = Vec::with_capacity(s.len() + 1);
		for c in s.chars() {
			match u8::try_from(c) {
				Ok(b) if b != 0 => buf.push(b),
				_ => return Err(Error::new(ErrorKind::InvalidInput,
					format!("{:?} cannot be stored as a single-byte C string", s))),
			}
		}
		buf.push(0);

		self.write_all(&buf)?;
		Ok(buf.len())
	}

	/// Writes a little endian 2D vector
	#[inline]
	fn write_vec2_le(&mut self, v: Vec2) -> Result<()> {
		self.write_all(&v.x.to_le_bytes())?;
		self.write_all(&v.y.to_le_bytes())
	}

	/// Writes a little endian 3D vector
	#[inline]
	fn write_vec3_le(&mut self, v: Vec3) -> Result<()> {
		self.write_all(&v.x.to_le_bytes())?;
		self.write_all(&v.y.to_le_bytes())?;
		self.write_all(&v.z.to_le_bytes())
	}
}

impl<W> WriteBinExt for W
where
	W: Write + ?Sized,
{
}
