//! Small single-value records
use std::io::{
	Read,
	Write
};

use ultraviolet::vec::Vec3;

#[cfg(feature = "import")]
use super::{
	codec::ChunkReader,
	container::Decoder
};
#[cfg(feature = "export")]
use super::codec::ChunkWriter;

use super::{
	chunk::Record,
	codec::{
		Header,
		BYTE_SIZE,
		DWORD_SIZE,
		FLOAT_SIZE,
		VEC3_SIZE
	},
	tag,
	Result
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rgb {
	/// Components in `0.0..=1.0`
	Float(Vec3),
	Byte([u8; 3]),
}

/// Colour chunk. The wire tag decides between float and byte components and
/// whether the value is gamma corrected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub rgb: Rgb,
	pub gamma: bool,
}

impl Color {
	pub fn float(r: f32, g: f32, b: f32) -> Self {
		Self {
			rgb: Rgb::Float(Vec3::new(r, g, b)),
			gamma: false,
		}
	}

	pub fn byte(r: u8, g: u8, b: u8) -> Self {
		Self {
			rgb: Rgb::Byte([r, g, b]),
			gamma: false,
		}
	}

	/// Zeroed colour of the shape `tag` denotes
	pub fn for_tag(tag: u16) -> Option<Self> {
		let (rgb, gamma) = match tag {
			tag::RGB_FLOAT => (Rgb::Float(Vec3::zero()), false),
			tag::RGB_FLOAT_GAMMA => (Rgb::Float(Vec3::zero()), true),
			tag::RGB_BYTE => (Rgb::Byte([0; 3]), false),
			tag::RGB_BYTE_GAMMA => (Rgb::Byte([0; 3]), true),
			_ => return None,
		};

		Some(Self {
			rgb: rgb,
			gamma: gamma,
		})
	}

	/// Components scaled to `0.0..=1.0`
	pub fn to_vec3(&self) -> Vec3 {
		match self.rgb {
			Rgb::Float(v) => v,
			Rgb::Byte([r, g, b]) => Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0),
		}
	}

	pub fn red(&self) -> f32 {
		self.to_vec3().x
	}

	pub fn green(&self) -> f32 {
		self.to_vec3().y
	}

	pub fn blue(&self) -> f32 {
		self.to_vec3().z
	}

	#[cfg(feature = "import")]
	pub(crate) fn read_fields<R>(&mut self, reader: &mut ChunkReader<R>) -> Result<()>
	where
		R: Read,
	{
		match &mut self.rgb {
			Rgb::Float(v) => *v = reader.read_vec3()?,
			Rgb::Byte(b) => for c in b.iter_mut() {
				*c = reader.read_u8()?;
			},
		}

		Ok(())
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::float(0.0, 0.0, 0.0)
	}
}

impl Record for Color {
	fn tag(&self) -> u16 {
		match (self.rgb, self.gamma) {
			(Rgb::Float(_), false) => tag::RGB_FLOAT,
			(Rgb::Float(_), true) => tag::RGB_FLOAT_GAMMA,
			(Rgb::Byte(_), false) => tag::RGB_BYTE,
			(Rgb::Byte(_), true) => tag::RGB_BYTE_GAMMA,
		}
	}

	fn payload_size(&self) -> u64 {
		match self.rgb {
			Rgb::Float(_) => VEC3_SIZE,
			Rgb::Byte(_) => 3 * BYTE_SIZE,
		}
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, _: &Header) -> Result<()>
	where
		R: Read,
	{
		self.read_fields(&mut dec.reader)
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		match self.rgb {
			Rgb::Float(v) => w.write_vec3(v),
			Rgb::Byte(b) => {
				for c in b {
					w.write_u8(c)?;
				}
				Ok(())
			},
		}
	}
}

/// Single float value, e.g. master scale or a light's spot roll
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scalar {
	pub tag: u16,
	pub value: f32,
}

impl Scalar {
	pub fn new(tag: u16, value: f32) -> Self {
		Self {
			tag: tag,
			value: value,
		}
	}
}

impl Record for Scalar {
	fn tag(&self) -> u16 {
		self.tag
	}

	fn payload_size(&self) -> u64 {
		FLOAT_SIZE
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, _: &Header) -> Result<()>
	where
		R: Read,
	{
		self.value = dec.reader.read_f32()?;
		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_f32(self.value)
	}
}

/// File or mesh format version
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Version {
	pub tag: u16,
	pub value: u32,
}

impl Version {
	pub fn new(tag: u16, value: u32) -> Self {
		Self {
			tag: tag,
			value: value,
		}
	}
}

impl Record for Version {
	fn tag(&self) -> u16 {
		self.tag
	}

	fn payload_size(&self) -> u64 {
		DWORD_SIZE
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, _: &Header) -> Result<()>
	where
		R: Read,
	{
		self.value = dec.reader.read_u32()?;
		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_u32(self.value)
	}
}

/// Chunk whose presence is the whole message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Flag {
	pub tag: u16,
}

impl Flag {
	pub fn new(tag: u16) -> Self {
		Self {
			tag: tag,
		}
	}
}

impl Record for Flag {
	fn tag(&self) -> u16 {
		self.tag
	}

	fn payload_size(&self) -> u64 {
		0
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, _: &mut Decoder<'_, R>, _: &Header) -> Result<()>
	where
		R: Read,
	{
		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, _: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		Ok(())
	}
}
