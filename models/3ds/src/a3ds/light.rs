use std::io::{
	Read,
	Write
};

use ultraviolet::vec::Vec3;

#[cfg(feature = "import")]
use super::container::Decoder;
#[cfg(feature = "export")]
use super::{
	chunk::write_children,
	codec::ChunkWriter
};

use super::{
	chunk::{
		children_size,
		Chunk,
		Record
	},
	codec::{
		Header,
		FLOAT_SIZE,
		VEC3_SIZE
	},
	tag,
	value::Color,
	Result
};

/// Light source: a position followed by its colour, spot and range chunks
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
	pub position: Vec3,
	pub children: Vec<Chunk>,
}

impl Light {
	pub fn new(position: Vec3) -> Self {
		Self {
			position: position,
			children: vec![],
		}
	}

	pub fn push(&mut self, chunk: Chunk) {
		self.children.push(chunk);
	}

	pub fn color(&self) -> Option<&Color> {
		self.children.iter().find_map(Chunk::as_color)
	}

	pub fn spot(&self) -> Option<&SpotLight> {
		self.children.iter().find_map(Chunk::as_spot_light)
	}

	/// Whether the light is switched off
	pub fn is_off(&self) -> bool {
		self.children.iter().any(|c| c.tag() == tag::LIGHT_OFF)
	}
}

impl Default for Light {
	fn default() -> Self {
		Self::new(Vec3::zero())
	}
}

impl Record for Light {
	fn tag(&self) -> u16 {
		tag::LIGHT
	}

	fn payload_size(&self) -> u64 {
		VEC3_SIZE + children_size(&self.children)
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		self.position = dec.reader.read_vec3()?;
		self.children = dec.read_children(header, |_| None)?;
		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_vec3(self.position)?;
		write_children(&self.children, w)
	}
}

/// Spot cone of a light. Angles are in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotLight {
	pub target: Vec3,
	pub hotspot: f32,
	pub falloff: f32,
	pub children: Vec<Chunk>,
}

impl SpotLight {
	pub fn new(target: Vec3, hotspot: f32, falloff: f32) -> Self {
		Self {
			target: target,
			hotspot: hotspot,
			falloff: falloff,
			children: vec![],
		}
	}

	pub fn push(&mut self, chunk: Chunk) {
		self.children.push(chunk);
	}

	/// Value of a float sub-chunk such as [`tag::LIGHT_ROLL`]
	pub fn scalar(&self, tag: u16) -> Option<f32> {
		self.children.iter().find(|c| c.tag() == tag).and_then(Chunk::as_scalar).map(|s| s.value)
	}
}

impl Default for SpotLight {
	fn default() -> Self {
		Self::new(Vec3::zero(), 0.0, 0.0)
	}
}

impl Record for SpotLight {
	fn tag(&self) -> u16 {
		tag::SPOT_LIGHT
	}

	fn payload_size(&self) -> u64 {
		VEC3_SIZE + 2 * FLOAT_SIZE + children_size(&self.children)
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		self.target = dec.reader.read_vec3()?;
		self.hotspot = dec.reader.read_f32()?;
		self.falloff = dec.reader.read_f32()?;
		self.children = dec.read_children(header, |_| None)?;
		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_vec3(self.target)?;
		w.write_f32(self.hotspot)?;
		w.write_f32(self.falloff)?;
		write_children(&self.children, w)
	}
}
