use std::io::{
	Read,
	Write
};

use ultraviolet::vec::Vec3;

#[cfg(feature = "import")]
use super::{
	chunk::skip_rest,
	container::Decoder
};
#[cfg(feature = "export")]
use super::codec::ChunkWriter;

use super::{
	chunk::Record,
	codec::{
		Header,
		FLOAT_SIZE,
		VEC3_SIZE
	},
	tag,
	Result
};

/// Camera placement
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
	pub eye: Vec3,
	pub target: Vec3,
	/// Roll around the view axis, in degrees
	pub bank: f32,
	/// Focal length in millimetres
	pub lens: f32,
}

impl Camera {
	pub fn new(eye: Vec3, target: Vec3, bank: f32, lens: f32) -> Self {
		Self {
			eye: eye,
			target: target,
			bank: bank,
			lens: lens,
		}
	}
}

impl Default for Camera {
	fn default() -> Self {
		Self::new(Vec3::zero(), Vec3::zero(), 0.0, 50.0)
	}
}

impl Record for Camera {
	fn tag(&self) -> u16 {
		tag::CAMERA
	}

	fn payload_size(&self) -> u64 {
		2 * VEC3_SIZE + 2 * FLOAT_SIZE
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		self.eye = dec.reader.read_vec3()?;
		self.target = dec.reader.read_vec3()?;
		self.bank = dec.reader.read_f32()?;
		self.lens = dec.reader.read_f32()?;

		// Range and see-cone sub-chunks are not interpreted
		skip_rest(&mut dec.reader, header)
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_vec3(self.eye)?;
		w.write_vec3(self.target)?;
		w.write_f32(self.bank)?;
		w.write_f32(self.lens)
	}
}

#[cfg(all(test, feature = "import", feature = "export"))]
mod tests {
	use crate::a3ds::{
		chunk::Chunk,
		codec::ChunkWriter,
		read_chunk,
		registry::Registry,
		write_chunk,
		ReadCfg
	};
	use super::*;

	#[test]
	fn test_camera() {
		let camera = Camera::new(Vec3::new(0.0, -100.0, 50.0), Vec3::zero(), 0.0, 35.0);
		assert_eq!(6 + 32, camera.size());

		let chunk = Chunk::Camera(camera);
		let mut data = vec![];
		write_chunk(&mut data, &chunk).unwrap();
		assert_eq!(38, data.len());
		assert_eq!(chunk, read_chunk(data.as_slice(), &Registry::standard(), &ReadCfg::default())
			.unwrap().unwrap());
	}

	#[test]
	fn test_camera_ranges_are_skipped() {
		let camera = Camera::new(Vec3::one(), Vec3::zero(), 5.0, 28.0);

		let mut w = ChunkWriter::new(vec![]);
		w.write_header(tag::CAMERA, 6 + 32 + 14).unwrap();
		w.write_vec3(camera.eye).unwrap();
		w.write_vec3(camera.target).unwrap();
		w.write_f32(camera.bank).unwrap();
		w.write_f32(camera.lens).unwrap();
		w.write_header(0x4720, 14).unwrap();
		w.write_f32(1.0).unwrap();
		w.write_f32(1000.0).unwrap();
		let data = w.into_inner();

		let chunk = read_chunk(data.as_slice(), &Registry::standard(), &ReadCfg::default()).unwrap().unwrap();
		assert_eq!(Some(&camera), chunk.as_camera());
		assert_eq!(38, chunk.size());
	}
}
