use std::io::{
	Read,
	Write
};

#[cfg(feature = "import")]
use super::codec::ChunkReader;
#[cfg(feature = "export")]
use super::codec::ChunkWriter;
#[cfg(feature = "import")]
use super::container::Decoder;

use super::{
	camera::Camera,
	codec::{
		Header,
		HEADER_SIZE
	},
	container::Container,
	light::{
		Light,
		SpotLight
	},
	material::Material,
	mesh::{
		FaceList,
		FaceMaterial,
		LocalAxes,
		MapCoords,
		Object,
		SmoothingGroups,
		VertexList,
		Visibility
	},
	value::{
		Color,
		Flag,
		Scalar,
		Version
	},
	Result
};

/// Behaviour shared by every concrete record type.
///
/// The encoded size is always derived from the current contents; nothing is
/// cached, so edits anywhere in a tree are reflected in every ancestor length.
pub trait Record {
	fn tag(&self) -> u16;

	/// Bytes following the 6 byte header
	fn payload_size(&self) -> u64;

	/// Full encoded size, header included
	fn size(&self) -> u64 {
		HEADER_SIZE + self.payload_size()
	}

	/// Populates the record from the stream. The header has already been
	/// consumed.
	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read;

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write;
}

/// Placeholder for a tag nobody registered.
///
/// Its bytes are skipped on decode and it vanishes on encode: it writes
/// nothing and reports a size of zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unknown {
	pub tag: u16,
	/// Declared length in the source stream
	pub length: u32,
}

impl Unknown {
	pub fn new(tag: u16) -> Self {
		Self {
			tag: tag,
			length: 0,
		}
	}
}

impl Record for Unknown {
	fn tag(&self) -> u16 {
		self.tag
	}

	fn payload_size(&self) -> u64 {
		0
	}

	fn size(&self) -> u64 {
		0
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		log::debug!("skipping unknown chunk {:#06x} at {} (length {})", header.tag, header.start,
			header.length);
		self.length = header.length;
		skip_rest(&mut dec.reader, header)
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, _: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		Ok(())
	}
}

/// Skips whatever is left of a record's declared range
#[cfg(feature = "import")]
pub(crate) fn skip_rest<R>(reader: &mut ChunkReader<R>, header: &Header) -> Result<()>
where
	R: Read,
{
	reader.skip_to(header.end)
}

/// A node of the chunk tree
#[derive(Clone, Debug, PartialEq)]
pub enum Chunk {
	Container(Container),
	Object(Object),
	Vertices(VertexList),
	Faces(FaceList),
	FaceMaterial(FaceMaterial),
	Smoothing(SmoothingGroups),
	MapCoords(MapCoords),
	LocalAxes(LocalAxes),
	Visibility(Visibility),
	Light(Light),
	SpotLight(SpotLight),
	Camera(Camera),
	Material(Material),
	Color(Color),
	Scalar(Scalar),
	Version(Version),
	Flag(Flag),
	Unknown(Unknown),
}

macro_rules! dispatch {
	($self: expr, $c: ident => $body: expr) => {
		match $self {
			Chunk::Container($c) => $body,
			Chunk::Object($c) => $body,
			Chunk::Vertices($c) => $body,
			Chunk::Faces($c) => $body,
			Chunk::FaceMaterial($c) => $body,
			Chunk::Smoothing($c) => $body,
			Chunk::MapCoords($c) => $body,
			Chunk::LocalAxes($c) => $body,
			Chunk::Visibility($c) => $body,
			Chunk::Light($c) => $body,
			Chunk::SpotLight($c) => $body,
			Chunk::Camera($c) => $body,
			Chunk::Material($c) => $body,
			Chunk::Color($c) => $body,
			Chunk::Scalar($c) => $body,
			Chunk::Version($c) => $body,
			Chunk::Flag($c) => $body,
			Chunk::Unknown($c) => $body,
		}
	}
}

macro_rules! accessors {
	($($name: ident => $variant: ident($ty: ty)),* $(,)?) => {
		impl Chunk {
			$(
				pub fn $name(&self) -> Option<&$ty> {
					match self {
						Chunk::$variant(c) => Some(c),
						_ => None,
					}
				}
			)*
		}
	}
}

accessors! {
	as_container => Container(Container),
	as_object => Object(Object),
	as_vertices => Vertices(VertexList),
	as_faces => Faces(FaceList),
	as_face_material => FaceMaterial(FaceMaterial),
	as_smoothing => Smoothing(SmoothingGroups),
	as_map_coords => MapCoords(MapCoords),
	as_local_axes => LocalAxes(LocalAxes),
	as_visibility => Visibility(Visibility),
	as_light => Light(Light),
	as_spot_light => SpotLight(SpotLight),
	as_camera => Camera(Camera),
	as_material => Material(Material),
	as_color => Color(Color),
	as_scalar => Scalar(Scalar),
	as_version => Version(Version),
	as_flag => Flag(Flag),
	as_unknown => Unknown(Unknown),
}

impl Chunk {
	pub fn tag(&self) -> u16 {
		dispatch!(self, c => c.tag())
	}

	/// Full encoded size. Zero for [`Unknown`] chunks, which are never written.
	pub fn size(&self) -> u64 {
		dispatch!(self, c => c.size())
	}

	/// Nested chunks, empty for plain leaves
	pub fn children(&self) -> &[Chunk] {
		match self {
			Chunk::Container(c) => &c.children,
			Chunk::Object(c) => &c.children,
			Chunk::Faces(c) => &c.children,
			Chunk::Light(c) => &c.children,
			Chunk::SpotLight(c) => &c.children,
			_ => &[],
		}
	}

	/// First nested chunk with the given tag
	pub fn first(&self, tag: u16) -> Option<&Chunk> {
		self.children().iter().find(|c| c.tag() == tag)
	}

	/// All nested chunks with the given tag, in file order
	pub fn by_tag(&self, tag: u16) -> Vec<&Chunk> {
		self.children().iter().filter(|c| c.tag() == tag).collect()
	}

	pub fn is_unknown(&self) -> bool {
		matches!(self, Chunk::Unknown(_))
	}

	#[cfg(feature = "import")]
	pub(crate) fn read<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		log::debug!("read chunk {:#06x} at {} (length {})", header.tag, header.start, header.length);
		dispatch!(self, c => c.read_payload(dec, header))
	}

	/// Encodes header and payload. [`Unknown`] chunks are dropped.
	#[cfg(feature = "export")]
	pub fn write<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		if self.is_unknown() {
			return Ok(());
		}

		w.write_header(self.tag(), self.size())?;
		dispatch!(self, c => c.write_payload(w))
	}
}

/// Combined encoded size of a list of chunks
pub fn children_size(children: &[Chunk]) -> u64 {
	children.iter().map(Chunk::size).sum()
}

#[cfg(feature = "export")]
pub(crate) fn write_children<W>(children: &[Chunk], w: &mut ChunkWriter<W>) -> Result<()>
where
	W: Write,
{
	for child in children {
		child.write(w)?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use ultraviolet::vec::Vec3;

	use crate::a3ds::tag;
	use super::*;

	#[test]
	fn test_unknown_has_no_size() {
		let mut editor = Container::new(tag::EDITOR);
		editor.push(Chunk::Unknown(Unknown::new(0x1234)));
		assert_eq!(0, editor.children[0].size());
		assert_eq!(6, editor.size());
	}

	#[test]
	fn test_size_follows_mutation() {
		let mut mesh = Container::new(tag::TRIMESH);
		mesh.push(Chunk::Vertices(VertexList::new(vec![Vec3::zero()])));
		assert_eq!(6 + 6 + 2 + 12, mesh.size());

		if let Chunk::Vertices(v) = &mut mesh.children[0] {
			v.vertices.push(Vec3::one());
		}
		assert_eq!(6 + 6 + 2 + 24, mesh.size());
	}

	#[test]
	fn test_lookup() {
		let mut editor = Container::new(tag::EDITOR);
		editor.push(Chunk::Version(Version::new(tag::MESH_VERSION, 3)));
		editor.push(Chunk::Material(Material::new("red")));
		editor.push(Chunk::Material(Material::new("blue")));

		let chunk = Chunk::Container(editor);
		assert_eq!(Some(3), chunk.first(tag::MESH_VERSION).and_then(Chunk::as_version).map(|v| v.value));
		let names: Vec<&str> = chunk.by_tag(tag::MATERIAL).into_iter()
			.filter_map(Chunk::as_material)
			.map(|m| m.name.as_str())
			.collect();
		assert_eq!(vec!["red", "blue"], names);
		assert!(chunk.first(tag::CAMERA).is_none());
	}
}
