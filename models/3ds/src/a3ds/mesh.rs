use bitflags::bitflags;

use std::io::{
	Read,
	Write
};

use ultraviolet::vec::{
	Vec2,
	Vec3
};

#[cfg(feature = "import")]
use super::{
	chunk::skip_rest,
	container::Decoder
};
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
		cstr_size,
		Header,
		BYTE_SIZE,
		DWORD_SIZE,
		VEC2_SIZE,
		VEC3_SIZE,
		WORD_SIZE
	},
	tag,
	Result
};

bitflags! {
	/// Edge visibility and texture wrapping of a face
	pub struct FaceFlags: u16 {
		const EDGE_CA = 1;
		const EDGE_BC = 1 << 1;
		const EDGE_AB = 1 << 2;
		const WRAP_U = 1 << 3;
		const WRAP_V = 1 << 4;
	}
}

/// Named object. Its children are meshes, lights or cameras.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
	pub name: String,
	pub children: Vec<Chunk>,
}

impl Object {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			children: vec![],
		}
	}

	pub fn push(&mut self, chunk: Chunk) {
		self.children.push(chunk);
	}

	/// Triangle meshes held by this object
	pub fn meshes(&self) -> impl Iterator<Item = &Chunk> {
		self.children.iter().filter(|c| c.tag() == tag::TRIMESH)
	}
}

impl Record for Object {
	fn tag(&self) -> u16 {
		tag::OBJECT
	}

	fn payload_size(&self) -> u64 {
		cstr_size(&self.name) + children_size(&self.children)
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		self.name = dec.reader.read_cstr()?;
		self.children = dec.read_children(header, |_| None)?;
		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_cstr(tag::OBJECT, &self.name)?;
		write_children(&self.children, w)
	}
}

/// Mesh vertex positions
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexList {
	pub vertices: Vec<Vec3>,
}

impl VertexList {
	pub fn new(vertices: Vec<Vec3>) -> Self {
		Self {
			vertices: vertices,
		}
	}
}

impl Record for VertexList {
	fn tag(&self) -> u16 {
		tag::VERTEX_LIST
	}

	fn payload_size(&self) -> u64 {
		WORD_SIZE + self.vertices.len() as u64 * VEC3_SIZE
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, _: &Header) -> Result<()>
	where
		R: Read,
	{
		let count = dec.reader.read_u16()? as usize;
		self.vertices = Vec::with_capacity(count);
		for _ in 0..count {
			self.vertices.push(dec.reader.read_vec3()?);
		}

		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_count(tag::VERTEX_LIST, self.vertices.len())?;
		for v in self.vertices.iter() {
			w.write_vec3(*v)?;
		}

		Ok(())
	}
}

/// Triangle referencing three entries of the vertex list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
	pub vertices: [u16; 3],
	/// Raw flag word, kept verbatim so unknown bits survive a round trip
	pub info: u16,
}

impl Face {
	pub fn new(a: u16, b: u16, c: u16, flags: FaceFlags) -> Self {
		Self {
			vertices: [a, b, c],
			info: flags.bits(),
		}
	}

	pub fn flags(&self) -> FaceFlags {
		FaceFlags::from_bits_truncate(self.info)
	}
}

/// Mesh faces, optionally followed by material groups and smoothing groups
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceList {
	pub faces: Vec<Face>,
	pub children: Vec<Chunk>,
}

impl FaceList {
	pub fn new(faces: Vec<Face>) -> Self {
		Self {
			faces: faces,
			children: vec![],
		}
	}

	pub fn push(&mut self, chunk: Chunk) {
		self.children.push(chunk);
	}

	/// Material assignments, in file order
	pub fn materials(&self) -> impl Iterator<Item = &FaceMaterial> {
		self.children.iter().filter_map(Chunk::as_face_material)
	}

	pub fn smoothing(&self) -> Option<&SmoothingGroups> {
		self.children.iter().find_map(Chunk::as_smoothing)
	}
}

impl Record for FaceList {
	fn tag(&self) -> u16 {
		tag::FACE_LIST
	}

	fn payload_size(&self) -> u64 {
		WORD_SIZE + self.faces.len() as u64 * 4 * WORD_SIZE + children_size(&self.children)
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		let count = dec.reader.read_u16()? as usize;
		self.faces = Vec::with_capacity(count);
		for _ in 0..count {
			let a = dec.reader.read_u16()?;
			let b = dec.reader.read_u16()?;
			let c = dec.reader.read_u16()?;
			let info = dec.reader.read_u16()?;
			self.faces.push(Face {
				vertices: [a, b, c],
				info: info,
			});
		}

		// Both of these only make sense relative to this face list
		let face_count = self.faces.len();
		self.children = dec.read_children(header, |t| match t {
			tag::FACE_MATERIAL => Some(Chunk::FaceMaterial(FaceMaterial::default())),
			tag::SMOOTHING => Some(Chunk::Smoothing(SmoothingGroups::with_len(face_count))),
			_ => None,
		})?;

		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_count(tag::FACE_LIST, self.faces.len())?;
		for f in self.faces.iter() {
			for v in f.vertices {
				w.write_u16(v)?;
			}
			w.write_u16(f.info)?;
		}

		write_children(&self.children, w)
	}
}

/// Faces that use the named material
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceMaterial {
	pub name: String,
	/// Indices into the parent face list
	pub faces: Vec<u16>,
}

impl FaceMaterial {
	pub fn new(name: &str, faces: Vec<u16>) -> Self {
		Self {
			name: name.to_string(),
			faces: faces,
		}
	}
}

impl Record for FaceMaterial {
	fn tag(&self) -> u16 {
		tag::FACE_MATERIAL
	}

	fn payload_size(&self) -> u64 {
		cstr_size(&self.name) + WORD_SIZE + self.faces.len() as u64 * WORD_SIZE
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, _: &Header) -> Result<()>
	where
		R: Read,
	{
		self.name = dec.reader.read_cstr()?;
		let count = dec.reader.read_u16()? as usize;
		self.faces = Vec::with_capacity(count);
		for _ in 0..count {
			self.faces.push(dec.reader.read_u16()?);
		}

		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_cstr(tag::FACE_MATERIAL, &self.name)?;
		w.write_count(tag::FACE_MATERIAL, self.faces.len())?;
		for f in self.faces.iter() {
			w.write_u16(*f)?;
		}

		Ok(())
	}
}

/// One smoothing group bit mask per face of the parent face list.
///
/// There is no count on the wire. Decoding reads one group per parent face,
/// stopping early if the record itself is shorter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SmoothingGroups {
	pub groups: Vec<u32>,
}

impl SmoothingGroups {
	pub fn new(groups: Vec<u32>) -> Self {
		Self {
			groups: groups,
		}
	}

	/// Zeroed groups for `faces` faces
	pub fn with_len(faces: usize) -> Self {
		Self {
			groups: vec![0; faces],
		}
	}

	pub fn group(&self, face: usize) -> u32 {
		self.groups.get(face).copied().unwrap_or(0)
	}
}

impl Record for SmoothingGroups {
	fn tag(&self) -> u16 {
		tag::SMOOTHING
	}

	fn payload_size(&self) -> u64 {
		self.groups.len() as u64 * DWORD_SIZE
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		let stored = (header.payload_len() / DWORD_SIZE) as usize;
		if stored != self.groups.len() {
			log::debug!("smoothing chunk holds {} groups for {} faces", stored, self.groups.len());
		}

		self.groups.truncate(stored);
		for g in self.groups.iter_mut() {
			*g = dec.reader.read_u32()?;
		}

		skip_rest(&mut dec.reader, header)
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		for g in self.groups.iter() {
			w.write_u32(*g)?;
		}

		Ok(())
	}
}

/// Per-vertex texture coordinates
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapCoords {
	pub uvs: Vec<Vec2>,
}

impl MapCoords {
	pub fn new(uvs: Vec<Vec2>) -> Self {
		Self {
			uvs: uvs,
		}
	}
}

impl Record for MapCoords {
	fn tag(&self) -> u16 {
		tag::MAP_COORDS
	}

	fn payload_size(&self) -> u64 {
		WORD_SIZE + self.uvs.len() as u64 * VEC2_SIZE
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, _: &Header) -> Result<()>
	where
		R: Read,
	{
		let count = dec.reader.read_u16()? as usize;
		self.uvs = Vec::with_capacity(count);
		for _ in 0..count {
			self.uvs.push(dec.reader.read_vec2()?);
		}

		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_count(tag::MAP_COORDS, self.uvs.len())?;
		for uv in self.uvs.iter() {
			w.write_vec2(*uv)?;
		}

		Ok(())
	}
}

/// Local coordinate system of a mesh: three axis vectors and the origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalAxes {
	pub axes: [Vec3; 3],
	pub origin: Vec3,
}

impl Default for LocalAxes {
	fn default() -> Self {
		Self {
			axes: [Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z()],
			origin: Vec3::zero(),
		}
	}
}

impl Record for LocalAxes {
	fn tag(&self) -> u16 {
		tag::LOCAL_AXES
	}

	fn payload_size(&self) -> u64 {
		4 * VEC3_SIZE
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, _: &Header) -> Result<()>
	where
		R: Read,
	{
		for axis in self.axes.iter_mut() {
			*axis = dec.reader.read_vec3()?;
		}
		self.origin = dec.reader.read_vec3()?;

		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		for axis in self.axes {
			w.write_vec3(axis)?;
		}
		w.write_vec3(self.origin)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility {
	pub visible: bool,
}

impl Default for Visibility {
	fn default() -> Self {
		Self {
			visible: true,
		}
	}
}

impl Record for Visibility {
	fn tag(&self) -> u16 {
		tag::VISIBLE
	}

	fn payload_size(&self) -> u64 {
		BYTE_SIZE
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, _: &Header) -> Result<()>
	where
		R: Read,
	{
		self.visible = dec.reader.read_bool()?;
		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_bool(self.visible)
	}
}

#[cfg(all(test, feature = "import", feature = "export"))]
mod tests {
	use crate::a3ds::{
		codec::ChunkWriter,
		read_chunk,
		registry::Registry,
		write_chunk,
		ChunkError,
		ReadCfg
	};
	use super::*;

	fn encode(chunk: &Chunk) -> Vec<u8> {
		let mut out = vec![];
		write_chunk(&mut out, chunk).unwrap();
		out
	}

	fn decode(data: &[u8]) -> Chunk {
		read_chunk(data, &Registry::standard(), &ReadCfg::default()).unwrap().unwrap()
	}

	fn quad() -> FaceList {
		let edges = FaceFlags::EDGE_AB | FaceFlags::EDGE_BC;
		let mut faces = FaceList::new(vec![Face::new(0, 1, 2, edges), Face::new(2, 3, 0, edges)]);
		faces.push(Chunk::FaceMaterial(FaceMaterial::new("brick", vec![0, 1])));
		faces.push(Chunk::Smoothing(SmoothingGroups::new(vec![1, 1])));
		faces
	}

	#[test]
	fn test_vertex_list_size() {
		let vertices = VertexList::new(vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]);
		assert_eq!(32, vertices.size());

		let data = encode(&Chunk::Vertices(vertices.clone()));
		assert_eq!(32, data.len());
		assert_eq!(&[0x10, 0x41, 32, 0, 0, 0, 2, 0], &data[..8]);
		assert_eq!(Chunk::Vertices(vertices), decode(&data));
	}

	#[test]
	fn test_face_list() {
		let faces = quad();
		assert_eq!(6 + 2 + 2 * 8 + (6 + 6 + 2 + 4) + (6 + 8), faces.size());

		let chunk = Chunk::Faces(faces);
		let data = encode(&chunk);
		assert_eq!(chunk.size(), data.len() as u64);

		let decoded = decode(&data);
		assert_eq!(chunk, decoded);

		let faces = decoded.as_faces().unwrap();
		assert_eq!(FaceFlags::EDGE_AB | FaceFlags::EDGE_BC, faces.faces[1].flags());
		assert_eq!(vec!["brick"], faces.materials().map(|m| m.name.as_str()).collect::<Vec<_>>());
		assert_eq!(1, faces.smoothing().unwrap().group(1));
	}

	#[test]
	fn test_smoothing_sized_by_parent() {
		// Smoothing data for three faces under a face list that only has two;
		// the extra group is skipped
		let mut w = ChunkWriter::new(vec![]);
		w.write_header(tag::FACE_LIST, 6 + 2 + 2 * 8 + 6 + 3 * 4).unwrap();
		w.write_u16(2).unwrap();
		for _ in 0..2 {
			for v in [0, 1, 2, 0] {
				w.write_u16(v).unwrap();
			}
		}
		w.write_header(tag::SMOOTHING, 6 + 3 * 4).unwrap();
		for g in [1, 2, 4] {
			w.write_u32(g).unwrap();
		}
		let data = w.into_inner();

		let chunk = decode(&data);
		let faces = chunk.as_faces().unwrap();
		assert_eq!(vec![1, 2], faces.smoothing().unwrap().groups);
	}

	#[test]
	fn test_short_smoothing_keeps_its_bounds() {
		let mut faces = FaceList::new(vec![Face::new(0, 1, 2, FaceFlags::empty())]);
		faces.push(Chunk::Smoothing(SmoothingGroups::default()));
		faces.push(Chunk::FaceMaterial(FaceMaterial::new("glass", vec![0])));

		let chunk = Chunk::Faces(faces);
		let data = encode(&chunk);
		assert_eq!(chunk.size(), data.len() as u64);

		let decoded = decode(&data);
		assert_eq!(chunk, decoded);
		assert!(decoded.as_faces().unwrap().smoothing().unwrap().groups.is_empty());

		// Same chunk as the last record of the stream
		let mut faces = FaceList::new(vec![Face::new(0, 1, 2, FaceFlags::empty()); 2]);
		faces.push(Chunk::Smoothing(SmoothingGroups::new(vec![8])));
		let chunk = Chunk::Faces(faces);
		assert_eq!(chunk, decode(&encode(&chunk)));
	}

	#[test]
	fn test_latin1_name_before_sibling() {
		let mut editor = crate::a3ds::Container::new(tag::EDITOR);
		editor.push(Chunk::Object(Object::new("Café")));
		editor.push(Chunk::Object(Object::new("Señal")));

		let chunk = Chunk::Container(editor);
		let data = encode(&chunk);
		assert_eq!(chunk.size(), data.len() as u64);
		assert_eq!(&[b'C', b'a', b'f', 0xE9, 0], &data[12..17]);

		let decoded = decode(&data);
		assert_eq!(chunk, decoded);
		assert_eq!("Señal", decoded.children()[1].as_object().unwrap().name);
	}

	#[test]
	fn test_unencodable_names_are_rejected() {
		for name in ["a\0b", "Звезда"] {
			let mut out = vec![];
			match write_chunk(&mut out, &Chunk::Object(Object::new(name))) {
				Err(ChunkError::UnencodableString { tag, .. }) => assert_eq!(tag::OBJECT, tag),
				other => panic!("unexpected result: {:?}", other),
			}
		}
	}

	#[test]
	fn test_smoothing_outside_face_list_is_dropped() {
		let mut mesh = encode(&Chunk::Smoothing(SmoothingGroups::new(vec![1, 2])));
		mesh.extend(encode(&Chunk::Visibility(Visibility { visible: false })));

		let mut w = ChunkWriter::new(vec![]);
		w.write_header(tag::TRIMESH, 6 + mesh.len() as u64).unwrap();
		let mut data = w.into_inner();
		data.extend(mesh);

		let chunk = decode(&data);
		assert_eq!(1, chunk.children().len());
		assert_eq!(Some(&Visibility { visible: false }), chunk.children()[0].as_visibility());
	}

	#[test]
	fn test_object_round_trip() {
		let mut mesh = crate::a3ds::Container::new(tag::TRIMESH);
		mesh.push(Chunk::Vertices(VertexList::new(vec![Vec3::zero(), Vec3::unit_x(), Vec3::unit_y(),
			Vec3::one()])));
		mesh.push(Chunk::MapCoords(MapCoords::new(vec![Vec2::zero(), Vec2::unit_x(), Vec2::unit_y(),
			Vec2::one()])));
		mesh.push(Chunk::LocalAxes(LocalAxes::default()));
		mesh.push(Chunk::Visibility(Visibility::default()));
		mesh.push(Chunk::Faces(quad()));

		let mut object = Object::new("Box01");
		object.push(Chunk::Container(mesh));
		assert_eq!(1, object.meshes().count());

		let chunk = Chunk::Object(object);
		let data = encode(&chunk);
		assert_eq!(chunk.size(), data.len() as u64);
		assert_eq!(chunk, decode(&data));
	}
}
