//! 3D Studio (.3DS) chunk files.
//!
//! A .3DS file is a tree of chunks. Every chunk starts with a 16-bit tag and a
//! 32-bit length that covers the 6 byte header plus the payload, so readers
//! can skip anything they do not understand. Decoding builds a tree of
//! [`Chunk`]s; encoding walks the same tree and recomputes every length from
//! the current contents.
//!
//! A zero length aborts the whole decode, but a stream that ends early is not
//! an error: containers stop where the data stops and the partial tree is
//! returned. Unknown tags are skipped and are not written back.

#[cfg(feature = "import")]
pub mod attr;
pub mod camera;
pub mod chunk;
pub mod codec;
pub mod container;
pub mod light;
pub mod material;
pub mod mesh;
pub mod registry;
pub mod tag;
pub mod value;

use std::{
	fs::File,
	io::{
		self,
		BufReader,
		BufWriter,
		Read,
		Write
	},
	path::Path
};

use thiserror::Error;

pub use chunk::{
	Chunk,
	Record,
	Unknown
};
pub use container::Container;
#[cfg(feature = "import")]
pub use container::Decoder;
pub use registry::Registry;

#[cfg(feature = "import")]
use codec::Header;
#[cfg(feature = "export")]
use codec::ChunkWriter;

#[derive(Debug, Error)]
pub enum ChunkError {
	#[error("Record {tag:#06x} would be {count} elements long, more than a 16-bit count allows")]
	CountOverflow {
		tag: u16,
		count: usize,
	},
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Illegal length 0 for chunk {tag:#06x} at offset {offset}")]
	MalformedLength {
		tag: u16,
		offset: u64,
	},
	#[error("Chunks nested deeper than {0} levels")]
	NestingTooDeep(usize),
	#[error("Not a 3DS file (root tag {0:#06x})")]
	NotAChunkFile(u16),
	#[error("Chunk {tag:#06x} is {size} bytes, more than a 32-bit length allows")]
	RecordTooLarge {
		tag: u16,
		size: u64,
	},
	#[error("Chunk {tag:#06x} should end at {end} but decoding stopped at {position}")]
	TruncatedOrOverrunRecord {
		tag: u16,
		end: u64,
		position: u64,
	},
	#[error("Chunk {tag:#06x} holds {text:?}, which is not a single-byte string without NULs")]
	UnencodableString {
		tag: u16,
		text: String,
	},
}

pub type Result<T> = std::result::Result<T, ChunkError>;

/// Decoding options
#[derive(Clone, Debug, PartialEq)]
pub struct ReadCfg {
	/// Fail with [`ChunkError::TruncatedOrOverrunRecord`] when a record does
	/// not end exactly where its length says. When off, mismatches are only
	/// logged and decoding carries on from wherever the record stopped.
	pub strict_bounds: bool,
	/// Deepest chunk nesting accepted before giving up
	pub max_depth: usize,
}

impl Default for ReadCfg {
	fn default() -> Self {
		Self {
			strict_bounds: true,
			max_depth: 64,
		}
	}
}

/// Decodes a single record (and everything nested in it).
///
/// Returns `None` if the stream ends before a complete header. A top-level
/// unknown tag is returned as [`Chunk::Unknown`].
#[cfg(feature = "import")]
pub fn read_chunk<R>(reader: R, registry: &Registry, cfg: &ReadCfg) -> Result<Option<Chunk>>
where
	R: Read,
{
	Decoder::new(reader, registry, cfg).read_one(|_| None)
}

/// Encodes a single record, returning the number of bytes written
#[cfg(feature = "export")]
pub fn write_chunk<W>(writer: W, chunk: &Chunk) -> Result<u64>
where
	W: Write,
{
	let mut w = ChunkWriter::new(writer);
	chunk.write(&mut w)?;
	w.flush()?;

	Ok(w.written())
}

/// A whole .3DS file: the main chunk and everything below it
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
	root: Container,
}

impl Document {
	/// Main chunk holding an empty editor chunk
	pub fn new() -> Self {
		let mut root = Container::new(tag::MAIN);
		root.push(Chunk::Container(Container::new(tag::EDITOR)));

		Self {
			root: root,
		}
	}

	pub fn root(&self) -> &Container {
		&self.root
	}

	pub fn root_mut(&mut self) -> &mut Container {
		&mut self.root
	}

	/// The 3D data section, if present
	pub fn editor(&self) -> Option<&Container> {
		self.root.first(tag::EDITOR).and_then(Chunk::as_container)
	}

	pub fn editor_mut(&mut self) -> Option<&mut Container> {
		match self.root.first_mut(tag::EDITOR) {
			Some(Chunk::Container(c)) => Some(c),
			_ => None,
		}
	}

	/// Materials of the editor section, in file order
	pub fn materials(&self) -> Vec<&material::Material> {
		self.editor()
			.map(|e| e.children.iter().filter_map(Chunk::as_material).collect())
			.unwrap_or_default()
	}

	/// Named objects of the editor section, in file order
	pub fn objects(&self) -> Vec<&mesh::Object> {
		self.editor()
			.map(|e| e.children.iter().filter_map(Chunk::as_object).collect())
			.unwrap_or_default()
	}

	/// Encoded size of the whole file
	pub fn size(&self) -> u64 {
		self.root.size()
	}

	#[cfg(feature = "import")]
	pub fn open<P>(path: P) -> Result<Document>
	where
		P: AsRef<Path>,
	{
		Self::open_with(path, &Registry::standard(), &ReadCfg::default())
	}

	#[cfg(feature = "import")]
	pub fn open_with<P>(path: P, registry: &Registry, cfg: &ReadCfg) -> Result<Document>
	where
		P: AsRef<Path>,
	{
		let file = File::open(path.as_ref())?;
		log::debug!("reading {}", path.as_ref().display());

		Self::read_from(BufReader::new(file), registry, cfg)
	}

	/// Decodes a document, checking that it starts with the main chunk
	#[cfg(feature = "import")]
	pub fn read_from<R>(reader: R, registry: &Registry, cfg: &ReadCfg) -> Result<Document>
	where
		R: Read,
	{
		let mut dec = Decoder::new(reader, registry, cfg);

		let tag = dec.reader.read_u16()?;
		if dec.reader.at_eof() || tag != tag::MAIN {
			return Err(ChunkError::NotAChunkFile(tag));
		}

		let mut root = Container::new(tag);
		match Header::read(&mut dec.reader, tag)? {
			Some(header) => {
				root.read_payload(&mut dec, &header)?;
				dec.check_bounds(&header)?;
			},
			None => log::warn!("stream ended inside the main chunk header"),
		}

		log::debug!("read {} top level chunks, {} bytes", root.children.len(), dec.reader.position());
		Ok(Self {
			root: root,
		})
	}

	#[cfg(feature = "export")]
	pub fn save<P>(&self, path: P) -> Result<()>
	where
		P: AsRef<Path>,
	{
		let file = File::create(path.as_ref())?;
		log::debug!("writing {}", path.as_ref().display());

		self.write_to(BufWriter::new(file))?;
		Ok(())
	}

	/// Encodes the document, returning the number of bytes written
	#[cfg(feature = "export")]
	pub fn write_to<W>(&self, writer: W) -> Result<u64>
	where
		W: Write,
	{
		let mut w = ChunkWriter::new(writer);
		w.write_header(self.root.tag, self.root.size())?;
		self.root.write_payload(&mut w)?;
		w.flush()?;

		Ok(w.written())
	}
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(all(test, feature = "import", feature = "export"))]
mod tests {
	use ultraviolet::vec::{
		Vec2,
		Vec3
	};

	use super::{
		camera::Camera,
		light::Light,
		material::{
			MapKind,
			Material,
			TextureMap
		},
		mesh::{
			Face,
			FaceFlags,
			FaceList,
			FaceMaterial,
			LocalAxes,
			MapCoords,
			Object,
			SmoothingGroups,
			VertexList
		},
		value::{
			Color,
			Scalar,
			Version
		},
		*
	};

	fn scene() -> Document {
		let mut material = Material::new("Brick");
		material.diffuse = Color::byte(180, 60, 40);
		material.shininess = 20;
		material.set_map(MapKind::Texture1, Some(TextureMap::new("brick.png")));

		let mut faces = FaceList::new(vec![
			Face::new(0, 1, 2, FaceFlags::EDGE_AB | FaceFlags::EDGE_BC),
			Face::new(0, 2, 3, FaceFlags::EDGE_CA),
		]);
		faces.push(Chunk::FaceMaterial(FaceMaterial::new("Brick", vec![0, 1])));
		faces.push(Chunk::Smoothing(SmoothingGroups::new(vec![1, 1])));

		let mut trimesh = Container::new(tag::TRIMESH);
		trimesh.push(Chunk::Vertices(VertexList::new(vec![
			Vec3::new(0.0, 0.0, 0.0),
			Vec3::new(1.0, 0.0, 0.0),
			Vec3::new(1.0, 1.0, 0.0),
			Vec3::new(0.0, 1.0, 0.0),
		])));
		trimesh.push(Chunk::MapCoords(MapCoords::new(vec![Vec2::zero(), Vec2::unit_x(), Vec2::one(), Vec2::unit_y()])));
		trimesh.push(Chunk::LocalAxes(LocalAxes::default()));
		trimesh.push(Chunk::Faces(faces));

		let mut wall = Object::new("Wall");
		wall.push(Chunk::Container(trimesh));

		let mut light = Light::new(Vec3::new(10.0, 10.0, 10.0));
		light.push(Chunk::Color(Color::float(1.0, 1.0, 1.0)));
		let mut lamp = Object::new("Lamp");
		lamp.push(Chunk::Light(light));

		let mut eye = Object::new("Eye");
		eye.push(Chunk::Camera(Camera::new(Vec3::new(0.0, -10.0, 2.0), Vec3::zero(), 0.0, 35.0)));

		let mut doc = Document::new();
		doc.root_mut().children.insert(0, Chunk::Version(Version::new(tag::VERSION, 3)));
		let editor = doc.editor_mut().unwrap();
		editor.push(Chunk::Version(Version::new(tag::MESH_VERSION, 3)));
		editor.push(Chunk::Material(material));
		editor.push(Chunk::Scalar(Scalar::new(tag::MASTER_SCALE, 1.0)));
		editor.push(Chunk::Object(wall));
		editor.push(Chunk::Object(lamp));
		editor.push(Chunk::Object(eye));
		doc
	}

	fn read(data: &[u8]) -> Result<Document> {
		Document::read_from(data, &Registry::standard(), &ReadCfg::default())
	}

	#[test]
	fn test_new_document() {
		let doc = Document::new();
		assert_eq!(12, doc.size());

		let mut data = vec![];
		assert_eq!(12, doc.write_to(&mut data).unwrap());
		assert_eq!(vec![0x4D, 0x4D, 12, 0, 0, 0, 0x3D, 0x3D, 6, 0, 0, 0], data);
		assert_eq!(doc, read(&data).unwrap());
	}

	#[test]
	fn test_not_a_chunk_file() {
		let mut data = vec![];
		write_chunk(&mut data, &Chunk::Container(Container::new(tag::EDITOR))).unwrap();

		match read(&data) {
			Err(ChunkError::NotAChunkFile(tag)) => assert_eq!(tag::EDITOR, tag),
			other => panic!("unexpected result: {:?}", other),
		}
		assert!(matches!(read(&[]), Err(ChunkError::NotAChunkFile(0))));
	}

	#[test]
	fn test_editor_access() {
		let mut doc = Document::new();
		let editor = doc.editor_mut().unwrap();
		editor.push(Chunk::Version(Version::new(tag::MESH_VERSION, 3)));
		editor.push(Chunk::Vertices(VertexList::new(vec![Vec3::one()])));
		assert_eq!(6 + 6 + 10 + 20, doc.size());
		assert!(doc.materials().is_empty());
		assert!(doc.objects().is_empty());
	}

	#[test]
	fn test_truncated_header() {
		let doc = read(&[0x4D, 0x4D, 0x20]).unwrap();
		assert!(doc.root().children.is_empty());
	}

	#[test]
	fn test_scene_round_trip() {
		let doc = scene();

		let mut data = vec![];
		let written = doc.write_to(&mut data).unwrap();
		assert_eq!(doc.size(), written);
		assert_eq!(written, data.len() as u64);

		let decoded = read(&data).unwrap();
		assert_eq!(doc, decoded);
		assert_eq!(1, decoded.materials().len());
		assert_eq!("Brick", decoded.materials()[0].name);

		let names: Vec<&str> = decoded.objects().iter().map(|o| o.name.as_str()).collect();
		assert_eq!(vec!["Wall", "Lamp", "Eye"], names);

		let trimesh = decoded.objects()[0].meshes().next().and_then(Chunk::as_container).unwrap();
		let faces = trimesh.first(tag::FACE_LIST).and_then(Chunk::as_faces).unwrap();
		assert_eq!(2, faces.faces.len());
		assert_eq!(1, faces.smoothing().unwrap().group(1));
		assert_eq!(vec![0, 1], faces.materials().next().unwrap().faces);
	}

	#[test]
	fn test_sizes_follow_edits() {
		let mut doc = scene();
		let before = doc.size();

		let editor = doc.editor_mut().unwrap();
		let removed = editor.children.pop().unwrap();
		assert_eq!(before - removed.size(), doc.size());

		let mut data = vec![];
		doc.write_to(&mut data).unwrap();
		assert_eq!(doc.size(), data.len() as u64);
	}

	#[test]
	fn test_save_and_open() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("scene.3ds");

		let doc = scene();
		doc.save(&path).unwrap();
		assert_eq!(doc.size(), std::fs::metadata(&path).unwrap().len());
		assert_eq!(doc, Document::open(&path).unwrap());
	}

	#[test]
	fn test_open_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(Document::open(dir.path().join("missing.3ds")), Err(ChunkError::IO { .. })));
	}

	#[test]
	fn test_custom_registry() {
		let mut data = vec![];
		scene().write_to(&mut data).unwrap();

		let mut registry = Registry::standard();
		registry.unregister(tag::MATERIAL);
		let doc = Document::read_from(data.as_slice(), &registry, &ReadCfg::default()).unwrap();
		assert!(doc.materials().is_empty());
		assert_eq!(3, doc.objects().len());
	}
}
