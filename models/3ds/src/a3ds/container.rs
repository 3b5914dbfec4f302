use std::io::{
	Read,
	Write
};

#[cfg(feature = "import")]
use super::codec::ChunkReader;
#[cfg(feature = "export")]
use super::codec::ChunkWriter;
#[cfg(feature = "import")]
use super::{
	registry::Registry,
	ChunkError,
	ReadCfg
};

use super::{
	chunk::{
		children_size,
		Chunk,
		Record
	},
	codec::Header,
	Result
};

/// Branching record: a tag and an ordered list of children, nothing else.
///
/// Used for the main, editor and triangle mesh chunks.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
	pub tag: u16,
	pub children: Vec<Chunk>,
}

impl Container {
	pub fn new(tag: u16) -> Self {
		Self {
			tag: tag,
			children: vec![],
		}
	}

	pub fn with_children(tag: u16, children: Vec<Chunk>) -> Self {
		Self {
			tag: tag,
			children: children,
		}
	}

	pub fn push(&mut self, chunk: Chunk) {
		self.children.push(chunk);
	}

	/// First child with the given tag
	pub fn first(&self, tag: u16) -> Option<&Chunk> {
		self.children.iter().find(|c| c.tag() == tag)
	}

	pub fn first_mut(&mut self, tag: u16) -> Option<&mut Chunk> {
		self.children.iter_mut().find(|c| c.tag() == tag)
	}

	/// All children with the given tag, in file order
	pub fn by_tag(&self, tag: u16) -> Vec<&Chunk> {
		self.children.iter().filter(|c| c.tag() == tag).collect()
	}
}

impl Record for Container {
	fn tag(&self) -> u16 {
		self.tag
	}

	fn payload_size(&self) -> u64 {
		children_size(&self.children)
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		self.children = dec.read_children(header, |_| None)?;
		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		super::chunk::write_children(&self.children, w)
	}
}

/// Decoding state shared by every record while a tree is read
#[cfg(feature = "import")]
pub struct Decoder<'a, R> {
	pub reader: ChunkReader<R>,
	pub registry: &'a Registry,
	pub cfg: &'a ReadCfg,
	depth: usize,
}

#[cfg(feature = "import")]
impl<'a, R> Decoder<'a, R>
where
	R: Read,
{
	pub fn new(reader: R, registry: &'a Registry, cfg: &'a ReadCfg) -> Self {
		Self {
			reader: ChunkReader::new(reader),
			registry: registry,
			cfg: cfg,
			depth: 0,
		}
	}

	/// Reads one complete record.
	///
	/// `resolve` lets the enclosing record claim tags whose meaning depends on
	/// it; anything it returns `None` for goes through the registry. Returns
	/// `None` if the stream ends before a full header could be read.
	pub fn read_one<F>(&mut self, resolve: F) -> Result<Option<Chunk>>
	where
		F: FnOnce(u16) -> Option<Chunk>,
	{
		let tag = self.reader.read_u16()?;
		if self.reader.at_eof() {
			return Ok(None);
		}

		let header = match Header::read(&mut self.reader, tag)? {
			Some(header) => header,
			None => return Ok(None),
		};

		let registry = self.registry;
		let mut chunk = resolve(tag).unwrap_or_else(|| registry.resolve(tag));
		chunk.read(self, &header)?;
		self.check_bounds(&header)?;

		Ok(Some(chunk))
	}

	/// Reads records until the end of `parent` or of the stream.
	///
	/// Unknown records are consumed and dropped. Running out of input is not
	/// an error: whatever was read so far is returned.
	pub fn read_children<F>(&mut self, parent: &Header, mut resolve: F) -> Result<Vec<Chunk>>
	where
		F: FnMut(u16) -> Option<Chunk>,
	{
		if self.depth >= self.cfg.max_depth {
			return Err(ChunkError::NestingTooDeep(self.cfg.max_depth));
		}
		self.depth += 1;

		let mut children = vec![];
		while !self.reader.at_eof() && self.reader.position() < parent.end {
			match self.read_one(&mut resolve)? {
				Some(Chunk::Unknown(_)) => (),
				Some(chunk) => children.push(chunk),
				None => break,
			}
		}

		if self.reader.at_eof() && self.reader.position() < parent.end {
			log::warn!("stream ended inside chunk {:#06x} at {}, expected {} more bytes", parent.tag,
				self.reader.position(), parent.end - self.reader.position());
		}

		self.depth -= 1;
		Ok(children)
	}

	/// Verifies that a record consumed exactly its declared length
	pub fn check_bounds(&self, header: &Header) -> Result<()> {
		let position = self.reader.position();
		if self.reader.at_eof() || position == header.end {
			return Ok(());
		}

		if self.cfg.strict_bounds {
			return Err(ChunkError::TruncatedOrOverrunRecord {
				tag: header.tag,
				end: header.end,
				position: position,
			});
		}

		log::warn!("chunk {:#06x} declared end {} but the stream is at {}", header.tag, header.end,
			position);
		Ok(())
	}
}
