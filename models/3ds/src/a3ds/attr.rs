//! Flat attribute scanning inside composite leaves.
//!
//! A material is not a container: its sub-chunks form a closed set that the
//! material interprets itself, one level deep, without going through the
//! registry. [`AttributeScanner`] walks such a block and leaves the meaning of
//! each attribute to the caller.

use std::io::Read;

use super::{
	codec::{
		ChunkReader,
		Header
	},
	ChunkError,
	Result
};

pub struct AttributeScanner {
	end: u64,
	strict: bool,
}

impl AttributeScanner {
	/// Scanner over the block that ends at the absolute offset `end`
	pub fn new(end: u64, strict: bool) -> Self {
		Self {
			end: end,
			strict: strict,
		}
	}

	/// Header of the next attribute, or `None` once the block or the stream is
	/// exhausted
	pub fn next<R>(&self, reader: &mut ChunkReader<R>) -> Result<Option<Header>>
	where
		R: Read,
	{
		if reader.at_eof() || reader.position() >= self.end {
			return Ok(None);
		}

		let tag = reader.read_u16()?;
		if reader.at_eof() {
			return Ok(None);
		}

		Header::read(reader, tag)
	}

	/// Moves past an attribute, skipping whatever the caller did not consume.
	/// Attributes the caller ignored are skipped whole.
	pub fn finish<R>(&self, reader: &mut ChunkReader<R>, attr: &Header) -> Result<()>
	where
		R: Read,
	{
		let position = reader.position();
		if position <= attr.end {
			return reader.skip_to(attr.end);
		}

		if self.strict && !reader.at_eof() {
			return Err(ChunkError::TruncatedOrOverrunRecord {
				tag: attr.tag,
				end: attr.end,
				position: position,
			});
		}

		log::warn!("attribute {:#06x} declared end {} but the stream is at {}", attr.tag, attr.end,
			position);
		Ok(())
	}
}
