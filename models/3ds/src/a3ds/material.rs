//! Material definitions.
//!
//! A material is a leaf whose payload is a flat run of attribute sub-chunks
//! from a fixed set. Colours and percentages are wrapped one level deeper in
//! a generic colour or percentage chunk; texture maps are attribute blocks of
//! their own.

use bitflags::bitflags;

use std::io::{
	Read,
	Write
};

#[cfg(feature = "import")]
use super::{
	attr::AttributeScanner,
	codec::ChunkReader,
	container::Decoder
};
#[cfg(feature = "export")]
use super::codec::ChunkWriter;

use super::{
	chunk::Record,
	codec::{
		cstr_size,
		Header,
		FLOAT_SIZE,
		HEADER_SIZE,
		WORD_SIZE
	},
	tag,
	value::Color,
	Result
};

/// Size of an attribute wrapping a single percentage chunk
const PERCENT_ATTR_SIZE: u64 = 2 * HEADER_SIZE + WORD_SIZE;

bitflags! {
	/// Texture map tiling options
	pub struct MapOptions: u16 {
		const DECAL = 1;
		const MIRROR = 1 << 1;
		const NEGATIVE = 1 << 3;
		const NO_TILE = 1 << 4;
		const SUMMED_AREA = 1 << 5;
		const ALPHA_SOURCE = 1 << 6;
		const TINT = 1 << 7;
		const IGNORE_ALPHA = 1 << 8;
		const RGB_TINT = 1 << 9;
	}
}

/// Shading model ("basic" shader parameters).
///
/// Values compare by their wire value, so `Other(2)` equals `Gouraud`.
#[derive(Clone, Copy, Debug)]
pub enum Shading {
	Wireframe,
	Flat,
	Gouraud,
	Phong,
	Metal,
	Other(u16),
}

impl From<u16> for Shading {
	fn from(v: u16) -> Self {
		match v {
			0 => Shading::Wireframe,
			1 => Shading::Flat,
			2 => Shading::Gouraud,
			3 => Shading::Phong,
			4 => Shading::Metal,
			_ => Shading::Other(v),
		}
	}
}

impl From<Shading> for u16 {
	fn from(s: Shading) -> Self {
		match s {
			Shading::Wireframe => 0,
			Shading::Flat => 1,
			Shading::Gouraud => 2,
			Shading::Phong => 3,
			Shading::Metal => 4,
			Shading::Other(v) => v,
		}
	}
}

impl PartialEq for Shading {
	fn eq(&self, other: &Self) -> bool {
		u16::from(*self) == u16::from(*other)
	}
}

impl Eq for Shading {}

/// Texture map slots of a material, in the order they are written
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapKind {
	Texture1,
	Texture2,
	Opacity,
	Bump,
	Specular,
	Shininess,
	Illumination,
	Reflection,
}

impl MapKind {
	pub const ALL: [MapKind; 8] = [MapKind::Texture1, MapKind::Texture2, MapKind::Opacity,
		MapKind::Bump, MapKind::Specular, MapKind::Shininess, MapKind::Illumination,
		MapKind::Reflection];

	pub fn tag(self) -> u16 {
		match self {
			MapKind::Texture1 => tag::MAT_TEXTURE1_MAP,
			MapKind::Texture2 => tag::MAT_TEXTURE2_MAP,
			MapKind::Opacity => tag::MAT_OPACITY_MAP,
			MapKind::Bump => tag::MAT_BUMP_MAP,
			MapKind::Specular => tag::MAT_SPECULAR_MAP,
			MapKind::Shininess => tag::MAT_SHININESS_MAP,
			MapKind::Illumination => tag::MAT_ILLUMINATION_MAP,
			MapKind::Reflection => tag::MAT_REFLECTION_MAP,
		}
	}

	pub fn from_tag(tag: u16) -> Option<MapKind> {
		MapKind::ALL.iter().copied().find(|k| k.tag() == tag)
	}

	fn index(self) -> usize {
		self as usize
	}
}

/// Bitmap reference of a material slot
#[derive(Clone, Debug, PartialEq)]
pub struct TextureMap {
	/// Blend amount in percent
	pub amount: u16,
	pub path: String,
	/// Raw option word, see [`TextureMap::options`]
	pub tiling: u16,
	pub blur: f32,
	pub u_scale: f32,
	pub v_scale: f32,
	pub u_offset: f32,
	pub v_offset: f32,
	/// Degrees
	pub rotation: f32,
}

impl TextureMap {
	pub fn new(path: &str) -> Self {
		Self {
			path: path.to_string(),
			..Self::default()
		}
	}

	pub fn options(&self) -> MapOptions {
		MapOptions::from_bits_truncate(self.tiling)
	}

	/// Bytes of this map block, header included
	fn size(&self) -> u64 {
		HEADER_SIZE
			+ PERCENT_ATTR_SIZE
			+ HEADER_SIZE + cstr_size(&self.path)
			+ HEADER_SIZE + WORD_SIZE
			+ 6 * (HEADER_SIZE + FLOAT_SIZE)
	}

	#[cfg(feature = "import")]
	fn read<R>(&mut self, reader: &mut ChunkReader<R>, block: &Header, strict: bool) -> Result<()>
	where
		R: Read,
	{
		let scan = AttributeScanner::new(block.end, strict);
		while let Some(attr) = scan.next(reader)? {
			log::trace!("map {:#06x} attribute {:#06x} (length {})", block.tag, attr.tag, attr.length);
			match attr.tag {
				tag::PERCENT_INT => self.amount = reader.read_u16()?,
				tag::MAP_PATH => self.path = reader.read_cstr()?,
				tag::MAP_OPTIONS => self.tiling = reader.read_u16()?,
				tag::MAP_BLUR => self.blur = reader.read_f32()?,
				tag::MAP_U_SCALE => self.u_scale = reader.read_f32()?,
				tag::MAP_V_SCALE => self.v_scale = reader.read_f32()?,
				tag::MAP_U_OFFSET => self.u_offset = reader.read_f32()?,
				tag::MAP_V_OFFSET => self.v_offset = reader.read_f32()?,
				tag::MAP_ROTATION => self.rotation = reader.read_f32()?,
				_ => (),
			}
			scan.finish(reader, &attr)?;
		}

		Ok(())
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, kind: MapKind, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_header(kind.tag(), self.size())?;
		w.write_header(tag::PERCENT_INT, HEADER_SIZE + WORD_SIZE)?;
		w.write_u16(self.amount)?;
		w.write_header(tag::MAP_PATH, HEADER_SIZE + cstr_size(&self.path))?;
		w.write_cstr(tag::MAP_PATH, &self.path)?;
		w.write_header(tag::MAP_OPTIONS, HEADER_SIZE + WORD_SIZE)?;
		w.write_u16(self.tiling)?;

		for (t, v) in [(tag::MAP_BLUR, self.blur), (tag::MAP_U_SCALE, self.u_scale),
			(tag::MAP_V_SCALE, self.v_scale), (tag::MAP_U_OFFSET, self.u_offset),
			(tag::MAP_V_OFFSET, self.v_offset), (tag::MAP_ROTATION, self.rotation)] {
			w.write_header(t, HEADER_SIZE + FLOAT_SIZE)?;
			w.write_f32(v)?;
		}

		Ok(())
	}
}

impl Default for TextureMap {
	fn default() -> Self {
		Self {
			amount: 100,
			path: String::new(),
			tiling: 0,
			blur: 0.0,
			u_scale: 1.0,
			v_scale: 1.0,
			u_offset: 0.0,
			v_offset: 0.0,
			rotation: 0.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
	pub name: String,
	pub ambient: Color,
	pub diffuse: Color,
	pub specular: Color,
	/// Glossiness, in percent
	pub shininess: u16,
	/// Specular level, in percent
	pub shin_strength: u16,
	/// 0 is fully opaque
	pub transparency: u16,
	pub trans_falloff: u16,
	pub reflect_blur: u16,
	pub self_illum: u16,
	pub two_sided: bool,
	pub shading: Shading,
	pub wire_thickness: f32,
	maps: [Option<TextureMap>; 8],
}

impl Material {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			..Self::default()
		}
	}

	pub fn map(&self, kind: MapKind) -> Option<&TextureMap> {
		self.maps[kind.index()].as_ref()
	}

	/// Installs or clears the map of a slot, returning the previous one
	pub fn set_map(&mut self, kind: MapKind, map: Option<TextureMap>) -> Option<TextureMap> {
		std::mem::replace(&mut self.maps[kind.index()], map)
	}

	/// Occupied map slots, in write order
	pub fn maps(&self) -> impl Iterator<Item = (MapKind, &TextureMap)> {
		MapKind::ALL.iter().copied().zip(self.maps.iter())
			.filter_map(|(k, m)| m.as_ref().map(|m| (k, m)))
	}

	/// Opacity derived from the transparency.
	///
	/// Transparency is stored in a percentage chunk like the other material
	/// percentages, so it runs from 0 (opaque) to 100. Larger values are
	/// treated as 100.
	pub fn opacity(&self) -> f32 {
		1.0 - f32::from(self.transparency.min(100)) / 100.0
	}

	fn percentages(&self) -> [(u16, u16); 5] {
		[
			(tag::MAT_SHININESS, self.shininess),
			(tag::MAT_SHIN_STRENGTH, self.shin_strength),
			(tag::MAT_TRANSPARENCY, self.transparency),
			(tag::MAT_TRANS_FALLOFF, self.trans_falloff),
			(tag::MAT_REFLECT_BLUR, self.reflect_blur),
		]
	}
}

impl Default for Material {
	fn default() -> Self {
		Self {
			name: String::new(),
			ambient: Color::default(),
			diffuse: Color::default(),
			specular: Color::default(),
			shininess: 0,
			shin_strength: 0,
			transparency: 0,
			trans_falloff: 0,
			reflect_blur: 0,
			self_illum: 0,
			two_sided: false,
			shading: Shading::Gouraud,
			wire_thickness: 1.0,
			maps: Default::default(),
		}
	}
}

/// First colour chunk inside a colour attribute. Later ones, usually the
/// gamma corrected twin, are skipped.
#[cfg(feature = "import")]
fn read_color<R>(reader: &mut ChunkReader<R>, attr: &Header, strict: bool) -> Result<Color>
where
	R: Read,
{
	let scan = AttributeScanner::new(attr.end, strict);
	let mut color = None;

	while let Some(sub) = scan.next(reader)? {
		if color.is_none() {
			if let Some(mut c) = Color::for_tag(sub.tag) {
				c.read_fields(reader)?;
				color = Some(c);
			}
		}
		scan.finish(reader, &sub)?;
	}

	Ok(color.unwrap_or_default())
}

/// Value of the percentage chunk inside a percentage attribute
#[cfg(feature = "import")]
fn read_percent<R>(reader: &mut ChunkReader<R>, attr: &Header, strict: bool) -> Result<u16>
where
	R: Read,
{
	let scan = AttributeScanner::new(attr.end, strict);
	let mut value = 0;

	while let Some(sub) = scan.next(reader)? {
		if sub.tag == tag::PERCENT_INT {
			value = reader.read_u16()?;
		}
		scan.finish(reader, &sub)?;
	}

	Ok(value)
}

#[cfg(feature = "export")]
fn write_color<W>(w: &mut ChunkWriter<W>, t: u16, color: &Color) -> Result<()>
where
	W: Write,
{
	w.write_header(t, HEADER_SIZE + color.size())?;
	w.write_header(color.tag(), color.size())?;
	color.write_payload(w)
}

#[cfg(feature = "export")]
fn write_percent<W>(w: &mut ChunkWriter<W>, t: u16, value: u16) -> Result<()>
where
	W: Write,
{
	w.write_header(t, PERCENT_ATTR_SIZE)?;
	w.write_header(tag::PERCENT_INT, HEADER_SIZE + WORD_SIZE)?;
	w.write_u16(value)
}

impl Record for Material {
	fn tag(&self) -> u16 {
		tag::MATERIAL
	}

	fn payload_size(&self) -> u64 {
		let mut size = HEADER_SIZE + cstr_size(&self.name);
		for c in [&self.ambient, &self.diffuse, &self.specular] {
			size += HEADER_SIZE + c.size();
		}
		size += 6 * PERCENT_ATTR_SIZE;
		if self.two_sided {
			size += HEADER_SIZE;
		}
		size += HEADER_SIZE + WORD_SIZE;
		size += HEADER_SIZE + FLOAT_SIZE;

		size + self.maps().map(|(_, m)| m.size()).sum::<u64>()
	}

	#[cfg(feature = "import")]
	fn read_payload<R>(&mut self, dec: &mut Decoder<'_, R>, header: &Header) -> Result<()>
	where
		R: Read,
	{
		let strict = dec.cfg.strict_bounds;
		let r = &mut dec.reader;
		let scan = AttributeScanner::new(header.end, strict);

		while let Some(attr) = scan.next(r)? {
			log::trace!("material attribute {:#06x} (length {})", attr.tag, attr.length);
			match attr.tag {
				tag::MAT_NAME => self.name = r.read_cstr()?,
				tag::MAT_AMBIENT => self.ambient = read_color(r, &attr, strict)?,
				tag::MAT_DIFFUSE => self.diffuse = read_color(r, &attr, strict)?,
				tag::MAT_SPECULAR => self.specular = read_color(r, &attr, strict)?,
				tag::MAT_SHININESS => self.shininess = read_percent(r, &attr, strict)?,
				tag::MAT_SHIN_STRENGTH => self.shin_strength = read_percent(r, &attr, strict)?,
				tag::MAT_TRANSPARENCY => self.transparency = read_percent(r, &attr, strict)?,
				tag::MAT_TRANS_FALLOFF => self.trans_falloff = read_percent(r, &attr, strict)?,
				tag::MAT_REFLECT_BLUR => self.reflect_blur = read_percent(r, &attr, strict)?,
				tag::MAT_SELF_ILLUM => self.self_illum = read_percent(r, &attr, strict)?,
				tag::MAT_TWO_SIDED => self.two_sided = true,
				tag::MAT_SHADING => self.shading = Shading::from(r.read_u16()?),
				tag::MAT_WIRE_THICKNESS => self.wire_thickness = r.read_f32()?,
				t => if let Some(kind) = MapKind::from_tag(t) {
					let mut map = TextureMap::default();
					map.read(r, &attr, strict)?;
					self.maps[kind.index()] = Some(map);
				},
			}
			scan.finish(r, &attr)?;
		}

		log::debug!("material {:?} ({} maps)", self.name, self.maps().count());
		Ok(())
	}

	#[cfg(feature = "export")]
	fn write_payload<W>(&self, w: &mut ChunkWriter<W>) -> Result<()>
	where
		W: Write,
	{
		w.write_header(tag::MAT_NAME, HEADER_SIZE + cstr_size(&self.name))?;
		w.write_cstr(tag::MAT_NAME, &self.name)?;

		write_color(w, tag::MAT_AMBIENT, &self.ambient)?;
		write_color(w, tag::MAT_DIFFUSE, &self.diffuse)?;
		write_color(w, tag::MAT_SPECULAR, &self.specular)?;

		for (t, v) in self.percentages() {
			write_percent(w, t, v)?;
		}

		if self.two_sided {
			w.write_header(tag::MAT_TWO_SIDED, HEADER_SIZE)?;
		}

		w.write_header(tag::MAT_SHADING, HEADER_SIZE + WORD_SIZE)?;
		w.write_u16(self.shading.into())?;

		write_percent(w, tag::MAT_SELF_ILLUM, self.self_illum)?;

		w.write_header(tag::MAT_WIRE_THICKNESS, HEADER_SIZE + FLOAT_SIZE)?;
		w.write_f32(self.wire_thickness)?;

		for (kind, map) in self.maps() {
			map.write(kind, w)?;
		}

		Ok(())
	}
}
