//! Tag to record type table used while decoding.
//!
//! The registry is the context-free part of tag resolution. Records whose
//! children change meaning depending on where they sit (the face list, for
//! example) resolve those tags themselves before falling back to this table.

use std::collections::HashMap;

use super::{
	camera::Camera,
	chunk::{
		Chunk,
		Unknown
	},
	container::Container,
	light::{
		Light,
		SpotLight
	},
	material::Material,
	mesh::{
		FaceList,
		LocalAxes,
		MapCoords,
		Object,
		VertexList,
		Visibility
	},
	tag,
	value::{
		Color,
		Flag,
		Scalar,
		Version
	}
};

/// Builds an empty record ready to be populated from the stream
pub type Factory = fn(u16) -> Chunk;

#[derive(Clone, Debug)]
pub struct Registry {
	factories: HashMap<u16, Factory>,
}

impl Registry {
	/// Registry without any known tags. Everything decodes as [`Unknown`].
	pub fn empty() -> Self {
		Self {
			factories: HashMap::new(),
		}
	}

	/// Registry with every record type this crate implements
	pub fn standard() -> Self {
		let mut r = Self::empty();

		for t in [tag::MAIN, tag::EDITOR, tag::TRIMESH] {
			r.register(t, |t| Chunk::Container(Container::new(t)));
		}

		for t in [tag::VERSION, tag::MESH_VERSION] {
			r.register(t, |t| Chunk::Version(Version::new(t, 0)));
		}

		for t in [tag::MASTER_SCALE, tag::LIGHT_ROLL, tag::LIGHT_RAY_BIAS, tag::LIGHT_IN_RANGE,
			tag::LIGHT_OUT_RANGE, tag::LIGHT_MULTIPLIER] {
			r.register(t, |t| Chunk::Scalar(Scalar::new(t, 0.0)));
		}

		for t in [tag::LIGHT_OFF, tag::LIGHT_RAYTRACE, tag::LIGHT_CAST_SHADOW] {
			r.register(t, |t| Chunk::Flag(Flag::new(t)));
		}

		for t in [tag::RGB_FLOAT, tag::RGB_BYTE, tag::RGB_BYTE_GAMMA, tag::RGB_FLOAT_GAMMA] {
			r.register(t, |t| Color::for_tag(t).map_or(Chunk::Unknown(Unknown::new(t)), Chunk::Color));
		}

		r.register(tag::OBJECT, |_| Chunk::Object(Object::default()));
		r.register(tag::VERTEX_LIST, |_| Chunk::Vertices(VertexList::default()));
		r.register(tag::FACE_LIST, |_| Chunk::Faces(FaceList::default()));
		r.register(tag::MAP_COORDS, |_| Chunk::MapCoords(MapCoords::default()));
		r.register(tag::LOCAL_AXES, |_| Chunk::LocalAxes(LocalAxes::default()));
		r.register(tag::VISIBLE, |_| Chunk::Visibility(Visibility::default()));
		r.register(tag::LIGHT, |_| Chunk::Light(Light::default()));
		r.register(tag::SPOT_LIGHT, |_| Chunk::SpotLight(SpotLight::default()));
		r.register(tag::CAMERA, |_| Chunk::Camera(Camera::default()));
		r.register(tag::MATERIAL, |_| Chunk::Material(Material::default()));

		r
	}

	/// Adds or replaces the factory for `tag`
	pub fn register(&mut self, tag: u16, factory: Factory) -> Option<Factory> {
		self.factories.insert(tag, factory)
	}

	pub fn unregister(&mut self, tag: u16) -> Option<Factory> {
		self.factories.remove(&tag)
	}

	pub fn contains(&self, tag: u16) -> bool {
		self.factories.contains_key(&tag)
	}

	/// Empty record for `tag`, or [`Unknown`] if the tag is not registered
	pub fn resolve(&self, tag: u16) -> Chunk {
		match self.factories.get(&tag) {
			Some(factory) => factory(tag),
			None => Chunk::Unknown(Unknown::new(tag)),
		}
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::standard()
	}
}
