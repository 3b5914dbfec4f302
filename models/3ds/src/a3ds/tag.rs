//! Chunk tags understood by this crate.
//!
//! Tags are not globally unique in meaning; see [`crate::a3ds::registry`] for
//! how context is taken into account.

// Root

/// Root of every .3DS file
pub const MAIN: u16 = 0x4D4D;
pub const VERSION: u16 = 0x0002;

// Editor section

/// Editor (3D data) section
pub const EDITOR: u16 = 0x3D3D;
pub const MESH_VERSION: u16 = 0x3D3E;
pub const MASTER_SCALE: u16 = 0x0100;

// Shared value chunks
pub const RGB_FLOAT: u16 = 0x0010;
pub const RGB_BYTE: u16 = 0x0011;
pub const RGB_BYTE_GAMMA: u16 = 0x0012;
pub const RGB_FLOAT_GAMMA: u16 = 0x0013;
pub const PERCENT_INT: u16 = 0x0030;

// Material and its attributes
pub const MATERIAL: u16 = 0xAFFF;
pub const MAT_NAME: u16 = 0xA000;
pub const MAT_AMBIENT: u16 = 0xA010;
pub const MAT_DIFFUSE: u16 = 0xA020;
pub const MAT_SPECULAR: u16 = 0xA030;
pub const MAT_SHININESS: u16 = 0xA040;
pub const MAT_SHIN_STRENGTH: u16 = 0xA041;
pub const MAT_TRANSPARENCY: u16 = 0xA050;
pub const MAT_TRANS_FALLOFF: u16 = 0xA052;
pub const MAT_REFLECT_BLUR: u16 = 0xA053;
pub const MAT_TWO_SIDED: u16 = 0xA081;
pub const MAT_SELF_ILLUM: u16 = 0xA084;
pub const MAT_WIRE_THICKNESS: u16 = 0xA087;
pub const MAT_SHADING: u16 = 0xA100;

// Material texture map slots
pub const MAT_TEXTURE1_MAP: u16 = 0xA200;
pub const MAT_SPECULAR_MAP: u16 = 0xA204;
pub const MAT_OPACITY_MAP: u16 = 0xA210;
pub const MAT_REFLECTION_MAP: u16 = 0xA220;
pub const MAT_BUMP_MAP: u16 = 0xA230;
pub const MAT_TEXTURE2_MAP: u16 = 0xA33A;
pub const MAT_SHININESS_MAP: u16 = 0xA33C;
pub const MAT_ILLUMINATION_MAP: u16 = 0xA33D;

// Texture map attributes
pub const MAP_PATH: u16 = 0xA300;
pub const MAP_OPTIONS: u16 = 0xA351;
pub const MAP_BLUR: u16 = 0xA353;
pub const MAP_U_SCALE: u16 = 0xA354;
pub const MAP_V_SCALE: u16 = 0xA356;
pub const MAP_U_OFFSET: u16 = 0xA358;
pub const MAP_V_OFFSET: u16 = 0xA35A;
pub const MAP_ROTATION: u16 = 0xA35C;

// Named object

/// Named object
pub const OBJECT: u16 = 0x4000;

// Triangle mesh, below an object
pub const TRIMESH: u16 = 0x4100;
pub const VERTEX_LIST: u16 = 0x4110;
pub const FACE_LIST: u16 = 0x4120;
pub const MAP_COORDS: u16 = 0x4140;
pub const LOCAL_AXES: u16 = 0x4160;
pub const VISIBLE: u16 = 0x4165;

// Face list children
pub const FACE_MATERIAL: u16 = 0x4130;
pub const SMOOTHING: u16 = 0x4150;

// Light, below an object
pub const LIGHT: u16 = 0x4600;
pub const SPOT_LIGHT: u16 = 0x4610;
pub const LIGHT_OFF: u16 = 0x4620;
pub const LIGHT_RAYTRACE: u16 = 0x4627;
pub const LIGHT_CAST_SHADOW: u16 = 0x4630;
pub const LIGHT_ROLL: u16 = 0x4656;
pub const LIGHT_RAY_BIAS: u16 = 0x4658;
pub const LIGHT_IN_RANGE: u16 = 0x4659;
pub const LIGHT_OUT_RANGE: u16 = 0x465A;
pub const LIGHT_MULTIPLIER: u16 = 0x465B;

// Camera, below an object
pub const CAMERA: u16 = 0x4700;
