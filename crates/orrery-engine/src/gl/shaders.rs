//! GLSL sources, embedded at compile time.
//!
//! Four pipelines share these stages:
//! - main: `MAIN_VERT` + `MAIN_FRAG`, lit triangles and unlit points/lines
//! - edge overlay: `OVERLAY_VERT` + `EDGE_GEOM` + `FLAT_FRAG`
//! - normals overlay: `OVERLAY_VERT` + `NORMALS_GEOM` + `FLAT_FRAG`
//! - shadow depth: `DEPTH_VERT` + `DEPTH_GEOM` + `DEPTH_FRAG`, routing
//!   each triangle to the six faces of one cube-map layer
//!
//! Attribute locations follow the `scene::Vertex` layout; uniform and
//! storage block names are what `control::render` sets.

pub const MAIN_VERT: &str = include_str!("shaders/main.vert");
pub const MAIN_FRAG: &str = include_str!("shaders/main.frag");

pub const OVERLAY_VERT: &str = include_str!("shaders/overlay.vert");
pub const EDGE_GEOM: &str = include_str!("shaders/edge.geom");
pub const NORMALS_GEOM: &str = include_str!("shaders/normals.geom");
pub const FLAT_FRAG: &str = include_str!("shaders/flat.frag");

pub const DEPTH_VERT: &str = include_str!("shaders/depth.vert");
pub const DEPTH_GEOM: &str = include_str!("shaders/depth.geom");
pub const DEPTH_FRAG: &str = include_str!("shaders/depth.frag");

/// Binding point of the point-light storage block.
pub const LIGHTS_BINDING: u32 = 0;

/// Binding point of the shadow face-matrix storage block.
pub const SHADOW_MATRICES_BINDING: u32 = 1;

/// Texture unit of the shadow cube-map array sampler.
pub const SHADOW_MAP_UNIT: u32 = 1;

/// Texture unit of the figure texture sampler.
pub const FIGURE_TEXTURE_UNIT: u32 = 0;
