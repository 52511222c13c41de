//! Geometry primitives shared across the scene and control layers.
//!
//! Everything here is plain CPU math on `glam` types. The conventions are
//! right-handed world space, +Y up, and OpenGL clip space (Z in [-1, 1]).

mod bbox;
mod prim;
mod tol;
mod xform;

pub use bbox::BBox;
pub use prim::{LineSeg, Plate};
pub use tol::{DEFAULT_TOL, HIT_TOL, PosKey, pos_key, quantize, tol_eq, tol_eq_vec3};
pub use xform::{
    basis_x, basis_y, basis_z, mat4_tol_eq, origin_of, rotation_about_axis_pivot, world_matrix,
};
