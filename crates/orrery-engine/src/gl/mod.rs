//! OpenGL resource layer on top of [`glow`].
//!
//! [`GlContext`] owns everything GL-side: compiled programs, the texture
//! arena, the glyph cache, the offscreen render target and the shadow
//! cube-map array. The embedder creates the raw context (GL 4.3 core or
//! later; geometry shaders and SSBOs are required) and passes it in as an
//! `Arc<glow::Context>`.
//!
//! Deleting GL objects is only safe while the context is current, so
//! texture disposal is deferred: [`TextureArena::dispose`] retires a
//! handle, and retired textures are actually deleted at the next
//! checkpoint inside the render loop.

mod context;
mod glyphs;
mod shader;
mod texture;

pub mod shaders;

pub use context::{GlContext, GlContextInit};
pub(crate) use context::StorageSlot;
pub use glyphs::GlyphCache;
pub use shader::{ShaderProgram, ShaderSources};
pub use texture::{TextureArena, TextureHandle};
