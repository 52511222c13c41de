//! Orrery engine crate.
//!
//! Real-time scene management and rendering for engineering-style model
//! viewers: deduplicated vertex storage, figure-based scenes, a multi-pass
//! OpenGL renderer with cube-map shadows, and camera controls (orbit, pan,
//! zoom, canonical view presets).
//!
//! GL access goes through [`glow`]; the embedder creates the context (from
//! a hidden window, a headless surface, whatever) and hands it over as an
//! `Arc<glow::Context>`. Everything above the [`gl`] module is plain CPU
//! state and can be driven without a context at all, which is how most of
//! the test suite works.

pub mod color;
pub mod control;
pub mod device;
pub mod geom;
pub mod gl;
pub mod logging;
pub mod model;
pub mod notify;
pub mod scene;
pub mod time;

mod error;

pub use error::RenderError;

/// Re-export of the command crate so embedders only need one dependency.
pub use orrery_figcmd as figcmd;
