//! Engine-level error type.
//!
//! Only conditions the embedder can meaningfully react to are surfaced here.
//! Recoverable oddities (missing uniforms, degenerate clip planes) are
//! logged and corrected in place instead; see the `gl` and `control` docs.

use thiserror::Error;

/// Errors produced while building GL resources or rendering a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A shader stage failed to compile. `stage` is the human-readable
    /// stage name ("vertex", "geometry", "fragment").
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    /// The program failed to link.
    #[error("shader program link failed: {log}")]
    ShaderLink { log: String },

    /// A program was requested with no stage sources at all.
    #[error("shader program has no stages")]
    NoShaderStages,

    /// An offscreen or shadow framebuffer did not reach completeness.
    /// `status` is the raw GL status enum value.
    #[error("framebuffer incomplete (status 0x{status:x})")]
    FramebufferIncomplete { status: u32 },

    /// A GL object allocation failed (buffer, texture, framebuffer).
    #[error("GL resource allocation failed: {0}")]
    ResourceAlloc(String),

    /// A uniform required under strict mode is absent from the linked
    /// program. Outside strict mode this is a warn-once no-op instead.
    #[error("shader program '{program}' is missing uniform '{name}'")]
    MissingUniform { program: String, name: String },

    /// Fat-line geometry was requested for a zero-length segment.
    #[error("cannot build a fat line from a zero-length segment")]
    InvalidLineLength,

    /// Text was requested but no font has been configured on the context.
    #[error("no font configured for text rendering")]
    NoFont,

    /// The configured font bytes failed to parse.
    #[error("font load failed: {0}")]
    FontLoad(String),
}
