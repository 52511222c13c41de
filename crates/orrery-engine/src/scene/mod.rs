//! Scene content: deduplicated vertex storage and figures.
//!
//! A [`VertexManager`] owns a shared vertex pool plus the figures indexing
//! into it. Figures group primitives of one kind (points, lines or
//! triangles) and carry per-figure render state; vertices are deduplicated
//! by tolerance-quantized position so shared corners are stored once and
//! normal rebuilding can average across adjacent faces.

mod figure;
mod manager;
mod shapes;
mod text;
mod vertex;

pub use figure::{Figure, FigureId, FigureKind};
pub use manager::VertexManager;
pub use shapes::{bbox_wireframe, circle_lines, cuboid, fat_line, frustum_lines, uv_sphere};
pub use text::{
    CharPlacement, GlyphEntry, GlyphMetrics, GlyphSource, RASTER_PX, TextRun, build_text,
    layout_text,
};
pub use vertex::{DEFAULT_MATERIAL, VERTEX_SELECTED, Vertex};
