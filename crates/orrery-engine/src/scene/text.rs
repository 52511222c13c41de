//! Text figures: one textured plate per character.
//!
//! Glyph rasterization lives behind the [`GlyphSource`] trait so the
//! layout and figure building stay testable without a GL context; the real
//! implementation is the glyph cache on `gl::GlContext`.

use glam::{Mat4, Vec2};

use crate::RenderError;
use crate::color::Color;
use crate::gl::TextureHandle;
use crate::scene::{FigureId, FigureKind, Vertex, VertexManager};

/// Pixel size glyphs are rasterized at; world size comes from scaling the
/// resulting plates, so this only bounds texture sharpness.
pub const RASTER_PX: f32 = 64.0;

/// A run of text placed in the world.
///
/// The run lives in the XY plane of `frame`: the baseline starts at the
/// frame origin and advances along +X, glyphs extend toward +Y. `height`
/// is the em size in world units.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: String,
    pub frame: Mat4,
    pub height: f32,
    pub color: Color,
}

impl TextRun {
    pub fn new(text: impl Into<String>, height: f32) -> Self {
        Self {
            text: text.into(),
            frame: Mat4::IDENTITY,
            height,
            color: Color::WHITE,
        }
    }

    pub fn with_frame(mut self, frame: Mat4) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Metrics of one rasterized glyph, in pixels at the rasterized size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphMetrics {
    pub width: u32,
    pub height: u32,
    /// Bitmap left edge relative to the pen position.
    pub xmin: f32,
    /// Bitmap bottom edge relative to the baseline (negative for
    /// descenders).
    pub ymin: f32,
    /// Pen advance to the next character.
    pub advance: f32,
}

/// A glyph ready for use: its texture plus metrics.
#[derive(Debug, Copy, Clone)]
pub struct GlyphEntry {
    pub texture: TextureHandle,
    pub metrics: GlyphMetrics,
}

/// Provider of rasterized glyphs. Implemented by the GL glyph cache and by
/// test fakes.
pub trait GlyphSource {
    fn glyph(&mut self, ch: char, px: f32) -> Result<GlyphEntry, RenderError>;
}

/// Placement of one character's plate in run-local coordinates.
#[derive(Debug, Copy, Clone)]
pub struct CharPlacement {
    pub ch: char,
    /// Lower-left corner of the plate relative to the run origin.
    pub offset: Vec2,
    /// Plate extent in world units.
    pub size: Vec2,
}

/// Lays out the characters of `text` along the baseline.
///
/// Whitespace and zero-area glyphs advance the pen without producing a
/// placement.
pub fn layout_text(
    text: &str,
    height: f32,
    source: &mut dyn GlyphSource,
) -> Result<Vec<(CharPlacement, GlyphEntry)>, RenderError> {
    let scale = height / RASTER_PX;
    let mut pen = 0.0f32;
    let mut out = Vec::new();
    for ch in text.chars() {
        let entry = source.glyph(ch, RASTER_PX)?;
        let m = entry.metrics;
        if m.width > 0 && m.height > 0 {
            out.push((
                CharPlacement {
                    ch,
                    offset: Vec2::new(pen + m.xmin * scale, m.ymin * scale),
                    size: Vec2::new(m.width as f32 * scale, m.height as f32 * scale),
                },
                entry,
            ));
        }
        pen += m.advance * scale;
    }
    Ok(out)
}

/// Builds one textured triangle figure per character of `run` into `mgr`.
///
/// Character figures are excluded from the edge overlay and from shadow
/// maps, and carry a clone of the run so they can be re-created after
/// edits. Returns the created figure ids in character order.
pub fn build_text(
    mgr: &mut VertexManager,
    source: &mut dyn GlyphSource,
    run: &TextRun,
) -> Result<Vec<FigureId>, RenderError> {
    let mut ids = Vec::new();
    for (place, entry) in layout_text(&run.text, run.height, source)? {
        // Plate corners in run-local space: origin, +x, +x+y, +y.
        let o = place.offset;
        let s = place.size;
        let corners = [
            Vec2::new(o.x, o.y),
            Vec2::new(o.x + s.x, o.y),
            Vec2::new(o.x + s.x, o.y + s.y),
            Vec2::new(o.x, o.y + s.y),
        ];
        // Glyph bitmaps are stored top row first, so v runs 1 at the
        // bottom edge to 0 at the top.
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        let vert = |i: usize| {
            Vertex::at(run.frame.transform_point3(corners[i].extend(0.0)))
                .with_color(run.color)
                .with_uv(uvs[i])
        };
        let verts = [vert(0), vert(1), vert(2), vert(0), vert(2), vert(3)];

        let id = mgr.add_figure_vertices(None, FigureKind::Triangles, &verts);
        if let Some(fig) = mgr.figure_mut(id) {
            fig.set_name(format!("char-{}", place.ch));
            fig.texture = Some(entry.texture);
            fig.text = Some(run.clone());
            fig.exclude_from_shade_with_edge = true;
            fig.eval_in_shadow_map = false;
        }
        ids.push(id);
    }
    Ok(ids)
}
