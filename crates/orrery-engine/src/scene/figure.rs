use glam::Mat4;
use uuid::Uuid;

use crate::color::Color;
use crate::gl::TextureHandle;
use crate::scene::TextRun;

/// Stable figure identity within one vertex manager.
///
/// Ids are never reused; removing a figure retires its id for good.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FigureId(pub(crate) u64);

/// Primitive kind of a figure. All primitives in a figure share the kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FigureKind {
    Points,
    Lines,
    Triangles,
}

impl FigureKind {
    /// Vertex indices consumed per primitive.
    #[inline]
    pub fn vertices_per_primitive(self) -> usize {
        match self {
            FigureKind::Points => 1,
            FigureKind::Lines => 2,
            FigureKind::Triangles => 3,
        }
    }
}

/// A named group of primitives over the manager's shared vertex pool.
///
/// Cloning a figure is a deep copy: index list, name, and any attached
/// text payload are owned, so clones share no mutable state with the
/// original. Manager-level duplication ([`clone_figure`]) additionally
/// assigns a fresh id and bumps vertex reference counts.
///
/// [`clone_figure`]: crate::scene::VertexManager::clone_figure
#[derive(Debug, Clone)]
pub struct Figure {
    pub(crate) id: FigureId,
    name: String,
    kind: FigureKind,
    /// Indices into the owning manager's vertex pool, grouped by
    /// `kind.vertices_per_primitive()`.
    pub(crate) indices: Vec<u32>,

    /// Figure-level color override. When set, the renderer ignores
    /// per-vertex colors for this figure.
    pub color: Option<Color>,

    /// Per-figure object transform, applied on top of the control's model
    /// matrix at draw time.
    pub object_matrix: Mat4,

    pub visible: bool,
    pub selected: bool,
    pub highlighted: bool,

    /// Draw-order key within the manager; lower draws first.
    pub order: i32,

    /// Skip this figure in the edge overlay pass.
    pub exclude_from_shade_with_edge: bool,

    /// Include this figure's triangles when rendering shadow maps.
    pub eval_in_shadow_map: bool,

    /// Texture sampled across the figure's UVs (text glyphs, images).
    pub texture: Option<TextureHandle>,

    /// Source text for figures produced by the text builder.
    pub text: Option<TextRun>,
}

impl Figure {
    pub(crate) fn new(id: FigureId, name: Option<&str>, kind: FigureKind) -> Self {
        let name = match name {
            Some(n) => n.to_owned(),
            None => format!("fig-{}", Uuid::new_v4()),
        };
        Self {
            id,
            name,
            kind,
            indices: Vec::new(),
            color: None,
            object_matrix: Mat4::IDENTITY,
            visible: true,
            selected: false,
            highlighted: false,
            order: 0,
            exclude_from_shade_with_edge: false,
            eval_in_shadow_map: true,
            texture: None,
            text: None,
        }
    }

    #[inline]
    pub fn id(&self) -> FigureId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn kind(&self) -> FigureKind {
        self.kind
    }

    /// Indices into the manager's vertex pool, grouped by primitive.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.kind.vertices_per_primitive()
    }

    /// The index group of one primitive, `None` when out of range.
    pub fn primitive_indices(&self, prim: usize) -> Option<&[u32]> {
        let k = self.kind.vertices_per_primitive();
        let start = prim.checked_mul(k)?;
        self.indices.get(start..start + k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_names_are_unique() {
        let a = Figure::new(FigureId(0), None, FigureKind::Points);
        let b = Figure::new(FigureId(1), None, FigureKind::Points);
        assert_ne!(a.name(), b.name());
        assert!(a.name().starts_with("fig-"));
    }

    #[test]
    fn primitive_grouping() {
        let mut f = Figure::new(FigureId(0), Some("tris"), FigureKind::Triangles);
        f.indices = vec![0, 1, 2, 2, 1, 3];
        assert_eq!(f.primitive_count(), 2);
        assert_eq!(f.primitive_indices(1), Some(&[2, 1, 3][..]));
        assert_eq!(f.primitive_indices(2), None);
    }

    #[test]
    fn defaults_match_render_contract() {
        let f = Figure::new(FigureId(0), Some("x"), FigureKind::Triangles);
        assert!(f.visible);
        assert!(f.eval_in_shadow_map);
        assert!(!f.exclude_from_shade_with_edge);
        assert!(!f.selected);
        assert_eq!(f.object_matrix, Mat4::IDENTITY);
    }
}
