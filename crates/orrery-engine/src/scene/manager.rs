use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::geom::{BBox, DEFAULT_TOL, LineSeg, PosKey, pos_key};
use crate::scene::{Figure, FigureId, FigureKind, Vertex};

/// Vertex pool plus the figures indexing into it.
///
/// Vertices are deduplicated on insert by tolerance-quantized position:
/// inserting a position within tolerance of an existing vertex returns the
/// existing index and bumps its reference count instead of growing the
/// pool. The first insertion fixes the vertex attributes (color, uv, ...);
/// later hits at the same position do not overwrite them.
///
/// The manager keeps a lazily rebuilt snapshot of the pool for GPU upload.
/// Any mutation of vertex data drops the snapshot; two consecutive
/// [`gpu_vertices`] calls without a mutation in between return the same
/// buffer.
///
/// [`gpu_vertices`]: VertexManager::gpu_vertices
pub struct VertexManager {
    name: String,
    tol: f32,
    expand_model_bbox: bool,

    vertices: Vec<Vertex>,
    /// Reference count per vertex (figure index occurrences).
    refs: Vec<u32>,
    keys: HashMap<PosKey, u32>,

    figures: Vec<Figure>,
    next_figure_id: u64,

    bbox: BBox,
    snapshot: Option<Vec<Vertex>>,
}

impl VertexManager {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tol: DEFAULT_TOL,
            expand_model_bbox: true,
            vertices: Vec::new(),
            refs: Vec::new(),
            keys: HashMap::new(),
            figures: Vec::new(),
            next_figure_id: 0,
            bbox: BBox::new(),
            snapshot: None,
        }
    }

    /// Overrides the deduplication tolerance. Takes effect for subsequent
    /// inserts only, so call it before adding content.
    pub fn with_tolerance(mut self, tol: f32) -> Self {
        debug_assert!(tol > 0.0);
        self.tol = tol;
        self
    }

    /// Tracks the bounding box in the given frame instead of world axes.
    pub fn with_bbox_frame(mut self, frame_to_world: Mat4) -> Self {
        debug_assert!(self.vertices.is_empty());
        self.bbox = BBox::in_frame(frame_to_world);
        self
    }

    /// Controls whether this manager's bbox participates in the model's
    /// aggregate bbox (overlay managers opt out).
    pub fn with_expand_model_bbox(mut self, expand: bool) -> Self {
        self.expand_model_bbox = expand;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tolerance(&self) -> f32 {
        self.tol
    }

    #[inline]
    pub fn expands_model_bbox(&self) -> bool {
        self.expand_model_bbox
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn figure_count(&self) -> usize {
        self.figures.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    #[inline]
    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    // ── vertex pool ──

    /// Inserts a vertex, deduplicating by position. Returns the pool index.
    pub fn insert_vertex(&mut self, v: Vertex) -> u32 {
        let key = pos_key(v.position_vec3(), self.tol);
        if let Some(&idx) = self.keys.get(&key) {
            self.refs[idx as usize] += 1;
            return idx;
        }
        let idx = self.vertices.len() as u32;
        self.bbox.union_point(v.position_vec3());
        self.vertices.push(v);
        self.refs.push(1);
        self.keys.insert(key, idx);
        self.snapshot = None;
        idx
    }

    #[inline]
    pub fn vertex(&self, idx: u32) -> Option<&Vertex> {
        self.vertices.get(idx as usize)
    }

    /// Reference count of a vertex (occurrences across figure indices).
    #[inline]
    pub fn vertex_refs(&self, idx: u32) -> u32 {
        self.refs.get(idx as usize).copied().unwrap_or(0)
    }

    /// Looks up the pool index of a position, if one exists within `tol`.
    ///
    /// Probes the dedup grid first; coarser tolerances (hit testing) fall
    /// back to a linear scan since they do not share the insert grid.
    pub fn find_vertex(&self, p: Vec3, tol: f32) -> Option<u32> {
        if let Some(&idx) = self.keys.get(&pos_key(p, self.tol)) {
            return Some(idx);
        }
        if tol > self.tol {
            return self
                .vertices
                .iter()
                .position(|v| (v.position_vec3() - p).length() <= tol)
                .map(|i| i as u32);
        }
        None
    }

    /// Flips the selected flag on a vertex.
    pub fn set_vertex_selected(&mut self, idx: u32, selected: bool) {
        if let Some(v) = self.vertices.get_mut(idx as usize) {
            v.set_selected(selected);
            self.snapshot = None;
        }
    }

    /// Recolors a vertex in place.
    pub fn set_vertex_color(&mut self, idx: u32, color: Color) {
        if let Some(v) = self.vertices.get_mut(idx as usize) {
            v.color = color.to_array();
            self.snapshot = None;
        }
    }

    /// GPU-ready vertex array, rebuilt lazily after mutations.
    ///
    /// The returned slice is stable (same allocation) until the next
    /// mutation of vertex data.
    pub fn gpu_vertices(&mut self) -> &[Vertex] {
        if self.snapshot.is_none() {
            self.snapshot = Some(self.vertices.clone());
        }
        self.snapshot.as_deref().unwrap_or(&[])
    }

    // ── figures ──

    /// Adds a point-cloud figure. `None` name gets a generated one.
    pub fn add_points(&mut self, name: Option<&str>, pts: &[Vec3], color: Option<Color>) -> FigureId {
        let mut fig = self.new_figure(name, FigureKind::Points);
        fig.color = color;
        fig.indices = pts.iter().map(|p| self.insert_vertex(Vertex::at(*p))).collect();
        self.push_figure(fig)
    }

    /// Adds a line-segment figure.
    pub fn add_lines(&mut self, name: Option<&str>, segs: &[LineSeg], color: Option<Color>) -> FigureId {
        let mut fig = self.new_figure(name, FigureKind::Lines);
        fig.color = color;
        fig.indices = Vec::with_capacity(segs.len() * 2);
        for seg in segs {
            fig.indices.push(self.insert_vertex(Vertex::at(seg.from)));
            fig.indices.push(self.insert_vertex(Vertex::at(seg.to)));
        }
        self.push_figure(fig)
    }

    /// Adds a triangle figure.
    pub fn add_triangles(
        &mut self,
        name: Option<&str>,
        tris: &[[Vec3; 3]],
        color: Option<Color>,
    ) -> FigureId {
        let mut fig = self.new_figure(name, FigureKind::Triangles);
        fig.color = color;
        fig.indices = Vec::with_capacity(tris.len() * 3);
        for tri in tris {
            for p in tri {
                fig.indices.push(self.insert_vertex(Vertex::at(*p)));
            }
        }
        self.push_figure(fig)
    }

    /// Adds a figure from fully specified vertices (uv, color, material),
    /// still deduplicating by position. `verts.len()` must be a multiple
    /// of the primitive arity.
    pub fn add_figure_vertices(
        &mut self,
        name: Option<&str>,
        kind: FigureKind,
        verts: &[Vertex],
    ) -> FigureId {
        debug_assert_eq!(verts.len() % kind.vertices_per_primitive(), 0);
        let mut fig = self.new_figure(name, kind);
        fig.indices = verts.iter().map(|v| self.insert_vertex(*v)).collect();
        self.push_figure(fig)
    }

    /// Removes a figure, releasing its vertex references. Vertices stay in
    /// the pool (the pool is append-only between clears), so the bbox does
    /// not shrink.
    pub fn remove_figure(&mut self, id: FigureId) -> Option<Figure> {
        let at = self.figures.iter().position(|f| f.id == id)?;
        let fig = self.figures.remove(at);
        for &idx in &fig.indices {
            if let Some(r) = self.refs.get_mut(idx as usize) {
                *r = r.saturating_sub(1);
            }
        }
        Some(fig)
    }

    /// Deep-copies a figure under a fresh id (and name, unless given),
    /// bumping the reference counts of every vertex it uses.
    pub fn clone_figure(&mut self, id: FigureId, name: Option<&str>) -> Option<FigureId> {
        let src = self.figures.iter().find(|f| f.id == id)?;
        let mut dup = src.clone();
        dup.id = FigureId(self.next_figure_id);
        self.next_figure_id += 1;
        dup.set_name(match name {
            Some(n) => n.to_owned(),
            None => format!("{}-copy", src.name()),
        });
        for &idx in &dup.indices {
            if let Some(r) = self.refs.get_mut(idx as usize) {
                *r += 1;
            }
        }
        let new_id = dup.id;
        self.figures.push(dup);
        Some(new_id)
    }

    #[inline]
    pub fn figure(&self, id: FigureId) -> Option<&Figure> {
        self.figures.iter().find(|f| f.id == id)
    }

    #[inline]
    pub fn figure_mut(&mut self, id: FigureId) -> Option<&mut Figure> {
        self.figures.iter_mut().find(|f| f.id == id)
    }

    pub fn figure_by_name(&self, name: &str) -> Option<&Figure> {
        self.figures.iter().find(|f| f.name() == name)
    }

    /// Figures in insertion order.
    pub fn figures(&self) -> impl Iterator<Item = &Figure> {
        self.figures.iter()
    }

    pub fn figures_mut(&mut self) -> impl Iterator<Item = &mut Figure> {
        self.figures.iter_mut()
    }

    /// Figures sorted by draw order key, ties broken by id (insertion).
    pub fn ordered_figures(&self) -> Vec<&Figure> {
        let mut v: Vec<&Figure> = self.figures.iter().collect();
        v.sort_by_key(|f| (f.order, f.id));
        v
    }

    /// Drops all figures and vertices and resets the bbox. The dedup
    /// tolerance and bbox frame are kept.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.refs.clear();
        self.keys.clear();
        self.figures.clear();
        self.bbox = self.bbox.cleared();
        self.snapshot = None;
    }

    // ── normals ──

    /// Rebuilds vertex normals from triangle figures.
    ///
    /// All normals are zeroed, then every triangle adds its raw (area
    /// scaled) face cross product to its three vertices, and each normal
    /// is normalized at the end. Shared vertices therefore average over
    /// adjacent faces; vertices referenced only by points or lines end up
    /// with a zero normal.
    pub fn rebuild_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.vertices.len()];
        for fig in &self.figures {
            if fig.kind() != FigureKind::Triangles {
                continue;
            }
            for tri in fig.indices.chunks_exact(3) {
                let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
                let pa = self.vertices[a].position_vec3();
                let pb = self.vertices[b].position_vec3();
                let pc = self.vertices[c].position_vec3();
                let n = (pb - pa).cross(pc - pa);
                acc[a] += n;
                acc[b] += n;
                acc[c] += n;
            }
        }
        for (v, n) in self.vertices.iter_mut().zip(acc) {
            v.normal = n.normalize_or_zero().to_array();
        }
        self.snapshot = None;
    }

    // ── helpers ──

    fn new_figure(&mut self, name: Option<&str>, kind: FigureKind) -> Figure {
        let id = FigureId(self.next_figure_id);
        self.next_figure_id += 1;
        Figure::new(id, name, kind)
    }

    fn push_figure(&mut self, fig: Figure) -> FigureId {
        let id = fig.id;
        self.figures.push(fig);
        id
    }
}

impl std::fmt::Debug for VertexManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexManager")
            .field("name", &self.name)
            .field("vertices", &self.vertices.len())
            .field("figures", &self.figures.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::cuboid;

    fn tri(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [Vec3; 3] {
        [Vec3::from(a), Vec3::from(b), Vec3::from(c)]
    }

    // ── dedup ──

    #[test]
    fn identical_positions_are_stored_once() {
        let mut mgr = VertexManager::new("m");
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        mgr.add_triangles(None, &[t], None);
        assert_eq!(mgr.vertex_count(), 3);

        // Same triangle again: no new vertices, refs double.
        mgr.add_triangles(None, &[t], None);
        assert_eq!(mgr.vertex_count(), 3);
        assert_eq!(mgr.vertex_refs(0), 2);
    }

    #[test]
    fn within_tolerance_positions_merge() {
        let mut mgr = VertexManager::new("m");
        let a = mgr.insert_vertex(Vertex::at(Vec3::new(1.0, 2.0, 3.0)));
        let b = mgr.insert_vertex(Vertex::at(Vec3::new(1.000_001, 2.0, 3.0)));
        assert_eq!(a, b);
        assert_eq!(mgr.vertex_count(), 1);
        assert_eq!(mgr.vertex_refs(a), 2);
    }

    #[test]
    fn first_insertion_wins_attributes() {
        let mut mgr = VertexManager::new("m");
        let a = mgr.insert_vertex(Vertex::at(Vec3::ZERO).with_color(Color::RED));
        let b = mgr.insert_vertex(Vertex::at(Vec3::ZERO).with_color(Color::BLUE));
        assert_eq!(a, b);
        assert_eq!(mgr.vertex(a).unwrap().color, Color::RED.to_array());
    }

    #[test]
    fn unit_cube_dedups_to_eight_vertices() {
        let mut mgr = VertexManager::new("m");
        let tris = cuboid(Vec3::ZERO, Vec3::ONE);
        assert_eq!(tris.len(), 12);
        mgr.add_triangles(Some("cube"), &tris, None);
        assert_eq!(mgr.vertex_count(), 8);
    }

    #[test]
    fn custom_tolerance_changes_merging() {
        let mut coarse = VertexManager::new("coarse").with_tolerance(0.1);
        coarse.insert_vertex(Vertex::at(Vec3::ZERO));
        coarse.insert_vertex(Vertex::at(Vec3::new(0.04, 0.0, 0.0)));
        assert_eq!(coarse.vertex_count(), 1);

        let mut fine = VertexManager::new("fine");
        fine.insert_vertex(Vertex::at(Vec3::ZERO));
        fine.insert_vertex(Vertex::at(Vec3::new(0.04, 0.0, 0.0)));
        assert_eq!(fine.vertex_count(), 2);
    }

    // ── snapshot ──

    #[test]
    fn snapshot_is_stable_between_mutations() {
        let mut mgr = VertexManager::new("m");
        mgr.add_points(None, &[Vec3::ZERO, Vec3::ONE], None);

        let p1 = mgr.gpu_vertices().as_ptr();
        let p2 = mgr.gpu_vertices().as_ptr();
        assert_eq!(p1, p2);

        mgr.add_points(None, &[Vec3::new(5.0, 0.0, 0.0)], None);
        let p3 = mgr.gpu_vertices();
        assert_eq!(p3.len(), 3);
    }

    #[test]
    fn selection_flip_invalidates_snapshot() {
        let mut mgr = VertexManager::new("m");
        let idx = mgr.insert_vertex(Vertex::at(Vec3::ZERO));
        assert!(!mgr.gpu_vertices()[0].is_selected());
        mgr.set_vertex_selected(idx, true);
        assert!(mgr.gpu_vertices()[0].is_selected());
    }

    // ── figures ──

    #[test]
    fn remove_releases_refs_but_keeps_vertices() {
        let mut mgr = VertexManager::new("m");
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let a = mgr.add_triangles(Some("a"), &[t], None);
        let b = mgr.add_triangles(Some("b"), &[t], None);

        mgr.remove_figure(a);
        assert!(mgr.figure(a).is_none());
        assert!(mgr.figure(b).is_some());
        assert_eq!(mgr.vertex_count(), 3);
        assert_eq!(mgr.vertex_refs(0), 1);

        mgr.remove_figure(b);
        assert_eq!(mgr.vertex_refs(0), 0);
        assert_eq!(mgr.vertex_count(), 3);
    }

    #[test]
    fn clone_figure_is_independent() {
        let mut mgr = VertexManager::new("m");
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let orig = mgr.add_triangles(Some("orig"), &[t], Some(Color::RED));

        let copy = mgr.clone_figure(orig, None).unwrap();
        assert_ne!(orig, copy);
        assert_eq!(mgr.vertex_refs(0), 2);

        mgr.figure_mut(copy).unwrap().object_matrix = Mat4::from_translation(Vec3::X);
        assert_eq!(mgr.figure(orig).unwrap().object_matrix, Mat4::IDENTITY);
        assert_eq!(mgr.figure(copy).unwrap().color, Some(Color::RED));
        assert_eq!(mgr.figure(copy).unwrap().name(), "orig-copy");
    }

    #[test]
    fn ordered_figures_sort_by_order_then_insertion() {
        let mut mgr = VertexManager::new("m");
        let a = mgr.add_points(Some("a"), &[Vec3::ZERO], None);
        let b = mgr.add_points(Some("b"), &[Vec3::X], None);
        let c = mgr.add_points(Some("c"), &[Vec3::Y], None);
        mgr.figure_mut(a).unwrap().order = 5;
        mgr.figure_mut(c).unwrap().order = -1;

        let names: Vec<&str> = mgr.ordered_figures().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["c", "b", "a"]);
        let _ = b;
    }

    #[test]
    fn clear_resets_everything() {
        let mut mgr = VertexManager::new("m");
        mgr.add_points(None, &[Vec3::ONE], None);
        assert!(!mgr.bbox().is_empty());
        mgr.clear();
        assert_eq!(mgr.vertex_count(), 0);
        assert_eq!(mgr.figure_count(), 0);
        assert!(mgr.bbox().is_empty());
    }

    // ── bbox ──

    #[test]
    fn bbox_grows_with_content() {
        let mut mgr = VertexManager::new("m");
        mgr.add_points(None, &[Vec3::ZERO], None);
        let d1 = mgr.bbox().diagonal();
        mgr.add_points(None, &[Vec3::splat(10.0)], None);
        let d2 = mgr.bbox().diagonal();
        assert!(d2 > d1);
        assert!(mgr.bbox().contains(Vec3::splat(10.0), DEFAULT_TOL));
    }

    // ── normals ──

    #[test]
    fn cube_corner_normals_point_along_their_octants() {
        let mut mgr = VertexManager::new("m");
        mgr.add_triangles(Some("cube"), &cuboid(Vec3::ZERO, Vec3::splat(2.0)), None);
        mgr.rebuild_normals();

        for i in 0..mgr.vertex_count() as u32 {
            let v = mgr.vertex(i).unwrap();
            let p = v.position_vec3();
            let n = v.normal_vec3();
            assert!((n.length() - 1.0).abs() < 1e-5);
            // Averaged corner normal points into the corner's octant.
            assert!(n.x.signum() == p.x.signum(), "x sign at {p:?}: {n:?}");
            assert!(n.y.signum() == p.y.signum(), "y sign at {p:?}: {n:?}");
            assert!(n.z.signum() == p.z.signum(), "z sign at {p:?}: {n:?}");
            // And stays roughly diagonal.
            assert!(n.dot(p.normalize()) > 0.7, "normal {n:?} vs corner {p:?}");
        }
    }

    #[test]
    fn flat_plate_normals_are_the_face_normal() {
        let mut mgr = VertexManager::new("m");
        mgr.add_triangles(
            None,
            &[
                tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
                tri([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
            ],
            None,
        );
        mgr.rebuild_normals();
        for i in 0..mgr.vertex_count() as u32 {
            let n = mgr.vertex(i).unwrap().normal_vec3();
            assert!((n - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn point_only_vertices_keep_zero_normals() {
        let mut mgr = VertexManager::new("m");
        mgr.add_points(None, &[Vec3::splat(3.0)], None);
        mgr.rebuild_normals();
        assert_eq!(mgr.vertex(0).unwrap().normal_vec3(), Vec3::ZERO);
    }
}
