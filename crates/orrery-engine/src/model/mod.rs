//! Scene container: vertex managers, lights, selection and the rebuild
//! life-cycle.
//!
//! A [`Model`] owns one main [`VertexManager`] plus any number of attached
//! custom managers (overlays, debug geometry). Content is either pushed in
//! directly or produced by a build callback: [`Model::invalidate`] marks
//! the model stale and the next rendering control to call
//! [`Model::ensure_built`] wipes the managers and runs the callback once.
//! Further controls sharing the model in the same cycle render the already
//! rebuilt content.
//!
//! The model knows nothing about controls or GL; it emits [`ModelEvent`]s
//! and lets whoever subscribed react.

mod light;

pub use light::{GpuPointLight, PointLight};

use glam::Vec3;
use orrery_figcmd::{self as figcmd, FigCmd};
use std::collections::BTreeSet;

use crate::color::Color;
use crate::control::ControlId;
use crate::geom::{BBox, LineSeg};
use crate::notify::{ListenerId, ModelEvent, Notifier, RedrawSignal};
use crate::scene::{Figure, FigureId, FigureKind, Vertex, VertexManager};

/// Context handed to the build callback: which control triggered the
/// rebuild, at what target size, and whether this is the first build ever.
#[derive(Debug, Copy, Clone)]
pub struct ViewStamp {
    pub control: ControlId,
    /// Pixel size of the triggering control's render target.
    pub size: [u32; 2],
    pub first_build: bool,
}

/// User-supplied scene builder, run on [`Model::ensure_built`].
pub type BuildFn = Box<dyn FnMut(&mut Model, &ViewStamp)>;

pub struct Model {
    main: VertexManager,
    custom: Vec<VertexManager>,

    lights: Vec<PointLight>,

    /// Selected primitives as `(figure, primitive index)`, main manager
    /// only. Ordered so figcmd export is deterministic.
    selection: BTreeSet<(FigureId, usize)>,

    build_fn: Option<BuildFn>,
    invalidated: bool,
    builds: u64,

    notifier: Notifier,
}

impl Model {
    /// An empty model, marked invalidated so the first render builds it.
    pub fn new() -> Self {
        Self {
            main: VertexManager::new("main"),
            custom: Vec::new(),
            lights: Vec::new(),
            selection: BTreeSet::new(),
            build_fn: None,
            invalidated: true,
            builds: 0,
            notifier: Notifier::new(),
        }
    }

    pub fn with_build(mut self, f: impl FnMut(&mut Model, &ViewStamp) + 'static) -> Self {
        self.set_build(f);
        self
    }

    /// Installs (or replaces) the build callback and invalidates, so the
    /// next render runs it.
    pub fn set_build(&mut self, f: impl FnMut(&mut Model, &ViewStamp) + 'static) {
        self.build_fn = Some(Box::new(f));
        self.invalidate();
    }

    // ── rebuild life-cycle ──

    /// Marks the model stale. The next [`ensure_built`] wipes all managers
    /// and runs the build callback.
    ///
    /// [`ensure_built`]: Model::ensure_built
    pub fn invalidate(&mut self) {
        self.invalidated = true;
        self.notifier.emit(ModelEvent::Invalidated);
    }

    #[inline]
    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Rebuilds the model if it is invalidated. Returns whether a rebuild
    /// ran.
    ///
    /// The first control to call this in an invalidation cycle wins; the
    /// stale flag is cleared up front, so re-invalidation from inside the
    /// callback schedules a fresh cycle instead of recursing. Without a
    /// build callback the flag is cleared and content is left untouched
    /// (manually populated models).
    pub fn ensure_built(&mut self, control: ControlId, size: [u32; 2]) -> bool {
        if !self.invalidated {
            return false;
        }
        self.invalidated = false;

        let Some(mut build) = self.build_fn.take() else {
            return false;
        };
        self.clear(true);
        let stamp = ViewStamp { control, size, first_build: self.builds == 0 };
        build(self, &stamp);
        self.builds += 1;
        // The callback may have installed a replacement via set_build.
        if self.build_fn.is_none() {
            self.build_fn = Some(build);
        }
        true
    }

    /// Completed rebuild cycles so far.
    #[inline]
    pub fn build_count(&self) -> u64 {
        self.builds
    }

    /// Empties the main manager, detaches all custom managers and drops
    /// the selection. Lights survive unless `keep_lights` is false.
    pub fn clear(&mut self, keep_lights: bool) {
        self.main.clear();
        self.custom.clear();
        if !self.selection.is_empty() {
            self.selection.clear();
            self.notifier.emit(ModelEvent::SelectionChanged);
        }
        self.notifier.emit(ModelEvent::FiguresChanged);
        if !keep_lights && !self.lights.is_empty() {
            self.lights.clear();
            self.notifier.emit(ModelEvent::LightsChanged);
        }
    }

    // ── managers ──

    /// The main vertex manager.
    #[inline]
    pub fn manager(&self) -> &VertexManager {
        &self.main
    }

    /// Mutable main manager. Structural edits made through this bypass
    /// change events; call [`mark_figures_changed`] afterwards.
    ///
    /// [`mark_figures_changed`]: Model::mark_figures_changed
    #[inline]
    pub fn manager_mut(&mut self) -> &mut VertexManager {
        &mut self.main
    }

    /// Attaches a custom manager (overlay or debug geometry). Whether its
    /// bbox counts toward [`bbox`] follows the manager's
    /// `expand_model_bbox` setting.
    ///
    /// [`bbox`]: Model::bbox
    pub fn attach_manager(&mut self, mgr: VertexManager) {
        self.custom.push(mgr);
        self.notifier.emit(ModelEvent::FiguresChanged);
    }

    /// Detaches a custom manager by name.
    pub fn detach_manager(&mut self, name: &str) -> Option<VertexManager> {
        let at = self.custom.iter().position(|m| m.name() == name)?;
        let mgr = self.custom.remove(at);
        self.notifier.emit(ModelEvent::FiguresChanged);
        Some(mgr)
    }

    #[inline]
    pub fn custom_managers(&self) -> &[VertexManager] {
        &self.custom
    }

    /// All managers in draw order: main first, then custom in attach
    /// order.
    pub fn managers(&self) -> impl Iterator<Item = &VertexManager> {
        std::iter::once(&self.main).chain(self.custom.iter())
    }

    pub fn managers_mut(&mut self) -> impl Iterator<Item = &mut VertexManager> {
        std::iter::once(&mut self.main).chain(self.custom.iter_mut())
    }

    /// Recomputes vertex normals in every manager.
    pub fn rebuild_normals(&mut self) {
        self.main.rebuild_normals();
        for m in &mut self.custom {
            m.rebuild_normals();
        }
    }

    // ── figures (delegating to the main manager) ──

    pub fn add_points(&mut self, name: Option<&str>, pts: &[Vec3], color: Option<Color>) -> FigureId {
        let id = self.main.add_points(name, pts, color);
        self.notifier.emit(ModelEvent::FiguresChanged);
        id
    }

    pub fn add_lines(&mut self, name: Option<&str>, segs: &[LineSeg], color: Option<Color>) -> FigureId {
        let id = self.main.add_lines(name, segs, color);
        self.notifier.emit(ModelEvent::FiguresChanged);
        id
    }

    pub fn add_triangles(
        &mut self,
        name: Option<&str>,
        tris: &[[Vec3; 3]],
        color: Option<Color>,
    ) -> FigureId {
        let id = self.main.add_triangles(name, tris, color);
        self.notifier.emit(ModelEvent::FiguresChanged);
        id
    }

    pub fn add_figure_vertices(
        &mut self,
        name: Option<&str>,
        kind: FigureKind,
        verts: &[Vertex],
    ) -> FigureId {
        let id = self.main.add_figure_vertices(name, kind, verts);
        self.notifier.emit(ModelEvent::FiguresChanged);
        id
    }

    pub fn remove_figure(&mut self, id: FigureId) -> Option<Figure> {
        let fig = self.main.remove_figure(id)?;
        self.selection.retain(|(f, _)| *f != id);
        self.notifier.emit(ModelEvent::FiguresChanged);
        Some(fig)
    }

    /// Batch removal; emits a single change event. Returns how many of the
    /// ids were actually present.
    pub fn remove_figures(&mut self, ids: &[FigureId]) -> usize {
        let mut removed = 0;
        for &id in ids {
            if self.main.remove_figure(id).is_some() {
                self.selection.retain(|(f, _)| *f != id);
                removed += 1;
            }
        }
        if removed > 0 {
            self.notifier.emit(ModelEvent::FiguresChanged);
        }
        removed
    }

    #[inline]
    pub fn figure(&self, id: FigureId) -> Option<&Figure> {
        self.main.figure(id)
    }

    /// Figures across all managers, main first.
    pub fn figures(&self) -> impl Iterator<Item = &Figure> {
        self.managers().flat_map(|m| m.figures())
    }

    pub fn figure_count(&self) -> usize {
        self.managers().map(|m| m.figure_count()).sum()
    }

    /// Announces out-of-band figure edits made through [`manager_mut`].
    ///
    /// [`manager_mut`]: Model::manager_mut
    pub fn mark_figures_changed(&mut self) {
        self.notifier.emit(ModelEvent::FiguresChanged);
    }

    /// Aggregate bounding box: the main manager plus every custom manager
    /// that opted into bbox participation.
    pub fn bbox(&self) -> BBox {
        let mut b = self.main.bbox().clone();
        for m in &self.custom {
            if m.expands_model_bbox() {
                b.union(m.bbox());
            }
        }
        b
    }

    // ── lights ──

    #[inline]
    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Adds a light, returning its index.
    pub fn add_light(&mut self, light: PointLight) -> usize {
        self.lights.push(light);
        self.notifier.emit(ModelEvent::LightsChanged);
        self.lights.len() - 1
    }

    pub fn remove_light(&mut self, index: usize) -> Option<PointLight> {
        if index >= self.lights.len() {
            return None;
        }
        let light = self.lights.remove(index);
        self.notifier.emit(ModelEvent::LightsChanged);
        Some(light)
    }

    /// Edits one light in place through a closure. Returns false for an
    /// out-of-range index.
    pub fn update_light(&mut self, index: usize, f: impl FnOnce(&mut PointLight)) -> bool {
        let Some(light) = self.lights.get_mut(index) else {
            return false;
        };
        f(light);
        self.notifier.emit(ModelEvent::LightsChanged);
        true
    }

    /// Replaces all lights at once (view restore).
    pub fn set_lights(&mut self, lights: Vec<PointLight>) {
        self.lights = lights;
        self.notifier.emit(ModelEvent::LightsChanged);
    }

    pub fn active_light_count(&self) -> usize {
        self.lights.iter().filter(|l| l.active).count()
    }

    /// Normalizes every light's linear/quadratic attenuation by the model
    /// bbox's largest dimension, making falloff scale-independent. The
    /// constant factor stays untouched.
    pub fn setup_light_attenuation(&mut self, adjust_linear: f32, adjust_quadratic: f32) {
        let reference = self.bbox().max_dimension();
        for light in &mut self.lights {
            light.setup_attenuation(adjust_linear, adjust_quadratic, reference);
        }
        self.notifier.emit(ModelEvent::LightsChanged);
    }

    // ── selection ──

    /// Toggles selection of one primitive, flipping the selected flag on
    /// each of its vertices. Returns the new selection state, or `None`
    /// for an unknown figure/primitive.
    ///
    /// Vertices shared between selected primitives carry the flip parity:
    /// selecting two primitives that share a vertex leaves that vertex's
    /// flag off. [`clear_selection`] re-flips every tracked primitive and
    /// is therefore an exact inverse.
    ///
    /// [`clear_selection`]: Model::clear_selection
    pub fn toggle_primitive_selection(&mut self, fig: FigureId, prim: usize) -> Option<bool> {
        self.main.figure(fig)?.primitive_indices(prim)?;
        let key = (fig, prim);
        let selected = if self.selection.remove(&key) {
            false
        } else {
            self.selection.insert(key);
            true
        };
        self.flip_primitive_flags(fig, prim);
        self.notifier.emit(ModelEvent::SelectionChanged);
        Some(selected)
    }

    /// Unselects everything, restoring all vertex flags.
    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let entries: Vec<_> = std::mem::take(&mut self.selection).into_iter().collect();
        for (fig, prim) in entries {
            self.flip_primitive_flags(fig, prim);
        }
        self.notifier.emit(ModelEvent::SelectionChanged);
    }

    /// Selected `(figure, primitive)` pairs in stable order.
    pub fn selection(&self) -> impl Iterator<Item = (FigureId, usize)> + '_ {
        self.selection.iter().copied()
    }

    pub fn selection_count(&self) -> usize {
        self.selection.len()
    }

    pub fn is_primitive_selected(&self, fig: FigureId, prim: usize) -> bool {
        self.selection.contains(&(fig, prim))
    }

    /// Serializes the selected primitives as figure command text, one
    /// command per primitive (clipboard copy).
    pub fn selection_to_figcmd(&self) -> String {
        let mut cmds = Vec::with_capacity(self.selection.len());
        for &(fig_id, prim) in &self.selection {
            let Some(fig) = self.main.figure(fig_id) else { continue };
            let Some(idx) = fig.primitive_indices(prim) else { continue };
            let pos = |i: u32| self.main.vertex(i).map(|v| v.position).unwrap_or([0.0; 3]);
            cmds.push(match fig.kind() {
                FigureKind::Points => FigCmd::Point(pos(idx[0])),
                FigureKind::Lines => FigCmd::Line([pos(idx[0]), pos(idx[1])]),
                FigureKind::Triangles => FigCmd::Triangle([pos(idx[0]), pos(idx[1]), pos(idx[2])]),
            });
        }
        figcmd::to_string(&cmds)
    }

    /// Adds one figure per command in `text` (clipboard paste). Returns
    /// the new figure ids.
    pub fn add_figcmd(&mut self, text: &str) -> Result<Vec<FigureId>, figcmd::ParseError> {
        let cmds = figcmd::parse_str(text)?;
        let mut ids = Vec::with_capacity(cmds.len());
        for cmd in &cmds {
            ids.push(match cmd {
                FigCmd::Point(p) => self.main.add_points(None, &[Vec3::from(*p)], None),
                FigCmd::Line([a, b]) => self
                    .main
                    .add_lines(None, &[LineSeg::new(Vec3::from(*a), Vec3::from(*b))], None),
                FigCmd::Triangle([a, b, c]) => self.main.add_triangles(
                    None,
                    &[[Vec3::from(*a), Vec3::from(*b), Vec3::from(*c)]],
                    None,
                ),
            });
        }
        if !ids.is_empty() {
            self.notifier.emit(ModelEvent::FiguresChanged);
        }
        Ok(ids)
    }

    // ── change notification ──

    #[inline]
    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Subscribes a redraw signal to every model event. The typical wiring
    /// is one signal per control sharing this model.
    pub fn attach_redraw(&mut self, signal: &RedrawSignal) -> ListenerId {
        let s = signal.clone();
        self.notifier.subscribe(move |_| s.set())
    }

    // ── helpers ──

    fn flip_primitive_flags(&mut self, fig: FigureId, prim: usize) {
        let Some(indices) = self
            .main
            .figure(fig)
            .and_then(|f| f.primitive_indices(prim))
            .map(<[u32]>::to_vec)
        else {
            return;
        };
        for idx in indices {
            let selected = self.main.vertex(idx).is_some_and(|v| v.is_selected());
            self.main.set_vertex_selected(idx, !selected);
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("main", &self.main)
            .field("custom", &self.custom.len())
            .field("lights", &self.lights.len())
            .field("selection", &self.selection.len())
            .field("invalidated", &self.invalidated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::DEFAULT_TOL;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tri(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [Vec3; 3] {
        [Vec3::from(a), Vec3::from(b), Vec3::from(c)]
    }

    // ── rebuild life-cycle ──

    #[test]
    fn rebuild_runs_once_per_invalidation_cycle() {
        let calls = Rc::new(RefCell::new(0));
        let c = Rc::clone(&calls);
        let mut model = Model::new().with_build(move |m, _| {
            *c.borrow_mut() += 1;
            m.add_points(None, &[Vec3::ZERO], None);
        });

        let first = ControlId::next();
        let second = ControlId::next();

        // Two controls sharing the model: only the first one rebuilds.
        assert!(model.ensure_built(first, [640, 480]));
        assert!(!model.ensure_built(second, [800, 600]));
        assert_eq!(*calls.borrow(), 1);

        model.invalidate();
        assert!(model.ensure_built(second, [800, 600]));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn build_stamp_reports_caller_and_first_build() {
        let stamps: Rc<RefCell<Vec<ViewStamp>>> = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&stamps);
        let mut model = Model::new().with_build(move |_, stamp| s.borrow_mut().push(*stamp));

        let ctl = ControlId::next();
        model.ensure_built(ctl, [320, 200]);
        model.invalidate();
        model.ensure_built(ctl, [320, 200]);

        let stamps = stamps.borrow();
        assert!(stamps[0].first_build);
        assert!(!stamps[1].first_build);
        assert_eq!(stamps[0].control, ctl);
        assert_eq!(stamps[0].size, [320, 200]);
    }

    #[test]
    fn rebuild_replaces_previous_content() {
        let mut model = Model::new().with_build(|m, _| {
            m.add_points(Some("built"), &[Vec3::ZERO], None);
        });
        let ctl = ControlId::next();
        model.ensure_built(ctl, [100, 100]);

        model.add_points(Some("extra"), &[Vec3::ONE], None);
        assert_eq!(model.figure_count(), 2);

        model.invalidate();
        model.ensure_built(ctl, [100, 100]);
        assert_eq!(model.figure_count(), 1);
        assert!(model.manager().figure_by_name("built").is_some());
    }

    #[test]
    fn ensure_without_callback_keeps_manual_content() {
        let mut model = Model::new();
        model.add_points(None, &[Vec3::ZERO], None);
        assert!(model.is_invalidated());

        assert!(!model.ensure_built(ControlId::next(), [100, 100]));
        assert!(!model.is_invalidated());
        assert_eq!(model.figure_count(), 1);
    }

    // ── content accounting ──

    #[test]
    fn single_triangle_accounting() {
        let mut model = Model::new();
        model.add_triangles(
            Some("tri"),
            &[tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])],
            None,
        );

        assert_eq!(model.manager().vertex_count(), 3);
        assert_eq!(model.figure_count(), 1);
        let bb = model.bbox();
        assert_eq!(bb.min(), Vec3::ZERO);
        assert_eq!(bb.max(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn custom_manager_bbox_participation_is_opt_in() {
        let mut model = Model::new();
        model.add_points(None, &[Vec3::ONE], None);

        let mut overlay = VertexManager::new("overlay").with_expand_model_bbox(false);
        overlay.add_points(None, &[Vec3::splat(100.0)], None);
        model.attach_manager(overlay);
        assert!(!model.bbox().contains(Vec3::splat(100.0), DEFAULT_TOL));

        let mut grower = VertexManager::new("grower");
        grower.add_points(None, &[Vec3::splat(50.0)], None);
        model.attach_manager(grower);
        assert!(model.bbox().contains(Vec3::splat(50.0), DEFAULT_TOL));
    }

    #[test]
    fn detach_manager_by_name() {
        let mut model = Model::new();
        model.attach_manager(VertexManager::new("overlay"));
        assert_eq!(model.custom_managers().len(), 1);

        assert!(model.detach_manager("nope").is_none());
        let detached = model.detach_manager("overlay").unwrap();
        assert_eq!(detached.name(), "overlay");
        assert!(model.custom_managers().is_empty());
    }

    #[test]
    fn clear_keeps_lights_when_asked() {
        let mut model = Model::new();
        model.add_points(None, &[Vec3::ZERO], None);
        model.add_light(PointLight::new(Vec3::ONE));

        model.clear(true);
        assert_eq!(model.figure_count(), 0);
        assert_eq!(model.lights().len(), 1);

        model.clear(false);
        assert!(model.lights().is_empty());
    }

    // ── lights ──

    #[test]
    fn attenuation_setup_uses_model_bbox() {
        let mut model = Model::new();
        model.add_triangles(
            None,
            &[tri([0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 4.0, 0.0])],
            None,
        );
        model.add_light(PointLight::new(Vec3::new(0.0, 5.0, 5.0)));

        model.setup_light_attenuation(5.0, 2.0);
        let light = &model.lights()[0];
        assert_eq!(light.linear, 0.5);
        assert_eq!(light.quadratic, 0.2);
        assert_eq!(light.constant, 1.0);
    }

    #[test]
    fn active_light_count_skips_inactive() {
        let mut model = Model::new();
        model.add_light(PointLight::new(Vec3::X));
        let idx = model.add_light(PointLight::new(Vec3::Y));
        model.update_light(idx, |l| l.active = false);
        assert_eq!(model.lights().len(), 2);
        assert_eq!(model.active_light_count(), 1);
    }

    // ── selection ──

    #[test]
    fn selection_flip_parity_on_shared_vertices() {
        let mut model = Model::new();
        // Two triangles sharing the (0,0,0)-(1,1,0) edge.
        let id = model.add_triangles(
            None,
            &[
                tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
                tri([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
            ],
            None,
        );

        assert_eq!(model.toggle_primitive_selection(id, 0), Some(true));
        assert_eq!(model.toggle_primitive_selection(id, 1), Some(true));
        assert_eq!(model.selection_count(), 2);

        let flag = |m: &Model, p: [f32; 3]| {
            let idx = m.manager().find_vertex(Vec3::from(p), DEFAULT_TOL).unwrap();
            m.manager().vertex(idx).unwrap().is_selected()
        };
        // Shared vertices were flipped twice and ended up unselected.
        assert!(!flag(&model, [0.0, 0.0, 0.0]));
        assert!(!flag(&model, [1.0, 1.0, 0.0]));
        assert!(flag(&model, [1.0, 0.0, 0.0]));
        assert!(flag(&model, [0.0, 1.0, 0.0]));

        // Clearing re-flips both primitives and restores all flags.
        model.clear_selection();
        assert_eq!(model.selection_count(), 0);
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]] {
            assert!(!flag(&model, p));
        }
    }

    #[test]
    fn toggle_unknown_primitive_is_none() {
        let mut model = Model::new();
        let id = model.add_points(None, &[Vec3::ZERO], None);
        assert_eq!(model.toggle_primitive_selection(id, 5), None);
        assert_eq!(model.selection_count(), 0);
    }

    #[test]
    fn removing_a_figure_drops_its_selection_entries() {
        let mut model = Model::new();
        let id = model.add_triangles(
            None,
            &[tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])],
            None,
        );
        model.toggle_primitive_selection(id, 0);
        assert_eq!(model.selection_count(), 1);

        model.remove_figure(id);
        assert_eq!(model.selection_count(), 0);
    }

    // ── figcmd exchange ──

    #[test]
    fn selection_copies_and_pastes_as_figcmd() {
        let mut model = Model::new();
        let pt = model.add_points(None, &[Vec3::new(1.0, 2.0, 3.0)], None);
        let line = model.add_lines(None, &[LineSeg::new(Vec3::ZERO, Vec3::X)], None);
        let triangle = model.add_triangles(
            None,
            &[tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])],
            None,
        );
        model.toggle_primitive_selection(pt, 0);
        model.toggle_primitive_selection(line, 0);
        model.toggle_primitive_selection(triangle, 0);

        let text = model.selection_to_figcmd();
        assert_eq!(text.lines().count(), 3);

        let mut pasted = Model::new();
        let ids = pasted.add_figcmd(&text).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(pasted.figure_count(), 3);
        assert!(pasted.bbox().contains(Vec3::new(1.0, 2.0, 3.0), DEFAULT_TOL));
    }

    #[test]
    fn malformed_figcmd_adds_nothing() {
        let mut model = Model::new();
        let err = model.add_figcmd("POINT 0,0,0\nBLOB 1,1,1").unwrap_err();
        assert_eq!(err.line, 2);
        // Parsing happens up front, so a bad paste is all-or-nothing.
        assert_eq!(model.figure_count(), 0);
    }

    // ── change notification ──

    #[test]
    fn model_events_set_the_redraw_signal() {
        let mut model = Model::new();
        let signal = RedrawSignal::new();
        model.attach_redraw(&signal);

        model.add_points(None, &[Vec3::ZERO], None);
        assert!(signal.take());

        model.add_light(PointLight::default());
        assert!(signal.take());

        model.invalidate();
        assert!(signal.is_set());
    }
}
