//! Render controls: per-viewport camera, projection, interaction and the
//! multi-pass frame driver.
//!
//! A [`RenderControl`] is the per-viewport half of the engine. Any number
//! of controls can share one [`Model`]; each owns its camera, projection,
//! display toggles and redraw flag, and renders through a shared
//! [`GlContext`](crate::gl::GlContext) into its own
//! [`RenderDevice`](crate::device::RenderDevice).
//!
//! Interaction follows the usual CAD conventions: wheel zoom toward the
//! target, cursor-anchored pan, an orbit widget with axis-constrained
//! zones, and the 26 canonical view presets.

mod cache;
mod camera;
mod hover;
mod orbit;
mod presets;
mod render;
mod viewnfo;

pub use camera::{
    Camera, DEFAULT_FAR, DEFAULT_FOV_Y_DEG, DEFAULT_NEAR, Projection, ndc_pan_scale,
    normalized_planes, ortho_fit_zoom,
};
pub use hover::Debounce;
pub use orbit::{OrbitDrag, OrbitGeometry, OrbitZone};
pub use presets::{STD_VIEW_ANGLE_DEG, ViewPreset, all_presets};
pub use viewnfo::ViewNfo;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use glam::{Mat4, Vec2, Vec3};

use crate::color::Color;
use crate::control::cache::Cached;
use crate::geom::BBox;
use crate::model::Model;
use crate::notify::{ListenerId, RedrawSignal};
use crate::scene::Figure;
use crate::time::{FrameClock, RenderStats};

/// Wheel zoom step, as a fraction of the camera-target distance.
const ZOOM_STEP: f32 = 0.1;

/// Process-unique identity of a render control, used by the model to tell
/// rebuild callers apart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u64);

impl ControlId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ctl-{}", self.0)
    }
}

/// Per-viewport render state and interaction.
pub struct RenderControl {
    id: ControlId,
    size: [u32; 2],

    camera: Camera,
    projection: Projection,
    model_matrix: Mat4,

    view_cache: Cached<Mat4>,
    proj_cache: Cached<Mat4>,

    // display toggles
    clear_color: Color,
    wireframe: bool,
    shade_with_edge: bool,
    show_normals: bool,
    use_shadows: bool,
    use_textures: bool,
    show_model_bbox: bool,
    show_vertices: bool,
    point_size: f32,
    override_color: Option<Color>,
    override_material: Option<[f32; 3]>,
    selection_color: Color,
    edge_color: Color,
    normals_color: Color,

    /// Extra view-projection matrices visualized as wire frustums
    /// (typically the other controls looking at the same model).
    overlay_frustums: Vec<Mat4>,

    figure_filter: Option<Box<dyn Fn(&Figure) -> bool>>,

    orbit_drag: Option<OrbitDrag>,
    pending_preset: Option<ViewPreset>,

    redraw: RedrawSignal,
    is_rendering: bool,
    clock: FrameClock,
    stats: RenderStats,
    hover: Debounce,
}

impl RenderControl {
    pub fn new() -> Self {
        let control = Self {
            id: ControlId::next(),
            size: [1, 1],
            camera: Camera::default(),
            projection: Projection::default(),
            model_matrix: Mat4::IDENTITY,
            view_cache: Cached::new(Mat4::IDENTITY),
            proj_cache: Cached::new(Mat4::IDENTITY),
            clear_color: Color::WHITE,
            wireframe: false,
            shade_with_edge: false,
            show_normals: false,
            use_shadows: true,
            use_textures: true,
            show_model_bbox: false,
            show_vertices: false,
            point_size: 6.0,
            override_color: None,
            override_material: None,
            selection_color: Color::RED,
            edge_color: Color::BLACK,
            normals_color: Color::BLUE,
            overlay_frustums: Vec::new(),
            figure_filter: None,
            orbit_drag: None,
            pending_preset: None,
            redraw: RedrawSignal::new(),
            is_rendering: false,
            clock: FrameClock::new(),
            stats: RenderStats::default(),
            hover: Debounce::new(Duration::from_millis(250)),
        };
        log::debug!("{} created", control.id);
        control
    }

    #[inline]
    pub fn id(&self) -> ControlId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// Sets the render target size. Normally driven by the device at
    /// frame start; call directly when interacting before the first
    /// frame.
    pub fn set_size(&mut self, size: [u32; 2]) {
        let size = [size[0].max(1), size[1].max(1)];
        if self.size != size {
            self.size = size;
            self.proj_cache.invalidate();
            self.redraw.set();
        }
    }

    fn aspect(&self) -> f32 {
        self.size[0] as f32 / self.size[1].max(1) as f32
    }

    // ── camera & projection state ──

    #[inline]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.view_changed();
    }

    pub fn set_camera_pos(&mut self, pos: Vec3) {
        self.camera.pos = pos;
        self.view_changed();
    }

    pub fn set_camera_target(&mut self, target: Vec3) {
        self.camera.target = target;
        self.view_changed();
    }

    pub fn set_camera_up(&mut self, up: Vec3) {
        self.camera.up = up;
        self.view_changed();
    }

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn set_perspective(&mut self, perspective: bool) {
        self.projection.perspective = perspective;
        self.view_cache.invalidate();
        self.projection_changed();
    }

    pub fn set_fov_y_deg(&mut self, fov: f32) {
        self.projection.fov_y_deg = fov.clamp(1.0, 179.0);
        self.projection_changed();
    }

    pub fn set_planes(&mut self, near: f32, far: f32) {
        self.projection.near = near;
        self.projection.far = far;
        self.projection_changed();
    }

    pub fn set_ortho_zoom(&mut self, zoom: f32) {
        self.projection.ortho_zoom = zoom.max(1e-4);
        self.projection_changed();
    }

    #[inline]
    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn set_model_matrix(&mut self, m: Mat4) {
        self.model_matrix = m;
        self.redraw.set();
    }

    /// View matrix, recomputed only after a camera change.
    pub fn view_matrix(&mut self) -> Mat4 {
        let camera = self.camera;
        *self.view_cache.get_or_update(|| camera.view_matrix())
    }

    /// Projection matrix. The perspective branch is cached against
    /// fov/planes/size; the orthographic branch auto-ranges to the scene
    /// and is derived fresh each call.
    pub fn projection_matrix(&mut self, model: &Model) -> Mat4 {
        if self.projection.perspective {
            let projection = self.projection;
            let aspect = self.aspect();
            *self.proj_cache.get_or_update(|| projection.matrix(aspect, &BBox::new()))
        } else {
            let content = model.bbox().transformed(self.view_matrix() * self.model_matrix);
            self.projection.matrix(self.aspect(), &content)
        }
    }

    fn view_changed(&mut self) {
        self.view_cache.invalidate();
        self.redraw.set();
    }

    fn projection_changed(&mut self) {
        self.proj_cache.invalidate();
        self.redraw.set();
    }

    // ── zoom / pan / fit ──

    /// Wheel zoom. Positive steps zoom in: perspective moves the camera
    /// toward the target by `ZOOM_STEP * distance` per step, orthographic
    /// scales multiplicatively.
    pub fn zoom(&mut self, steps: f32) {
        if self.projection.perspective {
            self.camera.dolly((steps * ZOOM_STEP).clamp(-8.0, 0.9));
            self.view_changed();
        } else {
            let factor = (1.0 - steps * ZOOM_STEP).max(0.01);
            self.projection.ortho_zoom = (self.projection.ortho_zoom * factor).max(1e-4);
            self.projection_changed();
        }
    }

    /// Pans by a cursor delta in pixels so the grabbed content follows
    /// the cursor.
    pub fn pan(&mut self, delta_px: Vec2, model: &Model) {
        let ndc = Vec2::new(
            2.0 * delta_px.x / self.size[0].max(1) as f32,
            -2.0 * delta_px.y / self.size[1].max(1) as f32,
        );
        let proj = self.projection_matrix(model);
        let scale = ndc_pan_scale(proj, self.projection.perspective, self.camera.distance());
        let offset = self.camera.local_x() * (-ndc.x * scale.x)
            + self.camera.local_y() * (-ndc.y * scale.y);
        self.camera.pan(offset);
        self.view_changed();
    }

    /// Frames the whole model: perspective moves the camera along its
    /// view direction until the worst bbox corner touches the frustum,
    /// orthographic picks the zoom that the overflowing axis dictates.
    /// No-op while the model is empty.
    pub fn zoom_to_fit(&mut self, model: &Model) {
        let bbox = model.bbox();
        if bbox.is_empty() {
            return;
        }
        if self.projection.perspective {
            let corners = bbox.corners().map(|c| self.model_matrix.transform_point3(c));
            self.camera
                .fit_perspective(&corners, self.projection.fov_y_deg, self.aspect());
            self.view_changed();
        } else {
            let content = bbox.transformed(self.view_matrix() * self.model_matrix);
            let size = content.size();
            if let Some(zoom) = ortho_fit_zoom(Vec2::new(size.x, size.y), self.aspect()) {
                self.projection.ortho_zoom = zoom;
                self.projection_changed();
            }
        }
    }

    // ── orbit ──

    /// Starts an orbit gesture at a cursor position (pixels).
    pub fn orbit_begin(&mut self, cursor: Vec2, model: &Model) {
        let pivot = model.bbox().middle();
        let geometry = OrbitGeometry::for_size(self.size);
        let view = self.view_matrix();
        self.orbit_drag = Some(OrbitDrag::begin(
            geometry,
            cursor,
            self.model_matrix,
            pivot,
            view,
        ));
    }

    /// Updates the model rotation for the current cursor position.
    pub fn orbit_move(&mut self, cursor: Vec2) {
        if let Some(drag) = &self.orbit_drag {
            self.model_matrix = drag.model_for(cursor);
            self.redraw.set();
        }
    }

    pub fn orbit_end(&mut self) {
        self.orbit_drag = None;
    }

    #[inline]
    pub fn is_orbiting(&self) -> bool {
        self.orbit_drag.is_some()
    }

    /// Orbit zone under a cursor position, for hover feedback.
    pub fn orbit_zone(&self, cursor: Vec2) -> OrbitZone {
        OrbitGeometry::for_size(self.size).zone(cursor)
    }

    // ── presets ──

    /// Moves to a canonical view: resets the model rotation, places the
    /// camera along the preset direction at the current distance and fits
    /// the scene. While the model is still empty the preset is remembered
    /// and applied on the first frame with content.
    pub fn apply_preset(&mut self, preset: ViewPreset, model: &Model) {
        let bbox = model.bbox();
        if bbox.is_empty() {
            self.pending_preset = Some(preset);
            self.redraw.set();
            return;
        }
        self.pending_preset = None;
        self.model_matrix = Mat4::IDENTITY;

        let target = bbox.middle();
        let distance = self.camera.distance().max(1e-3);
        self.camera = Camera::new(target + preset.direction() * distance, target, preset.up());
        self.view_changed();
        self.zoom_to_fit(model);
    }

    #[inline]
    pub fn pending_preset(&self) -> Option<ViewPreset> {
        self.pending_preset
    }

    // ── display toggles ──

    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
        self.redraw.set();
    }

    #[inline]
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn set_wireframe(&mut self, on: bool) {
        self.wireframe = on;
        self.redraw.set();
    }

    #[inline]
    pub fn shade_with_edge(&self) -> bool {
        self.shade_with_edge
    }

    pub fn set_shade_with_edge(&mut self, on: bool) {
        self.shade_with_edge = on;
        self.redraw.set();
    }

    #[inline]
    pub fn show_normals(&self) -> bool {
        self.show_normals
    }

    pub fn set_show_normals(&mut self, on: bool) {
        self.show_normals = on;
        self.redraw.set();
    }

    #[inline]
    pub fn use_shadows(&self) -> bool {
        self.use_shadows
    }

    pub fn set_use_shadows(&mut self, on: bool) {
        self.use_shadows = on;
        self.redraw.set();
    }

    #[inline]
    pub fn use_textures(&self) -> bool {
        self.use_textures
    }

    pub fn set_use_textures(&mut self, on: bool) {
        self.use_textures = on;
        self.redraw.set();
    }

    #[inline]
    pub fn show_model_bbox(&self) -> bool {
        self.show_model_bbox
    }

    pub fn set_show_model_bbox(&mut self, on: bool) {
        self.show_model_bbox = on;
        self.redraw.set();
    }

    #[inline]
    pub fn show_vertices(&self) -> bool {
        self.show_vertices
    }

    pub fn set_show_vertices(&mut self, on: bool) {
        self.show_vertices = on;
        self.redraw.set();
    }

    #[inline]
    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn set_point_size(&mut self, px: f32) {
        self.point_size = px.max(1.0);
        self.redraw.set();
    }

    #[inline]
    pub fn override_color(&self) -> Option<Color> {
        self.override_color
    }

    pub fn set_override_color(&mut self, color: Option<Color>) {
        self.override_color = color;
        self.redraw.set();
    }

    #[inline]
    pub fn override_material(&self) -> Option<[f32; 3]> {
        self.override_material
    }

    /// Global material strengths override (ambient, diffuse, specular).
    pub fn set_override_material(&mut self, material: Option<[f32; 3]>) {
        self.override_material = material;
        self.redraw.set();
    }

    #[inline]
    pub fn selection_color(&self) -> Color {
        self.selection_color
    }

    pub fn set_selection_color(&mut self, color: Color) {
        self.selection_color = color;
        self.redraw.set();
    }

    #[inline]
    pub fn edge_color(&self) -> Color {
        self.edge_color
    }

    pub fn set_edge_color(&mut self, color: Color) {
        self.edge_color = color;
        self.redraw.set();
    }

    #[inline]
    pub fn normals_color(&self) -> Color {
        self.normals_color
    }

    pub fn set_normals_color(&mut self, color: Color) {
        self.normals_color = color;
        self.redraw.set();
    }

    /// Replaces the set of wire frustums drawn over the scene (pass the
    /// `projection * view` of each other control to visualize).
    pub fn set_overlay_frustums(&mut self, view_projections: Vec<Mat4>) {
        self.overlay_frustums = view_projections;
        self.redraw.set();
    }

    /// Restricts rendering to figures the predicate accepts.
    pub fn set_figure_filter(&mut self, f: impl Fn(&Figure) -> bool + 'static) {
        self.figure_filter = Some(Box::new(f));
        self.redraw.set();
    }

    pub fn clear_figure_filter(&mut self) {
        self.figure_filter = None;
        self.redraw.set();
    }

    // ── redraw / stats ──

    /// Wires this control's redraw flag to a model's change events.
    pub fn observe(&mut self, model: &mut Model) -> ListenerId {
        model.attach_redraw(&self.redraw)
    }

    /// A clone of the redraw flag, for event loops that want to poll it.
    pub fn redraw_signal(&self) -> RedrawSignal {
        self.redraw.clone()
    }

    pub fn request_redraw(&self) {
        self.redraw.set();
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.redraw.is_set()
    }

    #[inline]
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }
}

impl Default for RenderControl {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderControl")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("perspective", &self.projection.perspective)
            .field("frames", &self.stats.frame_count)
            .finish()
    }
}
