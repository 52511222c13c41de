use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::geom::BBox;

pub const DEFAULT_FOV_Y_DEG: f32 = 45.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Position/target/up triple defining the view.
///
/// All interaction math (zoom, pan, fit) manipulates these three vectors;
/// the view matrix is derived, never stored.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub pos: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub fn new(pos: Vec3, target: Vec3, up: Vec3) -> Self {
        Self { pos, target, up }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.pos, self.target, self.up)
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        (self.target - self.pos).length()
    }

    /// Unit vector from the camera toward its target.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.pos).normalize_or_zero()
    }

    /// Camera-space X axis (screen right) in world coordinates.
    pub fn local_x(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    /// Camera-space Y axis (screen up) in world coordinates.
    pub fn local_y(&self) -> Vec3 {
        self.local_x().cross(self.forward())
    }

    /// Moves the camera toward (`scale > 0`) or away from (`scale < 0`)
    /// the target by `scale * distance`. The target does not move, so
    /// `scale` must stay below 1.
    pub fn dolly(&mut self, scale: f32) {
        debug_assert!(scale < 1.0);
        self.pos += (self.target - self.pos) * scale;
    }

    /// Translates camera and target together (panning).
    pub fn pan(&mut self, offset: Vec3) {
        self.pos += offset;
        self.target += offset;
    }

    /// Moves the camera along its view direction until every corner sits
    /// inside the given perspective frustum, with the binding corner on
    /// the frustum boundary. Moves closer when the content is smaller
    /// than the frustum.
    pub fn fit_perspective(&mut self, corners: &[Vec3], fov_y_deg: f32, aspect: f32) {
        let tan_v = (fov_y_deg.to_radians() * 0.5).tan();
        let tan_h = tan_v * aspect;
        if tan_v <= 0.0 || tan_h <= 0.0 || corners.is_empty() {
            return;
        }

        let view = self.view_matrix();
        let mut shift = f32::NEG_INFINITY;
        for &c in corners {
            let v = view.transform_point3(c);
            shift = shift.max(v.x.abs() / tan_h + v.z).max(v.y.abs() / tan_v + v.z);
        }
        if !shift.is_finite() {
            return;
        }
        // Positive shift backs the camera up; never approach past the
        // target.
        let shift = shift.max(-(self.distance() - 1e-3));
        self.pos -= self.forward() * shift;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y)
    }
}

/// Projection parameters of a control.
///
/// The orthographic branch auto-ranges to the scene: its vertical extent
/// is the view-space content height scaled by `ortho_zoom`, so `ortho_zoom
/// == 1` always frames the content height exactly.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub perspective: bool,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub ortho_zoom: f32,
}

impl Projection {
    /// Projection matrix for the given aspect ratio. `view_content` is the
    /// scene bbox mapped to view space; only the orthographic branch reads
    /// it.
    pub fn matrix(&self, aspect: f32, view_content: &BBox) -> Mat4 {
        let (near, far) = normalized_planes(self.near, self.far);
        if self.perspective {
            Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), aspect, near, far)
        } else {
            let base_h = if view_content.is_empty() {
                2.0
            } else {
                view_content.size().y.max(1e-4)
            };
            let half_h = base_h * 0.5 * self.ortho_zoom.max(1e-4);
            let half_w = half_h * aspect;
            Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, near, far)
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            perspective: true,
            fov_y_deg: DEFAULT_FOV_Y_DEG,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            ortho_zoom: 1.0,
        }
    }
}

/// Usable near/far planes: the configured pair when sane, the defaults
/// otherwise (zero, negative or inverted planes show up when view files
/// are edited by hand).
pub fn normalized_planes(near: f32, far: f32) -> (f32, f32) {
    if near > 0.0 && far > near {
        (near, far)
    } else {
        log::debug!("degenerate near/far ({near}, {far}) replaced by defaults");
        (DEFAULT_NEAR, DEFAULT_FAR)
    }
}

/// World-space extent of one NDC unit along screen X/Y, measured at the
/// camera-target distance. Panning multiplies cursor NDC deltas by this.
pub fn ndc_pan_scale(proj: Mat4, perspective: bool, camera_distance: f32) -> Vec2 {
    let z_ref = if perspective { -1.0 } else { 0.0 };
    let p = proj.inverse() * Vec4::new(1.0, 1.0, z_ref, 1.0);
    let p = p / p.w;
    let k = if perspective { camera_distance / -p.z } else { 1.0 };
    Vec2::new(p.x * k, p.y * k)
}

/// Multiplicative ortho zoom that makes the view-space content fit the
/// viewport, binding on whichever axis overflows. `None` when the content
/// has no vertical extent to measure against.
pub fn ortho_fit_zoom(content_size: Vec2, aspect: f32) -> Option<f32> {
    if content_size.y <= 0.0 || aspect <= 0.0 {
        return None;
    }
    Some((content_size.x.max(0.0) / (content_size.y * aspect)).max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ndc(proj: Mat4, view: Mat4, p: Vec3) -> Vec3 {
        let clip = proj * view * p.extend(1.0);
        assert!(clip.w > 0.0, "point behind camera: {p:?}");
        clip.truncate() / clip.w
    }

    #[test]
    fn view_matrix_looks_down_negative_z() {
        let cam = Camera::default();
        let v = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!((v - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
    }

    #[test]
    fn local_axes_are_right_handed() {
        let cam = Camera::new(Vec3::new(3.0, 2.0, 8.0), Vec3::new(0.5, -1.0, 0.0), Vec3::Y);
        let (x, y, f) = (cam.local_x(), cam.local_y(), cam.forward());
        assert!((x.length() - 1.0).abs() < 1e-5);
        assert!((y.length() - 1.0).abs() < 1e-5);
        assert!(x.dot(y).abs() < 1e-5);
        assert!(x.dot(f).abs() < 1e-5);
        // x cross y points backward (toward the viewer).
        assert!((x.cross(y) + f).length() < 1e-5);
    }

    #[test]
    fn dolly_scales_the_distance() {
        let mut cam = Camera::default();
        cam.dolly(0.5);
        assert!((cam.distance() - 5.0).abs() < 1e-5);
        cam.dolly(-1.0);
        assert!((cam.distance() - 10.0).abs() < 1e-4);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn pan_moves_camera_and_target_together() {
        let mut cam = Camera::default();
        cam.pan(Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(cam.target, Vec3::new(1.0, 2.0, 0.0));
        assert!((cam.distance() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn fit_contains_all_corners_and_touches_the_worst() {
        let mut bbox = BBox::new();
        bbox.union_point(Vec3::new(-2.0, -1.0, -4.0));
        bbox.union_point(Vec3::new(3.0, 2.0, 1.0));
        let corners = bbox.corners();

        let mut cam = Camera::new(Vec3::new(10.0, 6.0, 8.0), bbox.middle(), Vec3::Y);
        let (fov, aspect) = (45.0, 1.5);
        cam.fit_perspective(&corners, fov, aspect);

        let proj = Projection { fov_y_deg: fov, ..Projection::default() }
            .matrix(aspect, &BBox::new());
        let view = cam.view_matrix();

        let mut worst: f32 = 0.0;
        for c in corners {
            let n = ndc(proj, view, c);
            assert!(n.x.abs() <= 1.001 && n.y.abs() <= 1.001, "corner escaped: {n:?}");
            worst = worst.max(n.x.abs()).max(n.y.abs());
        }
        // The binding corner sits on the frustum boundary.
        assert!(worst > 0.999, "fit left slack everywhere: {worst}");
    }

    #[test]
    fn fit_distance_grows_with_the_content() {
        let fit = |half: f32| {
            let mut bbox = BBox::new();
            bbox.union_point(Vec3::splat(-half));
            bbox.union_point(Vec3::splat(half));
            let mut cam = Camera::new(Vec3::new(8.0, 5.0, 9.0), Vec3::ZERO, Vec3::Y);
            cam.fit_perspective(&bbox.corners(), 45.0, 1.0);
            cam.distance()
        };
        assert!(fit(2.0) > fit(1.0));
        // Tiny content pulls the camera in instead of pushing it out.
        assert!(fit(0.01) < 1.0);
    }

    #[test]
    fn degenerate_planes_fall_back_to_defaults() {
        assert_eq!(normalized_planes(0.5, 100.0), (0.5, 100.0));
        assert_eq!(normalized_planes(0.0, 100.0), (DEFAULT_NEAR, DEFAULT_FAR));
        assert_eq!(normalized_planes(0.1, -2.0), (DEFAULT_NEAR, DEFAULT_FAR));
        assert_eq!(normalized_planes(50.0, 1.0), (DEFAULT_NEAR, DEFAULT_FAR));
    }

    #[test]
    fn pan_scale_perspective_matches_frustum_height() {
        let proj = Projection { fov_y_deg: 90.0, ..Projection::default() }
            .matrix(1.0, &BBox::new());
        let s = ndc_pan_scale(proj, true, 10.0);
        // tan(45 deg) = 1, so one NDC unit spans the distance itself.
        assert!((s.x - 10.0).abs() < 1e-3);
        assert!((s.y - 10.0).abs() < 1e-3);
    }

    #[test]
    fn pan_scale_ortho_matches_half_extents() {
        let mut content = BBox::new();
        content.union_point(Vec3::new(0.0, -2.0, 0.0));
        content.union_point(Vec3::new(1.0, 2.0, 0.0));
        let proj = Projection { perspective: false, ortho_zoom: 1.0, ..Projection::default() }
            .matrix(2.0, &content);
        let s = ndc_pan_scale(proj, false, 123.0);
        assert!((s.y - 2.0).abs() < 1e-4);
        assert!((s.x - 4.0).abs() < 1e-4);
    }

    #[test]
    fn ortho_matrix_frames_the_content_height() {
        let mut content = BBox::new();
        content.union_point(Vec3::new(-1.0, -3.0, -5.0));
        content.union_point(Vec3::new(1.0, 3.0, -1.0));
        let proj = Projection { perspective: false, ortho_zoom: 1.0, ..Projection::default() }
            .matrix(1.0, &content);
        // Height 6 -> half extent 3 on both axes at aspect 1.
        let top = proj * Vec4::new(0.0, 3.0, -1.0, 1.0);
        assert!((top.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ortho_fit_binds_on_the_overflowing_axis() {
        // Wider than the viewport: width binds.
        assert_eq!(ortho_fit_zoom(Vec2::new(8.0, 2.0), 2.0), Some(2.0));
        // Taller than wide: height binds at zoom 1.
        assert_eq!(ortho_fit_zoom(Vec2::new(1.0, 4.0), 2.0), Some(1.0));
        // No vertical extent to measure against.
        assert_eq!(ortho_fit_zoom(Vec2::new(3.0, 0.0), 2.0), None);
    }
}
