use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::geom::rotation_about_axis_pivot;

/// Interaction zones of the orbit control, hit-tested from the viewport
/// center.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrbitZone {
    /// Mini circles above/below the main circle: rotation about the view
    /// X axis only.
    Vertical,
    /// Mini circles left/right of the main circle: rotation about the
    /// view Y axis only.
    Horizontal,
    /// Inside the main circle: free arcball rotation.
    Ball,
    /// Outside the main circle: roll about the view direction.
    Roll,
}

/// Screen-space layout of the orbit zones.
#[derive(Debug, Copy, Clone)]
pub struct OrbitGeometry {
    pub center: Vec2,
    pub main_radius: f32,
    pub knob_radius: f32,
}

impl OrbitGeometry {
    /// Standard layout: the main circle fills 90% of the smaller viewport
    /// half-extent, the four knobs sit on it at 15% of its radius.
    pub fn for_size(size: [u32; 2]) -> Self {
        let w = size[0].max(1) as f32;
        let h = size[1].max(1) as f32;
        let main_radius = w.min(h) * 0.5 * 0.9;
        Self {
            center: Vec2::new(w * 0.5, h * 0.5),
            main_radius,
            knob_radius: main_radius * 0.15,
        }
    }

    /// Zone under a cursor position (pixels, origin top-left). The knobs
    /// win over the main circle where they overlap it.
    pub fn zone(&self, p: Vec2) -> OrbitZone {
        let dx = Vec2::new(self.main_radius, 0.0);
        let dy = Vec2::new(0.0, self.main_radius);
        if p.distance(self.center - dy) <= self.knob_radius
            || p.distance(self.center + dy) <= self.knob_radius
        {
            return OrbitZone::Vertical;
        }
        if p.distance(self.center - dx) <= self.knob_radius
            || p.distance(self.center + dx) <= self.knob_radius
        {
            return OrbitZone::Horizontal;
        }
        if p.distance(self.center) <= self.main_radius {
            OrbitZone::Ball
        } else {
            OrbitZone::Roll
        }
    }

    /// Maps a cursor position onto the unit hemisphere over the main
    /// circle; positions outside the circle land on its equator.
    pub fn ball_vector(&self, p: Vec2) -> Vec3 {
        let x = (p.x - self.center.x) / self.main_radius;
        let y = (self.center.y - p.y) / self.main_radius;
        let d2 = x * x + y * y;
        if d2 <= 1.0 {
            Vec3::new(x, y, (1.0 - d2).sqrt())
        } else {
            Vec3::new(x, y, 0.0).normalize()
        }
    }
}

/// One orbit gesture, from press to release.
///
/// The gesture snapshots the model matrix and the view basis at press
/// time; every cursor position derives the full rotation from that
/// snapshot, so dragging back to the press point restores the press
/// matrix exactly and long drags accumulate no incremental drift.
#[derive(Debug, Clone)]
pub struct OrbitDrag {
    geometry: OrbitGeometry,
    zone: OrbitZone,
    press: Vec2,
    press_model: Mat4,
    /// Rotation pivot in world coordinates.
    pivot: Vec3,
    axis_x: Vec3,
    axis_y: Vec3,
    axis_z: Vec3,
}

impl OrbitDrag {
    /// Starts a gesture at `press`. `pivot_local` is the rotation pivot
    /// in model coordinates (the scene bbox middle); `view` is the view
    /// matrix at press time.
    pub fn begin(
        geometry: OrbitGeometry,
        press: Vec2,
        press_model: Mat4,
        pivot_local: Vec3,
        view: Mat4,
    ) -> Self {
        // Rows of the view rotation are the camera axes in world space.
        let basis = Mat3::from_mat4(view).transpose();
        Self {
            geometry,
            zone: geometry.zone(press),
            press,
            press_model,
            pivot: press_model.transform_point3(pivot_local),
            axis_x: basis.x_axis,
            axis_y: basis.y_axis,
            axis_z: basis.z_axis,
        }
    }

    #[inline]
    pub fn zone(&self) -> OrbitZone {
        self.zone
    }

    /// Model matrix for the current cursor position.
    pub fn model_for(&self, cursor: Vec2) -> Mat4 {
        let rot = match self.zone {
            OrbitZone::Vertical => {
                let angle = (cursor.y - self.press.y) / self.geometry.main_radius;
                rotation_about_axis_pivot(self.axis_x, angle, self.pivot)
            }
            OrbitZone::Horizontal => {
                let angle = (cursor.x - self.press.x) / self.geometry.main_radius;
                rotation_about_axis_pivot(self.axis_y, angle, self.pivot)
            }
            OrbitZone::Ball => {
                let v0 = self.geometry.ball_vector(self.press);
                let v1 = self.geometry.ball_vector(cursor);
                let axis_view = v0.cross(v1);
                if axis_view.length_squared() < 1e-12 {
                    return self.press_model;
                }
                let angle = v0.dot(v1).clamp(-1.0, 1.0).acos();
                let axis =
                    self.axis_x * axis_view.x + self.axis_y * axis_view.y + self.axis_z * axis_view.z;
                rotation_about_axis_pivot(axis, angle, self.pivot)
            }
            OrbitZone::Roll => {
                let a0 = polar_angle(self.geometry.center, self.press);
                let a1 = polar_angle(self.geometry.center, cursor);
                rotation_about_axis_pivot(self.axis_z, a1 - a0, self.pivot)
            }
        };
        rot * self.press_model
    }
}

/// Angle of `p` around `center` in math convention (y up, counterclockwise
/// positive), from screen coordinates (y down).
fn polar_angle(center: Vec2, p: Vec2) -> f32 {
    (center.y - p.y).atan2(p.x - center.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Camera;
    use crate::geom::mat4_tol_eq;

    fn geometry() -> OrbitGeometry {
        // 800x600: center (400, 300), main radius 270, knob radius 40.5.
        OrbitGeometry::for_size([800, 600])
    }

    fn drag_at(press: Vec2, press_model: Mat4) -> OrbitDrag {
        let view = Camera::default().view_matrix();
        OrbitDrag::begin(geometry(), press, press_model, Vec3::ZERO, view)
    }

    #[test]
    fn zones_cover_the_viewport() {
        let g = geometry();
        assert_eq!(g.zone(Vec2::new(400.0, 30.0)), OrbitZone::Vertical);
        assert_eq!(g.zone(Vec2::new(400.0, 570.0)), OrbitZone::Vertical);
        assert_eq!(g.zone(Vec2::new(130.0, 300.0)), OrbitZone::Horizontal);
        assert_eq!(g.zone(Vec2::new(670.0, 300.0)), OrbitZone::Horizontal);
        assert_eq!(g.zone(Vec2::new(400.0, 300.0)), OrbitZone::Ball);
        assert_eq!(g.zone(Vec2::new(450.0, 350.0)), OrbitZone::Ball);
        assert_eq!(g.zone(Vec2::new(10.0, 10.0)), OrbitZone::Roll);
    }

    #[test]
    fn ball_vectors_span_the_hemisphere() {
        let g = geometry();
        assert!((g.ball_vector(g.center) - Vec3::Z).length() < 1e-6);

        let rim = g.ball_vector(g.center + Vec2::new(g.main_radius, 0.0));
        assert!((rim - Vec3::X).length() < 1e-6);

        let far = g.ball_vector(g.center + Vec2::new(5000.0, 0.0));
        assert!((far.length() - 1.0).abs() < 1e-6);
        assert_eq!(far.z, 0.0);
    }

    #[test]
    fn returning_to_the_press_point_restores_the_snapshot() {
        let press_model = Mat4::from_rotation_y(0.7);
        let press = Vec2::new(420.0, 320.0);
        let drag = drag_at(press, press_model);
        assert_eq!(drag.zone(), OrbitZone::Ball);

        let _wandered = drag.model_for(Vec2::new(600.0, 150.0));
        assert!(mat4_tol_eq(drag.model_for(press), press_model, 1e-5));
    }

    #[test]
    fn vertical_drag_tips_the_top_toward_the_viewer() {
        // Press in the top knob, drag down one radius: one radian about
        // the view X axis.
        let drag = drag_at(Vec2::new(400.0, 30.0), Mat4::IDENTITY);
        assert_eq!(drag.zone(), OrbitZone::Vertical);

        let m = drag.model_for(Vec2::new(400.0, 300.0));
        let moved = m.transform_point3(Vec3::Y);
        let angle: f32 = (300.0 - 30.0) / 270.0;
        assert!((moved - Vec3::new(0.0, angle.cos(), angle.sin())).length() < 1e-5);
        // Toward the default camera on +Z.
        assert!(moved.z > 0.0);
    }

    #[test]
    fn constrained_drags_compose_with_the_press_matrix() {
        let press_model = Mat4::from_rotation_z(1.1) * Mat4::from_translation(Vec3::X);
        let press = Vec2::new(130.0, 300.0);
        let drag = drag_at(press, press_model);
        assert_eq!(drag.zone(), OrbitZone::Horizontal);

        let cursor = Vec2::new(230.0, 300.0);
        let expected =
            rotation_about_axis_pivot(Vec3::Y, 100.0 / 270.0, press_model.transform_point3(Vec3::ZERO))
                * press_model;
        assert!(mat4_tol_eq(drag.model_for(cursor), expected, 1e-5));
    }

    #[test]
    fn roll_follows_the_cursor_around_the_center() {
        // Press right of the circle, drag a quarter turn counterclockwise
        // to the top.
        let drag = drag_at(Vec2::new(720.0, 300.0), Mat4::IDENTITY);
        assert_eq!(drag.zone(), OrbitZone::Roll);

        let m = drag.model_for(Vec2::new(400.0, -20.0));
        let moved = m.transform_point3(Vec3::X);
        assert!((moved - Vec3::Y).length() < 1e-5);
    }
}
