use glam::Vec3;

/// Angular step between adjacent canonical views.
pub const STD_VIEW_ANGLE_DEG: f32 = 45.0;

/// One canonical view direction on the 45-degree yaw/pitch grid.
///
/// Yaw 0 / pitch 0 is the front view (camera on +Z looking at the
/// origin); yaw turns counterclockwise seen from above, pitch raises the
/// camera toward +Y.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewPreset {
    pub yaw_deg: f32,
    pub pitch_deg: f32,
}

impl ViewPreset {
    pub const FRONT: Self = Self::new(0.0, 0.0);
    pub const RIGHT: Self = Self::new(90.0, 0.0);
    pub const BACK: Self = Self::new(180.0, 0.0);
    pub const LEFT: Self = Self::new(270.0, 0.0);
    pub const TOP: Self = Self::new(0.0, 90.0);
    pub const BOTTOM: Self = Self::new(0.0, -90.0);

    /// Three-quarter view, the usual startup framing.
    pub const ISO: Self = Self::new(45.0, 45.0);

    pub const fn new(yaw_deg: f32, pitch_deg: f32) -> Self {
        Self { yaw_deg, pitch_deg }
    }

    /// Steps away from this preset on the grid; pitch clamps at the
    /// poles, yaw wraps.
    pub fn offset(self, yaw_steps: i32, pitch_steps: i32) -> Self {
        Self::new(
            (self.yaw_deg + yaw_steps as f32 * STD_VIEW_ANGLE_DEG).rem_euclid(360.0),
            (self.pitch_deg + pitch_steps as f32 * STD_VIEW_ANGLE_DEG).clamp(-90.0, 90.0),
        )
    }

    /// Unit direction from the view target toward the camera.
    pub fn direction(self) -> Vec3 {
        let (sy, cy) = self.yaw_deg.to_radians().sin_cos();
        let (sp, cp) = self.pitch_deg.to_radians().sin_cos();
        Vec3::new(cp * sy, sp, cp * cy)
    }

    /// Camera up vector for this direction, continuous across the poles
    /// (the pitch derivative of [`direction`], so straight-down views keep
    /// a well-defined orientation).
    ///
    /// [`direction`]: ViewPreset::direction
    pub fn up(self) -> Vec3 {
        let (sy, cy) = self.yaw_deg.to_radians().sin_cos();
        let (sp, cp) = self.pitch_deg.to_radians().sin_cos();
        Vec3::new(-sp * sy, cp, -sp * cy)
    }
}

/// The 26 view-cube presets: 6 faces, 12 edges, 8 corners.
pub fn all_presets() -> Vec<ViewPreset> {
    let mut v = vec![
        ViewPreset::FRONT,
        ViewPreset::RIGHT,
        ViewPreset::BACK,
        ViewPreset::LEFT,
        ViewPreset::TOP,
        ViewPreset::BOTTOM,
    ];
    // Equatorial edges between side faces.
    for yaw in [45.0, 135.0, 225.0, 315.0] {
        v.push(ViewPreset::new(yaw, 0.0));
    }
    // Edges between side faces and top/bottom.
    for yaw in [0.0, 90.0, 180.0, 270.0] {
        v.push(ViewPreset::new(yaw, 45.0));
        v.push(ViewPreset::new(yaw, -45.0));
    }
    // Corners.
    for yaw in [45.0, 135.0, 225.0, 315.0] {
        v.push(ViewPreset::new(yaw, 45.0));
        v.push(ViewPreset::new(yaw, -45.0));
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_six_distinct_presets() {
        let all = all_presets();
        assert_eq!(all.len(), 26);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b, "duplicate preset {a:?}");
            }
        }
    }

    #[test]
    fn directions_and_ups_are_orthonormal() {
        for p in all_presets() {
            let d = p.direction();
            let u = p.up();
            assert!((d.length() - 1.0).abs() < 1e-5, "{p:?}");
            assert!((u.length() - 1.0).abs() < 1e-5, "{p:?}");
            assert!(d.dot(u).abs() < 1e-5, "{p:?}");
        }
    }

    #[test]
    fn face_presets_sit_on_the_axes() {
        assert!((ViewPreset::FRONT.direction() - Vec3::Z).length() < 1e-6);
        assert!((ViewPreset::RIGHT.direction() - Vec3::X).length() < 1e-6);
        assert!((ViewPreset::BACK.direction() - Vec3::NEG_Z).length() < 1e-5);
        assert!((ViewPreset::TOP.direction() - Vec3::Y).length() < 1e-6);
        // Looking straight down, up faces away from the viewer's chin.
        assert!((ViewPreset::TOP.up() - Vec3::NEG_Z).length() < 1e-6);
        assert!((ViewPreset::BOTTOM.up() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn offset_wraps_yaw_and_clamps_pitch() {
        let p = ViewPreset::LEFT.offset(3, 0);
        assert_eq!(p.yaw_deg, 45.0);
        let q = ViewPreset::TOP.offset(0, 1);
        assert_eq!(q.pitch_deg, 90.0);
        assert_eq!(ViewPreset::FRONT.offset(1, 1), ViewPreset::ISO);
    }
}
