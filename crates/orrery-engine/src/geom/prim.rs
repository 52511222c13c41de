use glam::{Mat4, Vec3};

use crate::geom::{basis_x, basis_y, origin_of};

/// Line segment between two world points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineSeg {
    pub from: Vec3,
    pub to: Vec3,
}

impl LineSeg {
    #[inline]
    pub fn new(from: Vec3, to: Vec3) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.to - self.from).length()
    }

    #[inline]
    pub fn midpoint(&self) -> Vec3 {
        (self.from + self.to) * 0.5
    }

    /// Unit direction, zero for degenerate segments.
    #[inline]
    pub fn dir(&self) -> Vec3 {
        (self.to - self.from).normalize_or_zero()
    }

    #[inline]
    pub fn is_degenerate(&self, tol: f32) -> bool {
        self.length() <= tol
    }
}

/// Planar quadrilateral defined by a frame and an extent, used for
/// textured quads (text glyphs, image figures).
#[derive(Debug, Copy, Clone)]
pub struct Plate {
    /// Corners in order: origin, +x, +x+y, +y.
    pub corners: [Vec3; 4],
}

impl Plate {
    /// Builds a plate spanning `width` along the frame X basis and
    /// `height` along the frame Y basis, anchored at the frame origin.
    pub fn from_frame(frame: Mat4, width: f32, height: f32) -> Self {
        let o = origin_of(frame);
        let dx = basis_x(frame) * width;
        let dy = basis_y(frame) * height;
        Self {
            corners: [o, o + dx, o + dx + dy, o + dy],
        }
    }

    /// Two triangles covering the plate, winding counter-clockwise when
    /// viewed from the frame +Z side.
    pub fn triangles(&self) -> [[Vec3; 3]; 2] {
        let [a, b, c, d] = self.corners;
        [[a, b, c], [a, c, d]]
    }

    /// Texture coordinates matching [`Plate::triangles`], with `v` growing
    /// toward the frame +Y edge.
    pub fn triangle_uvs() -> [[[f32; 2]; 3]; 2] {
        let (a, b, c, d) = ([0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]);
        [[a, b, c], [a, c, d]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{DEFAULT_TOL, world_matrix};

    #[test]
    fn seg_basics() {
        let s = LineSeg::new(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0));
        assert!((s.length() - 5.0).abs() < 1e-6);
        assert_eq!(s.midpoint(), Vec3::new(1.5, 0.0, 2.0));
        assert!((s.dir() - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
        assert!(!s.is_degenerate(DEFAULT_TOL));
        assert!(LineSeg::new(Vec3::ONE, Vec3::ONE).is_degenerate(DEFAULT_TOL));
    }

    #[test]
    fn plate_triangles_cover_the_quad() {
        let frame = world_matrix(Vec3::new(1.0, 0.0, 0.0), Vec3::X, Vec3::Y, Vec3::Z);
        let plate = Plate::from_frame(frame, 2.0, 1.0);
        assert_eq!(plate.corners[0], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(plate.corners[2], Vec3::new(3.0, 1.0, 0.0));
        let tris = plate.triangles();
        // Shared diagonal between the two triangles.
        assert_eq!(tris[0][2], tris[1][1]);
        assert_eq!(tris[0][0], tris[1][0]);
    }

    #[test]
    fn plate_uv_corners_match_geometry_order() {
        let uvs = Plate::triangle_uvs();
        assert_eq!(uvs[0][0], [0.0, 0.0]);
        assert_eq!(uvs[1][2], [0.0, 1.0]);
    }
}
