use glam::{Mat4, Vec3};

use crate::geom::tol_eq_vec3;

/// Axis-aligned bounding box, optionally expressed in a custom frame.
///
/// The default box is world-aligned. [`BBox::in_frame`] builds one whose
/// min/max live in the coordinate system of the given frame matrix, which
/// keeps the box tight for content that is long and thin along a rotated
/// axis.
///
/// The empty box is a first-class state: a fresh box is empty, accumulating
/// points only grows it, and consumers are expected to check
/// [`BBox::is_empty`] before using extents.
#[derive(Debug, Clone)]
pub struct BBox {
    /// `Some((world_to_frame, frame_to_world))` for frame-aware boxes.
    frame: Option<(Mat4, Mat4)>,
    min: Vec3,
    max: Vec3,
}

impl BBox {
    /// Creates an empty, world-aligned box.
    pub fn new() -> Self {
        Self {
            frame: None,
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }

    /// Creates an empty box whose extents are tracked in the coordinate
    /// system of `frame_to_world` (a rigid transform; columns are the frame
    /// basis, translation is the frame origin).
    pub fn in_frame(frame_to_world: Mat4) -> Self {
        Self {
            frame: Some((frame_to_world.inverse(), frame_to_world)),
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }

    /// Builds a world-aligned box from a point iterator.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut bbox = Self::new();
        for p in points {
            bbox.union_point(p);
        }
        bbox
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Minimum corner in frame coordinates. Meaningful only when non-empty.
    #[inline]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner in frame coordinates. Meaningful only when non-empty.
    #[inline]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Center point in world coordinates. Zero for the empty box.
    pub fn middle(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        let mid = (self.min + self.max) * 0.5;
        match &self.frame {
            Some((_, frame_to_world)) => frame_to_world.transform_point3(mid),
            None => mid,
        }
    }

    /// Extent per axis (frame coordinates). Zero for the empty box.
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Largest single-axis extent. Zero for the empty box.
    pub fn max_dimension(&self) -> f32 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    /// Diagonal length. Zero for the empty box.
    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }

    /// Grows the box to contain a world-space point.
    pub fn union_point(&mut self, p: Vec3) {
        let p = match &self.frame {
            Some((world_to_frame, _)) => world_to_frame.transform_point3(p),
            None => p,
        };
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grows the box to contain another box (via its world-space corners,
    /// so mixed-frame unions are handled correctly).
    pub fn union(&mut self, other: &BBox) {
        if other.is_empty() {
            return;
        }
        for corner in other.corners() {
            self.union_point(corner);
        }
    }

    /// The eight corners in world coordinates.
    ///
    /// Must not be called on an empty box.
    pub fn corners(&self) -> [Vec3; 8] {
        debug_assert!(!self.is_empty());
        let (lo, hi) = (self.min, self.max);
        let mut out = [Vec3::ZERO; 8];
        for (i, c) in out.iter_mut().enumerate() {
            let p = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            *c = match &self.frame {
                Some((_, frame_to_world)) => frame_to_world.transform_point3(p),
                None => p,
            };
        }
        out
    }

    /// True if the world-space point lies inside the box, with `tol` slack
    /// on every face.
    pub fn contains(&self, p: Vec3, tol: f32) -> bool {
        if self.is_empty() {
            return false;
        }
        let p = match &self.frame {
            Some((world_to_frame, _)) => world_to_frame.transform_point3(p),
            None => p,
        };
        p.x >= self.min.x - tol
            && p.y >= self.min.y - tol
            && p.z >= self.min.z - tol
            && p.x <= self.max.x + tol
            && p.y <= self.max.y + tol
            && p.z <= self.max.z + tol
    }

    /// World-aligned box covering this box after transforming it by `m`.
    pub fn transformed(&self, m: Mat4) -> BBox {
        let mut out = BBox::new();
        if self.is_empty() {
            return out;
        }
        for corner in self.corners() {
            out.union_point(m.transform_point3(corner));
        }
        out
    }

    /// An empty box with the same frame as this one.
    pub fn cleared(&self) -> BBox {
        BBox {
            frame: self.frame,
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }

    /// Tolerance equality on extents; both empty also counts as equal.
    pub fn tol_equals(&self, other: &BBox, tol: f32) -> bool {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => true,
            (false, false) => {
                tol_eq_vec3(self.min, other.min, tol) && tol_eq_vec3(self.max, other.max, tol)
            }
            _ => false,
        }
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{DEFAULT_TOL, world_matrix};
    use glam::Vec3;

    #[test]
    fn starts_empty() {
        let bbox = BBox::new();
        assert!(bbox.is_empty());
        assert_eq!(bbox.size(), Vec3::ZERO);
        assert_eq!(bbox.max_dimension(), 0.0);
        assert!(!bbox.contains(Vec3::ZERO, DEFAULT_TOL));
    }

    #[test]
    fn accumulation_only_grows() {
        let pts = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, 0.0),
            Vec3::new(2.0, -7.0, 1.0),
            Vec3::new(0.0, 0.0, 9.0),
        ];
        let mut bbox = BBox::new();
        for (i, p) in pts.iter().enumerate() {
            bbox.union_point(*p);
            // Every previously added point stays inside.
            for q in &pts[..=i] {
                assert!(bbox.contains(*q, DEFAULT_TOL), "lost {q:?} after adding {p:?}");
            }
        }
        assert_eq!(bbox.min(), Vec3::new(-4.0, -7.0, 0.0));
        assert_eq!(bbox.max(), Vec3::new(2.0, 2.0, 9.0));
    }

    #[test]
    fn union_of_boxes_covers_both() {
        let a = BBox::from_points([Vec3::ZERO, Vec3::ONE]);
        let b = BBox::from_points([Vec3::new(5.0, -1.0, 2.0)]);
        let mut u = a.clone();
        u.union(&b);
        for c in a.corners().into_iter().chain(b.corners()) {
            assert!(u.contains(c, DEFAULT_TOL));
        }
    }

    #[test]
    fn union_with_empty_is_identity() {
        let mut a = BBox::from_points([Vec3::ZERO, Vec3::ONE]);
        let before = a.clone();
        a.union(&BBox::new());
        assert!(a.tol_equals(&before, DEFAULT_TOL));
    }

    #[test]
    fn middle_and_size() {
        let bbox = BBox::from_points([Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 6.0)]);
        assert_eq!(bbox.middle(), Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(bbox.size(), Vec3::new(4.0, 4.0, 4.0));
        assert_eq!(bbox.max_dimension(), 4.0);
    }

    #[test]
    fn transformed_covers_rotated_corners() {
        let bbox = BBox::from_points([Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0)]);
        let rot = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let t = bbox.transformed(rot);
        // (2, 1, 0) rotates to (-1, 2, 0).
        assert!(t.contains(Vec3::new(-1.0, 2.0, 0.0), 1e-4));
        assert!(t.contains(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn frame_aware_box_stays_tight() {
        // A unit segment along the world diagonal: the world-aligned box has
        // a sqrt(3) diagonal, the frame-aligned one is a thin sliver.
        let dir = Vec3::ONE.normalize();
        let frame = world_matrix(
            Vec3::ZERO,
            dir,
            dir.any_orthonormal_vector(),
            dir.cross(dir.any_orthonormal_vector()),
        );
        let mut framed = BBox::in_frame(frame);
        let mut world = BBox::new();
        for t in [0.0f32, 0.25, 0.5, 0.75, 1.0] {
            framed.union_point(dir * t);
            world.union_point(dir * t);
        }
        assert!(framed.size().x > 0.99 && framed.size().x < 1.01);
        assert!(framed.size().y < 1e-5 && framed.size().z < 1e-5);
        assert!(world.size().min_element() > 0.5);
        // Both still report the same world-space center.
        assert!((framed.middle() - world.middle()).length() < 1e-5);
    }
}
