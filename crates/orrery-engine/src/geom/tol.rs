use glam::Vec3;

/// Default length tolerance for vertex deduplication and general
/// coordinate comparison.
pub const DEFAULT_TOL: f32 = 1e-5;

/// Coarser tolerance for interactive hit testing, where pointer precision
/// dominates numeric precision.
pub const HIT_TOL: f32 = 1e-2;

/// Quantized position key. Two positions within tolerance of each other
/// map to the same key (up to the usual boundary straddle, which the
/// tolerance contract accepts).
pub type PosKey = [i64; 3];

/// Quantizes a scalar onto the tolerance grid.
#[inline]
pub fn quantize(v: f32, tol: f32) -> i64 {
    debug_assert!(tol > 0.0);
    (v as f64 / tol as f64).round() as i64
}

/// Builds the deduplication key for a position.
///
/// The key is the grid cell index per component. Keys are exact integers,
/// so they are hashable and never drift the way accumulated float
/// comparisons do.
#[inline]
pub fn pos_key(p: Vec3, tol: f32) -> PosKey {
    [quantize(p.x, tol), quantize(p.y, tol), quantize(p.z, tol)]
}

/// Tolerance-based scalar equality.
#[inline]
pub fn tol_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}

/// Tolerance-based component-wise vector equality.
#[inline]
pub fn tol_eq_vec3(a: Vec3, b: Vec3, tol: f32) -> bool {
    tol_eq(a.x, b.x, tol) && tol_eq(a.y, b.y, tol) && tol_eq(a.z, b.z, tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_rounds_to_grid() {
        assert_eq!(quantize(0.0, 1e-5), 0);
        assert_eq!(quantize(1.0, 1e-5), 100_000);
        assert_eq!(quantize(1.000004, 1e-5), 100_000);
        assert_eq!(quantize(-1.0, 1e-5), -100_000);
    }

    #[test]
    fn nearby_points_share_a_key() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(1.000_001, 2.0, 2.999_999);
        assert_eq!(pos_key(a, DEFAULT_TOL), pos_key(b, DEFAULT_TOL));
    }

    #[test]
    fn distinct_points_get_distinct_keys() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.001, 0.0, 0.0);
        assert_ne!(pos_key(a, DEFAULT_TOL), pos_key(b, DEFAULT_TOL));
    }

    #[test]
    fn hit_tol_is_coarser() {
        let a = Vec3::ZERO;
        let b = Vec3::new(0.004, 0.0, 0.0);
        assert_ne!(pos_key(a, DEFAULT_TOL), pos_key(b, DEFAULT_TOL));
        assert_eq!(pos_key(a, HIT_TOL), pos_key(b, HIT_TOL));
    }

    #[test]
    fn tol_eq_vec3_componentwise() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        assert!(tol_eq_vec3(a, a + Vec3::splat(1e-6), DEFAULT_TOL));
        assert!(!tol_eq_vec3(a, a + Vec3::new(1e-3, 0.0, 0.0), DEFAULT_TOL));
    }
}
