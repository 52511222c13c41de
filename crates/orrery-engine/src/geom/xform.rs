use glam::{Mat4, Vec3, Vec4};

/// Builds a frame matrix from an origin and three basis vectors.
///
/// Columns are the basis, translation is the origin, so the result maps
/// frame coordinates to world coordinates.
#[inline]
pub fn world_matrix(origin: Vec3, bx: Vec3, by: Vec3, bz: Vec3) -> Mat4 {
    Mat4::from_cols(
        bx.extend(0.0),
        by.extend(0.0),
        bz.extend(0.0),
        origin.extend(1.0),
    )
}

/// Translation component of a frame matrix.
#[inline]
pub fn origin_of(m: Mat4) -> Vec3 {
    m.w_axis.truncate()
}

#[inline]
pub fn basis_x(m: Mat4) -> Vec3 {
    m.x_axis.truncate()
}

#[inline]
pub fn basis_y(m: Mat4) -> Vec3 {
    m.y_axis.truncate()
}

#[inline]
pub fn basis_z(m: Mat4) -> Vec3 {
    m.z_axis.truncate()
}

/// Rotation of `angle` radians about an axis direction anchored at `pivot`.
///
/// Composes as `T(pivot) * R(axis, angle) * T(-pivot)`, so applying the
/// result leaves `pivot` fixed.
pub fn rotation_about_axis_pivot(axis: Vec3, angle: f32, pivot: Vec3) -> Mat4 {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return Mat4::IDENTITY;
    }
    Mat4::from_translation(pivot)
        * Mat4::from_axis_angle(axis, angle)
        * Mat4::from_translation(-pivot)
}

/// True when both matrices agree component-wise within `tol`.
pub fn mat4_tol_eq(a: Mat4, b: Mat4, tol: f32) -> bool {
    let d = a - b;
    [d.x_axis, d.y_axis, d.z_axis, d.w_axis]
        .iter()
        .all(|c: &Vec4| c.abs().max_element() <= tol)
}
