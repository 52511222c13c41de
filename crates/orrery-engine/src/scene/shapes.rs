//! Triangle and line builders for common shapes.
//!
//! Builders return raw geometry (triangle triples or segments) so callers
//! decide which manager and figure they land in. Triangle winding is
//! counter-clockwise seen from outside, matching the renderer's default
//! front face.

use std::f32::consts::TAU;

use glam::{Mat4, Vec3};

use crate::RenderError;
use crate::geom::{BBox, DEFAULT_TOL, LineSeg, world_matrix};

/// Axis-aligned box as 12 triangles, outward winding.
pub fn cuboid(center: Vec3, size: Vec3) -> Vec<[Vec3; 3]> {
    let h = size * 0.5;
    let lo = center - h;
    let hi = center + h;
    let p = |x: bool, y: bool, z: bool| {
        Vec3::new(
            if x { hi.x } else { lo.x },
            if y { hi.y } else { lo.y },
            if z { hi.z } else { lo.z },
        )
    };

    let mut tris = Vec::with_capacity(12);
    // -Z, +Z, -X, +X, -Y, +Y.
    quad(&mut tris, p(false, false, false), p(false, true, false), p(true, true, false), p(true, false, false));
    quad(&mut tris, p(false, false, true), p(true, false, true), p(true, true, true), p(false, true, true));
    quad(&mut tris, p(false, false, false), p(false, false, true), p(false, true, true), p(false, true, false));
    quad(&mut tris, p(true, false, false), p(true, true, false), p(true, true, true), p(true, false, true));
    quad(&mut tris, p(false, false, false), p(true, false, false), p(true, false, true), p(false, false, true));
    quad(&mut tris, p(false, true, false), p(false, true, true), p(true, true, true), p(true, true, false));
    tris
}

/// Latitude/longitude sphere triangulation.
///
/// `slices` is the longitude count (min 3), `stacks` the latitude count
/// (min 2). Pole caps emit single triangles instead of degenerate quads.
pub fn uv_sphere(center: Vec3, radius: f32, slices: u32, stacks: u32) -> Vec<[Vec3; 3]> {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let point = |si: u32, ti: u32| {
        let theta = TAU * si as f32 / slices as f32;
        let phi = std::f32::consts::PI * (ti as f32 / stacks as f32 - 0.5);
        center
            + Vec3::new(
                phi.cos() * theta.cos(),
                phi.sin(),
                phi.cos() * theta.sin(),
            ) * radius
    };

    let mut tris = Vec::new();
    for ti in 0..stacks {
        for si in 0..slices {
            let (a, b) = (point(si, ti), point(si + 1, ti));
            let (c, d) = (point(si + 1, ti + 1), point(si, ti + 1));
            if ti == 0 {
                // Bottom cap: a == b at the pole.
                tris.push([a, d, c]);
            } else if ti == stacks - 1 {
                // Top cap: c == d at the pole.
                tris.push([a, d, b]);
            } else {
                tris.push([a, c, b]);
                tris.push([a, d, c]);
            }
        }
    }
    tris
}

/// Thick line: a square-section prism around the segment, as 12 triangles.
///
/// Fails on degenerate (zero-length) segments, which have no defined
/// cross-section orientation.
pub fn fat_line(seg: LineSeg, thickness: f32) -> Result<Vec<[Vec3; 3]>, RenderError> {
    if seg.is_degenerate(DEFAULT_TOL) {
        return Err(RenderError::InvalidLineLength);
    }
    let dir = seg.dir();
    let u = dir.any_orthonormal_vector();
    let v = dir.cross(u);
    let frame = world_matrix(seg.from, u, v, dir);
    let len = seg.length();

    // A cuboid in the segment frame, mapped back to world.
    let local = cuboid(Vec3::new(0.0, 0.0, len * 0.5), Vec3::new(thickness, thickness, len));
    Ok(local
        .into_iter()
        .map(|t| t.map(|p| frame.transform_point3(p)))
        .collect())
}

/// Circle outline as `segments` chords in the plane orthogonal to `normal`.
pub fn circle_lines(center: Vec3, normal: Vec3, radius: f32, segments: u32) -> Vec<LineSeg> {
    let segments = segments.max(3);
    let n = normal.normalize_or_zero();
    if n == Vec3::ZERO {
        return Vec::new();
    }
    let u = n.any_orthonormal_vector();
    let v = n.cross(u);
    let at = |i: u32| {
        let a = TAU * i as f32 / segments as f32;
        center + (u * a.cos() + v * a.sin()) * radius
    };
    (0..segments).map(|i| LineSeg::new(at(i), at(i + 1))).collect()
}

/// The 12 edges of a bounding box, in world space. Empty boxes produce no
/// segments.
pub fn bbox_wireframe(bbox: &BBox) -> Vec<LineSeg> {
    if bbox.is_empty() {
        return Vec::new();
    }
    let c = bbox.corners();
    // Corner index bits: 1 = +x, 2 = +y, 4 = +z.
    const EDGES: [(usize, usize); 12] = [
        (0, 1), (2, 3), (4, 5), (6, 7), // x edges
        (0, 2), (1, 3), (4, 6), (5, 7), // y edges
        (0, 4), (1, 5), (2, 6), (3, 7), // z edges
    ];
    EDGES.iter().map(|&(a, b)| LineSeg::new(c[a], c[b])).collect()
}

/// Wireframe of the view frustum for a combined projection * view matrix:
/// near quad, far quad and the four connecting edges.
pub fn frustum_lines(view_projection: Mat4) -> Vec<LineSeg> {
    let inv = view_projection.inverse();
    let unproject = |x: f32, y: f32, z: f32| {
        let p = inv * glam::Vec4::new(x, y, z, 1.0);
        p.truncate() / p.w
    };
    let n = [
        unproject(-1.0, -1.0, -1.0),
        unproject(1.0, -1.0, -1.0),
        unproject(1.0, 1.0, -1.0),
        unproject(-1.0, 1.0, -1.0),
    ];
    let f = [
        unproject(-1.0, -1.0, 1.0),
        unproject(1.0, -1.0, 1.0),
        unproject(1.0, 1.0, 1.0),
        unproject(-1.0, 1.0, 1.0),
    ];
    let mut segs = Vec::with_capacity(12);
    for i in 0..4 {
        segs.push(LineSeg::new(n[i], n[(i + 1) % 4]));
        segs.push(LineSeg::new(f[i], f[(i + 1) % 4]));
        segs.push(LineSeg::new(n[i], f[i]));
    }
    segs
}

fn quad(out: &mut Vec<[Vec3; 3]>, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
    out.push([a, b, c]);
    out.push([a, c, d]);
}
