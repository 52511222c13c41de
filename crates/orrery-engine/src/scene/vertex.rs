use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::color::Color;

/// Flag bit: vertex belongs to a selected primitive.
pub const VERTEX_SELECTED: u32 = 1 << 0;

/// Default material strengths (ambient, diffuse, specular).
pub const DEFAULT_MATERIAL: [f32; 3] = [0.8, 0.6, 0.4];

/// Interleaved vertex, uploaded to the GPU as-is.
///
/// The layout is `#[repr(C)]` with no padding (15 floats + one u32, 64
/// bytes) and must stay in sync with the attribute pointers configured in
/// `gl::context` and the `layout(location = ...)` declarations in the
/// shader sources.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    /// Material strengths: ambient, diffuse, specular.
    pub material: [f32; 3],
    pub uv: [f32; 2],
    /// Bit flags, see [`VERTEX_SELECTED`].
    pub flags: u32,
}

impl Vertex {
    /// Vertex at a position with default color, material and zero normal.
    pub fn at(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: [0.0; 3],
            color: Color::WHITE.to_array(),
            material: DEFAULT_MATERIAL,
            uv: [0.0; 2],
            flags: 0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color.to_array();
        self
    }

    pub fn with_uv(mut self, uv: [f32; 2]) -> Self {
        self.uv = uv;
        self
    }

    pub fn with_material(mut self, material: [f32; 3]) -> Self {
        self.material = material;
        self
    }

    #[inline]
    pub fn position_vec3(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[inline]
    pub fn normal_vec3(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.flags & VERTEX_SELECTED != 0
    }

    #[inline]
    pub fn set_selected(&mut self, selected: bool) {
        if selected {
            self.flags |= VERTEX_SELECTED;
        } else {
            self.flags &= !VERTEX_SELECTED;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        // The GL attribute pointers assume this exact stride.
        assert_eq!(std::mem::size_of::<Vertex>(), 64);
        assert_eq!(std::mem::offset_of!(Vertex, normal), 12);
        assert_eq!(std::mem::offset_of!(Vertex, color), 24);
        assert_eq!(std::mem::offset_of!(Vertex, material), 40);
        assert_eq!(std::mem::offset_of!(Vertex, uv), 52);
        assert_eq!(std::mem::offset_of!(Vertex, flags), 60);
    }

    #[test]
    fn selection_flag_round_trip() {
        let mut v = Vertex::at(Vec3::ONE);
        assert!(!v.is_selected());
        v.set_selected(true);
        assert!(v.is_selected());
        v.set_selected(false);
        assert!(!v.is_selected());
    }

    #[test]
    fn builder_setters() {
        let v = Vertex::at(Vec3::ZERO)
            .with_color(Color::RED)
            .with_uv([0.5, 1.0])
            .with_material([1.0, 0.0, 0.0]);
        assert_eq!(v.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(v.uv, [0.5, 1.0]);
        assert_eq!(v.material, [1.0, 0.0, 0.0]);
    }
}
