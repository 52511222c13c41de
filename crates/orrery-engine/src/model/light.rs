use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Point light with Phong color components and distance attenuation.
///
/// The position is model-local: the renderer applies the control's model
/// matrix before uploading, so lights orbit with the scene. Attenuation
/// follows the usual `1 / (c + l*d + q*d²)` falloff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,

    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,

    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,

    /// Inactive lights are skipped by the renderer entirely (no shadow
    /// pass, no contribution).
    pub active: bool,

    /// Draw a marker point at the light position.
    pub show_point: bool,
}

impl PointLight {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ambient: Color::GRAY.scaled(0.6),
            diffuse: Color::WHITE.scaled(0.8),
            specular: Color::WHITE,
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
            active: true,
            show_point: false,
        }
    }

    /// Sets attenuation factors normalized by the scene size.
    ///
    /// `reference` is the model bounding box's largest dimension; dividing
    /// the adjusters by it makes the falloff independent of the scene's
    /// absolute scale. The constant factor is deliberately left unscaled.
    pub fn setup_attenuation(&mut self, adjust_linear: f32, adjust_quadratic: f32, reference: f32) {
        if reference <= 0.0 {
            log::debug!("attenuation setup skipped: empty or degenerate reference size");
            return;
        }
        self.linear = adjust_linear / reference;
        self.quadratic = adjust_quadratic / reference;
    }

    /// The light's GPU block, with the position mapped to world space.
    pub fn gpu(&self, model_matrix: Mat4) -> GpuPointLight {
        let world = model_matrix.transform_point3(self.position);
        GpuPointLight {
            position: [world.x, world.y, world.z, if self.active { 1.0 } else { 0.0 }],
            ambient: self.ambient.to_array(),
            diffuse: self.diffuse.to_array(),
            specular: self.specular.to_array(),
            attenuation: [self.constant, self.linear, self.quadratic, 0.0],
        }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// `PointLight` as laid out in the shader storage block.
///
/// Five vec4s, matching `struct PointLight` in `main.frag`: position (w =
/// active), three color components, attenuation (x/y/z = c/l/q). Keep in
/// sync with the GLSL declaration.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_normalizes_by_reference() {
        let mut light = PointLight::new(Vec3::ZERO);
        light.setup_attenuation(5.0, 2.0, 10.0);
        assert_eq!(light.linear, 0.5);
        assert_eq!(light.quadratic, 0.2);
        assert_eq!(light.constant, 1.0);
    }

    #[test]
    fn attenuation_skips_degenerate_reference() {
        let mut light = PointLight::new(Vec3::ZERO);
        light.linear = 0.25;
        light.setup_attenuation(5.0, 2.0, 0.0);
        assert_eq!(light.linear, 0.25);
    }

    #[test]
    fn gpu_block_is_five_vec4s() {
        assert_eq!(std::mem::size_of::<GpuPointLight>(), 80);
    }

    #[test]
    fn gpu_position_is_world_space_with_active_flag() {
        let mut light = PointLight::new(Vec3::new(1.0, 0.0, 0.0));
        let m = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let gpu = light.gpu(m);
        assert_eq!(gpu.position, [1.0, 2.0, 0.0, 1.0]);

        light.active = false;
        assert_eq!(light.gpu(m).position[3], 0.0);
    }
}
