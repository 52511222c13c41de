use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;

use crate::RenderError;

/// GLSL sources for the stages of one program. Stages left `None` are
/// simply not attached; at least one stage is required.
#[derive(Debug, Default, Copy, Clone)]
pub struct ShaderSources<'a> {
    pub vertex: Option<&'a str>,
    pub geometry: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl ShaderSources<'_> {
    pub fn has_any_stage(&self) -> bool {
        self.vertex.is_some() || self.geometry.is_some() || self.fragment.is_some()
    }
}

/// Compiled and linked shader program with name-based uniform access.
///
/// Uniform locations are resolved on first use and cached. A name the
/// linker discarded resolves to `None`: the first lookup logs a warning,
/// every later set against it is a silent no-op. [`require`] turns absent
/// names into hard errors for embedders that want the strict behavior.
///
/// GL objects are deleted in [`destroy`], not on drop, since deletion
/// needs the context current.
///
/// [`require`]: ShaderProgram::require
/// [`destroy`]: ShaderProgram::destroy
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    program: glow::Program,
    label: String,
    uniforms: HashMap<String, Option<glow::UniformLocation>>,
}

impl ShaderProgram {
    /// Compiles the given stages and links them.
    ///
    /// `label` shows up in logs and error messages only.
    pub fn build(
        gl: Arc<glow::Context>,
        label: &str,
        sources: ShaderSources<'_>,
    ) -> Result<Self, RenderError> {
        if !sources.has_any_stage() {
            return Err(RenderError::NoShaderStages);
        }

        let stage_table = [
            (glow::VERTEX_SHADER, "vertex", sources.vertex),
            (glow::GEOMETRY_SHADER, "geometry", sources.geometry),
            (glow::FRAGMENT_SHADER, "fragment", sources.fragment),
        ];

        unsafe {
            let program = gl.create_program().map_err(RenderError::ResourceAlloc)?;
            let mut attached = Vec::new();

            for (ty, stage, src) in stage_table {
                let Some(src) = src else { continue };
                let shader = match gl.create_shader(ty) {
                    Ok(s) => s,
                    Err(e) => {
                        cleanup(&gl, program, &attached);
                        return Err(RenderError::ResourceAlloc(e));
                    }
                };
                gl.shader_source(shader, src);
                gl.compile_shader(shader);
                if !gl.get_shader_compile_status(shader) {
                    let log = gl.get_shader_info_log(shader);
                    gl.delete_shader(shader);
                    cleanup(&gl, program, &attached);
                    return Err(RenderError::ShaderCompile { stage, log });
                }
                gl.attach_shader(program, shader);
                attached.push(shader);
            }

            gl.link_program(program);
            let linked = gl.get_program_link_status(program);
            for shader in &attached {
                gl.detach_shader(program, *shader);
                gl.delete_shader(*shader);
            }
            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(RenderError::ShaderLink { log });
            }

            log::debug!("linked shader program '{label}'");
            Ok(Self {
                gl,
                program,
                label: label.to_owned(),
                uniforms: HashMap::new(),
            })
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Makes this program current.
    pub fn bind(&self) {
        unsafe { self.gl.use_program(Some(self.program)) };
    }

    /// Attribute location by name, `None` if absent.
    pub fn attrib_location(&self, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(self.program, name) }
    }

    /// Verifies that every listed uniform exists, for strict embedders.
    pub fn require(&mut self, names: &[&str]) -> Result<(), RenderError> {
        for name in names {
            if self.location(name).is_none() {
                return Err(RenderError::MissingUniform {
                    program: self.label.clone(),
                    name: (*name).to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Binds a shader storage block to a buffer binding point.
    ///
    /// Returns false (with a one-time warning) when the block name does
    /// not exist in the program.
    pub fn bind_storage_block(&mut self, name: &str, binding: u32) -> bool {
        unsafe {
            match self.gl.get_shader_storage_block_index(self.program, name) {
                Some(index) => {
                    self.gl.shader_storage_block_binding(self.program, index, binding);
                    true
                }
                None => {
                    // Route through the uniform cache for the warn-once.
                    let _ = self.location(name);
                    false
                }
            }
        }
    }

    pub fn set_bool(&mut self, name: &str, v: bool) {
        self.set_i32(name, v as i32);
    }

    pub fn set_i32(&mut self, name: &str, v: i32) {
        if let Some(loc) = self.location(name) {
            unsafe { self.gl.uniform_1_i32(Some(&loc), v) };
        }
    }

    pub fn set_f32(&mut self, name: &str, v: f32) {
        if let Some(loc) = self.location(name) {
            unsafe { self.gl.uniform_1_f32(Some(&loc), v) };
        }
    }

    pub fn set_vec2(&mut self, name: &str, v: Vec2) {
        if let Some(loc) = self.location(name) {
            unsafe { self.gl.uniform_2_f32(Some(&loc), v.x, v.y) };
        }
    }

    pub fn set_vec3(&mut self, name: &str, v: Vec3) {
        if let Some(loc) = self.location(name) {
            unsafe { self.gl.uniform_3_f32(Some(&loc), v.x, v.y, v.z) };
        }
    }

    pub fn set_vec4(&mut self, name: &str, v: Vec4) {
        if let Some(loc) = self.location(name) {
            unsafe { self.gl.uniform_4_f32(Some(&loc), v.x, v.y, v.z, v.w) };
        }
    }

    pub fn set_mat4(&mut self, name: &str, m: Mat4) {
        if let Some(loc) = self.location(name) {
            unsafe {
                self.gl
                    .uniform_matrix_4_f32_slice(Some(&loc), false, &m.to_cols_array())
            };
        }
    }

    /// Deletes the GL program. The context must be current.
    pub fn destroy(&mut self) {
        unsafe { self.gl.delete_program(self.program) };
        self.uniforms.clear();
    }

    fn location(&mut self, name: &str) -> Option<glow::UniformLocation> {
        if let Some(cached) = self.uniforms.get(name) {
            return cached.clone();
        }
        let loc = unsafe { self.gl.get_uniform_location(self.program, name) };
        if loc.is_none() {
            log::warn!(
                "shader '{}': uniform or block '{}' not present in linked program",
                self.label,
                name
            );
        }
        self.uniforms.insert(name.to_owned(), loc.clone());
        loc
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("label", &self.label)
            .field("cached_uniforms", &self.uniforms.len())
            .finish()
    }
}

fn cleanup(gl: &glow::Context, program: glow::Program, attached: &[glow::Shader]) {
    unsafe {
        for shader in attached {
            gl.detach_shader(program, *shader);
            gl.delete_shader(*shader);
        }
        gl.delete_program(program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_report_stage_presence() {
        assert!(!ShaderSources::default().has_any_stage());
        let s = ShaderSources { vertex: Some("void main() {}"), ..Default::default() };
        assert!(s.has_any_stage());
    }
}
