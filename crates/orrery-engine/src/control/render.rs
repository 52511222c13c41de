//! The per-frame render sequence.
//!
//! [`RenderControl::render_frame`] is the only entry point. One call runs
//! the whole pipeline for one control: model rebuild, shadow cube passes
//! for every active light, the lit main pass with edge/normals overlays,
//! and pixel transfer to the device. Frames only happen when the redraw
//! flag is set, so an idle viewport costs nothing.

use std::time::Instant;

use glam::{Mat4, Vec3, Vec4};

use crate::RenderError;
use crate::color::Color;
use crate::control::{RenderControl, normalized_planes};
use crate::device::RenderDevice;
use crate::geom::BBox;
use crate::gl::shaders::{FIGURE_TEXTURE_UNIT, SHADOW_MAP_UNIT};
use crate::gl::{GlContext, StorageSlot};
use crate::model::{GpuPointLight, Model, PointLight};
use crate::scene::{Figure, FigureKind, VertexManager, bbox_wireframe, frustum_lines};

const OVERLAY_WIRE_COLOR: Color = Color::GRAY;

impl RenderControl {
    /// Renders one frame into the device if the redraw flag is set.
    ///
    /// Returns `Ok(true)` when a frame was produced, `Ok(false)` when the
    /// frame was skipped: no redraw pending, zero-sized device, an empty
    /// model, or a re-entrant call from inside a rebuild callback.
    pub fn render_frame(
        &mut self,
        gl: &mut GlContext,
        model: &mut Model,
        device: &mut dyn RenderDevice,
    ) -> Result<bool, RenderError> {
        if self.is_rendering {
            return Ok(false);
        }
        let size = device.size();
        if size[0] == 0 || size[1] == 0 {
            return Ok(false);
        }
        if !self.redraw.take() {
            return Ok(false);
        }

        self.is_rendering = true;
        let started = Instant::now();
        let result = self.render_pass(gl, model, device, size);
        self.is_rendering = false;

        if let Ok(true) = result {
            let ft = self.clock.tick();
            self.stats.record(ft, started.elapsed());
            log::trace!(
                "{} frame {} rendered in {:?}",
                self.id,
                self.stats.frame_count,
                started.elapsed()
            );
        }
        result
    }

    fn render_pass(
        &mut self,
        gl: &mut GlContext,
        model: &mut Model,
        device: &mut dyn RenderDevice,
        size: [u32; 2],
    ) -> Result<bool, RenderError> {
        if self.size != size {
            self.size = size;
            self.proj_cache.invalidate();
        }

        gl.drain_retired_textures();

        if model.ensure_built(self.id, size) {
            model.rebuild_normals();
        }

        let bbox = model.bbox();
        if bbox.is_empty() {
            log::trace!("{} frame skipped: empty model", self.id);
            return Ok(false);
        }

        // A preset requested while the model was still empty applies on
        // the first frame with content.
        if let Some(preset) = self.pending_preset.take() {
            self.apply_preset(preset, model);
        }

        let view = self.view_matrix();
        let projection = self.projection_matrix(model);
        let (near, far) = normalized_planes(self.projection.near, self.projection.far);

        // World positions of the active lights. Order fixes the shadow
        // layer and storage block index each light gets.
        let light_positions: Vec<Vec3> = model
            .lights()
            .iter()
            .filter(|l| l.active)
            .map(|l| self.model_matrix.transform_point3(l.position))
            .collect();
        let light_count = light_positions.len();
        let shadows_on = self.use_shadows && light_count > 0;

        if shadows_on {
            self.shadow_pass(gl, model, &light_positions, near, far)?;
        }

        gl.bind_target(size)?;
        gl.clear(self.clear_color);

        let gpu_lights: Vec<GpuPointLight> = model
            .lights()
            .iter()
            .filter(|l| l.active)
            .map(|l| l.gpu(self.model_matrix))
            .collect();
        gl.upload_storage(StorageSlot::Lights, bytemuck::cast_slice(&gpu_lights));
        gl.bind_shadow_maps();

        {
            let p = &mut gl.main_program;
            p.bind();
            p.set_mat4("u_view", view);
            p.set_mat4("u_projection", projection);
            p.set_vec3("u_camera_pos", self.camera.pos);
            p.set_i32("u_light_count", light_count as i32);
            p.set_bool("u_use_shadows", shadows_on);
            p.set_f32("u_shadow_far", far);
            p.set_i32("u_shadow_maps", SHADOW_MAP_UNIT as i32);
            p.set_i32("u_texture", FIGURE_TEXTURE_UNIT as i32);
            p.set_f32("u_point_size", self.point_size);
            p.set_vec4("u_selection_color", Vec4::from_array(self.selection_color.to_array()));
            p.set_bool("u_override_material", self.override_material.is_some());
            if let Some(m) = self.override_material {
                p.set_vec3("u_override_material_value", Vec3::from_array(m));
            }
        }
        if self.shade_with_edge {
            let p = &mut gl.edge_program;
            p.bind();
            p.set_mat4("u_view", view);
            p.set_mat4("u_projection", projection);
            p.set_vec4("u_flat_color", Vec4::from_array(self.edge_color.to_array()));
        }
        if self.show_normals {
            let p = &mut gl.normals_program;
            p.bind();
            p.set_mat4("u_view", view);
            p.set_mat4("u_projection", projection);
            p.set_vec4("u_flat_color", Vec4::from_array(self.normals_color.to_array()));
            p.set_vec3("u_bbox_min", bbox.min());
            p.set_vec3("u_bbox_max", bbox.max());
        }

        // Per-frame overlay managers draw first, unshaded through the
        // main program: bbox wires and light markers in model space,
        // frustums of other views in world space.
        gl.main_program.bind();
        gl.main_program.set_bool("u_shaded", false);
        gl.main_program.set_bool("u_use_texture", false);
        let mut local = overlay_manager(&bbox, model.lights(), self.show_model_bbox);
        draw_flat(gl, &mut local, self.model_matrix);
        if !self.overlay_frustums.is_empty() {
            let mut world = frustum_manager(&self.overlay_frustums);
            draw_flat(gl, &mut world, Mat4::IDENTITY);
        }

        self.scene_pass(gl, model);

        if let Some(frame) = gl.read_target_pixels() {
            device.transfer_pixels(&frame);
        }
        Ok(true)
    }

    /// Depth-only passes filling one cube-map layer per active light.
    fn shadow_pass(
        &mut self,
        gl: &mut GlContext,
        model: &mut Model,
        light_positions: &[Vec3],
        near: f32,
        far: f32,
    ) -> Result<(), RenderError> {
        let mut faces: Vec<Mat4> = Vec::with_capacity(light_positions.len() * 6);
        for &pos in light_positions {
            faces.extend(shadow_face_matrices(pos, near, far));
        }
        gl.upload_storage(StorageSlot::ShadowMatrices, bytemuck::cast_slice(&faces));
        gl.bind_shadow_target(light_positions.len() as u32)?;

        gl.depth_program.bind();
        gl.depth_program.set_f32("u_shadow_far", far);
        for (index, &pos) in light_positions.iter().enumerate() {
            gl.depth_program.set_i32("u_light_index", index as i32);
            gl.depth_program.set_vec3("u_light_pos", pos);
            for manager in model.managers_mut() {
                if manager.is_empty() {
                    continue;
                }
                gl.upload_vertices(manager.gpu_vertices());
                for fig in manager.ordered_figures() {
                    if !fig.visible
                        || !fig.eval_in_shadow_map
                        || fig.kind() != FigureKind::Triangles
                        || !self.accepts(fig)
                    {
                        continue;
                    }
                    gl.depth_program.set_mat4("u_model", self.model_matrix * fig.object_matrix);
                    gl.draw_indexed(glow::TRIANGLES, fig.indices());
                }
            }
        }
        Ok(())
    }

    /// Draws every manager's figures. Pass order within a manager is
    /// unlit points/lines, then the edge and normals overlays, then the
    /// lit triangle fill.
    fn scene_pass(&mut self, gl: &mut GlContext, model: &mut Model) {
        for manager in model.managers_mut() {
            if manager.is_empty() {
                continue;
            }
            gl.upload_vertices(manager.gpu_vertices());

            gl.main_program.bind();
            gl.main_program.set_bool("u_shaded", false);
            for fig in manager.ordered_figures() {
                if fig.kind() == FigureKind::Triangles || !fig.visible || !self.accepts(fig) {
                    continue;
                }
                gl.main_program.set_mat4("u_model", self.model_matrix * fig.object_matrix);
                set_override_color(gl, self.override_color.or(fig.color));
                let textured = self.use_textures
                    && fig.texture.is_some_and(|t| gl.bind_figure_texture(t));
                gl.main_program.set_bool("u_use_texture", textured);
                gl.draw_indexed(figure_mode(fig.kind()), fig.indices());
            }

            if self.show_vertices && manager.vertex_count() > 0 {
                let pool: Vec<u32> = (0..manager.vertex_count() as u32).collect();
                gl.main_program.set_mat4("u_model", self.model_matrix);
                gl.main_program.set_bool("u_use_texture", false);
                set_override_color(gl, None);
                gl.draw_indexed(glow::POINTS, &pool);
            }

            if self.shade_with_edge {
                gl.edge_program.bind();
                for fig in manager.ordered_figures() {
                    if !fig.visible
                        || fig.kind() != FigureKind::Triangles
                        || fig.exclude_from_shade_with_edge
                        || !self.accepts(fig)
                    {
                        continue;
                    }
                    gl.edge_program.set_mat4("u_model", self.model_matrix * fig.object_matrix);
                    gl.draw_indexed(glow::TRIANGLES, fig.indices());
                }
            }

            if self.show_normals {
                gl.normals_program.bind();
                for fig in manager.ordered_figures() {
                    if !fig.visible || fig.kind() != FigureKind::Triangles || !self.accepts(fig) {
                        continue;
                    }
                    gl.normals_program.set_mat4("u_model", self.model_matrix * fig.object_matrix);
                    gl.draw_indexed(glow::TRIANGLES, fig.indices());
                }
            }

            gl.main_program.bind();
            gl.main_program.set_bool("u_shaded", true);
            gl.set_wireframe(self.wireframe);
            for fig in manager.ordered_figures() {
                if fig.kind() != FigureKind::Triangles || !fig.visible || !self.accepts(fig) {
                    continue;
                }
                gl.main_program.set_mat4("u_model", self.model_matrix * fig.object_matrix);
                set_override_color(gl, self.override_color.or(fig.color));
                let textured = self.use_textures
                    && fig.texture.is_some_and(|t| gl.bind_figure_texture(t));
                gl.main_program.set_bool("u_use_texture", textured);
                gl.draw_indexed(glow::TRIANGLES, fig.indices());
            }
            gl.set_wireframe(false);
        }
    }

    fn accepts(&self, fig: &Figure) -> bool {
        self.figure_filter.as_ref().is_none_or(|f| f(fig))
    }
}

/// Projection-view products for the six faces of one light's shadow cube,
/// in the standard `+X,-X,+Y,-Y,+Z,-Z` cube-map face order.
fn shadow_face_matrices(light_pos: Vec3, near: f32, far: f32) -> [Mat4; 6] {
    let proj = Mat4::perspective_rh_gl(std::f32::consts::FRAC_PI_2, 1.0, near, far);
    let face = |dir: Vec3, up: Vec3| proj * Mat4::look_at_rh(light_pos, light_pos + dir, up);
    [
        face(Vec3::X, Vec3::NEG_Y),
        face(Vec3::NEG_X, Vec3::NEG_Y),
        face(Vec3::Y, Vec3::Z),
        face(Vec3::NEG_Y, Vec3::NEG_Z),
        face(Vec3::Z, Vec3::NEG_Y),
        face(Vec3::NEG_Z, Vec3::NEG_Y),
    ]
}

fn figure_mode(kind: FigureKind) -> u32 {
    match kind {
        FigureKind::Points => glow::POINTS,
        FigureKind::Lines => glow::LINES,
        FigureKind::Triangles => glow::TRIANGLES,
    }
}

/// Model-space overlay content: bbox wireframe and light markers. Opts
/// out of the aggregate bbox so overlays never feed back into fitting.
fn overlay_manager(bbox: &BBox, lights: &[PointLight], show_bbox: bool) -> VertexManager {
    let mut m = VertexManager::new("overlay").with_expand_model_bbox(false);
    if show_bbox {
        let segs = bbox_wireframe(bbox);
        if !segs.is_empty() {
            m.add_lines(Some("bbox"), &segs, Some(OVERLAY_WIRE_COLOR));
        }
    }
    for light in lights.iter().filter(|l| l.active && l.show_point) {
        m.add_points(None, &[light.position], Some(light.diffuse));
    }
    m
}

/// One wireframe figure per overlaid view-projection, in world space.
fn frustum_manager(view_projections: &[Mat4]) -> VertexManager {
    let mut m = VertexManager::new("frustums").with_expand_model_bbox(false);
    for vp in view_projections {
        let segs = frustum_lines(*vp);
        if !segs.is_empty() {
            m.add_lines(None, &segs, Some(OVERLAY_WIRE_COLOR));
        }
    }
    m
}

fn set_override_color(gl: &mut GlContext, color: Option<Color>) {
    gl.main_program.set_bool("u_override_color", color.is_some());
    if let Some(c) = color {
        gl.main_program.set_vec4("u_override_color_value", Vec4::from_array(c.to_array()));
    }
}

/// Draws a manager's figures with the main program in unshaded mode.
fn draw_flat(gl: &mut GlContext, manager: &mut VertexManager, base: Mat4) {
    if manager.is_empty() {
        return;
    }
    gl.upload_vertices(manager.gpu_vertices());
    for fig in manager.ordered_figures() {
        if !fig.visible {
            continue;
        }
        gl.main_program.set_mat4("u_model", base * fig.object_matrix);
        set_override_color(gl, fig.color);
        gl.draw_indexed(figure_mode(fig.kind()), fig.indices());
    }
}
