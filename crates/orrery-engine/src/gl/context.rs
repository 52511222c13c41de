use std::mem::offset_of;
use std::sync::Arc;

use glow::{HasContext, PixelPackData, PixelUnpackData};

use crate::RenderError;
use crate::color::Color;
use crate::device::FramePixels;
use crate::gl::shaders::{
    self, FIGURE_TEXTURE_UNIT, LIGHTS_BINDING, SHADOW_MAP_UNIT, SHADOW_MATRICES_BINDING,
};
use crate::gl::{GlyphCache, ShaderProgram, ShaderSources, TextureArena, TextureHandle};
use crate::scene::{GlyphEntry, GlyphSource, Vertex};

/// Configuration for [`GlContext::new`].
#[derive(Debug, Clone)]
pub struct GlContextInit {
    /// Edge length of each shadow cube-map face.
    pub shadow_map_size: u32,

    /// Fail construction if a uniform the renderer sets is missing from a
    /// linked program, instead of warn-once no-ops at draw time.
    pub strict_uniforms: bool,

    /// TTF/OTF bytes for text figures. Text building fails without one.
    pub font_bytes: Option<Vec<u8>>,
}

impl Default for GlContextInit {
    fn default() -> Self {
        Self {
            shadow_map_size: 1024,
            strict_uniforms: false,
            font_bytes: None,
        }
    }
}

/// Everything living GL-side: programs, buffers, render targets, textures.
///
/// One context serves any number of render controls; per-control state
/// (camera, toggles) stays in the controls and is fed in through uniforms
/// each frame.
pub struct GlContext {
    gl: Arc<glow::Context>,

    pub(crate) main_program: ShaderProgram,
    pub(crate) edge_program: ShaderProgram,
    pub(crate) normals_program: ShaderProgram,
    pub(crate) depth_program: ShaderProgram,

    textures: TextureArena,
    glyphs: Option<GlyphCache>,

    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    lights_ssbo: glow::Buffer,
    shadow_mats_ssbo: glow::Buffer,

    target: Option<Target>,
    shadow: Option<ShadowTarget>,
    shadow_map_size: u32,
}

struct Target {
    fbo: glow::Framebuffer,
    color: glow::Renderbuffer,
    depth: glow::Renderbuffer,
    size: [u32; 2],
}

struct ShadowTarget {
    fbo: glow::Framebuffer,
    cube_array: glow::Texture,
    layers: u32,
}

/// Destination storage blocks for [`GlContext::upload_storage`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum StorageSlot {
    Lights,
    ShadowMatrices,
}

impl GlContext {
    /// Builds programs, buffers and the vertex layout.
    ///
    /// # Safety
    ///
    /// `gl` must be a current GL 4.3 core (or later) context, and must
    /// stay current for every later call into this struct.
    pub unsafe fn new(gl: Arc<glow::Context>, init: GlContextInit) -> Result<Self, RenderError> {
        let mut main_program = ShaderProgram::build(
            Arc::clone(&gl),
            "main",
            ShaderSources {
                vertex: Some(shaders::MAIN_VERT),
                geometry: None,
                fragment: Some(shaders::MAIN_FRAG),
            },
        )?;
        let edge_program = ShaderProgram::build(
            Arc::clone(&gl),
            "edge",
            ShaderSources {
                vertex: Some(shaders::OVERLAY_VERT),
                geometry: Some(shaders::EDGE_GEOM),
                fragment: Some(shaders::FLAT_FRAG),
            },
        )?;
        let normals_program = ShaderProgram::build(
            Arc::clone(&gl),
            "normals",
            ShaderSources {
                vertex: Some(shaders::OVERLAY_VERT),
                geometry: Some(shaders::NORMALS_GEOM),
                fragment: Some(shaders::FLAT_FRAG),
            },
        )?;
        let mut depth_program = ShaderProgram::build(
            Arc::clone(&gl),
            "depth",
            ShaderSources {
                vertex: Some(shaders::DEPTH_VERT),
                geometry: Some(shaders::DEPTH_GEOM),
                fragment: Some(shaders::DEPTH_FRAG),
            },
        )?;

        if init.strict_uniforms {
            main_program.require(&[
                "u_model",
                "u_view",
                "u_projection",
                "u_light_count",
                "u_camera_pos",
                "u_shaded",
                "u_use_shadows",
                "u_shadow_far",
                "u_selection_color",
            ])?;
        }

        main_program.bind_storage_block("PointLights", LIGHTS_BINDING);
        depth_program.bind_storage_block("ShadowMatrices", SHADOW_MATRICES_BINDING);

        let (vao, vbo, ebo, lights_ssbo, shadow_mats_ssbo) = unsafe {
            let vao = gl.create_vertex_array().map_err(RenderError::ResourceAlloc)?;
            let vbo = gl.create_buffer().map_err(RenderError::ResourceAlloc)?;
            let ebo = gl.create_buffer().map_err(RenderError::ResourceAlloc)?;
            let lights_ssbo = gl.create_buffer().map_err(RenderError::ResourceAlloc)?;
            let shadow_mats_ssbo = gl.create_buffer().map_err(RenderError::ResourceAlloc)?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));

            let stride = std::mem::size_of::<Vertex>() as i32;
            let float_attrs: [(u32, i32, usize); 5] = [
                (0, 3, offset_of!(Vertex, position)),
                (1, 3, offset_of!(Vertex, normal)),
                (2, 4, offset_of!(Vertex, color)),
                (3, 3, offset_of!(Vertex, material)),
                (4, 2, offset_of!(Vertex, uv)),
            ];
            for (index, size, offset) in float_attrs {
                gl.enable_vertex_attrib_array(index);
                gl.vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset as i32);
            }
            gl.enable_vertex_attrib_array(5);
            gl.vertex_attrib_pointer_i32(
                5,
                1,
                glow::UNSIGNED_INT,
                stride,
                offset_of!(Vertex, flags) as i32,
            );
            gl.bind_vertex_array(None);

            // Fixed state the renderer assumes everywhere.
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
            gl.disable(glow::CULL_FACE);
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            gl.enable(glow::PROGRAM_POINT_SIZE);
            gl.enable(glow::TEXTURE_CUBE_MAP_SEAMLESS);

            (vao, vbo, ebo, lights_ssbo, shadow_mats_ssbo)
        };

        let glyphs = match &init.font_bytes {
            Some(bytes) => Some(GlyphCache::new(bytes)?),
            None => None,
        };

        log::info!(
            "GL context ready (shadow map {}px{})",
            init.shadow_map_size,
            if glyphs.is_some() { ", font loaded" } else { "" }
        );

        Ok(Self {
            gl,
            main_program,
            edge_program,
            normals_program,
            depth_program,
            textures: TextureArena::new(),
            glyphs,
            vao,
            vbo,
            ebo,
            lights_ssbo,
            shadow_mats_ssbo,
            target: None,
            shadow: None,
            shadow_map_size: init.shadow_map_size.max(16),
        })
    }

    /// Loads (or replaces) the font used for text figures.
    pub fn set_font(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        self.glyphs = Some(GlyphCache::new(bytes)?);
        Ok(())
    }

    pub fn has_font(&self) -> bool {
        self.glyphs.is_some()
    }

    // ── textures ──

    /// Uploads an RGBA8 texture and returns its handle.
    ///
    /// Runs the deferred-delete checkpoint first, so disposal debt never
    /// grows across texture creations.
    pub fn create_texture_rgba(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, RenderError> {
        if rgba.len() != (width * height * 4) as usize {
            return Err(RenderError::ResourceAlloc(format!(
                "texture data is {} bytes, expected {}",
                rgba.len(),
                width * height * 4
            )));
        }
        self.drain_retired_textures();

        let gl = &self.gl;
        let texture = unsafe {
            let texture = gl.create_texture().map_err(RenderError::ResourceAlloc)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(rgba)),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };
        Ok(self.textures.insert(texture))
    }

    /// Uploads a decoded image as a texture.
    pub fn create_texture_image(&mut self, img: &image::RgbaImage) -> Result<TextureHandle, RenderError> {
        self.create_texture_rgba(img.width(), img.height(), img.as_raw())
    }

    /// Schedules a texture for deletion at the next checkpoint.
    pub fn dispose_texture(&mut self, handle: TextureHandle) {
        self.textures.dispose(handle);
    }

    /// Deletes retired textures now. Called by the render loop at its
    /// checkpoints; safe to call any time the context is current.
    pub fn drain_retired_textures(&mut self) {
        self.textures.drain_retired(&self.gl);
    }

    pub fn live_texture_count(&self) -> usize {
        self.textures.live_count()
    }

    /// Binds a figure texture to its unit. Returns false for stale handles.
    pub(crate) fn bind_figure_texture(&mut self, handle: TextureHandle) -> bool {
        let Some(texture) = self.textures.get(handle) else {
            return false;
        };
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + FIGURE_TEXTURE_UNIT);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.active_texture(glow::TEXTURE0);
        }
        true
    }

    // ── render targets ──

    /// (Re)creates the offscreen color+depth target at `size` and leaves
    /// it bound with the viewport set.
    pub(crate) fn bind_target(&mut self, size: [u32; 2]) -> Result<(), RenderError> {
        let size = [size[0].max(1), size[1].max(1)];
        if self.target.as_ref().map(|t| t.size) != Some(size) {
            self.drop_target();
            self.target = Some(self.create_target(size)?);
            log::debug!("offscreen target resized to {}x{}", size[0], size[1]);
        }
        let gl = &self.gl;
        if let Some(t) = &self.target {
            unsafe {
                gl.bind_framebuffer(glow::FRAMEBUFFER, Some(t.fbo));
                gl.viewport(0, 0, size[0] as i32, size[1] as i32);
            }
        }
        Ok(())
    }

    fn create_target(&self, size: [u32; 2]) -> Result<Target, RenderError> {
        let gl = &self.gl;
        unsafe {
            let fbo = gl.create_framebuffer().map_err(RenderError::ResourceAlloc)?;
            let color = gl.create_renderbuffer().map_err(RenderError::ResourceAlloc)?;
            let depth = gl.create_renderbuffer().map_err(RenderError::ResourceAlloc)?;

            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(color));
            gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::RGBA8,
                size[0] as i32,
                size[1] as i32,
            );
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(depth));
            gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::DEPTH_COMPONENT24,
                size[0] as i32,
                size[1] as i32,
            );
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::RENDERBUFFER,
                Some(color),
            );
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(depth),
            );

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                gl.delete_framebuffer(fbo);
                gl.delete_renderbuffer(color);
                gl.delete_renderbuffer(depth);
                return Err(RenderError::FramebufferIncomplete { status });
            }
            Ok(Target { fbo, color, depth, size })
        }
    }

    fn drop_target(&mut self) {
        if let Some(t) = self.target.take() {
            let gl = &self.gl;
            unsafe {
                gl.delete_framebuffer(t.fbo);
                gl.delete_renderbuffer(t.color);
                gl.delete_renderbuffer(t.depth);
            }
        }
    }

    /// (Re)creates the shadow cube-map array with one layer per light and
    /// leaves the shadow framebuffer bound with depth cleared.
    pub(crate) fn bind_shadow_target(&mut self, lights: u32) -> Result<(), RenderError> {
        let layers = lights.max(1);
        if self.shadow.as_ref().map(|s| s.layers) != Some(layers) {
            self.drop_shadow();
            self.shadow = Some(self.create_shadow(layers)?);
            log::debug!(
                "shadow cube-map array rebuilt: {layers} layers at {}px",
                self.shadow_map_size
            );
        }
        let gl = &self.gl;
        if let Some(s) = &self.shadow {
            unsafe {
                gl.bind_framebuffer(glow::FRAMEBUFFER, Some(s.fbo));
                let size = self.shadow_map_size as i32;
                gl.viewport(0, 0, size, size);
                gl.clear(glow::DEPTH_BUFFER_BIT);
            }
        }
        Ok(())
    }

    fn create_shadow(&self, layers: u32) -> Result<ShadowTarget, RenderError> {
        let gl = &self.gl;
        let size = self.shadow_map_size as i32;
        unsafe {
            let cube_array = gl.create_texture().map_err(RenderError::ResourceAlloc)?;
            gl.bind_texture(glow::TEXTURE_CUBE_MAP_ARRAY, Some(cube_array));
            gl.tex_storage_3d(
                glow::TEXTURE_CUBE_MAP_ARRAY,
                1,
                glow::DEPTH_COMPONENT24,
                size,
                size,
                (layers * 6) as i32,
            );
            for (param, value) in [
                (glow::TEXTURE_MIN_FILTER, glow::NEAREST),
                (glow::TEXTURE_MAG_FILTER, glow::NEAREST),
                (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
                (glow::TEXTURE_WRAP_R, glow::CLAMP_TO_EDGE),
            ] {
                gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP_ARRAY, param, value as i32);
            }
            gl.bind_texture(glow::TEXTURE_CUBE_MAP_ARRAY, None);

            let fbo = gl.create_framebuffer().map_err(RenderError::ResourceAlloc)?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            // Layered attachment: the geometry stage routes faces through
            // gl_Layer.
            gl.framebuffer_texture(glow::FRAMEBUFFER, glow::DEPTH_ATTACHMENT, Some(cube_array), 0);
            gl.draw_buffer(glow::NONE);
            gl.read_buffer(glow::NONE);

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                gl.delete_framebuffer(fbo);
                gl.delete_texture(cube_array);
                return Err(RenderError::FramebufferIncomplete { status });
            }
            Ok(ShadowTarget { fbo, cube_array, layers })
        }
    }

    fn drop_shadow(&mut self) {
        if let Some(s) = self.shadow.take() {
            let gl = &self.gl;
            unsafe {
                gl.delete_framebuffer(s.fbo);
                gl.delete_texture(s.cube_array);
            }
        }
    }

    /// Binds the shadow cube-map array for sampling in the main pass.
    pub(crate) fn bind_shadow_maps(&self) {
        let Some(s) = &self.shadow else { return };
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + SHADOW_MAP_UNIT);
            self.gl
                .bind_texture(glow::TEXTURE_CUBE_MAP_ARRAY, Some(s.cube_array));
            self.gl.active_texture(glow::TEXTURE0);
        }
    }

    // ── drawing ──

    pub(crate) fn clear(&self, color: Color) {
        unsafe {
            self.gl.clear_color(color.r, color.g, color.b, color.a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    pub(crate) fn set_wireframe(&self, on: bool) {
        let mode = if on { glow::LINE } else { glow::FILL };
        unsafe { self.gl.polygon_mode(glow::FRONT_AND_BACK, mode) };
    }

    /// Streams a vertex pool into the shared vertex buffer.
    pub(crate) fn upload_vertices(&self, verts: &[Vertex]) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(verts),
                glow::STREAM_DRAW,
            );
        }
    }

    /// Streams bytes into one of the storage blocks and (re)binds it.
    pub(crate) fn upload_storage(&self, slot: StorageSlot, bytes: &[u8]) {
        let (buffer, binding) = match slot {
            StorageSlot::Lights => (self.lights_ssbo, LIGHTS_BINDING),
            StorageSlot::ShadowMatrices => (self.shadow_mats_ssbo, SHADOW_MATRICES_BINDING),
        };
        unsafe {
            self.gl.bind_buffer(glow::SHADER_STORAGE_BUFFER, Some(buffer));
            self.gl
                .buffer_data_u8_slice(glow::SHADER_STORAGE_BUFFER, bytes, glow::DYNAMIC_DRAW);
            self.gl
                .bind_buffer_base(glow::SHADER_STORAGE_BUFFER, binding, Some(buffer));
        }
    }

    /// Draws one figure's indices with the currently bound program.
    pub(crate) fn draw_indexed(&self, mode: u32, indices: &[u32]) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.ebo));
            self.gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STREAM_DRAW,
            );
            self.gl
                .draw_elements(mode, indices.len() as i32, glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }

    /// Reads back the bound offscreen target, flipped to top-down rows.
    pub(crate) fn read_target_pixels(&self) -> Option<FramePixels> {
        let t = self.target.as_ref()?;
        let [w, h] = t.size;
        let mut rgba = vec![0u8; (w * h * 4) as usize];
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(t.fbo));
            self.gl.read_pixels(
                0,
                0,
                w as i32,
                h as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelPackData::Slice(Some(&mut rgba)),
            );
        }
        // GL reads bottom-up; present top-down like every image consumer
        // expects.
        let row = (w * 4) as usize;
        for y in 0..(h as usize / 2) {
            let (top, bottom) = (y * row, (h as usize - 1 - y) * row);
            for x in 0..row {
                rgba.swap(top + x, bottom + x);
            }
        }
        Some(FramePixels { width: w, height: h, rgba })
    }

    /// Deletes every GL object owned by the context. Must be the last
    /// call, with the context still current.
    pub fn destroy(&mut self) {
        self.drop_target();
        self.drop_shadow();
        self.textures.destroy(&self.gl);
        if let Some(g) = &mut self.glyphs {
            g.clear();
        }
        self.main_program.destroy();
        self.edge_program.destroy();
        self.normals_program.destroy();
        self.depth_program.destroy();
        unsafe {
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_buffer(self.ebo);
            self.gl.delete_buffer(self.lights_ssbo);
            self.gl.delete_buffer(self.shadow_mats_ssbo);
        }
        log::debug!("GL context destroyed");
    }
}

impl GlyphSource for GlContext {
    fn glyph(&mut self, ch: char, px: f32) -> Result<GlyphEntry, RenderError> {
        let Some(glyphs) = self.glyphs.as_mut() else {
            return Err(RenderError::NoFont);
        };
        glyphs.glyph(&self.gl, &mut self.textures, ch, px)
    }
}

impl std::fmt::Debug for GlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("shadow_map_size", &self.shadow_map_size)
            .field("textures", &self.textures)
            .field("has_font", &self.glyphs.is_some())
            .finish()
    }
}
