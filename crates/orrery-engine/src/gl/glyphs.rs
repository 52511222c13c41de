use std::collections::HashMap;

use glow::{HasContext, PixelUnpackData};

use crate::RenderError;
use crate::gl::TextureArena;
use crate::scene::{GlyphEntry, GlyphMetrics};

/// Rasterized-glyph cache keyed by character and pixel size.
///
/// Glyphs are rasterized with `fontdue` on first request and uploaded as
/// single-channel coverage textures; a texture swizzle maps coverage to
/// alpha so the main shader samples them like any RGBA texture. Entries
/// live for the lifetime of the cache.
pub struct GlyphCache {
    font: fontdue::Font,
    cache: HashMap<GlyphKey, GlyphEntry>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct GlyphKey {
    ch: char,
    px: u32,
}

impl GlyphCache {
    /// Parses a TrueType or OpenType font from raw bytes.
    pub fn new(font_bytes: &[u8]) -> Result<Self, RenderError> {
        let font = fontdue::Font::from_bytes(font_bytes, fontdue::FontSettings::default())
            .map_err(|e| RenderError::FontLoad(e.to_string()))?;
        Ok(Self { font, cache: HashMap::new() })
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Looks up a glyph, rasterizing and uploading it on a cache miss.
    /// The context must be current.
    pub fn glyph(
        &mut self,
        gl: &glow::Context,
        textures: &mut TextureArena,
        ch: char,
        px: f32,
    ) -> Result<GlyphEntry, RenderError> {
        let key = GlyphKey { ch, px: px.round().max(1.0) as u32 };
        if let Some(entry) = self.cache.get(&key) {
            return Ok(*entry);
        }

        let (metrics, bitmap) = self.font.rasterize(ch, key.px as f32);
        let (w, h) = (metrics.width.max(1), metrics.height.max(1));
        // Zero-area glyphs (spaces) still get a 1x1 transparent texture so
        // every entry carries a valid handle.
        let pixels = if bitmap.is_empty() { vec![0u8; w * h] } else { bitmap };

        let texture = unsafe {
            let texture = gl.create_texture().map_err(RenderError::ResourceAlloc)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::R8 as i32,
                w as i32,
                h as i32,
                0,
                glow::RED,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(&pixels)),
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            // Coverage lives in the red channel; present it as alpha with
            // solid white RGB so tinting by vertex color works.
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_R, glow::ONE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_G, glow::ONE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_B, glow::ONE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_A, glow::RED as i32);
            gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };

        let entry = GlyphEntry {
            texture: textures.insert(texture),
            metrics: GlyphMetrics {
                width: metrics.width as u32,
                height: metrics.height as u32,
                xmin: metrics.xmin as f32,
                ymin: metrics.ymin as f32,
                advance: metrics.advance_width,
            },
        };
        self.cache.insert(key, entry);
        log::trace!("rasterized glyph {ch:?} at {}px", key.px);
        Ok(entry)
    }

    /// Forgets all cache entries. Texture deletion is the arena's job.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl std::fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("cached", &self.cache.len())
            .finish()
    }
}
