//! Render output sinks.
//!
//! A [`RenderDevice`] is where finished frames go: the GUI host wraps its
//! widget surface in one, headless tools write image files, tests use the
//! no-op device. One render control drives exactly one device; the device
//! also supplies the target size the control derives its aspect ratio and
//! projection from.
//!
//! [`RenderDevice::poster`] exists because some work finishes off the
//! owning thread (the hover debounce timer in `control`): the poster is a
//! `Send + Sync` handle that marshals a closure back onto whatever thread
//! owns the device. For the devices in this module that is simply "run it
//! now"; GUI adapters forward to their event loop.

mod null;
mod offscreen;

use std::sync::Arc;

pub use null::NullDevice;
pub use offscreen::OffscreenDevice;

/// One completed frame: tightly packed RGBA8, rows top-down.
#[derive(Debug, Clone)]
pub struct FramePixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl FramePixels {
    /// The pixel at `(x, y)`, origin top-left. `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = ((y * self.width + x) * 4) as usize;
        self.rgba.get(at..at + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Copies the frame into an owned [`image::RgbaImage`].
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

/// A callback marshalled onto the device's owning thread.
pub type PostedFn = Box<dyn FnOnce() + Send>;

/// Cloneable handle that delivers [`PostedFn`]s to the owning thread.
pub type Poster = Arc<dyn Fn(PostedFn) + Send + Sync>;

/// Output surface a render control draws to.
pub trait RenderDevice {
    /// Target size in pixels. A zero dimension means "not displayable
    /// right now"; the control skips the frame.
    fn size(&self) -> [u32; 2];

    /// Accepts one completed frame. Called at most once per render.
    fn transfer_pixels(&mut self, frame: &FramePixels);

    /// Number of frames transferred so far. Diagnostic.
    fn transfer_count(&self) -> u64;

    /// Handle for posting callbacks onto the device's owning thread from
    /// other threads.
    fn poster(&self) -> Poster;

    /// Posts a callback onto the owning thread (convenience over
    /// [`poster`](Self::poster)).
    fn post(&self, f: PostedFn) {
        (self.poster())(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_lookup_respects_bounds() {
        let frame = FramePixels {
            width: 2,
            height: 2,
            rgba: vec![
                1, 2, 3, 4, 5, 6, 7, 8, // row 0
                9, 10, 11, 12, 13, 14, 15, 16, // row 1
            ],
        };
        assert_eq!(frame.pixel(0, 0), Some([1, 2, 3, 4]));
        assert_eq!(frame.pixel(1, 1), Some([13, 14, 15, 16]));
        assert_eq!(frame.pixel(2, 0), None);
        assert_eq!(frame.pixel(0, 2), None);
    }

    #[test]
    fn to_image_preserves_pixels() {
        let frame = FramePixels { width: 1, height: 2, rgba: vec![255, 0, 0, 255, 0, 255, 0, 255] };
        let img = frame.to_image();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 1).0, [0, 255, 0, 255]);
    }
}
