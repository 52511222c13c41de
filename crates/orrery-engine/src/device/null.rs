use std::sync::Arc;

use crate::device::{FramePixels, PostedFn, Poster, RenderDevice};

/// Device that swallows frames. The test-suite workhorse.
///
/// Frames can optionally be kept ([`NullDevice::keep_last`]) so tests can
/// assert on rendered output. Posted callbacks run inline, which keeps
/// debounce tests deterministic.
#[derive(Debug)]
pub struct NullDevice {
    size: [u32; 2],
    transfers: u64,
    keep_last: bool,
    last: Option<FramePixels>,
}

impl NullDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: [width, height],
            transfers: 0,
            keep_last: false,
            last: None,
        }
    }

    /// Keeps a copy of the most recent frame for inspection.
    pub fn keep_last(mut self) -> Self {
        self.keep_last = true;
        self
    }

    /// Simulates a resize of the target surface.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = [width, height];
    }

    /// The most recent frame, when [`keep_last`](Self::keep_last) is on.
    pub fn last_frame(&self) -> Option<&FramePixels> {
        self.last.as_ref()
    }
}

impl RenderDevice for NullDevice {
    fn size(&self) -> [u32; 2] {
        self.size
    }

    fn transfer_pixels(&mut self, frame: &FramePixels) {
        self.transfers += 1;
        if self.keep_last {
            self.last = Some(frame.clone());
        }
    }

    fn transfer_count(&self) -> u64 {
        self.transfers
    }

    fn poster(&self) -> Poster {
        Arc::new(|f: PostedFn| f())
    }
}
