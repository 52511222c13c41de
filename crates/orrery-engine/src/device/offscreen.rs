use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::device::{FramePixels, PostedFn, Poster, RenderDevice};

/// Device that encodes every frame to a PNG file.
///
/// Frames land at `<dir>/<stem>-NNNNN.png` with a running counter, so a
/// sequence of renders produces a browsable image series. Write failures
/// are logged and counted but do not abort the render: a full disk should
/// not take down an interactive session.
#[derive(Debug)]
pub struct OffscreenDevice {
    size: [u32; 2],
    dir: PathBuf,
    stem: String,
    transfers: u64,
    write_errors: u64,
    last_path: Option<PathBuf>,
}

impl OffscreenDevice {
    pub fn new(width: u32, height: u32, dir: impl Into<PathBuf>) -> Self {
        Self {
            size: [width, height],
            dir: dir.into(),
            stem: "frame".to_owned(),
            transfers: 0,
            write_errors: 0,
            last_path: None,
        }
    }

    /// Like [`new`], but creates the output directory first.
    ///
    /// [`new`]: OffscreenDevice::new
    pub fn create(width: u32, height: u32, dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating frame directory {}", dir.display()))?;
        Ok(Self::new(width, height, dir))
    }

    /// File name stem; default `frame`.
    pub fn with_stem(mut self, stem: impl Into<String>) -> Self {
        self.stem = stem.into();
        self
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = [width, height];
    }

    /// Path of the most recently written file, if any write succeeded.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }

    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    fn next_path(&self) -> PathBuf {
        self.dir.join(format!("{}-{:05}.png", self.stem, self.transfers))
    }
}

impl RenderDevice for OffscreenDevice {
    fn size(&self) -> [u32; 2] {
        self.size
    }

    fn transfer_pixels(&mut self, frame: &FramePixels) {
        let path = self.next_path();
        self.transfers += 1;
        match frame.to_image().save(&path) {
            Ok(()) => {
                log::debug!("wrote frame to {}", path.display());
                self.last_path = Some(path);
            }
            Err(e) => {
                self.write_errors += 1;
                log::error!("failed to write frame to {}: {e}", path.display());
            }
        }
    }

    fn transfer_count(&self) -> u64 {
        self.transfers
    }

    fn poster(&self) -> Poster {
        Arc::new(|f: PostedFn| f())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> FramePixels {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let on = (x + y) % 2 == 0;
                rgba.extend_from_slice(if on { &[255, 255, 255, 255] } else { &[0, 0, 0, 255] });
            }
        }
        FramePixels { width, height, rgba }
    }

    #[test]
    fn writes_numbered_pngs() {
        let dir = std::env::temp_dir().join(format!("orrery-offscreen-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut dev = OffscreenDevice::new(4, 4, &dir).with_stem("t");
        dev.transfer_pixels(&checker(4, 4));
        dev.transfer_pixels(&checker(4, 4));

        assert_eq!(dev.transfer_count(), 2);
        assert_eq!(dev.write_errors(), 0);
        assert!(dev.last_path().unwrap().ends_with("t-00001.png"));
        assert!(dir.join("t-00000.png").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn write_failure_is_counted_not_fatal() {
        // A directory that does not exist: the save fails, the device keeps
        // going.
        let mut dev = OffscreenDevice::new(2, 2, "/nonexistent-orrery-dir/x");
        dev.transfer_pixels(&checker(2, 2));
        assert_eq!(dev.transfer_count(), 1);
        assert_eq!(dev.write_errors(), 1);
        assert!(dev.last_path().is_none());
    }

    #[test]
    fn create_makes_the_output_directory() {
        let dir = std::env::temp_dir()
            .join(format!("orrery-offscreen-create-{}", std::process::id()))
            .join("nested");
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());

        let dev = OffscreenDevice::create(2, 2, &dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(dev.size(), [2, 2]);

        std::fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }
}
