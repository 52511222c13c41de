use std::time::Duration;

use crate::time::FrameTime;

/// Per-control render statistics, refreshed after every presented frame.
///
/// `fps` is an exponential moving average so UI overlays do not flicker
/// with every frame; `last_frame` is the raw measured duration of the most
/// recent full render (shadow passes through pixel transfer).
#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    /// Frames presented since the control was created.
    pub frame_count: u64,

    /// Wall-clock duration of the most recent frame.
    pub last_frame: Option<Duration>,

    /// Smoothed frames-per-second estimate.
    pub fps: f32,
}

impl RenderStats {
    /// Folds one completed frame into the stats.
    pub fn record(&mut self, ft: FrameTime, render_time: Duration) {
        self.frame_count += 1;
        self.last_frame = Some(render_time);

        let inst = if ft.dt > 0.0 { 1.0 / ft.dt } else { 0.0 };
        if self.frame_count == 1 {
            self.fps = inst;
        } else {
            // EMA with a short horizon; converges in a dozen frames.
            self.fps += (inst - self.fps) * 0.1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn ft(dt: f32) -> FrameTime {
        FrameTime { dt, now: Instant::now(), frame_index: 0 }
    }

    #[test]
    fn first_frame_seeds_fps() {
        let mut s = RenderStats::default();
        s.record(ft(0.02), Duration::from_millis(5));
        assert_eq!(s.frame_count, 1);
        assert!((s.fps - 50.0).abs() < 1e-3);
    }

    #[test]
    fn fps_converges_toward_instantaneous() {
        let mut s = RenderStats::default();
        for _ in 0..200 {
            s.record(ft(0.01), Duration::from_millis(2));
        }
        assert!((s.fps - 100.0).abs() < 1.0);
    }
}
