//! Hover debounce and cursor coordinate identification.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use glam::{Vec2, Vec3};

use crate::control::RenderControl;
use crate::device::{PostedFn, Poster};
use crate::model::Model;

/// Pixel radius within which a vertex counts as under the cursor.
const PICK_RADIUS_PX: f32 = 8.0;

/// Restartable delay timer.
///
/// Each [`restart`] supersedes any pending run; the action fires through
/// the device poster, back on the owning thread, only if no newer restart
/// or [`cancel`] happened in the meantime.
///
/// [`restart`]: Debounce::restart
/// [`cancel`]: Debounce::cancel
#[derive(Debug, Clone)]
pub struct Debounce {
    generation: Arc<AtomicU64>,
    delay: Duration,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self { generation: Arc::new(AtomicU64::new(0)), delay }
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedules `f` to run after the delay, superseding any pending run.
    pub fn restart(&self, poster: Poster, f: impl FnOnce() + Send + 'static) {
        let current = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        thread::spawn(move || {
            thread::sleep(delay);
            if generation.load(Ordering::Acquire) != current {
                return;
            }
            let check = Arc::clone(&generation);
            let posted: PostedFn = Box::new(move || {
                // A restart can race with the post itself, so the owning
                // thread checks once more before running.
                if check.load(Ordering::Acquire) == current {
                    f();
                }
            });
            poster(posted);
        });
    }

    /// Drops any pending run.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

impl RenderControl {
    /// Schedules `on_settle` for when the cursor has rested for the hover
    /// delay. Call on every cursor move; earlier schedules are superseded.
    pub fn schedule_hover(&self, poster: Poster, on_settle: impl FnOnce() + Send + 'static) {
        self.hover.restart(poster, on_settle);
    }

    /// Cancels a pending hover action (cursor left the viewport, a drag
    /// started).
    pub fn cancel_hover(&self) {
        self.hover.cancel();
    }

    pub fn set_hover_delay(&mut self, delay: Duration) {
        self.hover.cancel();
        self.hover.set_delay(delay);
    }

    /// Finds the scene vertex nearest the cursor, within the pick radius,
    /// and returns its world coordinate (model matrix applied).
    ///
    /// Identification is done in screen space over the vertex pools of
    /// all managers, which makes it exact for the same geometry the user
    /// sees and independent of the GL context.
    pub fn identify_coordinate(&mut self, model: &Model, cursor: Vec2) -> Option<Vec3> {
        let view = self.view_matrix();
        let proj = self.projection_matrix(model);
        let mvp = proj * view * self.model_matrix;
        let half = Vec2::new(self.size[0] as f32, self.size[1] as f32) * 0.5;

        let mut best: Option<(f32, Vec3)> = None;
        for manager in model.managers() {
            for idx in 0..manager.vertex_count() as u32 {
                let Some(vertex) = manager.vertex(idx) else { continue };
                let p = vertex.position_vec3();
                let clip = mvp * p.extend(1.0);
                if clip.w <= 0.0 {
                    continue;
                }
                let ndc = clip.truncate() / clip.w;
                if !(-1.0..=1.0).contains(&ndc.z) {
                    continue;
                }
                let screen = Vec2::new(half.x * (1.0 + ndc.x), half.y * (1.0 - ndc.y));
                let dist = screen.distance(cursor);
                if dist <= PICK_RADIUS_PX && best.is_none_or(|(d, _)| dist < d) {
                    best = Some((dist, p));
                }
            }
        }
        best.map(|(_, p)| self.model_matrix.transform_point3(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use std::sync::mpsc;

    fn inline_poster() -> Poster {
        Arc::new(|f: PostedFn| f())
    }

    #[test]
    fn debounce_fires_after_the_delay() {
        let debounce = Debounce::new(Duration::from_millis(30));
        let (tx, rx) = mpsc::channel();
        debounce.restart(inline_poster(), move || tx.send(()).unwrap());
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
    }

    #[test]
    fn restart_supersedes_the_pending_run() {
        let debounce = Debounce::new(Duration::from_millis(50));
        let (tx, rx) = mpsc::channel();

        let tx1 = tx.clone();
        debounce.restart(inline_poster(), move || tx1.send(1).unwrap());
        debounce.restart(inline_poster(), move || tx.send(2).unwrap());

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(2));
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn cancel_drops_the_pending_run() {
        let debounce = Debounce::new(Duration::from_millis(50));
        let (tx, rx) = mpsc::channel();
        debounce.restart(inline_poster(), move || tx.send(()).unwrap());
        debounce.cancel();
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    fn picking_setup() -> (RenderControl, Model) {
        let mut control = RenderControl::new();
        control.set_size([400, 400]);
        control.set_fov_y_deg(90.0);

        let mut model = Model::new();
        model.add_triangles(
            Some("tri"),
            &[[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)]],
            None,
        );
        (control, model)
    }

    #[test]
    fn identify_picks_the_nearest_vertex() {
        let (mut control, model) = picking_setup();

        // At distance 10 with a 90 degree frustum, x=1 lands at 220 px.
        let hit = control.identify_coordinate(&model, Vec2::new(219.0, 200.0));
        assert_eq!(hit, Some(Vec3::new(1.0, 0.0, 0.0)));

        let center = control.identify_coordinate(&model, Vec2::new(201.0, 199.0));
        assert_eq!(center, Some(Vec3::ZERO));
    }

    #[test]
    fn identify_misses_outside_the_pick_radius() {
        let (mut control, model) = picking_setup();
        assert_eq!(control.identify_coordinate(&model, Vec2::new(50.0, 50.0)), None);
    }

    #[test]
    fn identify_applies_the_model_matrix() {
        let (mut control, model) = picking_setup();
        control.set_model_matrix(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));

        // The origin vertex now sits at world x=5, screen x=300.
        let hit = control.identify_coordinate(&model, Vec2::new(300.0, 200.0));
        assert_eq!(hit, Some(Vec3::new(5.0, 0.0, 0.0)));
    }
}
