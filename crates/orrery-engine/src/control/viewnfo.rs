//! View persistence.
//!
//! A [`ViewNfo`] is the JSON-serializable snapshot of everything that makes
//! a viewport look the way it does: camera, projection, model rotation,
//! display toggles and the light set. Save/load failures are user errors
//! (bad path, bad file), so they surface through
//! [`Notifications`](crate::notify::Notifications) instead of bubbling up
//! as `Err`.

use std::fs;
use std::path::Path;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::control::RenderControl;
use crate::model::{Model, PointLight};
use crate::notify::{Notification, Notifications};

/// Serializable snapshot of a control's view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNfo {
    pub model_matrix: Mat4,
    pub camera_pos: Vec3,
    pub camera_target: Vec3,
    pub camera_up: Vec3,
    pub perspective: bool,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub ortho_zoom: f32,
    pub use_shadows: bool,
    pub shade_with_edge: bool,
    pub use_textures: bool,
    pub lights: Vec<PointLight>,
}

impl RenderControl {
    /// Captures the current view state. Lights live on the model but are
    /// part of how a view looks, so they ride along.
    pub fn view_nfo(&self, model: &Model) -> ViewNfo {
        ViewNfo {
            model_matrix: self.model_matrix,
            camera_pos: self.camera.pos,
            camera_target: self.camera.target,
            camera_up: self.camera.up,
            perspective: self.projection.perspective,
            fov_y_deg: self.projection.fov_y_deg,
            near: self.projection.near,
            far: self.projection.far,
            ortho_zoom: self.projection.ortho_zoom,
            use_shadows: self.use_shadows,
            shade_with_edge: self.shade_with_edge,
            use_textures: self.use_textures,
            lights: model.lights().to_vec(),
        }
    }

    /// Restores a previously captured view state.
    pub fn apply_view_nfo(&mut self, nfo: &ViewNfo, model: &mut Model) {
        self.model_matrix = nfo.model_matrix;
        self.camera.pos = nfo.camera_pos;
        self.camera.target = nfo.camera_target;
        self.camera.up = nfo.camera_up;
        self.projection.perspective = nfo.perspective;
        self.projection.fov_y_deg = nfo.fov_y_deg;
        self.projection.near = nfo.near;
        self.projection.far = nfo.far;
        self.projection.ortho_zoom = nfo.ortho_zoom;
        self.use_shadows = nfo.use_shadows;
        self.shade_with_edge = nfo.shade_with_edge;
        self.use_textures = nfo.use_textures;
        model.set_lights(nfo.lights.clone());

        self.view_cache.invalidate();
        self.proj_cache.invalidate();
        self.redraw.set();
    }

    /// Writes the current view to `path` as pretty JSON. Returns whether
    /// the save succeeded; failures are reported through `notifications`.
    pub fn save_view(
        &self,
        path: impl AsRef<Path>,
        model: &Model,
        notifications: &mut Notifications,
    ) -> bool {
        let path = path.as_ref();
        let nfo = self.view_nfo(model);
        let json = match serde_json::to_string_pretty(&nfo) {
            Ok(json) => json,
            Err(e) => {
                notifications.push(Notification::error(
                    "Save view failed",
                    format!("could not encode view: {e}"),
                ));
                return false;
            }
        };
        if let Err(e) = fs::write(path, json) {
            notifications.push(Notification::error(
                "Save view failed",
                format!("could not write {}: {e}", path.display()),
            ));
            return false;
        }
        log::info!("{} saved view to {}", self.id, path.display());
        true
    }

    /// Loads a view from `path` and applies it. Returns whether the load
    /// succeeded; failures are reported through `notifications` and leave
    /// the current view untouched.
    pub fn load_view(
        &mut self,
        path: impl AsRef<Path>,
        model: &mut Model,
        notifications: &mut Notifications,
    ) -> bool {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                notifications.push(Notification::error(
                    "Load view failed",
                    format!("could not read {}: {e}", path.display()),
                ));
                return false;
            }
        };
        let nfo: ViewNfo = match serde_json::from_str(&json) {
            Ok(nfo) => nfo,
            Err(e) => {
                notifications.push(Notification::error(
                    "Load view failed",
                    format!("{} is not a valid view file: {e}", path.display()),
                ));
                return false;
            }
        };
        self.apply_view_nfo(&nfo, model);
        log::info!("{} loaded view from {}", self.id, path.display());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;

    fn scratch_file(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("orrery-viewnfo-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn customized_control() -> (RenderControl, Model) {
        let mut control = RenderControl::new();
        control.set_camera_pos(Vec3::new(3.0, 4.0, 5.0));
        control.set_camera_target(Vec3::new(0.5, 0.0, -1.0));
        control.set_perspective(false);
        control.set_ortho_zoom(2.5);
        control.set_use_shadows(false);
        control.set_shade_with_edge(true);
        control.set_model_matrix(Mat4::from_rotation_x(0.7));

        let mut model = Model::new();
        let mut light = PointLight::new(Vec3::new(0.0, 8.0, 0.0));
        light.linear = 0.25;
        model.add_light(light);
        (control, model)
    }

    #[test]
    fn view_round_trips_through_json() {
        let (control, model) = customized_control();
        let nfo = control.view_nfo(&model);

        let json = serde_json::to_string_pretty(&nfo).unwrap();
        let back: ViewNfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, nfo);
    }

    #[test]
    fn save_then_load_restores_the_view() {
        let (control, model) = customized_control();
        let mut notifications = Notifications::new();
        let path = scratch_file("roundtrip.json");

        assert!(control.save_view(&path, &model, &mut notifications));
        assert!(notifications.is_empty());

        let mut restored = RenderControl::new();
        let mut fresh_model = Model::new();
        assert!(restored.load_view(&path, &mut fresh_model, &mut notifications));
        assert!(notifications.is_empty());

        assert_eq!(restored.view_nfo(&fresh_model), control.view_nfo(&model));
        assert_eq!(fresh_model.lights().len(), 1);
        assert!((fresh_model.lights()[0].linear - 0.25).abs() < 1e-6);
    }

    #[test]
    fn load_failure_notifies_and_keeps_the_view() {
        let mut control = RenderControl::new();
        let mut model = Model::new();
        let mut notifications = Notifications::new();
        let before = control.view_nfo(&model);

        let missing = scratch_file("does-not-exist.json");
        let _ = fs::remove_file(&missing);
        assert!(!control.load_view(&missing, &mut model, &mut notifications));

        let queued = notifications.drain();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].severity, Severity::Error);
        assert_eq!(control.view_nfo(&model), before);
    }

    #[test]
    fn malformed_file_notifies() {
        let mut control = RenderControl::new();
        let mut model = Model::new();
        let mut notifications = Notifications::new();

        let path = scratch_file("garbage.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(!control.load_view(&path, &mut model, &mut notifications));
        assert_eq!(notifications.len(), 1);
    }
}
