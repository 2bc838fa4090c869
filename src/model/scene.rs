use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use super::camera::Camera;

/// The host-side scene: holds which camera is currently rendered.
///
/// Cameras are shared with the controller that drives them; the scene only
/// decides which one is active.
pub struct Scene {
    pub name: String,
    active_camera: Option<Rc<RefCell<Camera>>>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), active_camera: None }
    }

    /// Bind `camera` to the viewport, replacing any previous one.
    pub fn set_camera(&mut self, camera: Rc<RefCell<Camera>>) {
        debug!(scene = %self.name, "active camera bound");
        self.active_camera = Some(camera);
    }

    pub fn active_camera(&self) -> Option<&Rc<RefCell<Camera>>> {
        self.active_camera.as_ref()
    }
}
