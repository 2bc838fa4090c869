// MODEL: Entities and value types the controllers read and write
pub mod camera;
pub mod doodad;
pub mod gear;
pub mod orientation;
pub mod scene;

pub use camera::{Camera, CameraAim, CameraPose};
pub use doodad::{Doodad, RigidBody, Transform};
pub use gear::{GearInformation, GearTable};
pub use orientation::{CameraOrientation, CameraZoom, PITCH_LIMIT_DEG};
pub use scene::Scene;
