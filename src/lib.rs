// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

// MVC Architecture: the view is whatever reads the shared camera
pub mod model;
pub mod controller;

pub use config::ControllerConfig;
pub use controller::{FrameLoopContext, PlayerController};
pub use error::{ConfigError, ControlError};
