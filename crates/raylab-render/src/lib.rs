//! Tile-based CPU render driver over the raylab core.

pub mod camera;
pub mod image_out;
pub mod integrator;

pub use camera::Camera;
pub use image_out::write_png;
pub use integrator::{render_scene, RenderSettings};
