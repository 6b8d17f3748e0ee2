//! Scanline renderer: a CPU software rasterizer
//!
//! - Row-major `Mat4` math applied to column vectors, right-handed, camera looks down -Z
//! - Triangle setup with off-screen and back-face rejection
//! - Scanline fill into packed RGBA pixels with a float depth buffer
//! - Flat, Blinn-Phong (Gouraud) and wireframe shading
//! - OBJ loading, RON configuration and a frame driver with a benchmark mode

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod driver;
pub mod error;
pub mod rasterizer;
pub mod scene;

pub use config::{load_config, save_config, RenderConfig};
pub use driver::{BenchmarkReport, DriverState, FrameDriver};
pub use error::RenderError;
