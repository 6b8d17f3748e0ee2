//! CPU software rasterizer
//!
//! Features:
//! - Model/view/projection transforms with a perspective divide
//! - Off-screen and back-face rejection in screen space
//! - Scanline fill with a float depth buffer
//! - Flat and Blinn-Phong (Gouraud-interpolated) shading, optional wireframe
//! - Optional vertex snapping to a pixel grid

mod framebuffer;
mod math;
mod pipeline;
mod render;
mod shading;
mod types;

pub use framebuffer::*;
pub use math::*;
pub use pipeline::*;
pub use render::*;
pub use shading::*;
pub use types::*;

/// Default framebuffer dimensions
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;
