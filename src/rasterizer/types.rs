//! Core types for the rasterizer

use serde::{Deserialize, Serialize};
use super::math::{Vec2, Vec3};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    /// Base color for meshes without a material
    pub const PLACEHOLDER: Color = Color { r: 200, g: 200, b: 200, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from unclamped float channels (0-255 scale).
    /// Channels are clamped to [0, 255]; NaN becomes 0.
    pub fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        fn channel(v: f32) -> u8 {
            if v.is_nan() {
                0
            } else {
                v.round().clamp(0.0, 255.0) as u8
            }
        }
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            a: channel(a),
        }
    }

    /// Multiply RGB by a per-channel factor, leaving alpha alone
    pub fn modulate(self, factor: Vec3) -> Self {
        Self::from_f32(
            self.r as f32 * factor.x,
            self.g as f32 * factor.y,
            self.b as f32 * factor.z,
            self.a as f32,
        )
    }

    pub fn to_f32(self) -> [f32; 4] {
        [self.r as f32, self.g as f32, self.b as f32, self.a as f32]
    }

    /// Color as a 0.0-1.0 RGB vector
    pub fn to_unit_rgb(self) -> Vec3 {
        Vec3::new(self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0)
    }

    /// Relative luminance (0-255), used to compare shaded faces
    pub fn luma(self) -> f32 {
        0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32
    }
}

/// A vertex after projection: screen position plus carried attributes.
///
/// Lives for one triangle draw.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenVertex {
    /// Screen x in pixels (0 = left edge)
    pub x: f32,
    /// Screen y in pixels (0 = top edge, increasing downward)
    pub y: f32,
    /// Depth in [0, 1], 0 = near plane
    pub z: f32,
    /// 1 / clip-space w, for perspective-correct interpolation
    pub recip_w: f32,
    pub color: Option<Color>,
    pub normal: Option<Vec3>,
    pub uv: Option<Vec2>,
}

impl ScreenVertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            recip_w: 1.0,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_recip_w(mut self, recip_w: f32) -> Self {
        self.recip_w = recip_w;
        self
    }

    /// Inside the half-open screen rectangle [0,width) x [0,height)
    pub fn on_screen(&self, width: usize, height: usize) -> bool {
        self.x >= 0.0 && self.x < width as f32 && self.y >= 0.0 && self.y < height as f32
    }
}

/// Shading mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadingMode {
    /// One light calculation per face
    Flat,
    /// Per-vertex Blinn-Phong, interpolated across the triangle
    #[default]
    BlinnPhong,
    /// Triangle edges only, flat-shaded
    Wireframe,
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Shading mode
    pub shading: ShadingMode,
    /// Snap projected vertices to a grid (runs after culling)
    pub snap_vertices: bool,
    /// Grid pitch in pixels for vertex snapping
    pub snap_pitch: f32,
    /// Interpolate colors with 1/w (false = affine, screen-space linear)
    pub perspective_correct: bool,
    /// Backface culling
    pub backface_cull: bool,
    /// Ambient light intensity (0.0-1.0)
    pub ambient: f32,
    /// Specular exponent for Blinn-Phong
    pub shininess: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            shading: ShadingMode::BlinnPhong,
            snap_vertices: false,
            snap_pitch: 1.0,
            perspective_correct: true,
            backface_cull: true,
            ambient: 0.15,
            shininess: 16.0,
        }
    }
}
