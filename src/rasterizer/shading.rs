//! Lighting: flat (per face) and Blinn-Phong (per vertex)
//!
//! Lighting is evaluated in world space, so normals and edges go through the
//! model matrix only, never the MVP. Shading produces colors; it never touches
//! the framebuffer.

use super::math::{Mat4, Vec3};
use super::pipeline::AssembledTriangle;
use super::types::{Color, RasterSettings, ShadingMode};
use crate::scene::DirectionalLight;

/// Inputs shared by every triangle of one mesh draw
pub struct ShadingContext<'a> {
    pub model: &'a Mat4,
    pub light: &'a DirectionalLight,
    /// Fixed view direction for the specular half-vector
    pub view_dir: Vec3,
    pub base_color: Color,
    pub settings: &'a RasterSettings,
}

impl<'a> ShadingContext<'a> {
    /// The view direction is the negated, normalized camera position
    /// (one direction for the whole frame, not a per-pixel eye vector).
    pub fn new(
        model: &'a Mat4,
        light: &'a DirectionalLight,
        camera_position: Vec3,
        base_color: Color,
        settings: &'a RasterSettings,
    ) -> Self {
        Self {
            model,
            light,
            view_dir: (-camera_position).normalize_or(Vec3::FORWARD),
            base_color,
            settings,
        }
    }

    fn diffuse(&self, normal: Vec3) -> f32 {
        normal.dot(-self.light.direction()).max(0.0) * self.light.intensity
    }

    fn finish(&self, factor: f32) -> Color {
        let tint = self.light.color.to_unit_rgb();
        self.base_color.modulate(tint * factor)
    }
}

/// World-space face normal from the triangle's two edges
pub fn face_normal(world: [Vec3; 3]) -> Vec3 {
    (world[1] - world[0]).cross(world[2] - world[0]).normalize()
}

/// One color for the whole triangle
pub fn flat_color(positions: &[Vec3; 3], ctx: &ShadingContext) -> Color {
    let world = positions.map(|p| ctx.model.transform_point(p));
    let normal = face_normal(world);
    let ambient = ctx.settings.ambient;
    ctx.finish(ambient + (1.0 - ambient) * ctx.diffuse(normal))
}

/// Blinn-Phong color for one vertex from its model-space normal
pub fn blinn_phong_color(normal: Vec3, ctx: &ShadingContext) -> Color {
    let n = ctx.model.transform_direction(normal).normalize();
    let to_light = -ctx.light.direction();
    let half = (ctx.view_dir + to_light).normalize();

    let ambient = ctx.settings.ambient;
    let specular = n.dot(half).max(0.0).powf(ctx.settings.shininess) * ctx.light.intensity;
    ctx.finish(ambient + (1.0 - ambient) * ctx.diffuse(n) + specular)
}

/// Shade a triangle according to the configured mode.
///
/// Returns the flat fallback color. In Blinn-Phong mode the per-vertex colors
/// are also attached to the screen vertices for interpolation.
pub fn shade_triangle(tri: &mut AssembledTriangle, ctx: &ShadingContext) -> Color {
    let flat = flat_color(&tri.positions, ctx);

    if ctx.settings.shading == ShadingMode::BlinnPhong {
        for (v, normal) in tri.screen.iter_mut().zip(tri.normals) {
            v.color = Some(blinn_phong_color(normal, ctx));
        }
    }

    flat
}
