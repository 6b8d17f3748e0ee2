//! Core rendering functions
//! Scanline triangle fill, wireframe edges and per-mesh/per-scene drawing

use super::framebuffer::Framebuffer;
use super::math::Mat4;
use super::pipeline::{assemble_mesh, Rejection};
use super::shading::{shade_triangle, ShadingContext};
use super::types::{Color, RasterSettings, ScreenVertex, ShadingMode};
use crate::scene::{Mesh, Scene};

/// Per-frame triangle and pixel counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles: usize,
    pub unprojectable: usize,
    pub culled_behind: usize,
    pub culled_offscreen: usize,
    pub culled_backface: usize,
    pub drawn: usize,
    pub pixels_written: usize,
}

impl FrameStats {
    fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Unprojectable => self.unprojectable += 1,
            Rejection::BehindCamera => self.culled_behind += 1,
            Rejection::Offscreen => self.culled_offscreen += 1,
            Rejection::BackFace => self.culled_backface += 1,
        }
    }

    pub fn merge(&mut self, other: FrameStats) {
        self.triangles += other.triangles;
        self.unprojectable += other.unprojectable;
        self.culled_behind += other.culled_behind;
        self.culled_offscreen += other.culled_offscreen;
        self.culled_backface += other.culled_backface;
        self.drawn += other.drawn;
        self.pixels_written += other.pixels_written;
    }
}

/// Attributes that vary linearly along an edge.
/// With perspective correction, `w` is 1/w and `color` is premultiplied by it.
#[derive(Debug, Clone, Copy)]
struct EdgePoint {
    x: f32,
    z: f32,
    w: f32,
    color: [f32; 4],
}

fn edge_point(v: &ScreenVertex, perspective_correct: bool) -> EdgePoint {
    let w = if perspective_correct { v.recip_w } else { 1.0 };
    let color = v.color.map(Color::to_f32).unwrap_or([0.0; 4]);
    EdgePoint {
        x: v.x,
        z: v.z,
        w,
        color: color.map(|c| c * w),
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_point(a: &EdgePoint, b: &EdgePoint, t: f32) -> EdgePoint {
    let mut color = [0.0; 4];
    for (i, c) in color.iter_mut().enumerate() {
        *c = lerp(a.color[i], b.color[i], t);
    }
    EdgePoint {
        x: lerp(a.x, b.x, t),
        z: lerp(a.z, b.z, t),
        w: lerp(a.w, b.w, t),
        color,
    }
}

/// Point on edge a->b at scanline height `y`. Caller guarantees `b_y > a_y`.
fn edge_at(a: &EdgePoint, a_y: f32, b: &EdgePoint, b_y: f32, y: f32) -> EdgePoint {
    lerp_point(a, b, (y - a_y) / (b_y - a_y))
}

/// First pixel index whose center is at or past `edge`, clamped to [0, limit]
fn first_pixel(edge: f32, limit: usize) -> usize {
    (edge - 0.5).ceil().clamp(0.0, limit as f32) as usize
}

/// Fill a triangle one scanline at a time, depth-tested.
///
/// Pixel (x, y) is covered when its center (x + 0.5, y + 0.5) lies inside the
/// triangle; top/left edges are inclusive and bottom/right exclusive. Depth is
/// interpolated linearly in screen space. If all three vertices carry a color
/// it is interpolated (through 1/w when `perspective_correct`), otherwise
/// `fallback` is used. Returns the number of pixels written.
pub fn fill_triangle(
    fb: &mut Framebuffer,
    v0: &ScreenVertex,
    v1: &ScreenVertex,
    v2: &ScreenVertex,
    fallback: Color,
    perspective_correct: bool,
) -> usize {
    // Stable sort: equal y keeps submission order
    let mut sorted = [*v0, *v1, *v2];
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
    let [top, mid, bottom] = sorted;

    // Zero height (or NaN) covers nothing
    if !(bottom.y - top.y > 0.0) {
        return 0;
    }

    let use_color = sorted.iter().all(|v| v.color.is_some());
    let p_top = edge_point(&top, perspective_correct);
    let p_mid = edge_point(&mid, perspective_correct);
    let p_bottom = edge_point(&bottom, perspective_correct);

    let y_start = first_pixel(top.y, fb.height);
    let y_end = first_pixel(bottom.y, fb.height);
    let mut written = 0;

    for y in y_start..y_end {
        let py = y as f32 + 0.5;

        let long = edge_at(&p_top, top.y, &p_bottom, bottom.y, py);
        let short = if py < mid.y {
            edge_at(&p_top, top.y, &p_mid, mid.y, py)
        } else {
            edge_at(&p_mid, mid.y, &p_bottom, bottom.y, py)
        };
        let (left, right) = if long.x <= short.x { (long, short) } else { (short, long) };

        let x_start = first_pixel(left.x, fb.width);
        let x_end = first_pixel(right.x, fb.width);
        let span = right.x - left.x;

        for x in x_start..x_end {
            let s = if span > 0.0 { (x as f32 + 0.5 - left.x) / span } else { 0.0 };
            let p = lerp_point(&left, &right, s);

            if !fb.depth_test(x, y, p.z) {
                continue;
            }

            let color = if use_color {
                let inv_w = if p.w != 0.0 { 1.0 / p.w } else { 0.0 };
                Color::from_f32(
                    p.color[0] * inv_w,
                    p.color[1] * inv_w,
                    p.color[2] * inv_w,
                    p.color[3] * inv_w,
                )
            } else {
                fallback
            };
            fb.set_pixel(x, y, color);
            written += 1;
        }
    }

    written
}

/// Liang-Barsky clip of segment a->b to [0, width] x [0, height].
///
/// Works in f64 so endpoints millions of pixels away keep their slope.
/// Returns `None` when nothing of the segment is inside (or it is not finite).
fn clip_segment(a: (f32, f32), b: (f32, f32), width: usize, height: usize) -> Option<((f64, f64), (f64, f64))> {
    let (x0, y0) = (a.0 as f64, a.1 as f64);
    let (x1, y1) = (b.0 as f64, b.1 as f64);
    if ![x0, y0, x1, y1].iter().all(|c| c.is_finite()) {
        return None;
    }

    let (dx, dy) = (x1 - x0, y1 - y0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let bounds = [
        (-dx, x0),
        (dx, width as f64 - x0),
        (-dy, y0),
        (dy, height as f64 - y0),
    ];

    for (p, q) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some(((x0 + t0 * dx, y0 + t0 * dy), (x0 + t1 * dx, y0 + t1 * dy)))
}

/// Outline a projected triangle (no depth test). Edges are clipped to the
/// framebuffer first, so far off-screen vertices cost nothing extra.
pub fn draw_wireframe(fb: &mut Framebuffer, screen: &[ScreenVertex; 3], color: Color) {
    let (w, h) = (fb.width, fb.height);
    for i in 0..3 {
        let a = &screen[i];
        let b = &screen[(i + 1) % 3];
        let Some((start, end)) = clip_segment((a.x, a.y), (b.x, b.y), w, h) else {
            continue;
        };
        // Clipped points lie in [0, w] x [0, h]; the far border falls outside and is skipped
        fb.draw_line(
            start.0.floor() as i32,
            start.1.floor() as i32,
            end.0.floor() as i32,
            end.1.floor() as i32,
            color,
        );
    }
}

/// Assemble, cull, shade and rasterize every triangle of a mesh
pub fn render_mesh(
    fb: &mut Framebuffer,
    mesh: &Mesh,
    mvp: &Mat4,
    ctx: &ShadingContext,
    settings: &RasterSettings,
) -> FrameStats {
    let mut stats = FrameStats::default();

    for assembled in assemble_mesh(mesh, mvp, fb.width, fb.height, settings) {
        stats.triangles += 1;
        let mut tri = match assembled {
            Ok(tri) => tri,
            Err(rejection) => {
                stats.record(rejection);
                continue;
            }
        };

        let flat = shade_triangle(&mut tri, ctx);
        match settings.shading {
            ShadingMode::Wireframe => draw_wireframe(fb, &tri.screen, flat),
            ShadingMode::Flat | ShadingMode::BlinnPhong => {
                let [a, b, c] = &tri.screen;
                stats.pixels_written += fill_triangle(fb, a, b, c, flat, settings.perspective_correct);
            }
        }
        stats.drawn += 1;
    }

    stats
}

/// Draw every model of the scene. Buffers are not cleared here.
///
/// `spin` is applied in model space before each model's own transform.
pub fn render_scene(
    fb: &mut Framebuffer,
    scene: &Scene,
    settings: &RasterSettings,
    projection: &Mat4,
    spin: &Mat4,
) -> FrameStats {
    let view = scene.camera.view_matrix();
    let view_proj = *projection * view;
    let mut stats = FrameStats::default();

    for model in &scene.models {
        let model_matrix = model.transform * *spin;
        let mvp = view_proj * model_matrix;

        for mesh in &model.meshes {
            let ctx = ShadingContext::new(
                &model_matrix,
                &scene.light,
                scene.camera.position,
                model.base_color(mesh),
                settings,
            );
            stats.merge(render_mesh(fb, mesh, &mvp, &ctx, settings));
        }
    }

    stats
}
