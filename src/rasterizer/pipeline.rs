//! Vertex projection, triangle assembly and clip/cull
//!
//! Screen space: x grows right, y grows down, origin at the top-left pixel
//! corner. Depth is NDC z remapped to [0, 1].
//!
//! Front faces wind counter-clockwise in world space. The Y flip to screen
//! space turns that into a NEGATIVE signed area, see `signed_area`.

use super::math::{Mat4, Vec2, Vec3};
use super::types::{RasterSettings, ScreenVertex};
use crate::scene::Mesh;

/// Why a triangle did not reach the rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A vertex had clip-space w == 0
    Unprojectable,
    /// A vertex lies behind the eye (clip-space w < 0)
    BehindCamera,
    /// All three vertices outside the screen rectangle
    Offscreen,
    /// Wound clockwise on screen (or zero area)
    BackFace,
}

/// A triangle that survived clip/cull, ready for shading
#[derive(Debug, Clone, Copy)]
pub struct AssembledTriangle {
    pub screen: [ScreenVertex; 3],
    /// Model-space positions
    pub positions: [Vec3; 3],
    /// Model-space vertex normals
    pub normals: [Vec3; 3],
    pub uvs: Option<[Vec2; 3]>,
}

/// Map a model-space point through `mvp` to screen space.
///
/// Returns `None` when clip w is exactly zero.
pub fn project(point: Vec3, mvp: &Mat4, width: usize, height: usize) -> Option<ScreenVertex> {
    let clip = mvp.transform(point.extend(1.0));
    if clip.w == 0.0 {
        return None;
    }

    let recip_w = 1.0 / clip.w;
    let ndc_x = clip.x * recip_w;
    let ndc_y = clip.y * recip_w;
    let ndc_z = clip.z * recip_w;

    Some(ScreenVertex {
        x: (ndc_x + 1.0) * 0.5 * width as f32,
        y: (1.0 - ndc_y) * 0.5 * height as f32,
        z: (ndc_z + 1.0) * 0.5,
        recip_w,
        ..Default::default()
    })
}

/// Twice the signed screen-space area of (a, b, c).
/// Negative means front-facing (CCW in world space, y-down on screen).
pub fn signed_area(a: &ScreenVertex, b: &ScreenVertex, c: &ScreenVertex) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

pub fn is_front_facing(area: f32) -> bool {
    area < 0.0
}

/// Clip/cull decision on projected (pre-snap) vertices
pub fn classify(
    screen: &[ScreenVertex; 3],
    width: usize,
    height: usize,
    backface_cull: bool,
) -> Option<Rejection> {
    // The divide by a negative w mirrors the vertex through the screen center
    if screen.iter().any(|v| v.recip_w < 0.0) {
        return Some(Rejection::BehindCamera);
    }
    if screen.iter().all(|v| !v.on_screen(width, height)) {
        return Some(Rejection::Offscreen);
    }
    if backface_cull && !is_front_facing(signed_area(&screen[0], &screen[1], &screen[2])) {
        return Some(Rejection::BackFace);
    }
    None
}

/// Round screen x/y to a grid of `pitch` pixels
pub fn snap_to_grid(v: &mut ScreenVertex, pitch: f32) {
    if pitch > 0.0 {
        v.x = (v.x / pitch).round() * pitch;
        v.y = (v.y / pitch).round() * pitch;
    }
}

/// Project one indexed triangle and run clip/cull on it
pub fn assemble_triangle(
    mesh: &Mesh,
    tri: [usize; 3],
    mvp: &Mat4,
    width: usize,
    height: usize,
    settings: &RasterSettings,
) -> Result<AssembledTriangle, Rejection> {
    let positions = tri.map(|i| mesh.position(i));
    let normals = tri.map(|i| mesh.normal(i));
    let uvs = mesh.uvs().map(|_| tri.map(|i| mesh.uv(i).unwrap_or_default()));

    let mut screen = [ScreenVertex::default(); 3];
    for k in 0..3 {
        let mut v = project(positions[k], mvp, width, height).ok_or(Rejection::Unprojectable)?;
        v.normal = Some(normals[k]);
        v.uv = uvs.map(|uv| uv[k]);
        screen[k] = v;
    }

    if let Some(rejection) = classify(&screen, width, height, settings.backface_cull) {
        return Err(rejection);
    }

    // Snapping only moves what already passed clip/cull
    if settings.snap_vertices {
        for v in &mut screen {
            snap_to_grid(v, settings.snap_pitch);
        }
    }

    Ok(AssembledTriangle {
        screen,
        positions,
        normals,
        uvs,
    })
}

/// Assemble every triangle of a mesh in index order
pub fn assemble_mesh<'a>(
    mesh: &'a Mesh,
    mvp: &'a Mat4,
    width: usize,
    height: usize,
    settings: &'a RasterSettings,
) -> impl Iterator<Item = Result<AssembledTriangle, Rejection>> + 'a {
    mesh.triangles()
        .map(move |tri| assemble_triangle(mesh, tri, mvp, width, height, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Vec4;

    const W: usize = 100;
    const H: usize = 80;

    fn flat_triangle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> Mesh {
        let positions = vec![a.0, a.1, 0.0, b.0, b.1, 0.0, c.0, c.1, 0.0];
        Mesh::new(positions, None, None, vec![0, 1, 2]).unwrap()
    }

    #[test]
    fn test_project_identity_maps_ndc_to_pixels() {
        let center = project(Vec3::ZERO, &Mat4::IDENTITY, W, H).unwrap();
        assert_eq!((center.x, center.y, center.z), (50.0, 40.0, 0.5));
        assert_eq!(center.recip_w, 1.0);

        // NDC +y is the top of the screen
        let top_left = project(Vec3::new(-1.0, 1.0, -1.0), &Mat4::IDENTITY, W, H).unwrap();
        assert_eq!((top_left.x, top_left.y, top_left.z), (0.0, 0.0, 0.0));

        let bottom_right = project(Vec3::new(1.0, -1.0, 1.0), &Mat4::IDENTITY, W, H).unwrap();
        assert_eq!((bottom_right.x, bottom_right.y, bottom_right.z), (100.0, 80.0, 1.0));
    }

    #[test]
    fn test_project_rejects_zero_w() {
        let mut m = Mat4::IDENTITY;
        m.m[3] = [0.0, 0.0, 0.0, 0.0];
        assert!(project(Vec3::new(1.0, 2.0, 3.0), &m, W, H).is_none());

        // The projection matrix gives w == 0 for points in the eye plane
        let proj = Mat4::perspective(1.0, 1.0, 0.1, 10.0);
        assert!(project(Vec3::new(1.0, 1.0, 0.0), &proj, W, H).is_none());
        let w = proj.transform(Vec4::new(1.0, 1.0, 0.0, 1.0)).w;
        assert_eq!(w, 0.0);
    }

    #[test]
    fn test_near_and_far_plane_depth() {
        let (near, far) = (0.5, 50.0);
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let view = Mat4::look_at(eye, Vec3::ZERO, Vec3::UP);
        let proj = Mat4::perspective(60f32.to_radians(), W as f32 / H as f32, near, far);
        let mvp = proj * view;

        let at_near = project(Vec3::new(0.0, 0.0, 10.0 - near), &mvp, W, H).unwrap();
        assert!(at_near.z.abs() < 1e-4, "near depth {}", at_near.z);
        assert!((at_near.x - 50.0).abs() < 1e-3 && (at_near.y - 40.0).abs() < 1e-3);

        let at_far = project(Vec3::new(0.0, 0.0, 10.0 - far), &mvp, W, H).unwrap();
        assert!((at_far.z - 1.0).abs() < 1e-4, "far depth {}", at_far.z);

        assert!((at_near.recip_w - 1.0 / near).abs() < 1e-3);
    }

    #[test]
    fn test_front_face_sign_convention() {
        // CCW seen from +Z (the default camera looks down -Z at it)
        let ccw = flat_triangle((-0.5, -0.5), (0.5, -0.5), (0.0, 0.5));
        let settings = RasterSettings::default();
        let tri = assemble_triangle(&ccw, [0, 1, 2], &Mat4::IDENTITY, W, H, &settings).unwrap();
        let area = signed_area(&tri.screen[0], &tri.screen[1], &tri.screen[2]);
        assert!(area < 0.0);
        assert!(is_front_facing(area));

        // Same triangle, reversed winding
        let cw = flat_triangle((-0.5, -0.5), (0.0, 0.5), (0.5, -0.5));
        assert_eq!(
            assemble_triangle(&cw, [0, 1, 2], &Mat4::IDENTITY, W, H, &settings).unwrap_err(),
            Rejection::BackFace
        );

        // Culling disabled lets it through
        let no_cull = RasterSettings { backface_cull: false, ..RasterSettings::default() };
        assert!(assemble_triangle(&cw, [0, 1, 2], &Mat4::IDENTITY, W, H, &no_cull).is_ok());
    }

    #[test]
    fn test_zero_area_is_culled() {
        let line = flat_triangle((-0.5, 0.0), (0.0, 0.0), (0.5, 0.0));
        let settings = RasterSettings::default();
        assert_eq!(
            assemble_triangle(&line, [0, 1, 2], &Mat4::IDENTITY, W, H, &settings).unwrap_err(),
            Rejection::BackFace
        );
    }

    #[test]
    fn test_offscreen_rejection() {
        let settings = RasterSettings::default();

        // Entirely right of the screen
        let outside = flat_triangle((1.5, -0.5), (2.5, -0.5), (2.0, 0.5));
        assert_eq!(
            assemble_triangle(&outside, [0, 1, 2], &Mat4::IDENTITY, W, H, &settings).unwrap_err(),
            Rejection::Offscreen
        );

        // One vertex inside is enough; no clipping happens
        let partial = flat_triangle((0.5, -0.5), (2.5, -0.5), (2.0, 0.5));
        let tri = assemble_triangle(&partial, [0, 1, 2], &Mat4::IDENTITY, W, H, &settings).unwrap();
        assert!(tri.screen[1].x > W as f32);
    }

    #[test]
    fn test_triangle_behind_camera_is_rejected() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::UP);
        let mvp = Mat4::perspective(1.0, 1.0, 0.1, 100.0) * view;
        let settings = RasterSettings::default();

        // Front-facing as seen from +Z, but 10 units behind the eye
        let behind = Mesh::new(
            vec![-1.0, -1.0, 20.0, 1.0, -1.0, 20.0, 0.0, 1.0, 20.0],
            None,
            None,
            vec![0, 1, 2],
        )
        .unwrap();
        assert_eq!(
            assemble_triangle(&behind, [0, 1, 2], &mvp, W, H, &settings).unwrap_err(),
            Rejection::BehindCamera
        );

        // Straddling the eye plane: one vertex behind is enough
        let straddling = Mesh::new(
            vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 20.0],
            None,
            None,
            vec![0, 1, 2],
        )
        .unwrap();
        assert_eq!(
            assemble_triangle(&straddling, [0, 1, 2], &mvp, W, H, &settings).unwrap_err(),
            Rejection::BehindCamera
        );
    }

    #[test]
    fn test_unprojectable_triangle_is_dropped() {
        let tri = flat_triangle((-0.5, -0.5), (0.5, -0.5), (0.0, 0.5));
        let mut m = Mat4::IDENTITY;
        m.m[3] = [0.0, 0.0, 0.0, 0.0];
        let settings = RasterSettings::default();
        assert_eq!(
            assemble_triangle(&tri, [0, 1, 2], &m, W, H, &settings).unwrap_err(),
            Rejection::Unprojectable
        );
    }

    #[test]
    fn test_snap_runs_after_cull() {
        // Tiny front-facing sliver that collapses to zero area once snapped to 8px
        let sliver = flat_triangle((0.0, 0.0), (0.02, 0.0), (0.0, 0.02));
        let settings = RasterSettings {
            snap_vertices: true,
            snap_pitch: 8.0,
            ..RasterSettings::default()
        };
        let tri = assemble_triangle(&sliver, [0, 1, 2], &Mat4::IDENTITY, W, H, &settings).unwrap();
        for v in &tri.screen {
            assert_eq!(v.x % 8.0, 0.0);
            assert_eq!(v.y % 8.0, 0.0);
        }
        assert_eq!(signed_area(&tri.screen[0], &tri.screen[1], &tri.screen[2]), 0.0);
    }

    #[test]
    fn test_attributes_are_carried() {
        let cube = Mesh::cube(0.5);
        let settings = RasterSettings { backface_cull: false, ..RasterSettings::default() };
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UP);
        let mvp = Mat4::perspective(1.0, 1.0, 0.1, 20.0) * view;

        let first = assemble_mesh(&cube, &mvp, W, H, &settings).next().unwrap().unwrap();
        assert_eq!(first.normals[0], Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(first.screen[0].normal, Some(Vec3::new(0.0, 0.0, 1.0)));
        assert_eq!(first.uvs.unwrap()[1], Vec2::new(1.0, 0.0));
        assert_eq!(first.positions[2], Vec3::new(0.5, 0.5, 0.5));
    }
}
