use std::collections::HashSet;
use std::io::Write;

use scanline_renderer::rasterizer::{
    project, render_scene, Axis, Color, Framebuffer, Mat4, RasterSettings, ShadingMode, Vec3,
};
use scanline_renderer::scene::{load_obj, Camera, DirectionalLight, Mesh, Model, Scene};
use scanline_renderer::{FrameDriver, RenderConfig};
use tempfile::NamedTempFile;

const WIDTH: usize = 320;
const HEIGHT: usize = 240;

fn cube_transform() -> Mat4 {
    Mat4::rotation(Axis::X, 0.4) * Mat4::rotation(Axis::Y, -0.6)
}

fn tilted_cube_scene() -> Scene {
    Scene::builder()
        .model(Model::new("cube", vec![Mesh::cube(0.5)]).with_transform(cube_transform()))
        .camera(Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO))
        .light(DirectionalLight::new(Vec3::new(-1.0, -1.0, -1.0), Color::WHITE, 0.6))
        .build()
        .expect("scene")
}

fn projection() -> Mat4 {
    Mat4::perspective(60f32.to_radians(), WIDTH as f32 / HEIGHT as f32, 0.1, 100.0)
}

/// Color under a model-space point of the cube
fn sample(fb: &Framebuffer, scene: &Scene, point: Vec3) -> Color {
    let mvp = projection() * scene.camera.view_matrix() * cube_transform();
    let v = project(point, &mvp, WIDTH, HEIGHT).expect("projectable");
    fb.get_pixel(v.x.floor() as usize, v.y.floor() as usize).expect("on screen")
}

#[test]
fn tilted_cube_shows_three_lit_faces() {
    let scene = tilted_cube_scene();
    let settings = RasterSettings {
        shading: ShadingMode::Flat,
        ..RasterSettings::default()
    };

    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    fb.clear(Color::BLACK);
    fb.clear_depth();
    let stats = render_scene(&mut fb, &scene, &settings, &projection(), &Mat4::IDENTITY);

    assert_eq!(stats.triangles, 12);
    assert_eq!(stats.culled_backface, 6);
    assert_eq!(stats.culled_offscreen, 0);
    assert_eq!(stats.drawn, 6);

    let top = sample(&fb, &scene, Vec3::new(0.25, 0.5, 0.0));
    let right = sample(&fb, &scene, Vec3::new(0.5, 0.25, 0.0));
    let front = sample(&fb, &scene, Vec3::new(0.25, 0.0, 0.5));

    // Front faces away from the light: ambient only
    assert_eq!(front, Color::new(30, 30, 30));
    assert!(top.luma() > right.luma());
    assert!(right.luma() > front.luma());

    let distinct: HashSet<Color> = fb
        .pixels
        .iter()
        .map(|&p| fb.byte_order().unpack(p))
        .filter(|&c| c != Color::BLACK)
        .collect();
    assert_eq!(distinct.len(), 3);

    assert_eq!(fb.get_pixel(0, 0), Some(Color::BLACK));
    assert!(stats.pixels_written >= fb.count_pixels_not(Color::BLACK));
}

#[test]
fn cube_outside_the_view_is_rejected() {
    let scene = Scene::builder()
        .model(Model::new("far", vec![Mesh::cube(0.5)]).with_transform(Mat4::translation(Vec3::new(100.0, 0.0, 0.0))))
        .camera(Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO))
        .light(DirectionalLight::new(Vec3::new(0.0, -1.0, 0.0), Color::WHITE, 1.0))
        .build()
        .expect("scene");

    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    fb.clear(Color::BLACK);
    fb.clear_depth();
    let stats = render_scene(&mut fb, &scene, &RasterSettings::default(), &projection(), &Mat4::IDENTITY);

    assert_eq!(stats.drawn, 0);
    assert_eq!(stats.culled_offscreen + stats.culled_backface, 12);
    assert_eq!(fb.count_pixels_not(Color::BLACK), 0);
}

#[test]
fn cube_behind_the_camera_is_not_drawn() {
    let scene = Scene::builder()
        .model(Model::new("behind", vec![Mesh::cube(0.5)]).with_transform(Mat4::translation(Vec3::new(0.0, 0.0, 20.0))))
        .camera(Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO))
        .light(DirectionalLight::new(Vec3::new(0.0, -1.0, 0.0), Color::WHITE, 1.0))
        .build()
        .expect("scene");

    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    fb.clear(Color::BLACK);
    fb.clear_depth();
    let stats = render_scene(&mut fb, &scene, &RasterSettings::default(), &projection(), &Mat4::IDENTITY);

    assert_eq!(stats.culled_behind, 12);
    assert_eq!(stats.drawn, 0);
    assert_eq!(fb.count_pixels_not(Color::BLACK), 0);
}

#[test]
fn obj_model_renders_through_the_driver() {
    let mut file = NamedTempFile::new().expect("temp obj");
    write!(
        file,
        "o quad\nv -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\nf 1 2 3 4\n"
    )
    .expect("write obj");

    let model = load_obj(file.path()).expect("load obj");
    assert_eq!(model.triangle_count(), 2);

    let config = RenderConfig {
        spin_speed: 0.0,
        ..RenderConfig::default()
    };
    let scene = Scene::builder()
        .camera(config.build_camera())
        .light(config.build_light())
        .model(model)
        .build()
        .expect("scene");

    let mut driver = FrameDriver::new(scene, config).expect("driver");
    let stats = driver.render_frame(0.0);
    assert_eq!(stats.drawn, 2);
    assert!(stats.pixels_written > 0);

    // Quad is centered on screen
    let center = driver.framebuffer().get_pixel(WIDTH / 2, HEIGHT / 2).expect("center");
    assert_ne!(center, driver.config().clear_color);
}
