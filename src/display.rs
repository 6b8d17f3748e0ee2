//! Window presentation and camera input (macroquad)

use macroquad::prelude::*;

use scanline_renderer::rasterizer::DisplaySurface;
use scanline_renderer::{DriverState, FrameDriver, RenderError};

/// Mouse sensitivity for right-drag look, radians per pixel
const LOOK_SENSITIVITY: f32 = 0.005;

/// Uploads each frame as a texture and draws it scaled to fill the window
pub struct MacroquadSurface;

impl DisplaySurface for MacroquadSurface {
    fn present(&mut self, width: usize, height: usize, rgba: &[u8]) -> Result<(), RenderError> {
        let texture = Texture2D::from_rgba8(width as u16, height as u16, rgba);
        texture.set_filter(FilterMode::Nearest);

        // Aspect-preserving fit, centered
        let scale = (screen_width() / width as f32).min(screen_height() / height as f32);
        let draw_w = width as f32 * scale;
        let draw_h = height as f32 * scale;

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            (screen_width() - draw_w) * 0.5,
            (screen_height() - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(draw_w, draw_h)),
                ..Default::default()
            },
        );
        Ok(())
    }
}

/// WASD + Q/E movement, right-drag look, Escape to stop
fn handle_input(driver: &mut FrameDriver, last_mouse: &mut Option<(f32, f32)>, dt: f32) {
    if is_key_pressed(KeyCode::Escape) {
        driver.request_stop();
    }

    let camera = driver.camera_mut();
    if is_key_down(KeyCode::W) {
        camera.move_forward(dt);
    }
    if is_key_down(KeyCode::S) {
        camera.move_forward(-dt);
    }
    if is_key_down(KeyCode::A) {
        camera.strafe(-dt);
    }
    if is_key_down(KeyCode::D) {
        camera.strafe(dt);
    }
    if is_key_down(KeyCode::Q) {
        camera.rise(-dt);
    }
    if is_key_down(KeyCode::E) {
        camera.rise(dt);
    }

    let mouse_pos = mouse_position();
    if is_mouse_button_down(MouseButton::Right) {
        if let Some((last_x, last_y)) = *last_mouse {
            // Y-down screen: dragging up looks up
            let d_yaw = (mouse_pos.0 - last_x) * LOOK_SENSITIVITY;
            let d_pitch = -(mouse_pos.1 - last_y) * LOOK_SENSITIVITY;
            camera.rotate(d_yaw, d_pitch);
        }
        *last_mouse = Some(mouse_pos);
    } else {
        *last_mouse = None;
    }
}

/// Window loop; returns once the driver goes idle or presenting fails
pub async fn run_window(mut driver: FrameDriver) {
    let mut surface = MacroquadSurface;
    let mut last_mouse = None;
    let start = get_time();

    driver.start();
    while driver.state() == DriverState::Running {
        handle_input(&mut driver, &mut last_mouse, get_frame_time());

        let sim_time = (get_time() - start) as f32;
        match driver.tick(sim_time, &mut surface) {
            Ok(Some(stats)) => {
                draw_text(
                    &format!("{} tris, {} drawn, {} fps", stats.triangles, stats.drawn, get_fps()),
                    8.0,
                    20.0,
                    20.0,
                    GRAY,
                );
            }
            Ok(None) => break,
            Err(e) => {
                log::error!("present failed: {}", e);
                break;
            }
        }

        next_frame().await;
    }

    log::info!("window closed after {} frames", driver.frames_rendered());
}
