//! Camera state
//!
//! Orientation is stored as yaw/pitch; the forward vector is derived:
//! `forward = (cos(yaw)cos(pitch), sin(pitch), sin(yaw)cos(pitch))`.

use serde::{Deserialize, Serialize};
use crate::rasterizer::{Mat4, Vec3};

/// Pitch limit, just short of straight up/down so look-at stays well defined
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub up: Vec3,
    /// Movement speed in world units per second
    pub speed: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    /// Camera at the origin looking down -Z
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            up: Vec3::UP,
            speed: 5.0,
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
        }
    }

    /// Camera at `position` oriented toward `target`
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let mut cam = Self {
            position,
            ..Self::new()
        };
        cam.look_at(target);
        cam
    }

    /// Re-derive yaw/pitch so the camera faces `target`.
    /// A target equal to the position leaves the orientation unchanged.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize();
        if dir.is_zero() {
            return;
        }
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = dir.z.atan2(dir.x);
    }

    pub fn forward(&self) -> Vec3 {
        Vec3 {
            x: self.yaw.cos() * self.pitch.cos(),
            y: self.pitch.sin(),
            z: self.yaw.sin() * self.pitch.cos(),
        }
    }

    /// Right vector (horizontal)
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::RIGHT)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.forward(), self.up)
    }

    pub fn move_forward(&mut self, dt: f32) {
        self.position = self.position + self.forward() * (self.speed * dt);
    }

    pub fn strafe(&mut self, dt: f32) {
        self.position = self.position + self.right() * (self.speed * dt);
    }

    pub fn rise(&mut self, dt: f32) {
        self.position = self.position + self.up * (self.speed * dt);
    }

    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 1e-5
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let cam = Camera::new();
        assert!(approx_vec(cam.forward(), Vec3::new(0.0, 0.0, -1.0)));
        assert!(approx_vec(cam.right(), Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_looking_at_origin() {
        let cam = Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        assert!(approx_vec(cam.forward(), Vec3::new(0.0, 0.0, -1.0)));

        let p = cam.view_matrix().transform_point(Vec3::ZERO);
        assert!(approx_vec(p, Vec3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    fn test_looking_at_diagonal() {
        let cam = Camera::looking_at(Vec3::new(3.0, 4.0, 5.0), Vec3::ZERO);
        let expected = Vec3::new(-3.0, -4.0, -5.0).normalize();
        assert!(approx_vec(cam.forward(), expected));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = Camera::new();
        cam.rotate(0.0, 10.0);
        assert!(cam.pitch < std::f32::consts::FRAC_PI_2);
        assert!(cam.view_matrix().m.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_movement_uses_speed() {
        let mut cam = Camera::new();
        cam.speed = 2.0;
        cam.move_forward(0.5);
        assert!(approx_vec(cam.position, Vec3::new(0.0, 0.0, -1.0)));
        cam.strafe(1.0);
        assert!(approx_vec(cam.position, Vec3::new(2.0, 0.0, -1.0)));
        cam.rise(-0.5);
        assert!(approx_vec(cam.position, Vec3::new(2.0, -1.0, -1.0)));
    }
}
