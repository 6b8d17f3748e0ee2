//! Render configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! Every field has a default, so a file only needs the values it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{Color, Mat4, RasterSettings, Vec3};
use crate::scene::{Camera, DirectionalLight};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Direction the light travels
    pub direction: Vec3,
    pub color: Color,
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-1.0, -1.0, -1.0),
            color: Color::WHITE,
            intensity: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    /// World units per second
    pub speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            speed: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Vertical field of view
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub clear_color: Color,
    /// Idle spin around Y, radians per simulated second
    pub spin_speed: f32,
    pub raster: RasterSettings,
    pub light: LightConfig,
    pub camera: CameraConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: crate::rasterizer::WIDTH,
            height: crate::rasterizer::HEIGHT,
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            clear_color: Color::new(30, 30, 35),
            spin_speed: 0.5,
            raster: RasterSettings::default(),
            light: LightConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!("framebuffer size {}x{} must be non-zero", self.width, self.height));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return invalid(format!("fov_degrees {} must be in (0, 180)", self.fov_degrees));
        }
        if !(self.near > 0.0) {
            return invalid(format!("near plane {} must be > 0", self.near));
        }
        if !(self.far > self.near) {
            return invalid(format!("far plane {} must be > near plane {}", self.far, self.near));
        }
        if self.raster.snap_vertices && !(self.raster.snap_pitch > 0.0) {
            return invalid(format!("snap_pitch {} must be > 0", self.raster.snap_pitch));
        }
        if !(0.0..=1.0).contains(&self.raster.ambient) {
            return invalid(format!("ambient {} must be in [0, 1]", self.raster.ambient));
        }
        Ok(())
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective(self.fov_degrees.to_radians(), self.aspect(), self.near, self.far)
    }

    pub fn build_camera(&self) -> Camera {
        let mut camera = Camera::looking_at(self.camera.position, self.camera.target);
        camera.speed = self.camera.speed;
        camera
    }

    pub fn build_light(&self) -> DirectionalLight {
        DirectionalLight::new(self.light.direction, self.light.color, self.light.intensity)
    }
}

/// Load and validate a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load and validate a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    let config: RenderConfig = ron::from_str(s)?;
    config.validate()?;
    Ok(config)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::ShadingMode;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = load_config_from_str("(width: 640, raster: (shading: Flat, snap_vertices: true))").unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 240);
        assert_eq!(config.raster.shading, ShadingMode::Flat);
        assert!(config.raster.snap_vertices);
        assert_eq!(config.raster.shininess, 16.0);
        assert_eq!(config.light.intensity, 0.6);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(load_config_from_str("()").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for bad in [
            "(width: 0)",
            "(near: 0.0)",
            "(near: 5.0, far: 1.0)",
            "(fov_degrees: 180.0)",
            "(raster: (snap_vertices: true, snap_pitch: 0.0))",
            "(raster: (ambient: 1.5))",
        ] {
            assert!(
                matches!(load_config_from_str(bad), Err(ConfigError::Invalid(_))),
                "{} should be invalid",
                bad
            );
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(load_config_from_str("(width: \"wide\")"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.ron");

        let mut config = RenderConfig::default();
        config.raster.shading = ShadingMode::Wireframe;
        config.camera.position = Vec3::new(1.0, 2.0, 3.0);
        save_config(&config, &path).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
        assert!(matches!(load_config(dir.path().join("missing.ron")), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_builds_camera_and_light() {
        let config = RenderConfig::default();
        let camera = config.build_camera();
        assert!((camera.forward() - Vec3::new(0.0, 0.0, -1.0)).len() < 1e-5);
        assert_eq!(camera.speed, 5.0);
        assert!((config.build_light().direction().len() - 1.0).abs() < 1e-6);
    }
}
