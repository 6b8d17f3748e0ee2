//! Scene data: models, camera and light
//!
//! A `Scene` is owned by the frame driver and passed explicitly into every
//! render call. Models are read-only once loaded; the camera is the only
//! part mutated between frames (by input handling).

mod camera;
mod mesh;
mod obj;

pub use camera::Camera;
pub use mesh::{generate_normals, Mesh, MeshError};
pub use obj::{load_obj, load_obj_from_str, ObjError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{Color, Mat4, Vec3};

/// Surface description. Only a base color for now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color: Color,
}

impl Material {
    pub fn new(name: &str, base_color: Color) -> Self {
        Self {
            name: name.to_string(),
            base_color,
        }
    }
}

/// A loaded model: meshes, their materials and a placement in the world
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub transform: Mat4,
}

impl Model {
    pub fn new(name: &str, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.to_string(),
            meshes,
            materials: Vec::new(),
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    /// Base color for a mesh, falling back to the placeholder
    pub fn base_color(&self, mesh: &Mesh) -> Color {
        mesh.material
            .and_then(|i| self.materials.get(i))
            .map(|m| m.base_color)
            .unwrap_or(Color::PLACEHOLDER)
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

/// Single directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (normalized)
    direction: Vec3,
    pub color: Color,
    pub intensity: f32,
}

impl DirectionalLight {
    /// A zero direction falls back to light shining straight down
    pub fn new(direction: Vec3, color: Color, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or(Vec3::new(0.0, -1.0, 0.0)),
            color,
            intensity,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("scene has no camera")]
    MissingCamera,
    #[error("scene has no light")]
    MissingLight,
}

/// Everything one frame needs besides the framebuffer
#[derive(Debug, Clone)]
pub struct Scene {
    pub models: Vec<Model>,
    pub camera: Camera,
    pub light: DirectionalLight,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.models.iter().map(Model::triangle_count).sum()
    }
}

/// Collects scene parts; `build` fails if the camera or light is missing
#[derive(Debug, Default)]
pub struct SceneBuilder {
    models: Vec<Model>,
    camera: Option<Camera>,
    light: Option<DirectionalLight>,
}

impl SceneBuilder {
    pub fn model(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    pub fn camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn light(mut self, light: DirectionalLight) -> Self {
        self.light = Some(light);
        self
    }

    pub fn build(self) -> Result<Scene, SceneError> {
        let camera = self.camera.ok_or(SceneError::MissingCamera)?;
        let light = self.light.ok_or(SceneError::MissingLight)?;
        Ok(Scene {
            models: self.models,
            camera,
            light,
        })
    }
}
