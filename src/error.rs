//! Crate-level error type
//!
//! Module errors (`MeshError`, `ObjError`, ...) live next to the code that
//! raises them; `RenderError` wraps them for callers that just want `?`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::scene::{MeshError, ObjError, SceneError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Obj(#[from] ObjError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to present frame: {0}")]
    Present(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
