//! Minimal OBJ mesh source
//!
//! Reads `v`, `vt`, `vn`, `f`, `o` and `g`. Everything else (including
//! `mtllib`/`usemtl`) is skipped. Polygons are fan-triangulated and corners
//! are deduplicated into dense per-mesh vertex slots.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use super::mesh::{Mesh, MeshError};
use super::Model;
use crate::error::RenderError;
use crate::rasterizer::{Vec2, Vec3};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjError {
    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },
    #[error("line {line}: missing vector component")]
    MissingComponent { line: usize },
    #[error("line {line}: invalid face index `{token}`")]
    InvalidIndex { line: usize, token: String },
    #[error("line {line}: face needs at least 3 vertices, got {count}")]
    DegenerateFace { line: usize, count: usize },
    #[error("OBJ data does not define any vertices")]
    NoVertices,
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// One face corner, resolved to zero-based indices into the file arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Corner {
    v: usize,
    vt: Option<usize>,
    vn: Option<usize>,
}

struct Group {
    name: String,
    triangles: Vec<[Corner; 3]>,
}

/// Load an OBJ file into a model named after the file stem
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Model, RenderError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let model = load_obj_from_str(&contents, &name)?;
    log::info!(
        "Loaded {} ({} meshes, {} triangles)",
        path.display(),
        model.meshes.len(),
        model.triangle_count()
    );
    Ok(model)
}

/// Parse OBJ text into a model
pub fn load_obj_from_str(data: &str, name: &str) -> Result<Model, ObjError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut groups = vec![Group {
        name: name.to_string(),
        triangles: Vec::new(),
    }];

    for (line_no, raw) in data.lines().enumerate() {
        let line = line_no + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => positions.push(parse_vec3(parts, line)?),
            "vn" => normals.push(parse_vec3(parts, line)?),
            "vt" => {
                let u = parse_float(parts.next(), line)?;
                let v = parse_float(parts.next(), line)?;
                uvs.push(Vec2::new(u, v));
            }
            "o" | "g" => {
                let group_name = parts.collect::<Vec<_>>().join(" ");
                match groups.last_mut() {
                    // Nothing drawn yet under the previous name: just rename it
                    Some(current) if current.triangles.is_empty() => {
                        current.name = group_name;
                        continue;
                    }
                    _ => {}
                }
                groups.push(Group {
                    name: group_name,
                    triangles: Vec::new(),
                });
            }
            "f" => {
                let polygon = parts
                    .map(|token| parse_corner(token, line, positions.len(), uvs.len(), normals.len()))
                    .collect::<Result<Vec<_>, _>>()?;
                if polygon.len() < 3 {
                    return Err(ObjError::DegenerateFace {
                        line,
                        count: polygon.len(),
                    });
                }
                if let Some(current) = groups.last_mut() {
                    for i in 1..polygon.len() - 1 {
                        current.triangles.push([polygon[0], polygon[i], polygon[i + 1]]);
                    }
                }
            }
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(ObjError::NoVertices);
    }

    let meshes = groups
        .iter()
        .filter(|g| !g.triangles.is_empty())
        .map(|g| build_mesh(g, &positions, &uvs, &normals))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Model::new(name, meshes))
}

fn build_mesh(group: &Group, positions: &[Vec3], uvs: &[Vec2], normals: &[Vec3]) -> Result<Mesh, ObjError> {
    let has_uvs = group.triangles.iter().flatten().any(|c| c.vt.is_some());
    let has_normals = group.triangles.iter().flatten().any(|c| c.vn.is_some());

    let mut lookup: HashMap<Corner, u32> = HashMap::new();
    let mut out_positions = Vec::new();
    let mut out_normals = Vec::new();
    let mut out_uvs = Vec::new();
    let mut indices = Vec::with_capacity(group.triangles.len() * 3);

    for corner in group.triangles.iter().flatten() {
        let next_slot = (out_positions.len() / 3) as u32;
        let slot = *lookup.entry(*corner).or_insert_with(|| {
            let p = positions[corner.v];
            out_positions.extend_from_slice(&[p.x, p.y, p.z]);

            let n = corner.vn.map(|i| normals[i]).unwrap_or(Vec3::ZERO);
            out_normals.extend_from_slice(&[n.x, n.y, n.z]);

            let uv = corner.vt.map(|i| uvs[i]).unwrap_or_default();
            out_uvs.extend_from_slice(&[uv.x, uv.y]);
            next_slot
        });
        indices.push(slot);
    }

    let mesh = Mesh::new(
        out_positions,
        has_normals.then_some(out_normals),
        has_uvs.then_some(out_uvs),
        indices,
    )?;
    Ok(mesh.with_name(&group.name))
}

fn parse_float(token: Option<&str>, line: usize) -> Result<f32, ObjError> {
    let token = token.ok_or(ObjError::MissingComponent { line })?;
    token.parse::<f32>().map_err(|_| ObjError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>, line: usize) -> Result<Vec3, ObjError> {
    let x = parse_float(parts.next(), line)?;
    let y = parse_float(parts.next(), line)?;
    let z = parse_float(parts.next(), line)?;
    Ok(Vec3::new(x, y, z))
}

/// Parse `v`, `v/vt`, `v//vn` or `v/vt/vn`
fn parse_corner(token: &str, line: usize, n_pos: usize, n_uv: usize, n_norm: usize) -> Result<Corner, ObjError> {
    let invalid = || ObjError::InvalidIndex {
        line,
        token: token.to_string(),
    };
    let mut segments = token.split('/');

    let v = segments
        .next()
        .and_then(|s| resolve_index(s, n_pos))
        .ok_or_else(invalid)?;

    let mut optional = |len: usize| -> Result<Option<usize>, ObjError> {
        match segments.next() {
            None | Some("") => Ok(None),
            Some(s) => resolve_index(s, len).map(Some).ok_or_else(invalid),
        }
    };
    let vt = optional(n_uv)?;
    let vn = optional(n_norm)?;

    Ok(Corner { v, vt, vn })
}

/// OBJ indices are 1-based; negative values count back from the end
fn resolve_index(s: &str, len: usize) -> Option<usize> {
    let index: i64 = s.parse().ok()?;
    if index > 0 {
        let zero_based = index as usize - 1;
        (zero_based < len).then_some(zero_based)
    } else if index < 0 {
        let back = index.unsigned_abs() as usize;
        (back <= len).then_some(len - back)
    } else {
        None
    }
}
