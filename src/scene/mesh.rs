//! Triangle meshes
//!
//! Flat attribute buffers plus a triangle index list. Validated once at
//! construction so the per-frame path can index without checks failing.

use thiserror::Error;

use crate::rasterizer::{Vec2, Vec3};

/// Mesh construction failures (fatal at load time)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("position buffer length {0} is not a multiple of 3")]
    PositionsNotTriples(usize),
    #[error("normal buffer has {normals} floats, expected {positions}")]
    NormalCountMismatch { normals: usize, positions: usize },
    #[error("uv buffer has {uvs} floats, expected {expected}")]
    UvCountMismatch { uvs: usize, expected: usize },
    #[error("index buffer length {0} is not a multiple of 3")]
    IndicesNotTriangles(usize),
    #[error("index {index} at slot {slot} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        index: u32,
        slot: usize,
        vertex_count: usize,
    },
}

/// Immutable triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    /// Index into the owning model's materials
    pub material: Option<usize>,
    positions: Vec<f32>,
    normals: Vec<f32>,
    uvs: Option<Vec<f32>>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Build and validate a mesh.
    ///
    /// Missing or all-zero normals are synthesized from the triangle winding.
    pub fn new(
        positions: Vec<f32>,
        normals: Option<Vec<f32>>,
        uvs: Option<Vec<f32>>,
        indices: Vec<u32>,
    ) -> Result<Self, MeshError> {
        if positions.len() % 3 != 0 {
            return Err(MeshError::PositionsNotTriples(positions.len()));
        }
        let vertex_count = positions.len() / 3;

        if let Some(n) = &normals {
            if n.len() != positions.len() {
                return Err(MeshError::NormalCountMismatch {
                    normals: n.len(),
                    positions: positions.len(),
                });
            }
        }
        if let Some(uv) = &uvs {
            if uv.len() != vertex_count * 2 {
                return Err(MeshError::UvCountMismatch {
                    uvs: uv.len(),
                    expected: vertex_count * 2,
                });
            }
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndicesNotTriangles(indices.len()));
        }
        if let Some((slot, &index)) = indices
            .iter()
            .enumerate()
            .find(|(_, &i)| i as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                slot,
                vertex_count,
            });
        }

        let normals = match normals {
            Some(n) if n.iter().any(|&v| v != 0.0) => n,
            _ => {
                log::debug!("synthesizing normals for {} vertices", vertex_count);
                generate_normals(&positions, &indices)
            }
        };

        Ok(Self {
            name: String::new(),
            material: None,
            positions,
            normals,
            uvs,
            indices,
        })
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_material(mut self, material: usize) -> Self {
        self.material = Some(material);
        self
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn uvs(&self) -> Option<&[f32]> {
        self.uvs.as_deref()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, i: usize) -> Vec3 {
        read_vec3(&self.positions, i)
    }

    pub fn normal(&self, i: usize) -> Vec3 {
        read_vec3(&self.normals, i)
    }

    pub fn uv(&self, i: usize) -> Option<Vec2> {
        self.uvs
            .as_ref()
            .map(|uv| Vec2::new(uv[i * 2], uv[i * 2 + 1]))
    }

    /// Vertex slots of each triangle, in submission order
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    /// Axis-aligned cube centered at the origin, 4 vertices per face so each
    /// face keeps its own normal. Faces wind counter-clockwise seen from outside.
    pub fn cube(half_extent: f32) -> Self {
        let h = half_extent;

        // (normal, four corners CCW from outside)
        let faces: [(Vec3, [Vec3; 4]); 6] = [
            // Front
            (Vec3::new(0.0, 0.0, 1.0), [
                Vec3::new(-h, -h, h), Vec3::new(h, -h, h), Vec3::new(h, h, h), Vec3::new(-h, h, h),
            ]),
            // Back
            (Vec3::new(0.0, 0.0, -1.0), [
                Vec3::new(-h, -h, -h), Vec3::new(-h, h, -h), Vec3::new(h, h, -h), Vec3::new(h, -h, -h),
            ]),
            // Top
            (Vec3::new(0.0, 1.0, 0.0), [
                Vec3::new(-h, h, -h), Vec3::new(-h, h, h), Vec3::new(h, h, h), Vec3::new(h, h, -h),
            ]),
            // Bottom
            (Vec3::new(0.0, -1.0, 0.0), [
                Vec3::new(-h, -h, -h), Vec3::new(h, -h, -h), Vec3::new(h, -h, h), Vec3::new(-h, -h, h),
            ]),
            // Right
            (Vec3::new(1.0, 0.0, 0.0), [
                Vec3::new(h, -h, -h), Vec3::new(h, h, -h), Vec3::new(h, h, h), Vec3::new(h, -h, h),
            ]),
            // Left
            (Vec3::new(-1.0, 0.0, 0.0), [
                Vec3::new(-h, -h, -h), Vec3::new(-h, -h, h), Vec3::new(-h, h, h), Vec3::new(-h, h, -h),
            ]),
        ];
        let corner_uvs = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

        let mut positions = Vec::with_capacity(72);
        let mut normals = Vec::with_capacity(72);
        let mut uvs = Vec::with_capacity(48);
        let mut indices = Vec::with_capacity(36);

        for (face_idx, (normal, corners)) in faces.iter().enumerate() {
            for corner in corners {
                positions.extend_from_slice(&[corner.x, corner.y, corner.z]);
                normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
            }
            uvs.extend_from_slice(&corner_uvs);

            // Two triangles per face
            let base = (face_idx * 4) as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            name: "cube".to_string(),
            material: None,
            positions,
            normals,
            uvs: Some(uvs),
            indices,
        }
    }

    /// Square in the XY plane facing +Z, two CCW triangles sharing a diagonal
    pub fn quad(half_extent: f32) -> Self {
        let h = half_extent;
        Self {
            name: "quad".to_string(),
            material: None,
            positions: vec![-h, -h, 0.0, h, -h, 0.0, h, h, 0.0, -h, h, 0.0],
            normals: [0.0f32, 0.0, 1.0].repeat(4),
            uvs: Some(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]),
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }
}

fn read_vec3(buf: &[f32], i: usize) -> Vec3 {
    Vec3::new(buf[i * 3], buf[i * 3 + 1], buf[i * 3 + 2])
}

/// Area-weighted vertex normals.
///
/// Each triangle adds its unnormalized cross product (length = 2x area) to its
/// three vertices, then every vertex is normalized. Vertices that no triangle
/// touches, or whose contributions cancel, keep a zero normal.
pub fn generate_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut accum = vec![Vec3::ZERO; vertex_count];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
            continue;
        }
        let p0 = read_vec3(positions, i0);
        let p1 = read_vec3(positions, i1);
        let p2 = read_vec3(positions, i2);
        let weighted = (p1 - p0).cross(p2 - p0);

        accum[i0] = accum[i0] + weighted;
        accum[i1] = accum[i1] + weighted;
        accum[i2] = accum[i2] + weighted;
    }

    accum
        .into_iter()
        .flat_map(|n| {
            let n = n.normalize();
            [n.x, n.y, n.z]
        })
        .collect()
}
