//! Vector and matrix math for 3D rendering
//!
//! Conventions:
//! - Right-handed world space, camera looks down -Z
//! - `Mat4` is row-major and transforms column vectors (`M * v`)
//! - Composition reads right to left: `proj * view * model`

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const RIGHT: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    /// Default forward axis (camera looks down -Z)
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: -1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction.
    ///
    /// A zero-length (or non-finite length) vector comes back as `Vec3::ZERO`.
    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 || !l.is_finite() {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    /// Like `normalize`, but substitutes `fallback` for degenerate input
    pub fn normalize_or(self, fallback: Vec3) -> Vec3 {
        let n = self.normalize();
        if n == Vec3::ZERO {
            fallback
        } else {
            n
        }
    }

    fn normalize_or_else(self, fallback: impl FnOnce() -> Vec3) -> Vec3 {
        let n = self.normalize();
        if n == Vec3::ZERO {
            fallback()
        } else {
            n
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// 2D Vector (for texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Homogeneous 4D vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn truncate(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

/// 4x4 transform, row-major (`m[row][col]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_rows(m: [[f32; 4]; 4]) -> Self {
        Self { m }
    }

    /// `self * other` (apply `other` first, then `self`). Not commutative.
    pub fn mul_mat(&self, other: &Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Mat4 { m: out }
    }

    /// Full homogeneous transform
    pub fn transform(&self, v: Vec4) -> Vec4 {
        let a = v.to_array();
        let row = |i: usize| -> f32 {
            self.m[i][0] * a[0] + self.m[i][1] * a[1] + self.m[i][2] * a[2] + self.m[i][3] * a[3]
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }

    /// Transform a point (w = 1), dropping w. Only meaningful for affine matrices.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.transform(p.extend(1.0)).truncate()
    }

    /// Transform a direction (w = 0): rotation/scale only, no translation
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.transform(d.extend(0.0)).truncate()
    }

    pub fn translation(t: Vec3) -> Mat4 {
        Mat4::from_rows([
            [1.0, 0.0, 0.0, t.x],
            [0.0, 1.0, 0.0, t.y],
            [0.0, 0.0, 1.0, t.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about a single principal axis (radians, right-handed)
    pub fn rotation(axis: Axis, angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        let rows = match axis {
            Axis::X => [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, -s, 0.0],
                [0.0, s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            Axis::Y => [
                [c, 0.0, s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            Axis::Z => [
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        };
        Mat4::from_rows(rows)
    }

    /// OpenGL-style perspective projection.
    ///
    /// View-space z = -near maps to NDC z = -1 and z = -far to NDC z = +1.
    /// The last row is `[0, 0, -1, 0]`, so clip w is the view-space distance.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y * 0.5).tan();
        let range = near - far;
        Mat4::from_rows([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (far + near) / range, 2.0 * far * near / range],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Right-handed view matrix looking from `eye` toward `target`.
    ///
    /// `eye == target` falls back to looking down -Z. An `up` parallel to the
    /// view direction falls back to +X as the right axis.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let f = (target - eye).normalize_or(Vec3::FORWARD);
        let s = f
            .cross(up)
            .normalize_or_else(|| f.cross(Vec3::RIGHT).cross(f).normalize_or(Vec3::RIGHT));
        let u = s.cross(f);

        Mat4::from_rows([
            [s.x, s.y, s.z, -s.dot(eye)],
            [u.x, u.y, u.z, -u.dot(eye)],
            [-f.x, -f.y, -f.z, f.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        self.mul_mat(&other)
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        self.transform(v)
    }
}

/// Principal axis for `Mat4::rotation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}
