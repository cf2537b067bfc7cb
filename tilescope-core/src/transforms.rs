//! Affine transforms in pixel space.
//!
//! Used for gesture previews: while the user drags or pinches, the already
//! rendered raster is translated and scaled instead of recomputed.

/// A single affine primitive in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Translate by (dx, dy) pixels. Positive dx moves right, positive dy moves down.
    Translate { dx: f64, dy: f64 },
    /// Uniform scale around (center_x, center_y), which stays fixed.
    /// Factor > 1 magnifies.
    Scale {
        factor: f64,
        center_x: f64,
        center_y: f64,
    },
}

/// 3x3 homogeneous matrix for 2D affine transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    /// Row-major: [[m00, m01, m02], [m10, m11, m12], [m20, m21, m22]]
    pub data: [[f64; 3]; 3],
}

impl Mat3 {
    pub fn identity() -> Self {
        Self {
            data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            data: [[1.0, 0.0, dx], [0.0, 1.0, dy], [0.0, 0.0, 1.0]],
        }
    }

    /// Scale by `factor` keeping (cx, cy) fixed.
    pub fn scale_around(factor: f64, cx: f64, cy: f64) -> Self {
        Self {
            data: [
                [factor, 0.0, cx * (1.0 - factor)],
                [0.0, factor, cy * (1.0 - factor)],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    /// self × other: applies `other` first, then `self`.
    pub fn multiply(&self, other: &Mat3) -> Self {
        let mut result = [[0.0; 3]; 3];

        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.data[i][k] * other.data[k][j]).sum();
            }
        }

        Self { data: result }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.data;
        (
            m[0][0] * x + m[0][1] * y + m[0][2],
            m[1][0] * x + m[1][1] * y + m[1][2],
        )
    }

    /// Inverse of an affine matrix. `None` when the linear part is singular.
    pub fn inverse(&self) -> Option<Self> {
        let m = &self.data;
        let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }

        let a = m[1][1] / det;
        let b = -m[0][1] / det;
        let c = -m[1][0] / det;
        let d = m[0][0] / det;

        Some(Self {
            data: [
                [a, b, -(a * m[0][2] + b * m[1][2])],
                [c, d, -(c * m[0][2] + d * m[1][2])],
                [0.0, 0.0, 1.0],
            ],
        })
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Compose transforms into one matrix. The first transform is applied first.
pub fn compose_affine_transformations(transforms: impl IntoIterator<Item = Transform>) -> Mat3 {
    transforms
        .into_iter()
        .fold(Mat3::identity(), |acc, transform| {
            let matrix = match transform {
                Transform::Translate { dx, dy } => Mat3::translation(dx, dy),
                Transform::Scale {
                    factor,
                    center_x,
                    center_y,
                } => Mat3::scale_around(factor, center_x, center_y),
            };
            matrix.multiply(&acc)
        })
}

pub fn calculate_aspect_ratio(canvas_width: u32, canvas_height: u32) -> f64 {
    canvas_width as f64 / canvas_height as f64
}
