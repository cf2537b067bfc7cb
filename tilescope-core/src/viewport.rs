use crate::transforms::{calculate_aspect_ratio, Mat3};
use serde::{Deserialize, Serialize};

/// Visible region of the parameter plane.
///
/// - `x`, `y`: top-left corner in parameter-plane units
/// - `width`, `height`: extent in parameter-plane units
///
/// Pixel `(0, 0)` maps to the top-left corner and pixel `(canvas_w, canvas_h)`
/// to the bottom-right corner. `height` tracks the canvas aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Parameter-plane units covered by one pixel, per axis.
    pub fn units_per_pixel(&self, canvas_size: (u32, u32)) -> (f64, f64) {
        (
            self.width / canvas_size.0 as f64,
            self.height / canvas_size.1 as f64,
        )
    }

    /// Map a pixel position to parameter-plane coordinates.
    pub fn to_param(&self, px: f64, py: f64, canvas_size: (u32, u32)) -> (f64, f64) {
        let (ux, uy) = self.units_per_pixel(canvas_size);
        (self.x + px * ux, self.y + py * uy)
    }

    /// Inverse of [`Viewport::to_param`].
    pub fn from_param(&self, x: f64, y: f64, canvas_size: (u32, u32)) -> (f64, f64) {
        let (ux, uy) = self.units_per_pixel(canvas_size);
        ((x - self.x) / ux, (y - self.y) / uy)
    }

    /// Scale the extent by `factor`, keeping the point under `(px, py)` fixed.
    ///
    /// `factor < 1` zooms in. Callers pass fixed multiplicative steps, so the
    /// extent stays positive.
    pub fn zoom_at(&self, px: f64, py: f64, factor: f64, canvas_size: (u32, u32)) -> Self {
        let (anchor_x, anchor_y) = self.to_param(px, py, canvas_size);
        let fx = px / canvas_size.0 as f64;
        let fy = py / canvas_size.1 as f64;

        let width = self.width * factor;
        let height = self.height * factor;

        Self {
            x: anchor_x - fx * width,
            y: anchor_y - fy * height,
            width,
            height,
        }
    }

    /// Translate by a pixel delta.
    pub fn pan_by(&self, dx_px: f64, dy_px: f64, canvas_size: (u32, u32)) -> Self {
        let (ux, uy) = self.units_per_pixel(canvas_size);
        Self {
            x: self.x + dx_px * ux,
            y: self.y + dy_px * uy,
            ..*self
        }
    }

    /// Viewport that reproduces a scale+translate preview of this viewport.
    ///
    /// `transform` maps pixels of the current rendering to where they are
    /// displayed. The returned viewport renders, at every displayed pixel, the
    /// parameter point that the preview shows there.
    pub fn apply_pixel_transform(&self, transform: &Mat3, canvas_size: (u32, u32)) -> Self {
        if transform.is_identity() {
            return *self;
        }
        let inverse = transform.inverse().unwrap_or_else(Mat3::identity);
        let (ux, uy) = self.units_per_pixel(canvas_size);

        // inverse(q) = scale * q + offset for scale+translate matrices
        let scale_x = inverse.data[0][0];
        let scale_y = inverse.data[1][1];
        let offset_x = inverse.data[0][2];
        let offset_y = inverse.data[1][2];

        Self {
            x: self.x + offset_x * ux,
            y: self.y + offset_y * uy,
            width: self.width * scale_x,
            height: self.height * scale_y,
        }
    }

    /// Recompute `height` so the viewport matches the canvas aspect ratio.
    pub fn fit_to_canvas(&self, canvas_size: (u32, u32)) -> Self {
        let aspect = calculate_aspect_ratio(canvas_size.0, canvas_size.1);
        Self {
            height: self.width / aspect,
            ..*self
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(-2.5, -1.5, 3.5, 3.5)
    }
}
