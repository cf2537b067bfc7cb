//! Tile rendering with adaptive supersampling.
//!
//! This is the whole of what a worker does with a job, kept separate from the
//! thread plumbing so it can be tested directly.

use crate::mandelbrot::evaluate;
use std::time::Instant;
use tilescope_core::{RenderJob, TileResult, MAX_SUPERSAMPLE_GRID};

/// When and how densely a pixel is supersampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Supersampling {
    /// Samples per axis, so `grid * grid` samples per supersampled pixel.
    pub grid: u32,
    /// Supersample escaped pixels whose iteration count exceeds `budget / divisor`.
    pub divisor: u32,
}

impl Supersampling {
    pub fn new(grid: u32, divisor: u32) -> Self {
        Self {
            grid: grid.clamp(1, MAX_SUPERSAMPLE_GRID),
            divisor: divisor.max(1),
        }
    }

    pub fn threshold(&self, iteration_budget: u32) -> u32 {
        iteration_budget / self.divisor
    }
}

impl Default for Supersampling {
    fn default() -> Self {
        Self::new(4, 8)
    }
}

/// Linear pixel ↔ parameter mapping for one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGeometry {
    pub origin_x: f64,
    pub origin_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub width: u32,
    pub height: u32,
}

impl TileGeometry {
    pub fn from_job(job: &RenderJob) -> Self {
        Self {
            origin_x: job.origin_x,
            origin_y: job.origin_y,
            delta_x: job.delta_x,
            delta_y: job.delta_y,
            width: job.tile_width,
            height: job.tile_height,
        }
    }

    /// `origin + (index / tile_dim) * delta`. Fractional indices address
    /// sub-pixel positions, so pixel centres are at `index + 0.5`.
    pub fn pixel_to_param(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.origin_x + (px / self.width as f64) * self.delta_x,
            self.origin_y + (py / self.height as f64) * self.delta_y,
        )
    }

    pub fn param_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.delta_x * self.width as f64,
            (y - self.origin_y) / self.delta_y * self.height as f64,
        )
    }
}

/// Render a tile with the default supersampling settings.
pub fn render_tile(job: &RenderJob) -> TileResult {
    render_tile_with(job, Supersampling::default())
}

pub fn render_tile_with(job: &RenderJob, supersampling: Supersampling) -> TileResult {
    let start = Instant::now();
    let geometry = TileGeometry::from_job(job);
    let threshold = supersampling.threshold(job.iteration_budget);

    let mut pixels = Vec::with_capacity((job.tile_width * job.tile_height * 4) as usize);

    for py in 0..job.tile_height {
        for px in 0..job.tile_width {
            let (cx, cy) = geometry.pixel_to_param(px as f64 + 0.5, py as f64 + 0.5);
            let center = evaluate(cx, cy, job.iteration_budget);

            let color = if center.escaped && center.iterations > threshold {
                supersample(&geometry, px, py, job.iteration_budget, supersampling.grid)
            } else {
                center.color
            };

            pixels.extend_from_slice(&[color[0], color[1], color[2], 255]);
        }
    }

    TileResult {
        tx: job.tx,
        ty: job.ty,
        width: job.tile_width,
        height: job.tile_height,
        generation: job.generation,
        pixels,
        compute_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}

/// Average colour over a `grid × grid` lattice at offsets `(k + 0.5) / grid`.
fn supersample(geometry: &TileGeometry, px: u32, py: u32, budget: u32, grid: u32) -> [u8; 3] {
    let mut sum = [0u32; 3];

    for sy in 0..grid {
        for sx in 0..grid {
            let ox = (sx as f64 + 0.5) / grid as f64;
            let oy = (sy as f64 + 0.5) / grid as f64;
            let (cx, cy) = geometry.pixel_to_param(px as f64 + ox, py as f64 + oy);
            let sample = evaluate(cx, cy, budget);
            for (acc, channel) in sum.iter_mut().zip(sample.color) {
                *acc += channel as u32;
            }
        }
    }

    let count = grid * grid;
    sum.map(|total| ((total + count / 2) / count) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(origin: (f64, f64), delta: (f64, f64), size: (u32, u32), budget: u32) -> RenderJob {
        RenderJob {
            tile_width: size.0,
            tile_height: size.1,
            iteration_budget: budget,
            origin_x: origin.0,
            origin_y: origin.1,
            delta_x: delta.0,
            delta_y: delta.1,
            tx: 3,
            ty: 5,
            generation: 9,
        }
    }

    #[test]
    fn output_is_tight_rgba() {
        let result = render_tile(&job((-2.5, -1.5), (0.875, 0.875), (16, 8), 64));

        assert_eq!(result.pixels.len(), 16 * 8 * 4);
        assert_eq!((result.tx, result.ty), (3, 5));
        assert_eq!(result.generation, 9);
        assert!(result.pixels.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn interior_tile_is_black() {
        // Small square around -0.2 + 0i, well inside the main cardioid
        let result = render_tile(&job((-0.25, -0.05), (0.1, 0.1), (8, 8), 200));
        assert!(result
            .pixels
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn pixel_param_round_trip() {
        let geometry = TileGeometry::from_job(&job((-0.7, 0.2), (0.013, 0.0091), (64, 48), 100));

        for &(px, py) in &[(0.0, 0.0), (0.5, 0.5), (17.25, 40.0), (63.5, 47.5), (64.0, 48.0)] {
            let (x, y) = geometry.pixel_to_param(px, py);
            let (rx, ry) = geometry.param_to_pixel(x, y);
            assert!((rx - px).abs() < 1e-9, "{} != {}", rx, px);
            assert!((ry - py).abs() < 1e-9, "{} != {}", ry, py);
        }
    }

    #[test]
    fn pixel_center_sampling() {
        let geometry = TileGeometry::from_job(&job((0.0, 0.0), (1.0, 2.0), (4, 4), 10));
        let (x, y) = geometry.pixel_to_param(0.5, 3.5);
        assert!((x - 0.125).abs() < 1e-12);
        assert!((y - 1.75).abs() < 1e-12);
    }

    #[test]
    fn low_iteration_escapes_are_single_sampled() {
        // Far outside the set everything escapes within a couple of iterations,
        // well under budget / 8, so each pixel is the centre sample.
        let j = job((3.0, 3.0), (1.0, 1.0), (4, 4), 256);
        let result = render_tile(&j);
        let geometry = TileGeometry::from_job(&j);

        for py in 0..4u32 {
            for px in 0..4u32 {
                let (cx, cy) = geometry.pixel_to_param(px as f64 + 0.5, py as f64 + 0.5);
                let expected = evaluate(cx, cy, 256).color;
                let i = ((py * 4 + px) * 4) as usize;
                assert_eq!(&result.pixels[i..i + 3], &expected);
            }
        }
    }

    #[test]
    fn single_sample_grid_matches_center_evaluation() {
        // A 1×1 grid samples only the pixel centre, so supersampling is a no-op.
        let j = job((-0.76, 0.09), (0.02, 0.02), (8, 8), 128);
        let plain = render_tile_with(&j, Supersampling::new(1, 1));
        let geometry = TileGeometry::from_job(&j);

        for py in 0..8u32 {
            for px in 0..8u32 {
                let (cx, cy) = geometry.pixel_to_param(px as f64 + 0.5, py as f64 + 0.5);
                let expected = evaluate(cx, cy, 128).color;
                let i = ((py * 8 + px) * 4) as usize;
                assert_eq!(&plain.pixels[i..i + 3], &expected);
            }
        }
    }

    #[test]
    fn slow_escapes_average_sixteen_subsamples() {
        // Near the boundary many pixels escape after more than budget / 8 iterations.
        let j = job((-0.7436, 0.1318), (0.0004, 0.0004), (8, 8), 256);
        let result = render_tile(&j);
        let geometry = TileGeometry::from_job(&j);

        let mut supersampled = 0;
        let mut differs_from_center = 0;
        for py in 0..8u32 {
            for px in 0..8u32 {
                let (cx, cy) = geometry.pixel_to_param(px as f64 + 0.5, py as f64 + 0.5);
                let center = evaluate(cx, cy, 256);
                if !(center.escaped && center.iterations > 32) {
                    continue;
                }
                supersampled += 1;

                let mut sum = [0u32; 3];
                for sy in 0..4 {
                    for sx in 0..4 {
                        let (x, y) = geometry.pixel_to_param(
                            px as f64 + (sx as f64 + 0.5) / 4.0,
                            py as f64 + (sy as f64 + 0.5) / 4.0,
                        );
                        for (acc, channel) in sum.iter_mut().zip(evaluate(x, y, 256).color) {
                            *acc += channel as u32;
                        }
                    }
                }
                let expected = sum.map(|total| (total as f64 / 16.0).round() as u8);

                let i = ((py * 8 + px) * 4) as usize;
                assert_eq!(&result.pixels[i..i + 3], &expected, "pixel ({}, {})", px, py);
                if expected != center.color {
                    differs_from_center += 1;
                }
            }
        }

        assert!(supersampled > 0, "no pixel crossed the threshold");
        assert!(differs_from_center > 0, "supersampling never changed a pixel");
    }

    #[test]
    fn rendering_is_deterministic() {
        let j = job((-0.75, 0.05), (0.05, 0.05), (16, 16), 300);
        assert_eq!(render_tile(&j).pixels, render_tile(&j).pixels);
    }

    #[test]
    fn threshold_is_budget_over_divisor() {
        assert_eq!(Supersampling::default().threshold(256), 32);
        assert_eq!(Supersampling::new(4, 0).threshold(100), 100);
    }

    #[test]
    fn grid_is_clamped() {
        assert_eq!(Supersampling::new(0, 8).grid, 1);
        assert_eq!(Supersampling::new(65536, 8).grid, MAX_SUPERSAMPLE_GRID);
    }
}
