//! Escape-time kernel with smooth colouring.

use std::f64::consts::PI;
use tilescope_core::MandelbrotData;

/// |z|² beyond which an orbit counts as escaped (radius 16).
///
/// A large radius keeps the logarithmic correction of the smooth count accurate.
pub const ESCAPE_RADIUS_SQ: f64 = 256.0;

/// Angular frequency of the colour cycle in units of μ. One full cycle spans
/// `2π / COLOR_FREQUENCY` smooth iterations.
pub const COLOR_FREQUENCY: f64 = 0.1;

/// Phase offsets of the red, green and blue channels.
pub const CHANNEL_PHASES: [f64; 3] = [0.0, 2.0 * PI / 3.0, 4.0 * PI / 3.0];

/// Iterate `z ← z² + c` from `z = 0` for `c = cx + i·cy`.
pub fn evaluate(cx: f64, cy: f64, iteration_budget: u32) -> MandelbrotData {
    let mut zx = 0.0_f64;
    let mut zy = 0.0_f64;

    for i in 0..iteration_budget {
        let zx_sq = zx * zx;
        let zy_sq = zy * zy;

        let z_norm_sq = zx_sq + zy_sq;
        if z_norm_sq > ESCAPE_RADIUS_SQ {
            let smooth = smooth_iteration_count(i, z_norm_sq);
            return MandelbrotData {
                escaped: true,
                iterations: i,
                smooth,
                color: smooth_color(smooth),
            };
        }

        zy = 2.0 * zx * zy + cy;
        zx = zx_sq - zy_sq + cx;
    }

    MandelbrotData::interior(iteration_budget)
}

/// μ = n + 1 − log2(ln |z|), with `ln |z| = ln(|z|²) / 2`.
pub fn smooth_iteration_count(iterations: u32, z_norm_sq: f64) -> f64 {
    let log_z = z_norm_sq.ln() / 2.0;
    iterations as f64 + 1.0 - log_z.log2()
}

/// Map μ through three phase-shifted sinusoids.
pub fn smooth_color(mu: f64) -> [u8; 3] {
    let channel = |phase: f64| {
        let value = 127.5 + 127.5 * (COLOR_FREQUENCY * mu + phase).sin();
        value.round().clamp(0.0, 255.0) as u8
    };

    [
        channel(CHANNEL_PHASES[0]),
        channel(CHANNEL_PHASES[1]),
        channel(CHANNEL_PHASES[2]),
    ]
}
