pub mod mandelbrot;
pub mod tile_render;
pub mod worker;

pub use mandelbrot::{evaluate, smooth_color, ESCAPE_RADIUS_SQ};
pub use tile_render::{render_tile, render_tile_with, Supersampling, TileGeometry};
pub use worker::{run_worker, spawn_worker, WorkerChannels};

// Re-export core types for convenience
pub use tilescope_core::*;
