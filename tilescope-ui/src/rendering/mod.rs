pub mod compositor;
pub mod raster;
pub mod render_progress;
pub mod tiles;

pub use compositor::{Compositor, RasterCompositor};
pub use raster::Raster;
pub use render_progress::RenderProgress;
pub use tiles::{generate_render_jobs, generate_tiles, tile_grid_size};
