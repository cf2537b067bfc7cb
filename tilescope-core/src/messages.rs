use crate::PixelRect;

/// One tile of work for a worker.
///
/// `origin_*` is the parameter-plane coordinate of the tile's top-left pixel
/// edge and `delta_*` the tile's extent in parameter units. Immutable once
/// enqueued.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub tile_width: u32,
    pub tile_height: u32,
    pub iteration_budget: u32,
    pub origin_x: f64,
    pub origin_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub tx: u32,
    pub ty: u32,
    /// Render generation this job belongs to.
    pub generation: u64,
}

impl RenderJob {
    /// Tile grid coordinates.
    pub fn tile(&self) -> (u32, u32) {
        (self.tx, self.ty)
    }
}

/// Pixels computed for one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileResult {
    pub tx: u32,
    pub ty: u32,
    pub width: u32,
    pub height: u32,
    pub generation: u64,
    /// Tight RGBA buffer, `width * height * 4` bytes, alpha always 255.
    pub pixels: Vec<u8>,
    pub compute_time_ms: f64,
}

impl TileResult {
    /// Destination rectangle on a canvas tiled with `tile_size`.
    pub fn rect(&self, tile_size: u32) -> PixelRect {
        PixelRect::new(
            self.tx * tile_size,
            self.ty * tile_size,
            self.width,
            self.height,
        )
    }
}

/// Messages sent from the control thread to a worker.
#[derive(Debug, Clone)]
pub enum MainToWorker {
    /// Render a tile.
    RenderTile { job: RenderJob },

    /// Terminate worker.
    Terminate,
}

/// Messages sent from a worker to the control thread.
#[derive(Debug, Clone)]
pub enum WorkerToMain {
    /// Worker completed a tile.
    TileComplete { result: TileResult },
}
