use tilescope_core::{PixelRect, RenderJob, Viewport};

/// Number of tile columns and rows needed to cover the canvas.
pub fn tile_grid_size(canvas_size: (u32, u32), tile_size: u32) -> (u32, u32) {
    (
        canvas_size.0.div_ceil(tile_size),
        canvas_size.1.div_ceil(tile_size),
    )
}

/// Generate tiles covering the canvas in row-major order.
///
/// Edge tiles are clipped to the canvas.
pub fn generate_tiles(width: u32, height: u32, tile_size: u32) -> Vec<PixelRect> {
    let (tiles_x, tiles_y) = tile_grid_size((width, height), tile_size);

    (0..tiles_y)
        .flat_map(|ty| (0..tiles_x).map(move |tx| (tx, ty)))
        .filter_map(|(tx, ty)| PixelRect::for_tile(tx, ty, tile_size, (width, height)))
        .collect()
}

/// One job per tile for the given viewport, in row-major order.
pub fn generate_render_jobs(
    viewport: &Viewport,
    canvas_size: (u32, u32),
    tile_size: u32,
    iteration_budget: u32,
    generation: u64,
) -> Vec<RenderJob> {
    let (units_x, units_y) = viewport.units_per_pixel(canvas_size);

    generate_tiles(canvas_size.0, canvas_size.1, tile_size)
        .into_iter()
        .map(|tile| {
            let (origin_x, origin_y) = viewport.to_param(tile.x as f64, tile.y as f64, canvas_size);
            RenderJob {
                tile_width: tile.width,
                tile_height: tile.height,
                iteration_budget,
                origin_x,
                origin_y,
                delta_x: tile.width as f64 * units_x,
                delta_y: tile.height as f64 * units_y,
                tx: tile.x / tile_size,
                ty: tile.y / tile_size,
                generation,
            }
        })
        .collect()
}
