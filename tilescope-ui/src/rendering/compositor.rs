//! Compositing tiles and gesture previews into displayable rasters.

use super::raster::Raster;
use tilescope_core::{Mat3, TileResult};

/// Surface the scheduler and the interaction layer draw through.
pub trait Compositor {
    /// Write a finished tile into the persistent raster.
    fn write_tile(&mut self, tile: &TileResult);

    /// Show the persistent raster as seen through `transform`.
    ///
    /// The first call of a gesture freezes a snapshot; later calls in the same
    /// gesture transform that snapshot, not the live raster.
    fn begin_preview_transform(&mut self, transform: Mat3);

    /// Drop the preview transform and snapshot.
    fn end_preview_transform(&mut self);

    /// Reseed the persistent raster from what is currently visible.
    fn commit(&mut self);

    /// Reallocate for a new canvas size. Contents are cleared.
    fn resize(&mut self, width: u32, height: u32);
}

/// [`Compositor`] backed by in-memory RGBA rasters.
pub struct RasterCompositor {
    tile_size: u32,
    persistent: Raster,
    visible: Raster,
    snapshot: Option<Raster>,
    preview: Option<Mat3>,
}

impl RasterCompositor {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            tile_size,
            persistent: Raster::new(width, height),
            visible: Raster::new(width, height),
            snapshot: None,
            preview: None,
        }
    }

    pub fn persistent(&self) -> &Raster {
        &self.persistent
    }

    /// What the presentation layer should draw.
    pub fn visible(&self) -> &Raster {
        &self.visible
    }

    pub fn preview_transform(&self) -> Option<&Mat3> {
        self.preview.as_ref()
    }

    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }
}

impl Compositor for RasterCompositor {
    fn write_tile(&mut self, tile: &TileResult) {
        let rect = tile.rect(self.tile_size);
        if self.persistent.blit(rect, &tile.pixels).is_none() {
            log::debug!("Tile ({}, {}) lies outside the canvas", tile.tx, tile.ty);
            return;
        }

        // During a gesture the visible raster shows the frozen snapshot.
        if self.preview.is_none() {
            self.visible.blit(rect, &tile.pixels);
        }
    }

    fn begin_preview_transform(&mut self, transform: Mat3) {
        let snapshot = self
            .snapshot
            .get_or_insert_with(|| self.persistent.clone());
        self.visible.draw_transformed(snapshot, &transform);
        self.preview = Some(transform);
    }

    fn end_preview_transform(&mut self) {
        self.preview = None;
        self.snapshot = None;
    }

    fn commit(&mut self) {
        self.persistent.copy_from(&self.visible);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.persistent.resize(width, height);
        self.visible.resize(width, height);
        self.snapshot = None;
        self.preview = None;
    }
}
