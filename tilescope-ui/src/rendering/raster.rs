//! CPU-side RGBA pixel buffers.

use tilescope_core::{Mat3, PixelRect};

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Row-major RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Transparent black raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Reallocate to a new size. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Copy a tight `rect.width × rect.height` RGBA buffer into `rect`.
    ///
    /// Parts of `rect` outside the raster are dropped. Returns the rectangle
    /// actually written.
    pub fn blit(&mut self, rect: PixelRect, src: &[u8]) -> Option<PixelRect> {
        let src_stride = rect.width as usize * 4;
        if src.len() < rect.area() as usize * 4 {
            log::warn!(
                "Tile buffer too small for {}x{} rect ({} bytes)",
                rect.width,
                rect.height,
                src.len()
            );
            return None;
        }

        let clipped = rect.clip_to(self.size())?;
        let row_bytes = clipped.width as usize * 4;

        for y in clipped.y..clipped.bottom() {
            let src_start = (y - clipped.y) as usize * src_stride;
            let dst_start = self.offset(clipped.x, y);
            self.pixels[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src[src_start..src_start + row_bytes]);
        }

        Some(clipped)
    }

    /// Overwrite this raster with `other`. Sizes must match.
    pub fn copy_from(&mut self, other: &Raster) {
        if self.size() != other.size() {
            *self = other.clone();
            return;
        }
        self.pixels.copy_from_slice(&other.pixels);
    }

    /// Fill this raster with `source` as seen through `transform`.
    ///
    /// `transform` maps source pixels to destination pixels. Each destination
    /// pixel centre is mapped back into `source` and takes the nearest pixel;
    /// pixels that land outside `source` become transparent black.
    pub fn draw_transformed(&mut self, source: &Raster, transform: &Mat3) {
        let Some(inverse) = transform.inverse() else {
            self.clear();
            return;
        };

        for y in 0..self.height {
            for x in 0..self.width {
                let (sx, sy) = inverse.apply(x as f64 + 0.5, y as f64 + 0.5);
                let value = if sx >= 0.0 && sy >= 0.0 {
                    source
                        .pixel(sx.floor() as u32, sy.floor() as u32)
                        .unwrap_or(TRANSPARENT)
                } else {
                    TRANSPARENT
                };

                let i = self.offset(x, y);
                self.pixels[i..i + 4].copy_from_slice(&value);
            }
        }
    }
}
