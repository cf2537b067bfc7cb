/// Rectangle in pixel space (always u32 coordinates)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covered by tile `(tx, ty)` of a `tile_size` grid, clipped to the canvas.
    ///
    /// Returns `None` when the tile lies entirely outside the canvas.
    pub fn for_tile(tx: u32, ty: u32, tile_size: u32, canvas_size: (u32, u32)) -> Option<Self> {
        let x = tx.checked_mul(tile_size)?;
        let y = ty.checked_mul(tile_size)?;
        if x >= canvas_size.0 || y >= canvas_size.1 {
            return None;
        }

        Some(Self {
            x,
            y,
            width: tile_size.min(canvas_size.0 - x),
            height: tile_size.min(canvas_size.1 - y),
        })
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Part of this rectangle that lies on a canvas of the given size.
    pub fn clip_to(&self, canvas_size: (u32, u32)) -> Option<Self> {
        if self.x >= canvas_size.0 || self.y >= canvas_size.1 {
            return None;
        }
        let width = self.width.min(canvas_size.0 - self.x);
        let height = self.height.min(canvas_size.1 - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self::new(self.x, self.y, width, height))
    }
}
