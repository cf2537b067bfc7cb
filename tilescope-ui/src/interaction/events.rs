/// Pixel position relative to the canvas origin.
pub type CanvasPoint = (f64, f64);

/// Input delivered by the windowing layer, already in canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    PointerLeave,
    /// `delta_y < 0` is a scroll towards the user (zoom in).
    Wheel {
        delta_y: f64,
        offset_x: f64,
        offset_y: f64,
    },
    /// `touches` lists every finger still on the surface, in order.
    TouchStart { touches: Vec<CanvasPoint> },
    TouchMove { touches: Vec<CanvasPoint> },
    TouchEnd { touches: Vec<CanvasPoint> },
}

pub fn midpoint(a: CanvasPoint, b: CanvasPoint) -> CanvasPoint {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

pub fn distance(a: CanvasPoint, b: CanvasPoint) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}
