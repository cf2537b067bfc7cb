/// Kernel output for a single parameter-plane point.
#[derive(Clone, Debug, PartialEq)]
pub struct MandelbrotData {
    /// Whether the orbit left the escape radius within the budget.
    pub escaped: bool,
    /// Iterations performed. Equals the budget when the point did not escape.
    pub iterations: u32,
    /// Smooth iteration count μ. 0.0 for interior points.
    pub smooth: f64,
    /// RGB colour. Interior points are black.
    pub color: [u8; 3],
}

impl MandelbrotData {
    /// A point that stayed bounded for the whole budget.
    pub fn interior(iteration_budget: u32) -> Self {
        Self {
            escaped: false,
            iterations: iteration_budget,
            smooth: 0.0,
            color: [0, 0, 0],
        }
    }
}

impl Default for MandelbrotData {
    fn default() -> Self {
        Self::interior(0)
    }
}
