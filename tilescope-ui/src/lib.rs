pub mod error;
pub mod explorer;
pub mod interaction;
pub mod rendering;
pub mod workers;

pub use error::ExplorerError;
pub use explorer::Explorer;
pub use interaction::{Effect, InputEvent, InteractionState};
pub use rendering::{Compositor, Raster, RasterCompositor, RenderProgress};
pub use workers::WorkerPool;
