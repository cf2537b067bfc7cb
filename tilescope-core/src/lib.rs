pub mod compute_data;
pub mod config;
pub mod error;
pub mod messages;
pub mod pixel_rect;
pub mod transforms;
pub mod viewport;

pub use compute_data::MandelbrotData;
pub use config::{calculate_iteration_budget, ExplorerConfig, MAX_SUPERSAMPLE_GRID};
pub use error::ConfigError;
pub use messages::{MainToWorker, RenderJob, TileResult, WorkerToMain};
pub use pixel_rect::PixelRect;
pub use transforms::{calculate_aspect_ratio, compose_affine_transformations, Mat3, Transform};
pub use viewport::Viewport;
