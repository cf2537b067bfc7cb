use thiserror::Error;
use tilescope_core::ConfigError;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("Canvas must be at least 1x1, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
