pub mod worker_pool;

pub use worker_pool::{resolve_worker_count, WorkerPool};
