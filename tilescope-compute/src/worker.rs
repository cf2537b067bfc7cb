//! Worker thread body.
//!
//! Each worker owns a bounded job channel and a bounded result channel, both
//! of capacity 1. Jobs move in, pixel buffers move out; nothing is shared.

use crate::tile_render::{render_tile_with, Supersampling};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io;
use std::thread::{self, JoinHandle};
use tilescope_core::{MainToWorker, WorkerToMain};

/// Control-thread side of a spawned worker.
pub struct WorkerChannels {
    pub jobs: Sender<MainToWorker>,
    pub results: Receiver<WorkerToMain>,
    pub handle: JoinHandle<()>,
}

/// Spawn a named worker thread running [`run_worker`].
pub fn spawn_worker(worker_id: usize, supersampling: Supersampling) -> io::Result<WorkerChannels> {
    let (job_tx, job_rx) = bounded::<MainToWorker>(1);
    let (result_tx, result_rx) = bounded::<WorkerToMain>(1);

    let handle = thread::Builder::new()
        .name(format!("tilescope-worker-{}", worker_id))
        .spawn(move || run_worker(worker_id, supersampling, job_rx, result_tx))?;

    Ok(WorkerChannels {
        jobs: job_tx,
        results: result_rx,
        handle,
    })
}

/// Process jobs until told to terminate or the control side hangs up.
pub fn run_worker(
    worker_id: usize,
    supersampling: Supersampling,
    jobs: Receiver<MainToWorker>,
    results: Sender<WorkerToMain>,
) {
    log::debug!("Worker {} started", worker_id);

    for msg in jobs.iter() {
        match msg {
            MainToWorker::RenderTile { job } => {
                let result = render_tile_with(&job, supersampling);
                log::trace!(
                    "Worker {} rendered tile ({}, {}) gen {} in {:.2}ms",
                    worker_id,
                    result.tx,
                    result.ty,
                    result.generation,
                    result.compute_time_ms
                );

                if results.send(WorkerToMain::TileComplete { result }).is_err() {
                    log::debug!("Worker {}: result channel closed", worker_id);
                    break;
                }
            }
            MainToWorker::Terminate => break,
        }
    }

    log::debug!("Worker {} exiting", worker_id);
}
