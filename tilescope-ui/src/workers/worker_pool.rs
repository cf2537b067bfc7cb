//! Job scheduler over a fixed pool of worker threads.
//!
//! The queue and the slot table are only touched from the control thread.
//! Workers see nothing but the jobs sent down their own channel.

use crate::rendering::{Compositor, RenderProgress};
use crossbeam_channel::{Receiver, Select, Sender, TryRecvError, TrySendError};
use std::collections::VecDeque;
use std::io;
use std::thread::JoinHandle;
use std::time::Duration;
use tilescope_compute::{spawn_worker, Supersampling, WorkerChannels};
use tilescope_core::{MainToWorker, RenderJob, TileResult, WorkerToMain};

const FALLBACK_WORKER_COUNT: usize = 4;

struct WorkerSlot {
    busy: bool,
    /// Worker channel disconnected. The slot stays busy for good.
    stalled: bool,
    in_flight: Option<RenderJob>,
    jobs: Sender<MainToWorker>,
    results: Receiver<WorkerToMain>,
    handle: JoinHandle<()>,
}

pub struct WorkerPool {
    slots: Vec<WorkerSlot>,
    pending: VecDeque<RenderJob>,
    current_generation: u64,
    progress: RenderProgress,
    discard_stale_tiles: bool,
}

/// Configured worker count, else available parallelism, else 4.
pub fn resolve_worker_count(configured: Option<usize>) -> usize {
    match configured {
        Some(0) => {
            log::warn!("Ignoring worker_count = 0, using available parallelism");
        }
        Some(n) => return n,
        None => {}
    }

    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKER_COUNT)
}

impl WorkerPool {
    pub fn new(
        worker_count: usize,
        supersampling: Supersampling,
        discard_stale_tiles: bool,
    ) -> io::Result<Self> {
        let worker_count = worker_count.max(1);
        log::info!("Creating WorkerPool with {} workers", worker_count);

        let mut slots = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let WorkerChannels {
                jobs,
                results,
                handle,
            } = spawn_worker(worker_id, supersampling)?;

            slots.push(WorkerSlot {
                busy: false,
                stalled: false,
                in_flight: None,
                jobs,
                results,
                handle,
            });
        }

        Ok(Self {
            slots,
            pending: VecDeque::new(),
            current_generation: 0,
            progress: RenderProgress::default(),
            discard_stale_tiles,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.slots.len()
    }

    pub fn busy_count(&self) -> usize {
        self.slots.iter().filter(|s| s.busy).count()
    }

    /// Jobs currently assigned to a worker.
    pub fn in_flight(&self) -> impl Iterator<Item = &RenderJob> + '_ {
        self.slots.iter().filter_map(|s| s.in_flight.as_ref())
    }

    pub fn queue_len(&self) -> usize {
        self.pending.len()
    }

    /// No queued jobs and no busy workers.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.busy_count() == 0
    }

    /// Some busy worker can still deliver a result.
    pub fn has_live_workers(&self) -> bool {
        self.slots.iter().any(|s| s.busy && !s.stalled)
    }

    pub fn current_generation(&self) -> u64 {
        self.current_generation
    }

    pub fn progress(&self) -> RenderProgress {
        self.progress
    }

    /// Replace the queue with a new generation's jobs and fill idle workers.
    ///
    /// Jobs already in flight keep running; their results still arrive.
    pub fn enqueue_render_generation(&mut self, generation: u64, jobs: Vec<RenderJob>) {
        let dropped = self.pending.len();
        if dropped > 0 {
            log::debug!(
                "Generation {} replaces {} queued jobs",
                generation,
                dropped
            );
        }

        self.current_generation = generation;
        self.progress = RenderProgress::new(generation, jobs.len() as u32);
        self.pending = jobs.into();

        for worker_id in 0..self.slots.len() {
            if self.pending.is_empty() {
                break;
            }
            self.dispatch(worker_id);
        }
    }

    /// Mark `worker_id` idle, composite `result` and hand the worker its next job.
    pub fn on_job_complete(
        &mut self,
        worker_id: usize,
        result: TileResult,
        compositor: &mut dyn Compositor,
    ) {
        let Some(slot) = self.slots.get_mut(worker_id) else {
            log::warn!("Completion from unknown worker {}", worker_id);
            return;
        };
        slot.busy = false;
        slot.in_flight = None;

        if result.generation == self.current_generation {
            compositor.write_tile(&result);
            self.progress.record(result.generation);
            log::debug!(
                "Worker {} completed tile ({}, {}) in {:.2}ms, {:.0}% done",
                worker_id,
                result.tx,
                result.ty,
                result.compute_time_ms,
                self.progress.percentage()
            );
        } else if self.discard_stale_tiles {
            log::debug!(
                "Worker {} discarded stale tile (generation {} vs current {})",
                worker_id,
                result.generation,
                self.current_generation
            );
        } else {
            log::debug!(
                "Worker {} completed stale tile (generation {} vs current {})",
                worker_id,
                result.generation,
                self.current_generation
            );
            compositor.write_tile(&result);
        }

        self.dispatch(worker_id);
    }

    /// Handle every completion that is ready now. Never blocks.
    ///
    /// Returns the number of tiles handled.
    pub fn poll(&mut self, compositor: &mut dyn Compositor) -> usize {
        let mut handled = 0;

        for worker_id in 0..self.slots.len() {
            let slot = &self.slots[worker_id];
            if !slot.busy || slot.stalled {
                continue;
            }

            match slot.results.try_recv() {
                Ok(WorkerToMain::TileComplete { result }) => {
                    self.on_job_complete(worker_id, result, compositor);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.stall(worker_id),
            }
        }

        handled
    }

    /// Block until one completion arrives or `timeout` passes.
    ///
    /// Returns `true` if a tile was handled.
    pub fn wait(&mut self, compositor: &mut dyn Compositor, timeout: Duration) -> bool {
        let waiting: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.busy && !s.stalled)
            .map(|(i, _)| i)
            .collect();
        if waiting.is_empty() {
            return false;
        }

        let (worker_id, received) = {
            let mut select = Select::new();
            for &worker_id in &waiting {
                select.recv(&self.slots[worker_id].results);
            }

            match select.select_timeout(timeout) {
                Ok(operation) => {
                    let worker_id = waiting[operation.index()];
                    (worker_id, operation.recv(&self.slots[worker_id].results))
                }
                Err(_) => return false,
            }
        };

        match received {
            Ok(WorkerToMain::TileComplete { result }) => {
                self.on_job_complete(worker_id, result, compositor);
                true
            }
            Err(_) => {
                self.stall(worker_id);
                false
            }
        }
    }

    fn dispatch(&mut self, worker_id: usize) -> bool {
        let slot = &mut self.slots[worker_id];
        if slot.busy {
            return false;
        }
        let Some(job) = self.pending.pop_front() else {
            return false;
        };

        match slot.jobs.try_send(MainToWorker::RenderTile { job: job.clone() }) {
            Ok(()) => {
                slot.busy = true;
                slot.in_flight = Some(job);
                true
            }
            Err(TrySendError::Full(_)) => {
                log::warn!("Worker {} job channel full, requeueing", worker_id);
                self.pending.push_front(job);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                slot.busy = true;
                slot.in_flight = Some(job);
                self.stall(worker_id);
                false
            }
        }
    }

    fn stall(&mut self, worker_id: usize) {
        let slot = &mut self.slots[worker_id];
        if !slot.stalled {
            log::error!(
                "Worker {} disconnected, slot stalled with tile {:?}",
                worker_id,
                slot.in_flight.as_ref().map(|job| job.tile())
            );
        }
        slot.stalled = true;
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for (worker_id, slot) in self.slots.drain(..).enumerate() {
            let WorkerSlot {
                jobs,
                results,
                handle,
                ..
            } = slot;

            let _ = jobs.try_send(MainToWorker::Terminate);
            drop(jobs);
            drop(results);

            if handle.join().is_err() {
                log::error!("Worker {} panicked", worker_id);
            }
        }
    }
}
