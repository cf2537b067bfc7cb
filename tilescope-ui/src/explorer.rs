//! Interactive session tying viewport, gestures, scheduling and compositing together.
//!
//! Everything here runs on the control thread. The presentation layer feeds
//! input through [`Explorer::handle_event`], calls [`Explorer::tick`] once per
//! frame and draws [`Explorer::visible`].

use crate::error::ExplorerError;
use crate::interaction::{transition, Effect, InputEvent, InteractionContext, InteractionState};
use crate::rendering::{generate_render_jobs, Compositor, Raster, RasterCompositor, RenderProgress};
use crate::workers::{resolve_worker_count, WorkerPool};
use std::time::{Duration, Instant};
use tilescope_compute::Supersampling;
use tilescope_core::{calculate_iteration_budget, ExplorerConfig, Viewport};

pub struct Explorer {
    config: ExplorerConfig,
    viewport: Viewport,
    /// Viewport width at session start; zoom depth is measured against it.
    initial_width: f64,
    canvas_size: (u32, u32),
    state: InteractionState,
    pool: WorkerPool,
    compositor: RasterCompositor,
    generation: u64,
}

fn check_canvas(width: u32, height: u32) -> Result<(), ExplorerError> {
    if width == 0 || height == 0 {
        return Err(ExplorerError::EmptyCanvas { width, height });
    }
    Ok(())
}

impl Explorer {
    /// Spawn the worker pool and set up rasters. Nothing is rendered until
    /// [`Explorer::render`] is called.
    pub fn new(config: ExplorerConfig, canvas_size: (u32, u32)) -> Result<Self, ExplorerError> {
        config.validate()?;
        check_canvas(canvas_size.0, canvas_size.1)?;

        let viewport = config.initial_viewport.fit_to_canvas(canvas_size);
        let pool = WorkerPool::new(
            resolve_worker_count(config.worker_count),
            Supersampling::new(config.supersample_grid, config.supersample_divisor),
            config.discard_stale_tiles,
        )?;
        let compositor = RasterCompositor::new(canvas_size.0, canvas_size.1, config.tile_size);

        Ok(Self {
            initial_width: viewport.width,
            viewport,
            canvas_size,
            state: InteractionState::Idle,
            pool,
            compositor,
            generation: 0,
            config,
        })
    }

    /// Start a new render generation for the current viewport.
    ///
    /// Queued jobs of the previous generation are dropped; jobs already on a
    /// worker finish and are still delivered.
    pub fn render(&mut self) -> u64 {
        self.generation += 1;
        let budget = self.iteration_budget();
        let jobs = generate_render_jobs(
            &self.viewport,
            self.canvas_size,
            self.config.tile_size,
            budget,
            self.generation,
        );

        log::info!(
            "Render generation {}: {} tiles, {} iterations, viewport {:?}",
            self.generation,
            jobs.len(),
            budget,
            self.viewport
        );

        self.pool.enqueue_render_generation(self.generation, jobs);
        self.generation
    }

    /// Feed one input event through the state machine and execute its effects.
    ///
    /// Returns the new generation if the event triggered a render.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<u64> {
        let ctx = InteractionContext {
            viewport: self.viewport,
            canvas_size: self.canvas_size,
            zoom_step: self.config.zoom_step,
        };

        let state = std::mem::take(&mut self.state);
        let (next, effects) = transition(state, event, &ctx);
        self.state = next;

        let mut rendered = None;
        for effect in effects {
            match effect {
                Effect::Preview(transform) => self.compositor.begin_preview_transform(transform),
                Effect::SetViewport(viewport) => {
                    if viewport.is_valid() {
                        self.viewport = viewport;
                    } else {
                        log::warn!("Ignoring degenerate viewport {:?}", viewport);
                    }
                }
                Effect::Commit => {
                    self.compositor.commit();
                    self.compositor.end_preview_transform();
                }
                Effect::Render => rendered = Some(self.render()),
            }
        }

        rendered
    }

    /// Composite every tile that has finished since the last call. Never blocks.
    pub fn tick(&mut self) -> usize {
        self.pool.poll(&mut self.compositor)
    }

    /// Block until all queued and in-flight jobs are composited.
    ///
    /// Returns `false` if `timeout` passed first or the remaining work sits on
    /// stalled workers.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while !self.pool.is_idle() {
            if !self.pool.has_live_workers() {
                log::warn!("Render cannot finish: all busy workers are stalled");
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            self.pool.wait(&mut self.compositor, remaining);
        }

        true
    }

    /// Adopt a new canvas size. Clears both rasters, abandons any gesture and
    /// starts a new render.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<u64, ExplorerError> {
        check_canvas(width, height)?;

        self.canvas_size = (width, height);
        self.viewport = self.viewport.fit_to_canvas(self.canvas_size);
        self.compositor.resize(width, height);
        self.state = InteractionState::Idle;

        Ok(self.render())
    }

    pub fn iteration_budget(&self) -> u32 {
        calculate_iteration_budget(self.initial_width, self.viewport.width, &self.config)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn progress(&self) -> RenderProgress {
        self.pool.progress()
    }

    pub fn scheduler(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn compositor(&self) -> &RasterCompositor {
        &self.compositor
    }

    /// Raster the presentation layer should draw.
    pub fn visible(&self) -> &Raster {
        self.compositor.visible()
    }
}
