use std::time::Instant;

use glam::Vec3;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    config::{PhysicsParams, DEFAULT_FRAME_BUDGET_MS, DEFAULT_MAX_FRAMES_PER_STEP},
    core::{mesh::TetMesh, softbody::SoftBody},
    error::TetSimResult,
    utils::{
        allocator::{BodyArena, BodyId},
        logging::{warn_if_frame_budget_exceeded, ScopedTimer},
        profiling::StepProfiler,
    },
};

/// Scene container that steps every soft body with one shared parameter set.
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    bodies: BodyArena<SoftBody>,
    params: PhysicsParams,
    paused: bool,
    parallel_enabled: bool,
    time_accumulated: f32,
    frame_budget_ms: f32,
    max_frames_per_step: usize,
    frame_count: u64,
    profiler: StepProfiler,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::with_params(PhysicsParams::default())
    }
}

impl PhysicsWorld {
    /// Creates an empty world after validating `params`.
    pub fn new(params: PhysicsParams) -> TetSimResult<Self> {
        params.validate()?;
        Ok(Self::with_params(params))
    }

    fn with_params(params: PhysicsParams) -> Self {
        Self {
            bodies: BodyArena::new(),
            params,
            paused: false,
            parallel_enabled: false,
            time_accumulated: 0.0,
            frame_budget_ms: DEFAULT_FRAME_BUDGET_MS,
            max_frames_per_step: DEFAULT_MAX_FRAMES_PER_STEP,
            frame_count: 0,
            profiler: StepProfiler::default(),
        }
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Replaces the parameter set used from the next frame on.
    ///
    /// Density is only read at body construction; existing bodies keep their
    /// masses.
    pub fn set_params(&mut self, params: PhysicsParams) -> TetSimResult<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.parallel_enabled = enabled;
        for body in self.bodies.iter_mut() {
            body.set_parallel(enabled);
        }
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel_enabled
    }

    pub fn set_frame_budget_ms(&mut self, budget_ms: f32) {
        self.frame_budget_ms = budget_ms;
    }

    /// Caps the frames one [`PhysicsWorld::step`] call may run; at least one.
    pub fn set_max_frames_per_step(&mut self, max_frames: usize) {
        self.max_frames_per_step = max_frames.max(1);
    }

    // ---------------------------------------------------------------- bodies

    /// Builds a soft body from `mesh` with the current parameters.
    pub fn add_body(&mut self, mesh: &TetMesh) -> TetSimResult<BodyId> {
        let body = SoftBody::new(mesh, &self.params)?;
        Ok(self.insert_body(body))
    }

    pub fn insert_body(&mut self, mut body: SoftBody) -> BodyId {
        body.set_parallel(self.parallel_enabled);
        let id = self.bodies.insert(body);
        log::debug!("added soft body {id:?}");
        id
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<SoftBody> {
        let removed = self.bodies.remove(id);
        if removed.is_some() {
            log::debug!("removed soft body {id:?}");
        }
        removed
    }

    pub fn body(&self, id: BodyId) -> Option<&SoftBody> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut SoftBody> {
        self.bodies.get_mut(id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &SoftBody> + '_ {
        self.bodies.iter()
    }

    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.ids()
    }

    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    // ----------------------------------------------------------------- pause

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // -------------------------------------------------------------- stepping

    /// Runs one full frame: `num_substeps` substeps over every body, then the
    /// end-of-frame refresh.
    ///
    /// Does nothing while paused. Returns whether a frame was simulated.
    pub fn step_frame(&mut self) -> bool {
        if self.paused {
            return false;
        }

        let frame_start = Instant::now();
        let params = self.params;
        let dt = params.substep_dt();

        for body in self.bodies.iter_mut() {
            body.begin_frame();
        }

        {
            let label = if self.parallel_enabled {
                "substeps::parallel"
            } else {
                "substeps::sequential"
            };
            let _timer = ScopedTimer::new(label);
            for _ in 0..params.num_substeps {
                self.simulate_bodies(dt, &params);
            }
        }

        {
            let _timer = ScopedTimer::new("frame::end");
            for body in self.bodies.iter_mut() {
                body.end_frame();
            }
        }

        self.profiler.reset();
        for body in self.bodies.iter() {
            self.profiler.accumulate(body.profiler());
        }
        self.profiler.total_frame_time = frame_start.elapsed();
        self.frame_count += 1;
        warn_if_frame_budget_exceeded(self.profiler.total_frame_time, self.frame_budget_ms);
        true
    }

    /// Accumulates `elapsed` seconds and runs one frame per `time_step` of
    /// accumulated time, at most `max_frames_per_step` of them. Time left over
    /// past the cap is dropped. Returns the number of frames simulated.
    pub fn step(&mut self, elapsed: f32) -> usize {
        if self.paused {
            return 0;
        }
        if !elapsed.is_finite() || elapsed < 0.0 {
            log::warn!("ignoring invalid elapsed time {elapsed}");
            return 0;
        }

        self.time_accumulated += elapsed;
        let mut frames = 0;
        while self.time_accumulated >= self.params.time_step {
            if frames == self.max_frames_per_step {
                log::warn!(
                    "dropping {:.3} s of simulation backlog after {} frames",
                    self.time_accumulated,
                    frames
                );
                self.time_accumulated = 0.0;
                break;
            }
            self.time_accumulated -= self.params.time_step;
            self.step_frame();
            frames += 1;
        }
        frames
    }

    fn simulate_bodies(&mut self, dt: f32, params: &PhysicsParams) {
        #[cfg(feature = "parallel")]
        if self.parallel_enabled {
            let mut bodies: Vec<&mut SoftBody> = self.bodies.iter_mut().collect();
            bodies
                .par_iter_mut()
                .for_each(|body| body.simulate(dt, params));
            return;
        }

        for body in self.bodies.iter_mut() {
            body.simulate(dt, params);
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Summed profile of the last simulated frame.
    pub fn profiler(&self) -> &StepProfiler {
        &self.profiler
    }

    pub fn report_profile(&self) {
        self.profiler.report();
    }

    // ------------------------------------------------------------------ grab

    /// Grabs the particle of body `id` nearest to `point`.
    pub fn start_grab(&mut self, id: BodyId, point: Vec3) -> Option<usize> {
        self.bodies.get_mut(id)?.start_grab(point)
    }

    /// Moves the grab target of body `id`. Returns false for unknown bodies.
    pub fn move_grabbed(&mut self, id: BodyId, point: Vec3) -> bool {
        match self.bodies.get_mut(id) {
            Some(body) => {
                body.move_grabbed(point);
                true
            }
            None => false,
        }
    }

    pub fn end_grab(&mut self, id: BodyId) {
        if let Some(body) = self.bodies.get_mut(id) {
            body.end_grab();
        }
    }
}
