//! Simulation context: owns the pool and emission state, runs whole steps

use crate::emission::{sanitize_dt, EmissionState, SpawnSampler};
use crate::emitter::EmitterConfig;
use crate::forces::ForceConfig;
use crate::instance::{ColorSource, InstanceBuilder, ParticleInstance, RenderConfig};
use crate::integrate::{clamp_dt, StepEnv};
use crate::pool::{ParticlePool, MAX_CAPACITY};
use crate::{parallel, sequential};
use ember_core::{EmberError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which dispatch strategy runs emission and integration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

/// Per-frame inputs. Configs are borrowed and never modified.
pub struct FrameInput<'a> {
    pub emitter: &'a EmitterConfig,
    pub forces: &'a ForceConfig,
    /// Real seconds since the previous step
    pub dt: f32,
    /// Clock for the noise fields; defaults to accumulated simulated time
    pub time: Option<f32>,
    /// Requested pool capacity; the pool grows to fit but never shrinks
    pub capacity: Option<usize>,
}

impl<'a> FrameInput<'a> {
    pub fn new(emitter: &'a EmitterConfig, forces: &'a ForceConfig, dt: f32) -> Self {
        Self {
            emitter,
            forces,
            dt,
            time: None,
            capacity: None,
        }
    }
}

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub spawned: u32,
    pub requested: u32,
    pub released: u32,
    /// Free slots ran out and emission credit was discarded
    pub clipped: bool,
    pub live: usize,
    pub capacity: usize,
}

/// Everything the engine owns for one particle system.
///
/// Drive it with [`SimulationContext::step`] once per frame, then
/// [`SimulationContext::build_instances`] to produce the render buffer.
pub struct SimulationContext {
    pool: ParticlePool,
    emission: EmissionState,
    builder: InstanceBuilder,
    mode: ExecutionMode,
    seed: u32,
    frame: u64,
    time: f32,
    last_emitter_position: Option<Vec3>,
}

impl SimulationContext {
    pub fn new(capacity: usize, seed: u32) -> Self {
        Self {
            pool: ParticlePool::new(capacity),
            emission: EmissionState::new(),
            builder: InstanceBuilder::new(),
            mode: ExecutionMode::Sequential,
            seed,
            frame: 0,
            time: 0.0,
            last_emitter_position: None,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.mode = mode;
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn emission(&self) -> &EmissionState {
        &self.emission
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Grow the pool by doubling until it holds at least `requested` slots.
    /// Returns the resulting capacity.
    pub fn reserve(&mut self, requested: usize) -> Result<usize> {
        let current = self.pool.capacity();
        if requested <= current {
            return Ok(current);
        }
        if requested > MAX_CAPACITY {
            return Err(EmberError::CapacityLimit {
                requested,
                max: MAX_CAPACITY,
            });
        }
        let mut target = current.max(1);
        while target < requested {
            target = target.saturating_mul(2);
        }
        self.pool.grow(target.min(MAX_CAPACITY))?;
        Ok(self.pool.capacity())
    }

    /// Spawn `count` extra particles on the next step, capacity permitting.
    pub fn queue_burst(&mut self, count: u32) {
        self.emission.queue_burst(count);
    }

    /// Run one full step: emission, then integration.
    ///
    /// Both stages always run to completion. A failed capacity request is
    /// logged and the step continues at the current capacity.
    pub fn step(&mut self, input: &FrameInput) -> StepReport {
        if let Some(requested) = input.capacity {
            if let Err(e) = self.reserve(requested) {
                log::warn!("keeping capacity {}: {e}", self.pool.capacity());
            }
        }

        let emitter = input.emitter.sanitized();
        let forces = input.forces.sanitized();
        let real_dt = sanitize_dt(input.dt);
        let sim_dt = clamp_dt(real_dt);

        let plan = self
            .emission
            .plan(&emitter, real_dt, self.pool.free_count());
        let to = emitter.position;
        let from = emitter
            .previous_position
            .or(self.last_emitter_position)
            .unwrap_or(to);
        let sampler = SpawnSampler {
            config: &emitter,
            from,
            to,
            seed: self.seed,
            frame: self.frame,
            count: plan.count,
        };
        let spawned = match self.mode {
            ExecutionMode::Sequential => sequential::emit(&mut self.pool, &plan, &sampler),
            ExecutionMode::Parallel => parallel::emit(&mut self.pool, &plan, &sampler),
        };

        self.time = match input.time {
            Some(t) if t.is_finite() => t,
            _ => self.time + sim_dt,
        };
        let env = StepEnv {
            forces: &forces,
            dt: sim_dt,
            time: self.time,
            ground_active: forces.ground.enabled && to.y >= forces.ground.level,
        };
        let released = match self.mode {
            ExecutionMode::Sequential => sequential::integrate(&mut self.pool, &env),
            ExecutionMode::Parallel => parallel::integrate(&mut self.pool, &env),
        };

        self.frame += 1;
        self.last_emitter_position = Some(to);
        debug_assert!(self.pool.check_partition());

        let report = StepReport {
            spawned,
            requested: plan.requested,
            released,
            clipped: plan.clipped,
            live: self.pool.live_count(),
            capacity: self.pool.capacity(),
        };
        log::trace!("step {}: {report:?}", self.frame);
        report
    }

    /// Pack live particles for the rasterizer and return the flat buffer of
    /// `live_count * 17` floats.
    pub fn build_instances(&mut self, render: &RenderConfig, emitter: &EmitterConfig) -> &[f32] {
        let colors = ColorSource::from_emitter(&emitter.sanitized());
        match self.mode {
            ExecutionMode::Sequential => self.builder.build(&self.pool, render, colors),
            ExecutionMode::Parallel => self.builder.build_parallel(&self.pool, render, colors),
        };
        self.builder.as_floats()
    }

    /// Instances from the last [`SimulationContext::build_instances`] call
    pub fn instances(&self) -> &[ParticleInstance] {
        self.builder.instances()
    }
}
