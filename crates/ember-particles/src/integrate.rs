//! Per-particle timestep: age, forces, semi-implicit Euler, ground contact

use crate::forces::{self, ForceConfig};
use crate::particle::Particle;

/// Largest timestep the integrator will take; longer frames are clamped.
pub const MAX_STEP: f32 = 1.0 / 30.0;

/// Clamp a frame delta into `[0, MAX_STEP]`. NaN and negative deltas become 0.
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_nan() || dt <= 0.0 {
        0.0
    } else {
        dt.min(MAX_STEP)
    }
}

/// Shared, read-only inputs for integrating one step.
pub struct StepEnv<'a> {
    pub forces: &'a ForceConfig,
    /// Already clamped with [`clamp_dt`]
    pub dt: f32,
    /// Simulation time driving the noise fields
    pub time: f32,
    /// Ground collision only applies when enabled and the emitter is at or
    /// above the ground plane.
    pub ground_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Alive,
    /// Age reached life; the caller must release the slot this step.
    Expired,
}

/// Advance one alive particle by `env.dt`.
pub fn advance(p: &mut Particle, env: &StepEnv) -> StepOutcome {
    let dt = env.dt;
    p.age += dt;
    if p.is_expired() {
        return StepOutcome::Expired;
    }

    let acc = forces::acceleration(p, env.forces, env.time);
    p.velocity += acc * dt;
    p.velocity = forces::apply_drag(p.velocity, env.forces.drag, dt);
    p.position += p.velocity * dt;

    if env.ground_active {
        forces::resolve_ground(p, &env.forces.ground);
    }
    StepOutcome::Alive
}
