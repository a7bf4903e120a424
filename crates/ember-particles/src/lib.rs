//! Ember Particles - particle lifecycle engine
//!
//! Simulates a large, constantly changing population of short-lived point
//! particles and packs them for an external rasterizer:
//! - Fixed-capacity slot pool with an atomic free-slot stack
//! - Drift-free emission with no catch-up bursts after stalled frames
//! - Turbulence, curl noise, vortex, attractor, gravity, wind, drag, ground
//! - 17-float render attributes with size/opacity curves and color gradients
//!
//! The same step runs either as an ordered scan ([`ExecutionMode::Sequential`])
//! or as rayon dispatches ([`ExecutionMode::Parallel`]) over one shared pool.

pub mod context;
pub mod emission;
pub mod emitter;
pub mod forces;
pub mod instance;
pub mod integrate;
pub mod noise;
pub mod parallel;
pub mod particle;
pub mod pool;
pub mod rand;
pub mod sequential;
pub mod shape;

pub use context::{ExecutionMode, FrameInput, SimulationContext, StepReport};
pub use emission::{EmissionState, SpawnPlan};
pub use emitter::{ColorMode, DirectionMode, EmitterConfig};
pub use forces::{AttractorConfig, ForceConfig, GroundConfig, NoiseMode, VortexConfig};
pub use instance::{
    DepthSort, InstanceBuilder, ParticleInstance, RenderConfig, FLOATS_PER_INSTANCE,
};
pub use particle::Particle;
pub use pool::{ParticlePool, SlotIndex, MAX_CAPACITY};
pub use shape::{EmitFrom, EmitterShape};
