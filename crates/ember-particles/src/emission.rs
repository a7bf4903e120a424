//! Emission controller: rate-to-count conversion and per-particle sampling

use crate::emitter::{ColorMode, DirectionMode, EmitterConfig};
use crate::particle::Particle;
use crate::rand::ParticleRng;
use crate::shape::sample_offset;
use glam::Vec3;

/// Emission bookkeeping carried between steps.
#[derive(Debug, Clone, Default)]
pub struct EmissionState {
    /// Fractional spawn credit, in [0, 1) after every step
    accumulator: f32,
    /// Seconds into the current emission cycle
    emitter_time: f32,
    /// Emission stopped after a non-looping duration ran out
    finished: bool,
    was_playing: bool,
    pending_burst: u32,
}

/// Outcome of converting one step's credit into a spawn count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPlan {
    /// Particles to spawn this step
    pub count: u32,
    /// Particles wanted before clipping to free slots
    pub requested: u32,
    /// True when free slots ran out and credit was discarded
    pub clipped: bool,
}

impl EmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn emitter_time(&self) -> f32 {
        self.emitter_time
    }

    /// Whether rate emission is currently producing particles
    pub fn is_emitting(&self) -> bool {
        self.was_playing && !self.finished
    }

    /// Queue a one-shot burst for the next step
    pub fn queue_burst(&mut self, count: u32) {
        self.pending_burst = self.pending_burst.saturating_add(count);
    }

    /// Decide how many particles to spawn this step.
    ///
    /// `available` is the number of free slots. A step that wants more than
    /// that spawns only what fits and drops the remaining credit instead of
    /// carrying it forward, so a full pool never builds up a pending burst.
    ///
    /// A paused emitter spawns nothing and drops any queued burst.
    pub fn plan(&mut self, config: &EmitterConfig, dt: f32, available: usize) -> SpawnPlan {
        let dt = sanitize_dt(dt);

        if config.playing && !self.was_playing {
            self.emitter_time = 0.0;
            self.finished = false;
        }
        if !config.playing {
            self.accumulator = 0.0;
            self.pending_burst = 0;
        }
        self.was_playing = config.playing;

        let mut from_rate: u64 = 0;
        if self.is_emitting() {
            self.accumulator += config.rate * dt;
            if self.accumulator.is_finite() {
                let whole = self.accumulator.floor();
                self.accumulator -= whole;
                from_rate = whole as u64;
            } else {
                // Credit overflowed; saturate so the ceiling and clip still apply
                self.accumulator = 0.0;
                from_rate = u64::MAX;
            }
            self.advance_cycle(config, dt);
        }

        let burst = std::mem::take(&mut self.pending_burst) as u64;
        let requested = from_rate
            .saturating_add(burst)
            .min(config.max_spawn_per_step as u64) as u32;

        let available = available.min(u32::MAX as usize) as u32;
        if requested > available {
            self.accumulator = 0.0;
            log::trace!("emission clipped: wanted {requested}, {available} slot(s) free");
            return SpawnPlan {
                count: available,
                requested,
                clipped: true,
            };
        }
        SpawnPlan {
            count: requested,
            requested,
            clipped: false,
        }
    }

    fn advance_cycle(&mut self, config: &EmitterConfig, dt: f32) {
        self.emitter_time = (self.emitter_time + dt).min(f32::MAX);
        if config.duration > 0.0 && self.emitter_time >= config.duration {
            if config.looping {
                self.emitter_time %= config.duration;
            } else {
                self.finished = true;
                self.accumulator = 0.0;
            }
        }
    }
}

/// Clamp a frame delta to a usable value: NaN and negative deltas become 0,
/// and an infinite delta becomes the largest finite one.
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_nan() {
        0.0
    } else {
        dt.clamp(0.0, f32::MAX)
    }
}

/// Everything needed to sample the particles of one emission step.
pub struct SpawnSampler<'a> {
    pub config: &'a EmitterConfig,
    /// Emitter position at the start of the step
    pub from: Vec3,
    /// Emitter position at the end of the step
    pub to: Vec3,
    pub seed: u32,
    pub frame: u64,
    /// Number of lanes in this step
    pub count: u32,
}

impl SpawnSampler<'_> {
    /// Sample the particle for one emission lane.
    ///
    /// Depends only on the lane number, never on which lanes ran before it.
    pub fn sample(&self, lane: u32) -> Particle {
        let config = self.config;
        let mut rng = ParticleRng::for_lane(self.seed, self.frame, lane);
        let orientation = config.orientation();

        let local = sample_offset(&config.shape, config.emit_from, &mut rng);
        let offset = orientation * local;

        // Stratified sub-step time so a moving emitter leaves a trail
        let t = (lane as f32 + rng.next_f32()) / self.count.max(1) as f32;
        let position = self.from.lerp(self.to, t) + offset;

        let direction = match config.direction {
            DirectionMode::Directional => {
                rng.cone_direction(orientation * Vec3::Y, config.cone_angle)
            }
            DirectionMode::Spherical => rng.random_direction(),
            DirectionMode::Outward => match offset.try_normalize() {
                Some(d) => d,
                None => rng.random_direction(),
            },
        };
        let speed = (config.initial_speed * rng.jitter(config.speed_random)).max(0.0);

        let jitter = config.base_life_jitter * rng.signed() + config.life_random * rng.signed();
        let life = config.life_seconds * (1.0 + jitter).max(0.1);

        let size = (config.size * rng.jitter(config.size_random)).max(0.0);
        let spin_axis = rng.random_direction();
        let spin_rate = config.spin_speed * rng.jitter(config.spin_random);
        let seed = rng.next_f32();

        let color = match config.color_mode {
            ColorMode::Solid | ColorMode::Gradient => config.color,
            ColorMode::Random => rng.random_color(),
        };

        Particle {
            position,
            velocity: direction * speed,
            age: 0.0,
            life,
            seed,
            spin_axis,
            spin_rate,
            size,
            color,
            alive: true,
        }
    }
}
