//! TOML presets: simulation settings plus the emitter, force and render tables

use ember_core::{EmberError, Result};
use ember_particles::{EmitterConfig, ExecutionMode, ForceConfig, RenderConfig, MAX_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub capacity: usize,
    pub seed: u32,
    /// Fixed step fed to every frame, in seconds
    pub dt: f32,
    pub frames: u32,
    pub mode: ExecutionMode,
    /// One-shot burst queued before the first frame
    pub burst: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            seed: 1,
            dt: 1.0 / 60.0,
            frames: 300,
            mode: ExecutionMode::Sequential,
            burst: 0,
        }
    }
}

/// A complete scene description for the headless driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub simulation: SimulationSettings,
    pub emitter: EmitterConfig,
    pub forces: ForceConfig,
    pub render: RenderConfig,
}

impl Preset {
    /// Parse and validate a preset. Every table is optional.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let preset: Preset = toml::from_str(source)?;
        preset.validate()?;
        Ok(preset)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EmberError::SerializeError(e.to_string()))
    }

    /// Reject settings the driver cannot run with.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.capacity > MAX_CAPACITY {
            return Err(EmberError::CapacityLimit {
                requested: sim.capacity,
                max: MAX_CAPACITY,
            });
        }
        if !sim.dt.is_finite() || sim.dt <= 0.0 {
            return Err(EmberError::InvalidConfig(format!(
                "simulation.dt must be a positive number of seconds, got {}",
                sim.dt
            )));
        }
        Ok(())
    }

    /// Fields the engine will clamp when it sanitizes this preset.
    pub fn clamped_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let emitter = self.emitter.sanitized();
        let e = &self.emitter;
        let checks = [
            ("emitter.shape", emitter.shape != e.shape),
            ("emitter.cone_angle", emitter.cone_angle != e.cone_angle),
            ("emitter.rotation", emitter.rotation != e.rotation),
            ("emitter.position", emitter.position != e.position),
            ("emitter.rate", emitter.rate != e.rate),
            ("emitter.initial_speed", emitter.initial_speed != e.initial_speed),
            ("emitter.speed_random", emitter.speed_random != e.speed_random),
            ("emitter.life_seconds", emitter.life_seconds != e.life_seconds),
            ("emitter.life_random", emitter.life_random != e.life_random),
            ("emitter.base_life_jitter", emitter.base_life_jitter != e.base_life_jitter),
            ("emitter.size", emitter.size != e.size),
            ("emitter.size_random", emitter.size_random != e.size_random),
            ("emitter.spin_speed", emitter.spin_speed != e.spin_speed),
            ("emitter.spin_random", emitter.spin_random != e.spin_random),
            ("emitter.color", emitter.color != e.color),
            ("emitter.duration", emitter.duration != e.duration),
        ];
        fields.extend(checks.iter().filter(|(_, changed)| *changed).map(|(name, _)| *name));

        let forces = self.forces.sanitized();
        let f = &self.forces;
        let checks = [
            ("forces.turbulence_strength", forces.turbulence_strength != f.turbulence_strength),
            ("forces.curl_strength", forces.curl_strength != f.curl_strength),
            ("forces.noise_scale", forces.noise_scale != f.noise_scale),
            ("forces.noise_speed", forces.noise_speed != f.noise_speed),
            ("forces.vortex", forces.vortex != f.vortex),
            ("forces.attractor", forces.attractor != f.attractor),
            ("forces.gravity", forces.gravity != f.gravity),
            ("forces.wind", forces.wind != f.wind),
            ("forces.drag", forces.drag != f.drag),
            ("forces.ground", forces.ground != f.ground),
        ];
        fields.extend(checks.iter().filter(|(_, changed)| *changed).map(|(name, _)| *name));
        fields
    }
}
