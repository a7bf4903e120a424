//! Force field: noise, vortex, attractor, gravity, wind, drag and ground.
//!
//! Terms are summed in a fixed order: noise, vortex, attractor, gravity,
//! wind. Drag scales velocity after the acceleration is applied, and ground
//! collision runs on the integrated position.

use crate::noise;
use crate::particle::Particle;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which noise field drives the particles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseMode {
    #[default]
    Turbulence,
    Curl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VortexConfig {
    pub enabled: bool,
    pub center: Vec3,
    pub axis: Vec3,
    pub strength: f32,
    pub radius: f32,
}

impl Default for VortexConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            center: Vec3::ZERO,
            axis: Vec3::Y,
            strength: 1.0,
            radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttractorConfig {
    pub enabled: bool,
    pub center: Vec3,
    pub strength: f32,
    pub radius: f32,
}

impl Default for AttractorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            center: Vec3::ZERO,
            strength: 1.0,
            radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub enabled: bool,
    pub level: f32,
    /// Restitution in [0, 1]
    pub bounce: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: 0.0,
            bounce: 0.5,
        }
    }
}

/// Read-only force settings, supplied by the caller every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub noise_mode: NoiseMode,
    pub turbulence_strength: f32,
    pub curl_strength: f32,
    /// Spatial frequency of the noise field
    pub noise_scale: f32,
    /// How fast the noise field evolves, per second
    pub noise_speed: f32,
    pub vortex: VortexConfig,
    pub attractor: AttractorConfig,
    /// Vertical acceleration; negative pulls down
    pub gravity: f32,
    pub wind: Vec3,
    /// Fraction of velocity removed per second
    pub drag: f32,
    pub ground: GroundConfig,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            noise_mode: NoiseMode::Turbulence,
            turbulence_strength: 0.0,
            curl_strength: 0.0,
            noise_scale: 1.0,
            noise_speed: 0.2,
            vortex: VortexConfig::default(),
            attractor: AttractorConfig::default(),
            gravity: 0.0,
            wind: Vec3::ZERO,
            drag: 0.0,
            ground: GroundConfig::default(),
        }
    }
}

fn finite(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn non_negative(v: f32) -> f32 {
    finite(v).max(0.0)
}

fn finite_vec(v: Vec3) -> Vec3 {
    if v.is_finite() {
        v
    } else {
        Vec3::ZERO
    }
}

impl ForceConfig {
    /// Copy with every numeric field clamped into its valid range. A negative
    /// radius becomes zero, which disables that force.
    pub fn sanitized(&self) -> Self {
        Self {
            noise_mode: self.noise_mode,
            turbulence_strength: finite(self.turbulence_strength),
            curl_strength: finite(self.curl_strength),
            noise_scale: non_negative(self.noise_scale),
            noise_speed: finite(self.noise_speed),
            vortex: VortexConfig {
                enabled: self.vortex.enabled,
                center: finite_vec(self.vortex.center),
                axis: finite_vec(self.vortex.axis)
                    .try_normalize()
                    .unwrap_or(Vec3::Y),
                strength: finite(self.vortex.strength),
                radius: non_negative(self.vortex.radius),
            },
            attractor: AttractorConfig {
                enabled: self.attractor.enabled,
                center: finite_vec(self.attractor.center),
                strength: finite(self.attractor.strength),
                radius: non_negative(self.attractor.radius),
            },
            gravity: finite(self.gravity),
            wind: finite_vec(self.wind),
            drag: non_negative(self.drag),
            ground: GroundConfig {
                enabled: self.ground.enabled,
                level: finite(self.ground.level),
                bounce: finite(self.ground.bounce).clamp(0.0, 1.0),
            },
        }
    }
}

/// Total acceleration on `p` at simulation time `time`, excluding drag and
/// ground contact.
pub fn acceleration(p: &Particle, config: &ForceConfig, time: f32) -> Vec3 {
    let mut acc = noise_force(p.position, config, time);
    if config.vortex.enabled {
        acc += vortex_force(p.position, &config.vortex);
    }
    if config.attractor.enabled {
        acc += attractor_force(p.position, &config.attractor);
    }
    acc.y += config.gravity;
    acc + config.wind
}

pub fn noise_force(position: Vec3, config: &ForceConfig, time: f32) -> Vec3 {
    let phase = time * config.noise_speed;
    let sample_at = position * config.noise_scale;
    match config.noise_mode {
        NoiseMode::Turbulence if config.turbulence_strength != 0.0 => {
            noise::turbulence(sample_at, phase) * config.turbulence_strength
        }
        NoiseMode::Curl if config.curl_strength != 0.0 => {
            noise::curl_noise(sample_at + Vec3::splat(phase)) * config.curl_strength
        }
        _ => Vec3::ZERO,
    }
}

/// Tangential swirl around `vortex.axis`, fading linearly to zero at the radius.
pub fn vortex_force(position: Vec3, vortex: &VortexConfig) -> Vec3 {
    let rel = position - vortex.center;
    let radial = rel - vortex.axis * rel.dot(vortex.axis);
    let distance = radial.length();
    if distance >= vortex.radius || distance < 1e-6 {
        return Vec3::ZERO;
    }
    let tangent = vortex.axis.cross(radial).normalize_or_zero();
    tangent * vortex.strength * (1.0 - distance / vortex.radius)
}

/// Pull toward the attractor center, fading linearly to zero at the radius.
pub fn attractor_force(position: Vec3, attractor: &AttractorConfig) -> Vec3 {
    let to_center = attractor.center - position;
    let distance = to_center.length();
    if distance >= attractor.radius || distance < 1e-6 {
        return Vec3::ZERO;
    }
    to_center / distance * attractor.strength * (1.0 - distance / attractor.radius)
}

/// Velocity after `drag` has acted for `dt` seconds.
pub fn apply_drag(velocity: Vec3, drag: f32, dt: f32) -> Vec3 {
    velocity * (1.0 - drag * dt).max(0.0)
}

/// Bounce a particle that has sunk below a ground plane while descending.
/// Returns true when a collision was resolved.
pub fn resolve_ground(p: &mut Particle, ground: &GroundConfig) -> bool {
    if p.position.y >= ground.level || p.velocity.y >= 0.0 {
        return false;
    }
    p.position.y = ground.level;
    p.velocity.y = -p.velocity.y * ground.bounce;
    let lateral = 1.0 - ground.bounce * 0.2;
    p.velocity.x *= lateral;
    p.velocity.z *= lateral;
    true
}
