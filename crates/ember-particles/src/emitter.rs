//! Emitter configuration

use crate::shape::{EmitFrom, EmitterShape};
use ember_core::Color;
use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// How initial velocity directions are chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionMode {
    /// Within `cone_angle` of the emitter's forward (+Y) axis
    #[default]
    Directional,
    /// Uniform over the sphere
    Spherical,
    /// Away from the emitter center, along the spawn offset
    Outward,
}

/// Where a particle's color comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// `EmitterConfig::color` for every particle
    #[default]
    Solid,
    /// Random RGB fixed at spawn
    Random,
    /// Render gradient evaluated at the particle's life fraction
    Gradient,
}

/// Read-only emitter settings, supplied by the caller every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub shape: EmitterShape,
    pub emit_from: EmitFrom,
    pub direction: DirectionMode,
    /// Cone half-angle in degrees, for `DirectionMode::Directional`
    pub cone_angle: f32,
    /// Euler rotation (XYZ, degrees) applied to offsets and the forward axis
    pub rotation: Vec3,
    pub position: Vec3,
    /// Position at the start of the step. When unset, the position from the
    /// previous step is used.
    pub previous_position: Option<Vec3>,

    /// Particles per second
    pub rate: f32,
    pub max_spawn_per_step: u32,

    pub initial_speed: f32,
    pub speed_random: f32,
    pub life_seconds: f32,
    pub life_random: f32,
    /// Jitter applied to every particle's life regardless of `life_random`,
    /// so a burst does not expire on a single frame. Zero disables it.
    pub base_life_jitter: f32,
    pub size: f32,
    pub size_random: f32,
    /// Radians per second
    pub spin_speed: f32,
    pub spin_random: f32,

    pub color_mode: ColorMode,
    pub color: Color,

    pub playing: bool,
    /// Seconds of emission per cycle; zero means unlimited
    pub duration: f32,
    pub looping: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            shape: EmitterShape::Point,
            emit_from: EmitFrom::Volume,
            direction: DirectionMode::Directional,
            cone_angle: 15.0,
            rotation: Vec3::ZERO,
            position: Vec3::ZERO,
            previous_position: None,
            rate: 50.0,
            max_spawn_per_step: 10_000,
            initial_speed: 1.0,
            speed_random: 0.0,
            life_seconds: 2.0,
            life_random: 0.0,
            base_life_jitter: 0.05,
            size: 1.0,
            size_random: 0.0,
            spin_speed: 0.0,
            spin_random: 0.0,
            color_mode: ColorMode::Solid,
            color: Color::WHITE,
            playing: true,
            duration: 0.0,
            looping: true,
        }
    }
}

/// Shortest life a particle may be given, in seconds
pub const MIN_LIFE: f32 = 1e-3;

fn non_negative(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.max(0.0)
    }
}

fn finite_or(v: Vec3, fallback: Vec3) -> Vec3 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

impl EmitterConfig {
    /// Copy with every numeric field clamped into its valid range.
    pub fn sanitized(&self) -> Self {
        let position = finite_or(self.position, Vec3::ZERO);
        Self {
            shape: self.shape.sanitized(),
            cone_angle: non_negative(self.cone_angle).min(180.0),
            rotation: finite_or(self.rotation, Vec3::ZERO),
            position,
            previous_position: self.previous_position.map(|p| finite_or(p, position)),
            rate: if self.rate.is_finite() {
                self.rate.max(0.0)
            } else {
                0.0
            },
            initial_speed: non_negative(self.initial_speed),
            speed_random: non_negative(self.speed_random),
            life_seconds: non_negative(self.life_seconds).max(MIN_LIFE),
            life_random: non_negative(self.life_random),
            base_life_jitter: non_negative(self.base_life_jitter),
            size: non_negative(self.size),
            size_random: non_negative(self.size_random),
            spin_speed: if self.spin_speed.is_finite() {
                self.spin_speed
            } else {
                0.0
            },
            spin_random: non_negative(self.spin_random),
            color: self.color.saturate(),
            duration: non_negative(self.duration),
            ..self.clone()
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }

    /// Emission axis in world space
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }
}
