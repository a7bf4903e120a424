//! Emitter shapes and their spawn-offset samplers.
//!
//! Offsets are in the emitter's local frame; the caller applies the emitter
//! rotation and position. All samplers are uniform over the chosen region.

use crate::rand::ParticleRng;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Emission shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmitterShape {
    Point,
    Sphere { radius: f32 },
    /// Axis-aligned box, `half_extents` from the center to each face.
    Box { half_extents: Vec3 },
    /// Rectangle in the local XZ plane.
    Plane { half_width: f32, half_depth: f32 },
    /// Segment along local X, centered on the emitter.
    Line { length: f32 },
}

impl Default for EmitterShape {
    fn default() -> Self {
        Self::Point
    }
}

impl EmitterShape {
    /// Negative or NaN dimensions become zero.
    pub fn sanitized(&self) -> Self {
        let dim = |v: f32| if v.is_nan() { 0.0 } else { v.max(0.0) };
        match *self {
            Self::Point => Self::Point,
            Self::Sphere { radius } => Self::Sphere {
                radius: dim(radius),
            },
            Self::Box { half_extents } => Self::Box {
                half_extents: Vec3::new(
                    dim(half_extents.x),
                    dim(half_extents.y),
                    dim(half_extents.z),
                ),
            },
            Self::Plane {
                half_width,
                half_depth,
            } => Self::Plane {
                half_width: dim(half_width),
                half_depth: dim(half_depth),
            },
            Self::Line { length } => Self::Line {
                length: dim(length),
            },
        }
    }
}

/// Whether to spawn throughout the shape or only on its boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitFrom {
    #[default]
    Volume,
    Surface,
}

/// Sample a local-space spawn offset.
pub fn sample_offset(shape: &EmitterShape, from: EmitFrom, rng: &mut ParticleRng) -> Vec3 {
    match (*shape, from) {
        (EmitterShape::Point, _) => Vec3::ZERO,

        // cbrt keeps density uniform through the volume
        (EmitterShape::Sphere { radius }, EmitFrom::Volume) => {
            rng.random_direction() * radius * rng.next_f32().cbrt()
        }
        (EmitterShape::Sphere { radius }, EmitFrom::Surface) => rng.random_direction() * radius,

        (EmitterShape::Box { half_extents: h }, EmitFrom::Volume) => Vec3::new(
            rng.signed() * h.x,
            rng.signed() * h.y,
            rng.signed() * h.z,
        ),
        (EmitterShape::Box { half_extents: h }, EmitFrom::Surface) => {
            let face = rng.below(6);
            let axis = (face / 2) as usize;
            let sign = if face % 2 == 0 { 1.0 } else { -1.0 };
            let mut p = Vec3::new(
                rng.signed() * h.x,
                rng.signed() * h.y,
                rng.signed() * h.z,
            );
            p[axis] = sign * h[axis];
            p
        }

        (
            EmitterShape::Plane {
                half_width,
                half_depth,
            },
            EmitFrom::Volume,
        ) => Vec3::new(rng.signed() * half_width, 0.0, rng.signed() * half_depth),
        (
            EmitterShape::Plane {
                half_width,
                half_depth,
            },
            EmitFrom::Surface,
        ) => {
            // Boundary of the rectangle: one of the four edges
            let edge = rng.below(4);
            let along = rng.signed();
            match edge {
                0 => Vec3::new(along * half_width, 0.0, half_depth),
                1 => Vec3::new(along * half_width, 0.0, -half_depth),
                2 => Vec3::new(half_width, 0.0, along * half_depth),
                _ => Vec3::new(-half_width, 0.0, along * half_depth),
            }
        }

        (EmitterShape::Line { length }, EmitFrom::Volume) => {
            Vec3::new(rng.signed() * length * 0.5, 0.0, 0.0)
        }
        (EmitterShape::Line { length }, EmitFrom::Surface) => {
            let end = if rng.below(2) == 0 { 0.5 } else { -0.5 };
            Vec3::new(end * length, 0.0, 0.0)
        }
    }
}
