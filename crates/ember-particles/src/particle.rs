//! Particle record stored in each pool slot

use ember_core::Color;
use glam::Vec3;

/// CPU-side particle state.
///
/// `alive == true` implies `0 <= age < life`.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds since spawn
    pub age: f32,
    /// Total lifespan in seconds
    pub life: f32,
    /// Per-particle phase offset for rotation and shading, in [0, 1)
    pub seed: f32,
    /// Unit rotation axis
    pub spin_axis: Vec3,
    /// Radians per second around `spin_axis`
    pub spin_rate: f32,
    /// Multiplier applied to the size curve
    pub size: f32,
    pub color: Color,
    pub alive: bool,
}

impl Particle {
    pub fn dead() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            age: 0.0,
            life: 0.0,
            seed: 0.0,
            spin_axis: Vec3::Y,
            spin_rate: 0.0,
            size: 0.0,
            color: Color::WHITE,
            alive: false,
        }
    }

    /// Normalized age in [0, 1]
    pub fn life_fraction(&self) -> f32 {
        if self.life <= 0.0 {
            1.0
        } else {
            (self.age / self.life).clamp(0.0, 1.0)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.life
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::dead()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn life_fraction_clamps() {
        let mut p = Particle {
            life: 2.0,
            age: 0.5,
            alive: true,
            ..Particle::dead()
        };
        assert!((p.life_fraction() - 0.25).abs() < 1e-6);
        p.age = 5.0;
        assert_eq!(p.life_fraction(), 1.0);
        p.life = 0.0;
        assert_eq!(p.life_fraction(), 1.0);
    }

    #[test]
    fn expiry_is_inclusive() {
        let p = Particle {
            life: 1.0,
            age: 1.0,
            ..Particle::dead()
        };
        assert!(p.is_expired());
    }
}
