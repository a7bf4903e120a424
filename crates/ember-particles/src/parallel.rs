//! Data-parallel execution model on the rayon pool.
//!
//! Emission and simulation are separate dispatches. Inside a dispatch, lanes
//! run in no particular order and share only the free list and the live
//! counter; each rayon call returns only after every lane has finished, which
//! is the barrier between stages.

use crate::emission::{SpawnPlan, SpawnSampler};
use crate::integrate::{self, StepEnv, StepOutcome};
use crate::particle::Particle;
use crate::pool::{ParticlePool, SlotIndex};
use rayon::prelude::*;

/// Emission dispatch: one lane per requested particle.
///
/// Each lane claims its own slot through the free list and samples its
/// particle from its own random stream. Claimed records are written once the
/// dispatch completes. Returns how many were written.
pub fn emit(pool: &mut ParticlePool, plan: &SpawnPlan, sampler: &SpawnSampler) -> u32 {
    let claimed: Vec<(SlotIndex, Particle)> = {
        let free = pool.free_list();
        (0..plan.count)
            .into_par_iter()
            .filter_map(|lane| free.claim().map(|slot| (slot, sampler.sample(lane))))
            .collect()
    };

    let mut spawned = 0;
    for (slot, particle) in claimed {
        if pool.occupy(slot, particle) {
            spawned += 1;
        }
    }
    spawned
}

/// Simulation dispatch: one lane per slot.
///
/// A lane that finds its particle expired clears the alive flag and pushes
/// its own index back. Returns the number of released slots.
pub fn integrate(pool: &mut ParticlePool, env: &StepEnv) -> u32 {
    let (slots, free) = pool.split_mut();
    slots
        .par_iter_mut()
        .enumerate()
        .map(|(i, p)| {
            if !p.alive {
                return 0;
            }
            match integrate::advance(p, env) {
                StepOutcome::Alive => 0,
                StepOutcome::Expired => {
                    p.alive = false;
                    u32::from(free.push_released(SlotIndex(i as u32)))
                }
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::EmitterConfig;
    use crate::forces::ForceConfig;
    use crate::sequential;
    use glam::Vec3;

    fn sampler(config: &EmitterConfig, count: u32) -> SpawnSampler<'_> {
        SpawnSampler {
            config,
            from: Vec3::ZERO,
            to: Vec3::ZERO,
            seed: 9,
            frame: 3,
            count,
        }
    }

    #[test]
    fn emits_the_same_particles_as_sequential() {
        let config = EmitterConfig::default();
        let plan = SpawnPlan {
            count: 100,
            requested: 100,
            clipped: false,
        };
        let s = sampler(&config, 100);

        let mut seq = ParticlePool::new(128);
        let mut par = ParticlePool::new(128);
        assert_eq!(sequential::emit(&mut seq, &plan, &s), 100);
        assert_eq!(emit(&mut par, &plan, &s), 100);

        let mut a: Vec<f32> = seq.iter_alive().map(|(_, p)| p.life).collect();
        let mut b: Vec<f32> = par.iter_alive().map(|(_, p)| p.life).collect();
        a.sort_by(f32::total_cmp);
        b.sort_by(f32::total_cmp);
        assert_eq!(a, b);
        assert!(par.check_partition());
    }

    #[test]
    fn emission_stops_at_capacity() {
        let config = EmitterConfig::default();
        let plan = SpawnPlan {
            count: 50,
            requested: 50,
            clipped: false,
        };
        let mut pool = ParticlePool::new(20);
        assert_eq!(emit(&mut pool, &plan, &sampler(&config, 50)), 20);
        assert_eq!(pool.live_count(), 20);
        assert_eq!(pool.free_count(), 0);
        assert!(pool.check_partition());
    }

    #[test]
    fn integration_releases_each_expired_slot_once() {
        let mut pool = ParticlePool::new(64);
        for i in 0..64 {
            pool.spawn(Particle {
                life: if i % 2 == 0 { 0.01 } else { 10.0 },
                ..Particle::dead()
            })
            .unwrap();
        }
        let forces = ForceConfig::default();
        let env = StepEnv {
            forces: &forces,
            dt: 1.0 / 60.0,
            time: 0.0,
            ground_active: false,
        };
        assert_eq!(integrate(&mut pool, &env), 32);
        assert_eq!(pool.live_count(), 32);
        assert!(pool.check_partition());
        // Nothing left to expire this quickly
        assert_eq!(integrate(&mut pool, &env), 0);
        assert!(pool.check_partition());
    }
}
