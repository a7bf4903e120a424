//! Reference execution model: ordered scans over the pool.

use crate::emission::{SpawnPlan, SpawnSampler};
use crate::integrate::{self, StepEnv, StepOutcome};
use crate::pool::{ParticlePool, SlotIndex};

/// Spawn `plan.count` particles, lane by lane. Returns how many were written.
pub fn emit(pool: &mut ParticlePool, plan: &SpawnPlan, sampler: &SpawnSampler) -> u32 {
    let mut spawned = 0;
    for lane in 0..plan.count {
        let Some(slot) = pool.acquire() else {
            break;
        };
        if pool.occupy(slot, sampler.sample(lane)) {
            spawned += 1;
        }
    }
    spawned
}

/// Advance every alive slot once and release the ones that expired.
/// Returns the number of released slots.
pub fn integrate(pool: &mut ParticlePool, env: &StepEnv) -> u32 {
    let mut released = 0;
    for i in 0..pool.capacity() {
        let slot = SlotIndex(i as u32);
        let outcome = match pool.get_mut(slot) {
            Some(p) if p.alive => integrate::advance(p, env),
            _ => continue,
        };
        if outcome == StepOutcome::Expired && pool.release(slot) {
            released += 1;
        }
    }
    released
}
