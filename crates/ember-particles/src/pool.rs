//! Fixed-capacity particle pool with a free-slot stack.
//!
//! Every slot index is at all times either on the free stack or holds an
//! alive particle, never both. Slots keep their index for their whole
//! lifetime, so the stack is the only bookkeeping needed for O(1) spawn
//! and kill.
//!
//! The free stack is built from atomics so that data-parallel lanes can claim
//! and return slots through a shared reference:
//!
//! - claim: decrement the free counter; a result below zero means the stack
//!   was already empty, so the lane increments it back and gives up.
//! - release: increment the free counter; a result above capacity means more
//!   releases than slots, so the push is undone and dropped.
//!
//! Claims and releases never happen in the same dispatch.

use crate::particle::Particle;
use ember_core::{EmberError, Result};
use std::sync::atomic::{AtomicIsize, AtomicU32, AtomicUsize, Ordering};

/// Hard upper bound on pool capacity.
pub const MAX_CAPACITY: usize = 1 << 24;

/// Index of one storage slot in the pool
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lock-free free-slot stack plus the live counter.
pub struct FreeList {
    stack: Vec<AtomicU32>,
    /// Number of valid entries on `stack`. Transiently negative while a
    /// failed claim is rolling back.
    top: AtomicIsize,
    live: AtomicUsize,
}

impl FreeList {
    /// Build a stack holding every index in `0..capacity` for which
    /// `is_alive` is false, lowest index on top.
    fn rebuild(capacity: usize, is_alive: impl Fn(usize) -> bool) -> Result<Self> {
        let mut stack = Vec::new();
        stack
            .try_reserve_exact(capacity)
            .map_err(|e| EmberError::CapacityGrowth {
                current: 0,
                requested: capacity,
                reason: e.to_string(),
            })?;

        let mut live = 0;
        for i in (0..capacity).rev() {
            if is_alive(i) {
                live += 1;
            } else {
                stack.push(AtomicU32::new(i as u32));
            }
        }
        let free = stack.len();
        stack.resize_with(capacity, || AtomicU32::new(0));

        Ok(Self {
            stack,
            top: AtomicIsize::new(free as isize),
            live: AtomicUsize::new(live),
        })
    }

    pub fn capacity(&self) -> usize {
        self.stack.len()
    }

    /// Free slots currently on the stack
    pub fn available(&self) -> usize {
        self.top.load(Ordering::Acquire).max(0) as usize
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Pop a free slot. `None` means the pool is full, which is back-pressure,
    /// not a fault.
    pub fn claim(&self) -> Option<SlotIndex> {
        let prev = self.top.fetch_sub(1, Ordering::AcqRel);
        if prev <= 0 {
            self.top.fetch_add(1, Ordering::AcqRel);
            return None;
        }
        let index = self.stack[(prev - 1) as usize].load(Ordering::Acquire);
        self.live.fetch_add(1, Ordering::AcqRel);
        Some(SlotIndex(index))
    }

    /// Push a slot back onto the stack. Returns false (and drops the push)
    /// when the stack is already full or the index is out of range.
    pub fn push_released(&self, slot: SlotIndex) -> bool {
        let capacity = self.capacity();
        if slot.index() >= capacity {
            log::error!("release of out-of-range slot {} (capacity {capacity})", slot.0);
            return false;
        }
        let prev = self.top.fetch_add(1, Ordering::AcqRel);
        if prev < 0 || prev as usize >= capacity {
            self.top.fetch_sub(1, Ordering::AcqRel);
            log::error!("free list overflow releasing slot {}; release dropped", slot.0);
            return false;
        }
        self.stack[prev as usize].store(slot.0, Ordering::Release);
        let _ = self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        true
    }

    /// Copy of the indices currently on the stack, top first.
    pub fn snapshot(&self) -> Vec<SlotIndex> {
        let top = self.available();
        self.stack[..top]
            .iter()
            .rev()
            .map(|a| SlotIndex(a.load(Ordering::Acquire)))
            .collect()
    }
}

/// Slot storage plus its free list.
pub struct ParticlePool {
    slots: Vec<Particle>,
    free: FreeList,
}

impl ParticlePool {
    /// Create a pool with every slot free. Capacity is clamped to
    /// [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_CAPACITY);
        let slots = vec![Particle::dead(); capacity];
        let free = FreeList {
            stack: (0..capacity)
                .rev()
                .map(|i| AtomicU32::new(i as u32))
                .collect(),
            top: AtomicIsize::new(capacity as isize),
            live: AtomicUsize::new(0),
        };
        Self { slots, free }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.free.live()
    }

    pub fn free_count(&self) -> usize {
        self.free.available()
    }

    /// Claim a free slot. The slot is not alive until [`ParticlePool::occupy`]
    /// writes a particle into it.
    pub(crate) fn acquire(&mut self) -> Option<SlotIndex> {
        self.free.claim()
    }

    /// Write a freshly sampled particle into a claimed slot and mark it alive.
    ///
    /// `slot` must come from a claim on this pool. An out-of-range slot is
    /// logged and left untouched, returning false.
    pub(crate) fn occupy(&mut self, slot: SlotIndex, mut particle: Particle) -> bool {
        let Some(record) = self.slots.get_mut(slot.index()) else {
            log::error!("occupy: slot {} is outside capacity {}", slot.0, self.slots.len());
            return false;
        };
        debug_assert!(!record.alive, "slot {} occupied twice", slot.0);
        particle.alive = true;
        *record = particle;
        true
    }

    /// Claim a slot and write `particle` into it in one go.
    pub fn spawn(&mut self, particle: Particle) -> Option<SlotIndex> {
        let slot = self.acquire()?;
        self.occupy(slot, particle).then_some(slot)
    }

    /// Return an alive slot to the free stack.
    ///
    /// Releasing a slot that is out of range or already free is a no-op that
    /// returns false, so a slot can never land on the stack twice.
    pub fn release(&mut self, slot: SlotIndex) -> bool {
        let Some(p) = self.slots.get_mut(slot.index()) else {
            return false;
        };
        if !p.alive {
            return false;
        }
        p.alive = false;
        self.free.push_released(slot)
    }

    /// Grow storage to `new_capacity`. Existing particles keep their slot
    /// indices; the free stack is rebuilt over the whole new range.
    ///
    /// Requests at or below the current capacity are ignored. On failure the
    /// pool is left untouched.
    pub fn grow(&mut self, new_capacity: usize) -> Result<()> {
        let current = self.capacity();
        if new_capacity <= current {
            return Ok(());
        }
        if new_capacity > MAX_CAPACITY {
            return Err(EmberError::CapacityLimit {
                requested: new_capacity,
                max: MAX_CAPACITY,
            });
        }

        let slots = &self.slots;
        let free = FreeList::rebuild(new_capacity, |i| slots.get(i).is_some_and(|p| p.alive))
            .map_err(|e| match e {
                EmberError::CapacityGrowth { reason, .. } => EmberError::CapacityGrowth {
                    current,
                    requested: new_capacity,
                    reason,
                },
                other => other,
            })?;
        self.slots
            .try_reserve_exact(new_capacity - current)
            .map_err(|e| EmberError::CapacityGrowth {
                current,
                requested: new_capacity,
                reason: e.to_string(),
            })?;

        self.slots.resize(new_capacity, Particle::dead());
        self.free = free;
        log::debug!("particle pool grew from {current} to {new_capacity} slots");
        Ok(())
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&Particle> {
        self.slots.get(slot.index())
    }

    pub fn get_mut(&mut self, slot: SlotIndex) -> Option<&mut Particle> {
        self.slots.get_mut(slot.index())
    }

    /// All slots, alive or not
    pub fn slots(&self) -> &[Particle] {
        &self.slots
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = (SlotIndex, &Particle)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alive)
            .map(|(i, p)| (SlotIndex(i as u32), p))
    }

    pub fn free_slots(&self) -> Vec<SlotIndex> {
        self.free.snapshot()
    }

    /// True when the free stack and the alive slots partition `0..capacity`
    /// and the live counter agrees. Only meaningful between dispatches.
    pub fn check_partition(&self) -> bool {
        let capacity = self.capacity();
        let mut seen = vec![false; capacity];
        for slot in self.free_slots() {
            let i = slot.index();
            if i >= capacity || seen[i] || self.slots[i].alive {
                return false;
            }
            seen[i] = true;
        }
        let alive = self.slots.iter().filter(|p| p.alive).count();
        for (i, p) in self.slots.iter().enumerate() {
            if p.alive == seen[i] {
                return false;
            }
        }
        alive == self.live_count() && alive + self.free_count() == capacity
    }

    pub(crate) fn free_list(&self) -> &FreeList {
        &self.free
    }

    /// Slot storage and the free list, borrowed separately so lanes can own
    /// their record while returning slots through the shared stack.
    pub(crate) fn split_mut(&mut self) -> (&mut [Particle], &FreeList) {
        (&mut self.slots, &self.free)
    }
}
