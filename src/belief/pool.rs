//! Fixed-capacity particle pool.
//!
//! The pool is the only shared mutable resource of the model. Allocation,
//! copy and release all go through one mutex; the particle data itself lives
//! in the handle, so reading a particle never locks.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

use super::error::PoolError;
use crate::state::StateId;

/// One weighted hypothesis of the true state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub state: StateId,
    pub weight: f64,
}

#[derive(Debug, Default)]
struct Slots {
    free: Vec<usize>,
    next: usize,
}

impl Slots {
    fn in_use(&self) -> usize {
        self.next - self.free.len()
    }
}

/// Pool of at most `capacity` live particles.
///
/// Exhaustion is reported as [`PoolError::Exhausted`]; the pool never grows.
#[derive(Debug)]
pub struct ParticlePool {
    capacity: usize,
    slots: Mutex<Slots>,
}

impl ParticlePool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Mutex::new(Slots::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of particles currently checked out.
    pub fn num_allocated(&self) -> usize {
        self.lock().in_use()
    }

    /// Checks out a slot for a new particle.
    pub fn allocate(&self, state: StateId, weight: f64) -> Result<Pooled<'_>, PoolError> {
        let slot = {
            let mut slots = self.lock();
            match slots.free.pop() {
                Some(slot) => slot,
                None if slots.next < self.capacity => {
                    slots.next += 1;
                    slots.next - 1
                }
                None => {
                    return Err(PoolError::Exhausted {
                        capacity: self.capacity,
                    })
                }
            }
        };
        Ok(Pooled {
            pool: self,
            slot,
            particle: Particle { state, weight },
        })
    }

    /// Checks out a slot holding a copy of `particle`.
    pub fn copy(&self, particle: &Particle) -> Result<Pooled<'_>, PoolError> {
        self.allocate(particle.state, particle.weight)
    }

    fn release(&self, slot: usize) {
        self.lock().free.push(slot);
    }

    // Slot bookkeeping stays consistent even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A particle checked out of a [`ParticlePool`]; the slot returns to the pool
/// when the handle is dropped.
#[derive(Debug)]
pub struct Pooled<'p> {
    pool: &'p ParticlePool,
    slot: usize,
    particle: Particle,
}

impl Pooled<'_> {
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn particle(&self) -> Particle {
        self.particle
    }
}

impl Deref for Pooled<'_> {
    type Target = Particle;

    fn deref(&self) -> &Particle {
        &self.particle
    }
}

impl DerefMut for Pooled<'_> {
    fn deref_mut(&mut self) -> &mut Particle {
        &mut self.particle
    }
}

impl Drop for Pooled<'_> {
    fn drop(&mut self) {
        self.pool.release(self.slot);
    }
}
