// firmware/src/lock.rs
//! Spin lock on a single word using load-reserved / store-conditional.

use core::fmt;

use crate::hal::ReservationCell;

pub const UNLOCKED: u32 = 0;
pub const LOCKED: u32 = 1;

/// The lock shared by everything running on this hart.
#[cfg(target_arch = "riscv32")]
pub static GLOBAL_LOCK: ReservationLock<crate::hal::LockWord> =
    ReservationLock::new(crate::hal::LockWord::new(UNLOCKED));

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LockError {
    /// The word already held the locked sentinel.
    Held,
    /// Another store hit the word between our reserve and our store.
    ReservationLost,
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Held => f.write_str("lock is held"),
            LockError::ReservationLost => f.write_str("reservation lost"),
        }
    }
}

pub struct ReservationLock<C: ReservationCell> {
    cell: C,
}

impl<C: ReservationCell> ReservationLock<C> {
    pub const fn new(cell: C) -> Self {
        ReservationLock { cell }
    }

    /// One reserve/compare/store round.
    pub fn try_acquire(&self) -> Result<LockGuard<'_, C>, LockError> {
        if self.cell.load_reserved() != UNLOCKED {
            return Err(LockError::Held);
        }
        if !self.cell.store_conditional(LOCKED) {
            return Err(LockError::ReservationLost);
        }
        Ok(LockGuard { lock: self })
    }

    /// Spin until the lock is ours. No bound, no backoff.
    pub fn acquire(&self) -> LockGuard<'_, C> {
        loop {
            match self.try_acquire() {
                Ok(guard) => return guard,
                Err(LockError::Held) => core::hint::spin_loop(),
                Err(LockError::ReservationLost) => {}
            }
        }
    }

    pub fn cell(&self) -> &C {
        &self.cell
    }
}

/// Proof of holding the lock; releasing is tied to dropping it.
#[must_use = "dropping the guard releases the lock immediately"]
pub struct LockGuard<'a, C: ReservationCell> {
    lock: &'a ReservationLock<C>,
}

impl<C: ReservationCell> LockGuard<'_, C> {
    pub fn release(self) {}
}

impl<C: ReservationCell> Drop for LockGuard<'_, C> {
    fn drop(&mut self) {
        self.lock.cell.store_release(UNLOCKED);
    }
}
