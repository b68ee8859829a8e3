// firmware/src/hal.rs
//! Narrow capabilities the trap dispatcher and the lock are written against.
//!
//! `Machine` and `LockWord` talk to the real hart; `sim` models the same
//! registers in memory so the dispatch and lock protocols run on the host.

/// Privileged state touched by the trap dispatcher.
pub trait TrapHal {
    /// Raw `mcause`.
    fn read_cause(&mut self) -> u32;
    /// Clear `mask` in `mip` without disturbing other pending bits.
    fn clear_pending_bits(&mut self, mask: u32);
    /// Current value of the monotonic timer counter.
    fn read_timer(&mut self) -> u64;
    /// Program the timer compare register.
    fn write_compare(&mut self, value: u64);
}

/// A memory word only reachable through the reservation instructions.
pub trait ReservationCell {
    /// Load and place a reservation on the word (acquire ordering).
    fn load_reserved(&self) -> u32;
    /// Store `value` if the reservation is still intact; `true` on success.
    /// The reservation is dropped either way.
    fn store_conditional(&self, value: u32) -> bool;
    /// Store `value` after all earlier memory accesses are visible.
    fn store_release(&self, value: u32);
}

#[cfg(target_arch = "riscv32")]
pub use machine::{LockWord, Machine};

#[cfg(target_arch = "riscv32")]
mod machine {
    use super::{ReservationCell, TrapHal};
    use crate::io::{self, IO_BASE, MTIME, MTIMECMP};
    use core::arch::asm;
    use core::cell::UnsafeCell;

    /// The machine-mode CSRs and the CLINT-style timer of this hart.
    pub struct Machine;

    impl TrapHal for Machine {
        #[inline]
        fn read_cause(&mut self) -> u32 {
            riscv::register::mcause::read().bits() as u32
        }

        #[inline]
        fn clear_pending_bits(&mut self, mask: u32) {
            unsafe { asm!("csrc mip, {0}", in(reg) mask, options(nomem, nostack)) }
        }

        #[inline]
        fn read_timer(&mut self) -> u64 {
            unsafe { io::read_u64_split(IO_BASE + MTIME) }
        }

        #[inline]
        fn write_compare(&mut self, value: u64) {
            unsafe { io::write_u64_split(IO_BASE + MTIMECMP, value) }
        }
    }

    /// A word for LR/SC locking. Deliberately has no `get`/`set`.
    #[repr(transparent)]
    pub struct LockWord(UnsafeCell<u32>);

    // SAFETY: every access goes through the A-extension instructions below.
    unsafe impl Sync for LockWord {}

    impl LockWord {
        pub const fn new(value: u32) -> Self {
            LockWord(UnsafeCell::new(value))
        }
    }

    impl ReservationCell for LockWord {
        #[inline(always)]
        fn load_reserved(&self) -> u32 {
            let value: u32;
            unsafe {
                asm!(
                    "lr.w.aq {v}, ({addr})",
                    addr = in(reg) self.0.get(),
                    v = out(reg) value,
                    options(nostack)
                );
            }
            value
        }

        #[inline(always)]
        fn store_conditional(&self, value: u32) -> bool {
            let failed: u32;
            unsafe {
                asm!(
                    "sc.w.rl {rc}, {v}, ({addr})",
                    addr = in(reg) self.0.get(),
                    v = in(reg) value,
                    rc = out(reg) failed,
                    options(nostack)
                );
            }
            failed == 0
        }

        #[inline(always)]
        fn store_release(&self, value: u32) {
            unsafe {
                asm!(
                    "amoswap.w.rl zero, {v}, ({addr})",
                    addr = in(reg) self.0.get(),
                    v = in(reg) value,
                    options(nostack)
                );
            }
        }
    }
}

#[cfg(test)]
pub mod sim {
    //! In-memory register model.

    use super::{ReservationCell, TrapHal};
    use core::cell::Cell;

    pub const WRITE_LOG_LEN: usize = 16;

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub enum RegisterWrite {
        ClearPending(u32),
        Compare(u64),
    }

    /// One hart's worth of trap-visible state.
    #[derive(Debug, Default)]
    pub struct SimHart {
        pub cause: u32,
        pub pending: u32,
        pub counter: u64,
        pub compare: Option<u64>,
        /// Counter advance applied after every `read_timer`, to model time
        /// passing inside the handler.
        pub counter_step: u64,
        pub cause_reads: u32,
        pub writes: heapless::Vec<RegisterWrite, WRITE_LOG_LEN>,
    }

    impl SimHart {
        pub fn new() -> Self {
            Self::default()
        }

        /// Stage a trap: what `mcause` will read and which bits `mip` holds.
        pub fn raise(&mut self, cause: u32, pending: u32) {
            self.cause = cause;
            self.pending = pending;
        }

        fn log(&mut self, w: RegisterWrite) {
            // The log is only for assertions; overflow is not interesting.
            let _ = self.writes.push(w);
        }
    }

    impl TrapHal for SimHart {
        fn read_cause(&mut self) -> u32 {
            self.cause_reads += 1;
            self.cause
        }

        fn clear_pending_bits(&mut self, mask: u32) {
            self.pending &= !mask;
            self.log(RegisterWrite::ClearPending(mask));
        }

        fn read_timer(&mut self) -> u64 {
            let now = self.counter;
            self.counter = self.counter.wrapping_add(self.counter_step);
            now
        }

        fn write_compare(&mut self, value: u64) {
            self.compare = Some(value);
            self.log(RegisterWrite::Compare(value));
        }
    }

    pub const MAX_PARTICIPANTS: usize = 8;

    /// A lock word shared by up to `MAX_PARTICIPANTS` simulated harts, each
    /// with its own reservation flag. Any successful store breaks every
    /// reservation, which is what the A extension guarantees.
    pub struct SimReservationWord {
        value: Cell<u32>,
        reserved: Cell<u8>,
        lr_count: Cell<u32>,
        sc_failures: Cell<u32>,
        /// Runs after every `load_reserved` with the participant id and the
        /// number of loads so far; lets a test interleave another hart.
        hook: Cell<Option<fn(&SimReservationWord, usize, u32)>>,
    }

    impl SimReservationWord {
        pub const fn new(value: u32) -> Self {
            SimReservationWord {
                value: Cell::new(value),
                reserved: Cell::new(0),
                lr_count: Cell::new(0),
                sc_failures: Cell::new(0),
                hook: Cell::new(None),
            }
        }

        pub fn participant(&self, id: usize) -> Participant<'_> {
            assert!(id < MAX_PARTICIPANTS, "participant id out of range");
            Participant { word: self, id }
        }

        pub fn set_hook(&self, hook: fn(&SimReservationWord, usize, u32)) {
            self.hook.set(Some(hook));
        }

        /// Observe the word from outside the protocol (test assertions only).
        pub fn peek(&self) -> u32 {
            self.value.get()
        }

        pub fn load_reserved_count(&self) -> u32 {
            self.lr_count.get()
        }

        pub fn failed_store_count(&self) -> u32 {
            self.sc_failures.get()
        }

        pub fn holds_reservation(&self, id: usize) -> bool {
            self.reserved.get() & (1 << id) != 0
        }

        fn store_and_break_reservations(&self, value: u32) {
            self.value.set(value);
            self.reserved.set(0);
        }
    }

    /// One simulated hart's view of a `SimReservationWord`.
    pub struct Participant<'a> {
        word: &'a SimReservationWord,
        id: usize,
    }

    impl ReservationCell for Participant<'_> {
        fn load_reserved(&self) -> u32 {
            let w = self.word;
            w.reserved.set(w.reserved.get() | (1 << self.id));
            let value = w.value.get();
            let n = w.lr_count.get() + 1;
            w.lr_count.set(n);
            if let Some(hook) = w.hook.get() {
                hook(w, self.id, n);
            }
            value
        }

        fn store_conditional(&self, value: u32) -> bool {
            let w = self.word;
            if w.holds_reservation(self.id) {
                w.store_and_break_reservations(value);
                true
            } else {
                w.sc_failures.set(w.sc_failures.get() + 1);
                false
            }
        }

        fn store_release(&self, value: u32) {
            self.word.store_and_break_reservations(value);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_clear_pending_only_touches_mask() {
            let mut hart = SimHart::new();
            hart.pending = 0b1000_1000_1000;
            hart.clear_pending_bits(1 << 7);
            assert_eq!(hart.pending, 0b1000_0000_1000);
            assert_eq!(hart.writes.as_slice(), &[RegisterWrite::ClearPending(1 << 7)]);
        }

        #[test]
        fn test_counter_step() {
            let mut hart = SimHart::new();
            hart.counter = 10;
            hart.counter_step = 5;
            assert_eq!(hart.read_timer(), 10);
            assert_eq!(hart.read_timer(), 15);
        }

        #[test]
        fn test_second_reservation_is_broken_by_first_store() {
            let word = SimReservationWord::new(0);
            let a = word.participant(0);
            let b = word.participant(1);
            assert_eq!(a.load_reserved(), 0);
            assert_eq!(b.load_reserved(), 0);
            assert!(a.store_conditional(1));
            assert!(!b.store_conditional(1));
            assert_eq!(word.peek(), 1);
            assert_eq!(word.failed_store_count(), 1);
        }

        #[test]
        fn test_store_conditional_without_reservation_fails() {
            let word = SimReservationWord::new(0);
            let a = word.participant(0);
            assert!(!a.store_conditional(1));
            assert_eq!(word.peek(), 0);
        }

        #[test]
        fn test_release_store_breaks_reservations() {
            let word = SimReservationWord::new(1);
            let a = word.participant(0);
            let b = word.participant(1);
            assert_eq!(b.load_reserved(), 1);
            a.store_release(0);
            assert!(!word.holds_reservation(1));
            assert_eq!(word.peek(), 0);
        }
    }
}
