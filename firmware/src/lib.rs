//! Firmware library for the RV32 FPGA soft core.
//!
//! The trap dispatcher and the reservation lock are written against the
//! traits in `hal`, so their tests run on the host against `hal::sim`.
//! Only `rt` and the hardware implementations in `hal` are RISC-V specific.

#![cfg_attr(not(test), no_std)]

pub mod cause;
pub mod config;
pub mod dispatch;
pub mod hal;
pub mod io;
pub mod lock;
pub mod logging;

#[cfg(target_arch = "riscv32")]
pub mod rt;

pub use cause::{Exception, Interrupt, TrapCause};
pub use dispatch::{dispatch, HaltReason, TrapOutcome};
pub use lock::{LockError, LockGuard, ReservationLock};
