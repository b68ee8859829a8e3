// firmware/src/dispatch.rs
//! Machine-mode trap dispatch.
//!
//! `dispatch` is the whole policy: two interrupts are acknowledged and
//! resumed, every synchronous exception and every unknown cause halts. It
//! never loops itself; the caller decides what halting means (the trap
//! entry on hardware idles forever, tests inspect the outcome).

use crate::cause::{Exception, Interrupt, TrapCause};
use crate::hal::TrapHal;

/// Counter units between two timer interrupts.
pub const DEFAULT_TIMER_INTERVAL: u64 = 1000;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HaltReason {
    /// Instruction fetch fault; there is no pc to return to.
    Unresumable(Exception),
    /// Resumable in principle, but nothing here emulates or skips it.
    NoRecoveryPolicy(Exception),
    /// No debugger support.
    Breakpoint,
    /// Environment call after its (empty) service slot.
    EnvironmentCall,
    /// Cause value outside the handled set.
    Unhandled(u32),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TrapOutcome {
    Resumed(Interrupt),
    Halted(HaltReason),
}

impl TrapOutcome {
    pub const fn is_resumed(&self) -> bool {
        matches!(self, TrapOutcome::Resumed(_))
    }
}

/// Read the cause once and handle it.
pub fn dispatch<H: TrapHal>(hal: &mut H, timer_interval: u64) -> TrapOutcome {
    let cause = TrapCause::decode(hal.read_cause());
    match cause {
        TrapCause::Interrupt(Interrupt::MachineTimer) => {
            hal.clear_pending_bits(Interrupt::MachineTimer.pending_bit());
            rearm_timer(hal, timer_interval);
            TrapOutcome::Resumed(Interrupt::MachineTimer)
        }
        TrapCause::Interrupt(Interrupt::MachineExternal) => {
            // Device servicing belongs to whoever owns the device.
            hal.clear_pending_bits(Interrupt::MachineExternal.pending_bit());
            TrapOutcome::Resumed(Interrupt::MachineExternal)
        }
        TrapCause::Exception(e) => TrapOutcome::Halted(exception_policy(e)),
        TrapCause::Unknown(raw) => TrapOutcome::Halted(HaltReason::Unhandled(raw)),
    }
}

/// Next interrupt `interval` units after *now*, not after the previous
/// compare value.
#[inline]
pub fn rearm_timer<H: TrapHal>(hal: &mut H, interval: u64) {
    let now = hal.read_timer();
    hal.write_compare(now.wrapping_add(interval));
}

fn exception_policy(e: Exception) -> HaltReason {
    if !e.is_resumable() {
        return HaltReason::Unresumable(e);
    }
    match e {
        Exception::Breakpoint => HaltReason::Breakpoint,
        Exception::EnvironmentCall => {
            environment_call_service();
            HaltReason::EnvironmentCall
        }
        _ => HaltReason::NoRecoveryPolicy(e),
    }
}

/// Service slot for `ecall`. No services are defined for this firmware.
#[inline(always)]
fn environment_call_service() {}
