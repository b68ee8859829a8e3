// firmware/src/rt.rs
//! Start-up code, trap vector and the machine-mode trap handler (RV32).

use core::arch::global_asm;

use crate::config;
use crate::dispatch::{self, TrapOutcome};
use crate::hal::Machine;

global_asm!(
    r#"
    .section .text.entry
    .globl _start
_start:
    .option push
    .option norelax
    la   gp, __global_pointer$
    .option pop

    la   sp, _stack_top
    addi sp, sp, -16

    /* Copy .data from ROM */
    la   t0, __data_start
    la   t1, __data_end
    la   t2, __data_load
1:
    bgeu t0, t1, 2f
    lw   t3, 0(t2)
    sw   t3, 0(t0)
    addi t0, t0, 4
    addi t2, t2, 4
    j    1b
2:
    /* Zero .bss */
    la   t0, __bss_start
    la   t1, __bss_end
3:
    bgeu t0, t1, 4f
    sw   zero, 0(t0)
    addi t0, t0, 4
    j    3b
4:
    /* Direct-mode trap vector (low bits 00) */
    la   t0, __trap_vector
    csrw mtvec, t0

    la   t0, rust_start
    jr   t0
"#
);

global_asm!(
    r#"
    .section .text.trap
    .balign 4
    .globl __trap_vector
__trap_vector:
    // Caller-saved registers only; handle_trap is an ordinary C-ABI call.
    addi    sp, sp, -64
    sw      ra,   0(sp)
    sw      t0,   4(sp)
    sw      t1,   8(sp)
    sw      t2,  12(sp)
    sw      a0,  16(sp)
    sw      a1,  20(sp)
    sw      a2,  24(sp)
    sw      a3,  28(sp)
    sw      a4,  32(sp)
    sw      a5,  36(sp)
    sw      a6,  40(sp)
    sw      a7,  44(sp)
    sw      t3,  48(sp)
    sw      t4,  52(sp)
    sw      t5,  56(sp)
    sw      t6,  60(sp)

    call    handle_trap

    lw      ra,   0(sp)
    lw      t0,   4(sp)
    lw      t1,   8(sp)
    lw      t2,  12(sp)
    lw      a0,  16(sp)
    lw      a1,  20(sp)
    lw      a2,  24(sp)
    lw      a3,  28(sp)
    lw      a4,  32(sp)
    lw      a5,  36(sp)
    lw      a6,  40(sp)
    lw      a7,  44(sp)
    lw      t3,  48(sp)
    lw      t4,  52(sp)
    lw      t5,  56(sp)
    lw      t6,  60(sp)
    addi    sp, sp, 64

    // Interrupts only ever get here; faults halt inside handle_trap.
    mret
"#
);

extern "C" {
    fn __trap_vector();
}

/// Re-install the trap vector. `_start` already does this; applications call
/// it anyway so the vector object is always linked in.
#[inline]
pub fn install_trap_vector() {
    unsafe {
        core::arch::asm!("csrw mtvec, {0}", in(reg) __trap_vector as usize, options(nomem, nostack));
    }
}

/// Arm the first timer interrupt `delay` units from now. Must run before
/// `enable_interrupts`; afterwards only the trap handler touches the compare.
pub fn arm_timer(delay: u64) {
    dispatch::rearm_timer(&mut Machine, delay);
}

/// Machine timer + external interrupt enable, then global MIE.
pub fn enable_interrupts() {
    unsafe {
        riscv::register::mie::set_mtimer();
        riscv::register::mie::set_mext();
        riscv::register::mstatus::set_mie();
    }
}

/// Fail-stop. Never returns; needs a debugger or watchdog to notice.
#[inline(never)]
pub fn halt() -> ! {
    loop {
        unsafe { riscv::asm::wfi() }
    }
}

#[no_mangle]
extern "C" fn handle_trap() {
    let interval = config::current().tick_interval;
    let mut hart = Machine;
    match dispatch::dispatch(&mut hart, interval) {
        TrapOutcome::Resumed(_) => {}
        TrapOutcome::Halted(_) => halt(),
    }
}

