// firmware/src/cause.rs
//! Decoding of the 32-bit `mcause` value into a closed set of trap causes.

/// Interrupt flag in `mcause` (RV32).
pub const INTERRUPT_BIT: u32 = 1 << 31;

/* interrupt source codes */
pub const IRQ_MACHINE_TIMER: u32 = 7;
pub const IRQ_MACHINE_EXTERNAL: u32 = 11;

/// Raw cause values of the two handled interrupts.
pub const CAUSE_MACHINE_TIMER: u32 = INTERRUPT_BIT | IRQ_MACHINE_TIMER;
pub const CAUSE_MACHINE_EXTERNAL: u32 = INTERRUPT_BIT | IRQ_MACHINE_EXTERNAL;

/* mip bits */
pub const MIP_MTIP: u32 = 1 << IRQ_MACHINE_TIMER;
pub const MIP_MEIP: u32 = 1 << IRQ_MACHINE_EXTERNAL;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Interrupt {
    MachineTimer,
    MachineExternal,
}

impl Interrupt {
    /// The `mip` bit that marks this source as pending.
    pub const fn pending_bit(self) -> u32 {
        match self {
            Interrupt::MachineTimer => MIP_MTIP,
            Interrupt::MachineExternal => MIP_MEIP,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Exception {
    InstructionAddressMisaligned, // 0
    InstructionAccessFault,       // 1
    IllegalInstruction,           // 2
    Breakpoint,                   // 3
    LoadAddressMisaligned,        // 4
    LoadAccessFault,              // 5
    StoreAddressMisaligned,       // 6
    StoreAccessFault,             // 7
    EnvironmentCall,              // 8
}

impl Exception {
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Exception::InstructionAddressMisaligned,
            1 => Exception::InstructionAccessFault,
            2 => Exception::IllegalInstruction,
            3 => Exception::Breakpoint,
            4 => Exception::LoadAddressMisaligned,
            5 => Exception::LoadAccessFault,
            6 => Exception::StoreAddressMisaligned,
            7 => Exception::StoreAccessFault,
            8 => Exception::EnvironmentCall,
            _ => return None,
        })
    }

    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Faults on instruction fetch: `mtval` holds 0 and the next pc cannot
    /// be computed, so returning from the trap is impossible.
    pub const fn is_resumable(self) -> bool {
        !matches!(
            self,
            Exception::InstructionAddressMisaligned | Exception::InstructionAccessFault
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TrapCause {
    Interrupt(Interrupt),
    Exception(Exception),
    Unknown(u32),
}

impl TrapCause {
    /// Exact-match decode: interrupt sources other than timer and external,
    /// and exception codes above 8, are `Unknown`.
    pub const fn decode(raw: u32) -> Self {
        match raw {
            CAUSE_MACHINE_TIMER => TrapCause::Interrupt(Interrupt::MachineTimer),
            CAUSE_MACHINE_EXTERNAL => TrapCause::Interrupt(Interrupt::MachineExternal),
            r if r & INTERRUPT_BIT != 0 => TrapCause::Unknown(r),
            r => match Exception::from_code(r) {
                Some(e) => TrapCause::Exception(e),
                None => TrapCause::Unknown(r),
            },
        }
    }
}
