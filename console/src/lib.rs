#![cfg_attr(not(test), no_std)]

// Performance-counter console - line editing and commands, testable on host

use core::fmt::{self, Write};

/// Longest command line kept; one more character discards the line.
pub const MAX_CMD_LEN: usize = 64;

pub const PROMPT: &str = ">";
pub const HELP: &str = "c -- View the High Performance Counters";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Counter {
    Cycles,
    InstRetired,
    InstFromRom,
    InstFromRam,
    CacheHits,
    LoadFromRom,
    LoadFromRam,
    StoreToRam,
    LoadFromIo,
    StoreToIo,
    LoadFromCsr,
    StoreToCsr,
    TimerIrq,
    ExternalIrq,
}

/// Report order of the `c` command.
pub const COUNTERS: [Counter; 14] = [
    Counter::Cycles,
    Counter::InstRetired,
    Counter::InstFromRom,
    Counter::InstFromRam,
    Counter::CacheHits,
    Counter::LoadFromRom,
    Counter::LoadFromRam,
    Counter::StoreToRam,
    Counter::LoadFromIo,
    Counter::StoreToIo,
    Counter::LoadFromCsr,
    Counter::StoreToCsr,
    Counter::TimerIrq,
    Counter::ExternalIrq,
];

impl Counter {
    pub const fn label(self) -> &'static str {
        match self {
            Counter::Cycles => "Cycles:",
            Counter::InstRetired => "Instructions retired:",
            Counter::InstFromRom => "Instructions from ROM:",
            Counter::InstFromRam => "Instructions from RAM:",
            Counter::CacheHits => "Cache hits:",
            Counter::LoadFromRom => "Load from ROM:",
            Counter::LoadFromRam => "Load from RAM:",
            Counter::StoreToRam => "Store to RAM:",
            Counter::LoadFromIo => "Load from IO:",
            Counter::StoreToIo => "Store to IO:",
            Counter::LoadFromCsr => "Load from CSR:",
            Counter::StoreToCsr => "Store to CSR:",
            Counter::TimerIrq => "Timer IRQ:",
            Counter::ExternalIrq => "External IRQ:",
        }
    }
}

/// Where counter values come from: the hart's CSRs, or a test table.
pub trait CounterSource {
    fn read(&mut self, counter: Counter) -> u32;
}

#[cfg(target_arch = "riscv32")]
pub struct HartCounters;

#[cfg(target_arch = "riscv32")]
impl CounterSource for HartCounters {
    fn read(&mut self, counter: Counter) -> u32 {
        use riscv::register::*;
        let v = match counter {
            Counter::Cycles => mcycle::read(),
            Counter::InstRetired => minstret::read(),
            Counter::InstFromRom => mhpmcounter3::read(),
            Counter::InstFromRam => mhpmcounter4::read(),
            Counter::CacheHits => mhpmcounter5::read(),
            Counter::LoadFromRom => mhpmcounter6::read(),
            Counter::LoadFromRam => mhpmcounter7::read(),
            Counter::StoreToRam => mhpmcounter8::read(),
            Counter::LoadFromIo => mhpmcounter9::read(),
            Counter::StoreToIo => mhpmcounter10::read(),
            Counter::LoadFromCsr => mhpmcounter11::read(),
            Counter::StoreToCsr => mhpmcounter12::read(),
            Counter::TimerIrq => mhpmcounter13::read(),
            Counter::ExternalIrq => mhpmcounter14::read(),
        };
        v as u32
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Counters,
    Help,
    Unknown,
}

impl Command {
    pub fn parse(line: &[u8]) -> Command {
        match line {
            b"c" => Command::Counters,
            b"?" => Command::Help,
            _ => Command::Unknown,
        }
    }
}

pub fn write_banner<W: Write>(out: &mut W) -> fmt::Result {
    out.write_str("\n")?;
    out.write_str("****************\n")?;
    out.write_str("**** RISC-V ****\n")?;
    out.write_str("****************\n")?;
    out.write_str("Type ? for help\n")?;
    out.write_str(PROMPT)
}

pub fn write_counters<W: Write, S: CounterSource>(out: &mut W, src: &mut S) -> fmt::Result {
    for counter in COUNTERS {
        writeln!(out, "{:<24}{}", counter.label(), src.read(counter))?;
    }
    Ok(())
}

pub struct Console<S> {
    line: heapless::Vec<u8, MAX_CMD_LEN>,
    counters: S,
}

impl<S: CounterSource> Console<S> {
    pub fn new(counters: S) -> Self {
        Console {
            line: heapless::Vec::new(),
            counters,
        }
    }

    /// Feed one received character. Returns the command that ran, if the
    /// character completed a line.
    pub fn feed<W: Write>(&mut self, ch: u8, out: &mut W) -> Result<Option<Command>, fmt::Error> {
        match ch {
            b'\r' => {
                let cmd = Command::parse(&self.line);
                self.line.clear();
                self.execute(cmd, out)?;
                Ok(Some(cmd))
            }
            // Terminals that send CRLF: the LF is not part of the next command.
            b'\n' => Ok(None),
            _ => {
                if self.line.push(ch).is_err() {
                    self.line.clear();
                    out.write_str("Command too long\n")?;
                    out.write_str(PROMPT)?;
                }
                Ok(None)
            }
        }
    }

    pub fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> fmt::Result {
        match cmd {
            Command::Counters => write_counters(out, &mut self.counters)?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Unknown => out.write_str("?\n")?,
        }
        out.write_str(PROMPT)
    }

    pub fn pending(&self) -> &[u8] {
        &self.line
    }
}
