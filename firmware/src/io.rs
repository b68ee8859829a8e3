// firmware/src/io.rs
//! Memory-mapped I/O window of the FPGA SoC.

use core::fmt;

pub const IO_BASE: usize = 0xC000_0000;

/* byte offsets inside the I/O window */
pub const CONSOLE_TX: usize = 0x0000;
pub const CONSOLE_RX: usize = 0x0001;
pub const MTIME: usize = 0x4000;
pub const MTIMECMP: usize = 0x4008;

#[inline(always)]
fn mmio8(addr: usize) -> *mut u8 {
    addr as *mut u8
}

#[inline(always)]
fn mmio32(addr: usize) -> *mut u32 {
    addr as *mut u32
}

/// Read a 64-bit counter exposed as two little-endian 32-bit halves.
///
/// The high half is sampled on both sides of the low half; if it moved, the
/// low half wrapped in between and the read is repeated.
///
/// # Safety
/// `addr` must point at a readable, 8-byte aligned MMIO register pair.
pub unsafe fn read_u64_split(addr: usize) -> u64 {
    loop {
        let hi = core::ptr::read_volatile(mmio32(addr + 4));
        let lo = core::ptr::read_volatile(mmio32(addr));
        let hi2 = core::ptr::read_volatile(mmio32(addr + 4));
        if hi == hi2 {
            return ((hi as u64) << 32) | lo as u64;
        }
    }
}

/// Write a 64-bit compare register as two 32-bit halves.
///
/// Low is parked at `u32::MAX` while the high half changes, so no transient
/// value can be smaller than both the old and the new compare.
///
/// # Safety
/// `addr` must point at a writable, 8-byte aligned MMIO register pair.
pub unsafe fn write_u64_split(addr: usize, value: u64) {
    core::ptr::write_volatile(mmio32(addr), u32::MAX);
    core::ptr::write_volatile(mmio32(addr + 4), (value >> 32) as u32);
    core::ptr::write_volatile(mmio32(addr), value as u32);
}

/// Character console at the bottom of the I/O window.
pub struct Uart;

impl Uart {
    pub const fn new() -> Self {
        Uart
    }

    #[inline(always)]
    pub fn write_byte(&mut self, byte: u8) {
        unsafe { core::ptr::write_volatile(mmio8(IO_BASE + CONSOLE_TX), byte) }
    }

    /// Blocks on the bus until the device hands over a character.
    #[inline(always)]
    pub fn read_byte(&mut self) -> u8 {
        unsafe { core::ptr::read_volatile(mmio8(IO_BASE + CONSOLE_RX)) }
    }
}

impl Default for Uart {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            match b {
                b'\n' => {
                    self.write_byte(b'\r');
                    self.write_byte(b'\n');
                }
                byte => self.write_byte(byte),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_offsets() {
        assert_eq!(IO_BASE + MTIME, 0xC000_4000);
        assert_eq!(IO_BASE + MTIMECMP, 0xC000_4008);
        assert_eq!(MTIMECMP - MTIME, 8);
    }

    #[test]
    fn test_split_access_roundtrip_in_ram() {
        // Back the "register" with ordinary memory to check half ordering.
        let mut reg = [0u32; 2];
        let addr = reg.as_mut_ptr() as usize;
        unsafe { write_u64_split(addr, 0x0000_0001_0000_0010) };
        assert_eq!(reg, [0x10, 0x1]);
        assert_eq!(unsafe { read_u64_split(addr) }, 0x0000_0001_0000_0010);
    }
}
