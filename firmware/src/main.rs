#![no_std]
#![no_main]

use core::fmt::Write;

use firmware_lib::io::Uart;
use firmware_lib::lock::GLOBAL_LOCK;
use firmware_lib::logging::set_log_level;
use firmware_lib::{config, kdebug, kinfo, kwarn, rt};

#[no_mangle]
extern "C" fn rust_start() -> ! {
    rt::install_trap_vector();

    let cfg = config::init(|e| kwarn!("bootargs: {}", e));
    set_log_level(cfg.log_level);
    kdebug!("tick={} first_tick={}", cfg.tick_interval, cfg.first_tick);

    // Compare is written here once, before any trap can be taken.
    rt::arm_timer(cfg.first_tick);
    rt::enable_interrupts();

    let mut uart = Uart::new();
    let _ = writeln!(uart, "Hello RISC-V on FPGA!");

    let guard = GLOBAL_LOCK.acquire();
    kinfo!("global lock acquired");
    guard.release();

    loop {
        unsafe { riscv::asm::wfi(); }
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    let mut uart = Uart::new();
    let _ = writeln!(uart, "\n*** FIRMWARE PANIC ***");
    if let Some(loc) = info.location() {
        let _ = writeln!(uart, "at {}:{}:{}", loc.file(), loc.line(), loc.column());
    }
    let _ = writeln!(uart, "{}", info.message());
    rt::halt()
}
