#![no_std]
#![no_main]

use core::fmt::Write;

use console::{write_banner, Console, HartCounters};
use firmware_lib::io::Uart;
use firmware_lib::logging::set_log_level;
use firmware_lib::{config, kwarn, rt};

#[no_mangle]
extern "C" fn rust_start() -> ! {
    rt::install_trap_vector();

    let cfg = config::init(|e| kwarn!("bootargs: {}", e));
    set_log_level(cfg.log_level);

    // Keep the timer running so the Timer IRQ counter has something to show.
    rt::arm_timer(cfg.first_tick);
    rt::enable_interrupts();

    let mut uart = Uart::new();
    let _ = write_banner(&mut uart);

    let mut console = Console::new(HartCounters);
    loop {
        let ch = uart.read_byte();
        // No logging here: it would land after the prompt.
        let _ = console.feed(ch, &mut uart);
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    let mut uart = Uart::new();
    let _ = writeln!(uart, "\n*** CONSOLE PANIC ***");
    if let Some(loc) = info.location() {
        let _ = writeln!(uart, "at {}:{}:{}", loc.file(), loc.line(), loc.column());
    }
    let _ = writeln!(uart, "{}", info.message());
    rt::halt()
}
