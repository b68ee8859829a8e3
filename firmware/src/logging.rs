//! Firmware logging with configurable log levels.
//!
//! Everything goes to the console UART. Log levels follow log4j:
//! - TRACE: Fine-grained debugging information
//! - DEBUG: Debugging information
//! - INFO: Informational messages
//! - WARN: Warning messages
//! - ERROR: Error messages
//!
//! Logging is for normal-mode code only. The trap path never logs: a fatal
//! trap halts silently, and the UART may be mid-write when an interrupt hits.

use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicU8, Ordering};

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    pub const fn prefix(self) -> &'static str {
        match self {
            LogLevel::Trace => "[TRACE] ",
            LogLevel::Debug => "[DEBUG] ",
            LogLevel::Info => "[INFO]  ",
            LogLevel::Warn => "[WARN]  ",
            LogLevel::Error => "[ERROR] ",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end())
    }
}

/// Global log level filter. Messages below this level are suppressed.
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Get the current log level threshold.
pub fn get_log_level() -> LogLevel {
    match LOG_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Trace,
        1 => LogLevel::Debug,
        2 => LogLevel::Info,
        3 => LogLevel::Warn,
        _ => LogLevel::Error,
    }
}

/// Set the log level threshold. Messages below this level will be suppressed.
pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Check if a message at the given level should be logged.
#[inline]
pub fn should_log(level: LogLevel) -> bool {
    level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

/// Write one formatted log line to `out`. Line endings are the sink's
/// business; `Uart` turns `\n` into CRLF.
pub fn write_record<W: fmt::Write>(out: &mut W, level: LogLevel, args: fmt::Arguments<'_>) {
    let _ = out.write_str(level.prefix());
    let _ = out.write_fmt(args);
    let _ = out.write_str("\n");
}

/// Internal macro for firmware logging with level filtering.
#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $crate::logging::should_log(level) {
            let mut uart = $crate::io::Uart::new();
            $crate::logging::write_record(&mut uart, level, format_args!($($arg)*));
        }
    }};
}

/// Log a trace-level message (finest granularity).
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logging::LogLevel::Trace, $($arg)*)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logging::LogLevel::Debug, $($arg)*)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logging::LogLevel::Info, $($arg)*)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logging::LogLevel::Warn, $($arg)*)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {
        $crate::klog!($crate::logging::LogLevel::Error, $($arg)*)
    };
}
