// firmware/src/config.rs
//! Boot configuration.
//!
//! There is no device tree or bootloader on the FPGA board, so "boot args"
//! are baked in at build time from `FIRMWARE_BOOTARGS`, e.g.
//! `FIRMWARE_BOOTARGS="loglevel=debug tick=5000"`.

use core::fmt;

use spin::Once;

use crate::dispatch::DEFAULT_TIMER_INTERVAL;
use crate::logging::LogLevel;

/// Delay before the very first timer interrupt.
pub const DEFAULT_FIRST_TICK: u64 = 100;

pub const BOOTARGS: &str = match option_env!("FIRMWARE_BOOTARGS") {
    Some(args) => args,
    None => "",
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BootConfig {
    pub log_level: LogLevel,
    pub tick_interval: u64,
    pub first_tick: u64,
}

impl BootConfig {
    pub const DEFAULT: BootConfig = BootConfig {
        log_level: LogLevel::Info,
        tick_interval: DEFAULT_TIMER_INTERVAL,
        first_tick: DEFAULT_FIRST_TICK,
    };
}

impl Default for BootConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    BadLogLevel,
    BadNumber(&'static str),
    ZeroInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BadLogLevel => f.write_str("loglevel must be trace|debug|info|warn|error"),
            ConfigError::BadNumber(key) => write!(f, "{key} expects an unsigned integer"),
            ConfigError::ZeroInterval => f.write_str("tick must be non-zero"),
        }
    }
}

fn parse_u64(key: &'static str, v: &str) -> Result<u64, ConfigError> {
    let parsed = match v.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => v.parse::<u64>(),
    };
    parsed.map_err(|_| ConfigError::BadNumber(key))
}

fn apply(cfg: &mut BootConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "loglevel" => {
            cfg.log_level = value.parse().map_err(|_| ConfigError::BadLogLevel)?;
        }
        "tick" => {
            let tick = parse_u64("tick", value)?;
            if tick == 0 {
                return Err(ConfigError::ZeroInterval);
            }
            cfg.tick_interval = tick;
        }
        "first_tick" => {
            cfg.first_tick = parse_u64("first_tick", value)?;
        }
        _ => {}
    }
    Ok(())
}

/// Parse whitespace separated `key=value` pairs. Unknown keys and bare words
/// are ignored; a bad value keeps the default for that key and is handed to
/// `on_error`.
pub fn parse_bootargs<F>(s: &str, mut on_error: F) -> BootConfig
where
    F: FnMut(ConfigError),
{
    let mut cfg = BootConfig::DEFAULT;
    for param in s.split_whitespace() {
        if let Some((key, value)) = param.split_once('=') {
            if let Err(e) = apply(&mut cfg, key, value) {
                on_error(e);
            }
        }
    }
    cfg
}

static CONFIG: Once<BootConfig> = Once::new();

/// Parse `BOOTARGS` once and publish the result. Later calls return the
/// already published configuration.
pub fn init<F>(on_error: F) -> &'static BootConfig
where
    F: FnMut(ConfigError),
{
    CONFIG.call_once(|| parse_bootargs(BOOTARGS, on_error))
}

/// The published configuration, or the defaults if `init` has not run.
/// Safe to call from the trap handler.
pub fn current() -> BootConfig {
    CONFIG.get().copied().unwrap_or(BootConfig::DEFAULT)
}
