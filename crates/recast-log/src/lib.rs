//! A minimal, zero-dependency logging crate for the recast runtime.
//!
//! Provides thread-safe leveled logging with automatic module path targets
//! and colored terminal output. Messages go to stderr so they never mix with
//! program output.
//!
//! # Example
//!
//! ```
//! use recast_log::{debug, info, warn, Level};
//!
//! recast_log::set_level(Level::Debug);
//!
//! let class = "Foo";
//! info!("reloading {}", class);
//! debug!("call-site cache cleared for {}", class);
//! warn!("reload of {} incomplete", class);
//! ```

use std::fmt::Arguments;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

/// Log levels ordered from most severe (Error) to least severe (Trace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Critical failures.
    Error = 0,
    /// Potentially harmful situations.
    Warn = 1,
    /// Informational messages.
    Info = 2,
    /// Diagnostic detail.
    Debug = 3,
    /// Most verbose tracing.
    Trace = 4,
}

impl Level {
    /// ANSI color code used when rendering this level.
    const fn color_code(self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[32m",
            Level::Debug => "\x1b[36m",
            Level::Trace => "\x1b[35m",
        }
    }

    /// The fixed-width tag printed in log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    fn from_u8(raw: u8) -> Level {
        match raw {
            0 => Level::Error,
            1 => Level::Warn,
            2 => Level::Info,
            3 => Level::Debug,
            _ => Level::Trace,
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Level::Error),
            "WARN" => Ok(Level::Warn),
            "INFO" => Ok(Level::Info),
            "DEBUG" => Ok(Level::Debug),
            "TRACE" => Ok(Level::Trace),
            _ => Err(format!("invalid log level: {s}")),
        }
    }
}

/// The global logger. Level changes are atomic, so filtering is lock-free.
pub struct Logger {
    level: AtomicU8,
}

impl Logger {
    const fn new(level: Level) -> Self {
        Logger {
            level: AtomicU8::new(level as u8),
        }
    }

    /// Sets the minimum level; messages below it are dropped.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Returns the current minimum level.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Whether a message at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns the global logger, initialized at `Level::Info` on first use.
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(Level::Info))
}

/// Sets the minimum log level for the global logger.
pub fn set_level(level: Level) {
    logger().set_level(level);
}

/// Sets the minimum log level from a string such as `"debug"`.
///
/// # Errors
///
/// Returns an error message if `s` names no known level.
pub fn set_level_from_str(s: &str) -> Result<(), String> {
    let level: Level = s.parse()?;
    set_level(level);
    Ok(())
}

/// Renders one log line. Called by the macros after the level check.
#[doc(hidden)]
pub fn __emit(level: Level, target: &str, args: Arguments) {
    const RESET: &str = "\x1b[0m";

    if !logger().enabled(level) {
        return;
    }

    let color = level.color_code();
    let tag = level.as_str();
    eprintln!("{color}[{tag}]{RESET} {target}: {args}");
}

/// Logs a message at an explicit level, capturing the caller's module path.
///
/// # Example
///
/// ```
/// use recast_log::{log, Level};
///
/// log!(level: Level::Info, "swapped {} classes", 3);
/// ```
#[macro_export]
macro_rules! log {
    (level: $level:expr, $($arg:tt)*) => {
        {
            if $crate::logger().enabled($level) {
                $crate::__emit($level, module_path!(), format_args!($($arg)*));
            }
        }
    };
}

/// Logs at the Error level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Error, $($arg)*)
    };
}

/// Logs at the Warn level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Warn, $($arg)*)
    };
}

/// Logs at the Info level.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Info, $($arg)*)
    };
}

/// Logs at the Debug level.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Debug, $($arg)*)
    };
}

/// Logs at the Trace level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Trace, $($arg)*)
    };
}
