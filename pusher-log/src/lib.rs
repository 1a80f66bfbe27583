//! Pusher Logging
//!
//! Leveled logging for the Pusher client crates. Records go to stderr as one
//! JSON object per line unless the application installs its own [`Sink`].
//!
//! ```rust
//! use pusher_log::{debug, warn};
//!
//! debug!(target: "pusher::dispatch", "POST {}", "/apps/1/events");
//! warn!("Proxy configured without credentials");
//! ```
//!
//! # Environment Variables
//!
//! Read once, on the first log call:
//!
//! - `PUSHER_LOG_LEVEL=trace|debug|info|warn|error|off`
//! - `PUSHER_DEBUG=1` - shorthand for `debug` when no level is given

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Disables all output.
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "off" | "none" => Some(Self::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Off => "OFF",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Trace,
            1 => Self::Debug,
            2 => Self::Info,
            3 => Self::Warn,
            4 => Self::Error,
            _ => Self::Off,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Minimum level when nothing is configured.
pub const DEFAULT_LEVEL: Level = Level::Info;

/// Logging settings taken from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub level: Level,
}

impl Settings {
    /// Read `PUSHER_LOG_LEVEL` and `PUSHER_DEBUG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    ///
    /// An explicit, valid `PUSHER_LOG_LEVEL` wins over `PUSHER_DEBUG`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let debug = lookup("PUSHER_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let level = lookup("PUSHER_LOG_LEVEL")
            .and_then(|v| Level::parse(&v))
            .unwrap_or(if debug { Level::Debug } else { DEFAULT_LEVEL });

        Self { level }
    }
}

const UNSET: u8 = u8::MAX;

static LEVEL: AtomicU8 = AtomicU8::new(UNSET);

/// The current minimum level, reading the environment on first use.
pub fn level() -> Level {
    match LEVEL.load(Ordering::Relaxed) {
        UNSET => {
            let from_env = Settings::from_env().level as u8;
            // a concurrent set_level wins over the environment
            match LEVEL.compare_exchange(UNSET, from_env, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(_) => Level::from_u8(from_env),
                Err(current) => Level::from_u8(current),
            }
        }
        value => Level::from_u8(value),
    }
}

/// Override the minimum level.
pub fn set_level(level: Level) {
    LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Whether records at `level` are emitted.
#[inline]
pub fn enabled(level: Level) -> bool {
    level != Level::Off && level >= self::level()
}

// ============================================================================
// Records and sinks
// ============================================================================

/// One log record.
#[derive(Debug, Clone, Serialize)]
pub struct Record<'a> {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub target: &'a str,
    pub message: String,
}

/// Destination for records that passed the level gate.
pub trait Sink: Send + Sync {
    fn write(&self, record: &Record<'_>);
}

/// Writes each record to stderr as a JSON line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn write(&self, record: &Record<'_>) {
        if let Ok(line) = serde_json::to_string(record) {
            eprintln!("{}", line);
        }
    }
}

static SINK: Lazy<RwLock<Arc<dyn Sink>>> = Lazy::new(|| RwLock::new(Arc::new(StderrSink)));

/// Route all records to `sink`.
pub fn set_sink(sink: Arc<dyn Sink>) {
    *SINK.write() = sink;
}

/// Go back to [`StderrSink`].
pub fn reset_sink() {
    set_sink(Arc::new(StderrSink));
}

#[doc(hidden)]
pub fn __write(level: Level, target: &str, args: fmt::Arguments<'_>) {
    let record = Record {
        timestamp: Utc::now(),
        level,
        target,
        message: args.to_string(),
    };
    // clone out so a sink may log without holding the lock
    let sink = SINK.read().clone();
    sink.write(&record);
}

// ============================================================================
// Macros
// ============================================================================

/// Log at an explicit level. The message is only formatted when enabled.
#[macro_export]
macro_rules! log {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {{
        let level = $level;
        if $crate::enabled(level) {
            $crate::__write(level, $target, format_args!($($arg)+));
        }
    }};
    ($level:expr, $($arg:tt)+) => {
        $crate::log!($level, target: module_path!(), $($arg)+)
    };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Error, $($arg)+) };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! Forward records into `tracing`, for applications that already run a
    //! `tracing` subscriber.
    //!
    //! ```rust,ignore
    //! pusher_log::set_sink(std::sync::Arc::new(pusher_log::tracing_compat::TracingSink));
    //! ```

    use crate::{Level, Record, Sink};

    /// Re-emits records as `tracing` events with target `pusher`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct TracingSink;

    impl Sink for TracingSink {
        fn write(&self, record: &Record<'_>) {
            let origin = record.target;
            let message = record.message.as_str();
            match record.level {
                Level::Trace => tracing::trace!(target: "pusher", origin, "{}", message),
                Level::Debug => tracing::debug!(target: "pusher", origin, "{}", message),
                Level::Info => tracing::info!(target: "pusher", origin, "{}", message),
                Level::Warn => tracing::warn!(target: "pusher", origin, "{}", message),
                Level::Error => tracing::error!(target: "pusher", origin, "{}", message),
                Level::Off => {}
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
