//! Leveled debug printing for the engine
//!
//! Lightweight stderr logging that tags each line with the pool worker the
//! current thread belongs to and, while a reduce job runs, the partition it
//! is draining. Both come from thread-local context, so call sites pass
//! only a message.
//!
//! Configuration is read from the environment once, on first use:
//!
//! - `MR_LOG_LEVEL` - `off`, `error`, `warn`, `info`, `debug`, `trace`
//!   (or `0`-`5`); default `warn`
//! - `MR_FLUSH_EPRINT=1` - flush stderr after every line
//! - `MR_PRINT_TIME=1` - prefix lines with nanoseconds since logging began
//!
//! Lines look like `[DEBUG] [w0:p--] map phase: 12 jobs`, where `--` marks
//! a thread with no worker or partition identity.
//!
//! ```ignore
//! use mapred_core::{mrdebug, mrwarn};
//!
//! mrdebug!("sized {} input files", files.len());
//! mrwarn!("discarding {} queued jobs", n);
//! ```

use std::cell::Cell;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use crate::env::{env_get, env_get_bool};

/// Log levels, most severe first
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Off,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Debug,
            _ => Self::Trace,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Off => "",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "0" => Ok(Self::Off),
            "error" | "1" => Ok(Self::Error),
            "warn" | "2" => Ok(Self::Warn),
            "info" | "3" => Ok(Self::Info),
            "debug" | "4" => Ok(Self::Debug),
            "trace" | "5" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

/// Runtime configuration, captured from the environment on first use.
///
/// Only the level can change afterwards; flush and timestamp modes are
/// fixed for the life of the process.
struct LogConfig {
    level: AtomicU8,
    flush: bool,
    timestamps: bool,
    start: Instant,
}

static CONFIG: OnceLock<LogConfig> = OnceLock::new();

fn config() -> &'static LogConfig {
    CONFIG.get_or_init(|| LogConfig {
        level: AtomicU8::new(env_get("MR_LOG_LEVEL", LogLevel::Warn) as u8),
        flush: env_get_bool("MR_FLUSH_EPRINT", false),
        timestamps: env_get_bool("MR_PRINT_TIME", false),
        start: Instant::now(),
    })
}

/// Capture the environment configuration now instead of on the first
/// logged line. Useful when the caller wants the timestamp origin pinned.
pub fn init() {
    let _ = config();
}

/// Current log level
pub fn log_level() -> LogLevel {
    LogLevel::from_u8(config().level.load(Ordering::Relaxed))
}

/// Override the log level for the rest of the process
pub fn set_log_level(level: LogLevel) {
    config().level.store(level as u8, Ordering::Relaxed);
}

/// Per-thread identity stamped on every line.
#[derive(Clone, Copy, Default)]
struct JobContext {
    worker: Option<u32>,
    partition: Option<u32>,
}

impl fmt::Display for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.worker {
            Some(w) => write!(f, "[w{}", w)?,
            None => f.write_str("[w--")?,
        }
        match self.partition {
            Some(p) => write!(f, ":p{}]", p),
            None => f.write_str(":p--]"),
        }
    }
}

thread_local! {
    static CONTEXT: Cell<JobContext> = const {
        Cell::new(JobContext {
            worker: None,
            partition: None,
        })
    };
}

/// Tag this thread as a pool worker (set by the pool at thread start)
pub fn set_worker_id(id: u32) {
    CONTEXT.with(|c| {
        c.set(JobContext {
            worker: Some(id),
            ..c.get()
        })
    });
}

/// Drop the worker tag (set by the pool at thread exit)
pub fn clear_worker_id() {
    CONTEXT.with(|c| {
        c.set(JobContext {
            worker: None,
            ..c.get()
        })
    });
}

/// Tag this thread with the partition its reduce job is draining
pub fn set_partition_id(id: u32) {
    CONTEXT.with(|c| {
        c.set(JobContext {
            partition: Some(id),
            ..c.get()
        })
    });
}

/// Drop the partition tag once the reduce job finishes
pub fn clear_partition_id() {
    CONTEXT.with(|c| {
        c.set(JobContext {
            partition: None,
            ..c.get()
        })
    });
}

/// Emit path shared by every level macro. The full line is formatted
/// first and written with a single call, so concurrent workers cannot
/// interleave within a line.
#[doc(hidden)]
pub fn _log(level: LogLevel, args: fmt::Arguments<'_>) {
    let config = config();
    if level == LogLevel::Off || level as u8 > config.level.load(Ordering::Relaxed) {
        return;
    }

    use fmt::Write as _;
    let mut line = String::new();
    let _ = write!(line, "[{:<5}] ", level.label());
    if config.timestamps {
        let _ = write!(line, "[{}] ", config.start.elapsed().as_nanos());
    }
    let _ = write!(line, "{} {}", CONTEXT.with(|c| c.get()), args);
    line.push('\n');

    let mut stderr = std::io::stderr().lock();
    let _ = stderr.write_all(line.as_bytes());
    if config.flush {
        let _ = stderr.flush();
    }
}

/// Log at an explicit level: `mrlog!(Warn, "...")`.
///
/// The per-level macros below are thin wrappers over this.
#[macro_export]
macro_rules! mrlog {
    ($level:ident, $($arg:tt)*) => {
        $crate::mrprint::_log(
            $crate::mrprint::LogLevel::$level,
            format_args!($($arg)*),
        )
    };
}

/// Error level log with context
#[macro_export]
macro_rules! mrerror {
    ($($arg:tt)*) => { $crate::mrlog!(Error, $($arg)*) };
}

/// Warning level log with context
#[macro_export]
macro_rules! mrwarn {
    ($($arg:tt)*) => { $crate::mrlog!(Warn, $($arg)*) };
}

/// Info level log with context
#[macro_export]
macro_rules! mrinfo {
    ($($arg:tt)*) => { $crate::mrlog!(Info, $($arg)*) };
}

/// Debug level log with context
#[macro_export]
macro_rules! mrdebug {
    ($($arg:tt)*) => { $crate::mrlog!(Debug, $($arg)*) };
}

/// Trace level log with context
#[macro_export]
macro_rules! mrtrace {
    ($($arg:tt)*) => { $crate::mrlog!(Trace, $($arg)*) };
}
