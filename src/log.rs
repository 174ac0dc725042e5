// src/log.rs
//! Debug log sink.
//!
//! Every component that wants to report something receives a `&DebugLog`.
//! Lines are kept in memory (they end up in `<base>-log.txt` on export) and
//! are forwarded to the `log` facade so a CLI logger can show them live.

use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug)]
pub struct DebugLog {
    start: Instant,
    lines: Mutex<Vec<String>>,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new()
    }
}

fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

impl DebugLog {
    pub fn new() -> Self {
        Self { start: Instant::now(), lines: Mutex::new(Vec::new()) }
    }

    pub fn write(&self, level: ::log::Level, msg: &str) {
        let elapsed = fmt_elapsed(self.start.elapsed().as_millis());
        let tag = match level {
            ::log::Level::Error => "ERROR",
            ::log::Level::Warn => "WARN",
            ::log::Level::Info => "INFO",
            ::log::Level::Debug | ::log::Level::Trace => "DEBUG",
        };
        ::log::log!(target: "chat_export", level, "{msg}");

        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format!("[{elapsed}][{tag}] {msg}"));
        }
    }

    /// Snapshot of all lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }

    /// Newline-joined contents, as written to the debug log file.
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($sink:expr, $($arg:tt)*) => {
        $sink.write(::log::Level::Info, &format!($($arg)*))
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($sink:expr, $($arg:tt)*) => {
        $sink.write(::log::Level::Debug, &format!($($arg)*))
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($sink:expr, $($arg:tt)*) => {
        $sink.write(::log::Level::Warn, &format!($($arg)*))
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($sink:expr, $($arg:tt)*) => {
        $sink.write(::log::Level::Error, &format!($($arg)*))
    };
}
