// src/error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// A single element could not be read (detached, malformed geometry, ...).
    #[error("element read failed: {0}")]
    Element(String),

    #[error("rule `{rule}` failed: {reason}")]
    Convert { rule: &'static str, reason: String },

    #[error("asset `{url}` unavailable: {reason}")]
    Asset { url: String, reason: String },

    #[error("path exists but is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("session was never started")]
    NotStarted,

    #[error("no snapshots to capture")]
    NoSnapshots,
}
