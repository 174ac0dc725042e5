// src/store.rs
// Persisted per-output-directory state: the export counter behind `<platform>-<n>` stems.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::consts::{COUNTER_FILE, STORE_DIR};
use crate::specs::Platform;

fn counter_path(out_dir: &Path) -> PathBuf {
    out_dir.join(STORE_DIR).join(COUNTER_FILE)
}

/// Last counter value written for `out_dir`, 0 when none.
pub fn load_counter(out_dir: &Path) -> u64 {
    fs::read_to_string(counter_path(out_dir))
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

/// Increment and persist; returns the new value.
pub fn next_counter(out_dir: &Path) -> io::Result<u64> {
    let p = counter_path(out_dir);
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent)?;
    }
    let next = load_counter(out_dir) + 1;
    fs::write(&p, next.to_string())?;
    Ok(next)
}

/// `<platform>-<counter>`, or `<platform>-<timestamp>` when the counter can't be persisted.
pub fn next_stem(out_dir: &Path, platform: Platform) -> String {
    match next_counter(out_dir) {
        Ok(n) => format!("{}-{n}", platform.name()),
        Err(_) => format!("{}-{}", platform.name(), Local::now().format("%Y%m%d-%H%M%S")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_increments_per_directory() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        assert_eq!(load_counter(a.path()), 0);
        assert_eq!(next_stem(a.path(), Platform::ChatGpt), "chatgpt-1");
        assert_eq!(next_stem(a.path(), Platform::Gemini), "gemini-2");
        assert_eq!(next_stem(b.path(), Platform::Gemini), "gemini-1");
        assert_eq!(load_counter(a.path()), 2);
    }

    #[test]
    fn unwritable_directory_falls_back_to_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let stem = next_stem(&blocker, Platform::ChatGpt);
        assert!(stem.starts_with("chatgpt-"));
        assert_eq!(stem.len(), "chatgpt-".len() + "20260101-000000".len());
    }
}
