// src/config/options.rs
use std::path::{Path, PathBuf};

use super::consts::*;

/// Options chosen when recording starts (popup toggles in the extension).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub auto_scroll: bool,
    pub zip_export: bool,
    pub pdf_export: bool,
}

/// How attachment images are referenced from the Markdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssetMode {
    /// Link the original remote URL.
    #[default]
    Remote,
    /// Link `assets/<name>` inside the ZIP bundle.
    Local,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    /// Overrides the `<platform>-<counter>` stem when set.
    pub stem: Option<String>,
    pub write_debug_log: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            stem: None,
            write_debug_log: true,
        }
    }
}

impl ExportOptions {
    pub fn with_out_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.out_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn path_for(&self, stem: &str, ext: &str) -> PathBuf {
        self.out_dir.join(join!(stem, ".", ext))
    }
}
