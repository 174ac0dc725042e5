// src/file.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::options::ExportOptions;
use crate::core::sanitize::sanitize_filename;
use crate::error::{Error, Result};
use crate::export::{ArchiveStats, AssetFetcher, ExportBundle, build_zip};
use crate::log::DebugLog;
use crate::store;

/// Paths produced by one `write_bundle` call.
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub stem: String,
    pub markdown: PathBuf,
    pub zip: Option<PathBuf>,
    pub archive: Option<ArchiveStats>,
    pub print_html: Option<PathBuf>,
    pub debug_log: Option<PathBuf>,
}

impl WrittenFiles {
    pub fn all(&self) -> Vec<&Path> {
        let mut v = vec![self.markdown.as_path()];
        v.extend(self.zip.as_deref());
        v.extend(self.print_html.as_deref());
        v.extend(self.debug_log.as_deref());
        v
    }
}

/// Write `<stem>.md` and, when present in the bundle, `<stem>.zip` / `<stem>.html`,
/// followed by `<stem>-log.txt` with everything `log` collected.
pub fn write_bundle(
    bundle: &ExportBundle,
    export: &ExportOptions,
    fetcher: &dyn AssetFetcher,
    log: &DebugLog,
) -> Result<WrittenFiles> {
    ensure_directory(&export.out_dir)?;
    let stem = match &export.stem {
        Some(s) if !s.trim().is_empty() => sanitize_filename(s.trim()),
        _ => store::next_stem(&export.out_dir, bundle.platform),
    };

    let markdown = export.path_for(&stem, "md");
    fs::write(&markdown, &bundle.markdown)?;
    logf!(log, "wrote {}", markdown.display());

    let (zip, archive) = match &bundle.zip {
        Some(pkg) => {
            let (bytes, stats) = build_zip(&stem, &pkg.markdown, &pkg.plan, fetcher, log)?;
            let path = export.path_for(&stem, "zip");
            fs::write(&path, bytes)?;
            logf!(log, "wrote {} ({} asset(s), {} failed)", path.display(), stats.assets, stats.failed);
            (Some(path), Some(stats))
        }
        None => (None, None),
    };

    let print_html = match &bundle.print_html {
        Some(html) => {
            let path = export.path_for(&stem, "html");
            fs::write(&path, html)?;
            logf!(log, "wrote {}", path.display());
            Some(path)
        }
        None => None,
    };

    let debug_log = if export.write_debug_log && !log.is_empty() {
        let path = export.out_dir.join(join!(&stem, "-log.txt"));
        fs::write(&path, log.render())?;
        Some(path)
    } else {
        None
    };

    Ok(WrittenFiles { stem, markdown, zip, archive, print_html, debug_log })
}

pub fn normalize_separators(p: &str) -> String {
    let sep = std::path::MAIN_SEPARATOR;
    p.chars().map(|c| if c == '/' || c == '\\' { sep } else { c }).collect()
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
