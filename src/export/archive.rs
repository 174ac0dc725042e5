// src/export/archive.rs
// ZIP bundle: `<base>.md` plus `assets/<name>` for every planned attachment.
// A failed download leaves `assets/<name>_error.txt` in its place; the bundle is still written.

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Result;
use crate::log::DebugLog;

use super::assets::{AssetFetcher, AssetPlan};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStats {
    pub assets: usize,
    pub failed: usize,
}

pub fn build_zip(
    base_name: &str,
    markdown: &str,
    plan: &AssetPlan,
    fetcher: &dyn AssetFetcher,
    log: &DebugLog,
) -> Result<(Vec<u8>, ArchiveStats)> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut stats = ArchiveStats::default();

    zip.start_file(join!(base_name, ".md"), options)?;
    zip.write_all(markdown.as_bytes())?;

    if !plan.is_empty() {
        logf!(log, "bundling {} attachment(s)", plan.len());
    }
    for asset in plan.assets() {
        match fetcher.fetch(&asset.url) {
            Ok(bytes) => {
                zip.start_file(asset.path(), options)?;
                zip.write_all(&bytes)?;
                stats.assets += 1;
            }
            Err(e) => {
                logw!(log, "attachment {}: {e}", asset.name);
                zip.start_file(join!(&asset.path(), "_error.txt"), options)?;
                zip.write_all(format!("Failed to download original image: {}\n", asset.url).as_bytes())?;
                stats.failed += 1;
            }
        }
    }

    let cursor = zip.finish()?;
    Ok((cursor.into_inner(), stats))
}
