// src/export/mod.rs
//! Export stage: ordered records → Markdown document, printable HTML view and
//! the ZIP asset plan. `ExportBundle` is the handoff shape; writing it to disk
//! is `file`'s job.
pub mod archive;
pub mod assets;
pub mod document;
pub mod print;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::capture::{CapturedMessage, ConversationMetadata};
use crate::specs::Platform;

pub use archive::{ArchiveStats, build_zip};
pub use assets::{AssetFetcher, AssetPlan, LocalAssetFetcher, PlannedAsset};
pub use document::Assembler;
pub use print::render_print_view;

#[cfg(feature = "fetch")]
pub use assets::HttpAssetFetcher;

/// Local-asset Markdown and the plan it was rendered against.
#[derive(Clone, Debug)]
pub struct ZipPackage {
    pub markdown: String,
    pub plan: AssetPlan,
}

#[derive(Clone, Debug)]
pub struct ExportBundle {
    pub platform: Platform,
    pub metadata: ConversationMetadata,
    pub exported_at: NaiveDateTime,
    /// Records in export order.
    pub messages: Vec<CapturedMessage>,
    /// Markdown with remote attachment URLs.
    pub markdown: String,
    pub zip: Option<ZipPackage>,
    pub print_html: Option<String>,
    pub debug_log: Vec<String>,
}

/// JSON view of a bundle for packaging collaborators.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Handoff<'a> {
    pub platform: Platform,
    pub metadata: &'a ConversationMetadata,
    pub messages: &'a [CapturedMessage],
}

impl ExportBundle {
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn handoff(&self) -> Handoff<'_> {
        Handoff { platform: self.platform, metadata: &self.metadata, messages: &self.messages }
    }

    pub fn handoff_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(&self.handoff())?)
    }
}
