// src/export/document.rs
// Markdown document assembly: header block, then one section per ordered message.

use chrono::NaiveDateTime;

use crate::capture::{CapturedMessage, ConversationMetadata};
use crate::config::AssetMode;
use crate::config::consts::DATE_FORMAT;
use crate::log::DebugLog;
use crate::markdown::Converter;
use crate::specs::Platform;

use super::assets::AssetPlan;

pub const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Everything fixed for one export run. Output depends only on these and the input.
pub struct Assembler<'a> {
    pub converter: &'a Converter,
    pub platform: Platform,
    pub metadata: &'a ConversationMetadata,
    pub exported_at: NaiveDateTime,
    pub log: Option<&'a DebugLog>,
}

impl Assembler<'_> {
    fn header(&self, count: usize) -> String {
        let m = self.metadata;
        let mut md = format!("# {}\n\n", m.title);
        md.push_str(&format!("**Platform:** {}\n", self.platform.name().to_uppercase()));
        md.push_str(&format!("**Date:** {}\n", self.exported_at.format(DATE_FORMAT)));
        md.push_str(&format!("**Total messages:** {count}\n"));
        md.push_str(&format!(
            "**User:** {} | **Assistant:** {}\n\n",
            m.user_name, m.assistant_name
        ));
        md.push_str(&format!("---\n*Exported with {GENERATOR}*\n---\n\n"));
        md
    }

    fn convert(&self, html: &str) -> String {
        match self.log {
            Some(log) => self.converter.convert_logged(html, log),
            None => self.converter.convert(html),
        }
    }

    /// `mode` picks remote URLs or `assets/` paths from `plan` for attachment links.
    pub fn assemble(&self, ordered: &[CapturedMessage], mode: AssetMode, plan: &AssetPlan) -> String {
        let mut md = self.header(ordered.len());

        for (i, msg) in ordered.iter().enumerate() {
            md.push_str(&format!("## {} ({})\n\n", self.metadata.speaker(msg.author), i + 1));

            let content = self.convert(&msg.sanitized_html);
            if !content.is_empty() {
                md.push_str(&content);
                md.push_str("\n\n");
            }

            if !msg.attachments.is_empty() {
                md.push_str("### 📎 Attachments\n");
                for url in &msg.attachments {
                    let path = match mode {
                        AssetMode::Local => plan.local_path(url).unwrap_or_else(|| url.clone()),
                        AssetMode::Remote => url.clone(),
                    };
                    md.push_str(&format!("![Attachment]({path})\n\n"));
                }
            }

            md.push_str("---\n\n");
        }
        md
    }
}
