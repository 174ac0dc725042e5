// src/specs/mod.rs
//! # Platform "specs"
//!
//! Each supported chat platform is described here: *which selectors find the
//! messages*, *where the content lives inside a message*, *which class
//! fragments give away the author* and *how the conversation title and
//! participant names are read*.
//!
//! ## What lives here
//! - The built-in selector table (`SelectorConfig` per `Platform`).
//! - Platform detection from the page URL.
//! - Metadata extraction (title, user name, assistant name), one page at a time.
//!
//! ## What does **not** live here
//! - Capture, dedup and ordering (`capture`).
//! - Selector discovery when a configured selector stops matching
//!   (`capture::resolve`); the table here is static input to that step.
//!
//! The table can be replaced wholesale or per platform from JSON, so a page
//! redesign can be handled without a rebuild.
pub mod chatgpt;
pub mod gemini;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::capture::ConversationMetadata;
use crate::error::{Error, Result};
use crate::page::PageSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    ChatGpt,
    Gemini,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::ChatGpt, Platform::Gemini];

    pub fn name(self) -> &'static str {
        match self {
            Platform::ChatGpt => "chatgpt",
            Platform::Gemini => "gemini",
        }
    }

    /// Detect from a URL or hostname. Only the host is consulted, except for
    /// `g.co/gemini/...` share links.
    pub fn detect(url: &str) -> Option<Platform> {
        let parsed = Url::parse(url).ok();
        let (host, path) = match &parsed {
            Some(u) => (u.host_str()?.to_ascii_lowercase(), u.path()),
            None => {
                let (host, path) = url.split_once('/').unwrap_or((url, ""));
                (host.to_ascii_lowercase(), path)
            }
        };
        let host = host.trim_start_matches("www.");
        if host.contains("chatgpt") || host == "chat.openai.com" {
            Some(Platform::ChatGpt)
        } else if host.contains("gemini") || (host == "g.co" && path.trim_start_matches('/').starts_with("gemini")) {
            Some(Platform::Gemini)
        } else {
            None
        }
    }

    pub fn default_selectors(self) -> SelectorConfig {
        match self {
            Platform::ChatGpt => chatgpt::selectors(),
            Platform::Gemini => gemini::selectors(),
        }
    }

    pub fn extract_metadata(self, page: &PageSnapshot) -> ConversationMetadata {
        match self {
            Platform::ChatGpt => chatgpt::extract_metadata(page),
            Platform::Gemini => gemini::extract_metadata(page),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chatgpt" => Ok(Platform::ChatGpt),
            "gemini" => Ok(Platform::Gemini),
            other => Err(Error::UnsupportedPlatform(s!(other))),
        }
    }
}

/// CSS selectors and marker strings for one platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorConfig {
    pub container_selector: String,
    pub message_selector: String,
    #[serde(default)]
    pub user_message_selector: String,
    #[serde(default)]
    pub assistant_message_selector: String,
    #[serde(default)]
    pub content_selector: String,
    #[serde(default)]
    pub attachment_selector: String,
    /// Class/tag fragments that mark user content.
    #[serde(default)]
    pub user_markers: Vec<String>,
    /// Class/tag fragments that mark assistant content.
    #[serde(default)]
    pub assistant_markers: Vec<String>,
}

fn common_markers() -> (Vec<String>, Vec<String>) {
    (
        vec![s!("user-query")],
        vec![s!("model-response"), s!("response-container")],
    )
}

/// The per-platform selector table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorTable(HashMap<Platform, SelectorConfig>);

impl Default for SelectorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SelectorTable {
    pub fn builtin() -> Self {
        Self(Platform::ALL.iter().map(|p| (*p, p.default_selectors())).collect())
    }

    /// Built-in table with the platforms present in `json` replaced.
    pub fn with_overrides_json(json: &str) -> Result<Self> {
        let overrides: HashMap<Platform, SelectorConfig> = serde_json::from_str(json)?;
        let mut table = Self::builtin();
        table.0.extend(overrides);
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::with_overrides_json(&text)
    }

    pub fn get(&self, platform: Platform) -> SelectorConfig {
        self.0.get(&platform).cloned().unwrap_or_else(|| platform.default_selectors())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        let mut map = serde_json::Map::new();
        for p in Platform::ALL {
            if let Some(cfg) = self.0.get(&p) {
                map.insert(s!(p.name()), serde_json::to_value(cfg)?);
            }
        }
        Ok(serde_json::to_string_pretty(&map)?)
    }
}
