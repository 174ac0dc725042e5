// src/export/assets.rs
// Attachment planning and retrieval for the ZIP bundle.
// The plan is computed once per export and shared by the local-asset Markdown
// and the archive writer, so both always agree on file names.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64ct::{Base64, Encoding};
use percent_encoding::percent_decode_str;
use url::Url;

use crate::capture::CapturedMessage;
use crate::config::consts::{ASSETS_DIR, DEFAULT_IMAGE_EXT, IMAGE_EXTENSIONS};
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedAsset {
    pub url: String,
    /// `img_<msg#>_<att#>.<ext>`, 1-based.
    pub name: String,
}

impl PlannedAsset {
    /// Path inside the bundle, as linked from the Markdown.
    pub fn path(&self) -> String {
        join!(ASSETS_DIR, "/", &self.name)
    }
}

#[derive(Clone, Debug, Default)]
pub struct AssetPlan {
    assets: Vec<PlannedAsset>,
    by_url: HashMap<String, usize>,
}

impl AssetPlan {
    /// One entry per distinct URL, named after its first occurrence in `ordered`.
    pub fn build(ordered: &[CapturedMessage]) -> Self {
        let mut plan = Self::default();
        for (m, msg) in ordered.iter().enumerate() {
            for (a, url) in msg.attachments.iter().enumerate() {
                if plan.by_url.contains_key(url) {
                    continue;
                }
                let name = format!("img_{}_{}.{}", m + 1, a + 1, extension_for(url));
                plan.by_url.insert(url.clone(), plan.assets.len());
                plan.assets.push(PlannedAsset { url: url.clone(), name });
            }
        }
        plan
    }

    pub fn assets(&self) -> &[PlannedAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn local_path(&self, url: &str) -> Option<String> {
        self.by_url.get(url).map(|&i| self.assets[i].path())
    }
}

/// Image extension from the URL path; anything unrecognised becomes `png`.
pub fn extension_for(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let last = path.rsplit('/').next().unwrap_or("");
    let ext = last.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()).unwrap_or_default();
    IMAGE_EXTENSIONS
        .iter()
        .find(|known| **known == ext)
        .copied()
        .unwrap_or(DEFAULT_IMAGE_EXT)
}

/* ---------------- fetching ---------------- */

/// Byte source for planned assets.
pub trait AssetFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

fn unavailable(url: &str, reason: impl Into<String>) -> Error {
    Error::Asset { url: s!(url), reason: reason.into() }
}

/// Offline fetcher: `file://` URLs, `data:` URIs and paths relative to `root`.
#[derive(Clone, Debug, Default)]
pub struct LocalAssetFetcher {
    root: Option<PathBuf>,
}

impl LocalAssetFetcher {
    pub fn new(root: Option<&Path>) -> Self {
        Self { root: root.map(Path::to_path_buf) }
    }
}

impl AssetFetcher for LocalAssetFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(data) = url.strip_prefix("data:") {
            return decode_data_uri(url, data);
        }
        if url.starts_with("file://") {
            let path = Url::parse(url)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| unavailable(url, "malformed file URL"))?;
            return std::fs::read(path).map_err(|e| unavailable(url, e.to_string()));
        }
        if url.contains("://") || url.starts_with("blob:") {
            return Err(unavailable(url, "remote asset; no network fetcher configured"));
        }
        let path = match &self.root {
            Some(root) => root.join(url),
            None => PathBuf::from(url),
        };
        std::fs::read(&path).map_err(|e| unavailable(url, e.to_string()))
    }
}

fn decode_data_uri(url: &str, data: &str) -> Result<Vec<u8>> {
    let (meta, payload) = data
        .split_once(',')
        .ok_or_else(|| unavailable(url, "malformed data URI"))?;
    if meta.ends_with(";base64") {
        return Base64::decode_vec(payload.trim()).map_err(|e| unavailable(url, e.to_string()));
    }
    Ok(percent_decode_str(payload).collect())
}

/// Blocking HTTP fetcher for remote attachments.
#[cfg(feature = "fetch")]
pub struct HttpAssetFetcher {
    client: reqwest::blocking::Client,
    fallback: LocalAssetFetcher,
}

#[cfg(feature = "fetch")]
impl HttpAssetFetcher {
    pub fn new(root: Option<&Path>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| unavailable("*", e.to_string()))?;
        Ok(Self { client, fallback: LocalAssetFetcher::new(root) })
    }
}

#[cfg(feature = "fetch")]
impl AssetFetcher for HttpAssetFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return self.fallback.fetch(url);
        }
        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(url, e.to_string()))?;
        let body = resp.bytes().map_err(|e| unavailable(url, e.to_string()))?;
        Ok(body.to_vec())
    }
}
