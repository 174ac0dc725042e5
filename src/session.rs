// src/session.rs
//! One recording session: start on a page, capture as frames arrive, then
//! stop and build the export bundle.
//!
//! Everything the pipeline shares lives here and is passed down explicitly:
//! the selector config (updated from each capture pass), the store, the
//! conversation metadata, the debug log and the progress sink.

use chrono::{Local, NaiveDateTime};

use crate::capture::{CaptureStore, Clock, ConversationMetadata, order_messages};
use crate::config::{AssetMode, SessionOptions};
use crate::error::{Error, Result};
use crate::export::{Assembler, AssetPlan, ExportBundle, ZipPackage, render_print_view};
use crate::log::DebugLog;
use crate::markdown::Converter;
use crate::page::PageSnapshot;
use crate::progress::Progress;
use crate::runner::CancelToken;
use crate::specs::{Platform, SelectorConfig, SelectorTable};

pub struct Session<'p> {
    table: SelectorTable,
    forced_platform: Option<Platform>,
    platform: Option<Platform>,
    config: Option<SelectorConfig>,
    store: CaptureStore,
    metadata: ConversationMetadata,
    converter: Converter,
    options: SessionOptions,
    recording: bool,
    cancel: CancelToken,
    exported_at: Option<NaiveDateTime>,
    log: DebugLog,
    progress: Option<&'p mut dyn Progress>,
}

impl<'p> Session<'p> {
    pub fn new(table: SelectorTable) -> Self {
        Self {
            table,
            forced_platform: None,
            platform: None,
            config: None,
            store: CaptureStore::new(),
            metadata: ConversationMetadata::default(),
            converter: Converter::new(),
            options: SessionOptions::default(),
            recording: false,
            cancel: CancelToken::new(),
            exported_at: None,
            log: DebugLog::new(),
            progress: None,
        }
    }

    /// Skip URL detection and treat every page as `platform`.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.forced_platform = Some(platform);
        self
    }

    pub fn with_progress(mut self, progress: &'p mut dyn Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.store = CaptureStore::with_clock(clock);
        self
    }

    /// Fixed export timestamp instead of the local wall clock.
    pub fn with_export_time(mut self, at: NaiveDateTime) -> Self {
        self.exported_at = Some(at);
        self
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    pub fn metadata(&self) -> &ConversationMetadata {
        &self.metadata
    }

    /// Selector config the next capture pass will use.
    pub fn config(&self) -> Option<&SelectorConfig> {
        self.config.as_ref()
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }

    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn log(&self) -> &DebugLog {
        &self.log
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn report(&mut self, f: impl FnOnce(&mut dyn Progress)) {
        if let Some(p) = self.progress.as_deref_mut() {
            f(p);
        }
    }

    /// Begin recording on `snapshot`. Fails when the page is not a supported platform.
    pub fn start(&mut self, options: SessionOptions, snapshot: &PageSnapshot) -> Result<usize> {
        let platform = match self.forced_platform.or_else(|| snapshot.url().and_then(Platform::detect)) {
            Some(p) => p,
            None => {
                let url = snapshot.url().unwrap_or("<no url>");
                loge!(self.log, "unsupported platform: {url}");
                return Err(Error::UnsupportedPlatform(s!(url)));
            }
        };

        if self.platform != Some(platform) {
            self.config = Some(self.table.get(platform));
        }
        self.platform = Some(platform);
        self.options = options;
        self.converter = Converter::with_base_url(snapshot.url());
        if self.metadata.is_empty() {
            self.metadata = platform.extract_metadata(snapshot);
        }
        self.cancel.rearm();
        self.recording = true;

        logf!(
            self.log,
            "recording {} (auto_scroll={}, zip={}, pdf={})",
            platform,
            options.auto_scroll,
            options.zip_export,
            options.pdf_export
        );
        self.report(|p| {
            p.begin();
            p.log(&format!("platform: {platform}"));
        });
        Ok(self.capture_once(snapshot))
    }

    /// One capture pass. Returns the store size afterwards.
    pub fn capture_once(&mut self, snapshot: &PageSnapshot) -> usize {
        let Some(config) = self.config.take() else {
            logw!(self.log, "capture ignored: session not started");
            return self.store.len();
        };
        let report = self.store.capture_visible(snapshot, &config, &self.log);
        if let Some(pattern) = report.learned {
            logf!(self.log, "message selector now `{pattern}`");
            self.report(|p| p.log(&format!("message selector now `{pattern}`")));
        }
        self.config = Some(report.config);
        let count = report.count;
        self.report(|p| p.captured(count));
        count
    }

    /// Stop recording and build the bundle. `options` defaults to those given at start.
    pub fn stop_and_export(&mut self, options: Option<SessionOptions>) -> Result<ExportBundle> {
        let platform = self.platform.ok_or(Error::NotStarted)?;
        let options = options.unwrap_or(self.options);
        self.cancel.cancel();
        self.recording = false;

        let ordered = order_messages(self.store.messages());
        let exported_at = self.exported_at.unwrap_or_else(|| Local::now().naive_local());
        logf!(self.log, "exporting {} message(s)", ordered.len());

        let assembler = Assembler {
            converter: &self.converter,
            platform,
            metadata: &self.metadata,
            exported_at,
            log: Some(&self.log),
        };
        let remote_plan = AssetPlan::default();
        let markdown = assembler.assemble(&ordered, AssetMode::Remote, &remote_plan);

        let zip = options.zip_export.then(|| {
            let plan = AssetPlan::build(&ordered);
            let markdown = assembler.assemble(&ordered, AssetMode::Local, &plan);
            ZipPackage { markdown, plan }
        });
        let print_html = options
            .pdf_export
            .then(|| render_print_view(&ordered, &self.metadata, platform, exported_at));

        let count = ordered.len();
        let bundle = ExportBundle {
            platform,
            metadata: self.metadata.clone(),
            exported_at,
            messages: ordered,
            markdown,
            zip,
            print_html,
            debug_log: self.log.lines(),
        };
        self.report(|p| p.finish(count));
        Ok(bundle)
    }

    /// Drop everything captured and go back to the configured selectors.
    pub fn reset(&mut self) {
        self.cancel.cancel();
        self.store.reset();
        self.metadata = ConversationMetadata::default();
        self.config = self.platform.map(|p| self.table.get(p));
        self.recording = false;
        logf!(self.log, "session reset");
        self.report(|p| p.log("session reset"));
    }
}
