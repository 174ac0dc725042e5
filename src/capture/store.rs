// src/capture/store.rs
// Capture store: fingerprint-keyed, append-only record set for one session.
// Records keep first-capture insertion order; export ordering is done in `order`.

use std::cell::Cell;
use std::collections::HashSet;

use scraper::{ElementRef, Selector};

use crate::config::consts::TURN_CONTAINER_SELECTOR;
use crate::core::Fingerprint;
use crate::core::html;
use crate::error::Result;
use crate::log::DebugLog;
use crate::page::{Layout, PageSnapshot};
use crate::specs::SelectorConfig;

use super::classify::classify;
use super::normalize::Normalizer;
use super::resolve::resolve;
use super::CapturedMessage;

/// Wall-clock source for `captured_at_millis`.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Deterministic clock: starts at `start`, advances by `step` on every read.
pub struct StepClock {
    next: Cell<i64>,
    step: i64,
}

impl StepClock {
    pub fn new(start: i64, step: i64) -> Self {
        Self { next: Cell::new(start), step }
    }
}

impl Clock for StepClock {
    fn now_millis(&self) -> i64 {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }
}

/// Outcome of one `capture_visible` call.
#[derive(Clone, Debug)]
pub struct CaptureReport {
    /// Store size after the pass.
    pub count: usize,
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Config to thread into the next pass.
    pub config: SelectorConfig,
    pub learned: Option<&'static str>,
}

pub struct CaptureStore {
    records: Vec<CapturedMessage>,
    seen: HashSet<Fingerprint>,
    clock: Box<dyn Clock>,
}

impl Default for CaptureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureStore {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self { records: Vec::new(), seen: HashSet::new(), clock }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.seen.contains(fp)
    }

    /// Records in first-capture order.
    pub fn messages(&self) -> &[CapturedMessage] {
        &self.records
    }

    /// The single insert path. Duplicate fingerprints and the empty marker are ignored.
    pub fn insert(&mut self, msg: CapturedMessage) -> bool {
        if msg.fingerprint.is_empty_marker() || !self.seen.insert(msg.fingerprint.clone()) {
            return false;
        }
        self.records.push(msg);
        true
    }

    pub fn reset(&mut self) {
        self.records.clear();
        self.seen.clear();
    }

    /// Scan the snapshot and insert every message not captured yet.
    pub fn capture_visible(
        &mut self,
        page: &PageSnapshot,
        config: &SelectorConfig,
        log: &DebugLog,
    ) -> CaptureReport {
        let layout = page.layout();
        self.capture_with_layout(page, &layout, config, log)
    }

    pub fn capture_with_layout(
        &mut self,
        page: &PageSnapshot,
        layout: &dyn Layout,
        config: &SelectorConfig,
        log: &DebugLog,
    ) -> CaptureReport {
        let resolution = resolve(page.document(), config, log);
        let mut report = CaptureReport {
            count: self.len(),
            added: 0,
            skipped: 0,
            failed: 0,
            config: resolution.config.clone(),
            learned: resolution.learned,
        };
        if resolution.is_empty() {
            logd!(log, "no message elements visible");
            return report;
        }

        let scan = match Scan::new(page, layout, &resolution.config, log) {
            Ok(scan) => scan,
            Err(e) => {
                loge!(log, "capture aborted: {e}");
                return report;
            }
        };

        for el in resolution.elements {
            match self.capture_element(&scan, el) {
                Ok(true) => report.added += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    logw!(log, "skipping element: {e}");
                }
            }
        }

        report.count = self.len();
        if report.added > 0 {
            logd!(log, "captured {} new message(s), {} total", report.added, report.count);
        }
        report
    }

    fn capture_element(&mut self, scan: &Scan<'_>, el: ElementRef<'_>) -> Result<bool> {
        let content = scan.normalizer.sanitize(el);
        let attachments = scan.attachments(el);
        if content.is_blank() && attachments.is_empty() {
            return Ok(false);
        }

        // Image-only messages are keyed by their attachment list.
        let fingerprint = if content.is_blank() {
            Fingerprint::of(&attachments.join("\n"))
        } else {
            Fingerprint::of(&content.text)
        };
        if self.contains(&fingerprint) {
            return Ok(false);
        }

        let author = classify(el, scan.config, scan.layout);
        let turn_index = scan.turn_index(el);
        let dom_position = scan.layout.vertical_offset(el)?;

        let msg = CapturedMessage {
            fingerprint,
            sanitized_html: content.html,
            normalized_text: content.text,
            author,
            attachments,
            turn_index,
            dom_position,
            captured_at_millis: self.clock.now_millis(),
        };
        Ok(self.insert(msg))
    }
}

/// Per-pass state: compiled selectors and the turn container list.
struct Scan<'a> {
    config: &'a SelectorConfig,
    layout: &'a dyn Layout,
    normalizer: Normalizer,
    attachment: Option<Selector>,
    turn_selector: Selector,
    turns: Vec<ElementRef<'a>>,
    base_url: Option<&'a str>,
}

impl<'a> Scan<'a> {
    fn new(
        page: &'a PageSnapshot,
        layout: &'a dyn Layout,
        config: &'a SelectorConfig,
        log: &DebugLog,
    ) -> Result<Self> {
        let normalizer = match Normalizer::new(&config.content_selector) {
            Ok(n) => n,
            Err(e) => {
                logw!(log, "content selector ignored: {e}");
                Normalizer::new("")?
            }
        };
        let attachment = match config.attachment_selector.trim() {
            "" => None,
            sel => match html::compile(sel) {
                Ok(s) => Some(s),
                Err(e) => {
                    logw!(log, "attachment selector ignored: {e}");
                    None
                }
            },
        };
        let turn_selector = html::compile(TURN_CONTAINER_SELECTOR)?;
        let turns = page.document().select(&turn_selector).collect();
        Ok(Self {
            config,
            layout,
            normalizer,
            attachment,
            turn_selector,
            turns,
            base_url: page.url(),
        })
    }

    /// Attachment URLs in encounter order, duplicates dropped.
    fn attachments(&self, el: ElementRef<'_>) -> Vec<String> {
        let Some(sel) = &self.attachment else { return Vec::new() };
        let mut out: Vec<String> = Vec::new();
        for img in el.select(sel) {
            let src = ["src", "data-src"]
                .iter()
                .filter_map(|a| img.value().attr(a))
                .map(str::trim)
                .find(|s| !s.is_empty());
            let Some(src) = src else { continue };
            let url = html::resolve_url(self.base_url, src);
            if !out.contains(&url) {
                out.push(url);
            }
        }
        out
    }

    fn turn_index(&self, el: ElementRef<'_>) -> Option<usize> {
        let container = html::closest(el, &self.turn_selector)?;
        self.turns.iter().position(|t| t.id() == container.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Author;
    use crate::specs::Platform;

    const PAGE: &str = r#"<html><body><main>
        <article data-testid="conversation-turn-1">
          <div data-message-author-role="user"><div class="whitespace-pre-wrap">Hello</div>
            <img alt="Uploaded image" src="/files/a.png"><img alt="Uploaded image" src="/files/a.png">
          </div>
        </article>
        <article data-testid="conversation-turn-2">
          <div data-message-author-role="assistant"><div class="markdown"><p>Hi <b>there</b></p></div>
            <button>Copy</button></div>
        </article>
        <article data-testid="conversation-turn-3"><div><button>Regenerate</button></div></article>
    </main></body></html>"#;

    fn store() -> CaptureStore {
        CaptureStore::with_clock(Box::new(StepClock::new(1_000, 1)))
    }

    #[test]
    fn captures_once_and_is_idempotent() {
        let page = PageSnapshot::parse(PAGE).with_url("https://chatgpt.com/c/abc");
        let cfg = Platform::ChatGpt.default_selectors();
        let log = DebugLog::new();
        let mut store = store();

        let first = store.capture_visible(&page, &cfg, &log);
        assert_eq!(first.count, 2);
        assert_eq!(first.added, 2);
        assert_eq!(first.skipped, 1);

        for _ in 0..3 {
            let again = store.capture_visible(&page, &first.config, &log);
            assert_eq!(again.count, 2);
            assert_eq!(again.added, 0);
        }

        let user = &store.messages()[0];
        assert_eq!(user.author, Author::User);
        assert_eq!(user.fingerprint, Fingerprint::of("Hello"));
        assert_eq!(user.turn_index, Some(0));
        assert_eq!(user.attachments, vec![s!("https://chatgpt.com/files/a.png")]);

        let bot = &store.messages()[1];
        assert_eq!(bot.author, Author::Assistant);
        assert_eq!(bot.normalized_text, "Hi there");
        assert!(!bot.sanitized_html.contains("Copy"));
        assert_eq!(bot.turn_index, Some(1));
        assert!(bot.captured_at_millis > user.captured_at_millis);
    }

    #[test]
    fn failing_element_does_not_abort_the_scan() {
        let page = PageSnapshot::parse(
            r#"<body>
              <article data-testid="conversation-turn-1" data-offset-top="nope"><div class="markdown">bad</div></article>
              <article data-testid="conversation-turn-2" data-offset-top="300"><div class="markdown">good</div></article>
            </body>"#,
        );
        let log = DebugLog::new();
        let mut store = store();
        let r = store.capture_visible(&page, &Platform::ChatGpt.default_selectors(), &log);
        assert_eq!(r.failed, 1);
        assert_eq!(r.count, 1);
        assert_eq!(store.messages()[0].normalized_text, "good");
        assert_eq!(store.messages()[0].dom_position, 300.0);
        assert!(log.render().contains("skipping element"));
    }

    #[test]
    fn image_only_message_is_kept() {
        let page = PageSnapshot::parse(
            r#"<body><article data-testid="conversation-turn-1"><div data-message-author-role="user">
                <img alt="Uploaded image" src="https://files.oaiusercontent.com/x.webp"></div></article></body>"#,
        );
        let mut store = store();
        let r = store.capture_visible(&page, &Platform::ChatGpt.default_selectors(), &DebugLog::new());
        assert_eq!(r.count, 1);
        assert!(!store.messages()[0].fingerprint.is_empty_marker());
    }

    #[test]
    fn reset_accepts_same_content_again() {
        let page = PageSnapshot::parse(PAGE);
        let cfg = Platform::ChatGpt.default_selectors();
        let log = DebugLog::new();
        let mut store = store();
        store.capture_visible(&page, &cfg, &log);
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.capture_visible(&page, &cfg, &log).count, 2);
    }
}
