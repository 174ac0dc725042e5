// src/runner.rs
//! Frame-driven capture loop.
//!
//! The page is scrolled by something outside the crate (a browser driver, a
//! snapshot dumper). Each position it reaches arrives here as a frame; the
//! loop feeds frames to the session until the source runs dry, the session is
//! cancelled, or the page stops producing new messages.
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::consts::IDLE_FRAME_LIMIT;
use crate::error::Result;
use crate::page::PageSnapshot;
use crate::session::Session;

/// Shared stop flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Re-arm for a new recording.
    pub fn rearm(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Successive snapshots of one page, top to bottom.
pub trait FrameSource {
    /// `Ok(None)` once exhausted.
    fn next_frame(&mut self) -> Result<Option<PageSnapshot>>;
}

/// Frames read from snapshot files, in the given order.
pub struct FileFrames {
    paths: VecDeque<PathBuf>,
    url: Option<String>,
}

impl FileFrames {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self { paths: paths.into_iter().collect(), url: None }
    }

    /// Page URL applied to every frame, overriding what the markup says.
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }
}

impl FrameSource for FileFrames {
    fn next_frame(&mut self) -> Result<Option<PageSnapshot>> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };
        let source = fs::read_to_string(&path)?;
        let snap = PageSnapshot::parse(&source);
        Ok(Some(match &self.url {
            Some(url) => snap.with_url(url.clone()),
            None => snap,
        }))
    }
}

/// In-memory frames.
#[derive(Default)]
pub struct SnapshotFrames(VecDeque<PageSnapshot>);

impl SnapshotFrames {
    pub fn new(frames: impl IntoIterator<Item = PageSnapshot>) -> Self {
        Self(frames.into_iter().collect())
    }
}

impl FrameSource for SnapshotFrames {
    fn next_frame(&mut self) -> Result<Option<PageSnapshot>> {
        Ok(self.0.pop_front())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The source had no more frames.
    Exhausted,
    /// The session was stopped or reset while scrolling.
    Cancelled,
    /// `IDLE_FRAME_LIMIT` frames in a row added nothing.
    PageEnd,
}

impl StopReason {
    /// The loop ran to completion without anyone stopping it.
    pub fn is_natural(self) -> bool {
        !matches!(self, StopReason::Cancelled)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames: usize,
    pub count: usize,
    pub reason: StopReason,
}

/// Feed frames to a started session until one of the stop conditions hits.
pub fn run_scroll_loop(session: &mut Session<'_>, source: &mut dyn FrameSource) -> Result<LoopSummary> {
    let cancel = session.cancel_token();
    let mut frames = 0;
    let mut idle = 0;
    let mut count = session.message_count();

    let reason = loop {
        if cancel.is_cancelled() || !session.is_recording() {
            break StopReason::Cancelled;
        }
        let Some(frame) = source.next_frame()? else {
            break StopReason::Exhausted;
        };
        frames += 1;

        let now = session.capture_once(&frame);
        if now > count {
            idle = 0;
            count = now;
        } else {
            idle += 1;
            if idle >= IDLE_FRAME_LIMIT {
                break StopReason::PageEnd;
            }
        }
    };

    logd!(session.log(), "scroll loop ended after {frames} frame(s): {reason:?}");
    Ok(LoopSummary { frames, count, reason })
}
