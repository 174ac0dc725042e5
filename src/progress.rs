// src/progress.rs
/// Lightweight progress reporting for capture sessions.
/// Front-ends implement this to surface the running message count.
pub trait Progress {
    /// Called when recording starts.
    fn begin(&mut self) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Running number of captured messages, emitted after every capture pass.
    fn captured(&mut self, _count: usize) {}

    /// Called once the export is complete, with the number of messages exported.
    fn finish(&mut self, _count: usize) {}
}

/// Records every emitted count and status line; handy for tests and batch runs.
#[derive(Debug, Default)]
pub struct CountRecorder {
    pub counts: Vec<usize>,
    pub lines: Vec<String>,
    pub finished: Option<usize>,
}

impl Progress for CountRecorder {
    fn log(&mut self, msg: &str) {
        self.lines.push(s!(msg));
    }

    fn captured(&mut self, count: usize) {
        self.counts.push(count);
    }

    fn finish(&mut self, count: usize) {
        self.finished = Some(count);
    }
}
