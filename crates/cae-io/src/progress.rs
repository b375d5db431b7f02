//! Optional progress reporting for long imports.
//!
//! Importers call the sink at fixed checkpoints only; parse results never
//! depend on whether a sink is attached.

/// Receives `(current, total, unit, caption)` updates.
pub trait ProgressSink {
    fn report(&mut self, current: u64, total: u64, unit: &str, caption: &str);
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _current: u64, _total: u64, _unit: &str, _caption: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub current: u64,
    pub total: u64,
    pub unit: String,
    pub caption: String,
}

/// Sink that keeps every update, for hosts that replay them and for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    pub fn captions(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.caption.as_str()).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, current: u64, total: u64, unit: &str, caption: &str) {
        self.events.push(ProgressEvent {
            current,
            total,
            unit: unit.to_string(),
            caption: caption.to_string(),
        });
    }
}

/// Thin wrapper so call sites need not match on the `Option` every time.
pub(crate) struct Progress<'a> {
    sink: Option<&'a mut dyn ProgressSink>,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(sink: Option<&'a mut dyn ProgressSink>) -> Self {
        Self { sink }
    }

    pub(crate) fn report(&mut self, current: u64, total: u64, unit: &str, caption: &str) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.report(current, total, unit, caption);
        }
    }
}
