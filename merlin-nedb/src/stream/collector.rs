use crate::common::Document;
use crate::errors::AdapterError;
use crate::stream::{CountSink, RecordSink};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct CollectorState<T> {
    values: Vec<T>,
    ended: bool,
    error: Option<AdapterError>,
}

impl<T: Clone> CollectorState<T> {
    fn write(&mut self, value: T) {
        if self.ended || self.error.is_some() {
            log::warn!("Write after the sink was closed is ignored");
            return;
        }
        self.values.push(value);
    }

    fn end(&mut self) {
        if self.error.is_none() {
            self.ended = true;
        }
    }

    fn error(&mut self, error: AdapterError) {
        if self.ended || self.error.is_some() {
            log::warn!("Error after the sink was closed is ignored: {}", error);
            return;
        }
        self.error = Some(error);
    }
}

/// A [RecordSink] keeping everything it receives.
///
/// Clones share state, so a clone can be handed to an operation while the
/// original is used to inspect the outcome.
#[derive(Clone, Default)]
pub struct RecordCollector {
    state: Arc<Mutex<CollectorState<Document>>>,
}

impl RecordCollector {
    pub fn new() -> Self {
        RecordCollector::default()
    }

    pub fn records(&self) -> Vec<Document> {
        self.state.lock().values.clone()
    }

    pub fn is_ended(&self) -> bool {
        self.state.lock().ended
    }

    /// The error the sink failed with, if any.
    pub fn failure(&self) -> Option<AdapterError> {
        self.state.lock().error.clone()
    }

    /// `true` once the sink ended or failed.
    pub fn is_closed(&self) -> bool {
        let state = self.state.lock();
        state.ended || state.error.is_some()
    }
}

impl RecordSink for RecordCollector {
    fn write(&mut self, record: Document) {
        self.state.lock().write(record)
    }

    fn end(&mut self) {
        self.state.lock().end()
    }

    fn error(&mut self, error: AdapterError) {
        self.state.lock().error(error)
    }
}

/// A [CountSink] keeping everything it receives. See [RecordCollector].
#[derive(Clone, Default)]
pub struct CountCollector {
    state: Arc<Mutex<CollectorState<u64>>>,
}

impl CountCollector {
    pub fn new() -> Self {
        CountCollector::default()
    }

    /// Every value written, in order. A well-behaved operation writes one.
    pub fn values(&self) -> Vec<u64> {
        self.state.lock().values.clone()
    }

    /// The first value written.
    pub fn count(&self) -> Option<u64> {
        self.state.lock().values.first().copied()
    }

    pub fn is_ended(&self) -> bool {
        self.state.lock().ended
    }

    /// The error the sink failed with, if any.
    pub fn failure(&self) -> Option<AdapterError> {
        self.state.lock().error.clone()
    }

    pub fn is_closed(&self) -> bool {
        let state = self.state.lock();
        state.ended || state.error.is_some()
    }
}

impl CountSink for CountCollector {
    fn write(&mut self, count: u64) {
        self.state.lock().write(count)
    }

    fn end(&mut self) {
        self.state.lock().end()
    }

    fn error(&mut self, error: AdapterError) {
        self.state.lock().error(error)
    }
}
