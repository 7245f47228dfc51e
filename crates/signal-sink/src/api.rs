use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::SinkError;
use crate::model::{Signal, SignalType};

/// Append-only destination for signals.
///
/// Each call is a single atomic append; sinks are shared by concurrently
/// running missions, so implementations must never interleave two records.
pub trait SignalSink: Send + Sync {
    fn append(&self, signal: Signal) -> Result<(), SinkError>;

    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Ordered in-memory log.
#[derive(Default)]
pub struct MemorySignalSink {
    records: Mutex<Vec<Signal>>,
}

impl MemorySignalSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> Vec<Signal> {
        self.records.lock().clone()
    }

    pub fn of_type(&self, signal_type: &SignalType) -> Vec<Signal> {
        self.records
            .lock()
            .iter()
            .filter(|signal| &signal.signal_type == signal_type)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl SignalSink for MemorySignalSink {
    fn append(&self, signal: Signal) -> Result<(), SinkError> {
        self.records.lock().push(signal);
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSignalSink;

impl SignalSink for NullSignalSink {
    fn append(&self, _signal: Signal) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Fans each append out to several sinks. Every sink is attempted; the first
/// error is returned.
pub struct TeeSignalSink {
    sinks: Vec<Arc<dyn SignalSink>>,
}

impl TeeSignalSink {
    pub fn new(sinks: Vec<Arc<dyn SignalSink>>) -> Self {
        Self { sinks }
    }
}

impl SignalSink for TeeSignalSink {
    fn append(&self, signal: Signal) -> Result<(), SinkError> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(err) = sink.append(signal.clone()) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(err) = sink.flush() {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
