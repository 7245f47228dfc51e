use std::sync::Arc;

use pagewalk_core_types::{MissionId, RunId};
use serde_json::Value;
use tracing::warn;

use crate::api::{NullSignalSink, SignalSink};
use crate::model::{Signal, SignalPriority, SignalType};

/// Sink handle bound to one run: carries the layer, source and ids so call
/// sites only supply the type and payload.
#[derive(Clone)]
pub struct SignalEmitter {
    sink: Arc<dyn SignalSink>,
    layer: String,
    source: String,
    run_id: RunId,
    mission_id: Option<MissionId>,
}

impl SignalEmitter {
    pub fn new(
        sink: Arc<dyn SignalSink>,
        layer: impl Into<String>,
        source: impl Into<String>,
        run_id: RunId,
    ) -> Self {
        Self {
            sink,
            layer: layer.into(),
            source: source.into(),
            run_id,
            mission_id: None,
        }
    }

    /// Emitter that drops every signal.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullSignalSink), "none", "none", RunId::new())
    }

    pub fn with_mission(mut self, mission_id: Option<MissionId>) -> Self {
        self.mission_id = mission_id;
        self
    }

    /// Same sink and ids, different emitting component.
    pub fn for_source(&self, layer: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            sink: self.sink.clone(),
            layer: layer.into(),
            source: source.into(),
            run_id: self.run_id.clone(),
            mission_id: self.mission_id.clone(),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn mission_id(&self) -> Option<&MissionId> {
        self.mission_id.as_ref()
    }

    pub fn emit(&self, signal_type: SignalType, payload: Value) {
        let priority = signal_type.default_priority();
        self.emit_with_priority(signal_type, payload, priority);
    }

    /// Append failures are logged and swallowed; the audit trail never aborts a run.
    pub fn emit_with_priority(
        &self,
        signal_type: SignalType,
        payload: Value,
        priority: SignalPriority,
    ) {
        let signal = Signal::new(signal_type, self.layer.as_str(), self.source.as_str(), payload)
            .with_priority(priority)
            .with_mission(self.mission_id.clone())
            .with_run(self.run_id.clone());
        let kind = signal.signal_type.clone();
        if let Err(err) = self.sink.append(signal) {
            warn!(signal_type = %kind, source = %self.source, ?err, "failed to append signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemorySignalSink;
    use serde_json::json;

    #[test]
    fn emitter_stamps_ids_and_default_priority() {
        let sink = MemorySignalSink::new();
        let run_id = RunId::new();
        let emitter = SignalEmitter::new(sink.clone(), "mission", "mission_gate", run_id.clone())
            .with_mission(Some(MissionId::new("m-1")));

        emitter.emit(SignalType::MissionFailed, json!({"reason": "no_progress"}));
        emitter.emit_with_priority(
            SignalType::MissionStatusUpdate,
            json!({}),
            SignalPriority::Economic,
        );

        let records = sink.snapshot();
        assert_eq!(records[0].priority, SignalPriority::Critical);
        assert_eq!(records[0].mission_id, Some(MissionId::new("m-1")));
        assert_eq!(records[0].run_id, Some(run_id));
        assert_eq!(records[1].priority, SignalPriority::Economic);
    }

    #[test]
    fn for_source_keeps_ids() {
        let sink = MemorySignalSink::new();
        let base = SignalEmitter::new(sink.clone(), "navigation", "runner", RunId::new())
            .with_mission(Some(MissionId::new("m-2")));
        let child = base.for_source("navigation", "selector_resolver");
        child.emit(SignalType::SelectorOutcome, json!({}));

        let record = &sink.snapshot()[0];
        assert_eq!(record.source, "selector_resolver");
        assert_eq!(record.mission_id, Some(MissionId::new("m-2")));
    }
}
