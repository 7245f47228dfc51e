//! Append-only, priority-tagged signal log.
//!
//! Every component of the navigation core reports its decisions through a
//! [`SignalEmitter`]; the emitter stamps run and mission ids and the default
//! priority of the signal type before handing the record to a [`SignalSink`].

pub mod api;
pub mod emitter;
pub mod errors;
pub mod jsonl;
pub mod model;

pub use api::{MemorySignalSink, NullSignalSink, SignalSink, TeeSignalSink};
pub use emitter::SignalEmitter;
pub use errors::SinkError;
pub use jsonl::JsonlSignalSink;
pub use model::{Signal, SignalPriority, SignalType};
