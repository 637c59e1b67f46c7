//! Diagnostic primitives for the agent kernel.
//!
//! Trace events are small plain records that can be collected in memory, streamed into a sink
//! and mirrored into `tracing` at `trace` level.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, TraceEvent, TraceLog, TraceSink, Tracer, VecTraceSink};
