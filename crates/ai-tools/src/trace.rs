#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A small, allocation-friendly trace event.
///
/// This is intentionally "dumb data" so it can be recorded during simulation and later rendered
/// by tooling. `a` and `b` are tag-specific payloads (token, plan length, failure count...).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub agent: u64,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            agent: 0,
            tag: tag.into(),
            a: 0,
            b: 0,
        }
    }

    pub fn with_agent(mut self, agent: u64) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }
}

pub trait TraceSink: Send {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, tag: &str) -> usize {
        self.events.iter().filter(|e| e.tag == tag).count()
    }

    pub fn last(&self, tag: &str) -> Option<&TraceEvent> {
        self.events.iter().rev().find(|e| e.tag == tag)
    }
}

/// Per-owner trace fan-out: an optional in-memory log plus an optional sink.
///
/// Every event is also mirrored into `tracing` at `trace` level, so trace tags show up in
/// ordinary subscriber output even when neither destination is configured.
#[derive(Default)]
pub struct Tracer {
    log: Option<TraceLog>,
    sink: Option<Box<dyn TraceSink>>,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("log", &self.log.as_ref().map(TraceLog::len))
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start collecting events in memory.
    pub fn with_log(mut self) -> Self {
        self.log = Some(TraceLog::default());
        self
    }

    pub fn with_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn log(&self) -> Option<&TraceLog> {
        self.log.as_ref()
    }

    pub fn take_log(&mut self) -> Option<TraceLog> {
        self.log.as_mut().map(std::mem::take)
    }

    pub fn emit(&mut self, event: TraceEvent) {
        tracing::trace!(
            tick = event.tick,
            agent = event.agent,
            tag = %event.tag,
            a = event.a,
            b = event.b,
            "trace"
        );
        if let Some(log) = self.log.as_mut() {
            log.push(event.clone());
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(event);
        }
    }
}
