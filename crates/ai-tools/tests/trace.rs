use std::sync::{Arc, Mutex};

use ai_tools::{TraceEvent, TraceSink, Tracer};

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<TraceEvent>>>);

impl TraceSink for SharedSink {
    fn emit(&mut self, event: TraceEvent) {
        self.0.lock().unwrap().push(event);
    }
}

#[test]
fn emit_writes_to_log_when_enabled() {
    let mut tracer = Tracer::new().with_log();

    tracer.emit(TraceEvent::new(1, "test").with_agent(3).with_a(10).with_b(20));

    let log = tracer.log().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log.events[0].tick, 1);
    assert_eq!(log.events[0].agent, 3);
    assert_eq!(log.events[0].tag, "test");
    assert_eq!(log.events[0].a, 10);
    assert_eq!(log.events[0].b, 20);
}

#[test]
fn emit_without_destinations_is_a_no_op() {
    let mut tracer = Tracer::new();
    tracer.emit(TraceEvent::new(1, "ignored"));
    assert!(tracer.log().is_none());
}

#[test]
fn emit_writes_to_both_log_and_sink() {
    let sink = SharedSink::default();
    let shared = sink.0.clone();
    let mut tracer = Tracer::new().with_log().with_sink(sink);

    tracer.emit(TraceEvent::new(3, "both"));
    tracer.emit(TraceEvent::new(4, "both"));
    tracer.emit(TraceEvent::new(4, "other"));

    let log = tracer.log().unwrap();
    assert_eq!(log.count("both"), 2);
    assert_eq!(log.last("both").map(|e| e.tick), Some(4));
    assert_eq!(shared.lock().unwrap().len(), 3);
}

#[test]
fn take_log_drains_but_keeps_collecting() {
    let mut tracer = Tracer::new().with_log();
    tracer.emit(TraceEvent::new(1, "a"));
    let taken = tracer.take_log().unwrap();
    assert_eq!(taken.len(), 1);
    assert!(tracer.log().unwrap().is_empty());
    tracer.emit(TraceEvent::new(2, "b"));
    assert_eq!(tracer.log().unwrap().len(), 1);
}
