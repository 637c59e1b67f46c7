#![cfg(feature = "serde")]

use ai_tools::{TraceEvent, TraceLog, Tracer};

#[test]
fn collected_log_exports_as_json() {
    let mut tracer = Tracer::new().with_log();
    tracer.emit(TraceEvent::new(1, "goap.plan.submit").with_agent(4).with_a(10));
    tracer.emit(TraceEvent::new(2, "goap.plan.installed").with_agent(4).with_a(10).with_b(6));
    tracer.emit(TraceEvent::new(9, "goap.exec.failed").with_agent(4).with_a(2).with_b(1));

    let log = tracer.take_log().expect("log enabled");
    let json = serde_json::to_value(&log).expect("serialize");
    assert_eq!(json["events"][2]["tag"], "goap.exec.failed");
    assert_eq!(json["events"][1]["b"], 6);

    let restored: TraceLog = serde_json::from_value(json).expect("deserialize");
    assert_eq!(restored.count("goap.plan.installed"), 1);
    assert_eq!(restored.last("goap.exec.failed").map(|e| e.tick), Some(9));
    assert!(tracer.log().is_some_and(TraceLog::is_empty));
}
