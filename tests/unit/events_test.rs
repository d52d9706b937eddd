//! Tests for admission event sinks

use prometheus_active_executions::core::{
    AdmissionAction, AdmissionEvent, ConcurrencyClass, EventSink, InMemoryEventSink,
    TracingEventSink,
};

fn event(id: &str, action: AdmissionAction) -> AdmissionEvent {
    AdmissionEvent::new(id, ConcurrencyClass::Other, action, 1, 0)
}

#[test]
fn test_in_memory_event_sink() {
    let sink = InMemoryEventSink::new(10);
    sink.record(event("e1", AdmissionAction::Admitted));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].execution_id, "e1");
    assert_eq!(events[0].class, ConcurrencyClass::Other);
    assert_eq!(events[0].action, AdmissionAction::Admitted);
    assert!(events[0].created_at_ms > 0);
}

#[test]
fn test_event_sink_overflow() {
    let sink = InMemoryEventSink::new(2);
    sink.record(event("e1", AdmissionAction::Admitted));
    sink.record(event("e2", AdmissionAction::Throttled));
    sink.record(event("e3", AdmissionAction::Released));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].execution_id, "e2"); // First one popped
    assert_eq!(events[1].execution_id, "e3");
}

#[test]
fn test_zero_capacity_sink_records_nothing() {
    let sink = InMemoryEventSink::new(0);
    sink.record(event("e1", AdmissionAction::Canceled));
    assert!(sink.events().is_empty());
}

#[test]
fn test_events_filtered_by_action() {
    let sink = InMemoryEventSink::new(10);
    sink.record(event("e1", AdmissionAction::Throttled));
    sink.record(event("e2", AdmissionAction::Admitted));
    sink.record(event("e1", AdmissionAction::Canceled));

    let throttled = sink.events_with(AdmissionAction::Throttled);
    assert_eq!(throttled.len(), 1);
    assert_eq!(throttled[0].execution_id, "e1");
}

#[test]
fn test_tracing_sink_accepts_events() {
    prometheus_active_executions::util::init_tracing();
    TracingEventSink.record(event("e1", AdmissionAction::Released));
}
