use ai_core::{AgentEvent, EventBus, GoalId};

#[test]
fn each_subscriber_gets_its_own_copy() {
    let mut bus = EventBus::new();
    let a = bus.subscribe();
    let b = bus.subscribe();

    bus.publish(AgentEvent::PlanSucceeded { goal: GoalId(1) });
    bus.publish(AgentEvent::NeedNewGoal);

    assert_eq!(
        bus.drain(a),
        vec![AgentEvent::PlanSucceeded { goal: GoalId(1) }, AgentEvent::NeedNewGoal]
    );
    assert_eq!(bus.pending(b), 2);
    assert_eq!(bus.pop(b), Some(AgentEvent::PlanSucceeded { goal: GoalId(1) }));
}

#[test]
fn unsubscribed_queues_stop_receiving() {
    let mut bus = EventBus::new();
    let a = bus.subscribe();
    bus.publish(AgentEvent::CannotPlan { goal: GoalId(2) });
    assert!(bus.unsubscribe(a));
    assert!(!bus.unsubscribe(a));

    bus.publish(AgentEvent::NeedNewGoal);
    assert!(bus.drain(a).is_empty());
    assert_eq!(bus.subscriber_count(), 0);
}
