//! Typed message passing between the planning coordinator and the goal selector.
//!
//! Subscribers get their own queue; publishing clones the message into every live queue.
//! Unsubscribing drops the queue and any messages still in it.

use std::collections::{BTreeMap, VecDeque};

use crate::GoalId;

/// Notifications produced by plan execution, consumed by goal selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// Planning finished without a plan for `goal` (no path, or the planner faulted).
    CannotPlan { goal: GoalId },
    /// The running plan for `goal` failed.
    PlanExecutionFailed { goal: GoalId, reason: String },
    /// Every step of the plan for `goal` completed.
    PlanSucceeded { goal: GoalId },
    /// The goal state holds in the agent's current state.
    GoalSatisfied { goal: GoalId },
    /// The coordinator has no goal to work on.
    NeedNewGoal,
}

impl AgentEvent {
    pub fn goal(&self) -> Option<GoalId> {
        match self {
            AgentEvent::CannotPlan { goal }
            | AgentEvent::PlanExecutionFailed { goal, .. }
            | AgentEvent::PlanSucceeded { goal }
            | AgentEvent::GoalSatisfied { goal } => Some(*goal),
            AgentEvent::NeedNewGoal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug)]
pub struct EventBus<E> {
    queues: BTreeMap<SubscriptionId, VecDeque<E>>,
    next_id: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            queues: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.queues.insert(id, VecDeque::new());
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.queues.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.queues.len()
    }

    pub fn publish(&mut self, event: E) {
        for queue in self.queues.values_mut() {
            queue.push_back(event.clone());
        }
    }

    pub fn pending(&self, id: SubscriptionId) -> usize {
        self.queues.get(&id).map_or(0, VecDeque::len)
    }

    pub fn pop(&mut self, id: SubscriptionId) -> Option<E> {
        self.queues.get_mut(&id)?.pop_front()
    }

    pub fn drain(&mut self, id: SubscriptionId) -> Vec<E> {
        self.queues
            .get_mut(&id)
            .map(|q| q.drain(..).collect())
            .unwrap_or_default()
    }
}
