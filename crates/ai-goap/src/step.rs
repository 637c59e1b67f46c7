use std::sync::Arc;

use ai_core::{FactId, FactValue, State};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed set of effect operations interpreted by the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Effect {
    /// Overwrite the fact with a constant.
    Set(FactValue),
    /// Add to a counter. Unknown counts as `Int(0)`; floats add; bools are left unchanged.
    Increment(i32),
    /// Subtract from a counter, never going below zero. Same typing rules as `Increment`.
    DecrementClampedAtZero(i32),
}

impl Effect {
    /// Value the fact takes after this effect, given its current value.
    pub fn apply(self, current: Option<FactValue>) -> Option<FactValue> {
        match self {
            Effect::Set(value) => Some(value),
            Effect::Increment(by) => match current {
                None => Some(FactValue::Int(by)),
                Some(FactValue::Int(v)) => Some(FactValue::Int(v.saturating_add(by))),
                Some(FactValue::Float(v)) => Some(FactValue::Float(v + by as f32)),
                Some(b @ FactValue::Bool(_)) => Some(b),
            },
            Effect::DecrementClampedAtZero(by) => match current {
                None => Some(FactValue::Int(0)),
                Some(FactValue::Int(v)) => Some(FactValue::Int(v.saturating_sub(by).max(0))),
                Some(FactValue::Float(v)) => Some(FactValue::Float((v - by as f32).max(0.0))),
                Some(b @ FactValue::Bool(_)) => Some(b),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepEffect {
    pub fact: FactId,
    pub op: Effect,
}

impl StepEffect {
    pub fn set(fact: FactId, value: impl Into<FactValue>) -> Self {
        Self {
            fact,
            op: Effect::Set(value.into()),
        }
    }

    pub fn increment(fact: FactId, by: i32) -> Self {
        Self {
            fact,
            op: Effect::Increment(by),
        }
    }

    pub fn decrement(fact: FactId, by: i32) -> Self {
        Self {
            fact,
            op: Effect::DecrementClampedAtZero(by),
        }
    }
}

/// Cost model of a step, evaluated against the planner's hypothetical state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StepCost {
    Fixed(f32),
    /// `base + per_unit * distance` when the distance fact is known, otherwise `fallback`.
    Distance {
        fact: FactId,
        base: f32,
        per_unit: f32,
        fallback: f32,
    },
}

impl StepCost {
    pub fn evaluate(&self, state: &State) -> f32 {
        let cost = match *self {
            StepCost::Fixed(cost) => cost,
            StepCost::Distance {
                fact,
                base,
                per_unit,
                fallback,
            } => match state.get_float(fact) {
                Some(distance) if distance.is_finite() => base + per_unit * distance.max(0.0),
                _ => fallback,
            },
        };
        if cost.is_finite() {
            cost.max(0.0)
        } else {
            0.0
        }
    }
}

/// Planning-time template of an action.
#[derive(Debug, Clone)]
pub struct Step<S> {
    pub name: Arc<str>,
    pub preconditions: State,
    pub effects: Vec<StepEffect>,
    pub cost: StepCost,
    pub spec: S,
}

impl<S> Step<S> {
    pub fn new(name: impl Into<Arc<str>>, spec: S) -> Self {
        Self {
            name: name.into(),
            preconditions: State::new(),
            effects: Vec::new(),
            cost: StepCost::Fixed(1.0),
            spec,
        }
    }

    pub fn requires(mut self, fact: FactId, value: impl Into<FactValue>) -> Self {
        self.preconditions.set(fact, value);
        self
    }

    pub fn effect(mut self, effect: StepEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn sets(self, fact: FactId, value: impl Into<FactValue>) -> Self {
        self.effect(StepEffect::set(fact, value))
    }

    pub fn with_cost(mut self, cost: StepCost) -> Self {
        self.cost = cost;
        self
    }

    pub fn is_applicable(&self, state: &State) -> bool {
        state.satisfies(&self.preconditions)
    }

    /// Successor state. Effects are applied in order, each seeing the previous ones.
    pub fn apply(&self, state: &State) -> State {
        let mut next = state.clone();
        for effect in &self.effects {
            match effect.op.apply(next.try_get(effect.fact)) {
                Some(value) => next.set(effect.fact, value),
                None => {
                    next.remove(effect.fact);
                }
            }
        }
        next
    }

    pub fn cost(&self, state: &State) -> f32 {
        self.cost.evaluate(state)
    }
}
