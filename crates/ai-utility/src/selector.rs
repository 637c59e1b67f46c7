use std::collections::{BTreeMap, BTreeSet};

use ai_core::{AgentEvent, GoalId, State, Tag};
use thiserror::Error;

use crate::Goal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorConfig {
    /// A challenger must beat the current goal's utility by more than this to take over.
    pub hysteresis: f32,
    /// Goals scoring below this are never selected (the fallback still is).
    pub min_score: f32,
    /// Default seconds a goal is suppressed after planning found no path.
    pub plan_failure_cooldown: f32,
    /// Default seconds a goal is suppressed after its plan failed during execution.
    pub execution_failure_cooldown: f32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            hysteresis: 0.1,
            min_score: 0.0,
            plan_failure_cooldown: 5.0,
            execution_failure_cooldown: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("no goals registered")]
    Empty,
    #[error("fallback {0} is not a registered goal")]
    UnknownFallback(GoalId),
    #[error("goal id {0} registered twice")]
    DuplicateGoal(GoalId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub goal: GoalId,
    pub goal_state: State,
    pub score: f32,
    /// The selection differs from the previous one.
    pub changed: bool,
    pub fallback: bool,
}

/// Picks one goal among a fixed registry, driven by plan-outcome events.
///
/// Two cooldown maps (plan failure, execution failure) suppress goals for a while after they
/// failed; success clears both. When nothing is eligible the fallback goal is selected, so the
/// agent always has something to do.
pub struct UtilityGoalSelector<C: ?Sized> {
    goals: Vec<Box<dyn Goal<C>>>,
    fallback: usize,
    config: SelectorConfig,
    current: Option<usize>,
    plan_cooldowns: BTreeMap<GoalId, f64>,
    execution_cooldowns: BTreeMap<GoalId, f64>,
    last_scores: Vec<(GoalId, f32)>,
}

impl<C: ?Sized> UtilityGoalSelector<C> {
    pub fn new(goals: Vec<Box<dyn Goal<C>>>, fallback: GoalId) -> Result<Self, SelectorError> {
        if goals.is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut seen = BTreeSet::new();
        for goal in &goals {
            if !seen.insert(goal.id()) {
                return Err(SelectorError::DuplicateGoal(goal.id()));
            }
        }
        let fallback = goals
            .iter()
            .position(|g| g.id() == fallback)
            .ok_or(SelectorError::UnknownFallback(fallback))?;

        Ok(Self {
            goals,
            fallback,
            config: SelectorConfig::default(),
            current: None,
            plan_cooldowns: BTreeMap::new(),
            execution_cooldowns: BTreeMap::new(),
            last_scores: Vec::new(),
        })
    }

    pub fn with_config(mut self, config: SelectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn current(&self) -> Option<GoalId> {
        self.current.map(|i| self.goals[i].id())
    }

    pub fn current_goal(&self) -> Option<&dyn Goal<C>> {
        self.current.map(|i| self.goals[i].as_ref())
    }

    pub fn fallback(&self) -> GoalId {
        self.goals[self.fallback].id()
    }

    pub fn goal(&self, id: GoalId) -> Option<&dyn Goal<C>> {
        self.index_of(id).map(|i| self.goals[i].as_ref())
    }

    /// Interest tags of the current goal (empty when none is selected).
    pub fn interest_tags(&self) -> &[Tag] {
        self.current_goal().map_or(&[][..], |g| g.interest_tags())
    }

    /// Utilities computed by the last evaluation, in registration order.
    pub fn last_scores(&self) -> &[(GoalId, f32)] {
        &self.last_scores
    }

    pub fn is_on_cooldown(&self, goal: GoalId, now: f64) -> bool {
        let active = |map: &BTreeMap<GoalId, f64>| map.get(&goal).is_some_and(|&until| until > now);
        active(&self.plan_cooldowns) || active(&self.execution_cooldowns)
    }

    /// Record a coordinator event. Returns `true` when the event calls for re-evaluation, which
    /// every selector-relevant event does.
    pub fn handle_event(&mut self, event: &AgentEvent, now: f64) -> bool {
        match event {
            AgentEvent::CannotPlan { goal } => {
                let seconds = self
                    .goal(*goal)
                    .and_then(|g| g.plan_failure_cooldown())
                    .unwrap_or(self.config.plan_failure_cooldown);
                self.plan_cooldowns.insert(*goal, now + seconds.max(0.0) as f64);
                tracing::debug!(goal = %goal, seconds, "plan-failure cooldown");
            }
            AgentEvent::PlanExecutionFailed { goal, reason } => {
                let seconds = self
                    .goal(*goal)
                    .and_then(|g| g.execution_failure_cooldown())
                    .unwrap_or(self.config.execution_failure_cooldown);
                self.execution_cooldowns
                    .insert(*goal, now + seconds.max(0.0) as f64);
                tracing::debug!(goal = %goal, seconds, reason = %reason, "execution-failure cooldown");
            }
            AgentEvent::PlanSucceeded { goal } | AgentEvent::GoalSatisfied { goal } => {
                self.plan_cooldowns.remove(goal);
                self.execution_cooldowns.remove(goal);
            }
            AgentEvent::NeedNewGoal => {}
        }
        true
    }

    /// Re-score every goal and return the selection.
    pub fn evaluate(&mut self, ctx: &C, now: f64) -> Selection {
        self.plan_cooldowns.retain(|_, until| *until > now);
        self.execution_cooldowns.retain(|_, until| *until > now);

        self.last_scores.clear();
        let mut best: Option<(usize, f32)> = None;
        let mut current_score: Option<f32> = None;

        for (i, goal) in self.goals.iter().enumerate() {
            let score = sanitize(goal.utility(ctx));
            self.last_scores.push((goal.id(), score));

            let eligible = !self.plan_cooldowns.contains_key(&goal.id())
                && !self.execution_cooldowns.contains_key(&goal.id())
                && score >= self.config.min_score
                && !goal.is_satisfied(ctx);
            if !eligible {
                continue;
            }
            if Some(i) == self.current {
                current_score = Some(score);
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        let (index, score, fallback) = match (best, self.current.zip(current_score)) {
            (Some((b, b_score)), Some((cur, cur_score))) => {
                if b != cur && b_score > cur_score + self.config.hysteresis {
                    (b, b_score, false)
                } else {
                    (cur, cur_score, false)
                }
            }
            (Some((b, b_score)), None) => (b, b_score, false),
            (None, _) => {
                let score = self
                    .last_scores
                    .get(self.fallback)
                    .map_or(f32::NEG_INFINITY, |&(_, s)| s);
                (self.fallback, score, true)
            }
        };

        let changed = self.current != Some(index);
        if changed {
            tracing::debug!(
                from = ?self.current(),
                to = %self.goals[index].id(),
                goal = self.goals[index].name(),
                score,
                fallback,
                "goal selected"
            );
        }
        self.current = Some(index);

        let goal = &self.goals[index];
        Selection {
            goal: goal.id(),
            goal_state: goal.goal_state(ctx),
            score,
            changed,
            fallback,
        }
    }

    /// Forget the current selection (the next evaluation picks freely).
    pub fn reset(&mut self) {
        self.current = None;
    }

    fn index_of(&self, id: GoalId) -> Option<usize> {
        self.goals.iter().position(|g| g.id() == id)
    }
}

fn sanitize(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}
