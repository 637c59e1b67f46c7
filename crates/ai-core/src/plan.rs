use crate::{ActionSlot, ActionStatus, Claim, EntityId, GoalId, TickContext, WorldMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Serializable planner output: an ordered sequence of step specs and their total cost.
///
/// Specs are plain data so they can cross threads; the runtime turns each one into a fresh
/// `Action` through an [`ActionFactory`] when the plan is installed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanSpec<S> {
    pub steps: Vec<S>,
    pub cost: f32,
}

impl<S> PlanSpec<S> {
    pub fn new(steps: Vec<S>, cost: f32) -> Self {
        Self { steps, cost }
    }

    pub fn empty() -> Self {
        Self {
            steps: Vec::new(),
            cost: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Build runtime `Action`s from immutable step specs.
pub trait ActionFactory<W>: 'static
where
    W: WorldMut + 'static,
{
    type Spec: Clone + Send + Sync + 'static;

    fn build(
        &self,
        spec: &Self::Spec,
        ctx: &TickContext,
        agent: EntityId,
        world: &W,
    ) -> Box<dyn crate::Action<W>>;
}

/// Execution status of a whole plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Running,
    Succeeded,
    Failed,
}

impl PlanStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PlanStatus::Running)
    }
}

/// A found plan bound to fresh action instances.
///
/// Steps run strictly in order, one per tick. The cursor only moves forward, and once the plan
/// reports `Succeeded` or `Failed` every later tick returns the same status. A claim handed off
/// by a completed step is held by the plan until the next step starts, and released when the
/// plan ends first.
pub struct Plan<W>
where
    W: WorldMut + 'static,
{
    goal: GoalId,
    steps: Vec<ActionSlot<W>>,
    cursor: usize,
    status: PlanStatus,
    cost: f32,
    failure: Option<String>,
    handoff: Option<Claim>,
}

impl<W> Plan<W>
where
    W: WorldMut + 'static,
{
    pub fn new(goal: GoalId, actions: Vec<Box<dyn crate::Action<W>>>, cost: f32) -> Self {
        Self {
            goal,
            steps: actions.into_iter().map(ActionSlot::new).collect(),
            cursor: 0,
            status: PlanStatus::Running,
            cost,
            failure: None,
            handoff: None,
        }
    }

    /// Instantiate every step of `spec` through `factory`.
    pub fn from_spec<F>(
        goal: GoalId,
        spec: &PlanSpec<F::Spec>,
        factory: &F,
        ctx: &TickContext,
        agent: EntityId,
        world: &W,
    ) -> Self
    where
        F: ActionFactory<W>,
    {
        let actions = spec
            .steps
            .iter()
            .map(|step| factory.build(step, ctx, agent, world))
            .collect();
        Self::new(goal, actions, spec.cost)
    }

    pub fn goal(&self) -> GoalId {
        self.goal
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn succeeded(&self) -> bool {
        self.status == PlanStatus::Succeeded
    }

    pub fn failed(&self) -> bool {
        self.status == PlanStatus::Failed
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn current_step_name(&self) -> Option<&'static str> {
        self.steps.get(self.cursor).map(ActionSlot::name)
    }

    pub fn step_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(ActionSlot::name)
    }

    /// Drive exactly the current action.
    pub fn tick(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> PlanStatus {
        if self.status.is_terminal() {
            return self.status;
        }

        let Some(slot) = self.steps.get_mut(self.cursor) else {
            self.status = PlanStatus::Succeeded;
            return self.status;
        };

        if let Some(claim) = self.handoff.take() {
            slot.offer(claim);
        }
        if let Err(err) = slot.start(ctx, agent, world) {
            self.failure = Some(format!("{}: {err}", slot.name()));
            self.status = PlanStatus::Failed;
            return self.status;
        }

        let world_view: &W = &*world;
        if !slot.check_valid(ctx, agent, world_view) {
            let reason = format!("{}: no longer valid", slot.name());
            slot.fail(ctx, agent, world, reason.clone());
            self.failure = Some(reason);
            self.status = PlanStatus::Failed;
            return self.status;
        }

        match slot.update(ctx, agent, world) {
            ActionStatus::Running => {}
            ActionStatus::Succeeded => {
                self.handoff = slot.complete(ctx, agent, world);
                self.cursor += 1;
                if self.cursor >= self.steps.len() {
                    self.handoff = None;
                    self.status = PlanStatus::Succeeded;
                }
            }
            ActionStatus::Failed => {
                let reason = format!("{}: failed", slot.name());
                slot.fail(ctx, agent, world, reason.clone());
                self.failure = Some(reason);
                self.status = PlanStatus::Failed;
            }
        }

        self.status
    }

    /// Stop the plan, running the current action's exit with `Cancelled`.
    pub fn cancel(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) {
        self.handoff = None;
        if let Some(slot) = self.steps.get_mut(self.cursor) {
            slot.cancel(ctx, agent, world);
        }
        if !self.status.is_terminal() {
            self.failure = Some("cancelled".to_string());
            self.status = PlanStatus::Failed;
        }
    }

    /// Fail the plan from outside (e.g. the owner noticed the goal vanished). Idempotent.
    pub fn fail(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        reason: impl Into<String>,
    ) {
        if self.status.is_terminal() {
            return;
        }
        self.handoff = None;
        let reason = reason.into();
        if let Some(slot) = self.steps.get_mut(self.cursor) {
            slot.fail(ctx, agent, world, reason.clone());
        }
        self.failure = Some(reason);
        self.status = PlanStatus::Failed;
    }
}
