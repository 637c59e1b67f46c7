use std::borrow::Cow;

use thiserror::Error;

use crate::{Claim, EntityId, TickContext, WorldMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Succeeded,
    Failed,
}

impl ActionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ActionStatus::Running)
    }
}

/// Why an action's `exit` is being called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no matching target found")]
    NoTarget,
    #[error("could not reserve target {entity}")]
    ReservationConflict { entity: EntityId },
    #[error("precondition not met: {0}")]
    Precondition(&'static str),
    #[error("target lost")]
    TargetLost,
    #[error("{0}")]
    Other(Cow<'static, str>),
}

/// Runtime unit bound to one planned step.
///
/// Lifecycle: `enter` once, then `update` every tick until it reports a terminal status, then
/// `exit` exactly once. `exit` also runs when `enter` fails and when the plan is cancelled, and
/// must undo whatever this action made visible to the world (reservations, motion targets,
/// poses). It is own-reversal only; nothing else is rolled back.
///
/// The one exception is a claim handed to the next step of the same plan: [`hand_off`] runs right
/// before a successful `exit` and whatever it returns is offered to the next action through
/// [`take_over`] instead of being released.
///
/// [`hand_off`]: Action::hand_off
/// [`take_over`]: Action::take_over
pub trait Action<W>: 'static
where
    W: WorldMut + 'static,
{
    fn name(&self) -> &'static str;

    fn enter(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
    ) -> Result<(), ActionError>;

    fn update(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus;

    fn exit(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut W, _reason: ExitReason) {
    }

    /// Whether the premise the action entered on still holds (target alive, partner willing).
    fn still_valid(&self, _ctx: &TickContext, _agent: EntityId, _world: &W) -> bool {
        true
    }

    /// Seconds between `still_valid` checks. `0.0` checks every tick.
    fn validity_interval(&self) -> f32 {
        0.0
    }

    /// Claim to pass on to the next step after completing.
    fn hand_off(&mut self) -> Option<Claim> {
        None
    }

    /// Claim left by the previous step, offered before `enter`. Dropping it releases the entity.
    fn take_over(&mut self, claim: Claim) {
        drop(claim);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPhase {
    Pending,
    Active,
    Exited(ExitReason),
}

/// Owns one action instance and enforces its lifecycle.
///
/// `fail` and `cancel` are idempotent: `exit` runs at most once, whichever path gets there first.
pub struct ActionSlot<W>
where
    W: WorldMut + 'static,
{
    action: Box<dyn Action<W>>,
    phase: ActionPhase,
    since_check: f32,
    failure: Option<String>,
}

impl<W> ActionSlot<W>
where
    W: WorldMut + 'static,
{
    pub fn new(action: Box<dyn Action<W>>) -> Self {
        Self {
            action,
            phase: ActionPhase::Pending,
            since_check: 0.0,
            failure: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.action.name()
    }

    pub fn phase(&self) -> &ActionPhase {
        &self.phase
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Run `enter` if it has not run yet. An enter failure exits the action as failed.
    pub fn start(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
    ) -> Result<(), ActionError> {
        if self.phase != ActionPhase::Pending {
            return Ok(());
        }
        self.phase = ActionPhase::Active;
        self.since_check = 0.0;
        if let Err(err) = self.action.enter(ctx, agent, world) {
            self.fail(ctx, agent, world, err.to_string());
            return Err(err);
        }
        Ok(())
    }

    /// Throttled guard check. Returns `true` between checks.
    pub fn check_valid(&mut self, ctx: &TickContext, agent: EntityId, world: &W) -> bool {
        let interval = self.action.validity_interval().max(0.0);
        self.since_check += ctx.dt_seconds.max(0.0);
        if self.since_check < interval {
            return true;
        }
        self.since_check = 0.0;
        self.action.still_valid(ctx, agent, world)
    }

    pub fn update(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        match self.phase {
            ActionPhase::Active => self.action.update(ctx, agent, world),
            ActionPhase::Exited(ExitReason::Completed) => ActionStatus::Succeeded,
            ActionPhase::Pending | ActionPhase::Exited(_) => ActionStatus::Failed,
        }
    }

    fn finish(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W, reason: ExitReason) {
        match self.phase {
            ActionPhase::Active => {
                self.action.exit(ctx, agent, world, reason);
                self.phase = ActionPhase::Exited(reason);
            }
            // Never entered: nothing to undo.
            ActionPhase::Pending => self.phase = ActionPhase::Exited(reason),
            ActionPhase::Exited(_) => {}
        }
    }

    /// Exit as completed, returning the claim the action hands to its successor.
    pub fn complete(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> Option<Claim> {
        let handed = match self.phase {
            ActionPhase::Active => self.action.hand_off(),
            ActionPhase::Pending | ActionPhase::Exited(_) => None,
        };
        self.finish(ctx, agent, world, ExitReason::Completed);
        handed
    }

    /// Give a not-yet-entered action its predecessor's claim. Released if the action has
    /// already started.
    pub fn offer(&mut self, claim: Claim) {
        if self.phase == ActionPhase::Pending {
            self.action.take_over(claim);
        }
    }

    pub fn cancel(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) {
        self.finish(ctx, agent, world, ExitReason::Cancelled);
    }

    pub fn fail(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        reason: impl Into<String>,
    ) {
        if matches!(self.phase, ActionPhase::Exited(_)) {
            return;
        }
        self.failure = Some(reason.into());
        self.finish(ctx, agent, world, ExitReason::Failed);
    }
}
