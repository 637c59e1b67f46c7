use std::sync::Arc;

use ai_core::{Action, ActionFactory, EntityId, ReservationTable, Tag, TickContext};
use ai_goap::{Interaction, StepKey};

use crate::actions::{
    BuildAction, ChopAction, ConsumeAction, DepositAction, DropAction, InvalidStep, MateAction,
    MoveToAction, PickUpAction, RetrieveAction, UseAction, WaitAction,
};
use crate::{ActionTuning, LifeWorld};

/// What every runtime action needs besides its step key.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub reservations: Arc<ReservationTable>,
    pub tuning: ActionTuning,
    /// Interaction distance; matches the scanner's `Near<K>` threshold.
    pub reach: f32,
    /// How far `MoveTo` looks for a target.
    pub search_radius: f32,
    /// Categories many agents use at once (stockpiles); never reserved.
    pub shared_kinds: Vec<Tag>,
}

impl ActionContext {
    pub fn is_shared(&self, kind: Tag) -> bool {
        self.shared_kinds.contains(&kind)
    }
}

/// Builds life-sim actions from catalog step keys.
#[derive(Debug, Clone)]
pub struct LifeActionFactory {
    ctx: ActionContext,
}

impl LifeActionFactory {
    pub fn new(ctx: ActionContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ActionContext {
        &self.ctx
    }
}

impl<W: LifeWorld + 'static> ActionFactory<W> for LifeActionFactory {
    type Spec = StepKey;

    fn build(&self, spec: &StepKey, _ctx: &TickContext, _agent: EntityId, _world: &W) -> Box<dyn Action<W>> {
        let ctx = self.ctx.clone();
        match (spec.interaction, spec.target, spec.item, spec.relieves) {
            (Interaction::MoveTo, Some(kind), _, _) => Box::new(MoveToAction::new(kind, ctx)),
            (Interaction::Chop, Some(source), Some(drop), _) => {
                Box::new(ChopAction::new(source, drop, spec.amount, ctx))
            }
            (Interaction::PickUp, _, Some(item), _) => Box::new(PickUpAction::new(item, ctx)),
            (Interaction::Drop, _, Some(item), _) => Box::new(DropAction::new(item)),
            (Interaction::Consume, _, Some(item), Some(drive)) => {
                Box::new(ConsumeAction::new(item, drive, &ctx))
            }
            (Interaction::Build, Some(output), Some(input), _) => {
                Box::new(BuildAction::new(output, input, &ctx))
            }
            (Interaction::Deposit, Some(pile), Some(item), _) => {
                Box::new(DepositAction::new(pile, item, ctx))
            }
            (Interaction::Retrieve, Some(pile), Some(item), _) => {
                Box::new(RetrieveAction::new(pile, item, ctx))
            }
            (Interaction::Use, Some(structure), _, Some(drive)) => {
                Box::new(UseAction::new(structure, drive, ctx))
            }
            (Interaction::Mate, Some(partner), _, Some(drive)) => {
                Box::new(MateAction::new(partner, drive, ctx))
            }
            (Interaction::Wait, _, _, _) => Box::new(WaitAction::new(&ctx)),
            (interaction, ..) => {
                tracing::warn!(%interaction, "step key is missing a binding");
                Box::new(InvalidStep::new("step key is missing a binding"))
            }
        }
    }
}
