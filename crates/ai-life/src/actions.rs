//! Runtime actions, one per catalog interaction.
//!
//! Targets are bound at `enter`: the planner only reasoned about categories, so each action
//! picks the nearest live instance the agent may use. Claims taken at `enter` are released at
//! `exit` on every path. A completed `MoveTo` hands its claim to the next step through the plan,
//! so `MoveTo(Tree)` passes the tree to `Chop(Tree)` without a window for another agent; the
//! next step keeps it only if it binds the same entity.
//! Every action restores the agent's pose and motion target on exit.

use std::sync::Arc;

use ai_core::{
    Action, ActionError, ActionStatus, Claim, EntityId, ExitReason, FactId, ReservationTable,
    Tag, TickContext, Vec2,
};
use ai_perception::nearest_available;

use crate::{ActionContext, LifeWorld, Pose};

#[derive(Debug, Clone, Copy)]
struct Timer {
    elapsed: f32,
    duration: f32,
}

impl Timer {
    fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        self.elapsed >= self.duration
    }
}

fn origin<W: LifeWorld>(world: &W, agent: EntityId) -> Result<Vec2, ActionError> {
    world
        .position(agent)
        .ok_or(ActionError::Precondition("agent has no position"))
}

/// Nearest usable instance of `tag` within `radius`.
fn find<W: LifeWorld>(
    world: &W,
    agent: EntityId,
    tag: Tag,
    radius: f32,
    reservations: &ReservationTable,
) -> Result<EntityId, ActionError> {
    let origin = origin(world, agent)?;
    nearest_available(world, agent, origin, tag, radius, reservations)
        .map(|(entity, _)| entity)
        .ok_or(ActionError::NoTarget)
}

/// Claim `entity` into `held`. A claim handed over for the same entity is kept; one for any
/// other entity is released.
fn acquire(
    reservations: &Arc<ReservationTable>,
    held: &mut Option<Claim>,
    entity: EntityId,
    agent: EntityId,
) -> Result<(), ActionError> {
    if held.as_ref().is_some_and(|claim| claim.entity() == entity) {
        return Ok(());
    }
    *held = None;
    let claim = reservations
        .claim(entity, agent)
        .ok_or(ActionError::ReservationConflict { entity })?;
    *held = Some(claim);
    Ok(())
}

fn target_alive<W: LifeWorld>(world: &W, target: Option<EntityId>) -> bool {
    target.is_some_and(|t| world.is_alive(t))
}

// --- movement ---------------------------------------------------------------------------------

/// Walk to the nearest instance of a category, following it if it moves.
pub struct MoveToAction {
    kind: Tag,
    ctx: ActionContext,
    target: Option<EntityId>,
    claim: Option<Claim>,
}

impl MoveToAction {
    pub fn new(kind: Tag, ctx: ActionContext) -> Self {
        Self {
            kind,
            ctx,
            target: None,
            claim: None,
        }
    }

    fn arrival_distance(&self) -> f32 {
        self.ctx.reach * 0.5
    }
}

impl<W: LifeWorld + 'static> Action<W> for MoveToAction {
    fn name(&self) -> &'static str {
        "MoveTo"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        let target = find(world, agent, self.kind, self.ctx.search_radius, &self.ctx.reservations)?;
        if !self.ctx.is_shared(self.kind) {
            acquire(&self.ctx.reservations, &mut self.claim, target, agent)?;
        }
        let destination = world.position(target).ok_or(ActionError::TargetLost)?;
        self.target = Some(target);
        world.set_motion_target(agent, Some(destination));
        tracing::trace!(%agent, %target, "moving to target");
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        let Some(destination) = self.target.and_then(|t| world.position(t)) else {
            return ActionStatus::Failed;
        };
        let Some(position) = world.position(agent) else {
            return ActionStatus::Failed;
        };

        let arrival = self.arrival_distance();
        if position.distance(destination) <= arrival {
            return ActionStatus::Succeeded;
        }

        let step = self.ctx.tuning.move_speed.max(0.0) * ctx.dt_seconds.max(0.0);
        let next = position.move_towards(destination, step);
        world.set_position(agent, next);
        world.set_motion_target(agent, Some(destination));

        if next.distance(destination) <= arrival {
            ActionStatus::Succeeded
        } else {
            ActionStatus::Running
        }
    }

    fn exit(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W, _reason: ExitReason) {
        world.set_motion_target(agent, None);
        self.claim = None;
    }

    fn still_valid(&self, _ctx: &TickContext, _agent: EntityId, world: &W) -> bool {
        target_alive(world, self.target)
    }

    fn validity_interval(&self) -> f32 {
        self.ctx.tuning.validity_interval
    }

    fn hand_off(&mut self) -> Option<Claim> {
        self.claim.take()
    }
}

// --- resources --------------------------------------------------------------------------------

/// Work a resource in reach until it breaks into `amount` drops.
pub struct ChopAction {
    source: Tag,
    drop: Tag,
    amount: i32,
    ctx: ActionContext,
    target: Option<EntityId>,
    claim: Option<Claim>,
    timer: Timer,
}

impl ChopAction {
    pub fn new(source: Tag, drop: Tag, amount: i32, ctx: ActionContext) -> Self {
        let timer = Timer::new(ctx.tuning.chop_seconds);
        Self {
            source,
            drop,
            amount,
            ctx,
            target: None,
            claim: None,
            timer,
        }
    }
}

impl<W: LifeWorld + 'static> Action<W> for ChopAction {
    fn name(&self) -> &'static str {
        "Chop"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        let target = find(world, agent, self.source, self.ctx.reach, &self.ctx.reservations)?;
        acquire(&self.ctx.reservations, &mut self.claim, target, agent)?;
        self.target = Some(target);
        world.set_pose(agent, Pose::Working);
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        let Some(target) = self.target.filter(|&t| world.is_alive(t)) else {
            return ActionStatus::Failed;
        };
        if !self.timer.advance(ctx.dt_seconds) {
            return ActionStatus::Running;
        }
        let Some(at) = world.position(target) else {
            return ActionStatus::Failed;
        };
        for _ in 0..self.amount.max(1) {
            world.spawn(self.drop, at);
        }
        world.despawn(target);
        tracing::debug!(%agent, %target, drops = self.amount, "resource harvested");
        ActionStatus::Succeeded
    }

    fn exit(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W, _reason: ExitReason) {
        world.set_pose(agent, Pose::Standing);
        self.claim = None;
    }

    fn take_over(&mut self, claim: Claim) {
        self.claim = Some(claim);
    }

    fn still_valid(&self, _ctx: &TickContext, _agent: EntityId, world: &W) -> bool {
        target_alive(world, self.target)
    }

    fn validity_interval(&self) -> f32 {
        self.ctx.tuning.validity_interval
    }
}

pub struct PickUpAction {
    item: Tag,
    ctx: ActionContext,
    target: Option<EntityId>,
    claim: Option<Claim>,
}

impl PickUpAction {
    pub fn new(item: Tag, ctx: ActionContext) -> Self {
        Self {
            item,
            ctx,
            target: None,
            claim: None,
        }
    }
}

impl<W: LifeWorld + 'static> Action<W> for PickUpAction {
    fn name(&self) -> &'static str {
        "PickUp"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        if world.held(agent).is_some() {
            return Err(ActionError::Precondition("hands are full"));
        }
        let target = find(world, agent, self.item, self.ctx.reach, &self.ctx.reservations)?;
        acquire(&self.ctx.reservations, &mut self.claim, target, agent)?;
        self.target = Some(target);
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        let Some(target) = self.target.filter(|&t| world.is_alive(t)) else {
            return ActionStatus::Failed;
        };
        world.despawn(target);
        world.set_held(agent, Some(self.item));
        ActionStatus::Succeeded
    }

    fn exit(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut W, _reason: ExitReason) {
        self.claim = None;
    }

    fn take_over(&mut self, claim: Claim) {
        self.claim = Some(claim);
    }
}

/// Put the carried item down at the agent's feet.
pub struct DropAction {
    item: Tag,
}

impl DropAction {
    pub fn new(item: Tag) -> Self {
        Self { item }
    }
}

impl<W: LifeWorld + 'static> Action<W> for DropAction {
    fn name(&self) -> &'static str {
        "Drop"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        if world.held(agent) != Some(self.item) {
            return Err(ActionError::Precondition("not holding the item"));
        }
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        let Some(at) = world.position(agent) else {
            return ActionStatus::Failed;
        };
        world.set_held(agent, None);
        let dropped = world.spawn(self.item, at);
        tracing::debug!(%agent, %dropped, "item dropped");
        ActionStatus::Succeeded
    }
}

// --- hand-held items --------------------------------------------------------------------------

pub struct ConsumeAction {
    item: Tag,
    drive: FactId,
    timer: Timer,
}

impl ConsumeAction {
    pub fn new(item: Tag, drive: FactId, ctx: &ActionContext) -> Self {
        Self {
            item,
            drive,
            timer: Timer::new(ctx.tuning.consume_seconds),
        }
    }
}

impl<W: LifeWorld + 'static> Action<W> for ConsumeAction {
    fn name(&self) -> &'static str {
        "Consume"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        if world.held(agent) != Some(self.item) {
            return Err(ActionError::Precondition("not holding the item"));
        }
        world.set_pose(agent, Pose::Eating);
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        if !self.timer.advance(ctx.dt_seconds) {
            return ActionStatus::Running;
        }
        world.set_held(agent, None);
        world.set_drive(agent, self.drive, false);
        ActionStatus::Succeeded
    }

    fn exit(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W, _reason: ExitReason) {
        world.set_pose(agent, Pose::Standing);
    }

    fn still_valid(&self, _ctx: &TickContext, agent: EntityId, world: &W) -> bool {
        world.held(agent) == Some(self.item)
    }
}

/// Turn the held input into a structure at the agent's feet.
pub struct BuildAction {
    output: Tag,
    input: Tag,
    timer: Timer,
}

impl BuildAction {
    pub fn new(output: Tag, input: Tag, ctx: &ActionContext) -> Self {
        Self {
            output,
            input,
            timer: Timer::new(ctx.tuning.build_seconds),
        }
    }
}

impl<W: LifeWorld + 'static> Action<W> for BuildAction {
    fn name(&self) -> &'static str {
        "Build"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        if world.held(agent) != Some(self.input) {
            return Err(ActionError::Precondition("not holding the building material"));
        }
        world.set_pose(agent, Pose::Working);
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        if !self.timer.advance(ctx.dt_seconds) {
            return ActionStatus::Running;
        }
        let Some(at) = world.position(agent) else {
            return ActionStatus::Failed;
        };
        world.set_held(agent, None);
        let built = world.spawn(self.output, at);
        tracing::debug!(%agent, %built, "structure built");
        ActionStatus::Succeeded
    }

    fn exit(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W, _reason: ExitReason) {
        world.set_pose(agent, Pose::Standing);
    }

    fn still_valid(&self, _ctx: &TickContext, agent: EntityId, world: &W) -> bool {
        world.held(agent) == Some(self.input)
    }
}

// --- stockpile --------------------------------------------------------------------------------

pub struct DepositAction {
    stockpile: Tag,
    item: Tag,
    ctx: ActionContext,
    target: Option<EntityId>,
}

impl DepositAction {
    pub fn new(stockpile: Tag, item: Tag, ctx: ActionContext) -> Self {
        Self {
            stockpile,
            item,
            ctx,
            target: None,
        }
    }
}

impl<W: LifeWorld + 'static> Action<W> for DepositAction {
    fn name(&self) -> &'static str {
        "Deposit"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        if world.held(agent) != Some(self.item) {
            return Err(ActionError::Precondition("not holding the item"));
        }
        self.target = Some(find(world, agent, self.stockpile, self.ctx.reach, &self.ctx.reservations)?);
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        let Some(pile) = self.target.filter(|&t| world.is_alive(t)) else {
            return ActionStatus::Failed;
        };
        world.store(pile, self.item);
        world.set_held(agent, None);
        ActionStatus::Succeeded
    }
}

pub struct RetrieveAction {
    stockpile: Tag,
    item: Tag,
    ctx: ActionContext,
    target: Option<EntityId>,
}

impl RetrieveAction {
    pub fn new(stockpile: Tag, item: Tag, ctx: ActionContext) -> Self {
        Self {
            stockpile,
            item,
            ctx,
            target: None,
        }
    }
}

impl<W: LifeWorld + 'static> Action<W> for RetrieveAction {
    fn name(&self) -> &'static str {
        "Retrieve"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        if world.held(agent).is_some() {
            return Err(ActionError::Precondition("hands are full"));
        }
        let pile = find(world, agent, self.stockpile, self.ctx.reach, &self.ctx.reservations)?;
        if world.stockpile_count(pile, self.item) == 0 {
            return Err(ActionError::NoTarget);
        }
        self.target = Some(pile);
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        let Some(pile) = self.target.filter(|&t| world.is_alive(t)) else {
            return ActionStatus::Failed;
        };
        if !world.take(pile, self.item) {
            return ActionStatus::Failed;
        }
        world.set_held(agent, Some(self.item));
        ActionStatus::Succeeded
    }
}

// --- in-place interactions --------------------------------------------------------------------

/// Occupy a structure in reach (a bed) until the drive is relieved.
pub struct UseAction {
    structure: Tag,
    drive: FactId,
    ctx: ActionContext,
    target: Option<EntityId>,
    claim: Option<Claim>,
    timer: Timer,
}

impl UseAction {
    pub fn new(structure: Tag, drive: FactId, ctx: ActionContext) -> Self {
        let timer = Timer::new(ctx.tuning.use_seconds);
        Self {
            structure,
            drive,
            ctx,
            target: None,
            claim: None,
            timer,
        }
    }
}

impl<W: LifeWorld + 'static> Action<W> for UseAction {
    fn name(&self) -> &'static str {
        "Use"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        let target = find(world, agent, self.structure, self.ctx.reach, &self.ctx.reservations)?;
        acquire(&self.ctx.reservations, &mut self.claim, target, agent)?;
        self.target = Some(target);
        world.set_pose(agent, Pose::Resting);
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        if !target_alive(world, self.target) {
            return ActionStatus::Failed;
        }
        if !self.timer.advance(ctx.dt_seconds) {
            return ActionStatus::Running;
        }
        world.set_drive(agent, self.drive, false);
        ActionStatus::Succeeded
    }

    fn exit(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W, _reason: ExitReason) {
        world.set_pose(agent, Pose::Standing);
        self.claim = None;
    }

    fn take_over(&mut self, claim: Claim) {
        self.claim = Some(claim);
    }

    fn still_valid(&self, _ctx: &TickContext, _agent: EntityId, world: &W) -> bool {
        target_alive(world, self.target)
    }

    fn validity_interval(&self) -> f32 {
        self.ctx.tuning.validity_interval
    }
}

/// Pair with a compatible partner in reach; offspring appear at the agent's position.
pub struct MateAction {
    partner_kind: Tag,
    drive: FactId,
    ctx: ActionContext,
    partner: Option<EntityId>,
    claim: Option<Claim>,
    timer: Timer,
}

impl MateAction {
    pub fn new(partner_kind: Tag, drive: FactId, ctx: ActionContext) -> Self {
        let timer = Timer::new(ctx.tuning.mate_seconds);
        Self {
            partner_kind,
            drive,
            ctx,
            partner: None,
            claim: None,
            timer,
        }
    }
}

impl<W: LifeWorld + 'static> Action<W> for MateAction {
    fn name(&self) -> &'static str {
        "Mate"
    }

    fn enter(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W) -> Result<(), ActionError> {
        let partner = find(world, agent, self.partner_kind, self.ctx.reach, &self.ctx.reservations)?;
        if !world.is_compatible_partner(agent, partner) {
            return Err(ActionError::Precondition("partner is not compatible"));
        }
        acquire(&self.ctx.reservations, &mut self.claim, partner, agent)?;
        self.partner = Some(partner);
        world.set_pose(agent, Pose::Mating);
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) -> ActionStatus {
        if !target_alive(world, self.partner) {
            return ActionStatus::Failed;
        }
        if !self.timer.advance(ctx.dt_seconds) {
            return ActionStatus::Running;
        }
        let Some(at) = world.position(agent) else {
            return ActionStatus::Failed;
        };
        world.set_drive(agent, self.drive, false);
        let offspring = world.spawn(self.partner_kind, at);
        tracing::debug!(%agent, %offspring, "offspring spawned");
        ActionStatus::Succeeded
    }

    fn exit(&mut self, _ctx: &TickContext, agent: EntityId, world: &mut W, _reason: ExitReason) {
        world.set_pose(agent, Pose::Standing);
        self.claim = None;
    }

    fn take_over(&mut self, claim: Claim) {
        self.claim = Some(claim);
    }

    fn still_valid(&self, _ctx: &TickContext, agent: EntityId, world: &W) -> bool {
        self.partner
            .is_some_and(|p| world.is_alive(p) && world.is_compatible_partner(agent, p))
    }

    fn validity_interval(&self) -> f32 {
        self.ctx.tuning.validity_interval
    }
}

pub struct WaitAction {
    timer: Timer,
}

impl WaitAction {
    pub fn new(ctx: &ActionContext) -> Self {
        Self {
            timer: Timer::new(ctx.tuning.wait_seconds),
        }
    }
}

impl<W: LifeWorld + 'static> Action<W> for WaitAction {
    fn name(&self) -> &'static str {
        "Wait"
    }

    fn enter(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut W) -> Result<(), ActionError> {
        Ok(())
    }

    fn update(&mut self, ctx: &TickContext, _agent: EntityId, _world: &mut W) -> ActionStatus {
        if self.timer.advance(ctx.dt_seconds) {
            ActionStatus::Succeeded
        } else {
            ActionStatus::Running
        }
    }
}

/// Stand-in for a step the factory cannot bind; fails at `enter`.
pub struct InvalidStep {
    reason: &'static str,
}

impl InvalidStep {
    pub fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

impl<W: LifeWorld + 'static> Action<W> for InvalidStep {
    fn name(&self) -> &'static str {
        "Invalid"
    }

    fn enter(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut W) -> Result<(), ActionError> {
        Err(ActionError::Other(self.reason.into()))
    }

    fn update(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut W) -> ActionStatus {
        ActionStatus::Failed
    }
}
