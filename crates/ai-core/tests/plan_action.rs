use std::sync::Arc;

use ai_core::{
    Action, ActionError, ActionStatus, CircleQuery, Claim, EntityId, ExitReason, GoalId, Plan,
    PlanStatus, ReservationTable, Tag, TickContext, Vec2, WorldMut, WorldView,
};

#[derive(Default)]
struct PlanWorld {
    log: Vec<&'static str>,
    exits: Vec<(&'static str, ExitReason)>,
    alive: bool,
}

impl WorldView for PlanWorld {
    fn query_circle(&self, _query: &CircleQuery<'_>, _out: &mut Vec<EntityId>) -> usize {
        0
    }

    fn position(&self, _entity: EntityId) -> Option<Vec2> {
        Some(Vec2::ZERO)
    }

    fn has_tag(&self, _entity: EntityId, _tag: Tag) -> bool {
        false
    }

    fn is_alive(&self, _entity: EntityId) -> bool {
        self.alive
    }
}

impl WorldMut for PlanWorld {
    fn set_position(&mut self, _entity: EntityId, _position: Vec2) {}

    fn spawn(&mut self, _tag: Tag, _position: Vec2) -> EntityId {
        EntityId(0)
    }

    fn despawn(&mut self, _entity: EntityId) {}
}

struct InstantLogAction(&'static str);

impl Action<PlanWorld> for InstantLogAction {
    fn name(&self) -> &'static str {
        self.0
    }

    fn enter(
        &mut self,
        _ctx: &TickContext,
        _agent: EntityId,
        _world: &mut PlanWorld,
    ) -> Result<(), ActionError> {
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, _agent: EntityId, world: &mut PlanWorld) -> ActionStatus {
        world.log.push(self.0);
        ActionStatus::Succeeded
    }

    fn exit(&mut self, _ctx: &TickContext, _agent: EntityId, world: &mut PlanWorld, reason: ExitReason) {
        world.exits.push((self.0, reason));
    }
}

struct WaitTicksAction {
    name: &'static str,
    remaining: u32,
}

impl Action<PlanWorld> for WaitTicksAction {
    fn name(&self) -> &'static str {
        self.name
    }

    fn enter(
        &mut self,
        _ctx: &TickContext,
        _agent: EntityId,
        _world: &mut PlanWorld,
    ) -> Result<(), ActionError> {
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, _agent: EntityId, world: &mut PlanWorld) -> ActionStatus {
        world.log.push(self.name);
        if self.remaining == 0 {
            return ActionStatus::Succeeded;
        }
        self.remaining -= 1;
        ActionStatus::Running
    }

    fn exit(&mut self, _ctx: &TickContext, _agent: EntityId, world: &mut PlanWorld, reason: ExitReason) {
        world.exits.push((self.name, reason));
    }
}

/// Holds a reservation between enter and exit, and guards on the world's `alive` flag.
struct ReservingAction {
    table: Arc<ReservationTable>,
    target: EntityId,
    claim: Option<Claim>,
    check_every: f32,
}

impl Action<PlanWorld> for ReservingAction {
    fn name(&self) -> &'static str {
        "reserve"
    }

    fn enter(
        &mut self,
        _ctx: &TickContext,
        agent: EntityId,
        _world: &mut PlanWorld,
    ) -> Result<(), ActionError> {
        self.claim = self.table.claim(self.target, agent);
        if self.claim.is_none() {
            return Err(ActionError::ReservationConflict {
                entity: self.target,
            });
        }
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut PlanWorld) -> ActionStatus {
        ActionStatus::Running
    }

    fn exit(&mut self, _ctx: &TickContext, _agent: EntityId, world: &mut PlanWorld, reason: ExitReason) {
        self.claim = None;
        world.exits.push(("reserve", reason));
    }

    fn still_valid(&self, _ctx: &TickContext, _agent: EntityId, world: &PlanWorld) -> bool {
        world.alive
    }

    fn validity_interval(&self) -> f32 {
        self.check_every
    }
}

/// Claims at enter, succeeds at once and passes the claim on.
struct HandingAction {
    table: Arc<ReservationTable>,
    target: EntityId,
    claim: Option<Claim>,
}

impl Action<PlanWorld> for HandingAction {
    fn name(&self) -> &'static str {
        "hand"
    }

    fn enter(
        &mut self,
        _ctx: &TickContext,
        agent: EntityId,
        _world: &mut PlanWorld,
    ) -> Result<(), ActionError> {
        self.claim = self.table.claim(self.target, agent);
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut PlanWorld) -> ActionStatus {
        ActionStatus::Succeeded
    }

    fn exit(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut PlanWorld, _reason: ExitReason) {
        self.claim = None;
    }

    fn hand_off(&mut self) -> Option<Claim> {
        self.claim.take()
    }
}

/// Keeps whatever claim it is offered and runs until cancelled.
#[derive(Default)]
struct KeepingAction {
    claim: Option<Claim>,
}

impl Action<PlanWorld> for KeepingAction {
    fn name(&self) -> &'static str {
        "keep"
    }

    fn enter(
        &mut self,
        _ctx: &TickContext,
        _agent: EntityId,
        _world: &mut PlanWorld,
    ) -> Result<(), ActionError> {
        Ok(())
    }

    fn update(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut PlanWorld) -> ActionStatus {
        ActionStatus::Running
    }

    fn exit(&mut self, _ctx: &TickContext, _agent: EntityId, _world: &mut PlanWorld, _reason: ExitReason) {
        self.claim = None;
    }

    fn take_over(&mut self, claim: Claim) {
        self.claim = Some(claim);
    }
}

fn handing(table: &Arc<ReservationTable>, target: EntityId) -> Box<dyn Action<PlanWorld>> {
    Box::new(HandingAction {
        table: Arc::clone(table),
        target,
        claim: None,
    })
}

fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, 0.1, tick as f64 * 0.1)
}

const AGENT: EntityId = EntityId(1);
const GOAL: GoalId = GoalId(7);

#[test]
fn plan_runs_steps_in_order_one_per_tick() {
    let mut world = PlanWorld::default();
    let mut plan = Plan::new(
        GOAL,
        vec![
            Box::new(InstantLogAction("a")),
            Box::new(WaitTicksAction {
                name: "b",
                remaining: 2,
            }),
            Box::new(InstantLogAction("c")),
        ],
        3.0,
    );

    let mut cursors = Vec::new();
    let mut status = PlanStatus::Running;
    for tick in 0..10 {
        status = plan.tick(&ctx(tick), AGENT, &mut world);
        cursors.push(plan.cursor());
        if status.is_terminal() {
            break;
        }
    }

    assert_eq!(status, PlanStatus::Succeeded);
    assert_eq!(world.log, vec!["a", "b", "b", "b", "c"]);
    assert!(cursors.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(
        world.exits,
        vec![
            ("a", ExitReason::Completed),
            ("b", ExitReason::Completed),
            ("c", ExitReason::Completed),
        ]
    );
}

#[test]
fn terminal_plan_never_returns_running_again() {
    let mut world = PlanWorld::default();
    let mut plan = Plan::new(GOAL, vec![Box::new(InstantLogAction("only"))], 1.0);
    assert_eq!(plan.tick(&ctx(0), AGENT, &mut world), PlanStatus::Succeeded);
    for tick in 1..5 {
        assert_eq!(plan.tick(&ctx(tick), AGENT, &mut world), PlanStatus::Succeeded);
    }
    assert_eq!(world.log, vec!["only"]);
}

#[test]
fn empty_plan_succeeds_immediately() {
    let mut world = PlanWorld::default();
    let mut plan: Plan<PlanWorld> = Plan::new(GOAL, Vec::new(), 0.0);
    assert!(plan.is_empty());
    assert_eq!(plan.tick(&ctx(0), AGENT, &mut world), PlanStatus::Succeeded);
}

#[test]
fn enter_conflict_fails_plan_and_keeps_other_claim() {
    let table = Arc::new(ReservationTable::new());
    let target = EntityId(40);
    assert!(table.try_reserve(target, EntityId(2)));

    let mut world = PlanWorld {
        alive: true,
        ..Default::default()
    };
    let mut plan = Plan::new(
        GOAL,
        vec![Box::new(ReservingAction {
            table: Arc::clone(&table),
            target,
            claim: None,
            check_every: 0.0,
        })],
        1.0,
    );

    assert_eq!(plan.tick(&ctx(0), AGENT, &mut world), PlanStatus::Failed);
    assert!(plan.failure().unwrap_or_default().contains("could not reserve"));
    assert_eq!(world.exits, vec![("reserve", ExitReason::Failed)]);
    assert!(table.is_reserved_by(target, EntityId(2)));
}

#[test]
fn guard_failure_releases_reservation() {
    let table = Arc::new(ReservationTable::new());
    let target = EntityId(40);
    let mut world = PlanWorld {
        alive: true,
        ..Default::default()
    };
    let mut plan = Plan::new(
        GOAL,
        vec![Box::new(ReservingAction {
            table: Arc::clone(&table),
            target,
            claim: None,
            check_every: 0.0,
        })],
        1.0,
    );

    assert_eq!(plan.tick(&ctx(0), AGENT, &mut world), PlanStatus::Running);
    assert!(table.is_reserved_by(target, AGENT));

    world.alive = false;
    assert_eq!(plan.tick(&ctx(1), AGENT, &mut world), PlanStatus::Failed);
    assert!(!table.is_reserved_by(target, AGENT));
    assert!(table.is_available_for(target, EntityId(2)));
    assert_eq!(world.exits, vec![("reserve", ExitReason::Failed)]);
}

#[test]
fn throttled_guard_catches_invalidation_within_interval() {
    let table = Arc::new(ReservationTable::new());
    let mut world = PlanWorld {
        alive: true,
        ..Default::default()
    };
    let mut plan = Plan::new(
        GOAL,
        vec![Box::new(ReservingAction {
            table,
            target: EntityId(3),
            claim: None,
            check_every: 0.35,
        })],
        1.0,
    );

    assert_eq!(plan.tick(&ctx(0), AGENT, &mut world), PlanStatus::Running);
    world.alive = false;

    // Checks happen once 0.35s of ticks have accumulated (dt = 0.1).
    let mut failed_at = None;
    for tick in 1..10 {
        if plan.tick(&ctx(tick), AGENT, &mut world) == PlanStatus::Failed {
            failed_at = Some(tick);
            break;
        }
    }
    let failed_at = failed_at.expect("guard should fire");
    assert!(failed_at >= 2 && failed_at <= 4, "failed at tick {failed_at}");
}

#[test]
fn cancel_runs_exit_once_and_releases() {
    let table = Arc::new(ReservationTable::new());
    let target = EntityId(9);
    let mut world = PlanWorld {
        alive: true,
        ..Default::default()
    };
    let mut plan = Plan::new(
        GOAL,
        vec![Box::new(ReservingAction {
            table: Arc::clone(&table),
            target,
            claim: None,
            check_every: 0.0,
        })],
        1.0,
    );
    plan.tick(&ctx(0), AGENT, &mut world);
    assert!(table.is_reserved_by(target, AGENT));

    plan.cancel(&ctx(1), AGENT, &mut world);
    plan.cancel(&ctx(2), AGENT, &mut world);
    plan.fail(&ctx(3), AGENT, &mut world, "late");

    assert_eq!(world.exits, vec![("reserve", ExitReason::Cancelled)]);
    assert!(table.holder(target).is_none());
    assert_eq!(plan.tick(&ctx(4), AGENT, &mut world), PlanStatus::Failed);
}

#[test]
fn dropping_a_plan_mid_action_still_releases_claims() {
    let table = Arc::new(ReservationTable::new());
    let target = EntityId(11);
    let mut world = PlanWorld {
        alive: true,
        ..Default::default()
    };
    {
        let mut plan = Plan::new(
            GOAL,
            vec![Box::new(ReservingAction {
                table: Arc::clone(&table),
                target,
                claim: None,
                check_every: 0.0,
            })],
            1.0,
        );
        plan.tick(&ctx(0), AGENT, &mut world);
        assert!(table.is_reserved_by(target, AGENT));
    }
    assert!(table.holder(target).is_none());
}

#[test]
fn handed_claim_survives_into_the_next_step_until_cancel() {
    let table = Arc::new(ReservationTable::new());
    let target = EntityId(12);
    let mut world = PlanWorld::default();
    let mut plan = Plan::new(
        GOAL,
        vec![handing(&table, target), Box::new(KeepingAction::default())],
        2.0,
    );

    assert_eq!(plan.tick(&ctx(0), AGENT, &mut world), PlanStatus::Running);
    assert_eq!(plan.cursor(), 1);
    assert!(table.is_reserved_by(target, AGENT), "held by the plan between steps");

    assert_eq!(plan.tick(&ctx(1), AGENT, &mut world), PlanStatus::Running);
    assert!(table.is_reserved_by(target, AGENT), "taken over by the next step");

    plan.cancel(&ctx(2), AGENT, &mut world);
    assert!(table.holder(target).is_none());
}

#[test]
fn unwanted_handed_claim_is_released_when_the_next_step_starts() {
    let table = Arc::new(ReservationTable::new());
    let target = EntityId(13);
    let mut world = PlanWorld::default();
    let mut plan = Plan::new(
        GOAL,
        vec![
            handing(&table, target),
            Box::new(WaitTicksAction {
                name: "w",
                remaining: 3,
            }),
        ],
        2.0,
    );

    plan.tick(&ctx(0), AGENT, &mut world);
    assert!(table.is_reserved_by(target, AGENT));
    assert_eq!(plan.tick(&ctx(1), AGENT, &mut world), PlanStatus::Running);
    assert!(table.holder(target).is_none());
}

#[test]
fn last_step_claim_is_released_when_the_plan_succeeds() {
    let table = Arc::new(ReservationTable::new());
    let target = EntityId(14);
    let mut world = PlanWorld::default();
    let mut plan = Plan::new(GOAL, vec![handing(&table, target)], 1.0);

    assert_eq!(plan.tick(&ctx(0), AGENT, &mut world), PlanStatus::Succeeded);
    assert!(table.holder(target).is_none());
}

#[test]
fn failing_between_steps_releases_the_handed_claim() {
    let table = Arc::new(ReservationTable::new());
    let target = EntityId(15);
    let mut world = PlanWorld::default();
    let mut plan = Plan::new(
        GOAL,
        vec![handing(&table, target), Box::new(KeepingAction::default())],
        2.0,
    );

    plan.tick(&ctx(0), AGENT, &mut world);
    assert!(table.is_reserved_by(target, AGENT));
    plan.fail(&ctx(1), AGENT, &mut world, "goal vanished");
    assert!(table.holder(target).is_none());
}
