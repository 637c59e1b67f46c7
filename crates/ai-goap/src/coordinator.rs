use std::sync::Arc;

use ai_core::{
    ActionFactory, AgentEvent, EntityId, EventBus, FactId, GoalId, Plan, PlanStatus, State,
    TickContext, WorldMut,
};
use ai_tools::{TraceEvent, Tracer};

use crate::{JobOutcome, Planner, PlanningJob, PlanningPool};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorConfig {
    /// Minimum seconds between replans triggered by a significant state change.
    pub min_replan_interval: f32,
    /// Consecutive failures tolerated before retries wait `backoff_interval`.
    pub failure_backoff_threshold: u32,
    pub backoff_interval: f32,
    /// Seconds with a goal but neither a plan nor a job before a replan is forced.
    pub stuck_timeout: f32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            min_replan_interval: 0.5,
            failure_backoff_threshold: 3,
            backoff_interval: 2.0,
            stuck_timeout: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    NoGoal,
    NeedsPlan,
    Planning { token: u64 },
    HasPlan,
    Executing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    pub submitted: u64,
    pub installed: u64,
    pub stale: u64,
    pub no_path: u64,
    pub faults: u64,
    pub exec_failures: u64,
    pub exec_successes: u64,
}

struct CurrentGoal {
    id: GoalId,
    state: State,
    satisfied_announced: bool,
}

/// Per-agent owner of the planning job lifecycle and the single active plan.
///
/// Planning never blocks the tick: jobs are submitted to a [`PlanningPool`] and polled on later
/// updates. A completion is installed only if its token is the one this coordinator is still
/// waiting for and no plan is active; anything else is dropped as stale.
pub struct PlanningCoordinator<W, F>
where
    W: WorldMut + 'static,
    F: ActionFactory<W>,
{
    planner: Arc<Planner<F::Spec>>,
    pool: Arc<PlanningPool>,
    factory: F,
    config: CoordinatorConfig,
    watched: Vec<FactId>,

    goal: Option<CurrentGoal>,
    state: CoordinatorState,
    job: Option<PlanningJob<F::Spec>>,
    expected_token: Option<u64>,
    plan: Option<Plan<W>>,

    planned_snapshot: State,
    last_plan_time: Option<f64>,
    retry_at: f64,
    consecutive_failures: u32,
    idle_since: Option<f64>,
    replan_requested: bool,
    announced_no_goal: bool,

    stats: CoordinatorStats,
    tracer: Tracer,
}

impl<W, F> PlanningCoordinator<W, F>
where
    W: WorldMut + 'static,
    F: ActionFactory<W>,
{
    pub fn new(planner: Arc<Planner<F::Spec>>, pool: Arc<PlanningPool>, factory: F) -> Self {
        Self {
            planner,
            pool,
            factory,
            config: CoordinatorConfig::default(),
            watched: Vec::new(),
            goal: None,
            state: CoordinatorState::NoGoal,
            job: None,
            expected_token: None,
            plan: None,
            planned_snapshot: State::new(),
            last_plan_time: None,
            retry_at: f64::NEG_INFINITY,
            consecutive_failures: 0,
            idle_since: None,
            replan_requested: false,
            announced_no_goal: false,
            stats: CoordinatorStats::default(),
            tracer: Tracer::new(),
        }
    }

    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Facts whose change since the last planning request counts as significant.
    pub fn with_watched_facts(mut self, facts: impl IntoIterator<Item = FactId>) -> Self {
        self.watched = facts.into_iter().collect();
        self.watched.sort_unstable();
        self.watched.dedup();
        self
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn goal(&self) -> Option<GoalId> {
        self.goal.as_ref().map(|g| g.id)
    }

    pub fn goal_state(&self) -> Option<&State> {
        self.goal.as_ref().map(|g| &g.state)
    }

    pub fn plan(&self) -> Option<&Plan<W>> {
        self.plan.as_ref()
    }

    pub fn has_plan(&self) -> bool {
        self.plan.is_some()
    }

    pub fn is_planning(&self) -> bool {
        self.job.is_some()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.stats
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut Tracer {
        &mut self.tracer
    }

    /// Assign a goal. Re-assigning the current goal with the same goal state is a no-op.
    ///
    /// Any in-flight job becomes stale; an active plan for another goal is cancelled on the next
    /// update.
    pub fn set_goal(&mut self, goal: GoalId, goal_state: State) {
        if let Some(current) = &self.goal {
            if current.id == goal && current.state == goal_state {
                return;
            }
        }
        tracing::debug!(goal = %goal, "goal assigned");
        self.goal = Some(CurrentGoal {
            id: goal,
            state: goal_state,
            satisfied_announced: false,
        });
        self.expected_token = None;
        self.consecutive_failures = 0;
        self.retry_at = f64::NEG_INFINITY;
        self.replan_requested = false;
        self.announced_no_goal = false;
        if self.plan.is_none() {
            self.state = CoordinatorState::NeedsPlan;
        }
    }

    pub fn clear_goal(&mut self) {
        if self.goal.take().is_some() {
            self.expected_token = None;
            tracing::debug!("goal cleared");
        }
    }

    /// Ask for a replan on the next update, subject to the minimum replan interval.
    pub fn request_replan(&mut self) {
        self.replan_requested = true;
    }

    /// Cancel the active plan and drop the goal (agent despawned or handed to another system).
    pub fn shutdown(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W) {
        if let Some(mut plan) = self.plan.take() {
            plan.cancel(ctx, agent, world);
        }
        self.goal = None;
        self.job = None;
        self.expected_token = None;
        self.state = CoordinatorState::NoGoal;
    }

    pub fn update(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        current: &State,
        events: &mut EventBus<AgentEvent>,
    ) {
        self.poll_job(ctx, agent, world, events);

        let Some(goal_id) = self.goal() else {
            self.enter_no_goal(ctx, agent, world, events);
            return;
        };

        // Plan left over from a previous goal.
        if self.plan.as_ref().is_some_and(|p| p.goal() != goal_id) {
            self.cancel_plan(ctx, agent, world, "goal changed");
        }

        if self.check_satisfied(ctx, agent, world, current, events) {
            return;
        }

        if self.plan.is_some() {
            if self.significant_change(ctx, agent, current) {
                self.cancel_plan(ctx, agent, world, "significant state change");
                self.expected_token = None;
            } else {
                self.tick_plan(ctx, agent, world, events);
                return;
            }
        } else if self.job.is_some() && self.significant_change(ctx, agent, current) {
            self.expected_token = None;
        }

        if self.job.is_none() {
            self.maybe_submit(ctx, agent, world, current, events);
        }
    }

    fn poll_job(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        events: &mut EventBus<AgentEvent>,
    ) {
        let Some(job) = self.job.as_ref() else {
            return;
        };
        let Some(outcome) = job.try_take() else {
            return;
        };
        let token = job.token();
        self.job = None;

        let accepted = self.expected_token == Some(token) && self.plan.is_none();
        let goal_id = match self.goal() {
            Some(goal) if accepted => goal,
            _ => {
                self.stats.stale += 1;
                tracing::trace!(agent = %agent, token, "stale planning result discarded");
                self.trace(ctx, agent, "goap.plan.stale", token, 0);
                if self.expected_token == Some(token) {
                    self.expected_token = None;
                }
                if self.goal.is_some() && self.plan.is_none() {
                    self.state = CoordinatorState::NeedsPlan;
                }
                return;
            }
        };
        self.expected_token = None;

        match outcome {
            JobOutcome::Planned(spec) => {
                let plan = Plan::from_spec(goal_id, &spec, &self.factory, ctx, agent, &*world);
                self.stats.installed += 1;
                self.idle_since = None;
                tracing::debug!(
                    agent = %agent,
                    goal = %goal_id,
                    token,
                    steps = plan.len(),
                    cost = plan.cost(),
                    "plan installed"
                );
                self.trace(ctx, agent, "goap.plan.installed", token, plan.len() as u64);
                self.plan = Some(plan);
                self.state = CoordinatorState::HasPlan;
            }
            JobOutcome::NoPath(err) => {
                self.stats.no_path += 1;
                tracing::debug!(agent = %agent, goal = %goal_id, token, reason = %err, "no plan found");
                self.trace(ctx, agent, "goap.plan.none", token, 0);
                self.planning_failed(ctx, goal_id, events);
            }
            JobOutcome::Fault(message) => {
                self.stats.faults += 1;
                tracing::error!(agent = %agent, goal = %goal_id, token, reason = %message, "planning fault");
                self.trace(ctx, agent, "goap.plan.fault", token, 0);
                self.planning_failed(ctx, goal_id, events);
            }
        }
    }

    fn planning_failed(&mut self, ctx: &TickContext, goal: GoalId, events: &mut EventBus<AgentEvent>) {
        events.publish(AgentEvent::CannotPlan { goal });
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        // Not retried until the selector moves on or the backoff lapses.
        self.retry_at = ctx.time_seconds + self.config.backoff_interval as f64;
        self.state = CoordinatorState::NeedsPlan;
    }

    fn enter_no_goal(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        events: &mut EventBus<AgentEvent>,
    ) {
        if self.plan.is_some() {
            self.cancel_plan(ctx, agent, world, "goal cleared");
        }
        self.state = CoordinatorState::NoGoal;
        self.idle_since = None;
        if !self.announced_no_goal {
            self.announced_no_goal = true;
            events.publish(AgentEvent::NeedNewGoal);
        }
    }

    fn check_satisfied(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        current: &State,
        events: &mut EventBus<AgentEvent>,
    ) -> bool {
        let Some(goal) = self.goal.as_mut() else {
            return false;
        };
        if !current.satisfies(&goal.state) {
            goal.satisfied_announced = false;
            return false;
        }

        let goal_id = goal.id;
        let announce = !goal.satisfied_announced;
        goal.satisfied_announced = true;

        if self.plan.is_some() {
            self.cancel_plan(ctx, agent, world, "goal already satisfied");
        }
        self.expected_token = None;
        self.idle_since = None;
        self.consecutive_failures = 0;
        self.state = CoordinatorState::NeedsPlan;

        if announce {
            tracing::debug!(agent = %agent, goal = %goal_id, "goal satisfied");
            self.trace(ctx, agent, "goap.goal.satisfied", goal_id.0 as u64, 0);
            events.publish(AgentEvent::GoalSatisfied { goal: goal_id });
        }
        true
    }

    fn significant_change(&mut self, ctx: &TickContext, agent: EntityId, current: &State) -> bool {
        let changed = self.replan_requested
            || self
                .watched
                .iter()
                .any(|&fact| current.try_get(fact) != self.planned_snapshot.try_get(fact));
        if !changed {
            return false;
        }

        let interval = self.config.min_replan_interval as f64;
        let due = self
            .last_plan_time
            .map_or(true, |last| ctx.time_seconds - last >= interval);
        if !due {
            return false;
        }

        self.replan_requested = false;
        tracing::debug!(agent = %agent, "significant state change, replanning");
        self.trace(ctx, agent, "goap.replan.significant", 0, 0);
        // Record the new baseline so one change triggers one replan.
        self.snapshot(current);
        self.retry_at = f64::NEG_INFINITY;
        true
    }

    fn tick_plan(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        events: &mut EventBus<AgentEvent>,
    ) {
        let Some(plan) = self.plan.as_mut() else {
            return;
        };
        self.state = CoordinatorState::Executing;
        let goal = plan.goal();

        match plan.tick(ctx, agent, world) {
            PlanStatus::Running => {}
            PlanStatus::Succeeded => {
                self.plan = None;
                self.stats.exec_successes += 1;
                self.consecutive_failures = 0;
                self.retry_at = f64::NEG_INFINITY;
                self.state = CoordinatorState::NeedsPlan;
                tracing::debug!(agent = %agent, goal = %goal, "plan succeeded");
                self.trace(ctx, agent, "goap.exec.succeeded", goal.0 as u64, 0);
                events.publish(AgentEvent::PlanSucceeded { goal });
            }
            PlanStatus::Failed => {
                let reason = plan.failure().unwrap_or("failed").to_string();
                self.plan = None;
                self.stats.exec_failures += 1;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.retry_at = if self.consecutive_failures > self.config.failure_backoff_threshold
                {
                    ctx.time_seconds + self.config.backoff_interval as f64
                } else {
                    f64::NEG_INFINITY
                };
                self.state = CoordinatorState::NeedsPlan;
                tracing::debug!(
                    agent = %agent,
                    goal = %goal,
                    reason = %reason,
                    failures = self.consecutive_failures,
                    "plan execution failed"
                );
                self.trace(
                    ctx,
                    agent,
                    "goap.exec.failed",
                    goal.0 as u64,
                    self.consecutive_failures as u64,
                );
                events.publish(AgentEvent::PlanExecutionFailed { goal, reason });
            }
        }
    }

    fn maybe_submit(
        &mut self,
        ctx: &TickContext,
        agent: EntityId,
        world: &mut W,
        current: &State,
        events: &mut EventBus<AgentEvent>,
    ) {
        let now = ctx.time_seconds;
        let idle_since = *self.idle_since.get_or_insert(now);

        if now < self.retry_at {
            if now - idle_since >= self.config.stuck_timeout as f64 {
                tracing::debug!(agent = %agent, "stuck without a plan, forcing replan");
                self.trace(ctx, agent, "goap.watchdog", self.consecutive_failures as u64, 0);
                self.retry_at = f64::NEG_INFINITY;
                self.consecutive_failures = 0;
            } else {
                return;
            }
        }

        let Some(goal) = self.goal.as_ref() else {
            return;
        };
        let goal_id = goal.id;
        let job = self
            .pool
            .submit(Arc::clone(&self.planner), current.clone(), goal.state.clone());
        let token = job.token();

        self.stats.submitted += 1;
        self.expected_token = Some(token);
        self.job = Some(job);
        self.state = CoordinatorState::Planning { token };
        self.last_plan_time = Some(now);
        self.idle_since = Some(now);
        self.snapshot(current);
        tracing::trace!(agent = %agent, goal = %goal_id, token, "planning job submitted");
        self.trace(ctx, agent, "goap.plan.submit", token, goal_id.0 as u64);

        // Inline pools finish inside `submit`.
        self.poll_job(ctx, agent, world, events);
    }

    fn snapshot(&mut self, current: &State) {
        self.planned_snapshot.clear();
        for &fact in &self.watched {
            if let Some(value) = current.try_get(fact) {
                self.planned_snapshot.set(fact, value);
            }
        }
    }

    fn cancel_plan(&mut self, ctx: &TickContext, agent: EntityId, world: &mut W, reason: &str) {
        if let Some(mut plan) = self.plan.take() {
            tracing::debug!(agent = %agent, goal = %plan.goal(), reason, "plan cancelled");
            plan.cancel(ctx, agent, world);
        }
        if self.goal.is_some() {
            self.state = CoordinatorState::NeedsPlan;
        }
    }

    fn trace(&mut self, ctx: &TickContext, agent: EntityId, tag: &'static str, a: u64, b: u64) {
        self.tracer.emit(
            TraceEvent::new(ctx.tick, tag)
                .with_agent(agent.stable_id())
                .with_a(a)
                .with_b(b),
        );
    }
}
