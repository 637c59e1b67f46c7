use ai_core::{GoalId, State, Tag};

/// A candidate objective competing for an agent's attention.
///
/// `C` is whatever view of the agent the host hands to goals (drives, cached state, ...).
pub trait Goal<C: ?Sized> {
    fn id(&self) -> GoalId;

    fn name(&self) -> &str;

    /// Higher is more urgent. NaN scores are treated as negative infinity.
    fn utility(&self, ctx: &C) -> f32;

    /// Facts the planner must make true for this goal to be reached.
    fn goal_state(&self, ctx: &C) -> State;

    fn is_satisfied(&self, ctx: &C) -> bool;

    /// Seconds to suppress the goal after planning found no path. `None` uses the selector default.
    fn plan_failure_cooldown(&self) -> Option<f32> {
        None
    }

    /// Seconds to suppress the goal after its plan failed during execution.
    fn execution_failure_cooldown(&self) -> Option<f32> {
        None
    }

    /// World categories whose spawn/despawn matters while this goal is active.
    fn interest_tags(&self) -> &[Tag] {
        &[]
    }
}

type UtilityFn<C> = Box<dyn Fn(&C) -> f32 + Send + Sync>;
type StateFn<C> = Box<dyn Fn(&C) -> State + Send + Sync>;
type SatisfiedFn<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

/// Closure-backed goal, for goals that need no type of their own.
pub struct UtilityGoal<C: ?Sized> {
    id: GoalId,
    name: String,
    utility_fn: UtilityFn<C>,
    state_fn: StateFn<C>,
    satisfied_fn: SatisfiedFn<C>,
    plan_failure_cooldown: Option<f32>,
    execution_failure_cooldown: Option<f32>,
    interest_tags: Vec<Tag>,
}

impl<C: ?Sized> UtilityGoal<C> {
    pub fn new(
        id: GoalId,
        name: impl Into<String>,
        utility_fn: impl Fn(&C) -> f32 + Send + Sync + 'static,
        state_fn: impl Fn(&C) -> State + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            utility_fn: Box::new(utility_fn),
            state_fn: Box::new(state_fn),
            satisfied_fn: Box::new(|_| false),
            plan_failure_cooldown: None,
            execution_failure_cooldown: None,
            interest_tags: Vec::new(),
        }
    }

    pub fn with_satisfied(mut self, satisfied_fn: impl Fn(&C) -> bool + Send + Sync + 'static) -> Self {
        self.satisfied_fn = Box::new(satisfied_fn);
        self
    }

    pub fn with_cooldowns(mut self, plan_failure: Option<f32>, execution_failure: Option<f32>) -> Self {
        self.plan_failure_cooldown = plan_failure;
        self.execution_failure_cooldown = execution_failure;
        self
    }

    pub fn with_interest_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.interest_tags = tags.into_iter().collect();
        self
    }
}

impl<C: ?Sized> Goal<C> for UtilityGoal<C> {
    fn id(&self) -> GoalId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn utility(&self, ctx: &C) -> f32 {
        (self.utility_fn)(ctx)
    }

    fn goal_state(&self, ctx: &C) -> State {
        (self.state_fn)(ctx)
    }

    fn is_satisfied(&self, ctx: &C) -> bool {
        (self.satisfied_fn)(ctx)
    }

    fn plan_failure_cooldown(&self) -> Option<f32> {
        self.plan_failure_cooldown
    }

    fn execution_failure_cooldown(&self) -> Option<f32> {
        self.execution_failure_cooldown
    }

    fn interest_tags(&self) -> &[Tag] {
        &self.interest_tags
    }
}
