//! Per-agent pipeline and the shared runtime agents are spawned from.
//!
//! Each tick an agent refreshes its state cache, drives its planning coordinator, and feeds the
//! coordinator's events to its goal selector. Goal selection is event-driven only: a new goal is
//! picked when the coordinator reports an outcome, never on a timer.

use std::sync::Arc;

use ai_core::kind::HANDS_EMPTY;
use ai_core::{
    AgentEvent, EntityId, EventBus, FactId, FactRegistry, GoalId, KindFacts, ReservationTable,
    SharedFactStore, State, SubscriptionId, Tag, TagRegistry, TickContext, WorldEvent,
};
use ai_goap::{Planner, PlanningCoordinator, PlanningPool, StepCatalog, StepKey};
use ai_perception::{AgentStateCache, ProximityScanner, SharedFactsContributor};
use ai_tools::Tracer;
use ai_utility::UtilityGoalSelector;

use crate::catalog;
use crate::goals::{life_goals, IDLE_GOAL};
use crate::{ActionContext, AgentConfig, LifeActionFactory, LifeContributor, LifeError, LifeWorld};

/// Everything agents share: registries, the compiled catalog and planner, the planning pool, the
/// reservation table and the global fact store.
pub struct LifeRuntime {
    config: AgentConfig,
    facts: FactRegistry,
    tags: TagRegistry,
    catalog: StepCatalog,
    planner: Arc<Planner<StepKey>>,
    pool: Arc<PlanningPool>,
    reservations: Arc<ReservationTable>,
    shared: Arc<SharedFactStore>,
    factory: LifeActionFactory,
    drives: Vec<FactId>,
    carried: Vec<KindFacts>,
    stockpile: Option<Tag>,
    shared_facts: Vec<FactId>,
    watched: Vec<FactId>,
}

impl LifeRuntime {
    pub fn new(config: AgentConfig) -> Result<Self, LifeError> {
        let pool = match config.jobs.threads {
            0 => PlanningPool::inline(),
            threads => PlanningPool::new(threads)?,
        };
        Self::with_pool(config, Arc::new(pool))
    }

    pub fn with_pool(config: AgentConfig, pool: Arc<PlanningPool>) -> Result<Self, LifeError> {
        config.validate()?;

        let facts = FactRegistry::new();
        let tags = TagRegistry::new();
        let catalog = StepCatalog::build(&facts, &tags, &config.catalog)?;
        let planner = Arc::new(catalog.planner(config.planner_config()));
        let reservations = Arc::new(ReservationTable::new());

        let stockpile = config.catalog.stockpile.as_ref().map(|s| tags.get_id(&s.kind));
        let factory = LifeActionFactory::new(ActionContext {
            reservations: Arc::clone(&reservations),
            tuning: config.actions,
            reach: config.scanner.reach,
            search_radius: config.scanner.radius,
            shared_kinds: stockpile.into_iter().collect(),
        });

        let drives = catalog::drives(&config.catalog)
            .into_iter()
            .map(|name| facts.get_id(name))
            .collect();
        let carried = config
            .catalog
            .carried_kinds()
            .into_iter()
            .map(|kind| KindFacts::intern(&facts, &tags, kind))
            .collect();
        let shared_facts = config.shared_facts.iter().map(|n| facts.get_id(n)).collect();
        let watched = config.watched_facts.iter().map(|n| facts.get_id(n)).collect();

        // Fail here rather than on the first spawn.
        UtilityGoalSelector::new(
            life_goals(&facts, &tags, &config.catalog, &config.goals),
            IDLE_GOAL,
        )?;

        tracing::info!(
            steps = catalog.len(),
            kinds = catalog.kinds().len(),
            threads = pool.threads(),
            "life runtime ready"
        );

        Ok(Self {
            config,
            facts,
            tags,
            catalog,
            planner,
            pool,
            reservations,
            shared: Arc::new(SharedFactStore::new()),
            factory,
            drives,
            carried,
            stockpile,
            shared_facts,
            watched,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn facts(&self) -> &FactRegistry {
        &self.facts
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn fact(&self, name: &str) -> FactId {
        self.facts.get_id(name)
    }

    pub fn tag(&self, name: &str) -> Tag {
        self.tags.get_id(name)
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn pool(&self) -> &Arc<PlanningPool> {
        &self.pool
    }

    pub fn reservations(&self) -> &Arc<ReservationTable> {
        &self.reservations
    }

    pub fn shared_facts(&self) -> &Arc<SharedFactStore> {
        &self.shared
    }

    /// Build the brain of the world entity `id`.
    pub fn spawn_agent<W: LifeWorld + 'static>(&self, id: EntityId) -> Result<LifeAgent<W>, LifeError> {
        let scanner = ProximityScanner::new(self.catalog.kinds().iter().cloned())
            .with_config(self.config.scanner_config());
        let mut cache = AgentStateCache::new(id, scanner, Arc::clone(&self.reservations))
            .with_config(self.config.cache_config())
            .with_contributor(LifeContributor::new(
                self.drives.iter().copied(),
                self.facts.get_id(HANDS_EMPTY),
                self.carried.iter().cloned(),
                self.stockpile,
                self.config.scanner.radius,
            ));
        if !self.shared_facts.is_empty() {
            cache = cache.with_contributor(SharedFactsContributor::new(
                Arc::clone(&self.shared),
                self.shared_facts.iter().copied(),
            ));
        }

        let tracer = if self.config.trace {
            Tracer::new().with_log()
        } else {
            Tracer::new()
        };
        let coordinator = PlanningCoordinator::new(
            Arc::clone(&self.planner),
            Arc::clone(&self.pool),
            self.factory.clone(),
        )
        .with_config(self.config.coordinator_config())
        .with_watched_facts(self.watched.iter().copied())
        .with_tracer(tracer);

        let selector = UtilityGoalSelector::new(
            life_goals(&self.facts, &self.tags, &self.config.catalog, &self.config.goals),
            IDLE_GOAL,
        )?
        .with_config(self.config.selector_config());

        let mut events = EventBus::new();
        let subscription = events.subscribe();
        tracing::debug!(agent = %id, "agent spawned");

        Ok(LifeAgent {
            id,
            cache,
            coordinator,
            selector,
            events,
            subscription,
            reservations: Arc::clone(&self.reservations),
            reselect: true,
            retired: false,
        })
    }
}

pub struct LifeAgent<W: LifeWorld + 'static> {
    id: EntityId,
    cache: AgentStateCache<W>,
    coordinator: PlanningCoordinator<W, LifeActionFactory>,
    selector: UtilityGoalSelector<State>,
    events: EventBus<AgentEvent>,
    subscription: SubscriptionId,
    reservations: Arc<ReservationTable>,
    reselect: bool,
    retired: bool,
}

impl<W: LifeWorld + 'static> LifeAgent<W> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The agent's working state as of the last cache rebuild.
    pub fn state(&self) -> &State {
        self.cache.state()
    }

    pub fn goal(&self) -> Option<GoalId> {
        self.coordinator.goal()
    }

    pub fn cache(&self) -> &AgentStateCache<W> {
        &self.cache
    }

    pub fn coordinator(&self) -> &PlanningCoordinator<W, LifeActionFactory> {
        &self.coordinator
    }

    pub fn selector(&self) -> &UtilityGoalSelector<State> {
        &self.selector
    }

    pub fn tracer(&self) -> &Tracer {
        self.coordinator.tracer()
    }

    /// The agent's entity left the world; it no longer ticks.
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) {
        if self.retired {
            return;
        }
        let Some(origin) = world.position(self.id) else {
            self.retire(ctx, world);
            return;
        };
        let now = ctx.time_seconds;
        self.cache.update(now, origin, &*world);

        if self.reselect {
            self.select(now);
        }

        let before = self.progress();
        self.coordinator
            .update(ctx, self.id, world, self.cache.state(), &mut self.events);
        if self.progress() != before {
            // Our own step changed the world; observe it before anyone reacts.
            self.cache.invalidate();
            if let Some(origin) = world.position(self.id) {
                self.cache.update(now, origin, &*world);
            }
        }

        for event in self.events.drain(self.subscription) {
            self.selector.handle_event(&event, now);
            self.reselect = true;
        }
        if self.reselect {
            self.select(now);
        }
    }

    /// Forward a world mutation to the state cache, filtered by the current goal's interests.
    pub fn on_world_event(&mut self, event: &WorldEvent, world: &W) -> bool {
        let Some(origin) = world.position(self.id) else {
            return false;
        };
        self.cache
            .on_world_event(event, origin, self.selector.interest_tags())
    }

    fn select(&mut self, now: f64) {
        let selection = self.selector.evaluate(self.cache.state(), now);
        self.coordinator.set_goal(selection.goal, selection.goal_state);
        self.reselect = false;
    }

    fn progress(&self) -> (Option<usize>, u64, u64) {
        let stats = self.coordinator.stats();
        (
            self.coordinator.plan().map(|p| p.cursor()),
            stats.exec_successes,
            stats.exec_failures,
        )
    }

    fn retire(&mut self, ctx: &TickContext, world: &mut W) {
        self.coordinator.shutdown(ctx, self.id, world);
        let released = self.reservations.release_all(self.id);
        self.retired = true;
        tracing::debug!(agent = %self.id, released, "agent retired");
    }
}

/// Tick every agent once, in stable id order, dispatching the world events each agent causes to
/// all agents before the next one runs.
pub fn tick_agents<W: LifeWorld + 'static>(
    ctx: &TickContext,
    world: &mut W,
    agents: &mut [LifeAgent<W>],
    reservations: &ReservationTable,
) {
    agents.sort_by_key(|agent| agent.id());
    let mut events = Vec::new();
    for index in 0..agents.len() {
        agents[index].tick(ctx, world);

        world.drain_events(&mut events);
        for event in events.drain(..) {
            for agent in agents.iter_mut() {
                agent.on_world_event(&event, &*world);
            }
            if let WorldEvent::Despawned { entity, .. } = event {
                reservations.purge(entity);
            }
        }
    }
}
