//! Per-agent working state with a two-speed rebuild cadence.
//!
//! The cache rebuilds on `dirty_interval` while dirty and on `steady_interval` otherwise. A
//! relevant world event (near the agent, of a category the current goal cares about) marks it
//! dirty and forces the next update to rebuild immediately. Events elsewhere, or for categories
//! nobody is interested in, leave the cached state and therefore every running plan alone.

use std::fmt;
use std::sync::Arc;

use ai_core::{EntityId, FactId, ReservationTable, SharedFactStore, State, Tag, Vec2, WorldEvent, WorldView};

use crate::{ProximityScanner, ScanReport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    /// Rebuild interval while dirty, in seconds.
    pub dirty_interval: f32,
    /// Rebuild interval otherwise.
    pub steady_interval: f32,
    /// World events farther than this from the agent are ignored.
    pub event_radius: f32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dirty_interval: 0.1,
            steady_interval: 0.5,
            event_radius: 25.0,
        }
    }
}

/// A source of facts merged into the agent's state on every rebuild.
pub trait StateContributor<W: ?Sized> {
    fn name(&self) -> &str;

    fn contribute(&mut self, agent: EntityId, world: &W, out: &mut State);

    /// The contributor knows its facts changed since the last rebuild.
    fn is_stale(&self) -> bool {
        false
    }
}

/// Closure-backed contributor.
pub struct FnContributor<F> {
    name: String,
    f: F,
}

impl<F> FnContributor<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<W: ?Sized, F> StateContributor<W> for FnContributor<F>
where
    F: FnMut(EntityId, &W, &mut State),
{
    fn name(&self) -> &str {
        &self.name
    }

    fn contribute(&mut self, agent: EntityId, world: &W, out: &mut State) {
        (self.f)(agent, world, out);
    }
}

/// Mirrors selected facts of the global [`SharedFactStore`].
///
/// Goes stale whenever the store's version moves past the one seen at the last rebuild.
#[derive(Debug)]
pub struct SharedFactsContributor {
    store: Arc<SharedFactStore>,
    facts: Vec<FactId>,
    seen_version: Option<u64>,
}

impl SharedFactsContributor {
    pub fn new(store: Arc<SharedFactStore>, facts: impl IntoIterator<Item = FactId>) -> Self {
        Self {
            store,
            facts: facts.into_iter().collect(),
            seen_version: None,
        }
    }
}

impl<W: ?Sized> StateContributor<W> for SharedFactsContributor {
    fn name(&self) -> &str {
        "shared-facts"
    }

    fn contribute(&mut self, _agent: EntityId, _world: &W, out: &mut State) {
        // Read the version first: a write racing the snapshot leaves us stale, never falsely fresh.
        self.seen_version = Some(self.store.version());
        self.store.snapshot_into(&self.facts, out);
    }

    fn is_stale(&self) -> bool {
        self.seen_version != Some(self.store.version())
    }
}

pub struct AgentStateCache<W: ?Sized> {
    agent: EntityId,
    config: CacheConfig,
    scanner: ProximityScanner,
    reservations: Arc<ReservationTable>,
    contributors: Vec<Box<dyn StateContributor<W>>>,
    state: State,
    last_rebuild: Option<f64>,
    dirty: bool,
    forced: bool,
    rebuilds: u64,
    last_report: ScanReport,
}

impl<W: ?Sized> fmt::Debug for AgentStateCache<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contributors: Vec<&str> = self.contributors.iter().map(|c| c.name()).collect();
        f.debug_struct("AgentStateCache")
            .field("agent", &self.agent)
            .field("config", &self.config)
            .field("contributors", &contributors)
            .field("facts", &self.state.len())
            .field("last_rebuild", &self.last_rebuild)
            .field("dirty", &self.dirty)
            .field("forced", &self.forced)
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}

impl<W: WorldView + ?Sized> AgentStateCache<W> {
    pub fn new(agent: EntityId, scanner: ProximityScanner, reservations: Arc<ReservationTable>) -> Self {
        Self {
            agent,
            config: CacheConfig::default(),
            scanner,
            reservations,
            contributors: Vec::new(),
            state: State::new(),
            last_rebuild: None,
            dirty: true,
            forced: true,
            rebuilds: 0,
            last_report: ScanReport::default(),
        }
    }

    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_contributor(mut self, contributor: impl StateContributor<W> + 'static) -> Self {
        self.contributors.push(Box::new(contributor));
        self
    }

    pub fn add_contributor(&mut self, contributor: Box<dyn StateContributor<W>>) {
        self.contributors.push(contributor);
        self.forced = true;
    }

    pub fn agent(&self) -> EntityId {
        self.agent
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The state as of the last rebuild.
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn last_report(&self) -> ScanReport {
        self.last_report
    }

    /// Shorten the cadence without forcing an immediate rebuild.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Rebuild on the next update regardless of cadence (e.g. after the agent's own action changed
    /// its inventory).
    pub fn invalidate(&mut self) {
        self.dirty = true;
        self.forced = true;
    }

    /// Feed a world mutation. Returns `true` when the event was relevant and forced a rebuild.
    pub fn on_world_event(&mut self, event: &WorldEvent, origin: Vec2, interest: &[Tag]) -> bool {
        if event.entity() == self.agent || !interest.contains(&event.tag()) {
            return false;
        }
        if origin.distance(event.position()) > self.config.event_radius {
            return false;
        }
        tracing::debug!(agent = %self.agent, entity = %event.entity(), "relevant world event");
        self.invalidate();
        true
    }

    /// Rebuild if due. Returns `true` when the state was rebuilt.
    pub fn update(&mut self, now: f64, origin: Vec2, world: &W) -> bool {
        if self.contributors.iter().any(|c| c.is_stale()) {
            self.dirty = true;
        }
        if !self.forced && !self.is_due(now) {
            return false;
        }
        self.rebuild(now, origin, world);
        true
    }

    fn is_due(&self, now: f64) -> bool {
        let Some(last) = self.last_rebuild else {
            return true;
        };
        let interval = if self.dirty {
            self.config.dirty_interval
        } else {
            self.config.steady_interval
        };
        now - last >= interval as f64
    }

    fn rebuild(&mut self, now: f64, origin: Vec2, world: &W) {
        self.state.clear();
        self.last_report = self
            .scanner
            .scan(world, self.agent, origin, &self.reservations, &mut self.state);
        for contributor in &mut self.contributors {
            contributor.contribute(self.agent, world, &mut self.state);
        }

        self.last_rebuild = Some(now);
        self.dirty = false;
        self.forced = false;
        self.rebuilds += 1;
        tracing::trace!(agent = %self.agent, facts = self.state.len(), "state rebuilt");
    }
}
