use ai_core::{CircleQuery, EntityId, KindFacts, ReservationTable, State, Tag, Vec2, WorldView};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannerConfig {
    /// Query radius around the agent.
    pub radius: f32,
    /// Per-category cap on returned entities.
    pub max_results: usize,
    /// Distance at which the nearest target counts as `Near<K>`.
    pub reach: f32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            max_results: 32,
            reach: 1.5,
        }
    }
}

/// Cost of one scan, for profiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Candidates tested by the world's spatial queries.
    pub tested: usize,
    /// Entities returned across all categories.
    pub found: usize,
}

/// Writes `WorldHas<K>`, `<K>Available`, `DistanceTo<K>` and `Near<K>` for each category.
///
/// Entities reserved by another agent count towards `WorldHas<K>` but not towards availability or
/// distance. With nothing available the distance fact is left unknown, so distance-based step
/// costs fall back to their fixed estimate.
#[derive(Debug, Clone)]
pub struct ProximityScanner {
    kinds: Vec<KindFacts>,
    config: ScannerConfig,
    scratch: Vec<EntityId>,
}

impl ProximityScanner {
    pub fn new(kinds: impl IntoIterator<Item = KindFacts>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            config: ScannerConfig::default(),
            scratch: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ScannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn kinds(&self) -> &[KindFacts] {
        &self.kinds
    }

    pub fn scan<W: WorldView + ?Sized>(
        &mut self,
        world: &W,
        agent: EntityId,
        origin: Vec2,
        reservations: &ReservationTable,
        out: &mut State,
    ) -> ScanReport {
        let mut report = ScanReport::default();
        let not_self = |e: EntityId| e != agent && world.is_alive(e);

        for kind in &self.kinds {
            self.scratch.clear();
            let query = CircleQuery::new(origin, self.config.radius)
                .with_tag(kind.tag)
                .with_filter(&not_self)
                .with_max_results(self.config.max_results);
            report.tested += world.query_circle(&query, &mut self.scratch);
            report.found += self.scratch.len();

            let mut available = 0i32;
            let mut nearest: Option<(EntityId, f32)> = None;
            for &entity in &self.scratch {
                if !reservations.is_available_for(entity, agent) {
                    continue;
                }
                available += 1;
                let Some(position) = world.position(entity) else {
                    continue;
                };
                let distance = origin.distance(position);
                if closer((entity, distance), nearest) {
                    nearest = Some((entity, distance));
                }
            }

            out.set(kind.world_has, !self.scratch.is_empty());
            out.set(kind.available, available);
            match nearest {
                Some((_, distance)) => {
                    out.set(kind.distance, distance);
                    out.set(kind.near, distance <= self.config.reach);
                }
                None => {
                    out.remove(kind.distance);
                    out.set(kind.near, false);
                }
            }
        }

        tracing::trace!(%agent, tested = report.tested, found = report.found, "proximity scan");
        report
    }
}

/// Nearest live entity tagged `tag` within `radius` that `agent` may reserve.
///
/// Actions use this at `enter` to bind the concrete target the planner only reasoned about by
/// category. Ties on distance go to the lower entity id.
pub fn nearest_available<W: WorldView + ?Sized>(
    world: &W,
    agent: EntityId,
    origin: Vec2,
    tag: Tag,
    radius: f32,
    reservations: &ReservationTable,
) -> Option<(EntityId, f32)> {
    let filter = |e: EntityId| {
        e != agent && world.is_alive(e) && reservations.is_available_for(e, agent)
    };
    let query = CircleQuery::new(origin, radius)
        .with_tag(tag)
        .with_filter(&filter);
    let mut found = Vec::new();
    world.query_circle(&query, &mut found);

    let mut nearest = None;
    for entity in found {
        if let Some(position) = world.position(entity) {
            let candidate = (entity, origin.distance(position));
            if closer(candidate, nearest) {
                nearest = Some(candidate);
            }
        }
    }
    nearest
}

fn closer(candidate: (EntityId, f32), best: Option<(EntityId, f32)>) -> bool {
    match best {
        None => true,
        Some((entity, distance)) => candidate
            .1
            .total_cmp(&distance)
            .then(candidate.0.cmp(&entity))
            .is_lt(),
    }
}
