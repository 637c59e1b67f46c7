use std::collections::BTreeMap;
use std::sync::Arc;

use ai_core::{
    CircleQuery, EntityId, FactId, FactRegistry, FactValue, KindFacts, ReservationTable, SharedFactStore,
    State, Tag, TagRegistry, Vec2, WorldEvent, WorldView,
};
use ai_perception::{
    nearest_available, AgentStateCache, CacheConfig, FnContributor, ProximityScanner,
    ScannerConfig, SharedFactsContributor,
};

#[derive(Default)]
struct Field {
    entities: BTreeMap<EntityId, (Tag, Vec2, bool)>,
    hunger: bool,
}

impl Field {
    fn put(&mut self, id: u64, tag: Tag, x: f32) -> EntityId {
        let entity = EntityId(id);
        self.entities.insert(entity, (tag, Vec2::new(x, 0.0), true));
        entity
    }
}

impl WorldView for Field {
    fn query_circle(&self, query: &CircleQuery<'_>, out: &mut Vec<EntityId>) -> usize {
        let mut tested = 0;
        for (&entity, &(tag, position, _)) in &self.entities {
            if out.len() >= query.max_results {
                break;
            }
            tested += 1;
            if query.tag.is_some_and(|t| t != tag) {
                continue;
            }
            if position.distance(query.center) <= query.radius && query.accepts(entity) {
                out.push(entity);
            }
        }
        tested
    }

    fn position(&self, entity: EntityId) -> Option<Vec2> {
        self.entities.get(&entity).map(|&(_, p, _)| p)
    }

    fn has_tag(&self, entity: EntityId, tag: Tag) -> bool {
        self.entities.get(&entity).is_some_and(|&(t, _, _)| t == tag)
    }

    fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|&(_, _, alive)| alive)
    }
}

const ME: EntityId = EntityId(1);
const RIVAL: EntityId = EntityId(2);

struct Setup {
    facts: FactRegistry,
    tree: KindFacts,
    stick: KindFacts,
}

fn setup() -> Setup {
    let facts = FactRegistry::new();
    let tags = TagRegistry::new();
    let tree = KindFacts::intern(&facts, &tags, "Tree");
    let stick = KindFacts::intern(&facts, &tags, "Stick");
    Setup { facts, tree, stick }
}

fn scanner(s: &Setup) -> ProximityScanner {
    ProximityScanner::new([s.tree.clone(), s.stick.clone()]).with_config(ScannerConfig {
        radius: 10.0,
        max_results: 16,
        reach: 1.0,
    })
}

#[test]
fn scan_writes_presence_count_distance_and_reach() {
    let s = setup();
    let mut world = Field::default();
    world.put(10, s.tree.tag, 4.0);
    world.put(11, s.tree.tag, 0.5);
    world.put(12, s.tree.tag, 30.0);

    let mut state = State::new();
    let report = scanner(&s).scan(&world, ME, Vec2::ZERO, &ReservationTable::new(), &mut state);

    assert_eq!(state.get_bool(s.tree.world_has), Some(true));
    assert_eq!(state.get_int(s.tree.available), Some(2));
    assert_eq!(state.get_float(s.tree.distance), Some(0.5));
    assert_eq!(state.get_bool(s.tree.near), Some(true));

    assert_eq!(state.get_bool(s.stick.world_has), Some(false));
    assert_eq!(state.get_int(s.stick.available), Some(0));
    assert_eq!(state.try_get(s.stick.distance), None);
    assert_eq!(state.get_bool(s.stick.near), Some(false));

    assert_eq!(report.found, 2);
    assert!(report.tested >= report.found);
}

#[test]
fn reserved_entities_are_seen_but_not_available() {
    let s = setup();
    let mut world = Field::default();
    let close = world.put(10, s.tree.tag, 0.5);
    world.put(11, s.tree.tag, 6.0);

    let reservations = ReservationTable::new();
    assert!(reservations.try_reserve(close, RIVAL));

    let mut state = State::new();
    scanner(&s).scan(&world, ME, Vec2::ZERO, &reservations, &mut state);
    assert_eq!(state.get_bool(s.tree.world_has), Some(true));
    assert_eq!(state.get_int(s.tree.available), Some(1));
    assert_eq!(state.get_float(s.tree.distance), Some(6.0));
    assert_eq!(state.get_bool(s.tree.near), Some(false));

    // Our own claim does not hide the target from us.
    let mut mine = State::new();
    scanner(&s).scan(&world, RIVAL, Vec2::ZERO, &reservations, &mut mine);
    assert_eq!(mine.get_int(s.tree.available), Some(2));
    assert_eq!(mine.get_float(s.tree.distance), Some(0.5));
}

#[test]
fn scan_skips_the_agent_itself_and_dead_entities() {
    let s = setup();
    let mut world = Field::default();
    world.put(ME.0, s.tree.tag, 0.0);
    let dead = world.put(20, s.tree.tag, 1.0);
    if let Some(entry) = world.entities.get_mut(&dead) {
        entry.2 = false;
    }

    let mut state = State::new();
    scanner(&s).scan(&world, ME, Vec2::ZERO, &ReservationTable::new(), &mut state);
    assert_eq!(state.get_bool(s.tree.world_has), Some(false));
}

#[test]
fn nearest_available_breaks_ties_by_id() {
    let s = setup();
    let mut world = Field::default();
    world.put(31, s.tree.tag, 2.0);
    world.put(30, s.tree.tag, -2.0);
    world.put(32, s.tree.tag, 5.0);

    let reservations = ReservationTable::new();
    let hit = nearest_available(&world, ME, Vec2::ZERO, s.tree.tag, 10.0, &reservations);
    assert_eq!(hit, Some((EntityId(30), 2.0)));

    assert!(reservations.try_reserve(EntityId(30), RIVAL));
    assert!(reservations.try_reserve(EntityId(31), RIVAL));
    let hit = nearest_available(&world, ME, Vec2::ZERO, s.tree.tag, 10.0, &reservations);
    assert_eq!(hit, Some((EntityId(32), 5.0)));

    let hit = nearest_available(&world, ME, Vec2::ZERO, s.stick.tag, 10.0, &reservations);
    assert_eq!(hit, None);
}

fn cache(s: &Setup, hungry: FactId) -> AgentStateCache<Field> {
    AgentStateCache::new(ME, scanner(s), Arc::new(ReservationTable::new()))
        .with_config(CacheConfig {
            dirty_interval: 0.1,
            steady_interval: 1.0,
            event_radius: 8.0,
        })
        .with_contributor(FnContributor::new(
            "drives",
            move |_: EntityId, world: &Field, out: &mut State| out.set(hungry, world.hunger),
        ))
}

#[test]
fn cache_follows_steady_cadence_without_events() {
    let s = setup();
    let hungry = s.facts.get_id("IsHungry");
    let mut world = Field::default();
    let mut cache = cache(&s, hungry);

    assert!(cache.update(0.0, Vec2::ZERO, &world));
    assert_eq!(cache.state().get_bool(hungry), Some(false));

    world.hunger = true;
    assert!(!cache.update(0.5, Vec2::ZERO, &world));
    assert_eq!(cache.state().get_bool(hungry), Some(false));

    assert!(cache.update(1.0, Vec2::ZERO, &world));
    assert_eq!(cache.state().get_bool(hungry), Some(true));
    assert_eq!(cache.rebuilds(), 2);
}

#[test]
fn relevant_nearby_event_forces_immediate_rebuild() {
    let s = setup();
    let mut world = Field::default();
    let mut cache = cache(&s, s.facts.get_id("IsHungry"));
    cache.update(0.0, Vec2::ZERO, &world);

    let stick = world.put(40, s.stick.tag, 2.0);
    let event = WorldEvent::Spawned {
        entity: stick,
        tag: s.stick.tag,
        position: Vec2::new(2.0, 0.0),
    };
    assert!(cache.on_world_event(&event, Vec2::ZERO, &[s.stick.tag]));
    assert!(cache.update(0.01, Vec2::ZERO, &world));
    assert_eq!(cache.state().get_bool(s.stick.world_has), Some(true));
}

#[test]
fn far_or_uninteresting_events_are_ignored() {
    let s = setup();
    let world = Field::default();
    let mut cache = cache(&s, s.facts.get_id("IsHungry"));
    cache.update(0.0, Vec2::ZERO, &world);

    let far = WorldEvent::Spawned {
        entity: EntityId(50),
        tag: s.stick.tag,
        position: Vec2::new(100.0, 0.0),
    };
    let other_kind = WorldEvent::Despawned {
        entity: EntityId(51),
        tag: s.tree.tag,
        position: Vec2::new(1.0, 0.0),
    };
    assert!(!cache.on_world_event(&far, Vec2::ZERO, &[s.stick.tag]));
    assert!(!cache.on_world_event(&other_kind, Vec2::ZERO, &[s.stick.tag]));
    assert!(!cache.on_world_event(&other_kind, Vec2::ZERO, &[]));

    assert!(!cache.is_dirty());
    assert!(!cache.update(0.5, Vec2::ZERO, &world));
}

#[test]
fn rebuild_forgets_facts_that_went_away() {
    let s = setup();
    let mut world = Field::default();
    let tree = world.put(10, s.tree.tag, 3.0);
    let mut cache = cache(&s, s.facts.get_id("IsHungry"));
    cache.update(0.0, Vec2::ZERO, &world);
    assert_eq!(cache.state().get_float(s.tree.distance), Some(3.0));

    world.entities.remove(&tree);
    cache.invalidate();
    cache.update(0.05, Vec2::ZERO, &world);
    assert_eq!(cache.state().get_bool(s.tree.world_has), Some(false));
    assert_eq!(cache.state().try_get(s.tree.distance), None);
}

#[test]
fn shared_fact_changes_shorten_the_cadence() {
    let s = setup();
    let raining = s.facts.get_id("IsRaining");
    let store = Arc::new(SharedFactStore::new());
    store.set(raining, FactValue::Bool(false));

    let world = Field::default();
    let mut cache = cache(&s, s.facts.get_id("IsHungry"))
        .with_contributor(SharedFactsContributor::new(Arc::clone(&store), [raining]));
    cache.update(0.0, Vec2::ZERO, &world);
    assert_eq!(cache.state().get_bool(raining), Some(false));

    // Unchanged store: the steady interval applies.
    assert!(!cache.update(0.2, Vec2::ZERO, &world));

    store.set(raining, FactValue::Bool(true));
    assert!(cache.update(0.2, Vec2::ZERO, &world));
    assert_eq!(cache.state().get_bool(raining), Some(true));
}
