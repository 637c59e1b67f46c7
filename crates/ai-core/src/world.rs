use crate::{EntityId, Tag, Vec2};

/// Radius-bounded spatial query.
///
/// How the world indexes entities is its own business; callers only rely on this contract:
/// every returned entity lies within `radius` of `center`, matches `tag` (if any) and the
/// `filter` (if any), and at most `max_results` entities are returned.
pub struct CircleQuery<'a> {
    pub center: Vec2,
    pub radius: f32,
    pub tag: Option<Tag>,
    pub filter: Option<&'a dyn Fn(EntityId) -> bool>,
    pub max_results: usize,
}

impl<'a> CircleQuery<'a> {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            tag: None,
            filter: None,
            max_results: usize::MAX,
        }
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_filter(mut self, filter: &'a dyn Fn(EntityId) -> bool) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn accepts(&self, entity: EntityId) -> bool {
        self.filter.map_or(true, |f| f(entity))
    }
}

/// Read-only world access.
///
/// The core crate only prescribes what planning and perception need; domain crates extend this
/// with their own typed lookups.
pub trait WorldView {
    /// Append matching entities to `out` and return how many candidates were tested.
    fn query_circle(&self, query: &CircleQuery<'_>, out: &mut Vec<EntityId>) -> usize;

    fn position(&self, entity: EntityId) -> Option<Vec2>;

    fn has_tag(&self, entity: EntityId, tag: Tag) -> bool;

    /// Alive and active. Dead or despawned entities are never valid action targets.
    fn is_alive(&self, entity: EntityId) -> bool;
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {
    fn set_position(&mut self, entity: EntityId, position: Vec2);

    fn spawn(&mut self, tag: Tag, position: Vec2) -> EntityId;

    fn despawn(&mut self, entity: EntityId);
}

/// World mutation notifications consumed by agent state caches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    Spawned {
        entity: EntityId,
        tag: Tag,
        position: Vec2,
    },
    Despawned {
        entity: EntityId,
        tag: Tag,
        position: Vec2,
    },
}

impl WorldEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            WorldEvent::Spawned { entity, .. } | WorldEvent::Despawned { entity, .. } => *entity,
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            WorldEvent::Spawned { tag, .. } | WorldEvent::Despawned { tag, .. } => *tag,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            WorldEvent::Spawned { position, .. } | WorldEvent::Despawned { position, .. } => {
                *position
            }
        }
    }
}
