//! In-memory reference world.
//!
//! Entities live in a `BTreeMap`, so queries scan linearly in id order; this is a test and
//! benchmark fixture, not a spatial index.

use std::cell::Cell;
use std::collections::BTreeMap;

use ai_core::{CircleQuery, EntityId, FactId, Tag, Vec2, WorldEvent, WorldMut, WorldView};

use crate::{LifeWorld, Pose};

#[derive(Debug, Clone)]
struct Body {
    tag: Tag,
    position: Vec2,
}

#[derive(Debug, Clone, Default)]
struct Mind {
    drives: BTreeMap<FactId, bool>,
    held: Option<Tag>,
    pose: Pose,
    motion_target: Option<Vec2>,
}

#[derive(Debug, Default)]
pub struct SandboxWorld {
    next_id: u64,
    bodies: BTreeMap<EntityId, Body>,
    minds: BTreeMap<EntityId, Mind>,
    stockpiles: BTreeMap<EntityId, BTreeMap<Tag, u32>>,
    events: Vec<WorldEvent>,
    tested: Cell<u64>,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an entity without emitting an event (level setup).
    pub fn place(&mut self, tag: Tag, position: Vec2) -> EntityId {
        self.next_id += 1;
        let entity = EntityId(self.next_id);
        self.bodies.insert(entity, Body { tag, position });
        entity
    }

    /// Place an entity that has drives, hands and a pose.
    pub fn place_agent(&mut self, tag: Tag, position: Vec2) -> EntityId {
        let entity = self.place(tag, position);
        self.minds.insert(entity, Mind::default());
        entity
    }

    pub fn tag(&self, entity: EntityId) -> Option<Tag> {
        self.bodies.get(&entity).map(|b| b.tag)
    }

    pub fn count(&self, tag: Tag) -> usize {
        self.bodies.values().filter(|b| b.tag == tag).count()
    }

    pub fn entities_with(&self, tag: Tag) -> Vec<EntityId> {
        self.bodies
            .iter()
            .filter(|(_, b)| b.tag == tag)
            .map(|(&e, _)| e)
            .collect()
    }

    /// Total candidates tested by spatial queries so far.
    pub fn query_tests(&self) -> u64 {
        self.tested.get()
    }

    pub fn pending_events(&self) -> &[WorldEvent] {
        &self.events
    }
}

impl WorldView for SandboxWorld {
    fn query_circle(&self, query: &CircleQuery<'_>, out: &mut Vec<EntityId>) -> usize {
        let radius_sq = query.radius * query.radius;
        let mut tested = 0;
        let mut added = 0;
        for (&entity, body) in &self.bodies {
            if added >= query.max_results {
                break;
            }
            tested += 1;
            if query.tag.is_some_and(|tag| tag != body.tag) {
                continue;
            }
            if body.position.distance_squared(query.center) > radius_sq {
                continue;
            }
            if !query.accepts(entity) {
                continue;
            }
            out.push(entity);
            added += 1;
        }
        self.tested.set(self.tested.get() + tested as u64);
        tested
    }

    fn position(&self, entity: EntityId) -> Option<Vec2> {
        self.bodies.get(&entity).map(|b| b.position)
    }

    fn has_tag(&self, entity: EntityId, tag: Tag) -> bool {
        self.tag(entity) == Some(tag)
    }

    fn is_alive(&self, entity: EntityId) -> bool {
        self.bodies.contains_key(&entity)
    }
}

impl WorldMut for SandboxWorld {
    fn set_position(&mut self, entity: EntityId, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.position = position;
        }
    }

    fn spawn(&mut self, tag: Tag, position: Vec2) -> EntityId {
        let entity = self.place(tag, position);
        self.events.push(WorldEvent::Spawned {
            entity,
            tag,
            position,
        });
        entity
    }

    fn despawn(&mut self, entity: EntityId) {
        let Some(body) = self.bodies.remove(&entity) else {
            return;
        };
        self.minds.remove(&entity);
        self.stockpiles.remove(&entity);
        self.events.push(WorldEvent::Despawned {
            entity,
            tag: body.tag,
            position: body.position,
        });
    }
}

impl LifeWorld for SandboxWorld {
    fn drive(&self, agent: EntityId, drive: FactId) -> Option<bool> {
        self.minds.get(&agent)?.drives.get(&drive).copied()
    }

    fn set_drive(&mut self, agent: EntityId, drive: FactId, active: bool) {
        if let Some(mind) = self.minds.get_mut(&agent) {
            mind.drives.insert(drive, active);
        }
    }

    fn held(&self, agent: EntityId) -> Option<Tag> {
        self.minds.get(&agent)?.held
    }

    fn set_held(&mut self, agent: EntityId, item: Option<Tag>) {
        if let Some(mind) = self.minds.get_mut(&agent) {
            mind.held = item;
        }
    }

    fn stockpile_count(&self, stockpile: EntityId, item: Tag) -> u32 {
        self.stockpiles
            .get(&stockpile)
            .and_then(|items| items.get(&item))
            .copied()
            .unwrap_or(0)
    }

    fn store(&mut self, stockpile: EntityId, item: Tag) {
        if self.bodies.contains_key(&stockpile) {
            *self
                .stockpiles
                .entry(stockpile)
                .or_default()
                .entry(item)
                .or_insert(0) += 1;
        }
    }

    fn take(&mut self, stockpile: EntityId, item: Tag) -> bool {
        let Some(count) = self
            .stockpiles
            .get_mut(&stockpile)
            .and_then(|items| items.get_mut(&item))
        else {
            return false;
        };
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    fn pose(&self, agent: EntityId) -> Pose {
        self.minds.get(&agent).map(|m| m.pose).unwrap_or_default()
    }

    fn set_pose(&mut self, agent: EntityId, pose: Pose) {
        if let Some(mind) = self.minds.get_mut(&agent) {
            mind.pose = pose;
        }
    }

    fn motion_target(&self, agent: EntityId) -> Option<Vec2> {
        self.minds.get(&agent)?.motion_target
    }

    fn set_motion_target(&mut self, agent: EntityId, target: Option<Vec2>) {
        if let Some(mind) = self.minds.get_mut(&agent) {
            mind.motion_target = target;
        }
    }

    /// Any other living agent that is not resting.
    fn is_compatible_partner(&self, agent: EntityId, partner: EntityId) -> bool {
        agent != partner
            && self
                .minds
                .get(&partner)
                .is_some_and(|mind| mind.pose != Pose::Resting)
    }

    fn drain_events(&mut self, out: &mut Vec<WorldEvent>) {
        out.append(&mut self.events);
    }
}
