//! Exclusive claims on world entities.
//!
//! Every entity owns one atomic word: `0` means unclaimed, otherwise it holds `agent + 1`. Claims
//! and releases are single compare-and-swap operations on that word, so two agents can never hold
//! the same entity. The dashmap is only written when an entity is seen for the first time or
//! purged; claiming an already-known entity takes a shared shard guard plus one CAS.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::EntityId;

const UNCLAIMED: u64 = 0;

fn encode(agent: EntityId) -> Option<u64> {
    agent.0.checked_add(1)
}

#[derive(Debug, Default)]
pub struct ReservationTable {
    slots: DashMap<EntityId, AtomicU64>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slot<R>(&self, entity: EntityId, f: impl FnOnce(&AtomicU64) -> R) -> R {
        loop {
            if let Some(slot) = self.slots.get(&entity) {
                return f(slot.value());
            }
            self.slots
                .entry(entity)
                .or_insert_with(|| AtomicU64::new(UNCLAIMED));
        }
    }

    /// Claim `entity` for `agent`. Succeeds iff the entity was unclaimed.
    pub fn try_reserve(&self, entity: EntityId, agent: EntityId) -> bool {
        let Some(word) = encode(agent) else {
            return false;
        };
        let claimed = self.with_slot(entity, |slot| {
            slot.compare_exchange(UNCLAIMED, word, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        });
        if claimed {
            tracing::trace!(%entity, %agent, "reserved");
        }
        claimed
    }

    pub fn holder(&self, entity: EntityId) -> Option<EntityId> {
        let word = self.slots.get(&entity)?.load(Ordering::Acquire);
        (word != UNCLAIMED).then(|| EntityId(word - 1))
    }

    pub fn is_reserved_by(&self, entity: EntityId, agent: EntityId) -> bool {
        self.holder(entity) == Some(agent)
    }

    /// Unclaimed, or already claimed by this same agent.
    pub fn is_available_for(&self, entity: EntityId, agent: EntityId) -> bool {
        match self.holder(entity) {
            None => true,
            Some(holder) => holder == agent,
        }
    }

    /// Release `entity` if `agent` holds it. Releasing something not held is a no-op.
    pub fn release(&self, entity: EntityId, agent: EntityId) -> bool {
        let Some(word) = encode(agent) else {
            return false;
        };
        let Some(slot) = self.slots.get(&entity) else {
            return false;
        };
        let released = slot
            .compare_exchange(word, UNCLAIMED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if released {
            tracing::trace!(%entity, %agent, "released");
        }
        released
    }

    /// Release everything `agent` holds (e.g. when the agent is despawned).
    pub fn release_all(&self, agent: EntityId) -> usize {
        let Some(word) = encode(agent) else {
            return 0;
        };
        self.slots
            .iter()
            .filter(|slot| {
                slot.value()
                    .compare_exchange(word, UNCLAIMED, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            })
            .count()
    }

    /// Forget an entity that left the world.
    pub fn purge(&self, entity: EntityId) {
        self.slots.remove(&entity);
    }

    /// RAII variant of [`try_reserve`](Self::try_reserve): the returned [`Claim`] releases the
    /// entity when dropped, whatever path the owner exits through.
    pub fn claim(self: &Arc<Self>, entity: EntityId, agent: EntityId) -> Option<Claim> {
        self.try_reserve(entity, agent).then(|| Claim {
            table: Arc::clone(self),
            entity,
            agent,
        })
    }
}

/// A held reservation. Dropping it releases the entity.
#[derive(Debug)]
pub struct Claim {
    table: Arc<ReservationTable>,
    entity: EntityId,
    agent: EntityId,
}

impl Claim {
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn agent(&self) -> EntityId {
        self.agent
    }

    pub fn is_held(&self) -> bool {
        self.table.is_reserved_by(self.entity, self.agent)
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.table.release(self.entity, self.agent);
    }
}
