//! Per-category fact naming.
//!
//! Every tagged category `K` ("Tree", "Stick") owns a fixed family of facts. The scanner writes
//! them from the live world and the step catalog reads and writes them during search, so both
//! sides must derive the names the same way.

use std::sync::Arc;

use crate::{FactId, FactRegistry, Tag, TagRegistry};

/// Agent-level fact: nothing is carried (bool). Agents carry at most one item at a time.
pub const HANDS_EMPTY: &str = "HandsEmpty";

pub fn world_has(kind: &str) -> String {
    format!("WorldHas{kind}")
}

pub fn available(kind: &str) -> String {
    format!("{kind}Available")
}

pub fn distance_to(kind: &str) -> String {
    format!("DistanceTo{kind}")
}

pub fn near(kind: &str) -> String {
    format!("Near{kind}")
}

pub fn holding(kind: &str) -> String {
    format!("Holding{kind}")
}

pub fn stored(kind: &str) -> String {
    format!("Stored{kind}")
}

pub fn stockpile_count(kind: &str) -> String {
    format!("StockpileHas{kind}")
}

/// Interned tag and fact ids of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindFacts {
    pub name: Arc<str>,
    pub tag: Tag,
    /// `WorldHas<K>`: at least one instance is visible (bool).
    pub world_has: FactId,
    /// `<K>Available`: instances not reserved by another agent (int).
    pub available: FactId,
    /// `DistanceTo<K>`: distance to the nearest available instance (float).
    pub distance: FactId,
    /// `Near<K>`: the nearest available instance is within reach (bool).
    pub near: FactId,
    /// `Holding<K>`: the agent carries one (bool).
    pub holding: FactId,
    /// `Stored<K>`: the stockpile holds at least one (bool).
    pub stored: FactId,
    /// `StockpileHas<K>`: stockpile count (int).
    pub stockpile_count: FactId,
}

impl KindFacts {
    pub fn intern(facts: &FactRegistry, tags: &TagRegistry, kind: &str) -> Self {
        Self {
            name: Arc::from(kind),
            tag: tags.get_id(kind),
            world_has: facts.get_id(&world_has(kind)),
            available: facts.get_id(&available(kind)),
            distance: facts.get_id(&distance_to(kind)),
            near: facts.get_id(&near(kind)),
            holding: facts.get_id(&holding(kind)),
            stored: facts.get_id(&stored(kind)),
            stockpile_count: facts.get_id(&stockpile_count(kind)),
        }
    }
}
