use ai_core::{CircleQuery, EntityId, FactId, KindFacts, State, Tag};
use ai_perception::StateContributor;

use crate::LifeWorld;

/// Writes the agent's own facts: drives, `HandsEmpty`, `Holding<K>` for carried categories, and
/// the `Stored<K>`/`StockpileHas<K>` counts of the nearest stockpile in range.
#[derive(Debug, Clone)]
pub struct LifeContributor {
    drives: Vec<FactId>,
    hands_empty: FactId,
    carried: Vec<KindFacts>,
    stockpile: Option<Tag>,
    radius: f32,
}

impl LifeContributor {
    pub fn new(
        drives: impl IntoIterator<Item = FactId>,
        hands_empty: FactId,
        carried: impl IntoIterator<Item = KindFacts>,
        stockpile: Option<Tag>,
        radius: f32,
    ) -> Self {
        Self {
            drives: drives.into_iter().collect(),
            hands_empty,
            carried: carried.into_iter().collect(),
            stockpile,
            radius,
        }
    }

    fn nearest_stockpile<W: LifeWorld + ?Sized>(&self, agent: EntityId, world: &W) -> Option<EntityId> {
        let tag = self.stockpile?;
        let origin = world.position(agent)?;
        let query = CircleQuery::new(origin, self.radius).with_tag(tag);
        let mut found = Vec::new();
        world.query_circle(&query, &mut found);
        found
            .into_iter()
            .filter(|&e| world.is_alive(e))
            .filter_map(|e| world.position(e).map(|p| (e, origin.distance(p))))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(e, _)| e)
    }
}

impl<W: LifeWorld + ?Sized> StateContributor<W> for LifeContributor {
    fn name(&self) -> &str {
        "life"
    }

    fn contribute(&mut self, agent: EntityId, world: &W, out: &mut State) {
        for &drive in &self.drives {
            match world.drive(agent, drive) {
                Some(active) => out.set(drive, active),
                None => {
                    out.remove(drive);
                }
            }
        }

        let held = world.held(agent);
        out.set(self.hands_empty, held.is_none());
        for kind in &self.carried {
            out.set(kind.holding, held == Some(kind.tag));
        }

        let pile = self.nearest_stockpile(agent, world);
        for kind in &self.carried {
            let count = pile.map_or(0, |p| world.stockpile_count(p, kind.tag));
            let count = i32::try_from(count).unwrap_or(i32::MAX);
            out.set(kind.stockpile_count, count);
            out.set(kind.stored, count > 0);
        }
    }
}
