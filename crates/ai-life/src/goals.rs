//! Concrete goals: relieve each drive, or idle.

use ai_core::{FactId, FactRegistry, GoalId, State, Tag, TagRegistry};
use ai_goap::CatalogDef;
use ai_utility::{Goal, UtilityGoal};

use crate::catalog;
use crate::GoalsConfig;

pub const IDLE_GOAL: GoalId = GoalId(0);

/// Bring a boolean drive back to `false`.
///
/// Worth `weight` while the drive is active and nothing otherwise; satisfied once the drive is
/// known to be off. An unknown drive is neither.
#[derive(Debug, Clone)]
pub struct DriveGoal {
    id: GoalId,
    name: String,
    drive: FactId,
    weight: f32,
    interest: Vec<Tag>,
}

impl DriveGoal {
    pub fn new(id: GoalId, name: impl Into<String>, drive: FactId, weight: f32) -> Self {
        Self {
            id,
            name: name.into(),
            drive,
            weight,
            interest: Vec::new(),
        }
    }

    pub fn with_interest(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.interest = tags.into_iter().collect();
        self
    }

    pub fn drive(&self) -> FactId {
        self.drive
    }
}

impl Goal<State> for DriveGoal {
    fn id(&self) -> GoalId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn utility(&self, state: &State) -> f32 {
        if state.get_bool(self.drive) == Some(true) {
            self.weight
        } else {
            0.0
        }
    }

    fn goal_state(&self, _state: &State) -> State {
        State::new().with(self.drive, false)
    }

    fn is_satisfied(&self, state: &State) -> bool {
        state.get_bool(self.drive) == Some(false)
    }

    fn interest_tags(&self) -> &[Tag] {
        &self.interest
    }
}

/// Drive goals for every drive the catalog can relieve, in first-mention order starting at
/// `GoalId(1)`. Interest tags cover each drive's whole supply chain.
pub fn drive_goals(
    facts: &FactRegistry,
    tags: &TagRegistry,
    def: &CatalogDef,
    config: &GoalsConfig,
) -> Vec<DriveGoal> {
    catalog::drives(def)
        .into_iter()
        .zip(1u32..)
        .map(|(drive, id)| {
            let interest = catalog::relevant_kinds(def, drive)
                .into_iter()
                .map(|kind| tags.get_id(kind));
            DriveGoal::new(
                GoalId(id),
                format!("Relieve({drive})"),
                facts.get_id(drive),
                config.weight(drive),
            )
            .with_interest(interest)
        })
        .collect()
}

/// The idle fallback: keep making `idle_fact` true with a small constant utility.
pub fn idle_goal(idle_fact: Option<FactId>, utility: f32) -> UtilityGoal<State> {
    UtilityGoal::new(
        IDLE_GOAL,
        "Idle",
        move |_: &State| utility,
        move |_: &State| match idle_fact {
            Some(fact) => State::new().with(fact, true),
            None => State::new(),
        },
    )
}

/// The full goal registry: idle fallback first, then one goal per drive.
pub fn life_goals(
    facts: &FactRegistry,
    tags: &TagRegistry,
    def: &CatalogDef,
    config: &GoalsConfig,
) -> Vec<Box<dyn Goal<State>>> {
    let idle_fact = def.idle_fact.as_deref().map(|name| facts.get_id(name));
    let mut goals: Vec<Box<dyn Goal<State>>> =
        vec![Box::new(idle_goal(idle_fact, config.idle_utility))];
    for goal in drive_goals(facts, tags, def, config) {
        goals.push(Box::new(goal));
    }
    goals
}
