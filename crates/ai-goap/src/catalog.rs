//! Parametrized step catalog.
//!
//! Steps are generated per interaction kind from a [`CatalogDef`], never written out per
//! category. Each [`InteractionTemplate`] knows how to turn the definition into steps for one
//! interaction; new interactions plug in through [`StepCatalog::build_with`] without touching the
//! planner.

use core::fmt;
use std::collections::BTreeSet;

use ai_core::kind::HANDS_EMPTY;
use ai_core::{FactId, FactRegistry, KindFacts, Tag, TagRegistry};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Planner, PlannerConfig, Step, StepCost, StepEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interaction {
    MoveTo,
    PickUp,
    Drop,
    Chop,
    Consume,
    Build,
    Deposit,
    Retrieve,
    Use,
    Mate,
    Wait,
}

impl Interaction {
    pub const fn name(self) -> &'static str {
        match self {
            Interaction::MoveTo => "MoveTo",
            Interaction::PickUp => "PickUp",
            Interaction::Drop => "Drop",
            Interaction::Chop => "Chop",
            Interaction::Consume => "Consume",
            Interaction::Build => "Build",
            Interaction::Deposit => "Deposit",
            Interaction::Retrieve => "Retrieve",
            Interaction::Use => "Use",
            Interaction::Mate => "Mate",
            Interaction::Wait => "Wait",
        }
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Plain-data spec carried by every catalog step; the runtime action factory keys on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepKey {
    pub interaction: Interaction,
    /// Category the step acts on (tree to chop, bed to use, stockpile to visit).
    pub target: Option<Tag>,
    /// Produced or carried category (chop drop, recipe output, deposited item).
    pub item: Option<Tag>,
    /// Drive fact the step resets to `false`.
    pub relieves: Option<FactId>,
    /// Count produced by the step (chop yield).
    pub amount: i32,
}

impl StepKey {
    pub fn new(interaction: Interaction, target: Tag) -> Self {
        Self {
            interaction,
            target: Some(target),
            item: None,
            relieves: None,
            amount: 1,
        }
    }

    /// Step that acts on the agent alone.
    pub fn untargeted(interaction: Interaction) -> Self {
        Self {
            interaction,
            target: None,
            item: None,
            relieves: None,
            amount: 1,
        }
    }

    pub fn with_item(mut self, item: Tag) -> Self {
        self.item = Some(item);
        self
    }

    pub fn relieving(mut self, fact: FactId) -> Self {
        self.relieves = Some(fact);
        self
    }

    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }
}

// --- definition -------------------------------------------------------------------------------

/// A harvestable category that drops items when worked (tree -> stick).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResourceDef {
    pub kind: String,
    pub drop: String,
    #[cfg_attr(feature = "serde", serde(default = "default_yield"))]
    pub yield_count: i32,
}

/// A category consumed from the hand to reset a drive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdibleDef {
    pub kind: String,
    pub relieves: String,
}

/// A structure used in place to reset a drive (bed -> sleepiness).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsableDef {
    pub kind: String,
    pub relieves: String,
}

/// Build `output` in place from one held `input`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecipeDef {
    pub output: String,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StockpileDef {
    pub kind: String,
    pub stores: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MateDef {
    pub partner: String,
    pub relieves: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostTable {
    pub move_base: f32,
    pub move_per_unit: f32,
    /// Move cost when the distance fact is unknown.
    pub move_fallback: f32,
    pub pick_up: f32,
    pub drop: f32,
    pub chop: f32,
    pub consume: f32,
    pub build: f32,
    pub deposit: f32,
    pub retrieve: f32,
    pub use_structure: f32,
    pub mate: f32,
    pub wait: f32,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            move_base: 1.0,
            move_per_unit: 0.1,
            move_fallback: 10.0,
            pick_up: 1.0,
            drop: 1.0,
            chop: 4.0,
            consume: 1.0,
            build: 5.0,
            deposit: 1.0,
            retrieve: 1.0,
            use_structure: 2.0,
            mate: 3.0,
            wait: 1.0,
        }
    }
}

/// World-designer description of the categories agents can interact with.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CatalogDef {
    pub resources: Vec<ResourceDef>,
    /// Extra categories that can be picked up besides resource drops and edibles.
    pub pickups: Vec<String>,
    pub edibles: Vec<EdibleDef>,
    pub usables: Vec<UsableDef>,
    pub recipes: Vec<RecipeDef>,
    pub stockpile: Option<StockpileDef>,
    pub mate: Option<MateDef>,
    /// Fact set by the `Wait` step; enables the idle fallback goal.
    pub idle_fact: Option<String>,
    pub costs: CostTable,
}

#[cfg(feature = "serde")]
fn default_yield() -> i32 {
    1
}

impl CatalogDef {
    /// Every category an agent may need to walk to, in first-mention order.
    pub fn located_kinds(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.resources {
            out.push(&r.kind);
            out.push(&r.drop);
        }
        out.extend(self.pickups.iter().map(String::as_str));
        out.extend(self.edibles.iter().map(|e| e.kind.as_str()));
        out.extend(self.usables.iter().map(|u| u.kind.as_str()));
        for r in &self.recipes {
            out.push(&r.input);
            out.push(&r.output);
        }
        if let Some(stockpile) = &self.stockpile {
            out.push(&stockpile.kind);
        }
        if let Some(mate) = &self.mate {
            out.push(&mate.partner);
        }
        let mut seen = BTreeSet::new();
        out.retain(|kind| seen.insert(*kind));
        out
    }

    /// Categories an agent can carry.
    pub fn carried_kinds(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.resources
            .iter()
            .map(|r| r.drop.as_str())
            .chain(self.pickups.iter().map(String::as_str))
            .chain(self.edibles.iter().map(|e| e.kind.as_str()))
            .filter(|kind| seen.insert(*kind))
            .collect()
    }

    pub fn has_anything(&self) -> bool {
        !self.located_kinds().is_empty() || self.idle_fact.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog defines no steps")]
    Empty,
    #[error("empty category name in {context}")]
    EmptyName { context: &'static str },
    #[error("{context} refers to `{kind}`, which no step can pick up")]
    NotCarried { context: &'static str, kind: String },
    #[error("duplicate step name `{0}`")]
    DuplicateStep(String),
    #[error("invalid cost for {0}")]
    InvalidCost(&'static str),
}

// --- templates --------------------------------------------------------------------------------

/// Resolved registries and definition handed to every template.
pub struct CatalogContext<'a> {
    pub facts: &'a FactRegistry,
    pub tags: &'a TagRegistry,
    pub def: &'a CatalogDef,
}

impl CatalogContext<'_> {
    pub fn kind(&self, name: &str) -> KindFacts {
        KindFacts::intern(self.facts, self.tags, name)
    }

    pub fn fact(&self, name: &str) -> FactId {
        self.facts.get_id(name)
    }

    pub fn costs(&self) -> &CostTable {
        &self.def.costs
    }

    /// `HandsEmpty`: cleared by every step that puts an item in the agent's hands, set by every
    /// step that takes it out.
    pub fn hands_empty(&self) -> FactId {
        self.facts.get_id(HANDS_EMPTY)
    }
}

/// Generates the steps of one interaction kind.
pub trait InteractionTemplate {
    fn interaction(&self) -> Interaction;

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError>;
}

fn step_name(interaction: Interaction, kind: &str) -> String {
    format!("{interaction}({kind})")
}

fn require_name(name: &str, context: &'static str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        Err(CatalogError::EmptyName { context })
    } else {
        Ok(())
    }
}

fn require_carried(def: &CatalogDef, kind: &str, context: &'static str) -> Result<(), CatalogError> {
    if def.carried_kinds().contains(&kind) {
        Ok(())
    } else {
        Err(CatalogError::NotCarried {
            context,
            kind: kind.to_string(),
        })
    }
}

/// Walk to the nearest instance of a category: `Near<K>` becomes true and the distance zero.
/// The agent leaves everything else behind, so every other `Near<J>` becomes false.
pub struct MoveToTemplate;

impl InteractionTemplate for MoveToTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::MoveTo
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        let costs = ctx.costs();
        let located: Vec<KindFacts> = ctx
            .def
            .located_kinds()
            .into_iter()
            .map(|kind| ctx.kind(kind))
            .collect();
        for k in &located {
            let mut step = Step::new(
                step_name(Interaction::MoveTo, &k.name),
                StepKey::new(Interaction::MoveTo, k.tag),
            )
            .requires(k.world_has, true)
            .sets(k.near, true)
            .sets(k.distance, 0.0_f32);
            for other in located.iter().filter(|other| other.tag != k.tag) {
                step = step.sets(other.near, false);
            }
            out.push(step.with_cost(StepCost::Distance {
                fact: k.distance,
                base: costs.move_base,
                per_unit: costs.move_per_unit,
                fallback: costs.move_fallback,
            }));
        }
        Ok(())
    }
}

pub struct PickUpTemplate;

impl InteractionTemplate for PickUpTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::PickUp
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        let hands = ctx.hands_empty();
        for kind in ctx.def.carried_kinds() {
            let k = ctx.kind(kind);
            out.push(
                Step::new(
                    step_name(Interaction::PickUp, kind),
                    StepKey::new(Interaction::PickUp, k.tag).with_item(k.tag),
                )
                .requires(k.world_has, true)
                .requires(k.near, true)
                .requires(hands, true)
                .sets(k.holding, true)
                .sets(hands, false)
                .sets(k.near, false)
                .effect(StepEffect::decrement(k.available, 1))
                .with_cost(StepCost::Fixed(ctx.costs().pick_up)),
            );
        }
        Ok(())
    }
}

/// Put the carried item down where the agent stands, freeing its hands.
pub struct DropTemplate;

impl InteractionTemplate for DropTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Drop
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        let hands = ctx.hands_empty();
        for kind in ctx.def.carried_kinds() {
            let k = ctx.kind(kind);
            out.push(
                Step::new(
                    step_name(Interaction::Drop, kind),
                    StepKey::untargeted(Interaction::Drop).with_item(k.tag),
                )
                .requires(k.holding, true)
                .sets(k.holding, false)
                .sets(hands, true)
                .sets(k.world_has, true)
                .sets(k.near, true)
                .sets(k.distance, 0.0_f32)
                .effect(StepEffect::increment(k.available, 1))
                .with_cost(StepCost::Fixed(ctx.costs().drop)),
            );
        }
        Ok(())
    }
}

/// Work a resource so it drops items nearby.
pub struct ChopTemplate;

impl InteractionTemplate for ChopTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Chop
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        for resource in &ctx.def.resources {
            require_name(&resource.kind, "resource")?;
            require_name(&resource.drop, "resource drop")?;
            let source = ctx.kind(&resource.kind);
            let drop = ctx.kind(&resource.drop);
            let amount = resource.yield_count.max(1);
            out.push(
                Step::new(
                    step_name(Interaction::Chop, &resource.kind),
                    StepKey::new(Interaction::Chop, source.tag)
                        .with_item(drop.tag)
                        .with_amount(amount),
                )
                .requires(source.near, true)
                .sets(drop.world_has, true)
                .effect(StepEffect::increment(drop.available, amount))
                .with_cost(StepCost::Fixed(ctx.costs().chop)),
            );
        }
        Ok(())
    }
}

pub struct ConsumeTemplate;

impl InteractionTemplate for ConsumeTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Consume
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        for edible in &ctx.def.edibles {
            require_name(&edible.kind, "edible")?;
            require_name(&edible.relieves, "edible drive")?;
            let k = ctx.kind(&edible.kind);
            let drive = ctx.fact(&edible.relieves);
            out.push(
                Step::new(
                    step_name(Interaction::Consume, &edible.kind),
                    StepKey::new(Interaction::Consume, k.tag)
                        .with_item(k.tag)
                        .relieving(drive),
                )
                .requires(k.holding, true)
                .sets(k.holding, false)
                .sets(ctx.hands_empty(), true)
                .sets(drive, false)
                .with_cost(StepCost::Fixed(ctx.costs().consume)),
            );
        }
        Ok(())
    }
}

/// Turn one held input into a structure placed where the agent stands.
pub struct BuildTemplate;

impl InteractionTemplate for BuildTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Build
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        for recipe in &ctx.def.recipes {
            require_name(&recipe.output, "recipe output")?;
            require_name(&recipe.input, "recipe input")?;
            require_carried(ctx.def, &recipe.input, "recipe input")?;
            let input = ctx.kind(&recipe.input);
            let output = ctx.kind(&recipe.output);
            out.push(
                Step::new(
                    step_name(Interaction::Build, &recipe.output),
                    StepKey::new(Interaction::Build, output.tag).with_item(input.tag),
                )
                .requires(input.holding, true)
                .sets(input.holding, false)
                .sets(ctx.hands_empty(), true)
                .sets(output.world_has, true)
                .sets(output.near, true)
                .sets(output.distance, 0.0_f32)
                .effect(StepEffect::increment(output.available, 1))
                .with_cost(StepCost::Fixed(ctx.costs().build)),
            );
        }
        Ok(())
    }
}

pub struct DepositTemplate;

impl InteractionTemplate for DepositTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Deposit
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        let Some(stockpile) = &ctx.def.stockpile else {
            return Ok(());
        };
        require_name(&stockpile.kind, "stockpile")?;
        let pile = ctx.kind(&stockpile.kind);
        for item in &stockpile.stores {
            require_carried(ctx.def, item, "stockpile item")?;
            let k = ctx.kind(item);
            out.push(
                Step::new(
                    step_name(Interaction::Deposit, item),
                    StepKey::new(Interaction::Deposit, pile.tag).with_item(k.tag),
                )
                .requires(pile.near, true)
                .requires(k.holding, true)
                .sets(k.holding, false)
                .sets(ctx.hands_empty(), true)
                .sets(k.stored, true)
                .effect(StepEffect::increment(k.stockpile_count, 1))
                .with_cost(StepCost::Fixed(ctx.costs().deposit)),
            );
        }
        Ok(())
    }
}

pub struct RetrieveTemplate;

impl InteractionTemplate for RetrieveTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Retrieve
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        let Some(stockpile) = &ctx.def.stockpile else {
            return Ok(());
        };
        let pile = ctx.kind(&stockpile.kind);
        let hands = ctx.hands_empty();
        for item in &stockpile.stores {
            require_carried(ctx.def, item, "stockpile item")?;
            let k = ctx.kind(item);
            out.push(
                Step::new(
                    step_name(Interaction::Retrieve, item),
                    StepKey::new(Interaction::Retrieve, pile.tag).with_item(k.tag),
                )
                .requires(pile.near, true)
                .requires(k.stored, true)
                .requires(hands, true)
                .sets(k.holding, true)
                .sets(hands, false)
                .effect(StepEffect::decrement(k.stockpile_count, 1))
                .with_cost(StepCost::Fixed(ctx.costs().retrieve)),
            );
        }
        Ok(())
    }
}

/// Use a structure in place (sleep in a bed).
pub struct UseTemplate;

impl InteractionTemplate for UseTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Use
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        for usable in &ctx.def.usables {
            require_name(&usable.kind, "usable")?;
            require_name(&usable.relieves, "usable drive")?;
            let k = ctx.kind(&usable.kind);
            let drive = ctx.fact(&usable.relieves);
            out.push(
                Step::new(
                    step_name(Interaction::Use, &usable.kind),
                    StepKey::new(Interaction::Use, k.tag).relieving(drive),
                )
                .requires(k.near, true)
                .sets(drive, false)
                .with_cost(StepCost::Fixed(ctx.costs().use_structure)),
            );
        }
        Ok(())
    }
}

pub struct MateTemplate;

impl InteractionTemplate for MateTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Mate
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        let Some(mate) = &ctx.def.mate else {
            return Ok(());
        };
        require_name(&mate.partner, "mate partner")?;
        require_name(&mate.relieves, "mate drive")?;
        let partner = ctx.kind(&mate.partner);
        let drive = ctx.fact(&mate.relieves);
        out.push(
            Step::new(
                step_name(Interaction::Mate, &mate.partner),
                StepKey::new(Interaction::Mate, partner.tag).relieving(drive),
            )
            .requires(partner.near, true)
            .sets(drive, false)
            .with_cost(StepCost::Fixed(ctx.costs().mate)),
        );
        Ok(())
    }
}

pub struct WaitTemplate;

impl InteractionTemplate for WaitTemplate {
    fn interaction(&self) -> Interaction {
        Interaction::Wait
    }

    fn generate(
        &self,
        ctx: &CatalogContext<'_>,
        out: &mut Vec<Step<StepKey>>,
    ) -> Result<(), CatalogError> {
        let Some(idle) = &ctx.def.idle_fact else {
            return Ok(());
        };
        require_name(idle, "idle fact")?;
        let fact = ctx.fact(idle);
        out.push(
            Step::new("Wait", StepKey::untargeted(Interaction::Wait))
                .sets(fact, true)
                .with_cost(StepCost::Fixed(ctx.costs().wait)),
        );
        Ok(())
    }
}

/// Templates for every built-in interaction, in catalog order.
pub fn builtin_templates() -> Vec<Box<dyn InteractionTemplate>> {
    vec![
        Box::new(MoveToTemplate),
        Box::new(PickUpTemplate),
        Box::new(DropTemplate),
        Box::new(ChopTemplate),
        Box::new(ConsumeTemplate),
        Box::new(BuildTemplate),
        Box::new(DepositTemplate),
        Box::new(RetrieveTemplate),
        Box::new(UseTemplate),
        Box::new(MateTemplate),
        Box::new(WaitTemplate),
    ]
}

// --- catalog ----------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StepCatalog {
    steps: Vec<Step<StepKey>>,
    kinds: Vec<KindFacts>,
}

impl StepCatalog {
    pub fn build(
        facts: &FactRegistry,
        tags: &TagRegistry,
        def: &CatalogDef,
    ) -> Result<Self, CatalogError> {
        let templates = builtin_templates();
        let refs: Vec<&dyn InteractionTemplate> = templates.iter().map(|t| t.as_ref()).collect();
        Self::build_with(facts, tags, def, &refs)
    }

    pub fn build_with(
        facts: &FactRegistry,
        tags: &TagRegistry,
        def: &CatalogDef,
        templates: &[&dyn InteractionTemplate],
    ) -> Result<Self, CatalogError> {
        validate_costs(&def.costs)?;
        for kind in def.located_kinds() {
            require_name(kind, "category")?;
        }

        let ctx = CatalogContext { facts, tags, def };
        let mut steps = Vec::new();
        for template in templates {
            let before = steps.len();
            template.generate(&ctx, &mut steps)?;
            tracing::debug!(
                interaction = %template.interaction(),
                steps = steps.len() - before,
                "catalog template expanded"
            );
        }

        if steps.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut names = BTreeSet::new();
        for step in &steps {
            if !names.insert(step.name.clone()) {
                return Err(CatalogError::DuplicateStep(step.name.to_string()));
            }
        }

        let kinds = def
            .located_kinds()
            .into_iter()
            .map(|kind| ctx.kind(kind))
            .collect();

        Ok(Self { steps, kinds })
    }

    pub fn steps(&self) -> &[Step<StepKey>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Step<StepKey>> {
        self.steps.iter().find(|s| &*s.name == name)
    }

    /// Fact families of every category the agent may need to locate; the scanner covers these.
    pub fn kinds(&self) -> &[KindFacts] {
        &self.kinds
    }

    pub fn planner(&self, config: PlannerConfig) -> Planner<StepKey> {
        Planner::new(self.steps.clone()).with_config(config)
    }

    pub fn into_planner(self, config: PlannerConfig) -> Planner<StepKey> {
        Planner::new(self.steps).with_config(config)
    }
}

fn validate_costs(costs: &CostTable) -> Result<(), CatalogError> {
    let entries = [
        (costs.move_base, "move_base"),
        (costs.move_per_unit, "move_per_unit"),
        (costs.move_fallback, "move_fallback"),
        (costs.pick_up, "pick_up"),
        (costs.drop, "drop"),
        (costs.chop, "chop"),
        (costs.consume, "consume"),
        (costs.build, "build"),
        (costs.deposit, "deposit"),
        (costs.retrieve, "retrieve"),
        (costs.use_structure, "use_structure"),
        (costs.mate, "mate"),
        (costs.wait, "wait"),
    ];
    for (value, name) in entries {
        if !value.is_finite() || value < 0.0 {
            return Err(CatalogError::InvalidCost(name));
        }
    }
    Ok(())
}
