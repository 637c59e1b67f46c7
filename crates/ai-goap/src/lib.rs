//! Goal-oriented action planning over interned fact states.
//!
//! - [`Step`]s describe planning-time actions with a closed set of [`Effect`]s.
//! - [`StepCatalog`] expands a category definition into steps, one template per interaction.
//! - [`Planner`] is a bounded uniform-cost search producing `ai-core` plan specs.
//! - [`PlanningPool`] runs searches off the tick thread; [`PlanningCoordinator`] owns the
//!   per-agent job and plan lifecycle.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod coordinator;
pub mod jobs;
pub mod planner;
pub mod step;

pub use catalog::{
    builtin_templates, CatalogContext, CatalogDef, CatalogError, CostTable, EdibleDef,
    Interaction, InteractionTemplate, MateDef, RecipeDef, ResourceDef, StepCatalog, StepKey,
    StockpileDef, UsableDef,
};
pub use coordinator::{CoordinatorConfig, CoordinatorState, CoordinatorStats, PlanningCoordinator};
pub use jobs::{JobOutcome, PlanningJob, PlanningPool, PoolError};
pub use planner::{PlanError, Planner, PlannerConfig, SearchResult};
pub use step::{Effect, Step, StepCost, StepEffect};
