//! Utility-driven goal selection.
//!
//! Goals are scored against an agent context and the highest-scoring eligible goal wins. Selection
//! is event-driven (plan outcomes from the planning coordinator), never timer-driven, and
//! tie-breaking is stable by registration order for determinism.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod goal;
pub mod selector;

pub use goal::{Goal, UtilityGoal};
pub use selector::{Selection, SelectorConfig, SelectorError, UtilityGoalSelector};
