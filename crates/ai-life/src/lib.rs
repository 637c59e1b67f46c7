//! Life-simulation domain on top of the planning stack.
//!
//! - [`world::LifeWorld`] extends the core world traits with drives, inventory, stockpiles and
//!   poses.
//! - [`actions`] and [`factory::LifeActionFactory`] turn catalog steps into runtime actions.
//! - [`goals`] derives one drive-relief goal per drive plus the idle fallback.
//! - [`brain::LifeRuntime`] owns what agents share; [`brain::LifeAgent`] runs the per-tick
//!   cache, coordinator and selector pipeline.
//! - [`sandbox::SandboxWorld`] is a small in-memory world for tests and benches.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod actions;
pub mod brain;
pub mod catalog;
pub mod config;
pub mod contributor;
pub mod error;
pub mod factory;
pub mod goals;
pub mod sandbox;
pub mod world;

pub use brain::{tick_agents, LifeAgent, LifeRuntime};
pub use catalog::default_catalog;
pub use config::{ActionTuning, AgentConfig, GoalsConfig, JobsConfig};
pub use contributor::LifeContributor;
pub use error::{ConfigError, LifeError};
pub use factory::{ActionContext, LifeActionFactory};
pub use goals::{life_goals, DriveGoal, IDLE_GOAL};
pub use sandbox::SandboxWorld;
pub use world::{LifeWorld, Pose};
