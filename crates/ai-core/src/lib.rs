//! Engine-agnostic agent kernel primitives.
//!
//! Facts and states, the action lifecycle, plans, exclusive reservations and the typed event bus
//! shared by the planning and goal-selection crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod agent;
pub mod event;
pub mod fact;
pub mod intern;
pub mod kind;
pub mod math;
pub mod plan;
pub mod reservation;
pub mod shared;
pub mod state;
pub mod tick;
pub mod world;

pub use action::{Action, ActionError, ActionPhase, ActionSlot, ActionStatus, ExitReason};
pub use agent::{EntityId, GoalId};
pub use event::{AgentEvent, EventBus, SubscriptionId};
pub use fact::{FactId, FactRegistry, FactValue};
pub use intern::{Interner, Tag, TagRegistry};
pub use kind::KindFacts;
pub use math::Vec2;
pub use plan::{ActionFactory, Plan, PlanSpec, PlanStatus};
pub use reservation::{Claim, ReservationTable};
pub use shared::SharedFactStore;
pub use state::{State, StateDisplay};
pub use tick::TickContext;
pub use world::{CircleQuery, WorldEvent, WorldMut, WorldView};
