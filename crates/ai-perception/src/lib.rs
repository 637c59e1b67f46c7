//! Agent perception: turning the live world into planner facts.
//!
//! [`ProximityScanner`] runs radius-bounded queries per category and writes the proximity facts
//! ([`ai_core::kind`]). [`AgentStateCache`] combines the scan with [`StateContributor`]s (drives,
//! inventory, shared facts) and decides when the combined state must be rebuilt.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod cache;
pub mod scanner;

pub use cache::{AgentStateCache, CacheConfig, FnContributor, SharedFactsContributor, StateContributor};
pub use scanner::{nearest_available, ProximityScanner, ScanReport, ScannerConfig};
