//! Umbrella crate that re-exports the `ai-*` building blocks.
//!
//! Enable only the layers you need: `core` alone gives the fact/state/action kernel, `goap` adds
//! planning, `life` pulls in the whole agent pipeline with its reference world.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ai_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use ai_tools as tools;

#[cfg(feature = "goap")]
#[cfg_attr(docsrs, doc(cfg(feature = "goap")))]
pub use ai_goap as goap;

#[cfg(feature = "utility")]
#[cfg_attr(docsrs, doc(cfg(feature = "utility")))]
pub use ai_utility as utility;

#[cfg(feature = "perception")]
#[cfg_attr(docsrs, doc(cfg(feature = "perception")))]
pub use ai_perception as perception;

#[cfg(feature = "life")]
#[cfg_attr(docsrs, doc(cfg(feature = "life")))]
pub use ai_life as life;
