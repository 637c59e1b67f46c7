//! Agent configuration, loaded from YAML.
//!
//! Every section is optional; missing keys take the defaults below. [`AgentConfig::validate`]
//! rejects values that would make the pipeline misbehave (zero radii, negative intervals).

use std::collections::BTreeMap;
use std::path::Path;

use ai_goap::{CatalogDef, CoordinatorConfig, PlannerConfig};
use ai_perception::{CacheConfig, ScannerConfig};
use ai_utility::SelectorConfig;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, default_catalog};
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub planner: PlannerSection,
    pub coordinator: CoordinatorSection,
    pub selector: SelectorSection,
    pub cache: CacheSection,
    pub scanner: ScannerSection,
    pub actions: ActionTuning,
    pub goals: GoalsConfig,
    pub jobs: JobsConfig,
    /// Categories and interactions agents plan over.
    #[serde(default = "default_catalog")]
    pub catalog: CatalogDef,
    /// Facts of the world-wide shared store mirrored into every agent's state.
    pub shared_facts: Vec<String>,
    /// Facts whose change since the last planning triggers a replan.
    pub watched_facts: Vec<String>,
    /// Keep an in-memory trace log per agent.
    pub trace: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            planner: PlannerSection::default(),
            coordinator: CoordinatorSection::default(),
            selector: SelectorSection::default(),
            cache: CacheSection::default(),
            scanner: ScannerSection::default(),
            actions: ActionTuning::default(),
            goals: GoalsConfig::default(),
            jobs: JobsConfig::default(),
            catalog: default_catalog(),
            shared_facts: Vec::new(),
            watched_facts: Vec::new(),
            trace: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerSection {
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
    #[serde(default = "default_max_frontier")]
    pub max_frontier: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            max_expansions: default_max_expansions(),
            max_frontier: default_max_frontier(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_expansions() -> usize {
    4096
}
fn default_max_frontier() -> usize {
    16_384
}
fn default_max_depth() -> usize {
    24
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorSection {
    #[serde(default = "default_min_replan_interval")]
    pub min_replan_interval: f32,
    #[serde(default = "default_failure_backoff_threshold")]
    pub failure_backoff_threshold: u32,
    #[serde(default = "default_backoff_interval")]
    pub backoff_interval: f32,
    #[serde(default = "default_stuck_timeout")]
    pub stuck_timeout: f32,
}

impl Default for CoordinatorSection {
    fn default() -> Self {
        Self {
            min_replan_interval: default_min_replan_interval(),
            failure_backoff_threshold: default_failure_backoff_threshold(),
            backoff_interval: default_backoff_interval(),
            stuck_timeout: default_stuck_timeout(),
        }
    }
}

fn default_min_replan_interval() -> f32 {
    0.5
}
fn default_failure_backoff_threshold() -> u32 {
    3
}
fn default_backoff_interval() -> f32 {
    2.0
}
fn default_stuck_timeout() -> f32 {
    5.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectorSection {
    #[serde(default = "default_hysteresis")]
    pub hysteresis: f32,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    #[serde(default = "default_plan_failure_cooldown")]
    pub plan_failure_cooldown: f32,
    #[serde(default = "default_execution_failure_cooldown")]
    pub execution_failure_cooldown: f32,
}

impl Default for SelectorSection {
    fn default() -> Self {
        Self {
            hysteresis: default_hysteresis(),
            min_score: default_min_score(),
            plan_failure_cooldown: default_plan_failure_cooldown(),
            execution_failure_cooldown: default_execution_failure_cooldown(),
        }
    }
}

fn default_hysteresis() -> f32 {
    0.1
}
fn default_min_score() -> f32 {
    0.01
}
fn default_plan_failure_cooldown() -> f32 {
    5.0
}
fn default_execution_failure_cooldown() -> f32 {
    3.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_dirty_interval")]
    pub dirty_interval: f32,
    #[serde(default = "default_steady_interval")]
    pub steady_interval: f32,
    #[serde(default = "default_event_radius")]
    pub event_radius: f32,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            dirty_interval: default_dirty_interval(),
            steady_interval: default_steady_interval(),
            event_radius: default_event_radius(),
        }
    }
}

fn default_dirty_interval() -> f32 {
    0.1
}
fn default_steady_interval() -> f32 {
    0.5
}
fn default_event_radius() -> f32 {
    25.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScannerSection {
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_reach")]
    pub reach: f32,
}

impl Default for ScannerSection {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            max_results: default_max_results(),
            reach: default_reach(),
        }
    }
}

fn default_radius() -> f32 {
    20.0
}
fn default_max_results() -> usize {
    32
}
fn default_reach() -> f32 {
    1.5
}

/// Durations and speeds of the runtime actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTuning {
    /// Units per second.
    pub move_speed: f32,
    pub chop_seconds: f32,
    pub consume_seconds: f32,
    pub build_seconds: f32,
    pub use_seconds: f32,
    pub mate_seconds: f32,
    pub wait_seconds: f32,
    /// Seconds between runtime guard checks.
    pub validity_interval: f32,
}

impl Default for ActionTuning {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            chop_seconds: 2.0,
            consume_seconds: 1.0,
            build_seconds: 3.0,
            use_seconds: 4.0,
            mate_seconds: 3.0,
            wait_seconds: 1.0,
            validity_interval: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalsConfig {
    /// Utility of relieving an active drive, by drive fact name.
    pub weights: BTreeMap<String, f32>,
    /// Weight of drives missing from `weights`.
    pub default_weight: f32,
    pub idle_utility: f32,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        let weights = [
            (catalog::HUNGER, 0.9),
            (catalog::SLEEPINESS, 0.8),
            (catalog::MATING_URGE, 0.5),
        ]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();
        Self {
            weights,
            default_weight: 0.5,
            idle_utility: 0.05,
        }
    }
}

impl GoalsConfig {
    pub fn weight(&self, drive: &str) -> f32 {
        self.weights.get(drive).copied().unwrap_or(self.default_weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Planning worker threads. `0` plans inline on the tick thread.
    pub threads: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self { threads: 2 }
    }
}

impl AgentConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "agent config loaded");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("planner.max_expansions", self.planner.max_expansions as f32)?;
        positive("planner.max_frontier", self.planner.max_frontier as f32)?;
        positive("planner.max_depth", self.planner.max_depth as f32)?;

        non_negative("coordinator.min_replan_interval", self.coordinator.min_replan_interval)?;
        non_negative("coordinator.backoff_interval", self.coordinator.backoff_interval)?;
        positive("coordinator.stuck_timeout", self.coordinator.stuck_timeout)?;

        non_negative("selector.hysteresis", self.selector.hysteresis)?;
        finite("selector.min_score", self.selector.min_score)?;
        non_negative("selector.plan_failure_cooldown", self.selector.plan_failure_cooldown)?;
        non_negative(
            "selector.execution_failure_cooldown",
            self.selector.execution_failure_cooldown,
        )?;

        positive("cache.dirty_interval", self.cache.dirty_interval)?;
        positive("cache.steady_interval", self.cache.steady_interval)?;
        positive("cache.event_radius", self.cache.event_radius)?;
        if self.cache.dirty_interval > self.cache.steady_interval {
            return Err(ConfigError::invalid(
                "cache.dirty_interval",
                "must not exceed cache.steady_interval",
            ));
        }

        positive("scanner.radius", self.scanner.radius)?;
        positive("scanner.max_results", self.scanner.max_results as f32)?;
        positive("scanner.reach", self.scanner.reach)?;

        positive("actions.move_speed", self.actions.move_speed)?;
        non_negative("actions.chop_seconds", self.actions.chop_seconds)?;
        non_negative("actions.consume_seconds", self.actions.consume_seconds)?;
        non_negative("actions.build_seconds", self.actions.build_seconds)?;
        non_negative("actions.use_seconds", self.actions.use_seconds)?;
        non_negative("actions.mate_seconds", self.actions.mate_seconds)?;
        non_negative("actions.wait_seconds", self.actions.wait_seconds)?;
        non_negative("actions.validity_interval", self.actions.validity_interval)?;

        for weight in self.goals.weights.values() {
            finite("goals.weights", *weight)?;
        }
        finite("goals.default_weight", self.goals.default_weight)?;
        finite("goals.idle_utility", self.goals.idle_utility)?;
        Ok(())
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            max_expansions: self.planner.max_expansions,
            max_frontier: self.planner.max_frontier,
            max_depth: self.planner.max_depth,
        }
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            min_replan_interval: self.coordinator.min_replan_interval,
            failure_backoff_threshold: self.coordinator.failure_backoff_threshold,
            backoff_interval: self.coordinator.backoff_interval,
            stuck_timeout: self.coordinator.stuck_timeout,
        }
    }

    pub fn selector_config(&self) -> SelectorConfig {
        SelectorConfig {
            hysteresis: self.selector.hysteresis,
            min_score: self.selector.min_score,
            plan_failure_cooldown: self.selector.plan_failure_cooldown,
            execution_failure_cooldown: self.selector.execution_failure_cooldown,
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            dirty_interval: self.cache.dirty_interval,
            steady_interval: self.cache.steady_interval,
            event_radius: self.cache.event_radius,
        }
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            radius: self.scanner.radius,
            max_results: self.scanner.max_results,
            reach: self.scanner.reach,
        }
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is not finite")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::invalid(field, format!("{value} must be positive")));
    }
    Ok(())
}
