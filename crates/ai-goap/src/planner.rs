use core::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use ai_core::{PlanSpec, State};
use thiserror::Error;

use crate::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Maximum number of states popped from the frontier.
    pub max_expansions: usize,
    /// Maximum number of queued frontier entries.
    pub max_frontier: usize,
    /// Maximum plan length; deeper states are not expanded.
    pub max_depth: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 4096,
            max_frontier: 16_384,
            max_depth: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("no plan reaches the goal ({expansions} states expanded)")]
    NoPath { expansions: usize },
    #[error("expansion limit of {limit} reached")]
    ExpansionLimit { limit: usize },
    #[error("frontier limit of {limit} reached")]
    FrontierLimit { limit: usize },
}

/// Raw search result: indices into [`Planner::steps`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub steps: Vec<usize>,
    pub cost: f32,
    pub expansions: usize,
}

/// Forward state-space planner (uniform-cost search over canonical states).
///
/// Pure: it only reads its arguments and its own immutable step list, so a shared `Arc<Planner>`
/// can serve any number of concurrent searches.
#[derive(Debug, Clone)]
pub struct Planner<S> {
    steps: Vec<Step<S>>,
    config: PlannerConfig,
}

struct Node {
    state: State,
    parent: Option<usize>,
    step: usize,
    g: f32,
    depth: usize,
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    g: f32,
    tie: u64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other
            .g
            .total_cmp(&self.g)
            .then_with(|| other.tie.cmp(&self.tie))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
struct Visit {
    g: f32,
    closed: bool,
}

impl<S> Planner<S> {
    pub fn new(steps: Vec<Step<S>>) -> Self {
        Self {
            steps,
            config: PlannerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn steps(&self) -> &[Step<S>] {
        &self.steps
    }

    pub fn config(&self) -> PlannerConfig {
        self.config
    }

    pub fn search(&self, start: &State, goal: &State) -> Result<SearchResult, PlanError> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut open = BinaryHeap::<OpenEntry>::new();
        let mut visits: BTreeMap<State, Visit> = BTreeMap::new();
        let mut tie: u64 = 0;

        nodes.push(Node {
            state: start.clone(),
            parent: None,
            step: usize::MAX,
            g: 0.0,
            depth: 0,
        });
        visits.insert(
            start.clone(),
            Visit {
                g: 0.0,
                closed: false,
            },
        );
        open.push(OpenEntry {
            g: 0.0,
            tie,
            node: 0,
        });
        tie += 1;

        let mut expansions: usize = 0;

        while let Some(entry) = open.pop() {
            let node_index = entry.node;
            let (g, depth) = (nodes[node_index].g, nodes[node_index].depth);

            match visits.get_mut(&nodes[node_index].state) {
                Some(visit) if visit.closed || visit.g < g => continue, // stale heap entry
                Some(visit) => visit.closed = true,
                None => continue,
            }

            // Goal test before the budget check.
            if nodes[node_index].state.satisfies(goal) {
                let mut steps = Vec::with_capacity(depth);
                let mut cursor = node_index;
                while let Some(parent) = nodes[cursor].parent {
                    steps.push(nodes[cursor].step);
                    cursor = parent;
                }
                steps.reverse();
                return Ok(SearchResult {
                    steps,
                    cost: g,
                    expansions,
                });
            }

            expansions += 1;
            if expansions > self.config.max_expansions {
                return Err(PlanError::ExpansionLimit {
                    limit: self.config.max_expansions,
                });
            }

            if depth >= self.config.max_depth {
                continue;
            }

            for (step_index, step) in self.steps.iter().enumerate() {
                let state = &nodes[node_index].state;
                if !step.is_applicable(state) {
                    continue;
                }
                let next = step.apply(state);
                if next == *state {
                    continue;
                }

                let next_g = g + step.cost(state);
                match visits.get(&next) {
                    Some(visit) if visit.closed || next_g >= visit.g => continue,
                    _ => {}
                }

                visits.insert(
                    next.clone(),
                    Visit {
                        g: next_g,
                        closed: false,
                    },
                );
                nodes.push(Node {
                    state: next,
                    parent: Some(node_index),
                    step: step_index,
                    g: next_g,
                    depth: depth + 1,
                });
                open.push(OpenEntry {
                    g: next_g,
                    tie,
                    node: nodes.len() - 1,
                });
                tie += 1;

                if open.len() > self.config.max_frontier {
                    return Err(PlanError::FrontierLimit {
                        limit: self.config.max_frontier,
                    });
                }
            }
        }

        Err(PlanError::NoPath { expansions })
    }
}

impl<S> Planner<S>
where
    S: Clone,
{
    pub fn plan(&self, start: &State, goal: &State) -> Result<PlanSpec<S>, PlanError> {
        let result = self.search(start, goal)?;
        let specs = result
            .steps
            .iter()
            .map(|&i| self.steps[i].spec.clone())
            .collect();
        Ok(PlanSpec::new(specs, result.cost))
    }
}
