use ai_core::{FactId, FactValue, State};
use ai_goap::{PlanError, Planner, PlannerConfig, Step, StepCost, StepEffect};
use proptest::prelude::*;

const FACTS: u32 = 6;
const COUNTER: FactId = FactId(FACTS);

#[derive(Debug, Clone)]
struct StepDef {
    pre: Vec<(u32, bool)>,
    sets: Vec<(u32, bool)>,
    bump: Option<i32>,
    cost: f32,
}

fn step_def() -> impl Strategy<Value = StepDef> {
    (
        prop::collection::vec((0..FACTS, any::<bool>()), 0..3),
        prop::collection::vec((0..FACTS, any::<bool>()), 1..3),
        prop::option::of(-2..3i32),
        0.0f32..5.0,
    )
        .prop_map(|(pre, sets, bump, cost)| StepDef {
            pre,
            sets,
            bump,
            cost,
        })
}

fn state_of(entries: &[(u32, bool)]) -> State {
    entries
        .iter()
        .map(|&(fact, value)| (FactId(fact), FactValue::Bool(value)))
        .collect()
}

fn build(defs: &[StepDef], config: PlannerConfig) -> Planner<usize> {
    let steps = defs
        .iter()
        .enumerate()
        .map(|(i, def)| {
            let mut step = Step::new(format!("s{i}"), i).with_cost(StepCost::Fixed(def.cost));
            for &(fact, value) in &def.pre {
                step = step.requires(FactId(fact), value);
            }
            for &(fact, value) in &def.sets {
                step = step.sets(FactId(fact), value);
            }
            match def.bump {
                Some(by) if by >= 0 => step = step.effect(StepEffect::increment(COUNTER, by)),
                Some(by) => step = step.effect(StepEffect::decrement(COUNTER, -by)),
                None => {}
            }
            step
        })
        .collect();
    Planner::new(steps).with_config(config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn returned_plans_are_sound(
        defs in prop::collection::vec(step_def(), 1..8),
        start in prop::collection::vec((0..FACTS, any::<bool>()), 0..4),
        goal in prop::collection::vec((0..FACTS, any::<bool>()), 1..3),
    ) {
        let config = PlannerConfig { max_expansions: 2_000, max_frontier: 4_000, max_depth: 12 };
        let planner = build(&defs, config);
        let start = state_of(&start);
        let goal = state_of(&goal);

        match planner.search(&start, &goal) {
            Ok(result) => {
                prop_assert!(result.expansions <= config.max_expansions);
                prop_assert!(result.steps.len() <= config.max_depth);
                let mut state = start.clone();
                let mut cost = 0.0f32;
                for &i in &result.steps {
                    let step = &planner.steps()[i];
                    prop_assert!(step.is_applicable(&state));
                    cost += step.cost(&state);
                    state = step.apply(&state);
                }
                prop_assert!(state.satisfies(&goal));
                prop_assert!((cost - result.cost).abs() < 1e-3);
            }
            Err(PlanError::NoPath { expansions }) => {
                prop_assert!(expansions <= config.max_expansions);
            }
            Err(PlanError::ExpansionLimit { limit }) => prop_assert_eq!(limit, config.max_expansions),
            Err(PlanError::FrontierLimit { limit }) => prop_assert_eq!(limit, config.max_frontier),
        }
    }

    #[test]
    fn search_is_deterministic(
        defs in prop::collection::vec(step_def(), 1..6),
        goal in prop::collection::vec((0..FACTS, any::<bool>()), 1..3),
    ) {
        let planner = build(&defs, PlannerConfig::default());
        let goal = state_of(&goal);
        prop_assert_eq!(
            planner.search(&State::new(), &goal),
            planner.search(&State::new(), &goal)
        );
    }

    #[test]
    fn cloned_state_is_independent(
        entries in prop::collection::vec((0..FACTS, any::<bool>()), 0..6),
        fact in 0..FACTS,
    ) {
        let source = state_of(&entries);
        let before = source.clone();
        let mut copy = source.clone();
        copy.set(FactId(fact), 42);
        copy.remove(FactId((fact + 1) % FACTS));
        prop_assert_eq!(source, before);
    }
}
