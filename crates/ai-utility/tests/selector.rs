use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use ai_core::{AgentEvent, FactId, GoalId, State};
use ai_utility::{Goal, SelectorConfig, SelectorError, UtilityGoal, UtilityGoalSelector};

/// Agent view used by the tests: utilities per goal index.
struct Drives {
    scores: Vec<f32>,
    satisfied: Vec<bool>,
}

impl Drives {
    fn new(scores: &[f32]) -> Self {
        Self {
            scores: scores.to_vec(),
            satisfied: vec![false; scores.len()],
        }
    }
}

const IDLE: GoalId = GoalId(0);
const EAT: GoalId = GoalId(1);
const SLEEP: GoalId = GoalId(2);

fn goal(id: GoalId, index: usize) -> Box<dyn Goal<Drives>> {
    Box::new(
        UtilityGoal::new(
            id,
            format!("goal{}", id.0),
            move |d: &Drives| d.scores[index],
            move |_| State::new().with(FactId(id.0), true),
        )
        .with_satisfied(move |d: &Drives| d.satisfied[index]),
    )
}

fn selector() -> UtilityGoalSelector<Drives> {
    UtilityGoalSelector::new(vec![goal(IDLE, 0), goal(EAT, 1), goal(SLEEP, 2)], IDLE)
        .unwrap()
        .with_config(SelectorConfig {
            hysteresis: 0.2,
            min_score: 0.0,
            plan_failure_cooldown: 5.0,
            execution_failure_cooldown: 3.0,
        })
}

#[test]
fn highest_utility_wins_and_carries_its_goal_state() {
    let mut sel = selector();
    let pick = sel.evaluate(&Drives::new(&[0.05, 0.4, 0.9]), 0.0);
    assert_eq!(pick.goal, SLEEP);
    assert!(pick.changed);
    assert!(!pick.fallback);
    assert_eq!(pick.goal_state, State::new().with(FactId(2), true));
    assert_eq!(sel.current(), Some(SLEEP));
    assert_eq!(sel.last_scores().len(), 3);
}

#[test]
fn unchanged_utilities_keep_the_selection() {
    let mut sel = selector();
    let drives = Drives::new(&[0.05, 0.5, 0.6]);
    let first = sel.evaluate(&drives, 0.0);
    let second = sel.evaluate(&drives, 1.0);
    assert_eq!(first.goal, second.goal);
    assert!(!second.changed);
}

#[test]
fn challenger_needs_to_clear_the_hysteresis_margin() {
    let mut sel = selector();
    assert_eq!(sel.evaluate(&Drives::new(&[0.0, 0.5, 0.4]), 0.0).goal, EAT);

    // 0.65 > 0.5 but not by more than 0.2.
    assert_eq!(sel.evaluate(&Drives::new(&[0.0, 0.5, 0.65]), 1.0).goal, EAT);

    let pick = sel.evaluate(&Drives::new(&[0.0, 0.5, 0.75]), 2.0);
    assert_eq!(pick.goal, SLEEP);
    assert!(pick.changed);
}

#[test]
fn plan_failure_cooldown_suppresses_until_it_lapses() {
    let mut sel = selector();
    let drives = Drives::new(&[0.05, 0.4, 0.9]);
    assert_eq!(sel.evaluate(&drives, 0.0).goal, SLEEP);

    assert!(sel.handle_event(&AgentEvent::CannotPlan { goal: SLEEP }, 0.0));
    assert!(sel.is_on_cooldown(SLEEP, 1.0));
    assert_eq!(sel.evaluate(&drives, 1.0).goal, EAT);
    assert_eq!(sel.evaluate(&drives, 4.9).goal, EAT);

    assert!(!sel.is_on_cooldown(SLEEP, 5.0));
    assert_eq!(sel.evaluate(&drives, 5.0).goal, SLEEP);
}

#[test]
fn execution_cooldown_is_independent_and_cleared_by_success() {
    let mut sel = selector();
    let drives = Drives::new(&[0.05, 0.4, 0.9]);
    sel.evaluate(&drives, 0.0);

    sel.handle_event(
        &AgentEvent::PlanExecutionFailed {
            goal: SLEEP,
            reason: "Chop: target lost".into(),
        },
        0.0,
    );
    sel.handle_event(&AgentEvent::CannotPlan { goal: EAT }, 0.0);
    assert_eq!(sel.evaluate(&drives, 1.0).goal, IDLE);

    sel.handle_event(&AgentEvent::PlanSucceeded { goal: EAT }, 1.0);
    assert!(!sel.is_on_cooldown(EAT, 1.0));
    assert!(sel.is_on_cooldown(SLEEP, 1.0));
    assert_eq!(sel.evaluate(&drives, 1.0).goal, EAT);

    sel.handle_event(&AgentEvent::GoalSatisfied { goal: SLEEP }, 1.5);
    assert_eq!(sel.evaluate(&drives, 1.5).goal, SLEEP);
}

#[test]
fn fallback_is_picked_when_everything_is_on_cooldown() {
    let mut sel = selector();
    let drives = Drives::new(&[0.05, 0.4, 0.9]);
    for goal in [IDLE, EAT, SLEEP] {
        sel.handle_event(&AgentEvent::CannotPlan { goal }, 0.0);
    }
    for t in 0..5 {
        let pick = sel.evaluate(&drives, t as f64 * 0.5);
        assert_eq!(pick.goal, IDLE);
        assert!(pick.fallback);
    }
}

#[test]
fn satisfied_goals_are_not_selected() {
    let mut sel = selector();
    let mut drives = Drives::new(&[0.05, 0.4, 0.9]);
    drives.satisfied[2] = true;
    assert_eq!(sel.evaluate(&drives, 0.0).goal, EAT);
}

#[test]
fn per_goal_cooldown_overrides_the_default() {
    let calls = Arc::new(AtomicU32::new(0));
    let counted = Arc::clone(&calls);
    let picky: Box<dyn Goal<Drives>> = Box::new(
        UtilityGoal::new(
            EAT,
            "eat",
            move |_: &Drives| {
                counted.fetch_add(1, Ordering::Relaxed);
                1.0
            },
            |_| State::new(),
        )
        .with_cooldowns(Some(0.5), None),
    );
    let mut sel = UtilityGoalSelector::new(vec![goal(IDLE, 0), picky], IDLE).unwrap();
    let drives = Drives::new(&[0.05]);

    sel.handle_event(&AgentEvent::CannotPlan { goal: EAT }, 0.0);
    assert_eq!(sel.evaluate(&drives, 0.25).goal, IDLE);
    assert_eq!(sel.evaluate(&drives, 0.5).goal, EAT);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn nan_utilities_never_win() {
    let mut sel = selector();
    let pick = sel.evaluate(&Drives::new(&[0.05, f32::NAN, 0.3]), 0.0);
    assert_eq!(pick.goal, SLEEP);
}

#[test]
fn construction_errors() {
    assert_eq!(
        UtilityGoalSelector::<Drives>::new(Vec::new(), IDLE).err(),
        Some(SelectorError::Empty)
    );
    assert_eq!(
        UtilityGoalSelector::new(vec![goal(EAT, 0)], IDLE).err(),
        Some(SelectorError::UnknownFallback(IDLE))
    );
    assert_eq!(
        UtilityGoalSelector::new(vec![goal(EAT, 0), goal(EAT, 1)], EAT).err(),
        Some(SelectorError::DuplicateGoal(EAT))
    );
}
