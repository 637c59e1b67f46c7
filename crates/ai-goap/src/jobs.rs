//! Background planning jobs.
//!
//! Searches are pure, so a job is just "run the planner on these clones somewhere else and park
//! the result". Every job gets a token from a monotonically increasing counter; owners compare
//! tokens to tell a fresh completion from a stale one instead of racing on task completion.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ai_core::{PlanSpec, State};
use parking_lot::Mutex;
use thiserror::Error;

use crate::{PlanError, Planner};

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to build planning thread pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome<S> {
    Planned(PlanSpec<S>),
    NoPath(PlanError),
    /// The search panicked. Treated like `NoPath` by owners, logged distinctly.
    Fault(String),
}

type Slot<S> = Arc<Mutex<Option<JobOutcome<S>>>>;

/// Handle to one submitted search. Polling never blocks.
#[derive(Debug)]
pub struct PlanningJob<S> {
    token: u64,
    slot: Slot<S>,
}

impl<S> PlanningJob<S> {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn is_finished(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Take the outcome if the search has finished. Returns `Some` at most once.
    pub fn try_take(&self) -> Option<JobOutcome<S>> {
        self.slot.lock().take()
    }
}

type Task = Box<dyn FnOnce() + Send>;

enum Mode {
    Threads(rayon::ThreadPool),
    Inline,
    Deferred(Mutex<VecDeque<Task>>),
}

/// Worker pool running planner searches off the tick thread.
///
/// - `new(n)`: a dedicated rayon pool of `n` threads.
/// - `inline()`: each job runs synchronously inside `submit`.
/// - `deferred()`: jobs queue until the host calls [`PlanningPool::run_pending`], e.g. in its own
///   planning phase between frames.
pub struct PlanningPool {
    mode: Mode,
    next_token: AtomicU64,
}

impl fmt::Debug for PlanningPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match &self.mode {
            Mode::Threads(pool) => format!("threads({})", pool.current_num_threads()),
            Mode::Inline => "inline".to_string(),
            Mode::Deferred(queue) => format!("deferred({} queued)", queue.lock().len()),
        };
        f.debug_struct("PlanningPool")
            .field("mode", &mode)
            .field("next_token", &self.next_token.load(Ordering::Relaxed))
            .finish()
    }
}

impl PlanningPool {
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("goap-planner-{i}"))
            .build()?;
        Ok(Self::with_mode(Mode::Threads(pool)))
    }

    pub fn inline() -> Self {
        Self::with_mode(Mode::Inline)
    }

    pub fn deferred() -> Self {
        Self::with_mode(Mode::Deferred(Mutex::new(VecDeque::new())))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            next_token: AtomicU64::new(1),
        }
    }

    pub fn threads(&self) -> usize {
        match &self.mode {
            Mode::Threads(pool) => pool.current_num_threads(),
            Mode::Inline | Mode::Deferred(_) => 1,
        }
    }

    pub fn submit<S>(&self, planner: Arc<Planner<S>>, start: State, goal: State) -> PlanningJob<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let slot: Slot<S> = Arc::new(Mutex::new(None));
        let job = PlanningJob {
            token,
            slot: Arc::clone(&slot),
        };

        let run = move || {
            let outcome = run_search(&planner, &start, &goal);
            *slot.lock() = Some(outcome);
        };

        match &self.mode {
            Mode::Threads(pool) => pool.spawn(run),
            Mode::Inline => run(),
            Mode::Deferred(queue) => queue.lock().push_back(Box::new(run)),
        }

        job
    }

    /// Run every queued job of a deferred pool on the calling thread. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let Mode::Deferred(queue) = &self.mode else {
            return 0;
        };
        let tasks: Vec<Task> = queue.lock().drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    pub fn pending(&self) -> usize {
        match &self.mode {
            Mode::Deferred(queue) => queue.lock().len(),
            Mode::Threads(_) | Mode::Inline => 0,
        }
    }
}

fn run_search<S: Clone>(planner: &Planner<S>, start: &State, goal: &State) -> JobOutcome<S> {
    match catch_unwind(AssertUnwindSafe(|| planner.plan(start, goal))) {
        Ok(Ok(plan)) => JobOutcome::Planned(plan),
        Ok(Err(err)) => JobOutcome::NoPath(err),
        Err(payload) => JobOutcome::Fault(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "planner panicked".to_string()
    }
}
