use crate::grid::{Cell, Grid};
use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};

/// Lifecycle of a search process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Running,
    Succeeded,
    /// The work structure emptied without reaching the target.
    Exhausted,
}

impl SearchStatus {
    pub fn is_terminal(self) -> bool {
        self != SearchStatus::Running
    }
}

/// The state of a process right after a step, borrowed from the live
/// process. `path` is non-empty only on the step that found the target.
///
/// The sets change on the next step; use [`StepResult::to_snapshot`] to keep
/// a copy across steps.
#[derive(Debug, Clone, Copy)]
pub struct StepResult<'a> {
    pub status: SearchStatus,
    pub frontier: &'a FxHashSet<Cell>,
    pub explored: &'a FxHashSet<Cell>,
    pub path: &'a [Cell],
}

impl StepResult<'_> {
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status,
            frontier: self.frontier.clone(),
            explored: self.explored.clone(),
            path: self.path.to_vec(),
        }
    }
}

/// An owned copy of a [`StepResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub status: SearchStatus,
    pub frontier: FxHashSet<Cell>,
    pub explored: FxHashSet<Cell>,
    pub path: Vec<Cell>,
}

/// Bookkeeping every algorithm shares: frontier and explored sets, the
/// final path, status and step counter.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub(crate) start: Cell,
    pub(crate) target: Cell,
    pub(crate) frontier: FxHashSet<Cell>,
    pub(crate) explored: FxHashSet<Cell>,
    pub(crate) path: Vec<Cell>,
    pub(crate) status: SearchStatus,
    pub(crate) steps: usize,
    /// Set by the step that finds the target, cleared by the next call.
    fresh_path: bool,
}

impl SearchState {
    pub(crate) fn new(start: Cell, target: Cell) -> Self {
        SearchState {
            start,
            target,
            frontier: FxHashSet::default(),
            explored: FxHashSet::default(),
            path: Vec::new(),
            status: SearchStatus::Running,
            steps: 0,
            fresh_path: false,
        }
    }

    /// Records the final path. An empty path means reconstruction failed,
    /// which ends the search as exhausted.
    pub(crate) fn succeed(&mut self, path: Vec<Cell>) {
        if path.is_empty() {
            self.status = SearchStatus::Exhausted;
            return;
        }
        self.path = path;
        self.status = SearchStatus::Succeeded;
        self.fresh_path = true;
    }

    pub(crate) fn exhaust(&mut self) {
        self.status = SearchStatus::Exhausted;
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn target(&self) -> Cell {
        self.target
    }

    pub fn frontier(&self) -> &FxHashSet<Cell> {
        &self.frontier
    }

    pub fn explored(&self) -> &FxHashSet<Cell> {
        &self.explored
    }

    /// The final path once the search succeeded, empty before.
    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn step_result(&self) -> StepResult<'_> {
        StepResult {
            status: self.status,
            frontier: &self.frontier,
            explored: &self.explored,
            path: if self.fresh_path { self.path.as_slice() } else { &[] },
        }
    }
}

/// A search that advances one unit of work per call.
pub trait StepSearch {
    fn state(&self) -> &SearchState;

    fn state_mut(&mut self) -> &mut SearchState;

    /// One unit of algorithmic work against the grid's current occupancy.
    /// Only called while the status is [`SearchStatus::Running`].
    fn step(&mut self, grid: &Grid);

    /// Runs one step and returns the resulting state. Calls on a finished
    /// search do nothing and do not count as steps.
    fn advance_one_step(&mut self, grid: &Grid) -> StepResult<'_> {
        let state = self.state_mut();
        state.fresh_path = false;
        if !state.status.is_terminal() {
            state.steps += 1;
            self.step(grid);
        }
        self.state().step_result()
    }
}

/// Walks predecessors from `target` back to `start` and returns the cells
/// in start-to-target order. Returns an empty path when the chain breaks
/// before reaching `start`.
pub fn reconstruct_path(came_from: &FxHashMap<Cell, Cell>, start: Cell, target: Cell) -> Vec<Cell> {
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        match came_from.get(&current) {
            // A chain longer than the map has a cycle.
            Some(&previous) if path.len() <= came_from.len() => {
                path.push(previous);
                current = previous;
            }
            _ => {
                warn!("corrupt predecessor chain: no way back from {current} to {start}");
                return Vec::new();
            }
        }
    }
    path.reverse();
    path
}
