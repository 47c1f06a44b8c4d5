use crate::algorithms::common::{reconstruct_path, SearchState, StepSearch};
use crate::grid::{Cell, Grid};
use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// One breadth-first wave, rooted at start or at target.
struct Wave {
    queue: VecDeque<Cell>,
    came_from: FxHashMap<Cell, Cell>,
    visited: FxHashSet<Cell>,
}

impl Wave {
    fn rooted_at(root: Cell) -> Self {
        let mut visited = FxHashSet::default();
        visited.insert(root);
        Wave {
            queue: VecDeque::from([root]),
            came_from: FxHashMap::default(),
            visited,
        }
    }

    /// Pops one cell and expands it. Returns the cell if the other wave has
    /// already visited it.
    fn half_step(&mut self, other: &Wave, state: &mut SearchState, grid: &Grid) -> Option<Cell> {
        let node = self.queue.pop_front()?;
        state.frontier.remove(&node);
        if grid.is_blocked(node) {
            trace!("bidirectional: dropping {node}, blocked since discovery");
            return None;
        }

        state.explored.insert(node);
        if other.visited.contains(&node) {
            return Some(node);
        }
        for (next, _) in grid.neighbors(node) {
            if self.visited.insert(next) {
                self.came_from.insert(next, node);
                self.queue.push_back(next);
                state.frontier.insert(next);
            }
        }
        None
    }
}

/// Two breadth-first waves, one forward from start and one backward from
/// target, each advancing one cell per step. The search ends when a wave
/// expands a cell the other wave has reached.
pub struct Bidirectional {
    state: SearchState,
    forward: Wave,
    backward: Wave,
}

impl Bidirectional {
    pub fn new(grid: &Grid) -> Self {
        let (start, target) = (grid.start(), grid.target());
        let mut state = SearchState::new(start, target);
        state.frontier.insert(start);
        state.frontier.insert(target);

        Bidirectional {
            state,
            forward: Wave::rooted_at(start),
            backward: Wave::rooted_at(target),
        }
    }

    /// Splices start..meet from the forward wave with meet..target from the
    /// backward wave.
    fn join_at(&self, meet: Cell) -> Vec<Cell> {
        let mut path = reconstruct_path(&self.forward.came_from, self.state.start, meet);
        let back = reconstruct_path(&self.backward.came_from, self.state.target, meet);
        if path.is_empty() || back.is_empty() {
            return Vec::new();
        }
        path.extend(back.into_iter().rev().skip(1));
        path
    }
}

impl StepSearch for Bidirectional {
    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    fn step(&mut self, grid: &Grid) {
        if self.forward.queue.is_empty() && self.backward.queue.is_empty() {
            self.state.exhaust();
            return;
        }

        let meet = self
            .forward
            .half_step(&self.backward, &mut self.state, grid)
            .or_else(|| self.backward.half_step(&self.forward, &mut self.state, grid));

        if let Some(meet) = meet {
            trace!("bidirectional: waves met at {meet}");
            let path = self.join_at(meet);
            self.state.succeed(path);
        }
    }
}
