use crate::algorithms::common::{reconstruct_path, SearchState, StepSearch};
use crate::grid::{Cell, Grid};
use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Breadth-first search over a FIFO queue. Finds a path with the fewest
/// moves, ignoring the diagonal surcharge.
pub struct BreadthFirst {
    state: SearchState,
    queue: VecDeque<Cell>,
    came_from: FxHashMap<Cell, Cell>,
    discovered: FxHashSet<Cell>,
}

impl BreadthFirst {
    pub fn new(grid: &Grid) -> Self {
        let start = grid.start();
        let mut state = SearchState::new(start, grid.target());
        state.frontier.insert(start);

        let mut discovered = FxHashSet::default();
        discovered.insert(start);

        BreadthFirst {
            state,
            queue: VecDeque::from([start]),
            came_from: FxHashMap::default(),
            discovered,
        }
    }
}

impl StepSearch for BreadthFirst {
    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    fn step(&mut self, grid: &Grid) {
        let Some(node) = self.queue.pop_front() else {
            self.state.exhaust();
            return;
        };
        self.state.frontier.remove(&node);

        if node == self.state.target {
            let path = reconstruct_path(&self.came_from, self.state.start, node);
            self.state.succeed(path);
            return;
        }
        if grid.is_blocked(node) {
            trace!("bfs: dropping {node}, blocked since discovery");
            return;
        }

        self.state.explored.insert(node);
        for (next, _) in grid.neighbors(node) {
            if self.discovered.insert(next) {
                self.came_from.insert(next, node);
                self.queue.push_back(next);
                self.state.frontier.insert(next);
            }
        }
    }
}
