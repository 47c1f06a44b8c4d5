use crate::algorithms::common::{reconstruct_path, SearchState, StepSearch};
use crate::grid::{Cell, Grid};
use log::trace;
use rustc_hash::FxHashMap;

/// Depth-first search over a LIFO stack. A cell may sit on the stack more
/// than once; popping an already explored copy is a no-op step.
pub struct DepthFirst {
    state: SearchState,
    stack: Vec<Cell>,
    came_from: FxHashMap<Cell, Cell>,
}

impl DepthFirst {
    pub fn new(grid: &Grid) -> Self {
        let start = grid.start();
        let mut state = SearchState::new(start, grid.target());
        state.frontier.insert(start);

        DepthFirst {
            state,
            stack: vec![start],
            came_from: FxHashMap::default(),
        }
    }
}

impl StepSearch for DepthFirst {
    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    fn step(&mut self, grid: &Grid) {
        let Some(node) = self.stack.pop() else {
            self.state.exhaust();
            return;
        };
        self.state.frontier.remove(&node);

        if self.state.explored.contains(&node) {
            return;
        }
        if node == self.state.target {
            let path = reconstruct_path(&self.came_from, self.state.start, node);
            self.state.succeed(path);
            return;
        }
        if grid.is_blocked(node) {
            trace!("dfs: dropping {node}, blocked since discovery");
            return;
        }

        self.state.explored.insert(node);
        for (next, _) in grid.neighbors(node) {
            if !self.state.explored.contains(&next) {
                // The copy pushed last is popped first, so the latest parent wins.
                self.came_from.insert(next, node);
                self.stack.push(next);
                self.state.frontier.insert(next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::common::SearchStatus;

    #[test]
    fn expands_last_enumerated_neighbor_first() {
        let grid = Grid::parse(".....\n.....\n..S..\n.....\n....T\n").unwrap();
        let mut dfs = DepthFirst::new(&grid);
        dfs.advance_one_step(&grid);
        assert_eq!(dfs.state().frontier().len(), 8);

        // Down-Left is enumerated last, so it is expanded second.
        let second = dfs.advance_one_step(&grid);
        assert!(second.explored.contains(&Cell::new(3, 1)));
        assert_eq!(second.explored.len(), 2);
    }

    #[test]
    fn revisiting_explored_cell_is_a_no_op_step() {
        // The 2x2 block around S is cut off from T, and its cells get
        // pushed by more than one parent.
        let grid = Grid::parse("S.\n..\n##\n.T\n").unwrap();
        let mut dfs = DepthFirst::new(&grid);
        let mut explored_sizes = Vec::new();
        while !dfs.advance_one_step(&grid).status.is_terminal() {
            explored_sizes.push(dfs.state().explored().len());
        }
        assert_eq!(dfs.state().status(), SearchStatus::Exhausted);
        assert_eq!(explored_sizes, vec![1, 2, 3, 4, 4, 4, 4]);
        assert_eq!(dfs.state().steps(), 8);
        assert!(dfs.state().frontier().is_empty());
    }

    #[test]
    fn finds_valid_path_through_maze() {
        let grid = Grid::parse("S.#....\n.##.##.\n.#..#..\n...##.T\n").unwrap();
        let mut dfs = DepthFirst::new(&grid);
        while !dfs.advance_one_step(&grid).status.is_terminal() {}
        assert_eq!(dfs.state().status(), SearchStatus::Succeeded);
        assert!(grid.is_valid_path(dfs.state().path()));
    }
}
