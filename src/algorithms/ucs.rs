use crate::algorithms::common::{reconstruct_path, SearchState, StepSearch};
use crate::grid::{Cell, Grid, PathCost};
use log::trace;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry ordered by lowest cost, then by insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    cost: PathCost,
    seq: u64,
    cell: Cell,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behaviour on a BinaryHeap
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Uniform-cost search: expands the cheapest discovered cell first under
/// the 1.0 / 1.4 move costs, so the path it returns is cost optimal.
///
/// A cheaper rediscovery pushes a second heap entry instead of updating the
/// first; the outdated entry is skipped when it surfaces.
pub struct UniformCost {
    state: SearchState,
    heap: BinaryHeap<QueueEntry>,
    came_from: FxHashMap<Cell, Cell>,
    cost_so_far: FxHashMap<Cell, PathCost>,
    next_seq: u64,
}

impl UniformCost {
    pub fn new(grid: &Grid) -> Self {
        let start = grid.start();
        let mut state = SearchState::new(start, grid.target());
        state.frontier.insert(start);

        let mut search = UniformCost {
            state,
            heap: BinaryHeap::new(),
            came_from: FxHashMap::default(),
            cost_so_far: FxHashMap::default(),
            next_seq: 0,
        };
        search.cost_so_far.insert(start, PathCost::ZERO);
        search.push(start, PathCost::ZERO);
        search
    }

    fn push(&mut self, cell: Cell, cost: PathCost) {
        self.heap.push(QueueEntry {
            cost,
            seq: self.next_seq,
            cell,
        });
        self.next_seq += 1;
    }

    /// Cost of the best known route to `cell`.
    pub fn cost_to(&self, cell: Cell) -> Option<PathCost> {
        self.cost_so_far.get(&cell).copied()
    }
}

impl StepSearch for UniformCost {
    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    fn step(&mut self, grid: &Grid) {
        let Some(QueueEntry { cost, cell: node, .. }) = self.heap.pop() else {
            self.state.exhaust();
            return;
        };
        self.state.frontier.remove(&node);

        if node == self.state.target {
            let path = reconstruct_path(&self.came_from, self.state.start, node);
            self.state.succeed(path);
            return;
        }
        let stale = self.cost_so_far.get(&node).is_some_and(|&best| cost > best);
        if stale || self.state.explored.contains(&node) {
            trace!("ucs: skipping stale entry for {node} at cost {cost}");
            return;
        }
        if grid.is_blocked(node) {
            trace!("ucs: dropping {node}, blocked since discovery");
            return;
        }

        self.state.explored.insert(node);
        for (next, move_cost) in grid.neighbors(node) {
            if self.state.explored.contains(&next) {
                continue;
            }
            let new_cost = cost + move_cost;
            let improves = self.cost_so_far.get(&next).map_or(true, |&known| new_cost < known);
            if improves {
                self.cost_so_far.insert(next, new_cost);
                self.came_from.insert(next, node);
                self.push(next, new_cost);
                self.state.frontier.insert(next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::common::SearchStatus;

    fn run(grid: &Grid) -> UniformCost {
        let mut ucs = UniformCost::new(grid);
        while !ucs.advance_one_step(grid).status.is_terminal() {}
        ucs
    }

    #[test]
    fn heap_pops_cheapest_then_oldest() {
        let mut heap = BinaryHeap::new();
        let entry = |tenths, seq| QueueEntry {
            cost: PathCost::from_tenths(tenths),
            seq,
            cell: Cell::new(0, 0),
        };
        heap.push(entry(14, 0));
        heap.push(entry(10, 2));
        heap.push(entry(10, 1));
        heap.push(entry(20, 3));
        let order: Vec<(u32, u64)> = std::iter::from_fn(|| heap.pop())
            .map(|e| (e.cost.tenths(), e.seq))
            .collect();
        assert_eq!(order, vec![(10, 1), (10, 2), (14, 0), (20, 3)]);
    }

    #[test]
    fn prefers_cheaper_route_with_more_moves() {
        let grid = Grid::parse("...#T\n..#..\n..##.\nS....\n").unwrap();
        let ucs = run(&grid);
        assert_eq!(ucs.state().status(), SearchStatus::Succeeded);
        let path = ucs.state().path();
        assert_eq!(Grid::path_cost(path), PathCost::from_tenths(64));
        assert_eq!(path.len(), 7);
        assert_eq!(ucs.cost_to(grid.target()), Some(PathCost::from_tenths(64)));
    }

    #[test]
    fn stale_entry_is_skipped_as_a_no_op_step() {
        let grid = Grid::parse("....#\nS#..#\n.#...\n#....\n##..T\n").unwrap();
        let mut ucs = UniformCost::new(&grid);
        let mut explored_sizes = Vec::new();
        while !ucs.advance_one_step(&grid).status.is_terminal() {
            explored_sizes.push(ucs.state().explored().len());
        }
        let expected: Vec<usize> = (1..=17).chain([17]).collect();
        assert_eq!(explored_sizes, expected);
        assert_eq!(ucs.state().steps(), 19);
        assert_eq!(Grid::path_cost(ucs.state().path()), PathCost::from_tenths(58));
    }

    #[test]
    fn diagonal_beats_two_orthogonal_moves() {
        let grid = Grid::parse("S..\n...\n..T\n").unwrap();
        let ucs = run(&grid);
        assert_eq!(
            ucs.state().path(),
            &[Cell::new(0, 0), Cell::new(1, 1), Cell::new(2, 2)]
        );
        assert_eq!(Grid::path_cost(ucs.state().path()), PathCost::from_tenths(28));
    }

    #[test]
    fn exhausts_when_unreachable() {
        let grid = Grid::parse("S#.\n##.\n..T\n").unwrap();
        let ucs = run(&grid);
        assert_eq!(ucs.state().status(), SearchStatus::Exhausted);
        assert_eq!(ucs.state().explored().len(), 1);
        assert_eq!(ucs.state().steps(), 2);
    }
}
