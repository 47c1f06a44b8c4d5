use crate::algorithms::common::{SearchState, StepSearch};
use crate::algorithms::dls::{DepthLimited, Progress};
use crate::grid::Grid;
use log::debug;

/// Iterative deepening: depth-limited search with bounds 1, 2, ... up to
/// the number of cells. Each bound starts from scratch with empty frontier
/// and explored sets; only the step counter carries over.
pub struct IterativeDeepening {
    inner: DepthLimited,
    max_depth: usize,
}

impl IterativeDeepening {
    pub fn new(grid: &Grid) -> Self {
        IterativeDeepening {
            inner: DepthLimited::with_limit(grid, 1),
            max_depth: grid.rows() * grid.cols(),
        }
    }

    /// The bound of the iteration in progress.
    pub fn depth_limit(&self) -> usize {
        self.inner.limit()
    }
}

impl StepSearch for IterativeDeepening {
    fn state(&self) -> &SearchState {
        self.inner.state()
    }

    fn state_mut(&mut self) -> &mut SearchState {
        self.inner.state_mut()
    }

    fn step(&mut self, grid: &Grid) {
        loop {
            if self.inner.expand_next(grid) != Progress::Empty {
                return;
            }
            let limit = self.inner.limit();
            // An iteration the bound never pruned covered everything reachable.
            if !self.inner.cut_off() || limit >= self.max_depth {
                debug!("iddfs: exhausted at depth bound {limit}");
                self.inner.state_mut().exhaust();
                return;
            }
            debug!("iddfs: raising depth bound to {}", limit + 1);
            self.inner.restart(limit + 1);
        }
    }
}
