use crate::algorithms::common::{SearchState, StepSearch};
use crate::grid::{Cell, Grid};
use log::trace;

/// Depth bound used by [`DepthLimited::new`].
pub const DLS_DEPTH_LIMIT: usize = 8;

/// A stack entry: the cell, its depth from start, and its breadcrumb.
#[derive(Debug, Clone, Copy)]
struct Frame {
    cell: Cell,
    depth: usize,
    crumb: usize,
}

/// What a single pop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    /// The stack was already empty.
    Empty,
    Expanded,
    Found,
}

/// Depth-limited depth-first search. Cells at the depth bound are goal
/// tested but not expanded, so a target further away than the bound is
/// never found.
///
/// Every push records a breadcrumb pointing at its parent's breadcrumb, so
/// the path to any stack entry is recovered even when the same cell was
/// pushed along several branches.
pub struct DepthLimited {
    state: SearchState,
    limit: usize,
    stack: Vec<Frame>,
    crumbs: Vec<(Cell, Option<usize>)>,
    /// Whether the bound stopped an expansion that had unexplored neighbours.
    cut_off: bool,
}

impl DepthLimited {
    pub fn new(grid: &Grid) -> Self {
        Self::with_limit(grid, DLS_DEPTH_LIMIT)
    }

    pub fn with_limit(grid: &Grid, limit: usize) -> Self {
        let mut search = DepthLimited {
            state: SearchState::new(grid.start(), grid.target()),
            limit,
            stack: Vec::new(),
            crumbs: Vec::new(),
            cut_off: false,
        };
        search.restart(limit);
        search
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub(crate) fn cut_off(&self) -> bool {
        self.cut_off
    }

    /// Starts over from `start` under a new bound. The step counter survives.
    pub(crate) fn restart(&mut self, limit: usize) {
        let start = self.state.start;
        self.limit = limit;
        self.cut_off = false;
        self.stack.clear();
        self.crumbs.clear();
        self.state.frontier.clear();
        self.state.explored.clear();

        self.crumbs.push((start, None));
        self.stack.push(Frame {
            cell: start,
            depth: 0,
            crumb: 0,
        });
        self.state.frontier.insert(start);
    }

    fn path_to(&self, crumb: usize) -> Vec<Cell> {
        let mut path = Vec::new();
        let mut next = Some(crumb);
        while let Some(index) = next {
            let (cell, parent) = self.crumbs[index];
            path.push(cell);
            next = parent;
        }
        path.reverse();
        path
    }

    /// Pops and processes one stack entry.
    pub(crate) fn expand_next(&mut self, grid: &Grid) -> Progress {
        let Some(frame) = self.stack.pop() else {
            return Progress::Empty;
        };
        let node = frame.cell;
        self.state.frontier.remove(&node);

        if node == self.state.target {
            let path = self.path_to(frame.crumb);
            self.state.succeed(path);
            return Progress::Found;
        }
        if grid.is_blocked(node) {
            trace!("dls: dropping {node}, blocked since discovery");
            return Progress::Expanded;
        }

        self.state.explored.insert(node);
        let mut unexplored = grid
            .neighbors(node)
            .into_iter()
            .map(|(next, _)| next)
            .filter(|next| !self.state.explored.contains(next))
            .peekable();

        if frame.depth >= self.limit {
            if unexplored.peek().is_some() {
                self.cut_off = true;
            }
            return Progress::Expanded;
        }

        let children: Vec<Cell> = unexplored.collect();
        for next in children {
            self.crumbs.push((next, Some(frame.crumb)));
            self.stack.push(Frame {
                cell: next,
                depth: frame.depth + 1,
                crumb: self.crumbs.len() - 1,
            });
            self.state.frontier.insert(next);
        }
        Progress::Expanded
    }
}

impl StepSearch for DepthLimited {
    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    fn step(&mut self, grid: &Grid) {
        if self.expand_next(grid) == Progress::Empty {
            self.state.exhaust();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::common::SearchStatus;

    fn run(search: &mut DepthLimited, grid: &Grid) {
        while !search.advance_one_step(grid).status.is_terminal() {
            assert!(search.state().steps() < 100_000);
        }
    }

    #[test]
    fn finds_target_within_bound() {
        let grid = Grid::parse("S.......T\n").unwrap();
        let mut dls = DepthLimited::new(&grid);
        run(&mut dls, &grid);
        assert_eq!(dls.state().status(), SearchStatus::Succeeded);
        assert_eq!(dls.state().path().len(), 9);
    }

    #[test]
    fn target_beyond_bound_exhausts() {
        let grid = Grid::parse("S........T\n").unwrap();
        let mut dls = DepthLimited::new(&grid);
        run(&mut dls, &grid);
        assert_eq!(dls.state().status(), SearchStatus::Exhausted);
        assert!(dls.state().path().is_empty());
        // Cells up to depth 8 are visited, depth 9 is never pushed.
        assert_eq!(dls.state().explored().len(), 9);
        assert!(!dls.state().explored().contains(&Cell::new(0, 9)));
        assert!(dls.cut_off());
    }

    #[test]
    fn custom_bound_is_respected() {
        let grid = Grid::parse("S..T\n").unwrap();
        let mut shallow = DepthLimited::with_limit(&grid, 2);
        run(&mut shallow, &grid);
        assert_eq!(shallow.state().status(), SearchStatus::Exhausted);

        let mut deep = DepthLimited::with_limit(&grid, 3);
        run(&mut deep, &grid);
        assert_eq!(deep.state().status(), SearchStatus::Succeeded);
        assert_eq!(deep.limit(), 3);
    }

    #[test]
    fn path_follows_the_popped_branch() {
        let grid = Grid::parse("S...\n.##.\n...T\n").unwrap();
        let mut dls = DepthLimited::new(&grid);
        run(&mut dls, &grid);
        assert_eq!(dls.state().status(), SearchStatus::Succeeded);
        assert!(grid.is_valid_path(dls.state().path()));
    }

    #[test]
    fn restart_keeps_step_counter() {
        let grid = Grid::parse("S..T\n").unwrap();
        let mut dls = DepthLimited::with_limit(&grid, 1);
        run(&mut dls, &grid);
        let steps = dls.state().steps();
        dls.restart(2);
        assert_eq!(dls.state().steps(), steps);
        assert!(dls.state().explored().is_empty());
        assert_eq!(dls.state().frontier().len(), 1);
    }
}
