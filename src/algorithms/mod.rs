//! Uninformed grid searches that advance one unit of work per call.
//!
//! Each algorithm keeps its work structure, frontier, explored set and
//! predecessors as plain fields, so a caller can step it, inspect it,
//! and throw it away at any point. [`SearchProcess`] wraps the six of them
//! behind one enum.

pub mod bfs;
pub mod bidirectional;
pub mod common;
pub mod dfs;
pub mod dls;
pub mod iddfs;
pub mod ucs;

pub use bfs::BreadthFirst;
pub use bidirectional::Bidirectional;
pub use common::{reconstruct_path, SearchState, SearchStatus, Snapshot, StepResult, StepSearch};
pub use dfs::DepthFirst;
pub use dls::{DepthLimited, DLS_DEPTH_LIMIT};
pub use iddfs::IterativeDeepening;
pub use ucs::UniformCost;

use crate::error::ParseAlgorithmError;
use crate::grid::{Cell, Grid};
use rustc_hash::FxHashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Bfs,
    Dfs,
    Ucs,
    Dls,
    Iddfs,
    Bidirectional,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Ucs,
        Algorithm::Dls,
        Algorithm::Iddfs,
        Algorithm::Bidirectional,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => "BFS",
            Algorithm::Dfs => "DFS",
            Algorithm::Ucs => "UCS",
            Algorithm::Dls => "DLS",
            Algorithm::Iddfs => "IDDFS",
            Algorithm::Bidirectional => "Bidirectional",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseAlgorithmError(s.to_string()))
    }
}

/// A running search for one of the six algorithms.
pub enum SearchProcess {
    Bfs(BreadthFirst),
    Dfs(DepthFirst),
    Ucs(UniformCost),
    Dls(DepthLimited),
    Iddfs(IterativeDeepening),
    Bidirectional(Bidirectional),
}

impl SearchProcess {
    /// A fresh process from the grid's start towards its target.
    pub fn start(grid: &Grid, algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Bfs => SearchProcess::Bfs(BreadthFirst::new(grid)),
            Algorithm::Dfs => SearchProcess::Dfs(DepthFirst::new(grid)),
            Algorithm::Ucs => SearchProcess::Ucs(UniformCost::new(grid)),
            Algorithm::Dls => SearchProcess::Dls(DepthLimited::new(grid)),
            Algorithm::Iddfs => SearchProcess::Iddfs(IterativeDeepening::new(grid)),
            Algorithm::Bidirectional => SearchProcess::Bidirectional(Bidirectional::new(grid)),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            SearchProcess::Bfs(_) => Algorithm::Bfs,
            SearchProcess::Dfs(_) => Algorithm::Dfs,
            SearchProcess::Ucs(_) => Algorithm::Ucs,
            SearchProcess::Dls(_) => Algorithm::Dls,
            SearchProcess::Iddfs(_) => Algorithm::Iddfs,
            SearchProcess::Bidirectional(_) => Algorithm::Bidirectional,
        }
    }

    fn search(&self) -> &dyn StepSearch {
        match self {
            SearchProcess::Bfs(s) => s,
            SearchProcess::Dfs(s) => s,
            SearchProcess::Ucs(s) => s,
            SearchProcess::Dls(s) => s,
            SearchProcess::Iddfs(s) => s,
            SearchProcess::Bidirectional(s) => s,
        }
    }

    fn search_mut(&mut self) -> &mut dyn StepSearch {
        match self {
            SearchProcess::Bfs(s) => s,
            SearchProcess::Dfs(s) => s,
            SearchProcess::Ucs(s) => s,
            SearchProcess::Dls(s) => s,
            SearchProcess::Iddfs(s) => s,
            SearchProcess::Bidirectional(s) => s,
        }
    }

    /// Performs one unit of work against the grid as it is now.
    pub fn advance_one_step(&mut self, grid: &Grid) -> StepResult<'_> {
        self.search_mut().advance_one_step(grid)
    }

    pub fn state(&self) -> &SearchState {
        self.search().state()
    }

    pub fn status(&self) -> SearchStatus {
        self.state().status()
    }

    pub fn frontier(&self) -> &FxHashSet<Cell> {
        self.state().frontier()
    }

    pub fn explored(&self) -> &FxHashSet<Cell> {
        self.state().explored()
    }

    pub fn path(&self) -> &[Cell] {
        self.state().path()
    }

    pub fn steps(&self) -> usize {
        self.state().steps()
    }
}
