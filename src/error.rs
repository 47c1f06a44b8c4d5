//! Error types for grid editing, layout parsing and simulation runs.
//!
//! Running out of frontier is not an error: a search that cannot reach the
//! target ends in [`SearchStatus::Exhausted`](crate::algorithms::SearchStatus).

use crate::grid::Cell;
use thiserror::Error;

/// Rejected grid operations. Every variant is recoverable and leaves the
/// grid untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("cell {cell} is outside the {rows}x{cols} grid")]
    OutOfBounds { cell: Cell, rows: usize, cols: usize },

    #[error("cell {0} is the start or target and cannot hold a wall")]
    ReservedCell(Cell),

    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("start and target must differ (both are {0})")]
    CoincidentEndpoints(Cell),

    #[error("wall density must lie in [0, 1] (got {0})")]
    InvalidDensity(f64),

    #[error("layout line {line}: {reason}")]
    Layout { line: usize, reason: String },
}

/// An algorithm name that is not one of the six supported searches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown algorithm '{0}' (expected bfs, dfs, ucs, dls, iddfs or bidirectional)")]
pub struct ParseAlgorithmError(pub String);

/// Failures surfaced by the simulation drivers.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Algorithm(#[from] ParseAlgorithmError),

    #[error("density sweep {min}..={max} by {step} must be finite and yield at most {limit} densities")]
    DensitySweep { min: f64, max: f64, step: f64, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
