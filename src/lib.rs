pub mod algorithms;
pub mod batch_simulation;
pub mod config;
pub mod error;
pub mod grid;
pub mod simulation;
pub mod statistics;

pub use algorithms::{Algorithm, SearchProcess, SearchStatus};
pub use error::{GridError, SimulationError};
pub use grid::{Cell, Grid, PathCost};
pub use simulation::{ObstacleSpawner, RandomSpawner, Simulation, StepOutcome};
