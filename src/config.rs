use crate::grid::{Cell, Grid};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Step-by-step uninformed grid search with dynamic obstacles", long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 18)]
    pub rows: usize,

    #[arg(long, default_value_t = 20)]
    pub cols: usize,

    /// Start cell as ROW,COL (default: near the bottom-left corner)
    #[arg(long)]
    pub start: Option<Cell>,

    /// Target cell as ROW,COL (default: near the top-right corner)
    #[arg(long)]
    pub target: Option<Cell>,

    /// bfs, dfs, ucs, dls, iddfs, bidirectional or all
    #[arg(long, default_value = "bfs")]
    pub algorithm: String,

    /// Fraction of cells turned into static walls
    #[arg(long, default_value_t = 0.22)]
    pub density: f64,

    /// Layout file with `.`, `#`, `S` and `T` (overrides size, endpoints and density)
    #[arg(long)]
    pub layout: Option<PathBuf>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Chance per step that a dynamic obstacle appears
    #[arg(long, default_value_t = 0.018)]
    pub obstacle_probability: f64,

    #[arg(long, default_value_t = 100_000)]
    pub max_steps: usize,

    #[arg(long, default_value_t = 60)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    // Batch simulation options
    #[arg(long, default_value_t = false)]
    pub batch_mode: bool,

    #[arg(long, default_value_t = 10)]
    pub num_simulations: usize,

    #[arg(long, default_value_t = 0.0)]
    pub min_density: f64,

    #[arg(long, default_value_t = 0.3)]
    pub max_density: f64,

    #[arg(long, default_value_t = 0.05)]
    pub density_step: f64,

    #[arg(long, default_value = "results.csv")]
    pub output_file: String,
}

impl Config {
    /// Configured endpoints, falling back to the grid's defaults.
    pub fn endpoints(&self) -> (Cell, Cell) {
        let (start, target) = Grid::default_endpoints(self.rows, self.cols);
        (self.start.unwrap_or(start), self.target.unwrap_or(target))
    }
}
