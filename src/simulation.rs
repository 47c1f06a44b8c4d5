use crate::algorithms::{Algorithm, SearchProcess, SearchStatus};
use crate::config::Config;
use crate::error::Result;
use crate::grid::{Cell, Grid, Overlay, PathCost, LEGEND};
use crate::statistics::RunStatistics;
use log::{debug, info, trace};
use pathfinding::prelude::dijkstra;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Source of dynamic obstacles, consulted once after every search step.
pub trait ObstacleSpawner {
    /// May add dynamic walls to `grid`. Returns true when a new wall lands on
    /// `committed_path`, which forces a replan.
    fn after_step(&mut self, grid: &mut Grid, committed_path: &[Cell]) -> bool;
}

/// Spawns one obstacle on a uniformly chosen open cell with a fixed
/// per-step probability.
#[derive(Debug, Clone)]
pub struct RandomSpawner<R: Rng = StdRng> {
    rng: R,
    probability: f64,
}

impl<R: Rng> RandomSpawner<R> {
    /// `probability` is clamped to `[0, 1]`; NaN disables spawning.
    pub fn new(rng: R, probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        RandomSpawner { rng, probability }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl RandomSpawner<StdRng> {
    /// Seeded for reproducible runs, or from entropy when `seed` is `None`.
    pub fn seeded(probability: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomSpawner::new(rng, probability)
    }
}

impl<R: Rng> ObstacleSpawner for RandomSpawner<R> {
    fn after_step(&mut self, grid: &mut Grid, committed_path: &[Cell]) -> bool {
        if !self.rng.gen_bool(self.probability) {
            return false;
        }
        grid.spawn_dynamic_obstacle(committed_path, &mut self.rng)
    }
}

/// A spawner that never places anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObstacles;

impl ObstacleSpawner for NoObstacles {
    fn after_step(&mut self, _grid: &mut Grid, _committed_path: &[Cell]) -> bool {
        false
    }
}

/// What a call to [`Simulation::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The process advanced and now has this status.
    Advanced(SearchStatus),
    /// An obstacle landed on the committed path; a fresh process replaced the old one.
    Replanned { replans: usize },
    /// The process had already finished; nothing happened.
    Finished(SearchStatus),
}

/// Drives a search process over a grid, spawning dynamic obstacles between
/// steps and restarting the search when one of them cuts the found path.
pub struct Simulation<S: ObstacleSpawner = RandomSpawner> {
    grid: Grid,
    algorithm: Algorithm,
    process: SearchProcess,
    spawner: S,
    committed_path: Vec<Cell>,
    replans: usize,
    total_steps: usize,
}

impl<S: ObstacleSpawner> Simulation<S> {
    pub fn new(grid: Grid, algorithm: Algorithm, spawner: S) -> Self {
        let process = SearchProcess::start(&grid, algorithm);
        Simulation {
            grid,
            algorithm,
            process,
            spawner,
            committed_path: Vec::new(),
            replans: 0,
            total_steps: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Wall edits made here are seen by the process from its next step on.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn process(&self) -> &SearchProcess {
        &self.process
    }

    /// The path found by the current process, empty until it succeeds.
    pub fn committed_path(&self) -> &[Cell] {
        &self.committed_path
    }

    pub fn replans(&self) -> usize {
        self.replans
    }

    /// Steps taken across every process since the last restart.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn is_finished(&self) -> bool {
        self.process.status().is_terminal()
    }

    /// Advances the search by one step, then gives the spawner its turn.
    pub fn step(&mut self) -> StepOutcome {
        if self.is_finished() {
            return StepOutcome::Finished(self.process.status());
        }

        let result = self.process.advance_one_step(&self.grid);
        let status = result.status;
        let stale_path = !result.path.is_empty() && !self.grid.is_valid_path(result.path);
        if !result.path.is_empty() {
            self.committed_path = result.path.to_vec();
        }
        self.total_steps += 1;
        if stale_path {
            // A dynamic wall went up on a cell after it was explored.
            self.replan();
            return StepOutcome::Replanned {
                replans: self.replans,
            };
        }
        trace!(
            "{} step {}: frontier {}, explored {}",
            self.algorithm,
            self.process.steps(),
            self.process.frontier().len(),
            self.process.explored().len()
        );

        if self.spawner.after_step(&mut self.grid, &self.committed_path) {
            self.replan();
            return StepOutcome::Replanned {
                replans: self.replans,
            };
        }

        match status {
            SearchStatus::Succeeded => debug!(
                "{} found a path of {} cells after {} steps",
                self.algorithm,
                self.committed_path.len(),
                self.total_steps
            ),
            SearchStatus::Exhausted => {
                debug!("{} exhausted after {} steps", self.algorithm, self.total_steps)
            }
            SearchStatus::Running => {}
        }
        StepOutcome::Advanced(status)
    }

    /// Discards the current process and starts the same algorithm over on
    /// the grid as it is now.
    fn replan(&mut self) {
        self.replans += 1;
        debug!(
            "{}: dynamic obstacle blocked the path, replanning (#{})",
            self.algorithm, self.replans
        );
        self.committed_path.clear();
        self.process = SearchProcess::start(&self.grid, self.algorithm);
    }

    /// Starts a fresh process and zeroes the counters. Walls stay as they are.
    pub fn restart(&mut self) {
        self.committed_path.clear();
        self.replans = 0;
        self.total_steps = 0;
        self.process = SearchProcess::start(&self.grid, self.algorithm);
    }

    /// Removes every dynamic wall, then restarts.
    pub fn reset(&mut self) {
        self.grid.clear_dynamic_walls();
        self.restart();
    }

    pub fn select_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
        self.restart();
    }

    /// Steps until the search finishes or `max_steps` total steps were taken.
    pub fn run(&mut self, max_steps: usize) -> RunStatistics {
        let started = Instant::now();
        while !self.is_finished() && self.total_steps < max_steps {
            self.step();
        }
        let stats = self.statistics(started.elapsed());
        if !self.is_finished() {
            debug!("{} stopped at the {max_steps} step limit", self.algorithm);
        }
        stats
    }

    pub fn statistics(&self, elapsed: Duration) -> RunStatistics {
        let path = self.process.path();
        RunStatistics {
            algorithm: self.algorithm,
            outcome: self.process.status(),
            total_steps: self.total_steps,
            final_steps: self.process.steps(),
            replans: self.replans,
            static_walls: self.grid.static_walls().len(),
            dynamic_obstacles: self.grid.dynamic_walls().len(),
            explored: self.process.explored().len(),
            path_length: path.len(),
            path_cost: (!path.is_empty()).then(|| Grid::path_cost(path)),
            optimal_cost: optimal_cost(&self.grid),
            elapsed,
        }
    }

    /// The grid with the current process's frontier, explored set and path.
    pub fn render_frame(&self) -> String {
        let overlay = Overlay {
            frontier: self.process.frontier(),
            explored: self.process.explored(),
            path: self.process.path(),
        };
        format!(
            "Algorithm: {} | Steps: {} | Replans: {} | Status: {:?}\n{}\n{}",
            self.algorithm,
            self.total_steps,
            self.replans,
            self.process.status(),
            LEGEND,
            self.grid.render(Some(overlay))
        )
    }
}

/// Cheapest start-to-target cost on the grid as it stands, for comparing a
/// run's result against.
pub fn optimal_cost(grid: &Grid) -> Option<PathCost> {
    let target = grid.target();
    dijkstra(
        &grid.start(),
        |cell| {
            grid.neighbors(*cell)
                .into_iter()
                .map(|(next, cost)| (next, cost.tenths()))
        },
        |cell| *cell == target,
    )
    .map(|(_, cost)| PathCost::from_tenths(cost))
}

/// A reproducible layout shared by every algorithm in one comparison.
#[derive(Debug, Clone)]
pub struct EnvironmentSetup {
    pub grid: Grid,
    pub seed: u64,
}

impl EnvironmentSetup {
    /// Loads the configured layout file, or builds a random layout of the
    /// configured size and density. A missing seed is drawn from entropy.
    pub fn generate(config: &Config, seed: Option<u64>) -> Result<Self> {
        let seed = seed.unwrap_or_else(rand::random);
        let grid = match &config.layout {
            Some(path) => Grid::parse(&std::fs::read_to_string(path)?)?,
            None => {
                let (start, target) = config.endpoints();
                let mut grid = Grid::new(config.rows, config.cols, start, target)?;
                grid.randomize_seeded(config.density, Some(seed))?;
                grid
            }
        };
        debug!(
            "environment: {}x{} grid, {} walls, seed {seed}",
            grid.rows(),
            grid.cols(),
            grid.static_walls().len()
        );
        Ok(EnvironmentSetup { grid, seed })
    }

    /// A simulation over a copy of this layout. Obstacles come from a stream
    /// derived from the layout seed, so every algorithm sees the same draws.
    pub fn simulation(&self, algorithm: Algorithm, obstacle_probability: f64) -> Simulation {
        let spawner = RandomSpawner::seeded(obstacle_probability, Some(self.seed.wrapping_add(1)));
        Simulation::new(self.grid.clone(), algorithm, spawner)
    }
}

impl Simulation {
    /// The simulation the command line describes.
    pub fn from_config(config: &Config) -> Result<Self> {
        let algorithm = config.algorithm.parse::<Algorithm>()?;
        let environment = EnvironmentSetup::generate(config, config.seed)?;
        Ok(environment.simulation(algorithm, config.obstacle_probability))
    }

    /// Runs all six algorithms on the same environment.
    pub fn run_all_algorithms(config: &Config) -> Result<Vec<RunStatistics>> {
        let environment = EnvironmentSetup::generate(config, config.seed)?;
        if !config.quiet {
            println!("Running comparison of {} algorithms...", Algorithm::ALL.len());
            println!("Environment seed: {} (for reproducibility)", environment.seed);
            println!(
                "Environment: Grid {}x{}, Walls: {}",
                environment.grid.rows(),
                environment.grid.cols(),
                environment.grid.static_walls().len()
            );
            println!("Start: {}, Target: {}", environment.grid.start(), environment.grid.target());
            println!();
        }

        let results = Algorithm::ALL
            .into_iter()
            .map(|algorithm| {
                let stats = environment
                    .simulation(algorithm, config.obstacle_probability)
                    .run(config.max_steps);
                info!("{algorithm}: {:?} after {} steps", stats.outcome, stats.total_steps);
                stats
            })
            .collect();
        Ok(results)
    }

    /// Prints comparison results as a table.
    pub fn print_comparison_results(results: &[RunStatistics]) {
        println!("\n=== ALGORITHM COMPARISON RESULTS ===\n");
        println!(
            "{:<14} {:<10} {:>8} {:>8} {:>9} {:>8} {:>8} {:>8} {:>8}",
            "Algorithm", "Outcome", "Steps", "Replans", "Explored", "Length", "Cost", "Optimal", "Ratio"
        );
        println!("{}", "-".repeat(92));

        let or_dash = |cost: Option<PathCost>| cost.map_or_else(|| "-".to_string(), |c| c.to_string());
        for result in results {
            println!(
                "{:<14} {:<10} {:>8} {:>8} {:>9} {:>8} {:>8} {:>8} {:>8}",
                result.algorithm.name(),
                format!("{:?}", result.outcome),
                result.total_steps,
                result.replans,
                result.explored,
                result.path_length,
                or_dash(result.path_cost),
                or_dash(result.optimal_cost),
                result
                    .cost_ratio()
                    .map_or_else(|| "-".to_string(), |r| format!("{r:.3}")),
            );
        }

        let successful: Vec<&RunStatistics> = results.iter().filter(|r| r.success()).collect();
        if successful.is_empty() {
            println!("\nNo algorithm found a path.");
            return;
        }

        println!("\n=== PERFORMANCE ANALYSIS ===");
        if let Some(fewest) = successful.iter().min_by_key(|r| r.total_steps) {
            println!("Fewest steps: {} ({} steps)", fewest.algorithm, fewest.total_steps);
        }
        if let Some(cheapest) = successful.iter().min_by_key(|r| r.path_cost) {
            println!("Cheapest path: {} (cost {})", cheapest.algorithm, or_dash(cheapest.path_cost));
        }
        if let Some(smallest) = successful.iter().min_by_key(|r| r.explored) {
            println!("Smallest explored set: {} ({} cells)", smallest.algorithm, smallest.explored);
        }
    }
}
