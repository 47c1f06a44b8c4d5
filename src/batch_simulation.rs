use crate::algorithms::Algorithm;
use crate::config::Config;
use crate::error::{Result, SimulationError};
use crate::grid::PathCost;
use crate::simulation::EnvironmentSetup;
use crate::statistics::RunStatistics;
use log::{info, warn};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::time::{Duration, Instant};

/// Upper bound on the number of densities one sweep may visit.
pub const MAX_DENSITIES: usize = 10_000;

const CSV_HEADER: &str = "simulation_id,algorithm,rows,cols,density,seed,success,total_steps,replans,explored,path_length,path_cost,optimal_cost,cost_ratio,static_walls,dynamic_obstacles,execution_time_us";

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub simulation_id: usize,
    pub density: f64,
    pub seed: u64,
    pub rows: usize,
    pub cols: usize,
    pub stats: RunStatistics,
}

impl BatchResult {
    fn csv_row(&self) -> String {
        let cost = |cost: Option<PathCost>| cost.map(|c| c.to_string()).unwrap_or_default();
        let stats = &self.stats;
        format!(
            "{},{},{},{},{:.3},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.simulation_id,
            stats.algorithm,
            self.rows,
            self.cols,
            self.density,
            self.seed,
            stats.success(),
            stats.total_steps,
            stats.replans,
            stats.explored,
            stats.path_length,
            cost(stats.path_cost),
            cost(stats.optimal_cost),
            stats.cost_ratio().map(|r| format!("{r:.6}")).unwrap_or_default(),
            stats.static_walls,
            stats.dynamic_obstacles,
            stats.elapsed.as_micros()
        )
    }
}

/// Runs every selected algorithm over many random layouts at a range of
/// wall densities and appends one CSV row per run.
pub struct BatchSimulation {
    config: Config,
    pending: Vec<BatchResult>,
    completed: Vec<BatchResult>,
    start_time: Instant,
    batch_size: usize,
    total_results_written: usize,
}

impl BatchSimulation {
    pub fn new(config: Config) -> Self {
        BatchSimulation {
            config,
            pending: Vec::new(),
            completed: Vec::new(),
            start_time: Instant::now(),
            batch_size: 100,
            total_results_written: 0,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.completed
    }

    /// The algorithms named by the configuration; `all` selects every one.
    pub fn algorithms(&self) -> Result<Vec<Algorithm>> {
        if self.config.algorithm.trim().eq_ignore_ascii_case("all") {
            Ok(Algorithm::ALL.to_vec())
        } else {
            Ok(vec![self.config.algorithm.parse()?])
        }
    }

    /// Densities from `min_density` to `max_density` inclusive. A step of
    /// zero or less, or a range that runs backwards, yields `min_density` alone.
    pub fn densities(&self) -> Result<Vec<f64>> {
        let (min, max, step) = (
            self.config.min_density,
            self.config.max_density,
            self.config.density_step,
        );
        let sweep_error = || SimulationError::DensitySweep {
            min,
            max,
            step,
            limit: MAX_DENSITIES,
        };
        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(sweep_error());
        }
        if step <= 0.0 || max < min {
            return Ok(vec![min]);
        }
        let intervals = ((max - min) / step + 1e-9).floor();
        if intervals >= MAX_DENSITIES as f64 {
            return Err(sweep_error());
        }
        let count = intervals as usize + 1;
        Ok((0..count).map(|i| min + step * i as f64).collect())
    }

    pub fn run(&mut self) -> Result<()> {
        let algorithms = self.algorithms()?;
        let densities = self.densities()?;
        self.initialize_csv_file()?;

        let total_simulations = densities.len() * self.config.num_simulations * algorithms.len();
        if !self.config.quiet {
            println!("=== BATCH SIMULATION STARTED ===");
            println!("Grid size: {}x{}", self.config.rows, self.config.cols);
            println!(
                "Density range: {:.2} to {:.2} (step {:.2})",
                self.config.min_density, self.config.max_density, self.config.density_step
            );
            println!("Simulations per density: {}", self.config.num_simulations);
            println!("Algorithm: {}", self.config.algorithm);
            println!("Output file: {}", self.config.output_file);
            println!("Total runs: {}", total_simulations);
            println!();
        }

        let mut last_progress_report = Instant::now();
        let progress_interval = Duration::from_secs(10);

        for (index, &density) in densities.iter().enumerate() {
            if !self.config.quiet {
                println!("Configuration {}/{}: density {:.2}", index + 1, densities.len(), density);
            }
            self.run_configuration(density, &algorithms)?;

            if last_progress_report.elapsed() > progress_interval {
                let done = self.completed.len() + self.pending.len();
                println!(
                    "Progress: {:.1}% ({}/{}) - Elapsed: {:.1}s",
                    done as f64 / total_simulations as f64 * 100.0,
                    done,
                    total_simulations,
                    self.start_time.elapsed().as_secs_f64()
                );
                last_progress_report = Instant::now();
            }
        }
        self.flush_results_to_csv()?;

        info!(
            "batch finished: {} runs in {:.2?} -> {}",
            self.completed.len(),
            self.start_time.elapsed(),
            self.config.output_file
        );
        if !self.config.quiet {
            println!("\n=== BATCH SIMULATION COMPLETED ===");
            println!("Total results collected: {}", self.completed.len());
            println!("Results saved to: {}", self.config.output_file);
            println!("Total time: {:.2?}", self.start_time.elapsed());
        }
        Ok(())
    }

    /// One seed per simulation id, shared by every algorithm at this density.
    fn run_configuration(&mut self, density: f64, algorithms: &[Algorithm]) -> Result<()> {
        let mut run_config = self.config.clone();
        run_config.density = density;
        let base_seed = self.config.seed.unwrap_or(0);

        for sim_id in 0..self.config.num_simulations {
            let environment = match EnvironmentSetup::generate(&run_config, Some(base_seed.wrapping_add(sim_id as u64))) {
                Ok(environment) => environment,
                Err(e) => {
                    warn!("skipping simulation {sim_id} at density {density:.2}: {e}");
                    continue;
                }
            };

            for &algorithm in algorithms {
                let stats = environment
                    .simulation(algorithm, self.config.obstacle_probability)
                    .run(self.config.max_steps);
                self.pending.push(BatchResult {
                    simulation_id: sim_id,
                    density,
                    seed: environment.seed,
                    rows: environment.grid.rows(),
                    cols: environment.grid.cols(),
                    stats,
                });
            }

            if self.pending.len() >= self.batch_size {
                self.flush_results_to_csv()?;
            }
        }
        Ok(())
    }

    fn flush_results_to_csv(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.output_file)?;
        for result in &self.pending {
            writeln!(file, "{}", result.csv_row())?;
        }

        self.total_results_written += self.pending.len();
        if !self.config.quiet {
            println!(
                "Flushed {} results to CSV (total: {})",
                self.pending.len(),
                self.total_results_written
            );
        }
        self.completed.append(&mut self.pending);
        Ok(())
    }

    fn initialize_csv_file(&self) -> Result<()> {
        let mut file = std::fs::File::create(&self.config.output_file)?;
        writeln!(file, "{CSV_HEADER}")?;
        Ok(())
    }

    pub fn print_summary(&self) {
        if self.completed.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH SIMULATION SUMMARY ===");

        let mut algorithm_groups: HashMap<Algorithm, Vec<&RunStatistics>> = HashMap::new();
        for result in &self.completed {
            algorithm_groups
                .entry(result.stats.algorithm)
                .or_default()
                .push(&result.stats);
        }

        for algorithm in Algorithm::ALL {
            let Some(results) = algorithm_groups.get(&algorithm) else {
                continue;
            };
            println!("\n{} Algorithm Results:", algorithm);
            let successful: Vec<_> = results.iter().filter(|r| r.success()).collect();
            let total = results.len();
            println!(
                "  Success rate: {}/{} ({:.1}%)",
                successful.len(),
                total,
                successful.len() as f64 / total as f64 * 100.0
            );

            if !successful.is_empty() {
                let count = successful.len() as f64;
                let avg_steps = successful.iter().map(|r| r.total_steps as f64).sum::<f64>() / count;
                let avg_explored = successful.iter().map(|r| r.explored as f64).sum::<f64>() / count;
                let avg_replans = successful.iter().map(|r| r.replans as f64).sum::<f64>() / count;
                let ratios: Vec<f64> = successful.iter().filter_map(|r| r.cost_ratio()).collect();

                println!("  Average steps: {:.1}", avg_steps);
                println!("  Average explored: {:.1}", avg_explored);
                println!("  Average replans: {:.2}", avg_replans);
                if !ratios.is_empty() {
                    println!(
                        "  Average cost ratio: {:.3}",
                        ratios.iter().sum::<f64>() / ratios.len() as f64
                    );
                }
            }
        }
    }
}
