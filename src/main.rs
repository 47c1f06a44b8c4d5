use clap::Parser;
use std::time::Duration;
use stepwise_pathfinding::batch_simulation::BatchSimulation;
use stepwise_pathfinding::config::Config;
use stepwise_pathfinding::simulation::Simulation;
use stepwise_pathfinding::StepOutcome;

fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

fn run_single(config: &Config) -> stepwise_pathfinding::error::Result<()> {
    let mut simulation = Simulation::from_config(config)?;
    let visualize = !config.no_visualization && !config.quiet;
    let delay = Duration::from_millis(config.delay_ms);
    let started = std::time::Instant::now();

    loop {
        let outcome = simulation.step();
        if visualize {
            clear_screen();
            println!("{}", simulation.render_frame());
            if let StepOutcome::Replanned { replans } = outcome {
                println!("Obstacle on path, replanning ({replans})");
            }
            std::thread::sleep(delay);
        }
        if simulation.is_finished() || simulation.total_steps() >= config.max_steps {
            break;
        }
    }

    let stats = simulation.statistics(started.elapsed());
    println!("\n=== FINAL RESULTS ===");
    println!("{}", stats);
    if !stats.success() && stats.optimal_cost.is_some() {
        println!("A path exists on the final grid; the search stopped before reaching it.");
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    if !config.quiet {
        println!("Starting pathfinding simulation...");
        match &config.layout {
            Some(path) => println!("Layout: {}", path.display()),
            None => println!(
                "Grid size: {}x{}, wall density: {:.2}",
                config.rows, config.cols, config.density
            ),
        }
        println!("Algorithm: {}", config.algorithm);
        println!("Obstacle probability per step: {}", config.obstacle_probability);
        if config.no_visualization || config.batch_mode {
            println!("Visualization disabled - running in fast mode");
        } else {
            println!("Visualization enabled with {}ms delay", config.delay_ms);
            println!("Press Ctrl+C to stop the simulation");
        }
        println!();
    }

    let result = if config.batch_mode {
        let mut batch_sim = BatchSimulation::new(config.clone());
        batch_sim.run().map(|()| {
            if !config.quiet {
                batch_sim.print_summary();
            }
        })
    } else if config.algorithm.trim().eq_ignore_ascii_case("all") {
        Simulation::run_all_algorithms(&config).map(|results| {
            Simulation::print_comparison_results(&results);
        })
    } else {
        run_single(&config)
    };

    if let Err(e) = result {
        eprintln!("Simulation failed: {e}");
        std::process::exit(1);
    }
}
