use clap::Parser;
use log::error;

use uninformed_pathfinding::batch_simulation::BatchSimulation;
use uninformed_pathfinding::config::{Config, Mode};
use uninformed_pathfinding::simulation::Simulation;
use uninformed_pathfinding::statistics::SearchStatistics;
use uninformed_pathfinding::Error;

fn main() {
    let config = Config::parse();
    env_logger::Builder::new()
        .filter_level(config.log_filter())
        .parse_default_env()
        .init();

    if let Err(e) = run(config) {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(config: Config) -> Result<(), Error> {
    if !config.quiet {
        println!("Grid size: {}x{}, Walls: {}", config.rows, config.cols, config.num_walls);
        println!("Algorithm: {} | Mode: {:?}", config.algorithm, config.mode);
        println!();
    }

    match config.mode {
        Mode::Batch => {
            let mut batch = BatchSimulation::new(config.clone());
            batch.run()?;
            if !config.quiet {
                batch.print_summary();
            }
        }
        Mode::Compare => {
            let results = Simulation::run_all_algorithms(config)?;
            Simulation::print_comparison_results(&results);
        }
        Mode::Search => {
            let mut simulation = Simulation::new(config.clone())?;
            let report = simulation.search()?;

            println!("{}", SearchStatistics::header());
            println!("{}", SearchStatistics::from(&report));
            if report.found {
                let route: Vec<String> =
                    report.path.cells().iter().map(ToString::to_string).collect();
                println!("Path: {}", route.join(" -> "));
            } else {
                let env = simulation.environment();
                println!("No path from {} to {}", env.start, env.target);
            }
            if config.show_grid {
                println!("\n{}", simulation.grid());
            }
        }
        Mode::Follow => {
            let mut simulation = Simulation::new(config.clone())?;
            let env = simulation.environment();
            println!("Seed: {} | Start: {} | Target: {}", env.seed, env.start, env.target);

            let report = simulation.run()?;

            println!("\n=== FINAL RESULTS ===");
            println!("Outcome: {} at {}", report.outcome, report.final_position);
            println!("{}", report.statistics);
            println!("=== TIMING ANALYSIS ===");
            println!("Total searches: {}", report.statistics.searches);
            println!("Average search time: {:.2?}", report.statistics.average_search_time());
            println!("Total time in search: {:.2?}", report.statistics.total_search_time());
            if config.show_grid {
                println!("\n{}", simulation.grid());
            }
        }
    }
    Ok(())
}
