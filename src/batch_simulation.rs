use crate::config::Config;
use crate::error::{Error, SearchError};
use crate::replanner::FollowReport;
use crate::simulation::Simulation;
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};

const CSV_HEADER: &str = "simulation_id,seed,algorithm,rows,cols,num_walls,\
obstacle_probability,outcome,total_moves,optimal_path_length,replans,obstacles_placed,\
route_efficiency,execution_time_ms,average_search_time_ns";

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub simulation_id: usize,
    pub seed: u64,
    pub algorithm: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub num_walls: usize,
    pub obstacle_probability: f64,
    /// `reached`, `stuck`, or `failed` when no follow could run.
    pub outcome: String,
    pub total_moves: usize,
    pub optimal_path_length: usize,
    pub replans: usize,
    pub obstacles_placed: usize,
    pub route_efficiency: f64,
    pub execution_time_ms: u64,
    pub average_search_time_ns: u64,
}

impl BatchResult {
    fn reached(&self) -> bool {
        self.outcome == "reached"
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.3},{},{},{},{},{},{:.6},{},{}",
            self.simulation_id,
            self.seed,
            self.algorithm,
            self.rows,
            self.cols,
            self.num_walls,
            self.obstacle_probability,
            self.outcome,
            self.total_moves,
            self.optimal_path_length,
            self.replans,
            self.obstacles_placed,
            self.route_efficiency,
            self.execution_time_ms,
            self.average_search_time_ns
        )
    }
}

/// Obstacle probabilities from `min` to `max` inclusive, `step` apart.
pub fn probability_levels(min: f64, max: f64, step: f64) -> Result<Vec<f64>, Error> {
    for p in [min, max] {
        if !(0.0..=1.0).contains(&p) {
            return Err(SearchError::InvalidProbability(p).into());
        }
    }
    if step.is_nan() || step <= 0.0 || min > max {
        return Err(SearchError::InvalidProbability(step).into());
    }
    // Tolerance so that 0.0..=0.5 by 0.1 includes 0.5.
    let count = ((max - min) / step + 1e-9).floor() as usize;
    Ok((0..=count).map(|i| (min + i as f64 * step).min(max)).collect())
}

/// Sweeps obstacle probability, running `num_simulations` seeded follows at
/// each level and appending one CSV row per follow.
pub struct BatchSimulation {
    config: Config,
    results: Vec<BatchResult>,
    start_time: Instant,
    batch_size: usize,
    total_results_written: usize,
}

impl BatchSimulation {
    pub fn new(config: Config) -> Self {
        BatchSimulation {
            config,
            results: Vec::new(),
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
        &self.results
    }

    pub fn run(&mut self) -> Result<(), Error> {
        let levels = probability_levels(
            self.config.min_probability,
            self.config.max_probability,
            self.config.probability_step,
        )?;
        let base_seed = self.config.seed.unwrap_or_else(rand::random);
        let total_simulations = levels.len() * self.config.num_simulations;

        self.initialize_csv_file()?;
        if !self.config.quiet {
            println!("=== BATCH SIMULATION STARTED ===");
            println!(
                "Grid: {}x{}, Walls: {}",
                self.config.rows, self.config.cols, self.config.num_walls
            );
            println!(
                "Obstacle probability: {} to {} step {}",
                self.config.min_probability,
                self.config.max_probability,
                self.config.probability_step
            );
            println!("Simulations per level: {}", self.config.num_simulations);
            println!("Algorithm: {}", self.config.algorithm);
            println!("Base seed: {base_seed}");
            println!("Output file: {}", self.config.output_file);
            println!();
        }

        let mut completed = 0;
        let mut last_progress_report = Instant::now();
        let progress_interval = Duration::from_secs(10);

        for &probability in &levels {
            if !self.config.quiet {
                println!("Obstacle probability {probability:.3}");
            }
            for simulation_id in 0..self.config.num_simulations {
                // Same seed per id across levels, so each level sees the same environments.
                let seed = base_seed.wrapping_add(simulation_id as u64);
                let result = self.run_one(simulation_id, seed, probability);
                self.results.push(result);
                completed += 1;

                if self.results.len() - self.total_results_written >= self.batch_size {
                    self.flush_results_to_csv()?;
                }
                if last_progress_report.elapsed() > progress_interval {
                    let elapsed = self.start_time.elapsed();
                    info!(
                        "progress: {:.1}% ({completed}/{total_simulations}) after {:.1}s",
                        completed as f64 / total_simulations as f64 * 100.0,
                        elapsed.as_secs_f64()
                    );
                    last_progress_report = Instant::now();
                }
            }
        }

        self.flush_results_to_csv()?;

        if !self.config.quiet {
            println!("\n=== BATCH SIMULATION COMPLETED ===");
            println!("Total results collected: {}", self.results.len());
            println!("Results saved to: {}", self.config.output_file);
            println!("Total time: {:.2?}", self.start_time.elapsed());
        } else {
            println!(
                "Batch simulation completed: {} results in {:.1}s -> {}",
                self.results.len(),
                self.start_time.elapsed().as_secs_f64(),
                self.config.output_file
            );
        }
        Ok(())
    }

    fn run_one(&self, simulation_id: usize, seed: u64, probability: f64) -> BatchResult {
        let mut run_config = self.config.clone();
        run_config.obstacle_probability = probability;
        run_config.seed = Some(seed);
        run_config.show_grid = false;
        run_config.quiet = true;

        let started = Instant::now();
        let outcome = Simulation::new(run_config).and_then(|mut simulation| simulation.run());
        let elapsed = started.elapsed();

        match outcome {
            Ok(report) => {
                self.result_from_report(simulation_id, seed, probability, &report, elapsed)
            }
            Err(e) => {
                debug!("simulation {simulation_id} (seed {seed}) failed: {e}");
                BatchResult {
                    simulation_id,
                    seed,
                    algorithm: self.config.algorithm.name(),
                    rows: self.config.rows,
                    cols: self.config.cols,
                    num_walls: self.config.num_walls,
                    obstacle_probability: probability,
                    outcome: "failed".to_string(),
                    total_moves: 0,
                    optimal_path_length: 0,
                    replans: 0,
                    obstacles_placed: 0,
                    route_efficiency: 0.0,
                    execution_time_ms: elapsed.as_millis() as u64,
                    average_search_time_ns: 0,
                }
            }
        }
    }

    fn result_from_report(
        &self,
        simulation_id: usize,
        seed: u64,
        probability: f64,
        report: &FollowReport,
        elapsed: Duration,
    ) -> BatchResult {
        let stats = &report.statistics;
        BatchResult {
            simulation_id,
            seed,
            algorithm: self.config.algorithm.name(),
            rows: self.config.rows,
            cols: self.config.cols,
            num_walls: self.config.num_walls,
            obstacle_probability: probability,
            outcome: report.outcome.to_string(),
            total_moves: stats.total_moves,
            optimal_path_length: stats.optimal_path_length,
            replans: stats.replans,
            obstacles_placed: stats.obstacles_placed,
            route_efficiency: stats.route_efficiency,
            execution_time_ms: elapsed.as_millis() as u64,
            average_search_time_ns: stats.average_search_time().as_nanos() as u64,
        }
    }

    fn flush_results_to_csv(&mut self) -> Result<(), Error> {
        let pending = &self.results[self.total_results_written..];
        if pending.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new().append(true).open(&self.config.output_file)?;
        let mut writer = BufWriter::new(file);
        for result in pending {
            writeln!(writer, "{}", result.csv_row())?;
        }
        writer.flush()?;

        self.total_results_written += pending.len();
        debug!("flushed {} rows (total {})", pending.len(), self.total_results_written);
        Ok(())
    }

    fn initialize_csv_file(&self) -> Result<(), Error> {
        let mut file = File::create(&self.config.output_file)?;
        writeln!(file, "{CSV_HEADER}")?;
        debug!("initialized CSV file {}", self.config.output_file);
        Ok(())
    }

    pub fn print_summary(&self) {
        if self.results.is_empty() {
            println!("No results to summarize.");
            return;
        }

        println!("\n=== BATCH SIMULATION SUMMARY ({}) ===", self.config.algorithm);
        // Results are recorded level by level, so equal probabilities are contiguous.
        for group in self
            .results
            .chunk_by(|a, b| a.obstacle_probability == b.obstacle_probability)
        {
            let probability = group[0].obstacle_probability;
            let reached: Vec<_> = group.iter().filter(|r| r.reached()).collect();
            let failed = group.iter().filter(|r| r.outcome == "failed").count();
            println!("\nObstacle probability {probability:.3}:");
            println!(
                "  Reached: {}/{} ({:.1}%), failed to start: {}",
                reached.len(),
                group.len(),
                reached.len() as f64 / group.len() as f64 * 100.0,
                failed
            );

            let ran: Vec<_> = group.iter().filter(|r| r.outcome != "failed").collect();
            if !ran.is_empty() {
                let count = ran.len() as f64;
                let avg_replans = ran.iter().map(|r| r.replans as f64).sum::<f64>() / count;
                let avg_obstacles =
                    ran.iter().map(|r| r.obstacles_placed as f64).sum::<f64>() / count;
                println!("  Average replans: {avg_replans:.2}");
                println!("  Average obstacles placed: {avg_obstacles:.1}");
            }
            if !reached.is_empty() {
                let n = reached.len() as f64;
                let avg_moves = reached.iter().map(|r| r.total_moves as f64).sum::<f64>() / n;
                let avg_efficiency = reached.iter().map(|r| r.route_efficiency).sum::<f64>() / n;
                let avg_time = reached.iter().map(|r| r.execution_time_ms as f64).sum::<f64>() / n;
                println!("  Average moves: {avg_moves:.1}");
                println!("  Average efficiency: {avg_efficiency:.3}");
                println!("  Average execution time: {avg_time:.1}ms");
            }
        }
    }
}
