use crate::algorithms::{run_strategy, Algorithm, SearchReport};
use crate::config::Config;
use crate::error::{Error, SearchError};
use crate::grid::{Grid, Position};
use crate::observer::StepBudget;
use crate::replanner::{DynamicReplanner, FollowReport, RandomObstacles};
use crate::statistics::SearchStatistics;
use log::{debug, info};
use pathfinding::prelude::bfs;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use std::time::Instant;

/// Keeps the obstacle stream independent of the wall layout drawn from the same seed.
const OBSTACLE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Clone)]
pub struct EnvironmentSetup {
    pub rows: usize,
    pub cols: usize,
    pub start: Position,
    pub target: Position,
    pub walls: FxHashSet<Position>,
    pub seed: u64,
}

impl EnvironmentSetup {
    /// Random walls with the start in the top-left quadrant and the target in
    /// the bottom-right one. The same seed always gives the same layout.
    pub fn generate(config: &Config, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let (rows, cols) = (config.rows.max(1), config.cols.max(1));

        let start = Position::new(
            rng.gen_range(0..(rows / 2).max(1)),
            rng.gen_range(0..(cols / 2).max(1)),
        );
        let target = Position::new(rng.gen_range(rows / 2..rows), rng.gen_range(cols / 2..cols));

        let mut walls = FxHashSet::default();
        let mut attempts = 0;
        while walls.len() < config.num_walls && attempts < config.num_walls * 3 {
            let pos = Position::new(rng.gen_range(0..rows), rng.gen_range(0..cols));
            if pos != start && pos != target {
                walls.insert(pos);
            }
            attempts += 1;
        }

        debug!(
            "generated {rows}x{cols} environment (seed {seed}): \
             start {start}, target {target}, {} walls",
            walls.len()
        );

        EnvironmentSetup {
            rows,
            cols,
            start,
            target,
            walls,
            seed,
        }
    }

    pub fn create_grid(&self) -> Result<Grid, Error> {
        let mut grid = Grid::new(self.rows, self.cols, self.start, self.target)?;
        for &wall in &self.walls {
            grid.set_blocked(wall, true)?;
        }
        Ok(grid)
    }
}

/// Fewest moves between two cells over the same neighbour relation the
/// strategies use, computed independently of them.
pub fn shortest_hops(grid: &Grid, from: Position, to: Position) -> Option<usize> {
    bfs(&from, |&p| grid.neighbors(p), |&p| p == to).map(|path| path.len() - 1)
}

pub fn baseline_hops(grid: &Grid) -> Option<usize> {
    shortest_hops(grid, grid.start(), grid.target())
}

/// One generated environment and the runs made on it.
pub struct Simulation {
    config: Config,
    environment: EnvironmentSetup,
    grid: Grid,
    optimal_path_length: usize,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self, Error> {
        let environment = EnvironmentSetup::generate(&config, config.seed);
        Self::with_environment(config, environment)
    }

    /// Fails with [`Error::NoInitialPath`] when the walls cut the target off.
    pub fn with_environment(config: Config, environment: EnvironmentSetup) -> Result<Self, Error> {
        let grid = environment.create_grid()?;
        let optimal_path_length = baseline_hops(&grid).ok_or(Error::NoInitialPath {
            start: environment.start,
            target: environment.target,
        })?;

        Ok(Simulation {
            config,
            environment,
            grid,
            optimal_path_length,
        })
    }

    pub fn environment(&self) -> &EnvironmentSetup {
        &self.environment
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn optimal_path_length(&self) -> usize {
        self.optimal_path_length
    }

    /// A single static search with the configured algorithm.
    pub fn search(&mut self) -> Result<SearchReport, Error> {
        let strategy = self.config.algorithm.with_depth_limit(self.config.depth_limit);
        let mut budget = StepBudget::new(self.config.max_steps);
        let (start, target) = (self.environment.start, self.environment.target);
        let report = run_strategy(strategy.as_ref(), &mut self.grid, start, target, &mut budget)?;
        Ok(report)
    }

    /// Follows a route from start to target while obstacles appear at the
    /// configured probability.
    pub fn run(&mut self) -> Result<FollowReport, Error> {
        let source = RandomObstacles::seeded(
            self.config.obstacle_probability,
            self.environment.seed ^ OBSTACLE_SEED_SALT,
        )?;
        let mut replanner = DynamicReplanner::new(source)
            .with_initial_strategy(self.config.algorithm.with_depth_limit(self.config.depth_limit));
        let mut budget = StepBudget::new(self.config.max_steps);
        let (start, target) = (self.environment.start, self.environment.target);

        self.grid.clear_obstacles();
        let report = replanner.follow(&mut self.grid, start, target, &mut budget)?;

        info!(
            "{} follow {}: {} moves, {} replans, {} obstacles",
            self.config.algorithm,
            report.outcome,
            report.statistics.total_moves,
            report.statistics.replans,
            report.statistics.obstacles_placed
        );
        Ok(report)
    }

    /// Runs every algorithm once on the same environment, each under its own
    /// step budget. A run that exhausts the budget is reported, not fatal.
    pub fn run_all_algorithms(config: Config) -> Result<Vec<SearchStatistics>, Error> {
        let simulation = Simulation::new(config)?;
        let environment = &simulation.environment;
        let config = &simulation.config;

        if !config.quiet {
            println!("Running comparison of {} algorithms...", Algorithm::ALL.len());
            println!("Environment seed: {} (for reproducibility)", environment.seed);
            println!(
                "Environment: Grid {}x{}, Walls: {}",
                environment.rows,
                environment.cols,
                environment.walls.len()
            );
            println!("Start: {}, Target: {}", environment.start, environment.target);
            println!("Optimal path (hops): {}", simulation.optimal_path_length);
            println!();
        }

        let mut results = Vec::with_capacity(Algorithm::ALL.len());
        for algorithm in Algorithm::ALL {
            let strategy = algorithm.with_depth_limit(config.depth_limit);
            let mut grid = simulation.grid.clone();
            let mut budget = StepBudget::new(config.max_steps);
            let started = Instant::now();

            let row = match run_strategy(
                strategy.as_ref(),
                &mut grid,
                environment.start,
                environment.target,
                &mut budget,
            ) {
                Ok(report) => SearchStatistics::from(&report),
                Err(SearchError::Cancelled { steps }) => {
                    info!("{algorithm} cancelled after {steps} steps");
                    SearchStatistics::cancelled(strategy.name(), steps, started.elapsed())
                }
                Err(e) => return Err(e.into()),
            };
            debug!("{algorithm}: found={} expanded={}", row.found, row.expanded);
            results.push(row);
        }

        Ok(results)
    }

    pub fn print_comparison_results(results: &[SearchStatistics]) {
        println!("\n=== ALGORITHM COMPARISON RESULTS ===");
        println!();
        println!("{}", SearchStatistics::header());
        println!("{}", "-".repeat(66));
        for result in results {
            println!("{result}");
        }
        println!();

        let found: Vec<_> = results.iter().filter(|r| r.found).collect();
        if found.is_empty() {
            println!("No algorithm reached the target.");
            return;
        }

        println!("=== PERFORMANCE ANALYSIS ===");
        if let Some(cheapest) = found.iter().min_by(|a, b| a.cost.total_cmp(&b.cost)) {
            println!("Cheapest route: {} ({:.1})", cheapest.algorithm, cheapest.cost);
        }
        if let Some(shortest) = found.iter().min_by_key(|r| r.hops) {
            println!("Fewest hops: {} ({} hops)", shortest.algorithm, shortest.hops);
        }
        if let Some(leanest) = found.iter().min_by_key(|r| r.expanded) {
            println!("Fewest expansions: {} ({} cells)", leanest.algorithm, leanest.expanded);
        }
        if let Some(fastest) = found.iter().min_by_key(|r| r.elapsed) {
            println!("Fastest: {} ({:.2?})", fastest.algorithm, fastest.elapsed);
        }

        let cancelled: Vec<_> =
            results.iter().filter(|r| r.cancelled).map(|r| r.algorithm).collect();
        if !cancelled.is_empty() {
            println!("Cancelled by step budget: {}", cancelled.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replanner::FollowOutcome;
    use clap::Parser;

    fn config(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("pathfinder").chain(args.iter().copied()))
    }

    #[test]
    fn environment_respects_quadrants_and_seed() {
        let config = config(&["--rows", "10", "--cols", "12", "--num-walls", "30"]);
        let a = EnvironmentSetup::generate(&config, Some(5));
        let b = EnvironmentSetup::generate(&config, Some(5));

        assert_eq!(a.start, b.start);
        assert_eq!(a.target, b.target);
        assert_eq!(a.walls, b.walls);
        assert!(a.start.row < 5 && a.start.col < 6);
        assert!(a.target.row >= 5 && a.target.col >= 6);
        assert!(a.walls.len() <= 30);
        assert!(!a.walls.contains(&a.start) && !a.walls.contains(&a.target));

        let grid = a.create_grid().unwrap();
        assert_eq!(grid.blocked_count(), a.walls.len());
    }

    #[test]
    fn tiny_grids_still_generate() {
        let config = config(&["--rows", "1", "--cols", "1", "--num-walls", "4"]);
        let env = EnvironmentSetup::generate(&config, Some(1));
        assert_eq!(env.start, Position::new(0, 0));
        assert_eq!(env.target, Position::new(0, 0));
        assert!(env.walls.is_empty());
    }

    #[test]
    fn open_grid_baseline_is_chebyshev_distance() {
        let config = config(&["--rows", "8", "--cols", "8", "--num-walls", "0", "--seed", "11"]);
        let simulation = Simulation::new(config).unwrap();
        let env = simulation.environment();
        let expected = env
            .start
            .row
            .abs_diff(env.target.row)
            .max(env.start.col.abs_diff(env.target.col));
        assert_eq!(simulation.optimal_path_length(), expected);
    }

    #[test]
    fn walled_in_start_has_no_initial_path() {
        let walls = [(0, 1), (1, 0), (1, 1)]
            .into_iter()
            .map(|(r, c)| Position::new(r, c))
            .collect();
        let environment = EnvironmentSetup {
            rows: 4,
            cols: 4,
            start: Position::new(0, 0),
            target: Position::new(3, 3),
            walls,
            seed: 0,
        };
        let result = Simulation::with_environment(config(&[]), environment);
        assert!(matches!(result, Err(Error::NoInitialPath { .. })));
    }

    #[test]
    fn obstacle_free_follow_matches_baseline() {
        let config = config(&[
            "--rows",
            "10",
            "--cols",
            "10",
            "--num-walls",
            "0",
            "--seed",
            "3",
            "--obstacle-probability",
            "0",
        ]);
        let mut simulation = Simulation::new(config).unwrap();
        let report = simulation.run().unwrap();
        assert_eq!(report.outcome, FollowOutcome::Reached);
        assert_eq!(report.statistics.total_moves, simulation.optimal_path_length());
        assert_eq!(report.statistics.obstacles_placed, 0);
        assert!((report.statistics.route_efficiency - 1.0).abs() < 1e-9);
    }

    #[test]
    fn search_mode_uses_configured_algorithm() {
        let config = config(&[
            "--rows",
            "6",
            "--cols",
            "6",
            "--num-walls",
            "0",
            "--seed",
            "2",
            "--algorithm",
            "ucs",
        ]);
        let mut simulation = Simulation::new(config).unwrap();
        let report = simulation.search().unwrap();
        assert_eq!(report.algorithm, "ucs");
        assert!(report.found);
        assert_eq!(report.path.hops(), simulation.optimal_path_length());
    }

    #[test]
    fn comparison_covers_every_algorithm() {
        let config = config(&[
            "--rows",
            "5",
            "--cols",
            "5",
            "--num-walls",
            "0",
            "--seed",
            "8",
            "--max-steps",
            "200000",
            "--quiet",
        ]);
        let results = Simulation::run_all_algorithms(config).unwrap();
        let names: Vec<_> = results.iter().map(|r| r.algorithm).collect();
        assert_eq!(names, vec!["bfs", "dfs", "ucs", "iddfs", "dls", "bidirectional"]);

        let bfs = &results[0];
        assert!(bfs.found);
        for row in &results {
            if row.algorithm == "dls" {
                // A fixed-limit pass without a visited set may run out of budget.
                assert!(row.found || row.cancelled);
                continue;
            }
            assert!(row.found, "{}", row.algorithm);
            assert!(row.hops >= bfs.hops, "{}", row.algorithm);
        }
        assert_eq!(results[3].hops, bfs.hops);
    }

    #[test]
    fn comparison_reports_budget_exhaustion() {
        let config = config(&[
            "--rows",
            "12",
            "--cols",
            "12",
            "--num-walls",
            "0",
            "--seed",
            "4",
            "--max-steps",
            "3",
            "--quiet",
        ]);
        let results = Simulation::run_all_algorithms(config).unwrap();
        assert!(results.iter().any(|r| r.cancelled));
        assert!(results.iter().filter(|r| r.cancelled).all(|r| !r.found && r.expanded == 3));
    }
}
