use crate::algorithms::{Algorithm, DEFAULT_DEPTH_LIMIT};
use crate::replanner::DEFAULT_OBSTACLE_PROBABILITY;
use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One static search, no obstacles.
    Search,
    /// Every algorithm on the same environment.
    Compare,
    /// An agent following its route while obstacles appear.
    Follow,
    /// Obstacle-probability sweep written to CSV.
    Batch,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    #[arg(long, default_value_t = 20)]
    pub cols: usize,

    #[arg(long, default_value_t = 50)]
    pub num_walls: usize,

    #[arg(long, value_enum, default_value_t = Algorithm::BreadthFirst)]
    pub algorithm: Algorithm,

    /// Limit for the `dls` algorithm.
    #[arg(long, default_value_t = DEFAULT_DEPTH_LIMIT)]
    pub depth_limit: usize,

    #[arg(long, value_enum, default_value_t = Mode::Follow)]
    pub mode: Mode,

    #[arg(long, default_value_t = DEFAULT_OBSTACLE_PROBABILITY)]
    pub obstacle_probability: f64,

    /// Seed for walls, endpoints and obstacles; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Observer notifications allowed per search or follow before it is cancelled.
    #[arg(long, default_value_t = 1_000_000)]
    pub max_steps: usize,

    #[arg(long, default_value_t = false)]
    pub show_grid: bool,

    #[arg(long, default_value_t = 10)]
    pub num_simulations: usize,

    #[arg(long, default_value_t = 0.0)]
    pub min_probability: f64,

    #[arg(long, default_value_t = 0.5)]
    pub max_probability: f64,

    #[arg(long, default_value_t = 0.1)]
    pub probability_step: f64,

    #[arg(long, default_value = "batch_results.csv")]
    pub output_file: String,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// -v for info, -vv for debug, -vvv for trace. RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn log_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
