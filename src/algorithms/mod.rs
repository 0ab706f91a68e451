pub mod bfs;
pub mod bidirectional;
pub mod common;
pub mod dfs;
pub mod iddfs;
pub mod ucs;

use crate::error::SearchError;
use crate::grid::{Grid, Position};
use crate::observer::StepObserver;
use crate::path::Path;
use clap::ValueEnum;
use log::debug;
use std::fmt;
use std::time::{Duration, Instant};

pub use bfs::BreadthFirst;
pub use bidirectional::Bidirectional;
pub use common::{SearchContext, SearchRun, SearchStrategy};
pub use dfs::DepthFirst;
pub use iddfs::{DepthLimited, IterativeDeepening, DEFAULT_DEPTH_LIMIT};
pub use ucs::UniformCost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Algorithm {
    #[value(name = "bfs")]
    BreadthFirst,
    #[value(name = "dfs")]
    DepthFirst,
    #[value(name = "ucs")]
    UniformCost,
    #[value(name = "iddfs")]
    IterativeDeepening,
    #[value(name = "dls")]
    DepthLimited,
    #[value(name = "bidirectional")]
    Bidirectional,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::BreadthFirst,
        Algorithm::DepthFirst,
        Algorithm::UniformCost,
        Algorithm::IterativeDeepening,
        Algorithm::DepthLimited,
        Algorithm::Bidirectional,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BreadthFirst => "bfs",
            Algorithm::DepthFirst => "dfs",
            Algorithm::UniformCost => "ucs",
            Algorithm::IterativeDeepening => "iddfs",
            Algorithm::DepthLimited => "dls",
            Algorithm::Bidirectional => "bidirectional",
        }
    }

    pub fn strategy(self) -> Box<dyn SearchStrategy> {
        self.with_depth_limit(DEFAULT_DEPTH_LIMIT)
    }

    /// Like [`strategy`](Self::strategy); `limit` only affects `DepthLimited`.
    pub fn with_depth_limit(self, limit: usize) -> Box<dyn SearchStrategy> {
        match self {
            Algorithm::BreadthFirst => Box::new(BreadthFirst),
            Algorithm::DepthFirst => Box::new(DepthFirst),
            Algorithm::UniformCost => Box::new(UniformCost),
            Algorithm::IterativeDeepening => Box::new(IterativeDeepening),
            Algorithm::DepthLimited => Box::new(DepthLimited::new(limit)),
            Algorithm::Bidirectional => Box::new(Bidirectional),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a single search invocation.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub algorithm: &'static str,
    pub found: bool,
    /// Start → target, empty when nothing was found.
    pub path: Path,
    /// Cells dequeued/popped, summed over every pass.
    pub expanded: usize,
    pub visit_order: Vec<Position>,
    pub elapsed: Duration,
}

/// Runs `algorithm` from `start` to `target`.
///
/// Endpoint problems are rejected before any cell is touched. Exhausting the
/// frontier is not an error: it comes back as `found == false`.
pub fn run_search(
    algorithm: Algorithm,
    grid: &mut Grid,
    start: Position,
    target: Position,
    observer: &mut dyn StepObserver,
) -> Result<SearchReport, SearchError> {
    run_strategy(algorithm.strategy().as_ref(), grid, start, target, observer)
}

pub fn run_strategy(
    strategy: &dyn SearchStrategy,
    grid: &mut Grid,
    start: Position,
    target: Position,
    observer: &mut dyn StepObserver,
) -> Result<SearchReport, SearchError> {
    let started = Instant::now();
    let mut ctx = SearchContext::new(grid, start, target, observer)?;
    let found = strategy.search(&mut ctx)?;
    let (run, path) = ctx.into_parts();
    let elapsed = started.elapsed();

    debug!(
        "{} {start} -> {target}: found={found} hops={} expanded={} in {elapsed:.2?}",
        strategy.name(),
        path.hops(),
        run.expanded()
    );

    Ok(SearchReport {
        algorithm: strategy.name(),
        found,
        path,
        expanded: run.expanded(),
        visit_order: run.visit_order().to_vec(),
        elapsed,
    })
}
