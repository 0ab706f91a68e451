//! Uninformed grid pathfinding with obstacle-reactive replanning.
//!
//! Six strategies ([`Algorithm`]) search an 8-connected [`Grid`] and report
//! each expansion to a [`StepObserver`]. [`DynamicReplanner`] walks the
//! resulting route while obstacles appear, re-searching from the agent's cell
//! whenever the way ahead is blocked.

pub mod algorithms;
pub mod batch_simulation;
pub mod config;
pub mod error;
pub mod grid;
pub mod observer;
pub mod path;
pub mod replanner;
pub mod simulation;
pub mod statistics;

pub use algorithms::{run_search, run_strategy, Algorithm, SearchReport, SearchStrategy};
pub use error::{Error, GridError, SearchError};
pub use grid::{Grid, Position, Terrain, VisitState};
pub use observer::{NoopObserver, StepBudget, StepCounter, StepObserver};
pub use path::Path;
pub use replanner::{
    run_dynamic_follow, run_dynamic_follow_seeded, DynamicReplanner, FollowOutcome, FollowReport,
    GridMutationSource, NoMutations, RandomObstacles,
};
