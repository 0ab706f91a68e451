//! Error types for grid construction, search invocation and the simulation shell.
//!
//! "No path" is deliberately absent: a search that exhausts its frontier
//! returns `found == false`, and a replanner that cannot reroute reports
//! [`FollowOutcome::Stuck`](crate::replanner::FollowOutcome::Stuck).

use crate::grid::Position;
use std::fmt;

/// Which designated endpoint an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Target => write!(f, "target"),
        }
    }
}

/// Errors arising from grid construction or mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Attempted to construct a grid with zero rows or columns.
    EmptyGrid,
    /// A position lies outside the grid.
    OutOfBounds {
        position: Position,
        rows: usize,
        cols: usize,
    },
    /// The start or target designation cannot be blocked.
    Designated { position: Position, endpoint: Endpoint },
    /// An ASCII map could not be parsed.
    Parse {
        /// 1-based line number, 0 when the error concerns the whole map.
        line: usize,
        reason: String,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid must have at least one row and one column"),
            Self::OutOfBounds {
                position,
                rows,
                cols,
            } => write!(f, "position {position} outside {rows}x{cols} grid"),
            Self::Designated { position, endpoint } => {
                write!(f, "cannot block {endpoint} cell at {position}")
            }
            Self::Parse { line: 0, reason } => write!(f, "invalid map: {reason}"),
            Self::Parse { line, reason } => write!(f, "invalid map at line {line}: {reason}"),
        }
    }
}

impl std::error::Error for GridError {}

/// Errors that stop a search or a dynamic follow before it produces a result.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    /// An endpoint lies outside the grid.
    EndpointOutOfBounds {
        endpoint: Endpoint,
        position: Position,
    },
    /// An endpoint sits on a blocked cell.
    EndpointBlocked {
        endpoint: Endpoint,
        position: Position,
    },
    /// Obstacle probability is not within `[0, 1]`.
    InvalidProbability(f64),
    /// The step observer asked the search to stop.
    Cancelled { steps: usize },
}

impl SearchError {
    /// True for the precondition failures that are rejected before a search begins.
    pub fn is_invalid_configuration(&self) -> bool {
        !matches!(self, Self::Cancelled { .. })
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointOutOfBounds { endpoint, position } => {
                write!(f, "invalid configuration: {endpoint} {position} is out of bounds")
            }
            Self::EndpointBlocked { endpoint, position } => {
                write!(f, "invalid configuration: {endpoint} {position} is blocked")
            }
            Self::InvalidProbability(p) => {
                write!(f, "invalid configuration: obstacle probability {p} not in [0, 1]")
            }
            Self::Cancelled { steps } => write!(f, "search cancelled after {steps} steps"),
        }
    }
}

impl std::error::Error for SearchError {}

/// Top-level error for the simulation shell and binary.
#[derive(Debug)]
pub enum Error {
    Grid(GridError),
    Search(SearchError),
    /// The generated environment has no route from start to target.
    NoInitialPath { start: Position, target: Position },
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "{e}"),
            Self::Search(e) => write!(f, "{e}"),
            Self::NoInitialPath { start, target } => write!(
                f,
                "no valid path exists from {start} to {target}; try fewer walls or a larger grid"
            ),
            Self::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Search(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::NoInitialPath { .. } => None,
        }
    }
}

impl From<GridError> for Error {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<SearchError> for Error {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
