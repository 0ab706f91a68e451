//! Step notification contract between the engine and whatever renders it.
//!
//! Strategies call [`StepObserver::on_step`] once per expanded cell and once
//! per path-reconstruction step; the replanner calls it after every move and
//! obstacle injection. The observer only ever sees a shared view of the grid,
//! so it cannot mutate it mid-run.

use crate::grid::Grid;

pub trait StepObserver {
    fn on_step(&mut self, grid: &Grid);

    /// Checked after every expansion; returning `true` aborts the search with
    /// [`SearchError::Cancelled`](crate::error::SearchError::Cancelled).
    fn should_cancel(&self) -> bool {
        false
    }
}

impl<F> StepObserver for F
where
    F: FnMut(&Grid),
{
    fn on_step(&mut self, grid: &Grid) {
        self(grid)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _grid: &Grid) {}
}

/// Counts notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepCounter {
    pub steps: usize,
}

impl StepObserver for StepCounter {
    fn on_step(&mut self, _grid: &Grid) {
        self.steps += 1;
    }
}

/// Cooperative cancellation after a fixed number of notifications.
#[derive(Debug, Clone, Copy)]
pub struct StepBudget {
    limit: usize,
    steps: usize,
}

impl StepBudget {
    pub fn new(limit: usize) -> Self {
        StepBudget { limit, steps: 0 }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn exhausted(&self) -> bool {
        self.steps >= self.limit
    }
}

impl StepObserver for StepBudget {
    fn on_step(&mut self, _grid: &Grid) {
        self.steps += 1;
    }

    fn should_cancel(&self) -> bool {
        self.exhausted()
    }
}
