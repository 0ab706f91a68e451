use crate::error::SearchError;
use crate::grid::{Grid, Position, VisitState};
use crate::observer::StepObserver;
use crate::path::{self, Path};

/// An uninformed search over a [`Grid`].
///
/// Implementations expand cells through the context, calling
/// [`SearchContext::step`] once per dequeued/popped cell, and finish with
/// [`SearchContext::finish_path`] when the target is reached.
pub trait SearchStrategy {
    fn name(&self) -> &'static str;

    /// Returns `Ok(true)` when the target was reached and the path recorded.
    fn search(&self, ctx: &mut SearchContext<'_>) -> Result<bool, SearchError>;
}

/// Per-invocation search state. Discarded when the invocation returns.
#[derive(Debug, Clone)]
pub struct SearchRun {
    parent: Vec<Option<usize>>,
    cost: Vec<u32>,
    expanded: usize,
    visit_order: Vec<Position>,
}

impl SearchRun {
    pub fn new(cells: usize) -> Self {
        SearchRun {
            parent: vec![None; cells],
            cost: vec![u32::MAX; cells],
            expanded: 0,
            visit_order: Vec::new(),
        }
    }

    /// Clears parents and costs. The expansion counter and order keep
    /// accumulating across resets so iterative deepening reports total work.
    pub fn reset(&mut self) {
        self.parent.fill(None);
        self.cost.fill(u32::MAX);
    }

    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn visit_order(&self) -> &[Position] {
        &self.visit_order
    }
}

/// Everything a strategy touches during one invocation.
pub struct SearchContext<'a> {
    grid: &'a mut Grid,
    run: SearchRun,
    start: Position,
    target: Position,
    observer: &'a mut dyn StepObserver,
    path: Path,
}

impl<'a> SearchContext<'a> {
    /// Validates the endpoints and clears transient state left by earlier runs.
    pub fn new(
        grid: &'a mut Grid,
        start: Position,
        target: Position,
        observer: &'a mut dyn StepObserver,
    ) -> Result<Self, SearchError> {
        grid.validate_endpoints(start, target)?;
        grid.reset_keep_walls();
        let run = SearchRun::new(grid.len());
        Ok(SearchContext {
            grid,
            run,
            start,
            target,
            observer,
            path: Path::default(),
        })
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn target(&self) -> Position {
        self.target
    }

    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        self.grid.neighbors(pos)
    }

    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    /// Marks a cell; the search seed keeps its designation and is never painted.
    pub fn mark(&mut self, pos: Position, state: VisitState) {
        if pos != self.start {
            self.grid.mark(pos, state);
        }
    }

    pub fn set_parent(&mut self, pos: Position, parent: Option<Position>) {
        let idx = self.grid.index(pos);
        self.run.parent[idx] = parent.map(|p| self.grid.index(p));
    }

    /// Cost so far in tenths, `u32::MAX` when unreached.
    pub fn cost(&self, pos: Position) -> u32 {
        self.run.cost[self.grid.index(pos)]
    }

    pub fn set_cost(&mut self, pos: Position, cost: u32) {
        let idx = self.grid.index(pos);
        self.run.cost[idx] = cost;
    }

    /// Records one expansion of `pos`, notifies the observer and honours
    /// cooperative cancellation.
    pub fn step(&mut self, pos: Position) -> Result<(), SearchError> {
        self.run.expanded += 1;
        self.run.visit_order.push(pos);
        self.observer.on_step(&*self.grid);
        if self.observer.should_cancel() {
            return Err(SearchError::Cancelled {
                steps: self.run.expanded,
            });
        }
        Ok(())
    }

    /// Clears visit marks, parents and costs between passes of a multi-pass search.
    pub fn reset_transient(&mut self) {
        self.grid.reset_keep_walls();
        self.run.reset();
    }

    /// Rebuilds the path from the parent links and records it.
    /// Returns whether a non-empty path was produced.
    pub fn finish_path(&mut self) -> bool {
        self.path = path::reconstruct(
            self.grid,
            &self.run.parent,
            self.start,
            self.target,
            self.observer,
        );
        !self.path.is_empty()
    }

    /// Walks an arbitrary parent relation towards `root`, marking it on path.
    pub fn trace(
        &mut self,
        from: Position,
        root: Position,
        parent_of: impl FnMut(Position) -> Option<Position>,
    ) -> Option<Vec<Position>> {
        path::trace_chain(self.grid, from, root, self.start, parent_of, self.observer)
    }

    /// Records a path assembled by the strategy itself.
    pub fn set_path(&mut self, path: Path) {
        self.path = path;
    }

    pub fn into_parts(self) -> (SearchRun, Path) {
        (self.run, self.path)
    }
}
