use crate::grid::{move_cost_tenths, Grid, Position, VisitState, COST_SCALE};
use crate::observer::StepObserver;
use log::warn;

/// An ordered route from a search seed to its target, both inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<Position>);

impl Path {
    pub fn new(cells: Vec<Position>) -> Self {
        Path(cells)
    }

    pub fn cells(&self) -> &[Position] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of moves, one less than the number of cells.
    pub fn hops(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<Position> {
        self.0.first().copied()
    }

    pub fn target(&self) -> Option<Position> {
        self.0.last().copied()
    }

    pub fn get(&self, i: usize) -> Option<Position> {
        self.0.get(i).copied()
    }

    /// Total move cost in tenths.
    pub fn cost_tenths(&self) -> u32 {
        self.0.windows(2).map(|w| move_cost_tenths(w[0], w[1])).sum()
    }

    /// Total move cost (1.0 per straight step, 1.4 per diagonal step).
    pub fn cost(&self) -> f64 {
        f64::from(self.cost_tenths()) / COST_SCALE
    }

    /// True when every consecutive pair of cells are 8-neighbours.
    pub fn is_connected(&self) -> bool {
        self.0.windows(2).all(|w| w[0].is_adjacent(&w[1]))
    }

    pub fn into_inner(self) -> Vec<Position> {
        self.0
    }
}

impl IntoIterator for Path {
    type Item = Position;
    type IntoIter = std::vec::IntoIter<Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Follows `parent_of` from `from` until it reaches a cell with no parent,
/// marking each cell `OnPath` (except `seed`) and notifying the observer once
/// per cell. Returns the chain in `from → root` order, or `None` when the
/// chain does not end at `root` or is longer than the grid (a cycle).
///
/// Nothing is marked when the chain is rejected.
pub fn trace_chain(
    grid: &mut Grid,
    from: Position,
    root: Position,
    seed: Position,
    mut parent_of: impl FnMut(Position) -> Option<Position>,
    observer: &mut dyn StepObserver,
) -> Option<Vec<Position>> {
    let mut chain = vec![from];
    let mut current = from;
    while let Some(parent) = parent_of(current) {
        if chain.len() >= grid.len() {
            warn!("parent chain from {from} exceeds {} cells, discarding", grid.len());
            return None;
        }
        chain.push(parent);
        current = parent;
    }
    if current != root {
        return None;
    }

    for &pos in &chain {
        if pos != seed {
            grid.mark(pos, VisitState::OnPath);
        }
        observer.on_step(grid);
    }
    Some(chain)
}

/// Reconstructs the `start → target` path from a flat parent array.
///
/// A target whose chain does not lead back to `start` yields an empty path;
/// that only happens when the calling strategy never reached the target.
pub fn reconstruct(
    grid: &mut Grid,
    parents: &[Option<usize>],
    start: Position,
    target: Position,
    observer: &mut dyn StepObserver,
) -> Path {
    let cols = grid.cols();
    let parent_of = |pos: Position| {
        parents
            .get(pos.row * cols + pos.col)
            .copied()
            .flatten()
            .map(|idx| Position::new(idx / cols, idx % cols))
    };
    match trace_chain(grid, target, start, start, parent_of, observer) {
        Some(mut chain) => {
            chain.reverse();
            Path(chain)
        }
        None => {
            if target != start && parent_of(target).is_some() {
                warn!("parent chain from {target} does not reach {start}");
            }
            Path::default()
        }
    }
}
