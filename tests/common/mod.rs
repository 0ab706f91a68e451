use proptest::prelude::*;
use uninformed_pathfinding::{Grid, Position};

/// Random grids up to `max_side` x `max_side` with roughly `density` walls.
/// Start and target are never walled.
pub fn arb_grid(max_side: usize, density: f64) -> impl Strategy<Value = Grid> {
    (1..=max_side, 1..=max_side)
        .prop_flat_map(move |(rows, cols)| {
            let cells = rows * cols;
            (
                Just(rows),
                Just(cols),
                prop::collection::vec(prop::bool::weighted(density), cells),
                0..cells,
                0..cells,
            )
        })
        .prop_map(|(rows, cols, walls, start, target)| {
            let at = |i: usize| Position::new(i / cols, i % cols);
            let mut grid = Grid::new(rows, cols, at(start), at(target)).unwrap();
            for (i, wall) in walls.into_iter().enumerate() {
                let pos = at(i);
                if wall && pos != grid.start() && pos != grid.target() {
                    grid.set_blocked(pos, true).unwrap();
                }
            }
            grid
        })
}

/// Hop count of a shortest route, from the `pathfinding` crate.
pub fn reference_hops(grid: &Grid, from: Position, to: Position) -> Option<usize> {
    pathfinding::prelude::bfs(&from, |&p| grid.neighbors(p), |&p| p == to)
        .map(|path| path.len() - 1)
}
