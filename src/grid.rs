use crate::error::{Endpoint, GridError, SearchError};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// True when `other` is one of the 8 cells surrounding `self`.
    pub fn is_adjacent(&self, other: &Position) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr <= 1 && dc <= 1 && (dr, dc) != (0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Neighbour offsets as (row, col) deltas, clockwise from Up:
/// Up, Up-Right, Right, Down-Right, Down, Down-Left, Left, Up-Left.
///
/// Stack-based strategies push these reversed so pops come out in this order.
pub const CLOCKWISE: [(isize, isize); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Move cost in tenths: straight steps cost 10, diagonal steps 14.
pub const STRAIGHT_COST: u32 = 10;
pub const DIAGONAL_COST: u32 = 14;
pub const COST_SCALE: f64 = 10.0;

/// Cost of a single move between neighbours, in tenths.
pub fn move_cost_tenths(from: Position, to: Position) -> u32 {
    if from.row != to.row && from.col != to.col {
        DIAGONAL_COST
    } else {
        STRAIGHT_COST
    }
}

/// Cost of a single move between neighbours: 1.0 straight, 1.4 diagonal.
pub fn move_cost(from: Position, to: Position) -> f64 {
    f64::from(move_cost_tenths(from, to)) / COST_SCALE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Open,
    /// Static blockage, placed by the map or the editing layer.
    Wall,
    /// Dynamic blockage injected while an agent is moving.
    Obstacle,
}

/// Search bookkeeping visible to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitState {
    #[default]
    Unvisited,
    Frontier,
    Explored,
    OnPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub terrain: Terrain,
    pub state: VisitState,
}

impl Cell {
    const OPEN: Cell = Cell {
        terrain: Terrain::Open,
        state: VisitState::Unvisited,
    };

    pub fn is_blocked(&self) -> bool {
        self.terrain != Terrain::Open
    }
}

/// Fixed-size grid of cells with start, target and (optionally) agent designations.
///
/// The shape never changes after construction; terrain and visit state do.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Position,
    target: Position,
    agent: Option<Position>,
}

impl Grid {
    pub fn new(
        rows: usize,
        cols: usize,
        start: Position,
        target: Position,
    ) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        let grid = Grid {
            rows,
            cols,
            cells: vec![Cell::OPEN; rows * cols],
            start,
            target,
            agent: None,
        };
        grid.check_bounds(start)?;
        grid.check_bounds(target)?;
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn target(&self) -> Position {
        self.target
    }

    /// Current agent location while a dynamic follow is in progress.
    pub fn agent(&self) -> Option<Position> {
        self.agent
    }

    pub fn set_agent(&mut self, agent: Option<Position>) {
        self.agent = agent;
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn check_bounds(&self, pos: Position) -> Result<(), GridError> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                position: pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Flat index of an in-bounds position.
    pub(crate) fn index(&self, pos: Position) -> usize {
        debug_assert!(self.in_bounds(pos), "{pos} outside grid");
        pos.row * self.cols + pos.col
    }

    pub fn position(&self, index: usize) -> Position {
        Position::new(index / self.cols, index % self.cols)
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if self.in_bounds(pos) {
            Some(&self.cells[self.index(pos)])
        } else {
            None
        }
    }

    /// Out-of-bounds positions count as blocked.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.cell(pos).map_or(true, Cell::is_blocked)
    }

    pub fn terrain(&self, pos: Position) -> Option<Terrain> {
        self.cell(pos).map(|c| c.terrain)
    }

    pub fn state(&self, pos: Position) -> Option<VisitState> {
        self.cell(pos).map(|c| c.state)
    }

    /// Callers pass in-bounds positions.
    pub(crate) fn mark(&mut self, pos: Position, state: VisitState) {
        let idx = self.index(pos);
        self.cells[idx].state = state;
    }

    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_blocked()).count()
    }

    /// Returns the in-bounds, unblocked neighbours of `pos` in clockwise order
    /// starting from Up. Diagonals are allowed even when both orthogonal cells
    /// beside them are blocked.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        let mut neighbors = Vec::with_capacity(8);
        for (dr, dc) in CLOCKWISE {
            let (Some(row), Some(col)) =
                (pos.row.checked_add_signed(dr), pos.col.checked_add_signed(dc))
            else {
                continue;
            };
            let next = Position::new(row, col);
            if self.in_bounds(next) && !self.cells[self.index(next)].is_blocked() {
                neighbors.push(next);
            }
        }
        neighbors
    }

    /// Sets or clears a wall. The start and target cells cannot be blocked.
    pub fn set_blocked(&mut self, pos: Position, blocked: bool) -> Result<(), GridError> {
        self.check_bounds(pos)?;
        if blocked {
            if let Some(endpoint) = self.designation(pos) {
                return Err(GridError::Designated {
                    position: pos,
                    endpoint,
                });
            }
        }
        let idx = self.index(pos);
        self.cells[idx].terrain = if blocked { Terrain::Wall } else { Terrain::Open };
        Ok(())
    }

    /// Flips an open cell to a wall or a blocked cell back to open, the way the
    /// editing layer does between runs. Returns the new blocked flag.
    pub fn toggle_wall(&mut self, pos: Position) -> Result<bool, GridError> {
        let blocked = !self.is_blocked(pos);
        self.set_blocked(pos, blocked)?;
        Ok(blocked)
    }

    /// Places a dynamic obstacle on an open, undesignated cell that the agent
    /// does not occupy. Returns whether the obstacle was placed.
    pub fn place_obstacle(&mut self, pos: Position) -> bool {
        if !self.in_bounds(pos)
            || self.is_blocked(pos)
            || pos == self.target
            || (pos == self.start && self.agent.is_none())
            || Some(pos) == self.agent
        {
            return false;
        }
        let idx = self.index(pos);
        self.cells[idx].terrain = Terrain::Obstacle;
        true
    }

    /// Removes every dynamic obstacle, leaving walls in place.
    pub fn clear_obstacles(&mut self) {
        for cell in &mut self.cells {
            if cell.terrain == Terrain::Obstacle {
                cell.terrain = Terrain::Open;
            }
        }
    }

    /// Clears search bookkeeping on every cell while keeping terrain and the
    /// start/target/agent designations.
    pub fn reset_keep_walls(&mut self) {
        for cell in &mut self.cells {
            cell.state = VisitState::Unvisited;
        }
    }

    /// Checks the precondition every search shares: both endpoints in bounds and open.
    pub fn validate_endpoints(&self, start: Position, target: Position) -> Result<(), SearchError> {
        for (endpoint, position) in [(Endpoint::Start, start), (Endpoint::Target, target)] {
            if !self.in_bounds(position) {
                return Err(SearchError::EndpointOutOfBounds { endpoint, position });
            }
            if self.is_blocked(position) {
                return Err(SearchError::EndpointBlocked { endpoint, position });
            }
        }
        Ok(())
    }

    fn designation(&self, pos: Position) -> Option<Endpoint> {
        if pos == self.start {
            Some(Endpoint::Start)
        } else if pos == self.target {
            Some(Endpoint::Target)
        } else {
            None
        }
    }

    fn symbol(&self, pos: Position) -> char {
        let cell = &self.cells[self.index(pos)];
        if Some(pos) == self.agent {
            'A'
        } else if pos == self.start {
            'S'
        } else if pos == self.target {
            'T'
        } else {
            match (cell.terrain, cell.state) {
                (Terrain::Wall, _) => '#',
                (Terrain::Obstacle, _) => 'O',
                (Terrain::Open, VisitState::Unvisited) => '.',
                (Terrain::Open, VisitState::Frontier) => '+',
                (Terrain::Open, VisitState::Explored) => 'x',
                (Terrain::Open, VisitState::OnPath) => '*',
            }
        }
    }
}

impl fmt::Display for Grid {
    /// Legend: S=Start, T=Target, A=Agent, #=Wall, O=Obstacle, +=Frontier,
    /// x=Explored, *=Path, .=Empty
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.cols {
            write!(f, "{:2}", col % 10)?;
        }
        writeln!(f)?;
        for row in 0..self.rows {
            write!(f, "{row:2} ")?;
            for col in 0..self.cols {
                write!(f, " {}", self.symbol(Position::new(row, col)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parses an ASCII map: `.` open, `#` wall, `O` obstacle, `S` start, `T` target.
    /// Blank lines and surrounding whitespace are ignored.
    fn from_str(map: &str) -> Result<Self, Self::Err> {
        let lines: Vec<(usize, &str)> = map
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .collect();
        let cols = lines.first().map_or(0, |(_, line)| line.chars().count());
        if cols == 0 {
            return Err(GridError::EmptyGrid);
        }

        let mut terrain = Vec::with_capacity(lines.len() * cols);
        let mut start = None;
        let mut target = None;
        for (row, (line_no, line)) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(GridError::Parse {
                    line: *line_no,
                    reason: format!("expected {cols} columns, found {}", line.chars().count()),
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(row, col);
                let slot = match ch {
                    'S' => Some(&mut start),
                    'T' => Some(&mut target),
                    _ => None,
                };
                if let Some(slot) = slot {
                    if slot.replace(pos).is_some() {
                        return Err(GridError::Parse {
                            line: *line_no,
                            reason: format!("duplicate '{ch}'"),
                        });
                    }
                }
                terrain.push(match ch {
                    '.' | 'S' | 'T' => Terrain::Open,
                    '#' => Terrain::Wall,
                    'O' => Terrain::Obstacle,
                    other => {
                        return Err(GridError::Parse {
                            line: *line_no,
                            reason: format!("unexpected character '{other}'"),
                        })
                    }
                });
            }
        }

        let (Some(start), Some(target)) = (start, target) else {
            return Err(GridError::Parse {
                line: 0,
                reason: "map needs exactly one 'S' and one 'T'".to_string(),
            });
        };
        let mut grid = Grid::new(lines.len(), cols, start, target)?;
        for (cell, terrain) in grid.cells.iter_mut().zip(terrain) {
            cell.terrain = terrain;
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn out_of_range_columns_do_not_alias_the_next_row() {
        let grid = Grid::new(3, 3, p(0, 0), p(2, 2)).unwrap();
        assert_eq!(grid.cell(p(0, 5)), None);
        assert_eq!(grid.state(p(0, 5)), None);
        assert!(grid.is_blocked(p(0, 5)));
        assert_eq!(grid.state(p(1, 2)), Some(VisitState::Unvisited));
    }

    #[test]
    fn neighbors_follow_clockwise_order_from_up() {
        let grid = Grid::new(3, 3, p(0, 0), p(2, 2)).unwrap();
        assert_eq!(
            grid.neighbors(p(1, 1)),
            vec![p(0, 1), p(0, 2), p(1, 2), p(2, 2), p(2, 1), p(2, 0), p(1, 0), p(0, 0)]
        );
    }

    #[test]
    fn neighbors_at_corner_keep_order() {
        let grid = Grid::new(3, 3, p(0, 0), p(2, 2)).unwrap();
        assert_eq!(grid.neighbors(p(0, 0)), vec![p(0, 1), p(1, 1), p(1, 0)]);
        assert_eq!(grid.neighbors(p(2, 2)), vec![p(1, 2), p(2, 1), p(1, 1)]);
    }

    #[test]
    fn diagonal_corner_cutting_is_allowed() {
        let grid: Grid = "S#\n#T".parse().unwrap();
        assert_eq!(grid.neighbors(p(0, 0)), vec![p(1, 1)]);
    }

    #[test]
    fn move_costs() {
        assert_eq!(move_cost(p(1, 1), p(0, 1)), 1.0);
        assert_eq!(move_cost(p(1, 1), p(1, 2)), 1.0);
        assert_eq!(move_cost(p(1, 1), p(0, 0)), 1.4);
    }

    #[test]
    fn reset_keep_walls_clears_state_only() {
        let mut grid: Grid = "S.#\n.O.\n..T".parse().unwrap();
        grid.mark(p(0, 1), VisitState::Explored);
        grid.mark(p(1, 0), VisitState::Frontier);
        grid.mark(p(2, 1), VisitState::OnPath);
        grid.reset_keep_walls();

        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(grid.state(p(row, col)), Some(VisitState::Unvisited));
            }
        }
        assert_eq!(grid.terrain(p(0, 2)), Some(Terrain::Wall));
        assert_eq!(grid.terrain(p(1, 1)), Some(Terrain::Obstacle));
        assert_eq!(grid.start(), p(0, 0));
        assert_eq!(grid.target(), p(2, 2));
    }

    #[test]
    fn endpoints_cannot_be_walled() {
        let mut grid = Grid::new(2, 2, p(0, 0), p(1, 1)).unwrap();
        assert!(matches!(
            grid.set_blocked(p(1, 1), true),
            Err(GridError::Designated { endpoint: Endpoint::Target, .. })
        ));
        assert_eq!(grid.toggle_wall(p(0, 1)), Ok(true));
        assert_eq!(grid.toggle_wall(p(0, 1)), Ok(false));
    }

    #[test]
    fn obstacles_skip_agent_target_and_blocked_cells() {
        let mut grid: Grid = "S.#\n...\n..T".parse().unwrap();
        grid.set_agent(Some(p(1, 1)));
        assert!(!grid.place_obstacle(p(1, 1)));
        assert!(!grid.place_obstacle(p(2, 2)));
        assert!(!grid.place_obstacle(p(0, 2)));
        assert!(grid.place_obstacle(p(1, 2)));
        assert_eq!(grid.blocked_count(), 2);
        grid.clear_obstacles();
        assert_eq!(grid.blocked_count(), 1);
    }

    #[test]
    fn parse_rejects_bad_maps() {
        assert!(matches!("S..\n.T".parse::<Grid>(), Err(GridError::Parse { line: 2, .. })));
        assert!(matches!("S..\n..S".parse::<Grid>(), Err(GridError::Parse { .. })));
        assert!(matches!("S..\n...".parse::<Grid>(), Err(GridError::Parse { line: 0, .. })));
        assert_eq!("".parse::<Grid>().unwrap_err(), GridError::EmptyGrid);
    }

    #[test]
    fn display_uses_legend() {
        let mut grid: Grid = "S#\nOT".parse().unwrap();
        grid.set_agent(Some(p(0, 0)));
        let text = grid.to_string();
        assert!(text.contains(" A #"));
        assert!(text.contains(" O T"));
    }

    #[test]
    fn validate_endpoints_rejects_blocked_and_out_of_bounds() {
        let grid: Grid = "S#\n.T".parse().unwrap();
        assert!(grid.validate_endpoints(p(0, 0), p(1, 1)).is_ok());
        assert!(matches!(
            grid.validate_endpoints(p(0, 1), p(1, 1)),
            Err(SearchError::EndpointBlocked { endpoint: Endpoint::Start, .. })
        ));
        assert!(matches!(
            grid.validate_endpoints(p(0, 0), p(5, 5)),
            Err(SearchError::EndpointOutOfBounds { endpoint: Endpoint::Target, .. })
        ));
    }
}
