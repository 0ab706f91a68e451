//! Drives an agent along a computed route while the grid changes under it.
//!
//! Every step first gives the [`GridMutationSource`] a chance to drop an
//! obstacle. When the next cell on the route turns out blocked the agent
//! stays put, visit state is cleared, and a fresh breadth-first search runs
//! from the agent's cell. The loop is a flat state machine, so the number of
//! replans never grows the call stack.

use crate::algorithms::{run_strategy, Algorithm, BreadthFirst, SearchReport, SearchStrategy};
use crate::error::SearchError;
use crate::grid::{Grid, Position, VisitState};
use crate::observer::StepObserver;
use crate::simulation::shortest_hops;
use crate::statistics::FollowStatistics;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Obstacle probability used when nothing else is configured.
pub const DEFAULT_OBSTACLE_PROBABILITY: f64 = 0.3;

/// Proposes a cell to block before each agent step.
///
/// Proposals are only candidates: the replanner drops any that land on the
/// agent, the target, an already blocked cell or outside the grid.
pub trait GridMutationSource {
    fn propose(&mut self, grid: &Grid, agent: Position) -> Option<Position>;
}

impl<F> GridMutationSource for F
where
    F: FnMut(&Grid, Position) -> Option<Position>,
{
    fn propose(&mut self, grid: &Grid, agent: Position) -> Option<Position> {
        self(grid, agent)
    }
}

/// A grid that never changes while the agent walks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMutations;

impl GridMutationSource for NoMutations {
    fn propose(&mut self, _grid: &Grid, _agent: Position) -> Option<Position> {
        None
    }
}

/// With a fixed probability per step, picks a uniformly random cell.
#[derive(Debug, Clone)]
pub struct RandomObstacles<R> {
    probability: f64,
    rng: R,
}

impl<R: Rng> RandomObstacles<R> {
    pub fn new(probability: f64, rng: R) -> Result<Self, SearchError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(SearchError::InvalidProbability(probability));
        }
        Ok(RandomObstacles { probability, rng })
    }
}

impl RandomObstacles<StdRng> {
    pub fn seeded(probability: f64, seed: u64) -> Result<Self, SearchError> {
        RandomObstacles::new(probability, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GridMutationSource for RandomObstacles<R> {
    fn propose(&mut self, grid: &Grid, _agent: Position) -> Option<Position> {
        if !self.rng.gen_bool(self.probability) {
            return None;
        }
        let row = self.rng.gen_range(0..grid.rows());
        let col = self.rng.gen_range(0..grid.cols());
        Some(Position::new(row, col))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplanState {
    Following,
    Blocked,
    Replanning,
    Stuck,
    Reached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Reached,
    /// No route from the agent's cell to the target exists any more.
    Stuck,
}

impl fmt::Display for FollowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowOutcome::Reached => write!(f, "reached"),
            FollowOutcome::Stuck => write!(f, "stuck"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FollowReport {
    pub outcome: FollowOutcome,
    pub final_position: Position,
    /// Every cell the agent occupied, starting with the start cell.
    pub trail: Vec<Position>,
    pub statistics: FollowStatistics,
}

impl FollowReport {
    pub fn reached(&self) -> bool {
        self.outcome == FollowOutcome::Reached
    }
}

pub struct DynamicReplanner<M> {
    mutations: M,
    initial: Box<dyn SearchStrategy>,
}

impl<M: GridMutationSource> DynamicReplanner<M> {
    pub fn new(mutations: M) -> Self {
        DynamicReplanner {
            mutations,
            initial: Box::new(BreadthFirst),
        }
    }

    /// Strategy for the first route only; replans always use breadth-first search.
    pub fn with_initial(self, algorithm: Algorithm) -> Self {
        self.with_initial_strategy(algorithm.strategy())
    }

    pub fn with_initial_strategy(mut self, strategy: Box<dyn SearchStrategy>) -> Self {
        self.initial = strategy;
        self
    }

    pub fn follow(
        &mut self,
        grid: &mut Grid,
        start: Position,
        target: Position,
        observer: &mut dyn StepObserver,
    ) -> Result<FollowReport, SearchError> {
        grid.set_agent(None);
        let mut statistics = FollowStatistics::default();

        let report = run_strategy(self.initial.as_ref(), grid, start, target, observer)?;
        statistics.record_search(report.elapsed);
        let mut agent = start;
        let mut trail = vec![start];

        if !report.found {
            debug!("initial {} search from {start} found no route to {target}", report.algorithm);
            return Ok(FollowReport {
                outcome: FollowOutcome::Stuck,
                final_position: agent,
                trail,
                statistics,
            });
        }

        statistics.optimal_path_length =
            shortest_hops(grid, start, target).unwrap_or_else(|| report.path.hops());
        let mut path = report.path;
        let mut next_index = 1;
        let mut state = ReplanState::Following;
        grid.set_agent(Some(agent));
        debug!("following {} hop route from {start} to {target}", path.hops());

        loop {
            let next_state = match state {
                ReplanState::Following => {
                    if agent == target {
                        ReplanState::Reached
                    } else {
                        self.inject(grid, agent, target, observer, &mut statistics);
                        match path.get(next_index) {
                            Some(next) if grid.is_blocked(next) => ReplanState::Blocked,
                            Some(next) => {
                                grid.mark(agent, VisitState::Explored);
                                agent = next;
                                grid.set_agent(Some(agent));
                                next_index += 1;
                                statistics.total_moves += 1;
                                trail.push(agent);
                                observer.on_step(grid);
                                ReplanState::Following
                            }
                            // A found route always ends on the target.
                            None => ReplanState::Reached,
                        }
                    }
                }
                ReplanState::Blocked => {
                    grid.reset_keep_walls();
                    ReplanState::Replanning
                }
                ReplanState::Replanning => {
                    statistics.replans += 1;
                    let report = self.replan(grid, agent, target, observer)?;
                    statistics.record_search(report.elapsed);
                    if report.found {
                        path = report.path;
                        next_index = 1;
                        ReplanState::Following
                    } else {
                        ReplanState::Stuck
                    }
                }
                ReplanState::Reached | ReplanState::Stuck => break,
            };

            if next_state != state {
                debug!("replanner {state:?} -> {next_state:?} at {agent}");
            }
            state = next_state;
        }

        statistics.calculate_efficiency();
        let outcome = if state == ReplanState::Reached {
            FollowOutcome::Reached
        } else {
            FollowOutcome::Stuck
        };
        Ok(FollowReport {
            outcome,
            final_position: agent,
            trail,
            statistics,
        })
    }

    fn replan(
        &self,
        grid: &mut Grid,
        agent: Position,
        target: Position,
        observer: &mut dyn StepObserver,
    ) -> Result<SearchReport, SearchError> {
        run_strategy(&BreadthFirst, grid, agent, target, observer)
    }

    fn inject(
        &mut self,
        grid: &mut Grid,
        agent: Position,
        target: Position,
        observer: &mut dyn StepObserver,
        statistics: &mut FollowStatistics,
    ) {
        let Some(candidate) = self.mutations.propose(grid, agent) else {
            return;
        };
        if !grid.in_bounds(candidate) {
            warn!("mutation source proposed {candidate} outside the grid");
            return;
        }
        // The followed target need not be the grid's designated one.
        if candidate == target {
            return;
        }
        if grid.place_obstacle(candidate) {
            statistics.obstacles_placed += 1;
            debug!("obstacle placed at {candidate}");
            observer.on_step(grid);
        }
    }
}

/// Follows a breadth-first route from `start` to `target` with random
/// obstacles appearing at `obstacle_probability` per step.
pub fn run_dynamic_follow(
    grid: &mut Grid,
    start: Position,
    target: Position,
    observer: &mut dyn StepObserver,
    obstacle_probability: f64,
) -> Result<FollowReport, SearchError> {
    let source = RandomObstacles::new(obstacle_probability, StdRng::from_entropy())?;
    DynamicReplanner::new(source).follow(grid, start, target, observer)
}

/// Like [`run_dynamic_follow`] with a reproducible obstacle sequence.
pub fn run_dynamic_follow_seeded(
    grid: &mut Grid,
    start: Position,
    target: Position,
    observer: &mut dyn StepObserver,
    obstacle_probability: f64,
    seed: u64,
) -> Result<FollowReport, SearchError> {
    let source = RandomObstacles::seeded(obstacle_probability, seed)?;
    DynamicReplanner::new(source).follow(grid, start, target, observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Terrain;
    use crate::observer::{NoopObserver, StepCounter};
    use crate::path::Path;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn scripted(cells: Vec<Position>) -> impl FnMut(&Grid, Position) -> Option<Position> {
        let mut cells = cells.into_iter();
        move |_: &Grid, _: Position| cells.next()
    }

    #[test]
    fn static_grid_is_walked_in_path_length_moves() {
        let mut grid = Grid::new(3, 3, p(0, 0), p(2, 2)).unwrap();
        let report = DynamicReplanner::new(NoMutations)
            .follow(&mut grid, p(0, 0), p(2, 2), &mut NoopObserver)
            .unwrap();
        assert_eq!(report.outcome, FollowOutcome::Reached);
        assert_eq!(report.trail, vec![p(0, 0), p(1, 1), p(2, 2)]);
        assert_eq!(report.statistics.total_moves, 2);
        assert_eq!(report.statistics.replans, 0);
        assert_eq!(report.statistics.searches, 1);
        assert_eq!(grid.agent(), Some(p(2, 2)));
    }

    #[test]
    fn blocked_next_cell_triggers_a_replan() {
        let mut grid = Grid::new(3, 3, p(0, 0), p(0, 2)).unwrap();
        let mut replanner = DynamicReplanner::new(scripted(vec![p(0, 1)]));
        let report = replanner.follow(&mut grid, p(0, 0), p(0, 2), &mut NoopObserver).unwrap();

        assert!(report.reached());
        assert_eq!(report.trail, vec![p(0, 0), p(1, 1), p(0, 2)]);
        assert_eq!(report.statistics.replans, 1);
        assert_eq!(report.statistics.searches, 2);
        assert_eq!(report.statistics.obstacles_placed, 1);
        assert_eq!(grid.terrain(p(0, 1)), Some(Terrain::Obstacle));
    }

    #[test]
    fn walled_in_agent_is_stuck() {
        let mut grid: Grid = "S.T".parse().unwrap();
        let mut replanner = DynamicReplanner::new(scripted(vec![p(0, 1)]));
        let report = replanner.follow(&mut grid, p(0, 0), p(0, 2), &mut NoopObserver).unwrap();

        assert_eq!(report.outcome, FollowOutcome::Stuck);
        assert_eq!(report.final_position, p(0, 0));
        assert_eq!(report.statistics.replans, 1);
        assert_eq!(report.statistics.total_moves, 0);
    }

    #[test]
    fn failed_initial_search_is_stuck_without_replanning() {
        let mut grid: Grid = "S#T".parse().unwrap();
        let report = DynamicReplanner::new(NoMutations)
            .follow(&mut grid, p(0, 0), p(0, 2), &mut NoopObserver)
            .unwrap();
        assert_eq!(report.outcome, FollowOutcome::Stuck);
        assert_eq!(report.statistics.replans, 0);
        assert_eq!(report.statistics.searches, 1);
        assert_eq!(report.trail, vec![p(0, 0)]);
    }

    #[test]
    fn unsafe_proposals_are_dropped() {
        let mut grid = Grid::new(1, 5, p(0, 0), p(0, 4)).unwrap();
        // Agent cell, target, out of bounds, then the agent's cell again.
        let proposals = vec![p(0, 0), p(0, 4), p(7, 7), p(0, 3)];
        let mut replanner = DynamicReplanner::new(scripted(proposals));
        let report = replanner.follow(&mut grid, p(0, 0), p(0, 4), &mut NoopObserver).unwrap();

        assert!(report.reached());
        assert_eq!(report.statistics.obstacles_placed, 0);
        assert_eq!(grid.blocked_count(), 0);
    }

    #[test]
    fn start_equal_to_target_is_reached_immediately() {
        let mut grid = Grid::new(2, 2, p(1, 1), p(1, 1)).unwrap();
        let report =
            run_dynamic_follow_seeded(&mut grid, p(1, 1), p(1, 1), &mut NoopObserver, 1.0, 3)
                .unwrap();
        assert!(report.reached());
        assert_eq!(report.statistics.total_moves, 0);
        assert_eq!(report.statistics.obstacles_placed, 0);
    }

    #[test]
    fn probability_outside_unit_interval_is_rejected() {
        let mut grid = Grid::new(2, 2, p(0, 0), p(1, 1)).unwrap();
        for bad in [-0.1, 1.5, f64::NAN] {
            let err = run_dynamic_follow(&mut grid, p(0, 0), p(1, 1), &mut NoopObserver, bad)
                .unwrap_err();
            assert!(matches!(err, SearchError::InvalidProbability(_)));
            assert!(err.is_invalid_configuration());
        }
    }

    #[test]
    fn blocked_target_is_rejected() {
        let mut grid: Grid = "S.\n.T".parse().unwrap();
        grid.set_blocked(p(0, 1), true).unwrap();
        let err = DynamicReplanner::new(NoMutations)
            .follow(&mut grid, p(0, 0), p(0, 1), &mut NoopObserver)
            .unwrap_err();
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let map = "\
            S.....\n\
            .##...\n\
            ...#..\n\
            .#...T";
        let run = || {
            let mut grid: Grid = map.parse().unwrap();
            let (start, target) = (grid.start(), grid.target());
            run_dynamic_follow_seeded(&mut grid, start, target, &mut NoopObserver, 0.5, 42).unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.trail, b.trail);
        assert_eq!(a.statistics.obstacles_placed, b.statistics.obstacles_placed);
        assert!(Path::new(a.trail.clone()).is_connected());
    }

    #[test]
    fn observer_is_told_about_moves_and_obstacles() {
        let mut grid = Grid::new(1, 5, p(0, 0), p(0, 4)).unwrap();
        let mut replanner = DynamicReplanner::new(NoMutations);
        let mut counter = StepCounter::default();
        let report = replanner.follow(&mut grid, p(0, 0), p(0, 4), &mut counter).unwrap();
        // 5 expansions, 5 reconstruction steps, 4 moves.
        assert_eq!(report.statistics.total_moves, 4);
        assert_eq!(counter.steps, 14);
    }

    #[test]
    fn initial_strategy_is_configurable() {
        let mut grid = Grid::new(3, 3, p(0, 0), p(2, 2)).unwrap();
        let report = DynamicReplanner::new(NoMutations)
            .with_initial(Algorithm::DepthFirst)
            .follow(&mut grid, p(0, 0), p(2, 2), &mut NoopObserver)
            .unwrap();
        assert_eq!(report.trail, vec![p(0, 0), p(0, 1), p(0, 2), p(1, 2), p(2, 2)]);
        // Measured against the shortest route, not the depth-first one.
        assert_eq!(report.statistics.optimal_path_length, 2);
        assert_eq!(report.statistics.route_efficiency, 2.0);
    }

    #[test]
    fn followed_target_is_protected_even_when_not_designated() {
        let mut grid = Grid::new(1, 5, p(0, 0), p(0, 4)).unwrap();
        let mut replanner = DynamicReplanner::new(scripted(vec![p(0, 2), p(0, 2)]));
        let report = replanner.follow(&mut grid, p(0, 0), p(0, 2), &mut NoopObserver).unwrap();

        assert!(report.reached());
        assert_eq!(report.trail, vec![p(0, 0), p(0, 1), p(0, 2)]);
        assert_eq!(report.statistics.obstacles_placed, 0);
        assert!(!grid.is_blocked(p(0, 2)));
    }
}
