mod common;

use common::{arb_grid, reference_hops};
use proptest::prelude::*;
use uninformed_pathfinding::{run_dynamic_follow_seeded, FollowOutcome, Grid, NoopObserver, Path};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn agent_and_target_are_never_blocked(
        mut grid in arb_grid(10, 0.2),
        probability in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let (start, target) = (grid.start(), grid.target());
        let cells = grid.len();
        let reachable = reference_hops(&grid, start, target).is_some();

        let mut violations = 0usize;
        let report = {
            let mut observer = |g: &Grid| {
                let agent_blocked = g.agent().is_some_and(|a| g.is_blocked(a));
                if agent_blocked || g.is_blocked(g.target()) {
                    violations += 1;
                }
            };
            run_dynamic_follow_seeded(&mut grid, start, target, &mut observer, probability, seed)
                .unwrap()
        };

        prop_assert_eq!(violations, 0);
        prop_assert!(!grid.is_blocked(report.final_position));
        prop_assert!(!grid.is_blocked(target));
        prop_assert!(report.statistics.replans <= cells);
        prop_assert!(Path::new(report.trail.clone()).is_connected());
        prop_assert_eq!(report.trail.first().copied(), Some(start));
        prop_assert_eq!(report.trail.last().copied(), Some(report.final_position));

        match report.outcome {
            FollowOutcome::Reached => {
                prop_assert_eq!(report.final_position, target);
            }
            FollowOutcome::Stuck => {
                // Nothing is ever unblocked, so being stuck is final.
                prop_assert!(reference_hops(&grid, report.final_position, target).is_none());
                if !reachable {
                    prop_assert_eq!(report.statistics.replans, 0);
                }
            }
        }
    }

    #[test]
    fn obstacle_free_follow_walks_a_shortest_route(
        mut grid in arb_grid(10, 0.3),
        seed in any::<u64>(),
    ) {
        let (start, target) = (grid.start(), grid.target());
        let expected = reference_hops(&grid, start, target);
        let report =
            run_dynamic_follow_seeded(&mut grid, start, target, &mut NoopObserver, 0.0, seed)
                .unwrap();

        match expected {
            Some(hops) => {
                prop_assert_eq!(report.outcome, FollowOutcome::Reached);
                prop_assert_eq!(report.statistics.total_moves, hops);
                prop_assert_eq!(report.statistics.replans, 0);
            }
            None => {
                prop_assert_eq!(report.outcome, FollowOutcome::Stuck);
            }
        }
    }
}
