use crate::algorithms::common::{SearchContext, SearchStrategy};
use crate::error::SearchError;
use crate::grid::VisitState;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Breadth-first search. Shortest path by hop count.
///
/// Cells join the visited set when they are enqueued, so each one enters the
/// queue at most once; ties between equal-length routes go to the neighbour
/// that comes first in clockwise order.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreadthFirst;

impl SearchStrategy for BreadthFirst {
    fn name(&self) -> &'static str {
        "bfs"
    }

    fn search(&self, ctx: &mut SearchContext<'_>) -> Result<bool, SearchError> {
        let start = ctx.start();
        let target = ctx.target();

        let mut queue = VecDeque::from([start]);
        let mut visited = FxHashSet::default();
        visited.insert(start);

        while let Some(current) = queue.pop_front() {
            if current == target {
                ctx.step(current)?;
                return Ok(ctx.finish_path());
            }

            for neighbor in ctx.neighbors(current) {
                if visited.insert(neighbor) {
                    ctx.set_parent(neighbor, Some(current));
                    ctx.mark(neighbor, VisitState::Frontier);
                    queue.push_back(neighbor);
                }
            }

            ctx.mark(current, VisitState::Explored);
            ctx.step(current)?;
        }

        Ok(false)
    }
}
