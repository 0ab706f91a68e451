use crate::algorithms::common::{SearchContext, SearchStrategy};
use crate::error::SearchError;
use crate::grid::{move_cost_tenths, Position, VisitState};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct QueueEntry {
    cost: u32,
    seq: u64,
    pos: Position,
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behaviour; first inserted wins among equal costs.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Uniform-cost search: minimum total move cost with straight moves at 1.0
/// and diagonal moves at 1.4.
///
/// A reached cell is only relaxed when a strictly cheaper route turns up.
/// Superseded queue entries are skipped when popped.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformCost;

impl SearchStrategy for UniformCost {
    fn name(&self) -> &'static str {
        "ucs"
    }

    fn search(&self, ctx: &mut SearchContext<'_>) -> Result<bool, SearchError> {
        let start = ctx.start();
        let target = ctx.target();

        let mut open_queue = BinaryHeap::new();
        let mut explored = FxHashSet::default();
        let mut seq = 0u64;

        ctx.set_cost(start, 0);
        open_queue.push(QueueEntry {
            cost: 0,
            seq,
            pos: start,
        });

        while let Some(QueueEntry { cost, pos, .. }) = open_queue.pop() {
            if cost > ctx.cost(pos) || !explored.insert(pos) {
                continue;
            }

            if pos == target {
                ctx.step(pos)?;
                return Ok(ctx.finish_path());
            }

            for neighbor in ctx.neighbors(pos) {
                if explored.contains(&neighbor) {
                    continue;
                }
                let new_cost = cost + move_cost_tenths(pos, neighbor);
                if new_cost < ctx.cost(neighbor) {
                    ctx.set_cost(neighbor, new_cost);
                    ctx.set_parent(neighbor, Some(pos));
                    ctx.mark(neighbor, VisitState::Frontier);
                    seq += 1;
                    open_queue.push(QueueEntry {
                        cost: new_cost,
                        seq,
                        pos: neighbor,
                    });
                }
            }

            ctx.mark(pos, VisitState::Explored);
            ctx.step(pos)?;
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_pops_lowest_cost_then_earliest() {
        let p = Position::new(0, 0);
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry { cost: 14, seq: 1, pos: p });
        heap.push(QueueEntry { cost: 10, seq: 3, pos: p });
        heap.push(QueueEntry { cost: 10, seq: 2, pos: p });
        let order: Vec<_> = std::iter::from_fn(|| heap.pop()).map(|e| (e.cost, e.seq)).collect();
        assert_eq!(order, vec![(10, 2), (10, 3), (14, 1)]);
    }
}
