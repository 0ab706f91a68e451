use crate::algorithms::common::{SearchContext, SearchStrategy};
use crate::error::SearchError;
use crate::grid::{Position, VisitState};
use crate::path::Path;
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// One half of a bidirectional search.
struct Frontier {
    queue: VecDeque<Position>,
    visited: FxHashSet<Position>,
    parents: FxHashMap<Position, Position>,
}

impl Frontier {
    fn new(seed: Position) -> Self {
        let mut visited = FxHashSet::default();
        visited.insert(seed);
        Frontier {
            queue: VecDeque::from([seed]),
            visited,
            parents: FxHashMap::default(),
        }
    }
}

enum Expansion {
    Met(Position),
    Continue,
    Exhausted,
}

/// Pops one cell from `side` and expands it. The popped cell already being in
/// `other`'s visited set is the meeting point.
fn expand(
    ctx: &mut SearchContext<'_>,
    side: &mut Frontier,
    other: &Frontier,
) -> Result<Expansion, SearchError> {
    let Some(current) = side.queue.pop_front() else {
        return Ok(Expansion::Exhausted);
    };
    if other.visited.contains(&current) {
        ctx.step(current)?;
        return Ok(Expansion::Met(current));
    }

    for neighbor in ctx.neighbors(current) {
        if side.visited.insert(neighbor) {
            side.parents.insert(neighbor, current);
            ctx.mark(neighbor, VisitState::Frontier);
            side.queue.push_back(neighbor);
        }
    }
    ctx.mark(current, VisitState::Explored);
    ctx.step(current)?;
    Ok(Expansion::Continue)
}

/// Breadth-first search run from both ends at once, one expansion per side
/// in turn, starting with the side rooted at the start.
///
/// On meeting, the start-side and target-side parent chains are each traced
/// onto the grid and joined at the meeting cell. The joined route is also
/// written back into the run's parent links so the target's chain leads to
/// the start like every other strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bidirectional;

impl Bidirectional {
    fn stitch(
        &self,
        ctx: &mut SearchContext<'_>,
        forward: &Frontier,
        backward: &Frontier,
        meet: Position,
    ) -> bool {
        let start = ctx.start();
        let target = ctx.target();

        let forward_chain = ctx.trace(meet, start, |p| forward.parents.get(&p).copied());
        let backward_chain = match backward.parents.get(&meet) {
            Some(&next) => ctx.trace(next, target, |p| backward.parents.get(&p).copied()),
            None => Some(Vec::new()),
        };
        let (Some(mut cells), Some(tail)) = (forward_chain, backward_chain) else {
            warn!("bidirectional chains from {meet} do not reach both ends");
            return false;
        };

        cells.reverse();
        cells.extend(tail);

        for pair in cells.windows(2) {
            ctx.set_parent(pair[1], Some(pair[0]));
        }
        ctx.set_path(Path::new(cells));
        true
    }
}

impl SearchStrategy for Bidirectional {
    fn name(&self) -> &'static str {
        "bidirectional"
    }

    fn search(&self, ctx: &mut SearchContext<'_>) -> Result<bool, SearchError> {
        let mut forward = Frontier::new(ctx.start());
        let mut backward = Frontier::new(ctx.target());

        loop {
            for from_start in [true, false] {
                let expansion = if from_start {
                    expand(ctx, &mut forward, &backward)?
                } else {
                    expand(ctx, &mut backward, &forward)?
                };
                match expansion {
                    Expansion::Met(meet) => {
                        debug!(
                            "bidirectional met at {meet} ({} + {} visited)",
                            forward.visited.len(),
                            backward.visited.len()
                        );
                        return Ok(self.stitch(ctx, &forward, &backward, meet));
                    }
                    Expansion::Exhausted => return Ok(false),
                    Expansion::Continue => {}
                }
            }
        }
    }
}
