use crate::algorithms::common::{SearchContext, SearchStrategy};
use crate::error::SearchError;
use crate::grid::VisitState;
use rustc_hash::FxHashSet;

/// Depth-first search with an explicit stack.
///
/// Cells are marked visited when popped, so a cell may sit on the stack more
/// than once; stale copies are skipped. The most recent push of a cell owns
/// its parent link, which is also the copy that gets popped first.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepthFirst;

impl SearchStrategy for DepthFirst {
    fn name(&self) -> &'static str {
        "dfs"
    }

    fn search(&self, ctx: &mut SearchContext<'_>) -> Result<bool, SearchError> {
        let start = ctx.start();
        let target = ctx.target();

        let mut stack = vec![start];
        let mut visited = FxHashSet::default();

        while let Some(current) = stack.pop() {
            if current == target {
                ctx.step(current)?;
                return Ok(ctx.finish_path());
            }
            if !visited.insert(current) {
                continue;
            }

            ctx.mark(current, VisitState::Explored);
            ctx.step(current)?;

            // Reversed so the pops come out Up, Up-Right, Right, ...
            for neighbor in ctx.neighbors(current).into_iter().rev() {
                if !visited.contains(&neighbor) {
                    ctx.set_parent(neighbor, Some(current));
                    ctx.mark(neighbor, VisitState::Frontier);
                    stack.push(neighbor);
                }
            }
        }

        Ok(false)
    }
}
