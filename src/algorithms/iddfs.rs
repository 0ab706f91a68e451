use crate::algorithms::common::{SearchContext, SearchStrategy};
use crate::error::SearchError;
use crate::grid::{Position, VisitState};
use log::debug;

pub const DEFAULT_DEPTH_LIMIT: usize = 20;

/// One level of the current branch: the cell, the children still to try.
struct Frame {
    pos: Position,
    children: Vec<Position>,
    next: usize,
}

/// Depth-limited DFS from the context's start, following clockwise order.
///
/// There is no visited set: a cell is only kept from stepping straight back
/// into the cell it was entered from. Longer cycles are cut off by the depth
/// limit alone. The branch is kept as an explicit stack of frames, so depth
/// costs heap rather than call stack.
fn dls(ctx: &mut SearchContext<'_>, limit: usize) -> Result<bool, SearchError> {
    let target = ctx.target();
    let mut branch: Vec<Frame> = Vec::new();
    let mut entering = Some(ctx.start());

    loop {
        if let Some(pos) = entering.take() {
            ctx.mark(pos, VisitState::Explored);
            ctx.step(pos)?;
            if pos == target {
                let walk = branch.iter().map(|f| f.pos).chain([pos]).collect();
                adopt_walk(ctx, walk);
                return Ok(ctx.finish_path());
            }

            let depth = branch.len();
            let children = if depth < limit {
                let came_from = branch.last().map(|f| f.pos);
                ctx.neighbors(pos)
                    .into_iter()
                    .filter(|n| Some(*n) != came_from)
                    .collect()
            } else {
                Vec::new()
            };
            branch.push(Frame {
                pos,
                children,
                next: 0,
            });
        }

        let Some(frame) = branch.last_mut() else {
            return Ok(false);
        };
        match frame.children.get(frame.next).copied() {
            Some(child) => {
                frame.next += 1;
                let parent = frame.pos;
                ctx.set_parent(child, Some(parent));
                ctx.mark(child, VisitState::Frontier);
                entering = Some(child);
            }
            None => {
                branch.pop();
            }
        }
    }
}

/// Rewrites the parent links along the walk that reached the target, with
/// any revisited stretch cut out so the chain is a simple path.
fn adopt_walk(ctx: &mut SearchContext<'_>, walk: Vec<Position>) {
    let mut simple: Vec<Position> = Vec::with_capacity(walk.len());
    for pos in walk {
        if let Some(first) = simple.iter().position(|p| *p == pos) {
            simple.truncate(first);
        }
        simple.push(pos);
    }

    ctx.set_parent(simple[0], None);
    for pair in simple.windows(2) {
        ctx.set_parent(pair[1], Some(pair[0]));
    }
}

/// Iterative deepening: depth-limited passes with limit 1, 2, 3, ... up to
/// `rows * cols - 1`, each starting from cleared visit state.
#[derive(Debug, Default, Clone, Copy)]
pub struct IterativeDeepening;

impl SearchStrategy for IterativeDeepening {
    fn name(&self) -> &'static str {
        "iddfs"
    }

    fn search(&self, ctx: &mut SearchContext<'_>) -> Result<bool, SearchError> {
        let max_depth = ctx.cell_count().saturating_sub(1).max(1);
        for limit in 1..=max_depth {
            ctx.reset_transient();
            if dls(ctx, limit)? {
                debug!("iddfs reached {} at depth limit {limit}", ctx.target());
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// A single depth-limited pass with a fixed limit.
#[derive(Debug, Clone, Copy)]
pub struct DepthLimited {
    pub limit: usize,
}

impl DepthLimited {
    pub fn new(limit: usize) -> Self {
        DepthLimited { limit }
    }
}

impl Default for DepthLimited {
    fn default() -> Self {
        DepthLimited::new(DEFAULT_DEPTH_LIMIT)
    }
}

impl SearchStrategy for DepthLimited {
    fn name(&self) -> &'static str {
        "dls"
    }

    fn search(&self, ctx: &mut SearchContext<'_>) -> Result<bool, SearchError> {
        dls(ctx, self.limit)
    }
}
