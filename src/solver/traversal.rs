//! Unweighted searches: cell weights and turns are ignored while exploring.
use std::collections::VecDeque;

use grid_util::point::Point;

use super::context::{NodeKey, NodeRecord, Offer, SearchContext};
use super::{GridSolver, SearchMode, SearchRequest};
use crate::cost::Heading;
use crate::store_grid::StoreGrid;

fn hop_record(parent: usize, parent_record: &NodeRecord, from: &Point, to: &Point) -> NodeRecord {
    NodeRecord {
        accumulated: parent_record.accumulated + 1.0,
        total: parent_record.accumulated + 1.0,
        heuristic: 0.0,
        heading: Heading::between(from, to).unwrap_or(parent_record.heading),
        parent,
        closed: false,
    }
}

/// First-in first-out frontier; the first discovery of a cell wins, so routes have the
/// minimum number of moves.
#[derive(Clone, Debug)]
pub struct BreadthFirstSolver;

impl GridSolver for BreadthFirstSolver {
    fn mode(&self) -> SearchMode {
        SearchMode::Bfs
    }

    fn explore(
        &self,
        grid: &StoreGrid,
        request: &SearchRequest,
        ctx: &mut SearchContext,
    ) -> Option<usize> {
        let root = ctx.insert_root(NodeKey::cell(request.start), request.heading, 0.0);
        let mut queue = VecDeque::from([root]);
        while let Some(ix) = queue.pop_front() {
            ctx.close(ix);
            let (&key, &record) = ctx.node(ix);
            if key.cell == request.target {
                return Some(ix);
            }
            for n in request.successors(grid, &key.cell) {
                let n_key = NodeKey::cell(n);
                if ctx.contains(&n_key) {
                    continue;
                }
                if let Offer::Updated(n_ix) = ctx.offer(n_key, hop_record(ix, &record, &key.cell, &n)) {
                    queue.push_back(n_ix);
                }
            }
        }
        None
    }
}

/// Last-in first-out frontier. Neighbours are pushed in reverse so the first listed one is
/// explored first; a cell is never expanded twice.
#[derive(Clone, Debug)]
pub struct DepthFirstSolver;

impl GridSolver for DepthFirstSolver {
    fn mode(&self) -> SearchMode {
        SearchMode::Dfs
    }

    fn explore(
        &self,
        grid: &StoreGrid,
        request: &SearchRequest,
        ctx: &mut SearchContext,
    ) -> Option<usize> {
        let root = ctx.insert_root(NodeKey::cell(request.start), request.heading, 0.0);
        let mut stack: Vec<(Point, usize)> = Vec::new();
        let mut current = Some(root);
        loop {
            if let Some(ix) = current.take() {
                ctx.close(ix);
                let key = *ctx.node(ix).0;
                if key.cell == request.target {
                    return Some(ix);
                }
                for n in request.successors(grid, &key.cell).into_iter().rev() {
                    if !ctx.is_closed(&NodeKey::cell(n)) {
                        stack.push((n, ix));
                    }
                }
            }
            let (cell, parent) = stack.pop()?;
            let n_key = NodeKey::cell(cell);
            if ctx.is_closed(&n_key) {
                continue;
            }
            let (&parent_key, &parent_record) = ctx.node(parent);
            let record = hop_record(parent, &parent_record, &parent_key.cell, &cell);
            if let Offer::Updated(ix) = ctx.offer(n_key, record) {
                current = Some(ix);
            }
        }
    }
}
