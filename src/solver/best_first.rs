//! The priority driven loop shared by Dijkstra, greedy best-first, CLA and A*.
//!
//! Among equal priorities the node whose cell comes first in row-major order is expanded first,
//! which is what a linear scan over the grid for the smallest score would pick.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use grid_util::point::Point;

use super::context::{NodeKey, NodeRecord, Offer, SearchContext};
use super::SearchRequest;
use crate::cost::{turn_step, Heading, Step};
use crate::store_grid::StoreGrid;

/// Scores of a tentative node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scores {
    /// Distance the mode compares when a node is reached again.
    pub accumulated: f64,
    pub heuristic: f64,
    /// Frontier priority.
    pub total: f64,
}

/// Describes how a weighted mode scores the move from `from` into `next`.
pub trait WeightedSolver {
    /// Expand `(cell, heading)` states instead of keeping one record per cell.
    const HEADING_STATES: bool;
    /// Break equal priorities towards the smaller heuristic.
    const HEURISTIC_TIE_BREAK: bool = false;

    fn relax(
        &self,
        from: &NodeRecord,
        step: &Step,
        weight: u32,
        next: &Point,
        target: &Point,
    ) -> Scores;
}

struct FrontierEntry {
    total: f64,
    tie: f64,
    order: usize,
    index: usize,
}

impl Eq for FrontierEntry {}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed throughout: the heap pops the smallest total, then tie, then grid order
        other
            .total
            .total_cmp(&self.total)
            .then_with(|| other.tie.total_cmp(&self.tie))
            .then_with(|| other.order.cmp(&self.order))
    }
}

fn node_key<S: WeightedSolver>(cell: Point, heading: Heading) -> NodeKey {
    if S::HEADING_STATES {
        NodeKey::oriented(cell, heading)
    } else {
        NodeKey::cell(cell)
    }
}

fn entry<S: WeightedSolver>(grid: &StoreGrid, key: &NodeKey, record: &NodeRecord, index: usize) -> FrontierEntry {
    FrontierEntry {
        total: record.total,
        tie: if S::HEURISTIC_TIE_BREAK {
            record.heuristic
        } else {
            0.0
        },
        order: grid.index(&key.cell) * (Heading::ALL.len() + 1) + key.lane as usize,
        index,
    }
}

pub fn explore_best_first<S: WeightedSolver>(
    solver: &S,
    grid: &StoreGrid,
    request: &SearchRequest,
    ctx: &mut SearchContext,
) -> Option<usize> {
    let root_key = node_key::<S>(request.start, request.heading);
    let root = ctx.insert_root(root_key, request.heading, 0.0);
    let mut to_see = BinaryHeap::new();
    to_see.push(entry::<S>(grid, &root_key, ctx.node(root).1, root));
    while let Some(FrontierEntry { total, index, .. }) = to_see.pop() {
        let (&key, &record) = ctx.node(index);
        // A node may sit in the heap several times if a cheaper way to it was found later.
        if record.closed || total > record.total || !grid.can_move_to(&key.cell) {
            continue;
        }
        ctx.close(index);
        if key.cell == request.target {
            return Some(index);
        }
        for next in request.successors(grid, &key.cell) {
            let Some(heading) = Heading::between(&key.cell, &next) else {
                continue;
            };
            let step = turn_step(record.heading, heading);
            let next_key = node_key::<S>(next, heading);
            if ctx.is_closed(&next_key) {
                continue;
            }
            let scores = solver.relax(&record, &step, grid.weight(&next), &next, &request.target);
            let next_record = NodeRecord {
                accumulated: scores.accumulated,
                total: scores.total,
                heuristic: scores.heuristic,
                heading,
                parent: index,
                closed: false,
            };
            if let Offer::Updated(n) = ctx.offer(next_key, next_record) {
                to_see.push(entry::<S>(grid, &next_key, &next_record, n));
            }
        }
    }
    None
}
