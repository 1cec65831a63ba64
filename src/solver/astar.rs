use grid_util::point::Point;

use super::best_first::{explore_best_first, Scores, WeightedSolver};
use super::context::{NodeRecord, SearchContext};
use super::{GridSolver, SearchMode, SearchRequest};
use crate::cost::{manhattan, Step};
use crate::store_grid::StoreGrid;

/// A* over `(cell, heading)` states with the plain Manhattan distance as heuristic. Every move
/// costs at least one, so the heuristic is consistent and routes are optimal. Equal priorities
/// go to the node closer to the target.
#[derive(Clone, Debug)]
pub struct AstarSolver;

impl WeightedSolver for AstarSolver {
    const HEADING_STATES: bool = true;
    const HEURISTIC_TIE_BREAK: bool = true;

    fn relax(
        &self,
        from: &NodeRecord,
        step: &Step,
        weight: u32,
        next: &Point,
        target: &Point,
    ) -> Scores {
        let accumulated = from.accumulated + weight as f64 + step.cost as f64;
        let heuristic = manhattan(next, target) as f64;
        Scores {
            accumulated,
            heuristic,
            total: accumulated + heuristic,
        }
    }
}

impl GridSolver for AstarSolver {
    fn mode(&self) -> SearchMode {
        SearchMode::Astar
    }

    fn explore(
        &self,
        grid: &StoreGrid,
        request: &SearchRequest,
        ctx: &mut SearchContext,
    ) -> Option<usize> {
        explore_best_first(self, grid, request, ctx)
    }
}
