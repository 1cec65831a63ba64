use grid_util::point::Point;

use super::best_first::{explore_best_first, Scores, WeightedSolver};
use super::context::{NodeRecord, SearchContext};
use super::{GridSolver, SearchMode, SearchRequest};
use crate::cost::{manhattan, Step};
use crate::store_grid::StoreGrid;

/// Greedy best-first search. The score of a cell is the price of the last step plus the
/// distance left, without the distance already walked, so it happily runs into dead ends.
#[derive(Clone, Debug)]
pub struct GreedySolver;

impl WeightedSolver for GreedySolver {
    const HEADING_STATES: bool = false;

    fn relax(&self, _: &NodeRecord, step: &Step, weight: u32, next: &Point, target: &Point) -> Scores {
        let heuristic = manhattan(next, target) as f64;
        let accumulated = weight as f64 + step.cost as f64 + heuristic;
        Scores {
            accumulated,
            heuristic,
            total: accumulated,
        }
    }
}

impl GridSolver for GreedySolver {
    fn mode(&self) -> SearchMode {
        SearchMode::Greedy
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
