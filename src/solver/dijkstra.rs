use grid_util::point::Point;

use super::best_first::{explore_best_first, Scores, WeightedSolver};
use super::context::{NodeRecord, SearchContext};
use super::{GridSolver, SearchMode, SearchRequest};
use crate::cost::Step;
use crate::store_grid::StoreGrid;

/// Uniform cost search over `(cell, heading)` states, exact under the turn model.
#[derive(Clone, Debug)]
pub struct DijkstraSolver;

impl WeightedSolver for DijkstraSolver {
    const HEADING_STATES: bool = true;

    fn relax(&self, from: &NodeRecord, step: &Step, weight: u32, _: &Point, _: &Point) -> Scores {
        let accumulated = from.accumulated + weight as f64 + step.cost as f64;
        Scores {
            accumulated,
            heuristic: 0.0,
            total: accumulated,
        }
    }
}

impl GridSolver for DijkstraSolver {
    fn mode(&self) -> SearchMode {
        SearchMode::Dijkstra
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
