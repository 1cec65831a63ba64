use grid_util::point::Point;

use super::best_first::{explore_best_first, Scores, WeightedSolver};
use super::context::{NodeRecord, SearchContext};
use super::{GridSolver, SearchMode, SearchRequest};
use crate::cost::{Heuristic, Step};
use crate::store_grid::StoreGrid;

/// Best-first search whose distance score folds in a powered estimate of the distance left,
/// scaled by the step price. Converges quickly and is not admissible.
#[derive(Clone, Debug)]
pub struct ClaSolver {
    pub heuristic: Heuristic,
}

impl WeightedSolver for ClaSolver {
    const HEADING_STATES: bool = false;

    fn relax(
        &self,
        from: &NodeRecord,
        step: &Step,
        weight: u32,
        next: &Point,
        target: &Point,
    ) -> Scores {
        let estimate = self.heuristic.estimate(next, target);
        let step_cost = step.cost as f64;
        let weight_factor = if weight > 0 { weight as f64 } else { 1.0 };
        let accumulated = match self.heuristic {
            Heuristic::PoweredManhattan => from.accumulated + weight as f64 + step_cost + estimate,
            Heuristic::Manhattan | Heuristic::ExtraPoweredManhattan => {
                from.accumulated + (step_cost + weight_factor) * estimate
            }
        };
        Scores {
            accumulated,
            heuristic: estimate,
            total: accumulated,
        }
    }
}

impl GridSolver for ClaSolver {
    fn mode(&self) -> SearchMode {
        SearchMode::Cla
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{turn_step, Heading};
    use crate::solver::{search, SearchOptions};
    use crate::store_grid::{cell, CellStatus};

    fn parent(accumulated: f64) -> NodeRecord {
        NodeRecord {
            accumulated,
            total: accumulated,
            heuristic: 0.0,
            heading: Heading::Right,
            parent: 0,
            closed: true,
        }
    }

    #[test]
    fn scores_per_heuristic() {
        let from = parent(10.0);
        let turn = turn_step(Heading::Right, Heading::Up);
        let (next, target) = (cell(2, 2), cell(0, 3));
        let score = |heuristic, weight| {
            ClaSolver { heuristic }
                .relax(&from, &turn, weight, &next, &target)
                .accumulated
        };
        // Distance left is 3, the turn costs 2.
        assert_eq!(score(Heuristic::Manhattan, 0), 10.0 + 3.0 * 3.0);
        assert_eq!(score(Heuristic::Manhattan, 15), 10.0 + 17.0 * 3.0);
        assert_eq!(score(Heuristic::PoweredManhattan, 0), 10.0 + 2.0 + 9.0);
        assert_eq!(score(Heuristic::PoweredManhattan, 15), 10.0 + 15.0 + 2.0 + 9.0);
        assert_eq!(score(Heuristic::ExtraPoweredManhattan, 0), 10.0 + 3.0 * 2187.0);
    }

    #[test]
    fn every_heuristic_reaches_the_target() {
        let mut grid = StoreGrid::with_endpoints(8, 8, cell(1, 1), cell(6, 6)).unwrap();
        for col in 0..6 {
            grid.set_status(&cell(4, col), CellStatus::Wall).unwrap();
        }
        for heuristic in Heuristic::ALL {
            let options = SearchOptions::default().with_heuristic(heuristic);
            let outcome = search(&mut grid, cell(1, 1), cell(6, 6), SearchMode::Cla, &options);
            assert!(outcome.success, "{heuristic} failed");
            assert_eq!(outcome.route.last(), Some(&cell(6, 6)));
            assert!(outcome.hop_count() >= 10);
        }
    }
}
