//! A wandering shopper: a weighted search that often expands a random frontier node instead of
//! the best one, most of all during its first steps in the store.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::context::{NodeKey, NodeRecord, SearchContext};
use super::{GridSolver, SearchMode, SearchRequest};
use crate::cost::{manhattan, turn_step, Heading};
use crate::store_grid::StoreGrid;

/// Chance of a uniformly random pick and share of the best candidates otherwise drawn from.
struct Phase {
    random_pick: f64,
    top_share: f64,
}

const EXPLORING: Phase = Phase {
    random_pick: 0.6,
    top_share: 0.4,
};
const SEEKING: Phase = Phase {
    random_pick: 0.4,
    top_share: 0.5,
};

#[derive(Clone, Debug)]
pub struct RandomizedShopperSolver {
    pub seed: u64,
}

impl RandomizedShopperSolver {
    /// Picks the next node to expand among the open ones, listed in grid order.
    fn pick(
        &self,
        rng: &mut StdRng,
        ctx: &SearchContext,
        mut open: Vec<usize>,
        phase: &Phase,
    ) -> Option<usize> {
        if open.is_empty() {
            return None;
        }
        if rng.gen_bool(phase.random_pick) {
            return open.choose(rng).copied();
        }
        open.sort_by(|a, b| ctx.node(*a).1.total.total_cmp(&ctx.node(*b).1.total));
        let top = ((open.len() as f64 * phase.top_share) as usize).max(1);
        open[..top].choose(rng).copied()
    }
}

impl GridSolver for RandomizedShopperSolver {
    fn mode(&self) -> SearchMode {
        SearchMode::RandomizedShopper
    }

    fn explore(
        &self,
        grid: &StoreGrid,
        request: &SearchRequest,
        ctx: &mut SearchContext,
    ) -> Option<usize> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let exploration_steps: usize = rng.gen_range(20..50);
        let mut explored = 0;
        ctx.insert_root(NodeKey::cell(request.start), request.heading, 0.0);
        loop {
            let exploring = explored < exploration_steps;
            let mut open: Vec<usize> = (0..ctx.nodes.len())
                .filter(|ix| !ctx.node(*ix).1.closed)
                .collect();
            open.sort_by_key(|ix| grid.index(&ctx.node(*ix).0.cell));
            let phase = if exploring { &EXPLORING } else { &SEEKING };
            let index = self.pick(&mut rng, ctx, open, phase)?;
            ctx.close(index);
            let exploring = if exploring {
                explored += 1;
                explored < exploration_steps
            } else {
                false
            };
            let (&key, &record) = ctx.node(index);
            if key.cell == request.target {
                return Some(index);
            }
            let mut successors = request.successors(grid, &key.cell);
            successors.as_mut_slice().shuffle(&mut rng);
            for next in successors {
                let next_key = NodeKey::cell(next);
                let Some(heading) = Heading::between(&key.cell, &next) else {
                    continue;
                };
                if ctx.is_closed(&next_key) {
                    continue;
                }
                let step = turn_step(record.heading, heading);
                let step_cost = step.cost as f64 * rng.gen_range(0.9..1.2);
                let modifier = if exploring {
                    rng.gen_range(0.5..2.0)
                } else {
                    rng.gen_range(0.8..1.5)
                };
                let heuristic = manhattan(&next, &request.target) as f64 * modifier;
                let accumulated = record.accumulated + grid.weight(&next) as f64 + step_cost;
                ctx.offer(
                    next_key,
                    NodeRecord {
                        accumulated,
                        total: accumulated + heuristic,
                        heuristic,
                        heading,
                        parent: index,
                        closed: false,
                    },
                );
            }
        }
    }
}
