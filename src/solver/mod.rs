use core::fmt;
use std::mem;
use std::str::FromStr;

use fxhash::FxHashSet;
use grid_util::point::Point;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cost::{route_cost, trace_route, Heading, Heuristic, Maneuver};
use crate::store_grid::StoreGrid;

pub mod astar;
pub mod best_first;
pub mod cla;
pub mod context;
pub mod dijkstra;
pub mod greedy;
pub mod shopper;
pub mod traversal;

use self::astar::AstarSolver;
use self::cla::ClaSolver;
use self::context::SearchContext;
use self::dijkstra::DijkstraSolver;
use self::greedy::GreedySolver;
use self::shopper::RandomizedShopperSolver;
use self::traversal::{BreadthFirstSolver, DepthFirstSolver};

/// The available search strategies, serialised under the names the visualiser used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMode {
    #[serde(rename = "bfs")]
    Bfs,
    #[serde(rename = "dfs")]
    Dfs,
    #[serde(rename = "dijkstra")]
    Dijkstra,
    #[serde(rename = "greedy")]
    Greedy,
    #[serde(rename = "CLA")]
    Cla,
    #[default]
    #[serde(rename = "astar")]
    Astar,
    #[serde(rename = "randomizedShopper")]
    RandomizedShopper,
}

impl SearchMode {
    pub const ALL: [SearchMode; 7] = [
        SearchMode::Bfs,
        SearchMode::Dfs,
        SearchMode::Dijkstra,
        SearchMode::Greedy,
        SearchMode::Cla,
        SearchMode::Astar,
        SearchMode::RandomizedShopper,
    ];
    /// The deterministic modes.
    pub const CORE: [SearchMode; 6] = [
        SearchMode::Bfs,
        SearchMode::Dfs,
        SearchMode::Dijkstra,
        SearchMode::Greedy,
        SearchMode::Cla,
        SearchMode::Astar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SearchMode::Bfs => "bfs",
            SearchMode::Dfs => "dfs",
            SearchMode::Dijkstra => "dijkstra",
            SearchMode::Greedy => "greedy",
            SearchMode::Cla => "CLA",
            SearchMode::Astar => "astar",
            SearchMode::RandomizedShopper => "randomizedShopper",
        }
    }
    /// Heading the walker faces at the start when the caller does not pick one.
    pub fn default_heading(self) -> Heading {
        match self {
            SearchMode::Astar | SearchMode::RandomizedShopper => Heading::Up,
            _ => Heading::Right,
        }
    }
    /// Whether the mode weighs cells and turns at all.
    pub fn is_weighted(self) -> bool {
        !matches!(self, SearchMode::Bfs | SearchMode::Dfs)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<SearchMode, String> {
        SearchMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown search mode {s:?}"))
    }
}

/// Knobs of a single search call.
#[derive(Clone, Debug, Default)]
pub struct SearchOptions {
    /// Distance estimate used by CLA.
    pub heuristic: Heuristic,
    /// Heading at the start, [SearchMode::default_heading] when unset.
    pub initial_heading: Option<Heading>,
    /// Extra cells to treat as obstacles. The target is never avoided.
    pub avoid: FxHashSet<Point>,
    /// Seed of the randomised shopper.
    pub seed: u64,
}

impl SearchOptions {
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> SearchOptions {
        self.heuristic = heuristic;
        self
    }
    pub fn facing(mut self, heading: Heading) -> SearchOptions {
        self.initial_heading = Some(heading);
        self
    }
    pub fn seeded(mut self, seed: u64) -> SearchOptions {
        self.seed = seed;
        self
    }
}

/// A validated search call as seen by a [GridSolver].
pub struct SearchRequest<'a> {
    pub start: Point,
    pub target: Point,
    pub heading: Heading,
    pub options: &'a SearchOptions,
}

impl SearchRequest<'_> {
    /// Walkable neighbours of `p` that are not avoided, in north, east, south, west order.
    pub fn successors(&self, grid: &StoreGrid, p: &Point) -> SmallVec<[Point; 4]> {
        let mut neighbors = grid.neighbors(p);
        neighbors.retain(|n| *n == self.target || !self.options.avoid.contains(n));
        neighbors
    }
}

/// Everything a search call reports. A failed search still carries its visit order.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub success: bool,
    /// Cells in the order they were expanded.
    pub visited: Vec<Point>,
    /// Cells entered after the start, the target included.
    pub route: Vec<Point>,
    pub maneuvers: Vec<Maneuver>,
    /// Heading on arrival, or the initial heading on failure.
    pub final_heading: Heading,
    /// Cost of the route under the turn model.
    pub cost: u32,
}

impl SearchOutcome {
    pub fn failure(visited: Vec<Point>, heading: Heading) -> SearchOutcome {
        SearchOutcome {
            success: false,
            visited,
            route: Vec::new(),
            maneuvers: Vec::new(),
            final_heading: heading,
            cost: 0,
        }
    }
    /// Traversed cells with both endpoints excluded.
    pub fn path(&self) -> &[Point] {
        match self.route.split_last() {
            Some((_, path)) => path,
            None => &[],
        }
    }
    /// Number of moves from start to target.
    pub fn hop_count(&self) -> usize {
        self.route.len()
    }
}

/// Common interface of the search modes. A solver only explores; validation, path
/// reconstruction and costing are shared.
pub trait GridSolver {
    fn mode(&self) -> SearchMode;

    /// Expands nodes into `ctx` until the target is closed, returning the index of its record.
    fn explore(
        &self,
        grid: &StoreGrid,
        request: &SearchRequest,
        ctx: &mut SearchContext,
    ) -> Option<usize>;

    fn solve(&self, grid: &mut StoreGrid, request: &SearchRequest) -> SearchOutcome {
        let (start, target) = (request.start, request.target);
        grid.reset_search_state();
        if !grid.in_bounds(&start) || !grid.in_bounds(&target) || start == target {
            debug!("{}: invalid endpoints {:?} -> {:?}", self.mode(), start, target);
            return SearchOutcome::failure(Vec::new(), request.heading);
        }
        if !grid.can_move_to(&start) {
            debug!("{}: start {:?} is blocked", self.mode(), start);
            return SearchOutcome::failure(Vec::new(), request.heading);
        }
        let mut ctx = mem::take(&mut grid.context);
        let goal = self.explore(grid, request, &mut ctx);
        let outcome = match goal {
            Some(ix) => {
                let route = ctx.reverse_path(ix).split_off(1);
                let traced = trace_route(start, &route, request.heading)
                    .zip(route_cost(grid, start, &route, request.heading));
                match traced {
                    Some(((maneuvers, final_heading), cost)) => SearchOutcome {
                        success: true,
                        visited: ctx.visited.clone(),
                        route,
                        maneuvers,
                        final_heading,
                        cost,
                    },
                    None => {
                        warn!("{}: reconstructed route is not contiguous", self.mode());
                        SearchOutcome::failure(ctx.visited.clone(), request.heading)
                    }
                }
            }
            None => {
                warn!(
                    "{}: frontier exhausted after {} cells without reaching {:?}",
                    self.mode(),
                    ctx.visited.len(),
                    target
                );
                SearchOutcome::failure(ctx.visited.clone(), request.heading)
            }
        };
        grid.context = ctx;
        debug!(
            "{}: {:?} -> {:?} success={} visited={} cost={}",
            self.mode(),
            start,
            target,
            outcome.success,
            outcome.visited.len(),
            outcome.cost
        );
        outcome
    }
}

/// Runs one search from `start` to `target` with the given mode. The grid's search records are
/// replaced; its heatmap is left alone.
pub fn search(
    grid: &mut StoreGrid,
    start: Point,
    target: Point,
    mode: SearchMode,
    options: &SearchOptions,
) -> SearchOutcome {
    let request = SearchRequest {
        start,
        target,
        heading: options
            .initial_heading
            .unwrap_or_else(|| mode.default_heading()),
        options,
    };
    match mode {
        SearchMode::Bfs => BreadthFirstSolver.solve(grid, &request),
        SearchMode::Dfs => DepthFirstSolver.solve(grid, &request),
        SearchMode::Dijkstra => DijkstraSolver.solve(grid, &request),
        SearchMode::Greedy => GreedySolver.solve(grid, &request),
        SearchMode::Cla => ClaSolver {
            heuristic: options.heuristic,
        }
        .solve(grid, &request),
        SearchMode::Astar => AstarSolver.solve(grid, &request),
        SearchMode::RandomizedShopper => RandomizedShopperSolver {
            seed: options.seed,
        }
        .solve(grid, &request),
    }
}
