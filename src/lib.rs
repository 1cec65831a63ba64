//! # shopper_pathfinding
//!
//! Grid search for a shopper walking from an entrance, past an ordered list of product
//! stops, to an exit. Six search modes ([BFS](https://en.wikipedia.org/wiki/Breadth-first_search),
//! DFS, Dijkstra, greedy best-first, CLA and A*) plus a randomised "wandering shopper" share one
//! [GridSolver](solver::GridSolver) interface and a direction-aware movement cost: going straight
//! costs [STRAIGHT_COST], a quarter turn [TURN_COST] and turning around [U_TURN_COST], on top of
//! any surcharge on the cell entered.
//!
//! Once a leg of a journey is confirmed, a cone shaped sensor is swept along it with
//! [Bresenham rays](https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm) and the cells it
//! sees or walks over are folded into a normalised [heatmap](heatmap::Heatmap). Stop order is a
//! nearest neighbour tour, computed by the [JourneyPlanner](journey::JourneyPlanner).
//!
//! Grids and completed journeys can be exported to and reloaded from a small JSON
//! [layout](layout::StoreLayout).
pub mod config;
pub mod cost;
pub mod error;
pub mod heatmap;
pub mod journey;
pub mod layout;
pub mod solver;
pub mod store_grid;
pub mod vision;

pub use config::{HeatmapConfig, JourneyConfig, VisionConfig};
pub use cost::{Heading, Heuristic, Maneuver};
pub use error::{GridError, JourneyAborted, LayoutError};
pub use journey::{JourneyPlanner, PathRecord};
pub use layout::StoreLayout;
pub use solver::{search, SearchMode, SearchOptions, SearchOutcome};
pub use store_grid::{cell, cell_id, parse_cell_id, CellStatus, StoreGrid};
pub use vision::{cast_rays, RayCast, VisionCone};

/// Cost of a step that keeps the current heading.
pub const STRAIGHT_COST: u32 = 1;
/// Cost of a step that needs a single quarter turn first.
pub const TURN_COST: u32 = 2;
/// Cost of a step in the opposite direction, modelled as two turns.
pub const U_TURN_COST: u32 = 3;
/// Surcharge carried by a weighted ("difficult terrain") cell.
pub const WEIGHTED_CELL_COST: u32 = 15;
