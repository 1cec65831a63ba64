//! Multi-stop journeys: stop ordering, one search per leg and heatmap playback of every
//! confirmed leg.
use fxhash::FxHashSet;
use grid_util::point::Point;
use itertools::Itertools;
use log::{debug, info, warn};

use crate::config::JourneyConfig;
use crate::cost::{manhattan, Heading, Heuristic, Maneuver};
use crate::error::JourneyAborted;
use crate::solver::{search, SearchMode, SearchOptions};
use crate::store_grid::StoreGrid;
use crate::vision::VisionCone;

/// Visits `stops` greedily: always the closest remaining one by Manhattan distance. Ties go to
/// the stop listed first.
pub fn nearest_neighbor_order(start: &Point, stops: &[Point]) -> Vec<Point> {
    let mut remaining = stops.to_vec();
    let mut order = Vec::with_capacity(stops.len());
    let mut current = *start;
    while !remaining.is_empty() {
        let mut best = 0;
        for (ix, stop) in remaining.iter().enumerate().skip(1) {
            if manhattan(&current, stop) < manhattan(&current, &remaining[best]) {
                best = ix;
            }
        }
        current = remaining.remove(best);
        order.push(current);
    }
    order
}

/// One searched and played back segment of a journey.
#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    pub from: Point,
    pub to: Point,
    /// Cells walked between `from` and `to`, both excluded.
    pub traversed: Vec<Point>,
    pub maneuvers: Vec<Maneuver>,
    pub cost: u32,
    /// Products that came into view while walking the leg.
    pub visible_stops: Vec<Point>,
}

/// A completed journey.
#[derive(Clone, Debug, PartialEq)]
pub struct PathRecord {
    mode: SearchMode,
    heuristic: Heuristic,
    start: Point,
    target: Point,
    stop_order: Vec<Point>,
    legs: Vec<Leg>,
}

impl PathRecord {
    pub fn mode(&self) -> SearchMode {
        self.mode
    }
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }
    pub fn start(&self) -> Point {
        self.start
    }
    pub fn target(&self) -> Point {
        self.target
    }
    /// Stops in visiting order, the target excluded.
    pub fn stop_order(&self) -> &[Point] {
        &self.stop_order
    }
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }
    pub fn total_cost(&self) -> u32 {
        self.legs.iter().map(|leg| leg.cost).sum()
    }
    /// Every cell of the journey from start to target in walking order.
    pub fn walk(&self) -> Vec<Point> {
        let mut cells = vec![self.start];
        for leg in &self.legs {
            cells.extend_from_slice(&leg.traversed);
            cells.push(leg.to);
        }
        cells
    }
}

#[derive(Clone, Debug, Default)]
pub struct JourneyPlanner {
    pub config: JourneyConfig,
}

impl JourneyPlanner {
    pub fn new(config: JourneyConfig) -> JourneyPlanner {
        JourneyPlanner { config }
    }

    /// Plans the journey the grid itself describes: its start, its stops and its target.
    pub fn plan_store_journey(&self, grid: &mut StoreGrid) -> Result<PathRecord, JourneyAborted> {
        let (start, target, stops) = (grid.start(), grid.target(), grid.stops().to_vec());
        self.plan_journey(grid, start, &stops, target)
    }

    /// Orders the stops, searches every leg and plays the confirmed legs back into the heatmap.
    /// On failure the heatmap is left as it was before the call.
    pub fn plan_journey(
        &self,
        grid: &mut StoreGrid,
        start: Point,
        stops: &[Point],
        target: Point,
    ) -> Result<PathRecord, JourneyAborted> {
        if start == target || !grid.can_move_to(&start) || !grid.can_move_to(&target) {
            warn!("Journey aborted: invalid endpoints {:?} -> {:?}", start, target);
            return Err(JourneyAborted::InvalidEndpoints { start, target });
        }
        if let Some(stop) = stops.iter().find(|s| !grid.can_move_to(s)) {
            warn!("Journey aborted: stop {:?} cannot be visited", stop);
            return Err(JourneyAborted::BlockedStop(*stop));
        }
        let stops: Vec<Point> = stops
            .iter()
            .copied()
            .filter(|s| *s != start && *s != target)
            .unique()
            .collect();
        let stop_order = nearest_neighbor_order(&start, &stops);
        let waypoints: Vec<Point> = std::iter::once(start)
            .chain(stop_order.iter().copied())
            .chain(std::iter::once(target))
            .collect();

        if !self.config.avoid_pending_stops {
            grid.update();
            for (leg, (from, to)) in waypoints.iter().tuple_windows().enumerate() {
                if grid.unreachable(from, to) {
                    warn!("Journey aborted: leg {leg} {:?} -> {:?} is disconnected", from, to);
                    return Err(JourneyAborted::LegFailed {
                        leg,
                        from: *from,
                        to: *to,
                    });
                }
            }
        }

        let snapshot = grid.heatmap.clone();
        let mut pending: FxHashSet<Point> = stop_order.iter().copied().collect();
        let mut heading: Option<Heading> = None;
        let mut legs = Vec::with_capacity(waypoints.len() - 1);
        for (leg, (&from, &to)) in waypoints.iter().tuple_windows().enumerate() {
            pending.remove(&to);
            let mut options = SearchOptions {
                heuristic: self.config.heuristic,
                initial_heading: heading,
                seed: self.config.seed.wrapping_add(leg as u64),
                ..SearchOptions::default()
            };
            if self.config.avoid_pending_stops {
                options.avoid = pending.clone();
            }
            let outcome = search(grid, from, to, self.config.mode, &options);
            if !outcome.success {
                grid.heatmap = snapshot;
                warn!("Journey aborted: leg {leg} {:?} -> {:?} failed", from, to);
                return Err(JourneyAborted::LegFailed { leg, from, to });
            }
            let traversed = outcome.path().to_vec();
            let visible_stops = self.play_leg(grid, from, &traversed);
            debug!(
                "Leg {leg} {:?} -> {:?}: {} cells, cost {}",
                from,
                to,
                traversed.len(),
                outcome.cost
            );
            heading = Some(outcome.final_heading);
            legs.push(Leg {
                from,
                to,
                traversed,
                maneuvers: outcome.maneuvers,
                cost: outcome.cost,
                visible_stops,
            });
        }
        let record = PathRecord {
            mode: self.config.mode,
            heuristic: self.config.heuristic,
            start,
            target,
            stop_order,
            legs,
        };
        info!(
            "Planned {} journey over {} legs, total cost {}",
            record.mode,
            record.legs.len(),
            record.total_cost()
        );
        Ok(record)
    }

    /// Walks a confirmed leg: credits the final path bonus, then at every traversed cell casts
    /// a cone facing the direction of the step into it and counts the step. Returns the
    /// products seen on the way.
    ///
    /// The first cell's cone faces away from `from` as well, rather than along a fixed east
    /// facing, so heat around a leg's first step follows the direction actually walked.
    pub fn play_leg(&self, grid: &mut StoreGrid, from: Point, traversed: &[Point]) -> Vec<Point> {
        grid.heatmap.record_final_path(traversed);
        let mut seen = Vec::new();
        let mut previous = from;
        for p in traversed {
            if let Some(heading) = Heading::between(&previous, p) {
                let cone = VisionCone::new(&self.config.vision, heading.into());
                let cast = cone.cast(grid, p);
                grid.heatmap.record_vision(&cast);
                for stop in cast.visible_stops {
                    if !seen.contains(&stop) {
                        seen.push(stop);
                    }
                }
            }
            grid.heatmap.record_step(p);
            previous = *p;
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store_grid::{cell, CellStatus};

    #[test]
    fn nearest_neighbor_ties_go_to_first_listed() {
        let order = nearest_neighbor_order(&cell(0, 0), &[cell(0, 5), cell(5, 0)]);
        assert_eq!(order, vec![cell(0, 5), cell(5, 0)]);
        let order = nearest_neighbor_order(&cell(0, 0), &[cell(5, 0), cell(0, 5)]);
        assert_eq!(order, vec![cell(5, 0), cell(0, 5)]);
        let order = nearest_neighbor_order(&cell(0, 0), &[cell(4, 4), cell(0, 1), cell(0, 3)]);
        assert_eq!(order, vec![cell(0, 1), cell(0, 3), cell(4, 4)]);
    }

    #[test]
    fn legs_chain_and_fill_the_heatmap() {
        let mut grid = StoreGrid::with_endpoints(8, 8, cell(0, 0), cell(7, 7)).unwrap();
        grid.add_stop(&cell(0, 6)).unwrap();
        grid.add_stop(&cell(6, 1)).unwrap();
        let planner = JourneyPlanner::default();
        let record = planner.plan_store_journey(&mut grid).unwrap();
        assert_eq!(record.stop_order(), &[cell(0, 6), cell(6, 1)]);
        assert_eq!(record.legs().len(), 3);
        for (a, b) in record.legs().iter().tuple_windows() {
            assert_eq!(a.to, b.from);
        }
        let walk = record.walk();
        assert_eq!(walk.first(), Some(&cell(0, 0)));
        assert_eq!(walk.last(), Some(&cell(7, 7)));
        for (a, b) in walk.iter().tuple_windows() {
            assert_eq!(manhattan(a, b), 1);
        }
        let walked = record.legs()[0].traversed[0];
        assert!(grid.rendered_intensity(&walked) > 0.0);
        assert!(grid.heatmap.sensor(&walked).unwrap().path_visits >= 4);
    }

    #[test]
    fn failed_leg_restores_heatmap() {
        let mut grid = StoreGrid::with_endpoints(5, 5, cell(0, 0), cell(4, 4)).unwrap();
        grid.add_stop(&cell(0, 4)).unwrap();
        // Box in the target.
        grid.set_status(&cell(3, 4), CellStatus::Wall).unwrap();
        grid.set_status(&cell(4, 3), CellStatus::Wall).unwrap();
        let planner = JourneyPlanner::new(JourneyConfig {
            avoid_pending_stops: true,
            ..JourneyConfig::default()
        });
        let err = planner.plan_store_journey(&mut grid).unwrap_err();
        assert_eq!(
            err,
            JourneyAborted::LegFailed {
                leg: 1,
                from: cell(0, 4),
                to: cell(4, 4)
            }
        );
        assert!(grid.cells().all(|p| grid.heatmap.intensity(&p) == 0.0));
    }

    #[test]
    fn disconnected_leg_aborts_before_searching() {
        let mut grid = StoreGrid::with_endpoints(3, 3, cell(0, 0), cell(2, 2)).unwrap();
        grid.set_status(&cell(1, 2), CellStatus::Wall).unwrap();
        grid.set_status(&cell(2, 1), CellStatus::Wall).unwrap();
        let err = JourneyPlanner::default()
            .plan_store_journey(&mut grid)
            .unwrap_err();
        assert!(matches!(err, JourneyAborted::LegFailed { leg: 0, .. }));
        assert!(grid.visited_order().is_empty());
    }

    /// The only way to the first stop runs over the second one.
    //  S . . B .
    //  # # # # .
    //  A . . . T
    #[test]
    fn pending_stops_are_obstacles() {
        let mut grid = StoreGrid::with_endpoints(3, 5, cell(0, 0), cell(2, 4)).unwrap();
        for col in 0..4 {
            grid.set_status(&cell(1, col), CellStatus::Wall).unwrap();
        }
        grid.add_stop(&cell(2, 0)).unwrap();
        grid.add_stop(&cell(0, 3)).unwrap();
        let walking = JourneyPlanner::default()
            .plan_store_journey(&mut grid)
            .unwrap();
        assert_eq!(walking.stop_order(), &[cell(2, 0), cell(0, 3)]);
        assert!(walking.legs()[0].traversed.contains(&cell(0, 3)));

        let avoiding = JourneyPlanner::new(JourneyConfig {
            avoid_pending_stops: true,
            ..JourneyConfig::default()
        });
        assert!(matches!(
            avoiding.plan_store_journey(&mut grid),
            Err(JourneyAborted::LegFailed { leg: 0, .. })
        ));
    }

    /// Walking west out of the origin, the first cone looks west too.
    #[test]
    fn first_cone_faces_the_first_step() {
        let mut grid = StoreGrid::with_endpoints(7, 7, cell(3, 6), cell(3, 0)).unwrap();
        let planner = JourneyPlanner::new(JourneyConfig {
            vision: crate::config::VisionConfig {
                half_angle_degrees: 45.0,
                range: 3,
            },
            ..JourneyConfig::default()
        });
        planner.play_leg(&mut grid, cell(3, 6), &[cell(3, 5)]);
        assert!(grid.heatmap.intensity(&cell(3, 2)) > 0.0);
        assert_eq!(grid.heatmap.intensity(&cell(3, 6)), 0.0);
        assert_eq!(grid.heatmap.sensor(&cell(3, 5)).unwrap().path_visits, 4);
    }

    #[test]
    fn invalid_endpoints_and_stops() {
        let mut grid = StoreGrid::with_endpoints(3, 3, cell(0, 0), cell(2, 2)).unwrap();
        grid.set_status(&cell(1, 1), CellStatus::Wall).unwrap();
        let planner = JourneyPlanner::default();
        assert_eq!(
            planner.plan_journey(&mut grid, cell(0, 0), &[], cell(0, 0)),
            Err(JourneyAborted::InvalidEndpoints {
                start: cell(0, 0),
                target: cell(0, 0)
            })
        );
        assert_eq!(
            planner.plan_journey(&mut grid, cell(0, 0), &[cell(1, 1)], cell(2, 2)),
            Err(JourneyAborted::BlockedStop(cell(1, 1)))
        );
    }
}
