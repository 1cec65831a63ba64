use core::fmt;

use grid_util::grid::{Grid, SimpleGrid};
use grid_util::point::Point;
use itertools::iproduct;
use log::info;
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::HeatmapConfig;
use crate::cost::Heading;
use crate::error::GridError;
use crate::heatmap::Heatmap;
use crate::solver::context::{NodeRecord, SearchContext};
use crate::WEIGHTED_CELL_COST;

/// Role of a single cell in the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellStatus {
    #[default]
    Open,
    Wall,
    Start,
    Target,
    /// A shelf the shopper has to visit. Every product cell is a stop.
    Product,
    /// A product on display that cannot be walked over.
    ObstacleProduct,
}

impl CellStatus {
    pub fn blocks_movement(self) -> bool {
        matches!(self, CellStatus::Wall | CellStatus::ObstacleProduct)
    }
    /// Only walls stop a ray; obstacle products stay see-through.
    pub fn blocks_sight(self) -> bool {
        self == CellStatus::Wall
    }
    /// Endpoints and stops cannot be overwritten by a plain status edit.
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            CellStatus::Start | CellStatus::Target | CellStatus::Product
        )
    }
    pub fn is_product(self) -> bool {
        matches!(self, CellStatus::Product | CellStatus::ObstacleProduct)
    }
    pub fn shows_heat(self) -> bool {
        self == CellStatus::Open
    }
}

/// Point for a `(row, col)` pair.
pub fn cell(row: i32, col: i32) -> Point {
    Point::new(col, row)
}

/// Textual `"row-col"` id of a cell.
pub fn cell_id(p: &Point) -> String {
    format!("{}-{}", p.y, p.x)
}

pub fn parse_cell_id(id: &str) -> Option<Point> {
    let (row, col) = id.split_once('-')?;
    Some(cell(row.trim().parse().ok()?, col.trim().parse().ok()?))
}

/// [StoreGrid] holds the status and weight of every cell, the journey endpoints and stops, and
/// maintains connected components of the walkable cells using a [UnionFind] structure. It also
/// owns the reusable search context and the traffic [Heatmap].
#[derive(Clone, Debug)]
pub struct StoreGrid {
    status: SimpleGrid<CellStatus>,
    weights: SimpleGrid<u32>,
    start: Point,
    target: Point,
    stops: Vec<Point>,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
    pub heatmap: Heatmap,
    pub(crate) context: SearchContext,
}

impl StoreGrid {
    /// An open grid with the entrance a quarter and the exit three quarters of the way along
    /// the middle row.
    pub fn create(height: usize, width: usize) -> Result<StoreGrid, GridError> {
        let row = (height / 2) as i32;
        let start = cell(row, (width / 4) as i32);
        let target = cell(row, (3 * width / 4) as i32);
        StoreGrid::with_endpoints(height, width, start, target)
    }

    /// An open grid with explicitly placed endpoints.
    pub fn with_endpoints(
        height: usize,
        width: usize,
        start: Point,
        target: Point,
    ) -> Result<StoreGrid, GridError> {
        if height < 1 || width < 2 {
            return Err(GridError::TooSmall { height, width });
        }
        let mut grid = StoreGrid {
            status: SimpleGrid::new(width, height, CellStatus::Open),
            weights: SimpleGrid::new(width, height, 0),
            start,
            target,
            stops: Vec::new(),
            components: UnionFind::new(width * height),
            components_dirty: true,
            heatmap: Heatmap::new(width, height, HeatmapConfig::default()),
            context: SearchContext::default(),
        };
        for p in [start, target] {
            if !grid.in_bounds(&p) {
                return Err(GridError::OutOfBounds(p));
            }
        }
        if start == target {
            return Err(GridError::EndpointsCoincide(start));
        }
        grid.put(&start, CellStatus::Start);
        grid.put(&target, CellStatus::Target);
        grid.generate_components();
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.status.width()
    }
    pub fn height(&self) -> usize {
        self.status.height()
    }
    pub fn start(&self) -> Point {
        self.start
    }
    pub fn target(&self) -> Point {
        self.target
    }
    /// Stops in the order they were added.
    pub fn stops(&self) -> &[Point] {
        &self.stops
    }

    pub fn in_bounds(&self, p: &Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width() && (p.y as usize) < self.height()
    }
    /// Row-major index of an in-bounds cell.
    pub fn index(&self, p: &Point) -> usize {
        p.y as usize * self.width() + p.x as usize
    }
    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Point> {
        iproduct!(0..self.height() as i32, 0..self.width() as i32).map(|(y, x)| Point::new(x, y))
    }

    pub fn status(&self, p: &Point) -> Option<CellStatus> {
        self.in_bounds(p).then(|| self.status_at(p))
    }
    fn status_at(&self, p: &Point) -> CellStatus {
        self.status.get(p.x as usize, p.y as usize)
    }
    /// Surcharge for entering `p`, zero outside the grid.
    pub fn weight(&self, p: &Point) -> u32 {
        if self.in_bounds(p) {
            self.weights.get(p.x as usize, p.y as usize)
        } else {
            0
        }
    }

    pub fn can_move_to(&self, p: &Point) -> bool {
        self.in_bounds(p) && !self.status_at(p).blocks_movement()
    }
    pub fn blocks_sight(&self, p: &Point) -> bool {
        self.in_bounds(p) && self.status_at(p).blocks_sight()
    }

    /// Walkable orthogonal neighbours in north, east, south, west order.
    pub fn neighbors(&self, p: &Point) -> SmallVec<[Point; 4]> {
        Heading::ALL
            .iter()
            .map(|heading| heading.step(p))
            .filter(|n| self.can_move_to(n))
            .collect()
    }

    /// Writes a status and keeps the components consistent: opening a cell joins it with its
    /// neighbours, blocking one marks the components as dirty.
    fn put(&mut self, p: &Point, status: CellStatus) {
        let was_blocked = self.status_at(p).blocks_movement();
        if status.blocks_movement() {
            if !was_blocked {
                self.components_dirty = true;
            }
        } else if was_blocked {
            let p_ix = self.index(p);
            for n in self.neighbors(p) {
                let n_ix = self.index(&n);
                self.components.union(p_ix, n_ix);
            }
        }
        if status != CellStatus::Open {
            self.weights.set(p.x as usize, p.y as usize, 0);
        }
        self.status.set(p.x as usize, p.y as usize, status);
    }

    fn check_bounds(&self, p: &Point) -> Result<(), GridError> {
        if self.in_bounds(p) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds(*p))
        }
    }

    /// Sets the status of a cell. Start, target and product statuses are routed to
    /// [set_start](Self::set_start), [set_target](Self::set_target) and
    /// [add_stop](Self::add_stop); endpoints and stops themselves cannot be overwritten.
    pub fn set_status(&mut self, p: &Point, status: CellStatus) -> Result<(), GridError> {
        self.check_bounds(p)?;
        match status {
            CellStatus::Start => self.set_start(p),
            CellStatus::Target => self.set_target(p),
            CellStatus::Product => self.add_stop(p),
            _ => {
                let current = self.status_at(p);
                if current.is_protected() {
                    return Err(GridError::ProtectedCell {
                        cell: *p,
                        status: current,
                    });
                }
                self.put(p, status);
                Ok(())
            }
        }
    }

    /// Marks an open cell as difficult terrain ([WEIGHTED_CELL_COST]) or plain again (0).
    pub fn set_weight(&mut self, p: &Point, weight: u32) -> Result<(), GridError> {
        self.check_bounds(p)?;
        if weight != 0 && weight != WEIGHTED_CELL_COST {
            return Err(GridError::UnsupportedWeight { cell: *p, weight });
        }
        match self.status_at(p) {
            CellStatus::Open => {
                self.weights.set(p.x as usize, p.y as usize, weight);
                Ok(())
            }
            s if s.blocks_movement() => Err(GridError::WeightOnBlockedCell(*p)),
            status => Err(GridError::ProtectedCell { cell: *p, status }),
        }
    }

    fn check_endpoint(&self, p: &Point, other: &Point) -> Result<(), GridError> {
        self.check_bounds(p)?;
        if p == other {
            return Err(GridError::EndpointsCoincide(*p));
        }
        match self.status_at(p) {
            s if s.blocks_movement() => Err(GridError::BlockedEndpoint(*p)),
            CellStatus::Product => Err(GridError::ProtectedCell {
                cell: *p,
                status: CellStatus::Product,
            }),
            _ => Ok(()),
        }
    }

    /// Moves the entrance; the old entrance becomes an open cell.
    pub fn set_start(&mut self, p: &Point) -> Result<(), GridError> {
        self.check_endpoint(p, &self.target)?;
        let old = self.start;
        self.put(&old, CellStatus::Open);
        self.put(p, CellStatus::Start);
        self.start = *p;
        Ok(())
    }

    /// Moves the exit; the old exit becomes an open cell.
    pub fn set_target(&mut self, p: &Point) -> Result<(), GridError> {
        self.check_endpoint(p, &self.start)?;
        let old = self.target;
        self.put(&old, CellStatus::Open);
        self.put(p, CellStatus::Target);
        self.target = *p;
        Ok(())
    }

    /// Turns `p` into a product stop. Adding an existing stop is a no-op.
    pub fn add_stop(&mut self, p: &Point) -> Result<(), GridError> {
        self.check_bounds(p)?;
        match self.status_at(p) {
            CellStatus::Product => Ok(()),
            s if s.blocks_movement() => Err(GridError::BlockedEndpoint(*p)),
            status @ (CellStatus::Start | CellStatus::Target) => {
                Err(GridError::ProtectedCell { cell: *p, status })
            }
            _ => {
                self.put(p, CellStatus::Product);
                self.stops.push(*p);
                Ok(())
            }
        }
    }

    /// Returns whether `p` was a stop.
    pub fn remove_stop(&mut self, p: &Point) -> bool {
        match self.stops.iter().position(|s| s == p) {
            Some(ix) => {
                self.stops.remove(ix);
                self.put(p, CellStatus::Open);
                true
            }
            None => false,
        }
    }

    /// Clears all per-search records. Sensor state is left untouched.
    pub fn reset_search_state(&mut self) {
        self.context.clear();
    }
    /// Cheapest record the last search kept for `p`.
    pub fn search_record(&self, p: &Point) -> Option<&NodeRecord> {
        self.context.best_record(p)
    }
    /// Cells in the order the last search expanded them.
    pub fn visited_order(&self) -> &[Point] {
        &self.context.visited
    }

    /// Heatmap intensity as it should be displayed: only open cells show heat.
    pub fn rendered_intensity(&self, p: &Point) -> f64 {
        match self.status(p) {
            Some(status) if status.shows_heat() => self.heatmap.intensity(p),
            _ => 0.0,
        }
    }

    /// Retrieves the component id a given [Point] belongs to.
    pub fn get_component(&self, p: &Point) -> usize {
        self.components.find(self.index(p))
    }
    /// Checks if start and goal are walkable and on the same component.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        if self.can_move_to(start) && self.can_move_to(goal) {
            !self
                .components
                .equiv(self.index(start), self.index(goal))
        } else {
            true
        }
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up walkable neighbours to the same
    /// components.
    pub fn generate_components(&mut self) {
        let (w, h) = (self.width(), self.height());
        self.components = UnionFind::new(w * h);
        self.components_dirty = false;
        for p in self.cells().filter(|p| self.can_move_to(p)).collect::<Vec<_>>() {
            let parent_ix = self.index(&p);
            // Looking east and south is enough to see every edge once.
            for n in [Heading::Right.step(&p), Heading::Down.step(&p)] {
                if self.can_move_to(&n) {
                    let ix = self.index(&n);
                    self.components.union(parent_ix, ix);
                }
            }
        }
        info!("Generated components for a {h}x{w} store grid");
    }
}

impl fmt::Display for StoreGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.height() as i32 {
            let row = (0..self.width() as i32)
                .map(|x| {
                    let p = Point::new(x, y);
                    match self.status_at(&p) {
                        CellStatus::Open if self.weight(&p) > 0 => '~',
                        CellStatus::Open => '.',
                        CellStatus::Wall => '#',
                        CellStatus::Start => 'S',
                        CellStatus::Target => 'T',
                        CellStatus::Product => 'P',
                        CellStatus::ObstacleProduct => 'X',
                    }
                })
                .collect::<String>();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
