//! Cone shaped field of view, traced with integer rays.
//!
//! A cone is sampled with one ray per degree. Each ray is rasterised from the caster's cell to
//! the cell at `range` along its direction; it stops at the first wall, which still counts as
//! hit. Obstacle products are seen but do not block.
use fxhash::{FxHashMap, FxHashSet};
use grid_util::point::Point;

use crate::config::VisionConfig;
use crate::cost::Heading;
use crate::store_grid::StoreGrid;

/// Plain 2D vector in grid space: `x` grows with the column, `y` with the row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Vec2 {
        Vec2 { x, y }
    }
    pub fn from_angle(radians: f64) -> Vec2 {
        Vec2::new(radians.cos(), radians.sin())
    }
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(&self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            Vec2::new(0.0, 0.0)
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl From<Heading> for Vec2 {
    fn from(heading: Heading) -> Vec2 {
        let (dx, dy) = heading.offset();
        Vec2::new(dx as f64, dy as f64)
    }
}

/// Rounds halves towards positive infinity.
fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

/// Cells on the integer line between two points, both ends included.
#[derive(Clone, Debug)]
pub struct RasterLine {
    x: i32,
    y: i32,
    end: Point,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl RasterLine {
    pub fn new(from: Point, to: Point) -> RasterLine {
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        RasterLine {
            x: from.x,
            y: from.y,
            end: to,
            dx,
            dy,
            sx: if from.x < to.x { 1 } else { -1 },
            sy: if from.y < to.y { 1 } else { -1 },
            err: dx - dy,
            done: false,
        }
    }
}

impl Iterator for RasterLine {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let current = Point::new(self.x, self.y);
        if self.x == self.end.x && self.y == self.end.y {
            self.done = true;
            return Some(current);
        }
        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(current)
    }
}

/// What one sweep of a cone saw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RayCast {
    /// Product and obstacle product cells, in the order they were first seen.
    pub visible_stops: Vec<Point>,
    /// Number of rays that touched each in-bounds cell, walls included.
    pub hits: FxHashMap<Point, u32>,
    /// Walls that stopped at least one ray.
    pub blocked: FxHashSet<Point>,
}

impl RayCast {
    pub fn hits_at(&self, p: &Point) -> u32 {
        self.hits.get(p).copied().unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisionCone {
    pub half_angle_degrees: f64,
    /// Ray length in cells.
    pub range: u32,
    /// Unit vector the cone is centred on.
    pub facing: Vec2,
}

impl VisionCone {
    pub fn new(config: &VisionConfig, facing: Vec2) -> VisionCone {
        VisionCone {
            half_angle_degrees: config.half_angle_degrees,
            range: config.range,
            facing: facing.normalized(),
        }
    }

    /// Ray offsets in degrees, one per degree from `-half` up to `half`.
    fn offsets(&self) -> impl Iterator<Item = f64> {
        let half = self.half_angle_degrees;
        (0..)
            .map(move |i| -half + i as f64)
            .take_while(move |offset| *offset <= half)
    }

    /// End cell of the ray at `offset` degrees from the facing.
    fn ray_end(&self, from: &Point, offset: f64, range: u32) -> Point {
        let dir = Vec2::from_angle(self.facing.angle() + offset.to_radians());
        let range = range as f64;
        Point::new(
            round_half_up(from.x as f64 + dir.x * range),
            round_half_up(from.y as f64 + dir.y * range),
        )
    }

    /// Sweeps the cone from `from`. Rays never reach further than the grid's width plus height,
    /// whatever the configured range.
    pub fn cast(&self, grid: &StoreGrid, from: &Point) -> RayCast {
        let range = self.range.min((grid.width() + grid.height()) as u32);
        let mut cast = RayCast::default();
        for offset in self.offsets() {
            for p in RasterLine::new(*from, self.ray_end(from, offset, range)) {
                let Some(status) = grid.status(&p) else {
                    continue;
                };
                *cast.hits.entry(p).or_insert(0) += 1;
                if status.blocks_sight() {
                    cast.blocked.insert(p);
                    break;
                }
                if status.is_product() && !cast.visible_stops.contains(&p) {
                    cast.visible_stops.push(p);
                }
            }
        }
        cast
    }
}

/// Sweeps a cone of `half_angle_degrees` on either side of `facing` from `from`.
pub fn cast_rays(
    grid: &StoreGrid,
    from: &Point,
    facing: Vec2,
    half_angle_degrees: f64,
    range: u32,
) -> RayCast {
    let config = VisionConfig {
        half_angle_degrees,
        range,
    };
    VisionCone::new(&config, facing).cast(grid, from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store_grid::{cell, CellStatus};

    #[test]
    fn raster_line_includes_both_ends() {
        let line: Vec<Point> = RasterLine::new(Point::new(0, 0), Point::new(5, 1)).collect();
        assert_eq!(line.first(), Some(&Point::new(0, 0)));
        assert_eq!(line.last(), Some(&Point::new(5, 1)));
        assert_eq!(line.len(), 6);
        let single: Vec<Point> = RasterLine::new(Point::new(2, 2), Point::new(2, 2)).collect();
        assert_eq!(single, vec![Point::new(2, 2)]);
        let back: Vec<Point> = RasterLine::new(Point::new(3, 0), Point::new(0, 0)).collect();
        assert_eq!(back.len(), 4);
    }

    #[test]
    fn wall_shadows_the_cells_behind_it() {
        let mut grid = StoreGrid::with_endpoints(11, 11, cell(0, 0), cell(10, 0)).unwrap();
        grid.set_status(&cell(5, 8), CellStatus::Wall).unwrap();
        let cast = cast_rays(&grid, &cell(5, 5), Heading::Right.into(), 45.0, 5);
        assert_eq!(cast.hits_at(&cell(5, 9)), 0);
        assert_eq!(cast.hits_at(&cell(5, 10)), 0);
        assert!(cast.hits_at(&cell(5, 8)) > 0);
        assert!(cast.blocked.contains(&cell(5, 8)));
        // The caster's own cell is touched by every ray.
        assert_eq!(cast.hits_at(&cell(5, 5)), 91);
    }

    #[test]
    fn obstacle_products_are_seen_through() {
        let mut grid = StoreGrid::with_endpoints(5, 10, cell(0, 0), cell(4, 0)).unwrap();
        grid.set_status(&cell(2, 3), CellStatus::ObstacleProduct)
            .unwrap();
        grid.add_stop(&cell(2, 6)).unwrap();
        let cone = VisionCone::new(&VisionConfig::default(), Heading::Right.into());
        let cast = cone.cast(&grid, &cell(2, 1));
        assert_eq!(cast.visible_stops, vec![cell(2, 3), cell(2, 6)]);
        assert!(cast.blocked.is_empty());
    }

    /// Rays leaving the grid are cut short without stopping the sweep.
    #[test]
    fn out_of_bounds_is_skipped() {
        let grid = StoreGrid::with_endpoints(3, 3, cell(0, 0), cell(2, 2)).unwrap();
        let cast = cast_rays(&grid, &cell(1, 1), Heading::Up.into(), 45.0, 10);
        assert!(cast.hits.keys().all(|p| grid.in_bounds(p)));
        assert!(cast.hits_at(&cell(0, 1)) > 0);
        assert_eq!(cast.hits_at(&cell(2, 1)), 0);
    }

    #[test]
    fn huge_range_is_cut_to_the_grid() {
        let grid = StoreGrid::with_endpoints(4, 6, cell(0, 0), cell(3, 5)).unwrap();
        let config: VisionConfig =
            serde_json::from_str(r#"{"halfAngleDegrees": 45, "range": 4294967295}"#).unwrap();
        let cone = VisionCone::new(&config, Heading::Down.into());
        let cast = cone.cast(&grid, &cell(0, 2));
        assert!(cast.hits.keys().all(|p| grid.in_bounds(p)));
        assert!(cast.hits_at(&cell(3, 2)) > 0);
        let near = cast_rays(&grid, &cell(0, 2), Heading::Down.into(), 45.0, 10);
        assert_eq!(cast.hits, near.hits);
    }
}
