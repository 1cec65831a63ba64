//! Headings, turn costs and distance heuristics shared by every search mode.
use core::fmt;
use std::str::FromStr;

use grid_util::point::Point;
use serde::{Deserialize, Serialize};

use crate::store_grid::StoreGrid;
use crate::{STRAIGHT_COST, TURN_COST, U_TURN_COST};

/// Facing of the shopper on a 4-connected grid. Rows grow downwards, so [Heading::Up]
/// decreases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    /// Clockwise, starting north. Neighbour order of the grid follows this array.
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    pub fn index(self) -> usize {
        match self {
            Heading::Up => 0,
            Heading::Right => 1,
            Heading::Down => 2,
            Heading::Left => 3,
        }
    }
    pub fn clockwise(self) -> Heading {
        Heading::ALL[(self.index() + 1) % 4]
    }
    pub fn counter_clockwise(self) -> Heading {
        Heading::ALL[(self.index() + 3) % 4]
    }
    pub fn opposite(self) -> Heading {
        Heading::ALL[(self.index() + 2) % 4]
    }
    /// `(dx, dy)` of a single step.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Heading::Up => (0, -1),
            Heading::Right => (1, 0),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
        }
    }
    pub fn step(self, from: &Point) -> Point {
        let (dx, dy) = self.offset();
        Point::new(from.x + dx, from.y + dy)
    }
    /// Heading of a single orthogonal step, [None] for anything else.
    pub fn between(from: &Point, to: &Point) -> Option<Heading> {
        match (to.x - from.x, to.y - from.y) {
            (0, -1) => Some(Heading::Up),
            (1, 0) => Some(Heading::Right),
            (0, 1) => Some(Heading::Down),
            (-1, 0) => Some(Heading::Left),
            _ => None,
        }
    }
}

/// Elementary action of a walker: turns happen in place, only [Maneuver::Forward] moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Maneuver {
    Forward,
    TurnLeft,
    TurnRight,
}

impl Maneuver {
    pub fn code(self) -> char {
        match self {
            Maneuver::Forward => 'f',
            Maneuver::TurnLeft => 'l',
            Maneuver::TurnRight => 'r',
        }
    }
}

const FORWARD: &[Maneuver] = &[Maneuver::Forward];
const LEFT_FORWARD: &[Maneuver] = &[Maneuver::TurnLeft, Maneuver::Forward];
const RIGHT_FORWARD: &[Maneuver] = &[Maneuver::TurnRight, Maneuver::Forward];
const RIGHT_RIGHT_FORWARD: &[Maneuver] =
    &[Maneuver::TurnRight, Maneuver::TurnRight, Maneuver::Forward];
const LEFT_LEFT_FORWARD: &[Maneuver] = &[Maneuver::TurnLeft, Maneuver::TurnLeft, Maneuver::Forward];

/// Cost and resulting heading of one step, along with the turns it takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub cost: u32,
    pub heading: Heading,
    pub maneuvers: &'static [Maneuver],
}

/// Turn cost of leaving a cell in direction `heading` while facing `facing`.
pub fn turn_step(facing: Heading, heading: Heading) -> Step {
    let (cost, maneuvers) = if heading == facing {
        (STRAIGHT_COST, FORWARD)
    } else if heading == facing.clockwise() {
        (TURN_COST, RIGHT_FORWARD)
    } else if heading == facing.counter_clockwise() {
        (TURN_COST, LEFT_FORWARD)
    } else if facing == Heading::Right {
        (U_TURN_COST, LEFT_LEFT_FORWARD)
    } else {
        (U_TURN_COST, RIGHT_RIGHT_FORWARD)
    };
    Step {
        cost,
        heading,
        maneuvers,
    }
}

/// [turn_step] for a move between two adjacent cells.
pub fn step_between(facing: Heading, from: &Point, to: &Point) -> Option<Step> {
    Heading::between(from, to).map(|heading| turn_step(facing, heading))
}

pub fn manhattan(a: &Point, b: &Point) -> u32 {
    (a.x - b.x).unsigned_abs() + (a.y - b.y).unsigned_abs()
}

/// Movement cost of walking `route` (origin excluded, destination included) from `origin`
/// while initially facing `facing`: per step the weight of the entered cell plus its turn cost.
pub fn route_cost(grid: &StoreGrid, origin: Point, route: &[Point], facing: Heading) -> Option<u32> {
    let mut current = origin;
    let mut facing = facing;
    let mut total = 0;
    for next in route {
        let step = step_between(facing, &current, next)?;
        total += grid.weight(next) + step.cost;
        facing = step.heading;
        current = *next;
    }
    Some(total)
}

/// The maneuvers needed to walk `route` from `origin` and the heading on arrival.
pub fn trace_route(origin: Point, route: &[Point], facing: Heading) -> Option<(Vec<Maneuver>, Heading)> {
    let mut current = origin;
    let mut facing = facing;
    let mut maneuvers = Vec::with_capacity(route.len());
    for next in route {
        let step = step_between(facing, &current, next)?;
        maneuvers.extend_from_slice(step.maneuvers);
        facing = step.heading;
        current = *next;
    }
    Some((maneuvers, facing))
}

/// Estimate of the remaining distance. The powered variants deliberately overestimate to pull
/// weighted searches towards the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heuristic {
    #[serde(rename = "manhattanDistance")]
    Manhattan,
    #[default]
    #[serde(rename = "poweredManhattanDistance")]
    PoweredManhattan,
    #[serde(rename = "extraPoweredManhattanDistance")]
    ExtraPoweredManhattan,
}

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [
        Heuristic::Manhattan,
        Heuristic::PoweredManhattan,
        Heuristic::ExtraPoweredManhattan,
    ];

    pub fn exponent(self) -> usize {
        match self {
            Heuristic::Manhattan => 1,
            Heuristic::PoweredManhattan => 2,
            Heuristic::ExtraPoweredManhattan => 7,
        }
    }
    pub fn estimate(self, from: &Point, to: &Point) -> f64 {
        num_traits::pow(manhattan(from, to) as f64, self.exponent())
    }
    pub fn name(self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattanDistance",
            Heuristic::PoweredManhattan => "poweredManhattanDistance",
            Heuristic::ExtraPoweredManhattan => "extraPoweredManhattanDistance",
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> Result<Heuristic, String> {
        match s {
            "manhattan" | "manhattanDistance" => Ok(Heuristic::Manhattan),
            "powered" | "poweredManhattanDistance" => Ok(Heuristic::PoweredManhattan),
            "extraPowered" | "extraPoweredManhattanDistance" => {
                Ok(Heuristic::ExtraPoweredManhattan)
            }
            other => Err(format!("unknown heuristic {other:?}")),
        }
    }
}
