//! JSON export and import of a store: a coded cell matrix plus endpoints, stops, walls and the
//! legs of the last planned journey.
//!
//! Matrix codes: `0` open, `1` wall, `2` product, `3` obstacle product, `4` start, `5` target,
//! `6` weighted. Weighted cells are reloaded with [WEIGHTED_CELL_COST].
use grid_util::point::Point;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::cost::Heuristic;
use crate::error::LayoutError;
use crate::journey::PathRecord;
use crate::solver::SearchMode;
use crate::store_grid::{cell, cell_id, parse_cell_id, CellStatus, StoreGrid};
use crate::WEIGHTED_CELL_COST;

/// Matrix code of a cell. The status wins over the weight.
pub fn cell_code(status: CellStatus, weight: u32) -> u8 {
    match status {
        CellStatus::Wall => 1,
        CellStatus::Product => 2,
        CellStatus::ObstacleProduct => 3,
        CellStatus::Start => 4,
        CellStatus::Target => 5,
        CellStatus::Open if weight > 0 => 6,
        CellStatus::Open => 0,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegRecord {
    pub from: String,
    pub to: String,
    pub traversed_cell_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    pub name: SearchMode,
    pub heuristic: Heuristic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub height: usize,
    pub width: usize,
    pub matrix: Vec<Vec<u8>>,
    pub start: String,
    pub target: String,
    #[serde(default)]
    pub stops: Vec<String>,
    #[serde(default)]
    pub walls: Vec<String>,
    #[serde(default)]
    pub legs: Vec<LegRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<AlgorithmInfo>,
}

fn parse_id(id: &str) -> Result<Point, LayoutError> {
    parse_cell_id(id).ok_or_else(|| LayoutError::BadCellId(id.to_string()))
}

impl StoreLayout {
    pub fn from_grid(grid: &StoreGrid) -> StoreLayout {
        let matrix = (0..grid.height() as i32)
            .map(|row| {
                (0..grid.width() as i32)
                    .map(|col| {
                        let p = cell(row, col);
                        cell_code(grid.status(&p).unwrap_or_default(), grid.weight(&p))
                    })
                    .collect()
            })
            .collect();
        StoreLayout {
            name: None,
            description: None,
            height: grid.height(),
            width: grid.width(),
            matrix,
            start: cell_id(&grid.start()),
            target: cell_id(&grid.target()),
            stops: grid.stops().iter().map(cell_id).collect(),
            walls: grid
                .cells()
                .filter(|p| grid.status(p) == Some(CellStatus::Wall))
                .map(|p| cell_id(&p))
                .collect(),
            legs: Vec::new(),
            algorithm: None,
        }
    }

    /// Attaches the legs and search settings of a completed journey.
    pub fn with_path(mut self, record: &PathRecord) -> StoreLayout {
        self.legs = record
            .legs()
            .iter()
            .map(|leg| LegRecord {
                from: cell_id(&leg.from),
                to: cell_id(&leg.to),
                traversed_cell_ids: leg.traversed.iter().map(cell_id).collect(),
            })
            .collect();
        self.algorithm = Some(AlgorithmInfo {
            name: record.mode(),
            heuristic: record.heuristic(),
        });
        self
    }

    /// Rebuilds the grid. Stops keep the listed order; product cells that are not listed follow
    /// in row-major order.
    pub fn to_grid(&self) -> Result<StoreGrid, LayoutError> {
        if self.matrix.len() != self.height {
            return Err(LayoutError::HeightMismatch {
                rows: self.matrix.len(),
                height: self.height,
            });
        }
        if let Some((row, cells)) = self
            .matrix
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != self.width)
        {
            return Err(LayoutError::RaggedRow {
                row,
                len: cells.len(),
                width: self.width,
            });
        }
        let start = parse_id(&self.start)?;
        let target = parse_id(&self.target)?;
        let mut grid = StoreGrid::with_endpoints(self.height, self.width, start, target)?;
        let mut products = Vec::new();
        for (row, cells) in self.matrix.iter().enumerate() {
            for (col, &code) in cells.iter().enumerate() {
                let p = cell(row as i32, col as i32);
                match code {
                    0 => {}
                    1 => grid.set_status(&p, CellStatus::Wall)?,
                    2 => products.push(p),
                    3 => grid.set_status(&p, CellStatus::ObstacleProduct)?,
                    4 if p == start => {}
                    5 if p == target => {}
                    4 => {
                        return Err(LayoutError::EndpointMismatch {
                            field: "start",
                            id: cell_id(&p),
                        })
                    }
                    5 => {
                        return Err(LayoutError::EndpointMismatch {
                            field: "target",
                            id: cell_id(&p),
                        })
                    }
                    6 => grid.set_weight(&p, WEIGHTED_CELL_COST)?,
                    code => return Err(LayoutError::UnknownCode { row, col, code }),
                }
            }
        }
        for (field, p, code) in [("start", start, 4), ("target", target, 5)] {
            if self.matrix[p.y as usize][p.x as usize] != code {
                return Err(LayoutError::EndpointMismatch {
                    field,
                    id: cell_id(&p),
                });
            }
        }
        for id in &self.stops {
            let p = parse_id(id)?;
            if !products.contains(&p) {
                return Err(LayoutError::EndpointMismatch {
                    field: "stop",
                    id: id.clone(),
                });
            }
            grid.add_stop(&p)?;
        }
        for p in &products {
            grid.add_stop(p)?;
        }
        grid.update();
        debug!(
            "Loaded {}x{} layout with {} stops",
            self.height,
            self.width,
            grid.stops().len()
        );
        Ok(grid)
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
    pub fn from_json(json: &str) -> Result<StoreLayout, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }
}
