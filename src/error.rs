//! Error types for grid edits, journeys and layout import.
//!
//! A search that cannot reach its target is not an error: it comes back as a
//! [SearchOutcome](crate::SearchOutcome) with `success == false`.
use grid_util::point::Point;

/// Rejected edits of a [StoreGrid](crate::StoreGrid).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// The grid needs at least one row and two columns for distinct endpoints.
    #[error("a store grid needs at least 1 row and 2 columns, got {height}x{width}")]
    TooSmall { height: usize, width: usize },

    #[error("cell {0:?} lies outside the grid")]
    OutOfBounds(Point),

    /// Start, target and stop cells cannot be overwritten.
    #[error("cell {cell:?} holds a protected {status:?} cell")]
    ProtectedCell {
        cell: Point,
        status: crate::CellStatus,
    },

    #[error("start and target cannot share cell {0:?}")]
    EndpointsCoincide(Point),

    #[error("cell {0:?} blocks movement and cannot be an endpoint")]
    BlockedEndpoint(Point),

    #[error("cell {0:?} blocks movement and cannot carry a weight")]
    WeightOnBlockedCell(Point),

    /// A cell is either plain (0) or difficult terrain ([WEIGHTED_CELL_COST](crate::WEIGHTED_CELL_COST)).
    #[error("weight {weight} on cell {cell:?} is neither 0 nor the weighted cell cost")]
    UnsupportedWeight { cell: Point, weight: u32 },
}

/// Reasons a multi-stop journey was abandoned. No partial route is ever returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JourneyAborted {
    #[error("journey endpoints {start:?} -> {target:?} are missing, equal or blocked")]
    InvalidEndpoints { start: Point, target: Point },

    #[error("stop {0:?} is outside the grid or blocks movement")]
    BlockedStop(Point),

    /// Leg `leg` (zero based) could not be searched successfully.
    #[error("leg {leg} from {from:?} to {to:?} could not be completed")]
    LegFailed { leg: usize, from: Point, to: Point },
}

/// Failures while reading a [StoreLayout](crate::StoreLayout).
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid layout json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("matrix has {rows} rows but the layout declares a height of {height}")]
    HeightMismatch { rows: usize, height: usize },

    #[error("matrix row {row} has {len} cells but the layout declares a width of {width}")]
    RaggedRow { row: usize, len: usize, width: usize },

    #[error("unknown cell code {code} at row {row}, column {col}")]
    UnknownCode { row: usize, col: usize, code: u8 },

    #[error("malformed cell id {0:?}")]
    BadCellId(String),

    /// The matrix and the explicit `start`/`target` fields disagree.
    #[error("{field} {id:?} does not match the matrix")]
    EndpointMismatch { field: &'static str, id: String },

    #[error(transparent)]
    Grid(#[from] GridError),
}
