//! Tunables for the heatmap, the vision cone and journey planning.
//!
//! Every struct deserialises from camelCase JSON with missing fields falling back to
//! [Default], so a caller can keep only the values it wants to change.
use serde::{Deserialize, Serialize};

use crate::cost::Heuristic;
use crate::solver::SearchMode;

/// Weights and normalisation of the traffic heatmap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeatmapConfig {
    pub enabled: bool,
    /// Contribution of one vision ray hit.
    pub vision_weight: f64,
    /// Contribution of one walked step.
    pub path_weight: f64,
    /// Combined score at which a cell saturates to intensity 1.
    pub max_threshold: f64,
    /// Extra path visits credited to every cell of a confirmed leg.
    pub final_path_bonus: u32,
}

impl Default for HeatmapConfig {
    fn default() -> HeatmapConfig {
        HeatmapConfig {
            enabled: true,
            vision_weight: 0.20,
            path_weight: 0.15,
            max_threshold: 75.0,
            final_path_bonus: 3,
        }
    }
}

/// Shape of the simulated field of view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisionConfig {
    pub half_angle_degrees: f64,
    /// Ray length in cells.
    pub range: u32,
}

impl Default for VisionConfig {
    fn default() -> VisionConfig {
        VisionConfig {
            half_angle_degrees: 45.0,
            range: 10,
        }
    }
}

/// Settings shared by every leg of a journey.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JourneyConfig {
    pub mode: SearchMode,
    pub heuristic: Heuristic,
    pub vision: VisionConfig,
    /// Treat stops that are still to be visited as obstacles on the other legs.
    pub avoid_pending_stops: bool,
    /// Base seed for the randomised shopper; leg `i` uses `seed + i`.
    pub seed: u64,
}

impl JourneyConfig {
    pub fn from_json(json: &str) -> Result<JourneyConfig, serde_json::Error> {
        serde_json::from_str(json)
    }
}
