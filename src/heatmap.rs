//! Traffic heatmap: how often each cell was seen and walked over during played back journeys.
use grid_util::grid::{Grid, SimpleGrid};
use grid_util::point::Point;
use log::debug;

use crate::config::HeatmapConfig;
use crate::vision::RayCast;

/// Sensor counters of one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorState {
    pub vision_visits: u32,
    pub path_visits: u32,
    pub combined_score: f64,
    /// `combined_score` normalised into `[0, 1]`.
    pub intensity: f64,
}

impl SensorState {
    fn recompute(&mut self, config: &HeatmapConfig) {
        self.combined_score = self.vision_visits as f64 * config.vision_weight
            + self.path_visits as f64 * config.path_weight;
        self.intensity = if config.max_threshold > 0.0 {
            (self.combined_score / config.max_threshold).min(1.0)
        } else {
            1.0
        };
    }
}

#[derive(Clone, Debug)]
pub struct Heatmap {
    config: HeatmapConfig,
    cells: SimpleGrid<SensorState>,
}

impl Heatmap {
    pub fn new(width: usize, height: usize, config: HeatmapConfig) -> Heatmap {
        Heatmap {
            config,
            cells: SimpleGrid::new(width, height, SensorState::default()),
        }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }
    /// Replaces the weights and recomputes every cell from its counters.
    pub fn set_config(&mut self, config: HeatmapConfig) {
        self.config = config;
        for y in 0..self.cells.height() {
            for x in 0..self.cells.width() {
                let mut state = self.cells.get(x, y);
                state.recompute(&self.config);
                self.cells.set(x, y, state);
            }
        }
    }

    fn contains(&self, p: &Point) -> bool {
        p.x >= 0
            && p.y >= 0
            && (p.x as usize) < self.cells.width()
            && (p.y as usize) < self.cells.height()
    }

    pub fn sensor(&self, p: &Point) -> Option<SensorState> {
        self.contains(p)
            .then(|| self.cells.get(p.x as usize, p.y as usize))
    }
    pub fn intensity(&self, p: &Point) -> f64 {
        self.sensor(p).map_or(0.0, |s| s.intensity)
    }

    fn bump(&mut self, p: &Point, vision: u32, path: u32) {
        if !self.config.enabled || !self.contains(p) {
            return;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        let mut state = self.cells.get(x, y);
        state.vision_visits += vision;
        state.path_visits += path;
        state.recompute(&self.config);
        self.cells.set(x, y, state);
    }

    /// Folds one cone sweep in. Walls are never credited.
    pub fn record_vision(&mut self, cast: &RayCast) {
        for (p, hits) in cast.hits.iter() {
            if !cast.blocked.contains(p) {
                self.bump(p, *hits, 0);
            }
        }
    }

    /// One walked step over `p`.
    pub fn record_step(&mut self, p: &Point) {
        self.bump(p, 0, 1);
    }

    /// Credits the final path bonus to every cell of a confirmed leg.
    pub fn record_final_path(&mut self, path: &[Point]) {
        let bonus = self.config.final_path_bonus;
        for p in path {
            self.bump(p, 0, bonus);
        }
    }

    /// Clears every counter, keeping the configuration.
    pub fn restart(&mut self) {
        debug!("Restarting heatmap tracking");
        self.cells = SimpleGrid::new(
            self.cells.width(),
            self.cells.height(),
            SensorState::default(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_blends_and_saturates() {
        let mut heatmap = Heatmap::new(4, 4, HeatmapConfig::default());
        let p = Point::new(1, 2);
        heatmap.record_step(&p);
        heatmap.record_final_path(&[p]);
        let state = heatmap.sensor(&p).unwrap();
        assert_eq!(state.path_visits, 4);
        assert!((state.combined_score - 0.6).abs() < 1e-9);
        assert!((state.intensity - 0.6 / 75.0).abs() < 1e-9);
        for _ in 0..1000 {
            heatmap.record_step(&p);
        }
        assert_eq!(heatmap.intensity(&p), 1.0);
    }

    #[test]
    fn vision_skips_blocking_walls() {
        let mut heatmap = Heatmap::new(4, 4, HeatmapConfig::default());
        let mut cast = RayCast::default();
        cast.hits.insert(Point::new(0, 0), 3);
        cast.hits.insert(Point::new(1, 0), 2);
        cast.blocked.insert(Point::new(1, 0));
        heatmap.record_vision(&cast);
        assert_eq!(heatmap.sensor(&Point::new(0, 0)).unwrap().vision_visits, 3);
        assert_eq!(heatmap.sensor(&Point::new(1, 0)).unwrap().vision_visits, 0);
    }

    #[test]
    fn disabled_heatmap_ignores_records() {
        let config = HeatmapConfig {
            enabled: false,
            ..HeatmapConfig::default()
        };
        let mut heatmap = Heatmap::new(3, 3, config);
        heatmap.record_step(&Point::new(1, 1));
        assert_eq!(heatmap.intensity(&Point::new(1, 1)), 0.0);
    }

    #[test]
    fn reweighting_and_restart() {
        let mut heatmap = Heatmap::new(3, 3, HeatmapConfig::default());
        let p = Point::new(2, 2);
        heatmap.record_step(&p);
        heatmap.set_config(HeatmapConfig {
            path_weight: 75.0,
            ..HeatmapConfig::default()
        });
        assert_eq!(heatmap.intensity(&p), 1.0);
        heatmap.restart();
        assert_eq!(heatmap.sensor(&p), Some(SensorState::default()));
        assert_eq!(heatmap.config().path_weight, 75.0);
    }
}
