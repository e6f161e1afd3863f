// Session configuration passed in at call time. Card geometry and detector thresholds
// live here and nowhere else; region construction derives only from these values.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::types::{ScreenPoint, ScreenRect};

/// Full analysis configuration passed from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub geometry: GridGeometry,
    #[serde(default)]
    pub fixation: FixationSettings,
}

impl AnalysisConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        self.fixation.validate()
    }
}

/// Layout of the card grid shown in phase one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    #[serde(default = "default_columns")]
    pub columns: u32,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default = "default_card_width")]
    pub card_width: f64,
    #[serde(default = "default_card_height")]
    pub card_height: f64,
    /// Gap between neighbouring cards and between the outer cards and the window edge.
    #[serde(default = "default_card_spacing")]
    pub card_spacing: f64,
    /// Game window size. Derived from the grid when absent.
    #[serde(default)]
    pub window_width: Option<f64>,
    #[serde(default)]
    pub window_height: Option<f64>,
    #[serde(default = "default_screen_width")]
    pub screen_width: f64,
    #[serde(default = "default_screen_height")]
    pub screen_height: f64,
}

/// Height of the "next" button strip under the grid.
const BUTTON_STRIP_HEIGHT: f64 = 75.0;

/// Upper bound on `columns * rows`. Keeps region counts and card numbers in range
/// of a 32-bit `usize`.
pub const MAX_CARDS: u64 = 10_000;

fn default_columns() -> u32 {
    7
}

fn default_rows() -> u32 {
    3
}

fn default_card_width() -> f64 {
    200.0
}

fn default_card_height() -> f64 {
    300.0
}

fn default_card_spacing() -> f64 {
    10.0
}

fn default_screen_width() -> f64 {
    1920.0
}

fn default_screen_height() -> f64 {
    1080.0
}

impl Default for GridGeometry {
    fn default() -> Self {
        GridGeometry {
            columns: default_columns(),
            rows: default_rows(),
            card_width: default_card_width(),
            card_height: default_card_height(),
            card_spacing: default_card_spacing(),
            window_width: None,
            window_height: None,
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
        }
    }
}

impl GridGeometry {
    pub fn region_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn window_width(&self) -> f64 {
        self.window_width.unwrap_or_else(|| {
            self.columns as f64 * (self.card_width + self.card_spacing) + self.card_spacing
        })
    }

    pub fn window_height(&self) -> f64 {
        self.window_height.unwrap_or_else(|| {
            self.rows as f64 * (self.card_height + self.card_spacing)
                + BUTTON_STRIP_HEIGHT
                + 2.0 * self.card_spacing
        })
    }

    /// Card rectangles in screen pixels, row-major. The window is centered on the screen.
    pub fn card_rects(&self) -> Vec<ScreenRect> {
        let origin_x = self.screen_width / 2.0 - self.window_width() / 2.0;
        let origin_y = self.screen_height / 2.0 - self.window_height() / 2.0;

        let mut rects = Vec::with_capacity(self.region_count());
        for row in 0..self.rows {
            for col in 0..self.columns {
                let x = origin_x
                    + (col + 1) as f64 * self.card_spacing
                    + col as f64 * self.card_width;
                let y = origin_y
                    + (row + 1) as f64 * self.card_spacing
                    + row as f64 * self.card_height;
                rects.push(ScreenRect::new(
                    ScreenPoint::new(x, y),
                    self.card_width,
                    self.card_height,
                ));
            }
        }
        rects
    }

    fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "grid must have at least one card, got {}x{}",
                self.columns, self.rows
            )));
        }
        let cards = u64::from(self.columns) * u64::from(self.rows);
        if cards > MAX_CARDS {
            return Err(AnalysisError::InvalidConfig(format!(
                "grid of {}x{} has {} cards, at most {} are supported",
                self.columns, self.rows, cards, MAX_CARDS
            )));
        }
        if !(self.card_width > 0.0 && self.card_height > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "card size must be positive, got {}x{}",
                self.card_width, self.card_height
            )));
        }
        if !(self.card_spacing >= 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "card spacing must be non-negative, got {}",
                self.card_spacing
            )));
        }
        Ok(())
    }
}

/// Which candidate windows must pass the minimum-duration check.
///
/// `AllWindows` filters every closed window. `TrailingWindowOnly` reproduces the
/// historical detector, which duration-checked only the window open at stream end
/// and accepted every earlier window once it held two samples. The two modes can
/// report very different fixation counts on the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DurationFilter {
    #[default]
    AllWindows,
    TrailingWindowOnly,
}

/// Dispersion-based fixation detector thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixationSettings {
    /// Maximum pairwise distance between members of one fixation (pixels, inclusive).
    #[serde(default = "default_dispersion_threshold")]
    pub dispersion_threshold_px: f64,
    /// Minimum span from first to last member (milliseconds, inclusive).
    #[serde(default = "default_min_duration")]
    pub min_duration_ms: u64,
    #[serde(default)]
    pub duration_filter: DurationFilter,
}

fn default_dispersion_threshold() -> f64 {
    25.0
}

fn default_min_duration() -> u64 {
    100
}

impl Default for FixationSettings {
    fn default() -> Self {
        FixationSettings {
            dispersion_threshold_px: default_dispersion_threshold(),
            min_duration_ms: default_min_duration(),
            duration_filter: DurationFilter::default(),
        }
    }
}

impl FixationSettings {
    fn validate(&self) -> Result<()> {
        if !(self.dispersion_threshold_px >= 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "dispersion threshold must be non-negative, got {}",
                self.dispersion_threshold_px
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_experiment_layout() {
        let geometry = GridGeometry::default();
        assert_eq!(geometry.region_count(), 21);
        assert_eq!(geometry.window_width(), 1480.0);
        assert_eq!(geometry.window_height(), 1025.0);
    }

    #[test]
    fn card_rects_are_row_major() {
        let geometry = GridGeometry {
            columns: 2,
            rows: 2,
            card_width: 100.0,
            card_height: 50.0,
            card_spacing: 10.0,
            window_width: Some(400.0),
            window_height: Some(200.0),
            screen_width: 1000.0,
            screen_height: 600.0,
        };
        let rects = geometry.card_rects();
        assert_eq!(rects.len(), 4);
        // Window origin is (300, 200).
        assert_eq!(rects[0].top_left, ScreenPoint::new(310.0, 210.0));
        assert_eq!(rects[1].top_left, ScreenPoint::new(420.0, 210.0));
        assert_eq!(rects[2].top_left, ScreenPoint::new(310.0, 270.0));
        assert_eq!(rects[3].width, 100.0);
        assert_eq!(rects[3].height, 50.0);
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config = AnalysisConfig::from_json("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.fixation.dispersion_threshold_px, 25.0);
        assert_eq!(config.fixation.min_duration_ms, 100);
        assert_eq!(config.fixation.duration_filter, DurationFilter::AllWindows);
    }

    #[test]
    fn partial_json_overrides() {
        let json = r#"{"geometry":{"columns":4,"rows":1},"fixation":{"duration_filter":"TrailingWindowOnly"}}"#;
        let config = AnalysisConfig::from_json(json).unwrap();
        assert_eq!(config.geometry.region_count(), 4);
        assert_eq!(config.geometry.card_width, 200.0);
        assert_eq!(
            config.fixation.duration_filter,
            DurationFilter::TrailingWindowOnly
        );
    }

    #[test]
    fn rejects_empty_grid() {
        let err = AnalysisConfig::from_json(r#"{"geometry":{"rows":0}}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_oversized_grid() {
        let err = AnalysisConfig::from_json(
            r#"{"geometry":{"columns":4294967295,"rows":4294967295}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));

        let mut config = AnalysisConfig::default();
        config.geometry.columns = 100;
        config.geometry.rows = 100;
        assert!(config.validate().is_ok());
        config.geometry.rows = 101;
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_negative_threshold() {
        let err = AnalysisConfig::from_json(r#"{"fixation":{"dispersion_threshold_px":-1.0}}"#)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }
}
