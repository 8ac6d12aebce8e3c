//! Tunable thresholds for the whole reader, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::calendar::{
    CalendarLayout, MAX_WEEKS, REVERSE_MAX_COLUMNS, REVERSE_MIN_AVERAGE_X, REVERSE_WEEK_OFFSET,
};
use super::columns::{COLUMN_TOLERANCE, MIN_COLUMN_CELLS};
use super::grids::GRID_GAP;
use super::palette::{
    ColorClassifier, MAX_CELL_DISTANCE, MAX_LEVEL, NEAR_WHITE_CHANNEL_MIN, NEAR_WHITE_DISTANCE,
    Palette, PaletteEntry, Theme,
};
use super::regions::MIN_REGION_PIXELS;

/// No calendar year has more weeks than this.
pub const MAX_WEEKS_LIMIT: u32 = 53;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("palette has no entries")]
    EmptyPalette,

    #[error("palette entry {rgb:?} has level {level}, above {MAX_LEVEL}")]
    LevelOutOfRange { rgb: [u8; 3], level: u8 },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every knob of the reader. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub theme: Theme,
    /// Replaces the theme calibration when set.
    pub palette: Option<Vec<PaletteEntry>>,
    pub min_region_pixels: usize,
    pub column_tolerance: u32,
    pub min_column_cells: usize,
    pub grid_gap: f64,
    pub reverse_max_columns: usize,
    pub reverse_min_average_x: f64,
    pub reverse_week_offset: u32,
    pub max_weeks: u32,
    pub near_white_distance: u32,
    pub near_white_channel_min: u8,
    pub max_cell_distance: Option<u32>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            palette: None,
            min_region_pixels: MIN_REGION_PIXELS,
            column_tolerance: COLUMN_TOLERANCE,
            min_column_cells: MIN_COLUMN_CELLS,
            grid_gap: GRID_GAP,
            reverse_max_columns: REVERSE_MAX_COLUMNS,
            reverse_min_average_x: REVERSE_MIN_AVERAGE_X,
            reverse_week_offset: REVERSE_WEEK_OFFSET,
            max_weeks: MAX_WEEKS,
            near_white_distance: NEAR_WHITE_DISTANCE,
            near_white_channel_min: NEAR_WHITE_CHANNEL_MIN,
            max_cell_distance: Some(MAX_CELL_DISTANCE),
        }
    }
}

impl ReaderConfig {
    pub fn for_theme(theme: Theme) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn palette(&self) -> Palette {
        match &self.palette {
            Some(entries) => Palette::new(entries.clone()),
            None => self.theme.palette(),
        }
    }

    pub fn classifier(&self) -> ColorClassifier {
        let mut classifier = ColorClassifier::new(self.palette());
        classifier.near_white_distance = self.near_white_distance;
        classifier.near_white_channel_min = self.near_white_channel_min;
        classifier.max_cell_distance = self.max_cell_distance;
        classifier
    }

    pub fn layout(&self) -> CalendarLayout {
        CalendarLayout {
            max_weeks: self.max_weeks,
            reverse_max_columns: self.reverse_max_columns,
            reverse_min_average_x: self.reverse_min_average_x,
            reverse_week_offset: self.reverse_week_offset,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let palette = self.palette();
        if palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if let Some(entry) = palette.entries().iter().find(|e| e.level > MAX_LEVEL) {
            return Err(ConfigError::LevelOutOfRange {
                rgb: entry.rgb,
                level: entry.level,
            });
        }
        if self.min_region_pixels == 0 {
            return Err(ConfigError::Invalid("min_region_pixels must be at least 1".into()));
        }
        if self.min_column_cells == 0 {
            return Err(ConfigError::Invalid("min_column_cells must be at least 1".into()));
        }
        if self.max_weeks == 0 || self.max_weeks > MAX_WEEKS_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_weeks must be within 1..={MAX_WEEKS_LIMIT}"
            )));
        }
        if self.reverse_week_offset == 0 || self.reverse_week_offset > self.max_weeks {
            return Err(ConfigError::Invalid(format!(
                "reverse_week_offset must be within 1..={}",
                self.max_weeks
            )));
        }
        if !self.grid_gap.is_finite() || self.grid_gap < 0.0 {
            return Err(ConfigError::Invalid("grid_gap must be a non-negative number".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ReaderConfig::default();
        config.validate().unwrap();
        assert_eq!(config.min_region_pixels, 16);
        assert_eq!(config.column_tolerance, 3);
        assert_eq!(config.grid_gap, 50.0);
        assert_eq!(config.reverse_week_offset, 44);
        assert_eq!(config.max_weeks, 52);
        assert_eq!(config.layout(), CalendarLayout::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ReaderConfig::from_json_str(r#"{"theme": "blue", "column_tolerance": 5}"#).unwrap();
        assert_eq!(config.theme, Theme::Blue);
        assert_eq!(config.column_tolerance, 5);
        assert_eq!(config.min_column_cells, 7);
        assert_eq!(config.palette(), Palette::blue());
    }

    #[test]
    fn custom_palette_overrides_theme() {
        let config = ReaderConfig::from_json_str(
            r#"{"palette": [{"rgb": [0, 0, 0], "level": 4}, {"rgb": [200, 200, 200], "level": 0}]}"#,
        )
        .unwrap();
        assert_eq!(config.palette().entries().len(), 2);
        assert_eq!(config.classifier().classify(10, 10, 10), 4);
    }

    #[test]
    fn rejects_bad_palettes() {
        assert!(matches!(
            ReaderConfig::from_json_str(r#"{"palette": []}"#),
            Err(ConfigError::EmptyPalette)
        ));
        assert!(matches!(
            ReaderConfig::from_json_str(r#"{"palette": [{"rgb": [1, 2, 3], "level": 5}]}"#),
            Err(ConfigError::LevelOutOfRange { level: 5, .. })
        ));
    }

    #[test]
    fn rejects_bad_thresholds() {
        for json in [
            r#"{"min_region_pixels": 0}"#,
            r#"{"min_column_cells": 0}"#,
            r#"{"max_weeks": 0}"#,
            r#"{"max_weeks": 54}"#,
            r#"{"max_weeks": 4294967295}"#,
            r#"{"reverse_week_offset": 60}"#,
            r#"{"grid_gap": -1.0}"#,
        ] {
            assert!(
                matches!(ReaderConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "{json} accepted"
            );
        }
    }

    #[test]
    fn week_limit_is_accepted() {
        let config = ReaderConfig::from_json_str(r#"{"max_weeks": 53}"#).unwrap();
        assert_eq!(config.layout().max_weeks, MAX_WEEKS_LIMIT);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(ReaderConfig::from_json_str("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reader.json");
        fs::write(&path, r#"{"grid_gap": 80.0}"#).unwrap();
        assert_eq!(ReaderConfig::from_json_file(&path).unwrap().grid_gap, 80.0);
        assert!(matches!(
            ReaderConfig::from_json_file(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
