//! Color calibration and nearest-color level classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Contribution intensity, `0` (none) through [`MAX_LEVEL`].
pub type Level = u8;

pub const MAX_LEVEL: Level = 4;

pub const NEAR_WHITE_DISTANCE: u32 = 50;
pub const NEAR_WHITE_CHANNEL_MIN: u8 = 240;
/// Only consulted when deciding what may seed a cell region.
pub const MAX_CELL_DISTANCE: u32 = 2500;

/// The visual themes with a built-in calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Green,
    Blue,
}

impl Theme {
    pub fn palette(self) -> Palette {
        match self {
            Theme::Green => Palette::green(),
            Theme::Blue => Palette::blue(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Green => f.write_str("green"),
            Theme::Blue => f.write_str("blue"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "green" => Ok(Theme::Green),
            "blue" => Ok(Theme::Blue),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// One calibrated reference color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub rgb: [u8; 3],
    pub level: Level,
}

impl PaletteEntry {
    pub const fn new(rgb: [u8; 3], level: Level) -> Self {
        Self { rgb, level }
    }
}

/// An ordered set of reference colors. Earlier entries win distance ties, and a
/// level may be represented by several entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    pub fn green() -> Self {
        Self::new(vec![
            PaletteEntry::new([235, 237, 240], 0),
            PaletteEntry::new([155, 233, 168], 1),
            PaletteEntry::new([64, 196, 255], 1),
            PaletteEntry::new([48, 161, 78], 2),
            PaletteEntry::new([33, 110, 57], 3),
            PaletteEntry::new([24, 69, 59], 4),
        ])
    }

    pub fn blue() -> Self {
        Self::new(vec![
            PaletteEntry::new([238, 238, 238], 0),
            PaletteEntry::new([164, 210, 238], 1),
            PaletteEntry::new([103, 200, 255], 2),
            PaletteEntry::new([89, 150, 184], 3),
            PaletteEntry::new([0, 64, 134], 4),
        ])
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first reference color declared for `level`.
    pub fn color_for(&self, level: Level) -> Option<[u8; 3]> {
        self.entries.iter().find(|e| e.level == level).map(|e| e.rgb)
    }

    /// Nearest entry by squared Euclidean distance, with that distance.
    pub fn nearest(&self, rgb: [u8; 3]) -> Option<(PaletteEntry, u32)> {
        let mut best: Option<(PaletteEntry, u32)> = None;
        for &entry in &self.entries {
            let d = squared_distance(rgb, entry.rgb);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((entry, d)),
            }
        }
        best
    }
}

pub fn squared_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// Maps RGB samples onto palette levels.
#[derive(Debug, Clone)]
pub struct ColorClassifier {
    palette: Palette,
    /// Unmatched colors farther than this from every entry are eligible for the
    /// near-white override.
    pub near_white_distance: u32,
    /// Every channel must exceed this for a color to count as near-white.
    pub near_white_channel_min: u8,
    /// Colors farther than this from every entry never join a cell region.
    /// [`classify`](Self::classify) ignores it.
    pub max_cell_distance: Option<u32>,
}

impl ColorClassifier {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            near_white_distance: NEAR_WHITE_DISTANCE,
            near_white_channel_min: NEAR_WHITE_CHANNEL_MIN,
            max_cell_distance: Some(MAX_CELL_DISTANCE),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Level of the nearest palette entry, however far. Unmatched near-white
    /// reads as level 0, as does anything under an empty palette.
    pub fn classify(&self, r: u8, g: u8, b: u8) -> Level {
        let rgb = [r, g, b];
        match self.palette.nearest(rgb) {
            Some((entry, distance)) if !self.is_background(rgb, distance) => entry.level,
            _ => 0,
        }
    }

    /// Like [`classify`](Self::classify), but keeps page background and colors
    /// beyond `max_cell_distance` apart from level 0 so they never join a
    /// cell region.
    pub fn classify_pixel(&self, rgb: [u8; 3]) -> Option<Level> {
        let (entry, distance) = self.palette.nearest(rgb)?;
        if self.is_background(rgb, distance) {
            return None;
        }
        if self.max_cell_distance.is_some_and(|max| distance > max) {
            return None;
        }
        Some(entry.level)
    }

    fn is_background(&self, rgb: [u8; 3], distance: u32) -> bool {
        distance > self.near_white_distance && rgb.iter().all(|&c| c > self.near_white_channel_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_reference_colors_map_to_their_level() {
        for palette in [Palette::green(), Palette::blue()] {
            let classifier = ColorClassifier::new(palette.clone());
            for entry in palette.entries() {
                let [r, g, b] = entry.rgb;
                assert_eq!(classifier.classify(r, g, b), entry.level);
            }
        }
    }

    #[test]
    fn nearby_colors_snap_to_nearest_level() {
        let classifier = ColorClassifier::new(Palette::blue());
        assert_eq!(classifier.classify(0, 45, 125), 4);
        assert_eq!(classifier.classify(92, 151, 185), 3);
        assert_eq!(classifier.classify(157, 207, 237), 1);
    }

    #[test]
    fn ties_go_to_first_declared_entry() {
        let palette = Palette::new(vec![
            PaletteEntry::new([10, 0, 0], 3),
            PaletteEntry::new([0, 10, 0], 1),
        ]);
        let classifier = ColorClassifier::new(palette);
        assert_eq!(classifier.classify(5, 5, 0), 3);
    }

    #[test]
    fn unmatched_near_white_is_background() {
        let classifier = ColorClassifier::new(Palette::green());
        assert_eq!(classifier.classify_pixel([255, 255, 255]), None);
        assert_eq!(classifier.classify(255, 255, 255), 0);
    }

    #[test]
    fn near_white_close_to_an_entry_keeps_its_level() {
        let palette = Palette::new(vec![
            PaletteEntry::new([250, 250, 250], 2),
            PaletteEntry::new([0, 0, 0], 4),
        ]);
        let classifier = ColorClassifier::new(palette);
        assert_eq!(classifier.classify_pixel([252, 251, 250]), Some(2));
    }

    #[test]
    fn far_colors_are_not_cells() {
        let mut classifier = ColorClassifier::new(Palette::green());
        assert_eq!(classifier.classify_pixel([200, 0, 200]), None);
        classifier.max_cell_distance = None;
        assert_eq!(classifier.classify_pixel([200, 0, 200]), Some(4));
    }

    #[test]
    fn far_saturated_colors_still_classify_to_nearest_level() {
        // Nearest is [24, 69, 59], far past the cell cutoff.
        let classifier = ColorClassifier::new(Palette::green());
        assert!(classifier.max_cell_distance.is_some());
        assert_eq!(classifier.classify(200, 0, 200), 4);
        let (nearest, _) = classifier.palette().nearest([255, 0, 0]).unwrap();
        assert_eq!(classifier.classify(255, 0, 0), nearest.level);
    }

    #[test]
    fn empty_palette_classifies_everything_as_background() {
        let classifier = ColorClassifier::new(Palette::new(Vec::new()));
        assert_eq!(classifier.classify_pixel([1, 2, 3]), None);
        assert_eq!(classifier.classify(1, 2, 3), 0);
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!("Blue".parse::<Theme>(), Ok(Theme::Blue));
        assert!("purple".parse::<Theme>().is_err());
        assert_eq!(Theme::Green.to_string(), "green");
    }

    #[test]
    fn color_for_returns_first_entry_of_level() {
        assert_eq!(Palette::green().color_for(1), Some([155, 233, 168]));
        assert_eq!(Palette::green().color_for(7), None);
    }
}
