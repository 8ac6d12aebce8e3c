use image::{Rgb, RgbImage};

use crate::heatmap::calendar::DAYS_PER_WEEK;
use crate::heatmap::palette::{Level, Palette};

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// A rendered contribution grid: one column per week, one row per weekday.
#[derive(Debug, Clone)]
pub struct SyntheticHeatmap {
    /// Top-left pixel of the first cell.
    pub origin: (u32, u32),
    pub cell_size: u32,
    pub gap: u32,
    pub palette: Palette,
    pub background: Rgb<u8>,
    pub weeks: Vec<[Level; DAYS_PER_WEEK]>,
}

impl SyntheticHeatmap {
    /// 10px cells with a 3px gap, green palette.
    pub fn new(origin: (u32, u32), weeks: Vec<[Level; DAYS_PER_WEEK]>) -> Self {
        Self {
            origin,
            cell_size: 10,
            gap: 3,
            palette: Palette::green(),
            background: BACKGROUND,
            weeks,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn pitch(&self) -> u32 {
        self.cell_size + self.gap
    }

    pub fn cell_origin(&self, week: usize, day: usize) -> (u32, u32) {
        (
            self.origin.0 + week as u32 * self.pitch(),
            self.origin.1 + day as u32 * self.pitch(),
        )
    }

    /// Exclusive bottom-right corner of the drawn cells.
    pub fn extent(&self) -> (u32, u32) {
        let weeks = self.weeks.len() as u32;
        let days = DAYS_PER_WEEK as u32;
        (
            self.origin.0 + (weeks * self.pitch()).saturating_sub(self.gap),
            self.origin.1 + days * self.pitch() - self.gap,
        )
    }

    pub fn draw(&self, canvas: &mut RgbImage) {
        let (cw, ch) = canvas.dimensions();
        for (week, levels) in self.weeks.iter().enumerate() {
            for (day, &level) in levels.iter().enumerate() {
                let color = Rgb(self.palette.color_for(level).unwrap_or([0, 0, 0]));
                let (x0, y0) = self.cell_origin(week, day);
                for y in y0..(y0 + self.cell_size).min(ch) {
                    for x in x0..(x0 + self.cell_size).min(cw) {
                        canvas.put_pixel(x, y, color);
                    }
                }
            }
        }
    }

    /// Renders on its own canvas, leaving the origin offset as margin on
    /// every side.
    pub fn render(&self) -> RgbImage {
        let (w, h) = self.extent();
        stack(std::slice::from_ref(self), w + self.origin.0, h + self.origin.1)
    }
}

/// Draws several heatmaps on one canvas filled with the first one's background.
pub fn stack(heatmaps: &[SyntheticHeatmap], width: u32, height: u32) -> RgbImage {
    let background = heatmaps.first().map_or(BACKGROUND, |h| h.background);
    let mut canvas = RgbImage::from_pixel(width, height, background);
    for heatmap in heatmaps {
        heatmap.draw(&mut canvas);
    }
    canvas
}

/// A deterministic level pattern covering every level.
pub fn pattern_weeks(count: usize, seed: usize) -> Vec<[Level; DAYS_PER_WEEK]> {
    (0..count)
        .map(|week| {
            let mut levels = [0; DAYS_PER_WEEK];
            for (day, level) in levels.iter_mut().enumerate() {
                *level = ((week * 3 + day * 5 + seed) % 5) as Level;
            }
            levels
        })
        .collect()
}

/// A full 52-week year above a 9-week trailing grid in the right half.
///
/// The trailing grid sits half a pitch off the year's columns so the two
/// never share an x bucket.
pub fn demo_heatmaps() -> Vec<SyntheticHeatmap> {
    vec![
        SyntheticHeatmap::new((30, 20), pattern_weeks(52, 0)),
        SyntheticHeatmap::new((426, 160), pattern_weeks(9, 2)),
    ]
}

pub const DEMO_SIZE: (u32, u32) = (740, 270);

/// Writes the demo heatmap to `path`.
pub fn write_demo_image(path: &str) -> Result<(), String> {
    let img = stack(&demo_heatmaps(), DEMO_SIZE.0, DEMO_SIZE.1);
    img.save(path).map_err(|e| format!("Failed to save image: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_drawn_with_palette_colors() {
        let heatmap = SyntheticHeatmap::new((2, 3), vec![[0, 1, 2, 3, 4, 0, 0]]);
        let img = heatmap.render();
        // 10px cell plus 2px margin either side; seven rows plus 3px margins.
        assert_eq!(img.dimensions(), (14, 94));
        assert_eq!(img.get_pixel(2, 3).0, [235, 237, 240]);
        assert_eq!(img.get_pixel(11, 16).0, [155, 233, 168]);
        assert_eq!(img.get_pixel(0, 0), &BACKGROUND);
        assert_eq!(img.get_pixel(13, 93), &BACKGROUND);
        // The gap row between Sunday and Monday stays white.
        assert_eq!(img.get_pixel(5, 14), &BACKGROUND);
    }

    #[test]
    fn background_is_configurable() {
        let mut heatmap = SyntheticHeatmap::new((4, 4), vec![[1; 7]]);
        heatmap.background = Rgb([250, 250, 245]);
        assert_eq!(heatmap.render().get_pixel(0, 0).0, [250, 250, 245]);
    }

    #[test]
    fn demo_grids_fit_the_canvas() {
        for heatmap in demo_heatmaps() {
            let (w, h) = heatmap.extent();
            assert!(w <= DEMO_SIZE.0 && h <= DEMO_SIZE.1);
        }
    }

    #[test]
    fn pattern_levels_stay_in_range() {
        assert!(pattern_weeks(52, 7).iter().flatten().all(|&l| l <= 4));
    }
}
