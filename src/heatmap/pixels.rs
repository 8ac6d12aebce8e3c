//! Pixel access and the classified raster the region stage floods over.

use image::{DynamicImage, GenericImageView, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use super::palette::{ColorClassifier, Level};

/// A pixel coordinate. Ordering is raster order: by `y`, then by `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub y: u32,
    pub x: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Read-only access to a decoded RGB raster.
///
/// Callers only ever ask for `0 <= x < width()` and `0 <= y < height()`.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn pixel(&self, x: u32, y: u32) -> [u8; 3];
}

impl PixelSource for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.get_pixel(x, y).0
    }
}

impl PixelSource for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, _] = self.get_pixel(x, y).0;
        [r, g, b]
    }
}

impl PixelSource for DynamicImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, _] = self.get_pixel(x, y).0;
        [r, g, b]
    }
}

/// Every pixel of a source mapped to its intensity level, or `None` for
/// pixels that are not part of any calendar cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedGrid {
    width: u32,
    height: u32,
    cells: Vec<Option<Level>>,
}

impl ClassifiedGrid {
    /// Builds a grid from row-major cells. Returns `None` when the cell count
    /// does not match `width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Option<Level>>) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?;
        if cells.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// A grid where every pixel is background.
    pub fn background(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub fn classify<S: PixelSource + ?Sized>(source: &S, classifier: &ColorClassifier) -> Self {
        let (width, height) = (source.width(), source.height());
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(classifier.classify_pixel(source.pixel(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Option<Level>] {
        &self.cells
    }

    /// Level at a coordinate; out-of-bounds coordinates read as background.
    pub fn level_at(&self, x: u32, y: u32) -> Option<Level> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[self.index(x, y)]
    }

    /// Overwrites a single pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, level: Option<Level>) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.cells[idx] = level;
        }
    }

    /// Fills the axis-aligned rectangle `[x, x + w) x [y, y + h)`, clipped to the grid.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, level: Option<Level>) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                let idx = self.index(px, py);
                self.cells[idx] = level;
            }
        }
    }

    pub fn background_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
