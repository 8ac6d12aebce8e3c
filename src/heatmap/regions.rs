//! Connected same-level regions of a classified grid.

use serde::Serialize;

use super::palette::Level;
use super::pixels::{ClassifiedGrid, Point};

/// Regions smaller than a 4x4 cell footprint are noise.
pub const MIN_REGION_PIXELS: usize = 16;

/// A region reduced to its top-left-most pixel and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CellAnchor {
    pub point: Point,
    pub level: Level,
}

impl CellAnchor {
    pub fn new(x: u32, y: u32, level: Level) -> Self {
        Self {
            point: Point::new(x, y),
            level,
        }
    }
}

/// A maximal 4-connected set of pixels sharing one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub level: Level,
    /// Smallest `y`, then smallest `x` among the members.
    pub anchor: Point,
    /// Top-left and bottom-right corners, inclusive.
    pub bounds: (Point, Point),
    pub pixels: Vec<Point>,
}

impl Region {
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    pub fn cell(&self) -> CellAnchor {
        CellAnchor {
            point: self.anchor,
            level: self.level,
        }
    }
}

/// Flood-fills every non-background pixel of `grid` and returns the regions
/// with at least `min_pixels` members, in raster order of their first pixel.
pub fn extract_regions(grid: &ClassifiedGrid, min_pixels: usize) -> Vec<Region> {
    let width = grid.width() as usize;
    let height = grid.height() as usize;
    let cells = grid.cells();
    let mut visited = vec![false; cells.len()];
    let mut out = Vec::new();
    let mut dropped = 0usize;

    for start in 0..cells.len() {
        let Some(level) = cells[start] else {
            continue;
        };
        if visited[start] {
            continue;
        }

        let mut stack = vec![start];
        visited[start] = true;

        let mut pixels: Vec<Point> = Vec::new();
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0u32;
        let mut max_y = 0u32;

        while let Some(idx) = stack.pop() {
            let y = idx / width;
            let x = idx % width;
            let point = Point::new(x as u32, y as u32);
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
            pixels.push(point);

            for (dx, dy) in [(-1isize, 0isize), (1, 0), (0, -1), (0, 1)] {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx < 0 || ny < 0 {
                    continue;
                }
                let nxu = nx as usize;
                let nyu = ny as usize;
                if nxu >= width || nyu >= height {
                    continue;
                }
                let next_idx = nyu * width + nxu;
                if visited[next_idx] || cells[next_idx] != Some(level) {
                    continue;
                }
                visited[next_idx] = true;
                stack.push(next_idx);
            }
        }

        if pixels.len() < min_pixels {
            dropped += 1;
            continue;
        }

        // Raster-order seeding makes the seed the leftmost pixel of the top row.
        out.push(Region {
            level,
            anchor: Point::new((start % width) as u32, (start / width) as u32),
            bounds: (Point::new(min_x, min_y), Point::new(max_x, max_y)),
            pixels,
        });
    }

    log::debug!(
        "extracted {} regions ({} below {} pixels dropped)",
        out.len(),
        dropped,
        min_pixels
    );
    out
}

/// The anchor and level of every region.
pub fn anchors(regions: &[Region]) -> Vec<CellAnchor> {
    regions.iter().map(Region::cell).collect()
}
