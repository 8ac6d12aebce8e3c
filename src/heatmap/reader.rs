//! Reads contribution calendars out of a heatmap screenshot.

use std::fmt;

use super::calendar::{Calendar, map_calendar};
use super::columns::{ColumnCluster, cluster_columns};
use super::config::{ConfigError, ReaderConfig};
use super::grids::{GridGroup, split_grids};
use super::pixels::{ClassifiedGrid, PixelSource};
use super::regions::{CellAnchor, Region, anchors, extract_regions};

/// Why no calendar grid could be located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoGridReason {
    /// No pixel blob of cell size matched the palette; usually the wrong theme.
    NoRegions,
    /// Cells were found but did not line up into week columns and grids.
    NoGridGroups { regions: usize, columns: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no grid detected: {0}")]
    NoGridDetected(NoGridReason),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl fmt::Display for NoGridReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoGridReason::NoRegions => f.write_str("no cell-sized regions matched the palette"),
            NoGridReason::NoGridGroups { regions, columns } => {
                write!(f, "{regions} regions formed {columns} week columns and no grid")
            }
        }
    }
}

/// Every intermediate product of one detection run.
#[derive(Debug, Clone)]
pub struct Detection {
    pub width: u32,
    pub height: u32,
    pub regions: Vec<Region>,
    pub anchors: Vec<CellAnchor>,
    /// Kept columns in ascending x order.
    pub columns: Vec<ColumnCluster>,
    pub groups: Vec<GridGroup>,
}

impl Detection {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            regions: Vec::new(),
            anchors: Vec::new(),
            columns: Vec::new(),
            groups: Vec::new(),
        }
    }
}

/// Runs classification, region extraction, column clustering and grid
/// splitting.
///
/// An empty source yields an empty detection. A non-empty source with no
/// regions, or with no grid groups, is [`DetectionError::NoGridDetected`].
pub fn detect_grids<S: PixelSource + ?Sized>(
    source: &S,
    config: &ReaderConfig,
) -> Result<Detection, DetectionError> {
    config.validate()?;
    let (width, height) = (source.width(), source.height());
    if width == 0 || height == 0 {
        return Ok(Detection::empty(width, height));
    }

    let grid = ClassifiedGrid::classify(source, &config.classifier());
    log::debug!(
        "classified {}x{} pixels, {} background",
        width,
        height,
        grid.background_count()
    );
    detect_grids_in(&grid, config)
}

/// [`detect_grids`] on an already classified raster.
pub fn detect_grids_in(grid: &ClassifiedGrid, config: &ReaderConfig) -> Result<Detection, DetectionError> {
    let (width, height) = (grid.width(), grid.height());
    if grid.is_empty() {
        return Ok(Detection::empty(width, height));
    }

    let regions = extract_regions(grid, config.min_region_pixels);
    if regions.is_empty() {
        return Err(DetectionError::NoGridDetected(NoGridReason::NoRegions));
    }

    let anchors = anchors(&regions);
    let columns = cluster_columns(&anchors, config.column_tolerance, config.min_column_cells);
    let groups = split_grids(columns.clone(), config.grid_gap);
    if groups.is_empty() {
        return Err(DetectionError::NoGridDetected(NoGridReason::NoGridGroups {
            regions: regions.len(),
            columns: columns.len(),
        }));
    }

    Ok(Detection {
        width,
        height,
        regions,
        anchors,
        columns,
        groups,
    })
}

/// Maps an existing detection onto `years`.
pub fn calendar_from_detection(detection: &Detection, years: &[i32], config: &ReaderConfig) -> Calendar {
    map_calendar(
        &detection.groups,
        years,
        (detection.width, detection.height),
        &config.layout(),
    )
}

/// The full pipeline: pixels in, `year -> week -> weekday -> level` out.
pub fn read_calendar<S: PixelSource + ?Sized>(
    source: &S,
    years: &[i32],
    config: &ReaderConfig,
) -> Result<Calendar, DetectionError> {
    let detection = detect_grids(source, config)?;
    Ok(calendar_from_detection(&detection, years, config))
}
