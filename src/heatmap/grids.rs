//! Splitting week columns into separate calendar instances.

use serde::Serialize;

use super::columns::ColumnCluster;
use super::pixels::Point;

pub const GRID_GAP: f64 = 50.0;

/// Columns that belong to one calendar, in ascending average-y order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridGroup {
    pub columns: Vec<ColumnCluster>,
}

impl GridGroup {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn average_y(&self) -> f64 {
        if self.columns.is_empty() {
            return 0.0;
        }
        self.columns.iter().map(ColumnCluster::average_y).sum::<f64>() / self.columns.len() as f64
    }

    /// Mean of the column keys.
    pub fn average_x(&self) -> f64 {
        if self.columns.is_empty() {
            return 0.0;
        }
        self.columns.iter().map(|c| c.x as f64).sum::<f64>() / self.columns.len() as f64
    }

    /// Inclusive bounding box of every anchor in the group.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.columns.iter().flat_map(|c| c.cells.iter().map(|a| a.point));
        let first = points.next()?;
        let (mut min, mut max) = (first, first);
        for p in points {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some((min, max))
    }
}

/// Orders columns by average y and cuts wherever neighbouring averages differ
/// by more than `gap`. Groups come back in ascending average-y order.
pub fn split_grids(columns: Vec<ColumnCluster>, gap: f64) -> Vec<GridGroup> {
    let mut keyed: Vec<(f64, ColumnCluster)> =
        columns.into_iter().map(|c| (c.average_y(), c)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.x.cmp(&b.1.x)));

    let mut groups = Vec::new();
    let mut current: Vec<ColumnCluster> = Vec::new();
    let mut last_y: Option<f64> = None;

    for (avg_y, column) in keyed {
        if let Some(prev) = last_y
            && (avg_y - prev).abs() > gap
            && !current.is_empty()
        {
            groups.push(GridGroup {
                columns: std::mem::take(&mut current),
            });
        }
        current.push(column);
        last_y = Some(avg_y);
    }
    if !current.is_empty() {
        groups.push(GridGroup { columns: current });
    }

    log::debug!("split columns into {} grid groups", groups.len());
    groups
}
