//! Tolerance-based bucketing of anchors into week columns.

use serde::Serialize;

use super::regions::CellAnchor;

pub const COLUMN_TOLERANCE: u32 = 3;

/// A week column needs one anchor per day.
pub const MIN_COLUMN_CELLS: usize = 7;

/// Anchors sharing one x bucket, sorted top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnCluster {
    /// The x of the anchor that opened the bucket.
    pub x: u32,
    pub cells: Vec<CellAnchor>,
}

impl ColumnCluster {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn average_y(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.cells.iter().map(|c| c.point.y as f64).sum();
        sum / self.cells.len() as f64
    }
}

/// Groups anchors by x proximity without filtering.
///
/// Anchors are visited in ascending x; each joins the first bucket (in creation
/// order) whose key is within `tolerance`, or opens a new one. Buckets come
/// back in creation order, which is ascending key order.
pub fn bucket_by_x(anchors: &[CellAnchor], tolerance: u32) -> Vec<ColumnCluster> {
    let mut sorted = anchors.to_vec();
    sorted.sort_by_key(|a| (a.point.x, a.point.y));

    let mut buckets: Vec<ColumnCluster> = Vec::new();
    for anchor in sorted {
        let x = anchor.point.x;
        match buckets.iter_mut().find(|b| b.x.abs_diff(x) <= tolerance) {
            Some(bucket) => bucket.cells.push(anchor),
            None => buckets.push(ColumnCluster {
                x,
                cells: vec![anchor],
            }),
        }
    }

    for bucket in &mut buckets {
        bucket.cells.sort_by_key(|c| (c.point.y, c.point.x));
    }
    buckets
}

/// [`bucket_by_x`] followed by dropping buckets with fewer than `min_cells` anchors.
pub fn cluster_columns(anchors: &[CellAnchor], tolerance: u32, min_cells: usize) -> Vec<ColumnCluster> {
    let mut buckets = bucket_by_x(anchors, tolerance);
    let total = buckets.len();
    buckets.retain(|b| b.len() >= min_cells);
    log::debug!(
        "clustered {} anchors into {} buckets, {} kept as columns",
        anchors.len(),
        total,
        buckets.len()
    );
    buckets
}
