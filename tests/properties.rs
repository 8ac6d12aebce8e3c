use std::collections::BTreeSet;

use proptest::collection::vec;
use proptest::prelude::*;

use contrib_heatmap_reader::heatmap::calendar::{CalendarLayout, MAX_WEEKS, map_calendar};
use contrib_heatmap_reader::heatmap::columns::{ColumnCluster, bucket_by_x};
use contrib_heatmap_reader::heatmap::grids::{GRID_GAP, GridGroup, split_grids};
use contrib_heatmap_reader::heatmap::regions::{CellAnchor, anchors, extract_regions};
use contrib_heatmap_reader::heatmap::{ClassifiedGrid, ColorClassifier, Level, Theme};

fn cell_strategy() -> impl Strategy<Value = Option<Level>> {
    // Few levels so neighbouring pixels often connect.
    prop_oneof![Just(None), (0u8..=1).prop_map(Some)]
}

fn grid_strategy() -> impl Strategy<Value = ClassifiedGrid> {
    (1u32..24, 1u32..24).prop_flat_map(|(w, h)| {
        vec(cell_strategy(), (w * h) as usize).prop_map(move |cells| {
            ClassifiedGrid::from_cells(w, h, cells).expect("cell count matches")
        })
    })
}

fn column_at(x: u32, y: u32, levels: &[Level]) -> ColumnCluster {
    ColumnCluster {
        x,
        cells: levels.iter().map(|&l| CellAnchor::new(x, y, l)).collect(),
    }
}

proptest! {
    #[test]
    fn palette_colors_classify_to_their_level(blue in any::<bool>(), idx in 0usize..8) {
        let theme = if blue { Theme::Blue } else { Theme::Green };
        let classifier = ColorClassifier::new(theme.palette());
        let entries = classifier.palette().entries().to_vec();
        let entry = entries[idx % entries.len()];
        let [r, g, b] = entry.rgb;
        prop_assert_eq!(classifier.classify(r, g, b), entry.level);
    }

    #[test]
    fn anchors_lie_inside_the_grid(grid in grid_strategy(), min in 1usize..6) {
        for anchor in anchors(&extract_regions(&grid, min)) {
            prop_assert!(anchor.point.x < grid.width());
            prop_assert!(anchor.point.y < grid.height());
        }
    }

    #[test]
    fn extraction_is_idempotent(grid in grid_strategy(), min in 1usize..6) {
        let first = anchors(&extract_regions(&grid, min));
        let second = anchors(&extract_regions(&grid, min));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn regions_never_cross_levels(grid in grid_strategy()) {
        for region in extract_regions(&grid, 1) {
            for p in &region.pixels {
                prop_assert_eq!(grid.level_at(p.x, p.y), Some(region.level));
            }
            let top_left = region.pixels.iter().min().copied();
            prop_assert_eq!(top_left, Some(region.anchor));
        }
    }

    #[test]
    fn zero_tolerance_buckets_each_distinct_x(xs in vec((0u32..40, 0u32..40), 0..60)) {
        let anchors: Vec<CellAnchor> = xs.iter().map(|&(x, y)| CellAnchor::new(x, y, 1)).collect();
        let distinct: BTreeSet<u32> = xs.iter().map(|&(x, _)| x).collect();
        prop_assert_eq!(bucket_by_x(&anchors, 0).len(), distinct.len());
    }

    #[test]
    fn small_steps_stay_one_group(steps in vec(0u32..=50, 1..40)) {
        let mut y = 0;
        let mut columns = Vec::new();
        for (i, step) in steps.iter().enumerate() {
            y += step;
            columns.push(column_at(i as u32 * 13, y, &[1; 7]));
        }
        prop_assert_eq!(split_grids(columns, GRID_GAP).len(), 1);
    }

    #[test]
    fn calendar_weeks_stay_in_range(
        counts in vec(1u32..70, 1..4),
        first_x in 0u32..900,
        extra_days in 0usize..4,
        level in 0u8..=4,
    ) {
        let days = vec![level; 7 + extra_days];
        let groups: Vec<GridGroup> = counts
            .iter()
            .enumerate()
            .map(|(g, &count)| GridGroup {
                columns: (0..count)
                    .map(|i| column_at(first_x + i * 13, g as u32 * 200, &days))
                    .collect(),
            })
            .collect();
        let years: Vec<i32> = (0..groups.len() as i32).map(|i| 2020 + i).collect();
        let cal = map_calendar(&groups, &years, (5000, 5000), &CalendarLayout::default());

        for year in cal.years() {
            prop_assert!(cal.weeks(year).map_or(0, |w| w.len()) <= MAX_WEEKS as usize);
        }
        for (_, week, levels) in cal.iter() {
            prop_assert!((1..=MAX_WEEKS).contains(&week));
            prop_assert!(levels.to_array().iter().all(|&l| l == level));
        }
    }
}
