//! Recovers contribution calendars (year, week, weekday, level) from
//! screenshots of contribution heatmaps.

pub mod heatmap;
pub mod plot_grid;
pub mod synthetic;
