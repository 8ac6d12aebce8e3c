pub mod calendar;
pub mod columns;
pub mod config;
pub mod grids;
pub mod palette;
pub mod pixels;
pub mod reader;
pub mod regions;

pub use calendar::{Calendar, Weekday, WeekLevels};
pub use config::{ConfigError, ReaderConfig};
pub use palette::{ColorClassifier, Level, Palette, PaletteEntry, Theme};
pub use pixels::{ClassifiedGrid, PixelSource, Point};
pub use reader::{Detection, DetectionError, NoGridReason, detect_grids, read_calendar};
