//! Mapping grid groups onto year / week / weekday levels.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::grids::GridGroup;
use super::palette::Level;

pub const DAYS_PER_WEEK: usize = 7;
pub const MAX_WEEKS: u32 = 52;
pub const REVERSE_WEEK_OFFSET: u32 = 44;
pub const REVERSE_MAX_COLUMNS: usize = 10;
pub const REVERSE_MIN_AVERAGE_X: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; DAYS_PER_WEEK] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Short key used in serialized output.
    pub fn label(self) -> &'static str {
        match self {
            Weekday::Sunday => "su",
            Weekday::Monday => "m",
            Weekday::Tuesday => "t",
            Weekday::Wednesday => "w",
            Weekday::Thursday => "th",
            Weekday::Friday => "f",
            Weekday::Saturday => "s",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The seven day levels of one week. Serializes as `{"su": .., "m": .., ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekLevels {
    pub su: Level,
    pub m: Level,
    pub t: Level,
    pub w: Level,
    pub th: Level,
    pub f: Level,
    pub s: Level,
}

impl WeekLevels {
    pub fn get(&self, day: Weekday) -> Level {
        match day {
            Weekday::Sunday => self.su,
            Weekday::Monday => self.m,
            Weekday::Tuesday => self.t,
            Weekday::Wednesday => self.w,
            Weekday::Thursday => self.th,
            Weekday::Friday => self.f,
            Weekday::Saturday => self.s,
        }
    }

    pub fn set(&mut self, day: Weekday, level: Level) {
        let slot = match day {
            Weekday::Sunday => &mut self.su,
            Weekday::Monday => &mut self.m,
            Weekday::Tuesday => &mut self.t,
            Weekday::Wednesday => &mut self.w,
            Weekday::Thursday => &mut self.th,
            Weekday::Friday => &mut self.f,
            Weekday::Saturday => &mut self.s,
        };
        *slot = level;
    }

    pub fn to_array(&self) -> [Level; DAYS_PER_WEEK] {
        Weekday::ALL.map(|d| self.get(d))
    }
}

impl From<[Level; DAYS_PER_WEEK]> for WeekLevels {
    fn from(levels: [Level; DAYS_PER_WEEK]) -> Self {
        let [su, m, t, w, th, f, s] = levels;
        Self { su, m, t, w, th, f, s }
    }
}

/// `year -> week -> weekday levels`, keyed in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Calendar {
    years: BTreeMap<i32, BTreeMap<u32, WeekLevels>>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn weeks(&self, year: i32) -> Option<&BTreeMap<u32, WeekLevels>> {
        self.years.get(&year)
    }

    pub fn week(&self, year: i32, week: u32) -> Option<&WeekLevels> {
        self.years.get(&year)?.get(&week)
    }

    pub fn level(&self, year: i32, week: u32, day: Weekday) -> Option<Level> {
        self.week(year, week).map(|w| w.get(day))
    }

    pub fn insert_week(&mut self, year: i32, week: u32, levels: WeekLevels) {
        self.years.entry(year).or_default().insert(week, levels);
    }

    fn ensure_year(&mut self, year: i32) {
        self.years.entry(year).or_default();
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, u32, &WeekLevels)> + '_ {
        self.years
            .iter()
            .flat_map(|(&year, weeks)| weeks.iter().map(move |(&week, levels)| (year, week, levels)))
    }
}

/// Thresholds steering week numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarLayout {
    pub max_weeks: u32,
    pub reverse_max_columns: usize,
    pub reverse_min_average_x: f64,
    pub reverse_week_offset: u32,
}

impl Default for CalendarLayout {
    fn default() -> Self {
        Self {
            max_weeks: MAX_WEEKS,
            reverse_max_columns: REVERSE_MAX_COLUMNS,
            reverse_min_average_x: REVERSE_MIN_AVERAGE_X,
            reverse_week_offset: REVERSE_WEEK_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingMode {
    /// Weeks `1..`, left to right.
    Forward,
    /// A short trailing grid holding the last weeks of a year.
    Reverse { start_week: u32 },
}

impl NumberingMode {
    pub fn start_week(self) -> u32 {
        match self {
            NumberingMode::Forward => 1,
            NumberingMode::Reverse { start_week } => start_week,
        }
    }
}

/// A short group sitting in the right part of the image gets reverse numbering.
pub fn numbering_mode(group: &GridGroup, layout: &CalendarLayout) -> NumberingMode {
    let count = group.len().min(layout.max_weeks as usize);
    if count == 0 {
        return NumberingMode::Forward;
    }
    let mut xs: Vec<u32> = group.columns.iter().map(|c| c.x).collect();
    xs.sort_unstable();
    xs.truncate(count);
    let average_x = xs.iter().map(|&x| x as f64).sum::<f64>() / count as f64;

    if count <= layout.reverse_max_columns && average_x > layout.reverse_min_average_x {
        NumberingMode::Reverse {
            start_week: layout.reverse_week_offset,
        }
    } else {
        NumberingMode::Forward
    }
}

/// Pairs groups with `years` positionally and numbers their columns as weeks
/// and their anchors as weekdays.
///
/// Groups beyond `years.len()` are ignored. Anchors outside `image_size` and
/// missing days read as level 0.
pub fn map_calendar(
    groups: &[GridGroup],
    years: &[i32],
    image_size: (u32, u32),
    layout: &CalendarLayout,
) -> Calendar {
    let (width, height) = image_size;
    let mut calendar = Calendar::new();

    if groups.len() > years.len() {
        log::warn!(
            "{} grid groups found but only {} target years given; extra groups ignored",
            groups.len(),
            years.len()
        );
    } else if groups.len() < years.len() {
        log::warn!(
            "only {} grid groups found for {} target years; unmatched years omitted",
            groups.len(),
            years.len()
        );
    }

    for (group, &year) in groups.iter().zip(years) {
        let mode = numbering_mode(group, layout);
        let start_week = mode.start_week();
        let week_budget = layout.max_weeks.saturating_add(1).saturating_sub(start_week) as usize;

        let mut columns: Vec<_> = group.columns.iter().collect();
        columns.sort_by_key(|c| c.x);
        columns.truncate((layout.max_weeks as usize).min(week_budget));

        log::info!(
            "year {year}: {} columns, {:?} numbering from week {start_week}",
            columns.len(),
            mode
        );

        calendar.ensure_year(year);
        for (offset, column) in columns.into_iter().enumerate() {
            let mut levels = WeekLevels::default();
            for (day, cell) in Weekday::ALL.iter().zip(column.cells.iter()) {
                if cell.point.x >= width || cell.point.y >= height {
                    log::debug!("anchor {:?} lies outside the image; reading level 0", cell.point);
                    continue;
                }
                levels.set(*day, cell.level);
            }
            calendar.insert_week(year, start_week + offset as u32, levels);
        }
    }

    calendar
}

pub fn write_calendar_json_string(calendar: &Calendar) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(calendar)
}
