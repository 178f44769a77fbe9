use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::duration::{TimeSpent, format_duration};
use crate::error::ValidationError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EntryId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorklogId(pub u64);

/// Wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self {
            minutes: hour * 60 + minute,
        })
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self { minutes })
    }

    pub fn on_the_hour(hour: u32) -> Option<Self> {
        Self::new(hour, 0)
    }

    pub fn hour(self) -> u32 {
        self.minutes / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes % 60
    }

    pub fn minutes_since_midnight(self) -> u32 {
        self.minutes
    }

    /// Adds minutes on the 24h dial; the result wraps past midnight.
    pub fn wrapping_add_minutes(self, minutes: u32) -> Self {
        Self {
            minutes: (self.minutes + minutes % MINUTES_PER_DAY) % MINUTES_PER_DAY,
        }
    }

    /// Adds minutes within the same day, `None` once the result reaches midnight.
    pub fn checked_add_minutes(self, minutes: u32) -> Option<Self> {
        self.minutes
            .checked_add(minutes)
            .and_then(Self::from_minutes)
    }

    /// Minutes from `self` forward to `later`, going round the dial if needed.
    pub fn minutes_until(self, later: ClockTime) -> u32 {
        (later.minutes + MINUTES_PER_DAY - self.minutes) % MINUTES_PER_DAY
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidClockTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour = hour.parse().map_err(|_| invalid())?;
        let minute = minute.parse().map_err(|_| invalid())?;
        ClockTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Grouping dimension for aggregate views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Assignee,
    Reporter,
    Project,
}

impl GroupKey {
    pub fn label(self) -> &'static str {
        match self {
            GroupKey::Assignee => "assignee",
            GroupKey::Reporter => "reporter",
            GroupKey::Project => "project",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub reporter: String,
    #[serde(default)]
    pub project: String,
}

impl Classification {
    pub fn value(&self, key: GroupKey) -> &str {
        match key {
            GroupKey::Assignee => &self.assignee,
            GroupKey::Reporter => &self.reporter,
            GroupKey::Project => &self.project,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worklog {
    pub id: WorklogId,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<ClockTime>,
    pub duration_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Worklog {
    /// One-line listing: date, start (or `--:--`), duration and comment.
    pub fn describe(&self) -> String {
        let start = self
            .start
            .map(|start| start.to_string())
            .unwrap_or_else(|| "--:--".to_string());
        let mut line = format!("{} {} {}", self.date, start, format_duration(self.duration_seconds));
        if let Some(comment) = self.comment.as_deref().filter(|comment| !comment.is_empty()) {
            line.push_str("  ");
            line.push_str(comment);
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub summary: String,
    #[serde(default)]
    pub classification: Classification,
    pub day: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
}

impl Entry {
    pub fn scheduled_minutes(&self) -> u32 {
        self.start.minutes_until(self.end)
    }

    pub fn logged_seconds(&self) -> u64 {
        self.worklogs.iter().map(|log| log.duration_seconds).sum()
    }

    /// Scheduled window plus logged time, the basis of the block height in a grid.
    pub fn display_minutes(&self) -> u64 {
        u64::from(self.scheduled_minutes()) + self.logged_seconds() / 60
    }

    /// Worklogs ordered by date.
    pub fn worklogs_by_date(&self) -> Vec<&Worklog> {
        let mut logs = self.worklogs.iter().collect::<Vec<_>>();
        logs.sort_by_key(|log| log.date);
        logs
    }

    pub fn worklog_on(&self, date: NaiveDate) -> Option<&Worklog> {
        self.worklogs.iter().find(|log| log.date == date)
    }

    pub fn short_summary(&self) -> &str {
        self.summary.lines().next().unwrap_or("(no summary)")
    }
}

/// Form bundle for `add` and `edit`; every required field is optional here so
/// that missing input is reported instead of unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub summary: Option<String>,
    pub day: Option<NaiveDate>,
    pub start: Option<ClockTime>,
    pub end: Option<ClockTime>,
    pub classification: Classification,
}

impl EntryFields {
    pub fn new(summary: impl Into<String>, day: NaiveDate, start: ClockTime, end: ClockTime) -> Self {
        Self {
            summary: Some(summary.into()),
            day: Some(day),
            start: Some(start),
            end: Some(end),
            classification: Classification::default(),
        }
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            summary: Some(entry.summary.clone()),
            day: Some(entry.day),
            start: Some(entry.start),
            end: Some(entry.end),
            classification: entry.classification.clone(),
        }
    }
}

/// Input for `append_or_replace_worklog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogDraft {
    pub date: NaiveDate,
    pub start: Option<ClockTime>,
    pub time_spent: TimeSpent,
    pub comment: Option<String>,
}

impl WorklogDraft {
    pub fn new(date: NaiveDate, time_spent: TimeSpent) -> Self {
        Self {
            date,
            start: None,
            time_spent,
            comment: None,
        }
    }

    pub fn with_start(mut self, start: Option<ClockTime>) -> Self {
        self.start = start;
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment.filter(|text| !text.trim().is_empty());
        self
    }
}

/// A slot-click proposal; nothing is stored until it is submitted through `add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub day: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl EntryDraft {
    pub fn crosses_midnight(&self) -> bool {
        self.end <= self.start
    }

    pub fn into_fields(self, summary: impl Into<String>) -> EntryFields {
        EntryFields::new(summary, self.day, self.start, self.end)
    }
}

fn default_true() -> bool {
    true
}

fn default_placement_minutes() -> u32 {
    30
}

fn default_slot_minutes() -> u32 {
    15
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub include_weekends: bool,
    #[serde(default = "default_placement_minutes")]
    pub placement_minutes: u32,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include_weekends: default_true(),
            placement_minutes: default_placement_minutes(),
            slot_minutes: default_slot_minutes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use chrono::NaiveDate;

    use super::{ClockTime, Settings, Worklog, WorklogId};
    use crate::error::ValidationError;

    fn at(hour: u32, minute: u32) -> ClockTime {
        ClockTime::new(hour, minute).unwrap()
    }

    #[rstest]
    #[case("00:00", 0, 0)]
    #[case("9:05", 9, 5)]
    #[case("23:59", 23, 59)]
    fn parses_clock_times(#[case] input: &str, #[case] hour: u32, #[case] minute: u32) {
        assert_eq!(input.parse::<ClockTime>(), Ok(at(hour, minute)));
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    #[case("12")]
    #[case("")]
    #[case("1:2")]
    #[case("+1:30")]
    #[case("ab:cd")]
    fn rejects_bad_clock_times(#[case] input: &str) {
        assert_eq!(
            input.parse::<ClockTime>(),
            Err(ValidationError::InvalidClockTime(input.to_string()))
        );
    }

    #[test]
    fn clock_arithmetic_wraps_or_stops_at_midnight() {
        assert_eq!(at(23, 45).wrapping_add_minutes(30), at(0, 15));
        assert_eq!(at(1, 40).wrapping_add_minutes(30), at(2, 10));
        assert_eq!(at(23, 0).checked_add_minutes(30), Some(at(23, 30)));
        assert_eq!(at(23, 30).checked_add_minutes(30), None);
        assert_eq!(at(23, 45).minutes_until(at(0, 15)), 30);
        assert_eq!(at(1, 0).minutes_until(at(2, 10)), 70);
        assert_eq!(at(1, 10).to_string(), "01:10");
    }

    #[test]
    fn worklog_description_lists_start_duration_and_comment() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let mut log = Worklog {
            id: WorklogId(1),
            date,
            start: Some(at(9, 0)),
            duration_seconds: 5400,
            comment: Some("deep work".to_string()),
        };
        assert_eq!(log.describe(), "2024-01-10 09:00 01:30:00  deep work");

        log.start = None;
        log.comment = None;
        assert_eq!(log.describe(), "2024-01-10 --:-- 01:30:00");
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: Settings = toml::from_str("include_weekends = false").unwrap();
        assert!(!settings.include_weekends);
        assert_eq!(settings.placement_minutes, 30);
        assert_eq!(settings.slot_minutes, 15);
    }
}
