use std::collections::HashMap;

use chrono::NaiveDate;

use crate::calendar::{date_range, month_bounds};
use crate::domain::{Entry, EntryId, GroupKey};
use crate::duration::seconds_to_hours;
use crate::error::RangeError;

pub const ALL_TASKS: &str = "All Tasks";
pub const KEY_SEPARATOR: &str = " · ";

pub fn total_seconds(entry: &Entry) -> u64 {
    entry.logged_seconds()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub key: String,
    pub entries: Vec<&'a Entry>,
}

/// Partitions entries by the classification values named in `keys`.
///
/// Groups come out in the order their key is first seen and keep the input
/// order inside each group. No keys means one `"All Tasks"` group.
pub fn group_by<'a, I>(entries: I, keys: &[GroupKey]) -> Vec<Group<'a>>
where
    I: IntoIterator<Item = &'a Entry>,
{
    if keys.is_empty() {
        return vec![Group {
            key: ALL_TASKS.to_string(),
            entries: entries.into_iter().collect(),
        }];
    }

    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        let key = keys
            .iter()
            .map(|key| entry.classification.value(*key))
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR);
        match positions.get(&key) {
            Some(&index) => groups[index].entries.push(entry),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    entries: vec![entry],
                });
            }
        }
    }
    groups
}

/// Logged hours across every worklog of every entry.
pub fn group_total<'a, I>(entries: I) -> f64
where
    I: IntoIterator<Item = &'a Entry>,
{
    seconds_to_hours(entries.into_iter().map(total_seconds).sum())
}

pub fn daily_seconds<'a, I>(entries: I, date: NaiveDate) -> u64
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries
        .into_iter()
        .filter_map(|entry| entry.worklog_on(date))
        .map(|log| log.duration_seconds)
        .sum()
}

/// Logged hours on `date`; each entry holds at most one worklog per date.
pub fn daily_total<'a, I>(entries: I, date: NaiveDate) -> f64
where
    I: IntoIterator<Item = &'a Entry>,
{
    seconds_to_hours(daily_seconds(entries, date))
}

/// Default report window: the month containing `today`.
pub fn date_range_defaults(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    month_bounds(today)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimesheetRow {
    pub entry_id: EntryId,
    pub summary: String,
    pub daily_hours: Vec<f64>,
    pub total_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimesheetGroup {
    pub key: String,
    pub rows: Vec<TimesheetRow>,
    pub daily_hours: Vec<f64>,
    pub total_hours: f64,
}

/// Hours per entry and per day over a date range, sectioned by group.
///
/// Row and group totals count every worklog of the entry, not only the ones
/// inside the range, so they match `group_total`.
#[derive(Debug, Clone, PartialEq)]
pub struct Timesheet {
    pub dates: Vec<NaiveDate>,
    pub groups: Vec<TimesheetGroup>,
    pub daily_hours: Vec<f64>,
    pub total_hours: f64,
}

impl Timesheet {
    pub fn build(
        entries: &[Entry],
        start: NaiveDate,
        end: NaiveDate,
        include_weekends: bool,
        keys: &[GroupKey],
    ) -> Result<Self, RangeError> {
        let dates = date_range(start, end, include_weekends)?;

        let groups = group_by(entries, keys)
            .into_iter()
            .map(|group| TimesheetGroup {
                rows: group
                    .entries
                    .iter()
                    .map(|entry| TimesheetRow {
                        entry_id: entry.id,
                        summary: entry.short_summary().to_string(),
                        daily_hours: dates
                            .iter()
                            .map(|date| daily_total([*entry], *date))
                            .collect(),
                        total_hours: group_total([*entry]),
                    })
                    .collect(),
                daily_hours: dates
                    .iter()
                    .map(|date| daily_total(group.entries.iter().copied(), *date))
                    .collect(),
                total_hours: group_total(group.entries.iter().copied()),
                key: group.key,
            })
            .collect::<Vec<_>>();

        let daily_hours = dates.iter().map(|date| daily_total(entries, *date)).collect();
        let total_hours = group_total(entries);

        Ok(Self {
            dates,
            groups,
            daily_hours,
            total_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    use super::{
        ALL_TASKS, Timesheet, date_range_defaults, daily_total, group_by, group_total, total_seconds,
    };
    use crate::domain::{Classification, ClockTime, Entry, EntryFields, EntryId, GroupKey};
    use crate::error::RangeError;
    use crate::store::EntryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn classification(assignee: &str, reporter: &str, project: &str) -> Classification {
        Classification {
            assignee: assignee.to_string(),
            reporter: reporter.to_string(),
            project: project.to_string(),
        }
    }

    /// Four tasks with worklogs on the 8th, 9th and 13th of January 2024.
    #[fixture]
    fn store() -> EntryStore {
        let mut store = EntryStore::new();
        let people = [
            ("Task 1", classification("Imane", "Hind", "Project B")),
            ("Task 2", classification("Malika", "Dana", "Project A")),
            ("Task 3", classification("Imane", "Dana", "Project B")),
            ("Task 4", classification("Malika", "Hind", "Project B")),
        ];
        for (hour, (summary, classification)) in people.into_iter().enumerate() {
            let start = ClockTime::on_the_hour(hour as u32 + 1).unwrap();
            let end = start.checked_add_minutes(30).unwrap();
            store
                .add(EntryFields::new(summary, day(8), start, end).with_classification(classification))
                .unwrap();
        }

        store.log_time(EntryId(1), day(8), "1h 30m", None, None).unwrap();
        store.log_time(EntryId(1), day(9), "30m", None, None).unwrap();
        store.log_time(EntryId(2), day(8), "2h", None, None).unwrap();
        store.log_time(EntryId(3), day(13), "15m", None, None).unwrap();
        store
    }

    fn summaries(entries: &[&Entry]) -> Vec<String> {
        entries.iter().map(|entry| entry.summary.clone()).collect()
    }

    #[rstest]
    fn total_seconds_sums_worklogs(store: EntryStore) {
        assert_eq!(total_seconds(store.get(EntryId(1)).unwrap()), 7200);
        assert_eq!(total_seconds(store.get(EntryId(4)).unwrap()), 0);
    }

    #[rstest]
    fn no_keys_yields_a_single_group_in_input_order(store: EntryStore) {
        let groups = group_by(store.entries(), &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, ALL_TASKS);
        assert_eq!(summaries(&groups[0].entries), vec!["Task 1", "Task 2", "Task 3", "Task 4"]);
    }

    #[rstest]
    fn groups_by_composite_key_in_first_seen_order(store: EntryStore) {
        let groups = group_by(store.entries(), &[GroupKey::Project, GroupKey::Assignee]);
        let keys = groups.iter().map(|group| group.key.as_str()).collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec!["Project B · Imane", "Project A · Malika", "Project B · Malika"]
        );
        assert_eq!(summaries(&groups[0].entries), vec!["Task 1", "Task 3"]);
    }

    #[rstest]
    fn key_order_changes_the_composite_key(store: EntryStore) {
        let groups = group_by(store.entries(), &[GroupKey::Reporter, GroupKey::Project]);
        assert_eq!(groups[0].key, "Hind · Project B");
        assert_eq!(summaries(&groups[0].entries), vec!["Task 1", "Task 4"]);
    }

    #[rstest]
    fn totals_match_manual_sums_and_do_not_mutate(store: EntryStore) {
        let version = store.version();
        let groups = group_by(store.entries(), &[GroupKey::Assignee]);
        let imane = groups.iter().find(|group| group.key == "Imane").unwrap();

        // (5400 + 1800 + 900) / 3600
        assert_eq!(group_total(imane.entries.iter().copied()), 2.25);
        assert_eq!(group_total(store.entries()), 4.25);
        assert_eq!(group_total(store.entries()), 4.25);
        assert_eq!(daily_total(store.entries(), day(8)), 3.5);
        assert_eq!(daily_total(store.entries(), day(9)), 0.5);
        assert_eq!(daily_total(store.entries(), day(10)), 0.0);
        assert_eq!(store.version(), version);
    }

    #[rstest]
    fn removed_entries_no_longer_count(mut store: EntryStore) {
        store.remove(EntryId(2));
        assert_eq!(daily_total(store.entries(), day(8)), 1.5);
        assert_eq!(group_total(store.entries()), 2.25);
    }

    #[test]
    fn default_range_is_the_current_month() {
        assert_eq!(
            date_range_defaults(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()),
            (
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
            )
        );
    }

    #[rstest]
    fn timesheet_sections_rows_and_totals(store: EntryStore) {
        let sheet = Timesheet::build(store.entries(), day(8), day(14), false, &[GroupKey::Project]).unwrap();

        assert_eq!(sheet.dates, (8..=12).map(day).collect::<Vec<_>>());
        assert_eq!(sheet.groups.len(), 2);

        let project_b = &sheet.groups[0];
        assert_eq!(project_b.key, "Project B");
        assert_eq!(project_b.rows.len(), 3);
        assert_eq!(project_b.rows[0].daily_hours, vec![1.5, 0.5, 0.0, 0.0, 0.0]);
        assert_eq!(project_b.daily_hours, vec![1.5, 0.5, 0.0, 0.0, 0.0]);
        // Task 3's weekend worklog is outside the columns but still in the totals.
        assert_eq!(project_b.total_hours, 2.25);

        assert_eq!(sheet.daily_hours, vec![3.5, 0.5, 0.0, 0.0, 0.0]);
        assert_eq!(sheet.total_hours, 4.25);
    }

    #[rstest]
    fn timesheet_rejects_reversed_range(store: EntryStore) {
        let err = Timesheet::build(store.entries(), day(9), day(8), true, &[]).unwrap_err();
        assert_eq!(err, RangeError { start: day(9), end: day(8) });
    }
}
