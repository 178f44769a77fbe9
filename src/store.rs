use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{
    ClockTime, Entry, EntryDraft, EntryFields, EntryId, Settings, Worklog, WorklogDraft, WorklogId,
};
use crate::duration::TimeSpent;
use crate::error::{EngineError, ValidationError};

/// Grid scale used by the week view: one scheduled or logged minute is 1.5px.
pub const PX_PER_MINUTE: f64 = 1.5;
pub const MIN_BLOCK_HEIGHT_PX: f64 = 20.0;

/// Owned collection of scheduled entries.
///
/// Every mutation builds the complete replacement entry first and swaps it in
/// with a single assignment, so a failed operation leaves the store untouched
/// and readers never see a half-applied change. `version` increases by one per
/// committed mutation.
#[derive(Debug, Clone)]
pub struct EntryStore {
    settings: Settings,
    entries: Vec<Entry>,
    next_entry_id: u64,
    next_worklog_id: u64,
    version: u64,
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            entries: Vec::new(),
            next_entry_id: 1,
            next_worklog_id: 1,
            version: 0,
        }
    }

    /// Rebuilds a store from persisted parts. Id counters are raised past any
    /// id already in use so that ids stay unique for the store's lifetime.
    pub fn restore(
        settings: Settings,
        entries: Vec<Entry>,
        next_entry_id: u64,
        next_worklog_id: u64,
    ) -> Result<Self, ValidationError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(ValidationError::DuplicateId(entry.id));
            }

            let mut dates = HashSet::new();
            for log in &entry.worklogs {
                if !dates.insert(log.date) {
                    return Err(ValidationError::DuplicateWorklogDate {
                        entry: entry.id,
                        date: log.date,
                    });
                }
            }
        }

        let max_entry_id = entries.iter().map(|entry| entry.id.0).max().unwrap_or(0);
        let max_worklog_id = entries
            .iter()
            .flat_map(|entry| entry.worklogs.iter())
            .map(|log| log.id.0)
            .max()
            .unwrap_or(0);
        let after_entries = max_entry_id
            .checked_add(1)
            .ok_or(ValidationError::IdsExhausted("entry"))?;
        let after_worklogs = max_worklog_id
            .checked_add(1)
            .ok_or(ValidationError::IdsExhausted("worklog"))?;

        Ok(Self {
            settings,
            entries,
            next_entry_id: next_entry_id.max(after_entries),
            next_worklog_id: next_worklog_id.max(after_worklogs),
            version: 0,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn next_entry_id(&self) -> u64 {
        self.next_entry_id
    }

    pub fn next_worklog_id(&self) -> u64 {
        self.next_worklog_id
    }

    /// Read-only snapshot of the collection in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn worklog_for(&self, id: EntryId, date: NaiveDate) -> Option<&Worklog> {
        self.get(id).and_then(|entry| entry.worklog_on(date))
    }

    /// Entries scheduled on `day`, ordered by start time then id.
    pub fn entries_on(&self, day: NaiveDate) -> Vec<&Entry> {
        let mut rows = self
            .entries
            .iter()
            .filter(|entry| entry.day == day)
            .collect::<Vec<_>>();
        rows.sort_by(|left, right| left.start.cmp(&right.start).then_with(|| left.id.cmp(&right.id)));
        rows
    }

    pub fn entries_in(&self, days: &[NaiveDate]) -> Vec<(NaiveDate, Vec<&Entry>)> {
        days.iter().map(|day| (*day, self.entries_on(*day))).collect()
    }

    pub fn slot_occupant(&self, day: NaiveDate, start: ClockTime, except: Option<EntryId>) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|entry| entry.day == day && entry.start == start && Some(entry.id) != except)
            .map(|entry| entry.id)
    }

    pub fn add(&mut self, fields: EntryFields) -> Result<&Entry, EngineError> {
        let id = EntryId(self.next_entry_id);
        let next_entry_id = self
            .next_entry_id
            .checked_add(1)
            .ok_or(ValidationError::IdsExhausted("entry"))?;
        let entry = self.validated(id, fields, Vec::new())?;

        self.next_entry_id = next_entry_id;
        self.entries.push(entry);
        self.version += 1;
        debug!(entry = %id, version = self.version, "entry added");

        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Proposes a default window starting at a free grid slot.
    pub fn place_from_slot_click(&self, day: NaiveDate, time: ClockTime) -> Result<EntryDraft, EngineError> {
        let slot_minutes = self.settings.slot_minutes.max(1);
        if time.minutes_since_midnight() % slot_minutes != 0 {
            return Err(ValidationError::UnalignedSlot { time, slot_minutes }.into());
        }

        if let Some(occupant) = self.slot_occupant(day, time, None) {
            return Err(ValidationError::SlotOccupied {
                day,
                start: time,
                occupant,
            }
            .into());
        }

        Ok(EntryDraft {
            day,
            start: time,
            end: time.wrapping_add_minutes(self.settings.placement_minutes),
        })
    }

    /// Drops an entry onto `new_day` at `new_hour:00`, keeping its scheduled length.
    pub fn move_entry(&mut self, id: EntryId, new_day: NaiveDate, new_hour: u32) -> Result<&Entry, EngineError> {
        let index = self.index_of(id)?;
        let start = ClockTime::on_the_hour(new_hour).ok_or(ValidationError::InvalidHour(new_hour))?;

        let current = &self.entries[index];
        let end = start
            .checked_add_minutes(current.scheduled_minutes())
            .ok_or(ValidationError::CrossesMidnight { start })?;
        if let Some(occupant) = self.slot_occupant(new_day, start, Some(id)) {
            return Err(ValidationError::SlotOccupied {
                day: new_day,
                start,
                occupant,
            }
            .into());
        }

        let updated = Entry {
            day: new_day,
            start,
            end,
            ..current.clone()
        };
        Ok(self.commit(index, updated, "entry moved"))
    }

    /// Interactive resize feedback: the entry as it would look at `visual_height`
    /// pixels. The store is not touched; persist the result with [`EntryStore::edit`].
    pub fn resize_preview(&self, id: EntryId, visual_height: f64) -> Result<Entry, EngineError> {
        let entry = self.get(id).ok_or(EngineError::NotFound(id))?;
        let total_minutes = (visual_height.max(MIN_BLOCK_HEIGHT_PX) / PX_PER_MINUTE).round() as u64;
        let logged_minutes = entry.logged_seconds() / 60;
        let scheduled = total_minutes.saturating_sub(logged_minutes).max(1);
        let end = u32::try_from(scheduled)
            .ok()
            .and_then(|minutes| entry.start.checked_add_minutes(minutes))
            .ok_or(ValidationError::CrossesMidnight { start: entry.start })?;

        Ok(Entry {
            end,
            ..entry.clone()
        })
    }

    /// Replaces every editable field; worklogs are kept.
    pub fn edit(&mut self, id: EntryId, fields: EntryFields) -> Result<&Entry, EngineError> {
        let index = self.index_of(id)?;
        let worklogs = self.entries[index].worklogs.clone();
        let updated = self.validated(id, fields, worklogs)?;
        Ok(self.commit(index, updated, "entry edited"))
    }

    /// Deletes an entry together with its worklogs. Unknown ids are ignored.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        let removed = self.entries.remove(index);
        self.version += 1;
        debug!(entry = %id, worklogs = removed.worklogs.len(), version = self.version, "entry removed");
        Some(removed)
    }

    /// Stores a worklog, replacing any existing one for the same date.
    pub fn append_or_replace_worklog(&mut self, id: EntryId, draft: WorklogDraft) -> Result<&Entry, EngineError> {
        let index = self.index_of(id)?;
        let next_worklog_id = self
            .next_worklog_id
            .checked_add(1)
            .ok_or(ValidationError::IdsExhausted("worklog"))?;
        let worklog = Worklog {
            id: WorklogId(self.next_worklog_id),
            date: draft.date,
            start: draft.start,
            duration_seconds: draft.time_spent.seconds(),
            comment: draft.comment,
        };

        let mut updated = self.entries[index].clone();
        updated.worklogs.retain(|log| log.date != worklog.date);
        updated.worklogs.push(worklog);

        self.next_worklog_id = next_worklog_id;
        Ok(self.commit(index, updated, "worklog saved"))
    }

    /// Parses free-text duration input and saves it as the worklog for `date`.
    pub fn log_time(
        &mut self,
        id: EntryId,
        date: NaiveDate,
        time_spent: &str,
        start: Option<ClockTime>,
        comment: Option<String>,
    ) -> Result<&Entry, EngineError> {
        self.index_of(id)?;
        let time_spent = TimeSpent::parse(time_spent)?;
        let draft = WorklogDraft::new(date, time_spent)
            .with_start(start)
            .with_comment(comment);
        self.append_or_replace_worklog(id, draft)
    }

    fn index_of(&self, id: EntryId) -> Result<usize, EngineError> {
        self.entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(EngineError::NotFound(id))
    }

    fn commit(&mut self, index: usize, updated: Entry, action: &'static str) -> &Entry {
        self.entries[index] = updated;
        self.version += 1;
        debug!(entry = %self.entries[index].id, version = self.version, "{action}");
        &self.entries[index]
    }

    fn validated(&self, id: EntryId, fields: EntryFields, worklogs: Vec<Worklog>) -> Result<Entry, ValidationError> {
        let summary = fields
            .summary
            .map(|summary| summary.trim().to_string())
            .filter(|summary| !summary.is_empty())
            .ok_or(ValidationError::MissingField("summary"))?;
        let day = fields.day.ok_or(ValidationError::MissingField("day"))?;
        let start = fields.start.ok_or(ValidationError::MissingField("start"))?;
        let end = fields.end.ok_or(ValidationError::MissingField("end"))?;

        if start >= end {
            return Err(ValidationError::InvalidInterval { start, end });
        }
        if let Some(occupant) = self.slot_occupant(day, start, Some(id)) {
            return Err(ValidationError::SlotOccupied { day, start, occupant });
        }

        Ok(Entry {
            id,
            summary,
            classification: fields.classification,
            day,
            start,
            end,
            worklogs,
        })
    }
}

/// Block height for an entry in the week grid.
pub fn visual_height(entry: &Entry) -> f64 {
    (entry.display_minutes() as f64 * PX_PER_MINUTE).max(MIN_BLOCK_HEIGHT_PX)
}
