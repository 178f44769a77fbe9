use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{ClockTime, EntryId};
use crate::duration::DurationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid clock time: {0:?} (expected HH:MM)")]
    InvalidClockTime(String),
    #[error("end {end} must be after start {start}")]
    InvalidInterval { start: ClockTime, end: ClockTime },
    #[error("window starting at {start} would run past midnight")]
    CrossesMidnight { start: ClockTime },
    #[error("hour {0} is outside 0..=23")]
    InvalidHour(u32),
    #[error("slot {start} on {day} is already occupied by entry {occupant}")]
    SlotOccupied {
        day: NaiveDate,
        start: ClockTime,
        occupant: EntryId,
    },
    #[error("{time} is not aligned to the {slot_minutes}-minute grid")]
    UnalignedSlot { time: ClockTime, slot_minutes: u32 },
    #[error("no task selected")]
    NoTaskSelected,
    #[error("entry id {0} is used more than once")]
    DuplicateId(EntryId),
    #[error("entry {entry} has more than one worklog on {date}")]
    DuplicateWorklogDate { entry: EntryId, date: NaiveDate },
    #[error("no {0} ids left")]
    IdsExhausted(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("range start {start} is after range end {end}")]
pub struct RangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Every recoverable failure the engine reports to its immediate caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Format(#[from] DurationError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("entry not found: {0}")]
    NotFound(EntryId),
}
