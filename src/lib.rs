//! Weekly scheduling and time-logging engine.
//!
//! Entries are tasks placed on a 7-day/24-hour grid; worklogs record time spent
//! against them. The [`store::EntryStore`] owns the entries, [`aggregate`] turns
//! them into per-day and per-group totals, and [`timer::SessionTimer`] measures
//! live sessions that end up as worklogs.

pub mod aggregate;
pub mod calendar;
pub mod domain;
pub mod duration;
pub mod error;
pub mod storage;
pub mod store;
pub mod timer;
