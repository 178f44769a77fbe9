use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Entry, Settings};
use crate::error::ValidationError;
use crate::store::EntryStore;

const ENTRIES_MARKER: &str = "\n=== ENTRIES ===\n";
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML header: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("failed to encode TOML header: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("failed to parse JSONL entry on line {line}: {source}")]
    JsonDecode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode JSONL entry: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("inconsistent ledger: {0}")]
    Inconsistent(#[from] ValidationError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerHeader {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default = "first_id")]
    pub next_entry_id: u64,
    #[serde(default = "first_id")]
    pub next_worklog_id: u64,
    #[serde(default)]
    pub settings: Settings,
}

fn first_id() -> u64 {
    1
}

impl LedgerHeader {
    fn for_store(store: &EntryStore, created_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            created_at,
            next_entry_id: store.next_entry_id(),
            next_worklog_id: store.next_worklog_id(),
            settings: store.settings().clone(),
        }
    }
}

/// A store together with the header metadata it was loaded with.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub created_at: DateTime<Utc>,
    pub store: EntryStore,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            store: EntryStore::new(),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_ledger(path: &Path) -> Result<Ledger, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Ledger::new()),
        Err(err) => return Err(StorageError::Io(err)),
    };

    if raw.trim().is_empty() {
        return Ok(Ledger::new());
    }

    let (header_blob, entries_blob) = if let Some((header, entries)) = raw.split_once(ENTRIES_MARKER) {
        (header, entries)
    } else {
        (raw.as_str(), "")
    };

    let header: LedgerHeader = toml::from_str(header_blob)?;
    let mut entries: Vec<Entry> = Vec::new();
    for (index, line) in entries_blob.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(line).map_err(|source| StorageError::JsonDecode {
            line: index + 1,
            source,
        })?;
        entries.push(entry);
    }

    let store = EntryStore::restore(
        header.settings,
        entries,
        header.next_entry_id,
        header.next_worklog_id,
    )?;
    Ok(Ledger {
        created_at: header.created_at,
        store,
    })
}

pub fn save_ledger(path: &Path, ledger: &Ledger) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let header = toml::to_string_pretty(&LedgerHeader::for_store(&ledger.store, ledger.created_at))?;
    let mut file = fs::File::create(path)?;
    file.write_all(header.as_bytes())?;
    file.write_all(ENTRIES_MARKER.as_bytes())?;

    for entry in ledger.store.entries() {
        let line = serde_json::to_string(entry).map_err(StorageError::JsonEncode)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
    }

    Ok(())
}
