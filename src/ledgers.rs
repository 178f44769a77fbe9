use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

const RECENT_LEDGERS_FILE: &str = "recent_ledgers.txt";
const DEFAULT_LEDGER_FILE: &str = "default.weekgrid";
const MAX_RECENT_LEDGERS: usize = 50;
const LEDGER_ENV: &str = "WEEKGRID_LEDGER";
const STATE_DIR_ENV: &str = "WEEKGRID_STATE_DIR";

/// Picks the ledger file: `--ledger`, then `WEEKGRID_LEDGER`, then the most
/// recently used ledger, then `default.weekgrid` in the state dir.
pub fn resolve_ledger_path(cli_path: Option<PathBuf>) -> PathBuf {
	if let Some(path) = cli_path {
		debug!(path = %path.display(), "ledger from command line");
		return absolutize(path);
	}

	if let Some(path) = env::var_os(LEDGER_ENV) {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			debug!(path = %path.display(), "ledger from {LEDGER_ENV}");
			return absolutize(path);
		}
	}

	if let Some(path) = recent_ledgers(1).ok().and_then(|recent| recent.into_iter().next()) {
		debug!(path = %path.display(), "ledger from recent list");
		return path;
	}

	state_dir().join(DEFAULT_LEDGER_FILE)
}

/// Moves `path` to the top of the recent list, keeping at most
/// `MAX_RECENT_LEDGERS` distinct paths.
pub fn remember_ledger(path: &Path) -> Result<(), std::io::Error> {
	let path = absolutize(path.to_path_buf());
	let others = recent_ledgers(MAX_RECENT_LEDGERS)?
		.into_iter()
		.filter(|known| known != &path)
		.take(MAX_RECENT_LEDGERS - 1)
		.collect::<Vec<_>>();
	let contents = std::iter::once(path)
		.chain(others)
		.map(|known| format!("{}\n", known.display()))
		.collect::<String>();

	fs::create_dir_all(state_dir())?;
	fs::write(recent_ledgers_path(), contents)
}

pub fn recent_ledgers(limit: usize) -> Result<Vec<PathBuf>, std::io::Error> {
	let raw = match fs::read_to_string(recent_ledgers_path()) {
		Ok(raw) => raw,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
		Err(err) => return Err(err),
	};

	Ok(raw
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.take(limit)
		.map(PathBuf::from)
		.collect())
}

fn recent_ledgers_path() -> PathBuf {
	state_dir().join(RECENT_LEDGERS_FILE)
}

fn state_dir() -> PathBuf {
	env::var_os(STATE_DIR_ENV)
		.map(PathBuf::from)
		.or_else(|| env::var_os("XDG_STATE_HOME").map(|base| PathBuf::from(base).join("weekgrid")))
		.or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/state/weekgrid")))
		.unwrap_or_else(|| PathBuf::from(".weekgrid"))
}

/// Absolute form of `path`; existing files are also canonicalized so one
/// ledger never shows up twice in the recent list.
fn absolutize(path: PathBuf) -> PathBuf {
	let path = std::path::absolute(&path).unwrap_or(path);
	fs::canonicalize(&path).unwrap_or(path)
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::{absolutize, resolve_ledger_path};

	#[test]
	fn command_line_path_wins_and_is_made_absolute() {
		let resolved = resolve_ledger_path(Some(PathBuf::from("week.weekgrid")));
		assert!(resolved.is_absolute());
		assert!(resolved.ends_with("week.weekgrid"));
	}

	#[test]
	fn absolute_paths_are_kept() {
		let path = std::env::temp_dir().join("weekgrid_missing_dir").join("x.weekgrid");
		assert_eq!(absolutize(path.clone()), path);
	}
}
