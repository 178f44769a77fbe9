mod ledgers;
mod ui;

use std::error::Error;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use weekgrid::aggregate::{Timesheet, date_range_defaults, daily_total, total_seconds};
use weekgrid::calendar::{filter_weekend, week_label, week_of};
use weekgrid::domain::{Classification, ClockTime, Entry, EntryFields, EntryId, GroupKey};
use weekgrid::duration::format_duration;
use weekgrid::error::EngineError;
use weekgrid::storage::{Ledger, load_ledger, save_ledger};

use crate::ledgers::{recent_ledgers, remember_ledger, resolve_ledger_path};
use crate::ui::run_dashboard;

#[derive(Debug, Parser)]
#[command(name = "weekgrid", about = "Weekly task grid with time logging")]
struct Cli {
	#[arg(long)]
	ledger: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Default, Args)]
struct ClassificationArgs {
	#[arg(long)]
	assignee: Option<String>,
	#[arg(long)]
	reporter: Option<String>,
	#[arg(long)]
	project: Option<String>,
}

impl ClassificationArgs {
	fn apply_to(self, mut classification: Classification) -> Classification {
		if let Some(assignee) = self.assignee {
			classification.assignee = assignee;
		}
		if let Some(reporter) = self.reporter {
			classification.reporter = reporter;
		}
		if let Some(project) = self.project {
			classification.project = project;
		}
		classification
	}
}

/// `--weekends` / `--no-weekends`; without either the ledger setting decides.
#[derive(Debug, Default, Args)]
struct WeekendArgs {
	#[arg(long, overrides_with = "no_weekends")]
	weekends: bool,
	#[arg(long, overrides_with = "weekends")]
	no_weekends: bool,
}

impl WeekendArgs {
	fn include(&self, ledger_default: bool) -> bool {
		if self.weekends {
			true
		} else if self.no_weekends {
			false
		} else {
			ledger_default
		}
	}
}

#[derive(Debug, Subcommand)]
enum Command {
	Init,
	Dashboard,
	/// Schedule an entry with an explicit window.
	Add {
		#[arg(long)]
		summary: String,
		#[arg(long)]
		day: NaiveDate,
		#[arg(long)]
		start: ClockTime,
		#[arg(long)]
		end: ClockTime,
		#[command(flatten)]
		classification: ClassificationArgs,
	},
	/// Propose (or, with --summary, create) the default window at a free slot.
	Place {
		#[arg(long)]
		day: NaiveDate,
		#[arg(long)]
		time: ClockTime,
		#[arg(long)]
		summary: Option<String>,
		#[command(flatten)]
		classification: ClassificationArgs,
	},
	Move {
		#[arg(long)]
		entry: EntryId,
		#[arg(long)]
		day: NaiveDate,
		#[arg(long)]
		hour: u32,
	},
	/// Change fields of an entry; omitted fields keep their value.
	Edit {
		#[arg(long)]
		entry: EntryId,
		#[arg(long)]
		summary: Option<String>,
		#[arg(long)]
		day: Option<NaiveDate>,
		#[arg(long)]
		start: Option<ClockTime>,
		#[arg(long)]
		end: Option<ClockTime>,
		#[command(flatten)]
		classification: ClassificationArgs,
	},
	Remove {
		#[arg(long)]
		entry: EntryId,
	},
	/// Record time spent, e.g. --time-spent "1h 30m".
	Log {
		#[arg(long)]
		entry: EntryId,
		#[arg(long)]
		time_spent: String,
		#[arg(long)]
		date: Option<NaiveDate>,
		#[arg(long)]
		start: Option<ClockTime>,
		#[arg(long)]
		comment: Option<String>,
	},
	/// List every worklog of an entry with its start and comment.
	Worklogs {
		#[arg(long)]
		entry: EntryId,
	},
	Week {
		#[arg(long)]
		date: Option<NaiveDate>,
		#[command(flatten)]
		weekends: WeekendArgs,
	},
	Timesheet {
		#[arg(long)]
		from: Option<NaiveDate>,
		#[arg(long)]
		to: Option<NaiveDate>,
		#[arg(long, value_enum, value_delimiter = ',')]
		group_by: Vec<GroupKey>,
		#[command(flatten)]
		weekends: WeekendArgs,
	},
	Ledgers {
		#[arg(long, default_value_t = 20)]
		limit: usize,
	},
}

fn main() {
	init_tracing();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	if let Some(Command::Ledgers { limit }) = &cli.command {
		print_recent_ledgers(*limit)?;
		return Ok(());
	}

	let ledger_path = resolve_ledger_path(cli.ledger);
	let mut ledger = load_ledger(&ledger_path)?;
	info!(path = %ledger_path.display(), entries = ledger.store.entries().len(), "ledger loaded");
	if let Err(err) = remember_ledger(&ledger_path) {
		eprintln!("warning: failed to store recent ledger: {err}");
	}

	let today = Local::now().date_naive();
	match cli.command.unwrap_or(Command::Dashboard) {
		Command::Init => {
			save_ledger(&ledger_path, &ledger)?;
			println!("initialized ledger at {}", ledger_path.display());
		}
		Command::Dashboard => {
			run_dashboard(&mut ledger, &ledger_path)?;
		}
		Command::Add {
			summary,
			day,
			start,
			end,
			classification,
		} => {
			let fields = EntryFields::new(summary, day, start, end)
				.with_classification(classification.apply_to(Classification::default()));
			let id = ledger.store.add(fields)?.id;
			save_ledger(&ledger_path, &ledger)?;
			println!("created entry {id}");
		}
		Command::Place {
			day,
			time,
			summary,
			classification,
		} => {
			let draft = ledger.store.place_from_slot_click(day, time)?;
			match summary {
				Some(summary) => {
					let fields = draft
						.into_fields(summary)
						.with_classification(classification.apply_to(Classification::default()));
					let id = ledger.store.add(fields)?.id;
					save_ledger(&ledger_path, &ledger)?;
					println!("created entry {id}");
				}
				None => {
					println!("free slot {} {}-{}", draft.day, draft.start, draft.end);
					if draft.crosses_midnight() {
						println!("note: the default window runs past midnight; choose an earlier end");
					}
				}
			}
		}
		Command::Move { entry, day, hour } => {
			let moved = ledger.store.move_entry(entry, day, hour)?;
			println!("moved {} to {} {}-{}", moved.id, moved.day, moved.start, moved.end);
			save_ledger(&ledger_path, &ledger)?;
		}
		Command::Edit {
			entry,
			summary,
			day,
			start,
			end,
			classification,
		} => {
			let current = ledger.store.get(entry).ok_or(EngineError::NotFound(entry))?;
			let mut fields = EntryFields::from_entry(current);
			fields.summary = summary.or(fields.summary);
			fields.day = day.or(fields.day);
			fields.start = start.or(fields.start);
			fields.end = end.or(fields.end);
			fields.classification = classification.apply_to(fields.classification);
			ledger.store.edit(entry, fields)?;
			save_ledger(&ledger_path, &ledger)?;
			println!("updated entry {entry}");
		}
		Command::Remove { entry } => match ledger.store.remove(entry) {
			Some(removed) => {
				save_ledger(&ledger_path, &ledger)?;
				println!(
					"removed entry {} ({} worklogs)",
					removed.id,
					removed.worklogs.len()
				);
			}
			None => println!("no entry {entry}; nothing removed"),
		},
		Command::Log {
			entry,
			time_spent,
			date,
			start,
			comment,
		} => {
			let date = date.unwrap_or(today);
			let updated = ledger.store.log_time(entry, date, &time_spent, start, comment)?;
			let logged = updated.worklog_on(date).map(|log| log.duration_seconds).unwrap_or(0);
			println!("logged {} on {} for entry {}", format_duration(logged), date, entry);
			save_ledger(&ledger_path, &ledger)?;
		}
		Command::Worklogs { entry } => {
			let entry = ledger.store.get(entry).ok_or(EngineError::NotFound(entry))?;
			for line in worklog_report(entry) {
				println!("{line}");
			}
		}
		Command::Week { date, weekends } => {
			let include_weekends = weekends.include(ledger.store.settings().include_weekends);
			print_week(&ledger, date.unwrap_or(today), include_weekends);
		}
		Command::Timesheet {
			from,
			to,
			group_by,
			weekends,
		} => {
			let (default_from, default_to) = date_range_defaults(today);
			let include_weekends = weekends.include(ledger.store.settings().include_weekends);
			let sheet = Timesheet::build(
				ledger.store.entries(),
				from.unwrap_or(default_from),
				to.unwrap_or(default_to),
				include_weekends,
				&group_by,
			)?;
			print_timesheet(&sheet);
		}
		Command::Ledgers { .. } => {}
	}

	Ok(())
}

fn print_recent_ledgers(limit: usize) -> Result<(), Box<dyn Error>> {
	let rows = recent_ledgers(limit)?;
	if rows.is_empty() {
		println!("no recent ledgers");
		return Ok(());
	}

	for (index, path) in rows.iter().enumerate() {
		println!("{:>2}. {}", index + 1, path.display());
	}

	Ok(())
}

fn print_week(ledger: &Ledger, reference: NaiveDate, include_weekends: bool) {
	let week = week_of(reference);
	println!("week {}", week_label(&week));

	for day in filter_weekend(&week, include_weekends) {
		let entries = ledger.store.entries_on(day);
		let logged = daily_total(ledger.store.entries(), day);
		println!("\n{} | logged {:.2}h", day.format("%a %d %b"), logged);
		if entries.is_empty() {
			println!("  (nothing scheduled)");
		}
		for entry in entries {
			println!("  {}", entry_line(entry));
		}
	}
}

fn entry_line(entry: &Entry) -> String {
	let classification = [
		entry.classification.project.as_str(),
		entry.classification.assignee.as_str(),
	]
	.into_iter()
	.filter(|value| !value.is_empty())
	.collect::<Vec<_>>()
	.join(" · ");

	format!(
		"[{}] {}-{} {}{} | logged {}",
		entry.id,
		entry.start,
		entry.end,
		entry.short_summary(),
		if classification.is_empty() {
			String::new()
		} else {
			format!(" ({classification})")
		},
		format_duration(total_seconds(entry))
	)
}

fn worklog_report(entry: &Entry) -> Vec<String> {
	let mut lines = vec![format!(
		"[{}] {} | {} {}-{}",
		entry.id,
		entry.short_summary(),
		entry.day,
		entry.start,
		entry.end
	)];
	let logs = entry.worklogs_by_date();
	if logs.is_empty() {
		lines.push("  (no worklogs)".to_string());
		return lines;
	}

	lines.extend(logs.iter().map(|log| format!("  {}", log.describe())));
	lines.push(format!("  total {}", format_duration(total_seconds(entry))));
	lines
}

fn print_timesheet(sheet: &Timesheet) {
	let (Some(first), Some(last)) = (sheet.dates.first(), sheet.dates.last()) else {
		println!("no days in range");
		return;
	};
	println!(
		"timesheet {} - {} | {} day{}",
		first,
		last,
		sheet.dates.len(),
		if sheet.dates.len() == 1 { "" } else { "s" }
	);

	let header = sheet
		.dates
		.iter()
		.map(|date| format!("{:>6}", date.format("%d/%m")))
		.collect::<String>();
	println!("{:<32}{header} {:>8}", "", "total");

	for group in &sheet.groups {
		println!("\n{}", group.key);
		for row in &group.rows {
			let label = format!("  [{}] {}", row.entry_id, row.summary);
			println!("{:<32}{} {:>8.2}", truncate(&label, 31), hours_cells(&row.daily_hours), row.total_hours);
		}
		println!("{:<32}{} {:>8.2}", "  group total", hours_cells(&group.daily_hours), group.total_hours);
	}

	println!("\n{:<32}{} {:>8.2}", "total", hours_cells(&sheet.daily_hours), sheet.total_hours);
}

fn hours_cells(hours: &[f64]) -> String {
	hours
		.iter()
		.map(|value| {
			if *value == 0.0 {
				format!("{:>6}", "-")
			} else {
				format!("{value:>6.2}")
			}
		})
		.collect()
}

fn truncate(text: &str, width: usize) -> String {
	if text.chars().count() <= width {
		return text.to_string();
	}
	let mut out = text.chars().take(width.saturating_sub(1)).collect::<String>();
	out.push('…');
	out
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::{WeekendArgs, worklog_report};
	use weekgrid::domain::{ClockTime, EntryFields, EntryId};
	use weekgrid::store::EntryStore;

	fn day(d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
	}

	#[test]
	fn worklog_report_lists_each_log_by_date() {
		let mut store = EntryStore::new();
		store
			.add(EntryFields::new(
				"Write report",
				day(10),
				ClockTime::new(9, 0).unwrap(),
				ClockTime::new(10, 0).unwrap(),
			))
			.unwrap();
		store
			.log_time(EntryId(1), day(11), "45m", None, None)
			.unwrap();
		store
			.log_time(EntryId(1), day(10), "1h 30m", ClockTime::new(9, 0), Some("deep work".to_string()))
			.unwrap();

		let entry = store.get(EntryId(1)).unwrap();
		assert_eq!(
			worklog_report(entry),
			vec![
				"[1] Write report | 2024-01-10 09:00-10:00".to_string(),
				"  2024-01-10 09:00 01:30:00  deep work".to_string(),
				"  2024-01-11 --:-- 00:45:00".to_string(),
				"  total 02:15:00".to_string(),
			]
		);
	}

	#[test]
	fn worklog_report_says_when_nothing_is_logged() {
		let mut store = EntryStore::new();
		store
			.add(EntryFields::new("Idle", day(10), ClockTime::new(9, 0).unwrap(), ClockTime::new(9, 30).unwrap()))
			.unwrap();
		let report = worklog_report(store.get(EntryId(1)).unwrap());
		assert_eq!(report.last().map(String::as_str), Some("  (no worklogs)"));
	}

	#[test]
	fn weekend_flags_override_the_ledger_setting_either_way() {
		let neither = WeekendArgs::default();
		assert!(neither.include(true));
		assert!(!neither.include(false));

		let show = WeekendArgs {
			weekends: true,
			no_weekends: false,
		};
		assert!(show.include(false));

		let hide = WeekendArgs {
			weekends: false,
			no_weekends: true,
		};
		assert!(!hide.include(true));
	}
}
