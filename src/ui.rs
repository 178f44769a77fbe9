use std::error::Error;
use std::io;
use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::{debug, warn};

use weekgrid::aggregate::{daily_total, group_by, group_total};
use weekgrid::calendar::{filter_weekend, shift_weeks, week_label, week_of};
use weekgrid::domain::{ClockTime, EntryFields, EntryId, GroupKey, WorklogDraft};
use weekgrid::duration::{format_duration, format_timer};
use weekgrid::storage::{Ledger, save_ledger};
use weekgrid::store::{PX_PER_MINUTE, visual_height};
use weekgrid::timer::{IntervalTicker, SessionTimer, TimerState};

const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const INACTIVE_PANEL_BORDER_COLOR: Color = Color::DarkGray;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const RECENT_SESSIONS: usize = 4;
const GROUPINGS: [&[GroupKey]; 5] = [
	&[],
	&[GroupKey::Project],
	&[GroupKey::Assignee],
	&[GroupKey::Reporter],
	&[GroupKey::Project, GroupKey::Assignee],
];

type DashboardTimer = SessionTimer<IntervalTicker>;

pub fn run_dashboard(ledger: &mut Ledger, ledger_path: &Path) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, ledger, ledger_path);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	ledger: &mut Ledger,
	ledger_path: &Path,
) -> Result<(), Box<dyn Error>> {
	let mut app = App::new(ledger.store.settings().include_weekends);
	let mut timer = DashboardTimer::new(IntervalTicker::new());

	loop {
		timer.poll();
		let view = build_view(&app, ledger);
		app.clamp_selection(&view);
		terminal.draw(|frame| draw_dashboard(frame, &app, &view, &timer, ledger))?;

		if event::poll(StdDuration::from_millis(250))? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				let should_quit = match &app.mode {
					InputMode::Prompt(_) => handle_prompt_key(&mut app, key.code, ledger, ledger_path),
					InputMode::Normal => {
						handle_normal_key(&mut app, key.code, ledger, ledger_path, &view, &mut timer)
					}
				};

				if should_quit {
					break;
				}
			}
		}
	}

	if let Some(message) = stop_timer(&mut timer, ledger, ledger_path)? {
		debug!("{message}");
	}
	Ok(())
}

fn draw_dashboard(frame: &mut Frame, app: &App, view: &ViewModel, timer: &DashboardTimer, ledger: &Ledger) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(12), Constraint::Length(8), Constraint::Length(5)])
		.split(frame.area());

	render_week_grid(frame, layout[0], app, view);

	let bottom = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
		.split(layout[1]);
	render_timer_panel(frame, bottom[0], view, timer, ledger);
	render_worklog_panel(frame, bottom[1], app, view);
	render_footer(frame, layout[2], app);
}

fn render_week_grid(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let outer = Block::default()
		.borders(Borders::ALL)
		.title(format!("Week {} | logged {:.2}h", view.week_label, view.week_hours));
	let inner = outer.inner(area);
	frame.render_widget(outer, area);

	if view.columns.is_empty() {
		return;
	}

	let count = view.columns.len() as u32;
	let columns = Layout::default()
		.direction(Direction::Horizontal)
		.constraints((0..count).map(|_| Constraint::Ratio(1, count)).collect::<Vec<_>>())
		.split(inner);

	for (index, column) in view.columns.iter().enumerate() {
		let focused = index == app.day_column;
		let mut items = column
			.rows
			.iter()
			.map(|row| ListItem::new(row.lines.clone()))
			.collect::<Vec<_>>();
		if items.is_empty() {
			items.push(ListItem::new("(free)"));
		}

		let mut state = ListState::default();
		if focused && !column.rows.is_empty() {
			state.select(Some(app.entry_index.min(column.rows.len() - 1)));
		}

		let today_marker = if column.day == Local::now().date_naive() { " *" } else { "" };
		let title = format!(
			"{}{} {:.2}h",
			column.day.format("%a %d"),
			today_marker,
			column.logged_hours
		);
		let list = List::new(items)
			.block(
				Block::default()
					.borders(Borders::ALL)
					.title(title)
					.border_style(border_style(focused)),
			)
			.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR).add_modifier(Modifier::BOLD));
		frame.render_stateful_widget(list, columns[index], &mut state);
	}
}

fn render_timer_panel(frame: &mut Frame, area: Rect, view: &ViewModel, timer: &DashboardTimer, ledger: &Ledger) {
	let state_label = match timer.state() {
		TimerState::Idle => "Idle",
		TimerState::Running => "Running",
		TimerState::Paused => "Paused",
	};
	let bound = timer.selected().or(view.selected_entry);
	let mut lines = vec![
		Line::from(format!("{}  {}", format_timer(timer.elapsed_seconds()), state_label)),
		Line::from(format!(
			"Task: {}",
			bound
				.map(|id| entry_label(ledger, id))
				.unwrap_or_else(|| "(select an entry)".to_string())
		)),
	];

	let recent = timer.history().iter().rev().take(RECENT_SESSIONS);
	for session in recent {
		lines.push(Line::from(format!(
			"  {} {} {}",
			session.date.format("%d/%m"),
			format_duration(session.seconds),
			entry_label(ledger, session.entry_id)
		)));
	}

	let panel = Paragraph::new(lines).block(
		Block::default()
			.borders(Borders::ALL)
			.title("Session timer")
			.border_style(border_style(timer.state() == TimerState::Running)),
	);
	frame.render_widget(panel, area);
}

fn render_worklog_panel(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	if app.show_worklogs {
		render_entry_worklogs(frame, area, view);
		return;
	}

	let mut items = view
		.groups
		.iter()
		.map(|group| {
			ListItem::new(format!(
				"{:>7.2}h  {} ({} task{})",
				group.hours,
				group.key,
				group.entries,
				if group.entries == 1 { "" } else { "s" }
			))
		})
		.collect::<Vec<_>>();
	if items.is_empty() {
		items.push(ListItem::new("(nothing scheduled this week)"));
	}

	let title = format!("Worklog by {}", grouping_label(app.grouping));
	let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
	frame.render_widget(list, area);
}

fn render_entry_worklogs(frame: &mut Frame, area: Rect, view: &ViewModel) {
	let mut items = view
		.selected_worklogs
		.iter()
		.map(|line| ListItem::new(line.clone()))
		.collect::<Vec<_>>();
	if items.is_empty() {
		let placeholder = if view.selected_entry.is_some() {
			"(no worklogs)"
		} else {
			"(select an entry)"
		};
		items.push(ListItem::new(placeholder));
	}

	let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Worklogs of entry"));
	frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
	let footer_lines = match &app.mode {
		InputMode::Normal => vec![
			Line::from("h/l day | j/k entry | [/] week | . this week | w weekends | g group | v worklogs | q quit"),
			Line::from(
				"a add | m move hour | </> move day | +/- resize | L log time | d delete | t start | p pause | x stop",
			),
			Line::from(app.status.clone()),
		],
		InputMode::Prompt(prompt) => vec![
			Line::from(prompt.title.clone()),
			Line::from(format!("> {}", prompt.input)),
			Line::from(format!("Enter submit | Esc cancel | {}", app.status)),
		],
	};

	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn handle_normal_key(
	app: &mut App,
	code: KeyCode,
	ledger: &mut Ledger,
	ledger_path: &Path,
	view: &ViewModel,
	timer: &mut DashboardTimer,
) -> bool {
	match code {
		KeyCode::Char('q') | KeyCode::Esc => return true,
		KeyCode::Left | KeyCode::Char('h') => app.move_column(-1, view),
		KeyCode::Right | KeyCode::Char('l') => app.move_column(1, view),
		KeyCode::Up | KeyCode::Char('k') => app.move_entry_selection(-1, view),
		KeyCode::Down | KeyCode::Char('j') => app.move_entry_selection(1, view),
		KeyCode::Char('[') => app.shift_week(-1),
		KeyCode::Char(']') => app.shift_week(1),
		KeyCode::Char('.') => {
			app.anchor = Local::now().date_naive();
			app.status = "Back to this week".to_string();
		}
		KeyCode::Char('w') => {
			app.include_weekends = !app.include_weekends;
			app.status = if app.include_weekends {
				"Weekends shown".to_string()
			} else {
				"Weekends hidden".to_string()
			};
		}
		KeyCode::Char('v') => {
			app.show_worklogs = !app.show_worklogs;
			app.status = if app.show_worklogs {
				"Showing worklogs of the selected entry".to_string()
			} else {
				"Showing grouped totals".to_string()
			};
		}
		KeyCode::Char('g') => {
			app.grouping = (app.grouping + 1) % GROUPINGS.len();
			app.status = format!("Grouping by {}", grouping_label(app.grouping));
		}
		KeyCode::Char('a') => match view.selected_day {
			Some(day) => {
				app.mode = InputMode::Prompt(PromptState::new(
					format!("New entry on {}: HH:MM summary", day.format("%a %d %b")),
					PromptKind::AddEntry { day },
				));
			}
			None => app.status = "No day visible".to_string(),
		},
		KeyCode::Char('m') => match (view.selected_entry, view.selected_day) {
			(Some(entry_id), Some(day)) => {
				app.mode = InputMode::Prompt(PromptState::new(
					format!("Move {} to hour (0-23)", entry_label(ledger, entry_id)),
					PromptKind::MoveHour { entry_id, day },
				));
			}
			_ => app.status = "Select an entry first".to_string(),
		},
		KeyCode::Char('<') => app.status = shift_entry_day(view, ledger, ledger_path, -1),
		KeyCode::Char('>') => app.status = shift_entry_day(view, ledger, ledger_path, 1),
		KeyCode::Char('+') | KeyCode::Char('=') => app.status = resize_entry(view, ledger, ledger_path, 1),
		KeyCode::Char('-') => app.status = resize_entry(view, ledger, ledger_path, -1),
		KeyCode::Char('L') => match (view.selected_entry, view.selected_day) {
			(Some(entry_id), Some(date)) => {
				let current = ledger
					.store
					.worklog_for(entry_id, date)
					.map(|log| format!(" (now {})", format_duration(log.duration_seconds)))
					.unwrap_or_default();
				app.mode = InputMode::Prompt(PromptState::new(
					format!(
						"Time spent on {} for {}{current}, e.g. 1h 30m",
						date.format("%a %d %b"),
						entry_label(ledger, entry_id)
					),
					PromptKind::LogTime { entry_id, date },
				));
			}
			_ => app.status = "Select an entry first".to_string(),
		},
		KeyCode::Char('d') => match view.selected_entry {
			Some(entry_id) => {
				if timer.selected() == Some(entry_id) && timer.state() != TimerState::Idle {
					app.status = "Stop the timer before deleting its entry".to_string();
				} else {
					app.status = match ledger.store.remove(entry_id) {
						Some(removed) => match persist(ledger_path, ledger) {
							Ok(()) => format!("Deleted {}", removed.short_summary()),
							Err(err) => format!("error: {err}"),
						},
						None => "Entry already gone".to_string(),
					};
				}
			}
			None => app.status = "Select an entry first".to_string(),
		},
		KeyCode::Char('t') => {
			if timer.state() == TimerState::Idle && view.selected_entry.is_some() {
				timer.select(view.selected_entry);
			}
			app.status = match timer.start(None) {
				Ok(()) => "Timer running".to_string(),
				Err(err) => format!("error: {err}"),
			};
		}
		KeyCode::Char('p') => {
			timer.pause();
			app.status = format!("Timer at {}", format_timer(timer.elapsed_seconds()));
		}
		KeyCode::Char('x') => {
			app.status = match stop_timer(timer, ledger, ledger_path) {
				Ok(Some(message)) => message,
				Ok(None) if timer.elapsed_seconds() > 0 => format!(
					"Select an entry to record {}",
					format_timer(timer.elapsed_seconds())
				),
				Ok(None) => "Nothing to record".to_string(),
				Err(err) => format!("error: {err}"),
			};
		}
		_ => {}
	}

	false
}

fn handle_prompt_key(app: &mut App, code: KeyCode, ledger: &mut Ledger, ledger_path: &Path) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Input cancelled".to_string();
		}
		KeyCode::Backspace => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.pop();
			}
		}
		KeyCode::Char(value) => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.push(value);
			}
		}
		KeyCode::Enter => {
			let prompt = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Prompt(prompt) => prompt,
				InputMode::Normal => return false,
			};

			match submit_prompt(&prompt, ledger, ledger_path) {
				Ok(message) => app.status = message,
				Err(err) => {
					app.mode = InputMode::Prompt(prompt);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn submit_prompt(prompt: &PromptState, ledger: &mut Ledger, ledger_path: &Path) -> Result<String, String> {
	let message = match prompt.kind {
		PromptKind::AddEntry { day } => {
			let input = required_text(&prompt.input, "time and summary")?;
			let (time, summary) = input
				.split_once(char::is_whitespace)
				.ok_or_else(|| "expected HH:MM followed by a summary".to_string())?;
			let time = time.parse::<ClockTime>().map_err(|err| err.to_string())?;
			let summary = required_text(summary, "summary")?;
			let draft = ledger
				.store
				.place_from_slot_click(day, time)
				.map_err(|err| err.to_string())?;
			let entry = ledger
				.store
				.add(draft.into_fields(summary))
				.map_err(|err| err.to_string())?;
			format!("Added {} {}-{}", entry.short_summary(), entry.start, entry.end)
		}
		PromptKind::MoveHour { entry_id, day } => {
			let hour = required_text(&prompt.input, "hour")?
				.parse::<u32>()
				.map_err(|_| "hour must be a number between 0 and 23".to_string())?;
			let entry = ledger
				.store
				.move_entry(entry_id, day, hour)
				.map_err(|err| err.to_string())?;
			format!("Moved to {} {}-{}", entry.day.format("%a %d"), entry.start, entry.end)
		}
		PromptKind::LogTime { entry_id, date } => {
			let entry = ledger
				.store
				.log_time(entry_id, date, &prompt.input, None, None)
				.map_err(|err| err.to_string())?;
			let logged = entry
				.worklog_on(date)
				.map(|log| log.duration_seconds)
				.unwrap_or(0);
			format!("Logged {} on {}", format_duration(logged), date.format("%a %d %b"))
		}
	};

	persist(ledger_path, ledger)?;
	Ok(message)
}

fn shift_entry_day(view: &ViewModel, ledger: &mut Ledger, ledger_path: &Path, delta_days: i64) -> String {
	let Some(entry_id) = view.selected_entry else {
		return "Select an entry first".to_string();
	};
	let Some(entry) = ledger.store.get(entry_id) else {
		return "Entry already gone".to_string();
	};

	let target = entry.day + Duration::days(delta_days);
	let hour = entry.start.hour();
	match ledger.store.move_entry(entry_id, target, hour) {
		Ok(moved) => {
			let message = format!("Moved to {} {}-{}", moved.day.format("%a %d"), moved.start, moved.end);
			match persist(ledger_path, ledger) {
				Ok(()) => message,
				Err(err) => format!("error: {err}"),
			}
		}
		Err(err) => format!("error: {err}"),
	}
}

/// Grows or shrinks the selected block by one grid slot.
fn resize_entry(view: &ViewModel, ledger: &mut Ledger, ledger_path: &Path, slots: i32) -> String {
	let Some(entry_id) = view.selected_entry else {
		return "Select an entry first".to_string();
	};
	let Some(entry) = ledger.store.get(entry_id) else {
		return "Entry already gone".to_string();
	};

	let slot_minutes = ledger.store.settings().slot_minutes.max(1);
	let step = f64::from(slot_minutes) * PX_PER_MINUTE;
	let height = visual_height(entry) + step * f64::from(slots);
	let preview = match ledger.store.resize_preview(entry_id, height) {
		Ok(preview) => preview,
		Err(err) => return format!("error: {err}"),
	};

	let snapped = snap_to_slot(preview.scheduled_minutes(), slot_minutes);
	let Some(end) = preview.start.checked_add_minutes(snapped) else {
		return format!("error: {} would run past midnight", preview.short_summary());
	};
	let mut fields = EntryFields::from_entry(&preview);
	fields.end = Some(end);
	match ledger.store.edit(entry_id, fields) {
		Ok(_) => match persist(ledger_path, ledger) {
			Ok(()) => format!("Now ends at {end}"),
			Err(err) => format!("error: {err}"),
		},
		Err(err) => format!("error: {err}"),
	}
}

/// Rounds a length to the nearest whole grid slot, never below one slot.
fn snap_to_slot(minutes: u32, slot_minutes: u32) -> u32 {
	let slot_minutes = slot_minutes.max(1);
	((minutes + slot_minutes / 2) / slot_minutes).max(1) * slot_minutes
}

/// Stores the finished session as today's worklog for its entry.
fn stop_timer(timer: &mut DashboardTimer, ledger: &mut Ledger, ledger_path: &Path) -> Result<Option<String>, String> {
	let today = Local::now().date_naive();
	let Some(session) = timer.stop(today) else {
		return Ok(None);
	};

	if ledger.store.get(session.entry_id).is_none() {
		warn!(entry = %session.entry_id, seconds = session.seconds, "session for a deleted entry dropped");
		return Ok(Some("Entry was deleted; session discarded".to_string()));
	}

	ledger
		.store
		.append_or_replace_worklog(session.entry_id, WorklogDraft::from(&session))
		.map_err(|err| err.to_string())?;
	persist(ledger_path, ledger)?;
	Ok(Some(format!(
		"Recorded {} for {}",
		format_duration(session.seconds),
		entry_label(ledger, session.entry_id)
	)))
}

fn build_view(app: &App, ledger: &Ledger) -> ViewModel {
	let week = week_of(app.anchor);
	let days = filter_weekend(&week, app.include_weekends);
	let store = &ledger.store;

	let columns = store
		.entries_in(&days)
		.into_iter()
		.map(|(day, entries)| DayColumn {
			day,
			logged_hours: daily_total(entries.iter().copied(), day),
			rows: entries
				.iter()
				.map(|entry| EntryRow {
					id: entry.id,
					lines: vec![
						Line::from(format!("{}-{}", entry.start, entry.end)),
						Line::from(entry.short_summary().to_string()),
					],
				})
				.collect(),
		})
		.collect::<Vec<_>>();

	let week_entries = days.iter().flat_map(|day| store.entries_on(*day)).collect::<Vec<_>>();
	let groups = group_by(week_entries.iter().copied(), GROUPINGS[app.grouping])
		.into_iter()
		.filter(|group| !group.entries.is_empty())
		.map(|group| GroupRow {
			hours: group_total(group.entries.iter().copied()),
			entries: group.entries.len(),
			key: group.key,
		})
		.collect();

	let selected_day = columns.get(app.day_column).map(|column| column.day);
	let selected_entry = columns
		.get(app.day_column)
		.and_then(|column| column.rows.get(app.entry_index))
		.map(|row| row.id);
	let selected_worklogs = selected_entry
		.and_then(|id| store.get(id))
		.map(|entry| {
			entry
				.worklogs_by_date()
				.into_iter()
				.map(|log| log.describe())
				.collect()
		})
		.unwrap_or_default();

	ViewModel {
		week_label: week_label(&week),
		week_hours: columns.iter().map(|column| column.logged_hours).sum(),
		columns,
		groups,
		selected_day,
		selected_entry,
		selected_worklogs,
	}
}

fn persist(path: &Path, ledger: &Ledger) -> Result<(), String> {
	save_ledger(path, ledger).map_err(|err| err.to_string())
}

fn required_text(input: &str, field_name: &str) -> Result<String, String> {
	let value = input.trim();
	if value.is_empty() {
		Err(format!("{field_name} is required"))
	} else {
		Ok(value.to_string())
	}
}

fn entry_label(ledger: &Ledger, id: EntryId) -> String {
	ledger
		.store
		.get(id)
		.map(|entry| entry.short_summary().to_string())
		.unwrap_or_else(|| format!("entry {id}"))
}

fn grouping_label(index: usize) -> String {
	let keys = GROUPINGS[index % GROUPINGS.len()];
	if keys.is_empty() {
		return "nothing".to_string();
	}
	keys.iter().map(|key| key.label()).collect::<Vec<_>>().join(" + ")
}

fn border_style(focused: bool) -> Style {
	if focused {
		Style::default()
			.fg(FOCUSED_PANEL_BORDER_COLOR)
			.add_modifier(Modifier::BOLD)
	} else {
		Style::default().fg(INACTIVE_PANEL_BORDER_COLOR)
	}
}

#[derive(Debug, Clone)]
struct PromptState {
	title: String,
	input: String,
	kind: PromptKind,
}

impl PromptState {
	fn new(title: impl Into<String>, kind: PromptKind) -> Self {
		Self {
			title: title.into(),
			input: String::new(),
			kind,
		}
	}
}

#[derive(Debug, Clone, Copy)]
enum PromptKind {
	AddEntry { day: NaiveDate },
	MoveHour { entry_id: EntryId, day: NaiveDate },
	LogTime { entry_id: EntryId, date: NaiveDate },
}

#[derive(Debug, Clone)]
enum InputMode {
	Normal,
	Prompt(PromptState),
}

#[derive(Debug, Clone)]
struct App {
	anchor: NaiveDate,
	include_weekends: bool,
	day_column: usize,
	entry_index: usize,
	grouping: usize,
	show_worklogs: bool,
	mode: InputMode,
	status: String,
}

impl App {
	fn new(include_weekends: bool) -> Self {
		let today = Local::now().date_naive();
		let day_column = filter_weekend(&week_of(today), include_weekends)
			.iter()
			.position(|day| *day == today)
			.unwrap_or(0);
		Self {
			anchor: today,
			include_weekends,
			day_column,
			entry_index: 0,
			grouping: 0,
			show_worklogs: false,
			mode: InputMode::Normal,
			status: "Ready".to_string(),
		}
	}

	fn clamp_selection(&mut self, view: &ViewModel) {
		if view.columns.is_empty() {
			self.day_column = 0;
			self.entry_index = 0;
			return;
		}

		self.day_column = self.day_column.min(view.columns.len() - 1);
		let rows = view.columns[self.day_column].rows.len();
		self.entry_index = if rows == 0 { 0 } else { self.entry_index.min(rows - 1) };
	}

	fn shift_week(&mut self, delta_weeks: i64) {
		self.anchor = shift_weeks(self.anchor, delta_weeks);
		self.entry_index = 0;
		self.status = format!("Week {}", week_label(&week_of(self.anchor)));
	}

	fn move_column(&mut self, delta: i32, view: &ViewModel) {
		if view.columns.is_empty() {
			return;
		}

		if delta > 0 {
			self.day_column = (self.day_column + delta as usize).min(view.columns.len() - 1);
		} else {
			self.day_column = self.day_column.saturating_sub(delta.unsigned_abs() as usize);
		}
		self.entry_index = 0;
	}

	fn move_entry_selection(&mut self, delta: i32, view: &ViewModel) {
		let Some(column) = view.columns.get(self.day_column) else {
			return;
		};
		if column.rows.is_empty() {
			self.entry_index = 0;
			return;
		}

		if delta > 0 {
			self.entry_index = (self.entry_index + delta as usize).min(column.rows.len() - 1);
		} else {
			self.entry_index = self.entry_index.saturating_sub(delta.unsigned_abs() as usize);
		}
	}
}

#[derive(Debug, Clone)]
struct ViewModel {
	week_label: String,
	week_hours: f64,
	columns: Vec<DayColumn>,
	groups: Vec<GroupRow>,
	selected_day: Option<NaiveDate>,
	selected_entry: Option<EntryId>,
	selected_worklogs: Vec<String>,
}

#[derive(Debug, Clone)]
struct DayColumn {
	day: NaiveDate,
	logged_hours: f64,
	rows: Vec<EntryRow>,
}

#[derive(Debug, Clone)]
struct EntryRow {
	id: EntryId,
	lines: Vec<Line<'static>>,
}

#[derive(Debug, Clone)]
struct GroupRow {
	key: String,
	hours: f64,
	entries: usize,
}
