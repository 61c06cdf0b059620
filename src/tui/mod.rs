//! TUI module - Terminal dashboard with ratatui

use anyhow::Result;
use chrono::{Local, Utc};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, Paragraph, Row, Table, TableState, Tabs, Wrap},
};
use std::io::{Stdout, stdout};
use tracing::{debug, warn};

use crate::analytics::DateGroup;
use crate::backend::Backend;
use crate::error::AppError;
use crate::models::{BodyMeasurement, Exercise, WorkoutRecord};
use crate::session::SessionStore;
use crate::workflows::{
    BodyEntry, ChartData, HistoryListing, PlanBrowser, ProgressChart, TodaySummary, TodayView,
    share_record,
};

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Today,
    History,
    Chart,
    Body,
    Plans,
}

impl Tab {
    const ALL: [Tab; 5] = [Tab::Today, Tab::History, Tab::Chart, Tab::Body, Tab::Plans];

    fn title(self) -> &'static str {
        match self {
            Tab::Today => "Today",
            Tab::History => "History",
            Tab::Chart => "Chart",
            Tab::Body => "Body",
            Tab::Plans => "Plans",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Bottom status line
struct Status {
    text: String,
    is_error: bool,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(err: &AppError) -> Self {
        let text = if err.is_retryable() {
            format!("{} (press r to retry)", err)
        } else {
            err.to_string()
        };
        Self {
            text,
            is_error: true,
        }
    }
}

/// App state for TUI
pub struct App<'a> {
    backend: &'a dyn Backend,
    sessions: &'a dyn SessionStore,
    tab: Tab,
    today: Option<TodaySummary>,
    history: Vec<DateGroup<WorkoutRecord>>,
    history_selected: usize,
    chart_exercises: Vec<Exercise>,
    chart_selected: usize,
    chart: Option<ChartData>,
    body: Vec<BodyMeasurement>,
    plans: PlanBrowser,
    plan_selected: usize,
    status: Option<Status>,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(backend: &'a dyn Backend, sessions: &'a dyn SessionStore) -> Self {
        Self {
            backend,
            sessions,
            tab: Tab::Today,
            today: None,
            history: Vec::new(),
            history_selected: 0,
            chart_exercises: Vec::new(),
            chart_selected: 0,
            chart: None,
            body: Vec::new(),
            plans: PlanBrowser::default(),
            plan_selected: 0,
            status: None,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        self.refresh().await;

        let result = self.event_loop(&mut terminal).await;
        restore_terminal()?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            if let Some(key) = next_key()? {
                self.handle_key(key).await;
            }
        }
        Ok(())
    }

    /// Reload whatever the current tab shows
    async fn refresh(&mut self) {
        let result = match self.tab {
            Tab::Today => self.load_today().await,
            Tab::History => self.load_history().await,
            Tab::Chart => self.load_chart().await,
            Tab::Body => self.load_body().await,
            Tab::Plans => self.plans.load(self.backend, self.sessions).await,
        };
        match result {
            Ok(()) => self.status = None,
            Err(e) => {
                warn!(tab = self.tab.title(), error = %e, "refresh failed");
                self.status = Some(Status::error(&e));
            }
        }
    }

    async fn load_today(&mut self) -> Result<(), AppError> {
        self.today = Some(TodayView::new(self.backend, self.sessions).load().await?);
        Ok(())
    }

    async fn load_history(&mut self) -> Result<(), AppError> {
        self.history = HistoryListing::new(self.backend, self.sessions).load().await?;
        let count = self.history_records().len();
        self.history_selected = self.history_selected.min(count.saturating_sub(1));
        Ok(())
    }

    async fn load_chart(&mut self) -> Result<(), AppError> {
        let chart = ProgressChart::new(self.backend, self.sessions);
        if self.chart_exercises.is_empty() {
            self.chart_exercises = chart.exercises().await?;
        }
        self.chart = match self.chart_exercises.get(self.chart_selected) {
            Some(exercise) => Some(chart.load(&exercise.name).await?),
            None => None,
        };
        Ok(())
    }

    async fn load_body(&mut self) -> Result<(), AppError> {
        self.body = BodyEntry::new(self.backend, self.sessions).recent().await?;
        Ok(())
    }

    fn history_records(&self) -> Vec<&WorkoutRecord> {
        self.history.iter().flat_map(|g| g.items.iter()).collect()
    }

    async fn switch_to(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.refresh().await;
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Tab | KeyCode::Right => self.switch_to(self.tab.next()).await,
            KeyCode::BackTab | KeyCode::Left => self.switch_to(self.tab.prev()).await,
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.switch_to(Tab::ALL[index]).await;
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1).await,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1).await,
            KeyCode::Char('s') if self.tab == Tab::History => self.share_selected(),
            KeyCode::Enter if self.tab == Tab::Plans => self.plans.toggle(self.plan_selected),
            KeyCode::Esc if self.tab == Tab::Plans => self.plans.collapse(),
            _ => {}
        }
    }

    async fn move_selection(&mut self, step: isize) {
        let (selected, len) = match self.tab {
            Tab::History => (
                &mut self.history_selected,
                self.history.iter().map(|g| g.items.len()).sum::<usize>(),
            ),
            Tab::Chart => (&mut self.chart_selected, self.chart_exercises.len()),
            Tab::Plans => (&mut self.plan_selected, self.plans.plans().len()),
            Tab::Today | Tab::Body => return,
        };
        if len == 0 {
            return;
        }
        let moved = selected.saturating_add_signed(step).min(len - 1);
        let changed = moved != *selected;
        *selected = moved;

        if changed && self.tab == Tab::Chart {
            self.refresh().await;
        }
    }

    fn share_selected(&mut self) {
        let Some(record) = self.history_records().get(self.history_selected).map(|r| (*r).clone())
        else {
            return;
        };
        debug!(id = %record.id, "sharing record");
        self.status = Some(if share_record(&record) {
            Status::info("Copied to clipboard")
        } else {
            Status {
                text: "Could not copy to clipboard".into(),
                is_error: true,
            }
        });
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .highlight_style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL).title("FitTrack"));
        frame.render_widget(tabs, chunks[0]);

        match self.tab {
            Tab::Today => self.render_today(frame, chunks[1]),
            Tab::History => self.render_history(frame, chunks[1]),
            Tab::Chart => self.render_chart(frame, chunks[1]),
            Tab::Body => self.render_body(frame, chunks[1]),
            Tab::Plans => self.render_plans(frame, chunks[1]),
        }

        // Footer
        let footer = match &self.status {
            Some(status) => Paragraph::new(status.text.as_str()).style(if status.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            }),
            None => Paragraph::new(self.key_help()).style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(footer.block(Block::default().borders(Borders::ALL)), chunks[2]);
    }

    fn key_help(&self) -> &'static str {
        match self.tab {
            Tab::History => "q: quit | tab: switch | j/k: select | s: share | r: refresh",
            Tab::Chart => "q: quit | tab: switch | j/k: exercise | r: refresh",
            Tab::Plans => "q: quit | tab: switch | j/k: select | enter: expand | esc: collapse",
            Tab::Today | Tab::Body => "q: quit | tab: switch | r: refresh",
        }
    }

    fn render_today(&self, frame: &mut Frame, area: Rect) {
        let Some(today) = &self.today else {
            frame.render_widget(empty("Today", "Nothing loaded"), area);
            return;
        };

        let rows: Vec<Row> = today
            .workouts
            .iter()
            .map(|w| {
                Row::new(vec![
                    Cell::from(w.created_at.with_timezone(&Local).format("%H:%M").to_string()),
                    Cell::from(w.exercise_name.clone()),
                    Cell::from(format!("{}kg", w.weight)),
                    Cell::from(format!("{}x{}", w.sets, w.reps)),
                ])
            })
            .collect();

        let title = format!(
            "Today - {} | {} workouts | volume {:.0}kg",
            today.identity.email,
            today.workouts.len(),
            today.volume()
        );
        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(24),
                Constraint::Length(10),
                Constraint::Min(10),
            ],
        )
        .header(Row::new(vec!["Time", "Exercise", "Weight", "Sets x Reps"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title(title));

        frame.render_widget(table, area);
    }

    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let mut rows: Vec<Row> = Vec::new();
        let mut selected_row = None;
        let mut index = 0;
        for group in &self.history {
            rows.push(
                Row::new(vec![Cell::from(group.label.to_string())])
                    .style(Style::default().fg(Color::Yellow).bold()),
            );
            for w in &group.items {
                let style = if index == self.history_selected {
                    selected_row = Some(rows.len());
                    Style::default().reversed()
                } else {
                    Style::default()
                };
                rows.push(
                    Row::new(vec![
                        Cell::from(w.created_at.with_timezone(&Local).format("  %m/%d %H:%M").to_string()),
                        Cell::from(w.exercise_name.clone()),
                        Cell::from(format!("{}kg", w.weight)),
                        Cell::from(format!("{}x{}", w.sets, w.reps)),
                    ])
                    .style(style),
                );
                index += 1;
            }
        }

        if rows.is_empty() {
            frame.render_widget(empty("History", "No workouts recorded yet"), area);
            return;
        }

        let table = Table::new(
            rows,
            [
                Constraint::Length(14),
                Constraint::Length(24),
                Constraint::Length(10),
                Constraint::Min(10),
            ],
        )
        .header(Row::new(vec!["When", "Exercise", "Weight", "Sets x Reps"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("History"));

        // Scrolls the table so the selected record stays visible
        let mut state = TableState::default().with_selected(selected_row);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(26), Constraint::Min(20)])
            .split(area);

        let items: Vec<ListItem> = self
            .chart_exercises
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let item = ListItem::new(e.name.clone());
                if i == self.chart_selected {
                    item.style(Style::default().reversed())
                } else {
                    item
                }
            })
            .collect();
        frame.render_widget(
            List::new(items).block(Block::default().borders(Borders::ALL).title("Exercise")),
            columns[0],
        );

        let Some(data) = self.chart.as_ref().filter(|d| !d.is_empty()) else {
            frame.render_widget(empty("Progress", "No records in the last 30 days"), columns[1]);
            return;
        };

        let origin = data.points[0].at;
        let series: Vec<(f64, f64)> = data
            .points
            .iter()
            .map(|p| ((p.at - origin).num_seconds() as f64 / 86_400.0, p.weight))
            .collect();
        let max_x = series.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);
        let (min_y, max_y) = series.iter().fold((f64::MAX, f64::MIN), |(lo, hi), (_, y)| {
            (lo.min(*y), hi.max(*y))
        });
        let pad = ((max_y - min_y) * 0.1).max(1.0);

        let title = match &data.progress {
            Some(p) => format!("{} | {} ({})", data.exercise, p.percent_label(), p.delta_label()),
            None => data.exercise.clone(),
        };

        let first_label = data.points.first().map(|p| p.label()).unwrap_or_default();
        let last_label = data.points.last().map(|p| p.label()).unwrap_or_default();
        let datasets = vec![
            Dataset::default()
                .name("weight (kg)")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&series),
        ];
        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title(title))
            .x_axis(
                Axis::default()
                    .bounds([0.0, max_x])
                    .labels(vec![first_label, last_label]),
            )
            .y_axis(
                Axis::default()
                    .title("kg")
                    .bounds([min_y - pad, max_y + pad])
                    .labels(vec![format!("{:.0}", min_y - pad), format!("{:.0}", max_y + pad)]),
            );
        frame.render_widget(chart, columns[1]);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        if self.body.is_empty() {
            frame.render_widget(empty("Body", "No measurements yet (fittrack body add)"), area);
            return;
        }

        let now = Utc::now();
        let rows: Vec<Row> = self
            .body
            .iter()
            .map(|m| {
                Row::new(vec![
                    Cell::from(crate::analytics::bucket_label(m.created_at, now).to_string()),
                    Cell::from(format!("{}kg", m.weight)),
                    Cell::from(m.body_fat_percent.map(|b| format!("{}%", b)).unwrap_or_else(|| "-".into())),
                    Cell::from(m.muscle_mass.map(|v| format!("{}kg", v)).unwrap_or_else(|| "-".into())),
                    Cell::from(m.note.clone().unwrap_or_default()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Min(10),
            ],
        )
        .header(Row::new(vec!["When", "Weight", "Body fat", "Muscle", "Note"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Body measurements"));

        frame.render_widget(table, area);
    }

    fn render_plans(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for (i, plan) in self.plans.plans().iter().enumerate() {
            let marker = if self.plans.expanded_index() == Some(i) { "▼" } else { "▶" };
            let weeks = plan
                .duration_weeks
                .map(|w| format!(", {} weeks", w))
                .unwrap_or_default();
            let heading = Line::from(format!("{} {} ({}{})", marker, plan.name, plan.difficulty, weeks));
            lines.push(if i == self.plan_selected {
                heading.style(Style::default().reversed())
            } else {
                heading.style(Style::default().bold())
            });

            if self.plans.expanded_index() == Some(i) {
                if let Some(desc) = &plan.description {
                    lines.push(Line::from(format!("    {}", desc)).style(Style::default().fg(Color::DarkGray)));
                }
                for day in &plan.days {
                    lines.push(Line::from(format!(
                        "    Day {}: {}",
                        day.day_number,
                        day.exercise_names.join(", ")
                    )));
                }
            }
        }

        if lines.is_empty() {
            frame.render_widget(empty("Plans", "No plans available"), area);
            return;
        }

        let plans = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Plans"));
        frame.render_widget(plans, area);
    }
}

fn empty<'t>(title: &'t str, text: &'t str) -> Paragraph<'t> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title))
}

fn next_key() -> Result<Option<KeyEvent>> {
    if event::poll(std::time::Duration::from_millis(100))?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key));
    }
    Ok(None)
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
