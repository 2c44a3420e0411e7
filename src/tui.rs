use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Chart, Clear, Dataset, GraphType, Paragraph};
use tokio::sync::broadcast;

use crate::card::{CAPTION, Direction, MetricCard};
use crate::chart::TrendChart;
use crate::command::Command;
use crate::dashboard::{Dashboard, DashboardView, MetricPanel, TITLE};
use crate::error_log::ErrorLogStore;
use crate::selector::MonthSelector;

const GRID_COLUMNS: usize = 3;
const CARD_HEIGHT: u16 = 6;

pub struct TuiApp {
    dashboard: Dashboard,
    selector: MonthSelector,
    view: Option<DashboardView>,
    tx: broadcast::Sender<Command>,
    error_log: ErrorLogStore,
    last_draw: Instant,
    min_redraw_gap: Duration,
    status_message: Option<String>,
    status_visible_until: Option<Instant>,
    status_is_error: bool,
    exit_confirmation: bool,
}

impl TuiApp {
    pub fn new(
        dashboard: Dashboard,
        default_month: &str,
        tx: broadcast::Sender<Command>,
        error_log: ErrorLogStore,
    ) -> TuiApp {
        let min_redraw_gap = Duration::from_millis(100);
        let selector = MonthSelector::new(&dashboard.months(), default_month);
        let mut app = TuiApp {
            dashboard,
            selector,
            view: None,
            tx,
            error_log,
            last_draw: Instant::now() - min_redraw_gap,
            min_redraw_gap,
            status_message: None,
            status_visible_until: None,
            status_is_error: false,
            exit_confirmation: false,
        };
        let initial = app.selector.selected().map(str::to_string);
        app.apply_selection(initial);
        app
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_visible_until = Some(Instant::now() + Duration::from_secs(3));
        self.status_is_error = false;
    }

    fn set_error_status_message(&mut self, month: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        if let Err(err) = self.error_log.append_message(month, message.clone()) {
            tracing::warn!(error = %err, "failed to append error journal");
        }
        self.status_message = Some(message);
        self.status_visible_until = Some(Instant::now() + Duration::from_secs(5));
        self.status_is_error = true;
    }

    fn clear_status_if_allowed(&mut self) {
        if let Some(visible_until) = self.status_visible_until {
            if Instant::now() < visible_until {
                return;
            }
        }
        self.status_message = None;
        self.status_visible_until = None;
        self.status_is_error = false;
    }

    pub fn dispose(&self) {
        ratatui::restore();
    }

    pub async fn run(&mut self, rx: &mut broadcast::Receiver<Command>) -> Result<()> {
        color_eyre::install()?;
        let mut terminal = ratatui::init();
        let mut input_tick = tokio::time::interval(self.min_redraw_gap);
        terminal.draw(|frame| self.render(frame))?;
        self.last_draw = Instant::now();
        loop {
            tokio::select! {
                biased;
                _ = input_tick.tick() => {
                    if self.poll_input()? {
                        return Ok(());
                    }
                    if self.last_draw.elapsed() >= self.min_redraw_gap {
                        self.clear_status_if_allowed();
                        terminal.draw(|frame| self.render(frame))?;
                        self.last_draw = Instant::now();
                    }
                }
                result = rx.recv() => {
                    match result {
                        Ok(command) => {
                            if self.handle_command(command) {
                                return Ok(());
                            }
                            terminal.draw(|frame| self.render(frame))?;
                            self.last_draw = Instant::now();
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns true when the loop should stop.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::SelectMonth(month) => {
                self.apply_selection(month);
                false
            }
            Command::Exit => true,
        }
    }

    /// A cleared selection leaves the previous view on screen.
    fn apply_selection(&mut self, month: Option<String>) {
        if let Some(label) = month.as_deref() {
            self.selector.select(label);
        }
        match self.dashboard.render(month.as_deref()) {
            Ok(Some(view)) => {
                self.view = Some(view);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "dashboard render failed");
                self.set_error_status_message(month.as_deref(), err.to_string());
            }
        }
    }

    fn broadcast_selection(&mut self) {
        let month = self.selector.selected().map(str::to_string);
        tracing::info!(month = month.as_deref().unwrap_or(""), "month selection changed");
        let _ = self.tx.send(Command::SelectMonth(month));
    }

    fn poll_input(&mut self) -> Result<bool> {
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key_event(key)? {
                        return Ok(true);
                    }
                }
                _ => {}
            }
        }
        Ok(false)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<bool> {
        if self.exit_confirmation {
            return self.handle_exit_confirmation_key(key);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') = key.code {
                self.prompt_exit_confirmation();
                return Ok(false);
            }
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.prompt_exit_confirmation();
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                if self.selector.next().is_some() {
                    self.broadcast_selection();
                }
            }
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                if self.selector.previous().is_some() {
                    self.broadcast_selection();
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Backspace | KeyCode::Delete => {
                self.selector.clear();
                self.set_status_message("Selection cleared; showing last rendered month");
                self.broadcast_selection();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.selector.reset();
                self.set_status_message(format!("Selection reset to {}", self.selector.label()));
                self.broadcast_selection();
            }
            _ => {}
        }
        Ok(false)
    }

    fn prompt_exit_confirmation(&mut self) {
        if self.exit_confirmation {
            return;
        }
        self.exit_confirmation = true;
        self.set_status_message("Quit dashboard? Y/Enter to confirm · N/Esc to cancel");
    }

    fn handle_exit_confirmation_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') = key.code {
                self.exit_confirmation = false;
                return Ok(true);
            }
        }
        match key.code {
            KeyCode::Char('y')
            | KeyCode::Char('Y')
            | KeyCode::Char('q')
            | KeyCode::Char('Q')
            | KeyCode::Enter => {
                self.exit_confirmation = false;
                Ok(true)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.exit_confirmation = false;
                self.set_status_message("Quit cancelled");
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let has_status = self.status_message.is_some() && area.height >= 8;
        let mut constraints = vec![Constraint::Length(3), Constraint::Min(CARD_HEIGHT)];
        if has_status {
            constraints.push(Constraint::Length(3));
        }
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints(constraints)
            .split(area);
        self.render_header(frame, chunks[0]);
        self.render_panels(frame, chunks[1]);
        if has_status {
            self.render_status(frame, chunks[2]);
        }
        if self.exit_confirmation {
            self.render_exit_confirmation(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let selector_style = if self.selector.selected().is_some() {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let line = Line::from(vec![
            Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   Select Month: "),
            Span::styled(format!("◀ {} ▶", self.selector.label()), selector_style),
            Span::styled(
                format!("   [{}]", self.selector.options().join(" ")),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        let header = Paragraph::new(line)
            .alignment(Alignment::Left)
            .block(Block::bordered().title("←/→ month · c clear · r reset · q quit"));
        frame.render_widget(header, area);
    }

    fn render_panels(&self, frame: &mut Frame, area: Rect) {
        let Some(view) = &self.view else {
            let empty = Paragraph::new("No month selected")
                .alignment(Alignment::Center)
                .block(Block::bordered());
            frame.render_widget(empty, area);
            return;
        };
        let rows = view.panels.len().div_ceil(GRID_COLUMNS).max(1);
        let row_areas = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
            .split(area);
        for (row_idx, row_panels) in view.panels.chunks(GRID_COLUMNS).enumerate() {
            let cells = Layout::default()
                .direction(LayoutDirection::Horizontal)
                .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
                .split(row_areas[row_idx]);
            for (panel, cell) in row_panels.iter().zip(cells.iter()) {
                self.render_panel(frame, *cell, panel);
            }
        }
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect, panel: &MetricPanel) {
        let block = Block::bordered().title(Span::styled(
            panel.card.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(inner);
        frame.render_widget(Paragraph::new(card_lines(&panel.card)), chunks[0]);
        render_sparkline(frame, chunks[1], &panel.chart);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if let Some(message) = &self.status_message {
            let color = if self.status_is_error {
                Color::Red
            } else {
                Color::Yellow
            };
            let block = Block::bordered().title("Status");
            let status = Paragraph::new(message.as_str())
                .style(Style::default().fg(color))
                .alignment(Alignment::Left)
                .block(block);
            frame.render_widget(status, area);
        }
    }

    fn render_exit_confirmation(&self, frame: &mut Frame) {
        let area = frame.area();
        if area.width < 24 || area.height < 5 {
            return;
        }
        let popup_width = area.width.saturating_sub(20).min(50).max(28);
        let popup_height = 5;
        let left = area.x + (area.width.saturating_sub(popup_width)) / 2;
        let top = area.y + (area.height.saturating_sub(popup_height)) / 2;
        let popup = Rect::new(left, top, popup_width, popup_height);
        let lines = vec![
            Line::from(Span::styled(
                "Quit the KPI dashboard?",
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from("Y/Enter confirm · N/Esc cancel"),
            Line::from("Ctrl+C quits immediately"),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(Block::bordered().title("Confirm"));
        frame.render_widget(Clear, popup);
        frame.render_widget(paragraph, popup);
    }
}

fn parse_color(value: &str) -> Color {
    value.parse::<Color>().unwrap_or(Color::White)
}

fn card_lines(card: &MetricCard) -> Vec<Line<'static>> {
    let accent = parse_color(card.direction.color());
    let mut value_line = vec![Span::styled(
        card.value.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(indicator) = card.direction.indicator() {
        value_line.push(Span::raw(" "));
        value_line.push(Span::styled(indicator, Style::default().fg(accent)));
    }
    let delta_style = match card.direction {
        Direction::Flat => Style::default(),
        Direction::Up | Direction::Down => Style::default().fg(accent),
    };
    vec![
        Line::from(value_line),
        Line::from(vec![
            Span::styled(card.delta.clone(), delta_style),
            Span::raw("  "),
            Span::styled(card.pct_change.clone(), delta_style),
        ]),
        Line::from(Span::styled(
            CAPTION,
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ]
}

/// Bare line chart: first/last month as x ticks, no gridlines or y labels.
fn render_sparkline(frame: &mut Frame, area: Rect, chart: &TrendChart) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let points = chart.plot_points();
    let x_max = (points.len().saturating_sub(1) as f64).max(1.0);
    let x_labels: Vec<Span> = match (chart.points.first(), chart.points.last()) {
        (Some((first, _)), Some((last, _))) if chart.points.len() > 1 => {
            vec![Span::raw(first.clone()), Span::raw(last.clone())]
        }
        (Some((only, _)), _) => vec![Span::raw(only.clone())],
        _ => Vec::new(),
    };
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(parse_color(chart.style.color)))
        .data(&points);
    let widget = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .labels(x_labels)
                .labels_alignment(Alignment::Left)
                .bounds([0.0, x_max]),
        )
        .y_axis(Axis::default().bounds(chart.y_bounds()));
    frame.render_widget(widget, area);
}
