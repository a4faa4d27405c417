// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use costbook_app::{
    ControllerCommand, ControllerEvent, CostingController, ProductLookup, ProductRecord,
    RequestId, RowField, SupplierLookup,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, warn};

const IDLE_POLL: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);
const SUGGESTION_ROWS: u16 = 8;
const HELP_LINE: &str = "tab focus | enter pick supplier | del/ctrl-d clear row | ctrl-q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    SuppliersLoaded {
        request_id: RequestId,
        result: Result<Vec<String>, String>,
    },
    ProductsLoaded {
        request_id: RequestId,
        result: Result<Vec<ProductRecord>, String>,
    },
}

/// Runs lookups off the UI thread; completions come back through `tx`.
pub trait LookupRuntime {
    fn spawn_supplier_lookup(
        &mut self,
        lookup: SupplierLookup,
        tx: Sender<InternalEvent>,
    ) -> Result<()>;
    fn spawn_product_lookup(&mut self, lookup: ProductLookup, tx: Sender<InternalEvent>)
    -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    ProductQuery,
    SupplierQuery,
    Table,
}

impl Focus {
    const ORDER: [Self; 3] = [Self::ProductQuery, Self::SupplierQuery, Self::Table];

    fn rotate(self, delta: isize) -> Self {
        let current = Self::ORDER
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0) as isize;
        let len = Self::ORDER.len() as isize;
        Self::ORDER[(current + delta).rem_euclid(len) as usize]
    }

    const fn label(self) -> &'static str {
        match self {
            Self::ProductQuery => "product search",
            Self::SupplierQuery => "supplier",
            Self::Table => "table",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct TableCursor {
    row: usize,
    column: usize,
}

impl TableCursor {
    fn field(self) -> RowField {
        RowField::EDITABLE[self.column.min(RowField::EDITABLE.len() - 1)]
    }
}

#[derive(Debug, Clone)]
struct ViewData {
    focus: Focus,
    cursor: TableCursor,
    status_line: Option<String>,
    status_token: u64,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            focus: Focus::ProductQuery,
            cursor: TableCursor::default(),
            status_line: None,
            status_token: 0,
        }
    }
}

pub fn run_app<R: LookupRuntime>(controller: &mut CostingController, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(controller, runtime, &mut view_data, &internal_tx, &internal_rx);
        route_command(
            controller,
            runtime,
            &mut view_data,
            &internal_tx,
            ControllerCommand::Tick(Instant::now()),
        );

        if let Err(error) = terminal.draw(|frame| render(frame, controller, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let timeout = poll_timeout(controller, Instant::now());
        let has_event = match event::poll(timeout).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(
                        controller,
                        runtime,
                        &mut view_data,
                        &internal_tx,
                        key,
                        Instant::now(),
                    ) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn poll_timeout(controller: &CostingController, now: Instant) -> Duration {
    controller
        .product
        .time_until_deadline(now)
        .map_or(IDLE_POLL, |remaining| remaining.min(IDLE_POLL))
}

fn process_internal_events<R: LookupRuntime>(
    controller: &mut CostingController,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::SuppliersLoaded { request_id, result } => {
                route_command(
                    controller,
                    runtime,
                    view_data,
                    tx,
                    ControllerCommand::SuppliersLoaded { request_id, result },
                );
            }
            InternalEvent::ProductsLoaded { request_id, result } => {
                route_command(
                    controller,
                    runtime,
                    view_data,
                    tx,
                    ControllerCommand::ProductsLoaded { request_id, result },
                );
            }
        }
    }
}

fn route_command<R: LookupRuntime>(
    controller: &mut CostingController,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: ControllerCommand,
) {
    let events = match controller.dispatch(command) {
        Ok(events) => events,
        Err(error) => {
            warn!("command rejected: {error:#}");
            emit_status(view_data, tx, format!("{error}"));
            return;
        }
    };

    for event in events {
        match event {
            ControllerEvent::SupplierLookupRequested(lookup) => {
                let request_id = lookup.request_id;
                if let Err(error) = runtime.spawn_supplier_lookup(lookup, tx.clone()) {
                    error!(request_id = %request_id, "start supplier search: {error:#}");
                }
            }
            ControllerEvent::ProductLookupRequested(lookup) => {
                let request_id = lookup.request_id;
                if let Err(error) = runtime.spawn_product_lookup(lookup, tx.clone()) {
                    error!(request_id = %request_id, "start product search: {error:#}");
                }
            }
            ControllerEvent::TableReplaced { rows } => {
                view_data.cursor.row = 0;
                emit_status(view_data, tx, format!("{rows} rows"));
            }
            ControllerEvent::TableFiltered {
                supplier, hidden, ..
            } => {
                snap_cursor_to_visible(controller, view_data);
                emit_status(view_data, tx, format!("showing {supplier}: {hidden} hidden"));
            }
            ControllerEvent::RowCleared(row) => {
                emit_status(view_data, tx, format!("row {} cleared", row + 1));
            }
            ControllerEvent::SuggestionSelected(_) => {
                view_data.focus = Focus::Table;
            }
            ControllerEvent::SuggestionsShown(_)
            | ControllerEvent::SuggestionsHidden
            | ControllerEvent::SubtotalUpdated { .. }
            | ControllerEvent::RowEdited { .. }
            | ControllerEvent::StaleResponseDropped { .. }
            | ControllerEvent::LookupFailed { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>, message: String) {
    view_data.status_line = Some(message);
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: LookupRuntime>(
    controller: &mut CostingController,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    now: Instant,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('q') {
        return true;
    }

    match key.code {
        KeyCode::Tab => {
            view_data.focus = view_data.focus.rotate(1);
            return false;
        }
        KeyCode::BackTab => {
            view_data.focus = view_data.focus.rotate(-1);
            return false;
        }
        KeyCode::Esc => {
            route_command(
                controller,
                runtime,
                view_data,
                internal_tx,
                ControllerCommand::HideSuggestions,
            );
            return false;
        }
        _ => {}
    }

    let command = match view_data.focus {
        Focus::ProductQuery => edited_text(controller.product.query(), key).map(|query| {
            ControllerCommand::ProductQueryChanged { query, at: now }
        }),
        Focus::SupplierQuery => match key.code {
            KeyCode::Up => Some(ControllerCommand::MoveSuggestionCursor(-1)),
            KeyCode::Down => Some(ControllerCommand::MoveSuggestionCursor(1)),
            KeyCode::Enter => Some(ControllerCommand::SelectSuggestion(
                controller.supplier.cursor(),
            )),
            _ => edited_text(controller.supplier.query(), key)
                .map(ControllerCommand::SupplierQueryChanged),
        },
        Focus::Table => table_command_for_key(controller, view_data, key),
    };

    if let Some(command) = command {
        route_command(controller, runtime, view_data, internal_tx, command);
    }
    false
}

fn edited_text(current: &str, key: KeyEvent) -> Option<String> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char(ch) => {
            let mut next = current.to_owned();
            next.push(ch);
            Some(next)
        }
        KeyCode::Backspace => {
            let mut next = current.to_owned();
            next.pop()?;
            Some(next)
        }
        _ => None,
    }
}

fn table_command_for_key(
    controller: &CostingController,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> Option<ControllerCommand> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Up => {
            move_cursor_row(controller, view_data, -1);
            None
        }
        KeyCode::Down => {
            move_cursor_row(controller, view_data, 1);
            None
        }
        KeyCode::Left => {
            view_data.cursor.column = view_data.cursor.column.saturating_sub(1);
            None
        }
        KeyCode::Right => {
            view_data.cursor.column = (view_data.cursor.column + 1).min(RowField::EDITABLE.len() - 1);
            None
        }
        KeyCode::Delete => selected_row(controller, view_data).map(ControllerCommand::ClearRow),
        KeyCode::Char('d') if ctrl => {
            selected_row(controller, view_data).map(ControllerCommand::ClearRow)
        }
        _ => {
            let row = controller.table.row(selected_row(controller, view_data)?)?;
            let field = view_data.cursor.field();
            edited_text(row.field(field), key).map(|value| ControllerCommand::EditCell {
                row: view_data.cursor.row,
                field,
                value,
            })
        }
    }
}

/// The cursor's row, if it is on screen. Hidden rows never take edits.
fn selected_row(controller: &CostingController, view_data: &ViewData) -> Option<usize> {
    controller
        .table
        .row(view_data.cursor.row)
        .filter(|row| row.is_visible())
        .map(|_| view_data.cursor.row)
}

fn move_cursor_row(controller: &CostingController, view_data: &mut ViewData, delta: isize) {
    let visible = controller.table.visible_indices();
    if visible.is_empty() {
        return;
    }
    let position = visible
        .iter()
        .position(|index| *index == view_data.cursor.row)
        .unwrap_or(0) as isize;
    let next = (position + delta).clamp(0, visible.len() as isize - 1) as usize;
    view_data.cursor.row = visible[next];
}

fn snap_cursor_to_visible(controller: &CostingController, view_data: &mut ViewData) {
    let visible = controller.table.visible_indices();
    if visible.contains(&view_data.cursor.row) {
        return;
    }
    if let Some(row) = visible
        .iter()
        .copied()
        .find(|index| *index > view_data.cursor.row)
        .or_else(|| visible.last().copied())
    {
        view_data.cursor.row = row;
    }
}

fn render(frame: &mut ratatui::Frame<'_>, controller: &CostingController, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());
    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[0]);

    let product = Paragraph::new(controller.product.query().to_owned()).block(
        Block::default()
            .title(Focus::ProductQuery.label())
            .borders(Borders::ALL)
            .border_style(focus_style(view_data.focus == Focus::ProductQuery)),
    );
    frame.render_widget(product, inputs[0]);

    let mut supplier_style = Style::default().fg(Color::Gray);
    if controller.supplier.is_selected() {
        supplier_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    }
    let supplier = Paragraph::new(controller.supplier.query().to_owned())
        .style(supplier_style)
        .block(
            Block::default()
                .title(Focus::SupplierQuery.label())
                .borders(Borders::ALL)
                .border_style(focus_style(view_data.focus == Focus::SupplierQuery)),
        );
    frame.render_widget(supplier, inputs[1]);

    render_table(frame, layout[1], controller, view_data);

    let status = Paragraph::new(status_text(view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if controller.supplier.is_list_shown() {
        let anchor = inputs[1];
        let height = (controller.supplier.suggestions().len() as u16)
            .clamp(1, SUGGESTION_ROWS)
            .saturating_add(2);
        let area = Rect {
            x: anchor.x,
            y: anchor.y.saturating_add(anchor.height),
            width: anchor.width,
            height: height.min(frame.area().height.saturating_sub(anchor.y + anchor.height)),
        };
        frame.render_widget(Clear, area);
        let lines = render_suggestion_lines(
            controller.supplier.suggestions(),
            controller.supplier.cursor(),
            usize::from(area.height.saturating_sub(2)),
        )
        .into_iter()
        .map(Line::from)
        .collect::<Vec<_>>();
        let list = Paragraph::new(lines)
            .block(Block::default().title("suppliers").borders(Borders::ALL));
        frame.render_widget(list, area);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    controller: &CostingController,
    view_data: &ViewData,
) {
    let widths = [
        Constraint::Min(14),
        Constraint::Min(18),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Min(16),
        Constraint::Length(10),
    ];

    let header = Row::new(header_labels().into_iter().map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let table_focused = view_data.focus == Focus::Table;
    let rows = table_projection(controller).into_iter().map(|(index, cells)| {
        let selected_row = table_focused && index == view_data.cursor.row;
        let last = cells.len().saturating_sub(1);
        let cells = cells
            .into_iter()
            .enumerate()
            .map(|(column, text)| {
                let text = if column == last {
                    format!("{text:>10}")
                } else {
                    text
                };
                let mut style = Style::default();
                if selected_row {
                    style = style.bg(Color::DarkGray);
                }
                if selected_row && column == view_data.cursor.column {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                Cell::from(text).style(style)
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(controller))
                .borders(Borders::ALL)
                .border_style(focus_style(table_focused)),
        );
    frame.render_widget(table, area);
}

fn header_labels() -> Vec<&'static str> {
    RowField::EDITABLE
        .iter()
        .map(|field| field.label())
        .chain(std::iter::once("subtotal"))
        .collect()
}

/// Visible rows as (table index, cell texts), subtotal last.
fn table_projection(controller: &CostingController) -> Vec<(usize, Vec<String>)> {
    controller
        .table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.is_visible())
        .map(|(index, row)| {
            let cells = RowField::EDITABLE
                .iter()
                .map(|field| row.field(*field).to_owned())
                .chain(std::iter::once(row.subtotal_display()))
                .collect();
            (index, cells)
        })
        .collect()
}

fn table_title(controller: &CostingController) -> String {
    let total = controller.table.len();
    let visible = controller.table.visible_indices().len();
    if visible == total {
        format!("costings ({total})")
    } else {
        format!("costings ({visible}/{total})")
    }
}

/// Lines for the dropdown, scrolled so the cursor stays within `rows`.
fn render_suggestion_lines(suggestions: &[String], cursor: usize, rows: usize) -> Vec<String> {
    if suggestions.is_empty() {
        return vec!["no matching suppliers".to_owned()];
    }
    let rows = rows.max(1);
    let first = cursor
        .saturating_sub(rows - 1)
        .min(suggestions.len().saturating_sub(rows));
    suggestions
        .iter()
        .enumerate()
        .skip(first)
        .take(rows)
        .map(|(index, name)| {
            let marker = if index == cursor { ">" } else { " " };
            format!("{marker} {name}")
        })
        .collect()
}

fn status_text(view_data: &ViewData) -> String {
    view_data
        .status_line
        .clone()
        .unwrap_or_else(|| HELP_LINE.to_owned())
}
