use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::{App, ConfigRow, ImportStep};
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    render_step_indicator(f, chunks[0], app);

    match app.import_step {
        ImportStep::SelectFile => render_file_browser(f, chunks[1], app),
        ImportStep::Configure => render_configure(f, chunks[1], app),
        ImportStep::Report => render_report(f, chunks[1], app),
    }
}

fn bordered(title: String, title_style: Style) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(title, title_style))
}

fn render_step_indicator(f: &mut Frame, area: Rect, app: &App) {
    let steps = [
        (ImportStep::SelectFile, "1:File"),
        (ImportStep::Configure, "2:Configure"),
        (ImportStep::Report, "3:Report"),
    ];
    let current_idx = steps
        .iter()
        .position(|(s, _)| *s == app.import_step)
        .unwrap_or(0);

    let mut spans: Vec<Span> = vec![Span::styled(" ", Style::default().bg(theme::HEADER_BG))];
    for (i, (_, label)) in steps.iter().enumerate() {
        let style = if i == current_idx {
            Style::default()
                .fg(theme::HEADER_BG)
                .bg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else if i < current_idx {
            Style::default()
                .fg(theme::GREEN)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::dim_style()
        };
        spans.push(Span::styled(format!(" {label} "), style));
        if i < steps.len() - 1 {
            let connector = if i < current_idx {
                Style::default().fg(theme::GREEN)
            } else {
                theme::dim_style()
            };
            spans.push(Span::styled(" > ", connector));
        }
    }

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::HEADER_BG));
    f.render_widget(bar, area);
}

// ── Step 1: file browser ─────────────────────────────────────

fn render_file_browser(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let mut path_spans = vec![
        Span::styled(" Path: ", theme::dim_style()),
        Span::styled(
            app.file_browser_path.display().to_string(),
            Style::default().fg(theme::ACCENT),
        ),
    ];
    if !app.file_browser_filter.is_empty() {
        path_spans.push(Span::styled(
            format!("  filter: '{}'", app.file_browser_filter),
            Style::default().fg(theme::YELLOW),
        ));
    }
    let path_display = Paragraph::new(Line::from(path_spans))
        .block(bordered(" Select Statement ".into(), theme::title_style()));
    f.render_widget(path_display, chunks[0]);

    let filtered = app.file_browser_filtered();
    let page = chunks[1].height.saturating_sub(2) as usize;
    let parent = app.file_browser_path.parent();

    let items: Vec<ListItem> = filtered
        .iter()
        .enumerate()
        .skip(app.file_browser_scroll)
        .take(page)
        .filter_map(|(i, &entry)| {
            let path = app.file_browser_entries.get(entry)?;
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
            let name = if Some(path.as_path()) == parent {
                "📁 ..".to_string()
            } else if path.is_dir() {
                format!("📁 {file_name}")
            } else {
                format!("📄 {file_name}")
            };
            let style = if i == app.file_browser_index {
                theme::selected_style()
            } else {
                theme::normal_style()
            };
            Some(ListItem::new(Line::from(Span::styled(name, style))))
        })
        .collect();

    let title = if filtered.len() <= 1 && app.file_browser_filter.is_empty() {
        " No CSV files here. Backspace to go up ".to_string()
    } else {
        format!(" {} entries ", filtered.len())
    };
    let list = List::new(items).block(bordered(title, theme::dim_style()));
    f.render_widget(list, chunks[1]);
}

// ── Step 2: mapping, format and live preview ─────────────────

fn render_configure(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_file_summary(f, chunks[0], app);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(44), Constraint::Min(30)])
        .split(chunks[1]);

    render_config_rows(f, panes[0], app);
    render_preview(f, panes[1], app);
}

fn render_file_summary(f: &mut Frame, area: Rect, app: &App) {
    let name = app
        .import_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let headers = app.import_file.headers.join(" | ");

    let line = Line::from(vec![
        Span::styled(" File: ", theme::dim_style()),
        Span::styled(name, Style::default().fg(theme::ACCENT)),
        Span::styled(
            format!("  {} rows  ", app.import_file.rows.len()),
            theme::dim_style(),
        ),
        Span::styled(truncate(&headers, 80), theme::normal_style()),
    ]);
    let summary = Paragraph::new(line).block(bordered(" Statement ".into(), theme::title_style()));
    f.render_widget(summary, area);
}

fn render_config_rows(f: &mut Frame, area: Rect, app: &App) {
    let rows = ConfigRow::all();
    let page = area.height.saturating_sub(2) as usize;
    let offset = (app.config_index + 1).saturating_sub(page);

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(page)
        .map(|(i, row)| {
            let value = app.config_value(*row);
            let value_style = if i == app.config_index {
                theme::selected_style()
            } else if value == "—" {
                theme::dim_style()
            } else {
                theme::normal_style()
            };
            // Column rows first, format rows after a visual gap
            let label_style = match row {
                ConfigRow::Column(_) => theme::dim_style(),
                _ => Style::default().fg(theme::YELLOW),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<18}", row.label()), label_style),
                Span::styled(truncate(&value, 22), value_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(bordered(
        " Mapping & Format ".into(),
        theme::title_style(),
    ));
    f.render_widget(list, area);
}

fn render_preview(f: &mut Frame, area: Rect, app: &App) {
    let preview = &app.import_preview;

    let header = Row::new(
        ["Date", "Type", "Amount", "Account", "Description"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let txn_rows = preview.transactions.iter().map(|txn| {
        let account = txn
            .account_id
            .map(|id| app.account_name(id).to_string())
            .unwrap_or_else(|| "(no account)".into());
        Row::new(vec![
            Cell::from(txn.date.to_string()),
            Cell::from(Span::styled(
                txn.txn_type.as_str(),
                theme::txn_type_style(txn.txn_type),
            )),
            Cell::from(format_amount(txn.amount)),
            Cell::from(truncate(&account, 16)),
            Cell::from(truncate(&txn.description, 48)),
        ])
    });

    let transfer_rows = preview.transfers.iter().map(|t| {
        Row::new(vec![
            Cell::from(t.date.to_string()),
            Cell::from(Span::styled("TRANSFER", theme::transfer_style())),
            Cell::from(format_amount(t.amount)),
            Cell::from(truncate(
                &format!("{} → {}", t.from_account_ref, t.to_account_ref),
                16,
            )),
            Cell::from(truncate(&t.description, 48)),
        ])
    });

    let page = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = txn_rows
        .chain(transfer_rows)
        .enumerate()
        .skip(app.preview_scroll)
        .take(page)
        .map(|(i, row)| {
            if i % 2 == 1 {
                row.style(theme::alt_row_style())
            } else {
                row.style(theme::normal_style())
            }
        })
        .collect();

    let window = match (preview.min_date, preview.max_date) {
        (Some(from), Some(to)) => format!("{from}..{to}"),
        _ => "no dates".into(),
    };
    let mut title = format!(
        " Preview: {} transactions, {} transfers | {window} ",
        preview.transactions.len(),
        preview.transfers.len(),
    );
    let title_style = if preview.dropped > 0 {
        title.push_str(&format!("| {} dropped ", preview.dropped));
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD)
    };

    let widths = [
        Constraint::Length(11),
        Constraint::Length(9),
        Constraint::Length(14),
        Constraint::Length(17),
        Constraint::Min(20),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(title, title_style));
    f.render_widget(table, area);
}

// ── Step 3: report ───────────────────────────────────────────

fn render_report(f: &mut Frame, area: Rect, app: &App) {
    let Some(result) = app.import_result else {
        return;
    };

    let window = match (result.min_date, result.max_date) {
        (Some(from), Some(to)) => format!("{from} to {to}"),
        _ => "none".into(),
    };
    let count_line = |label: &str, value: usize, style: Style| {
        Line::from(vec![
            Span::styled(format!("{label:>20}  "), theme::dim_style()),
            Span::styled(value.to_string(), style),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Import complete",
            Style::default()
                .fg(theme::GREEN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        count_line("Inserted", result.inserted, Style::default().fg(theme::GREEN)),
        count_line("Skipped", result.skipped, theme::normal_style()),
    ];
    if result.dropped > 0 {
        lines.push(count_line(
            "Unreadable dates",
            result.dropped,
            Style::default().fg(theme::YELLOW),
        ));
    }
    lines.push(Line::from(vec![
        Span::styled(format!("{:>20}  ", "Window"), theme::dim_style()),
        Span::styled(window, theme::normal_style()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter to review the imported window, n to import another file",
        theme::dim_style(),
    )));

    let msg = Paragraph::new(lines).centered().block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::GREEN)),
    );
    f.render_widget(msg, area);
}
