use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let account_label = app
        .review_account
        .map(|id| app.account_name(id).to_string())
        .unwrap_or_else(|| "all accounts".into());
    let window = match (app.review_from, app.review_to) {
        (Some(from), Some(to)) => format!("{from} to {to}"),
        _ => String::new(),
    };

    if app.review_transactions.is_empty() {
        let hint = if window.is_empty() {
            "Import a statement, or pick a window with :review <from> <to>"
        } else {
            "Press a to change the account filter"
        };
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(
                if window.is_empty() {
                    "Nothing to review yet".to_string()
                } else {
                    format!("No transactions from {window} in {account_label}")
                },
                theme::dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(hint, theme::dim_style())),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Review (0) ", theme::title_style()));
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header = Row::new(
        [
            "Date",
            "Account",
            "Type",
            "Amount",
            "Description",
            "Category",
            "Payee",
        ]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = app
        .review_transactions
        .iter()
        .enumerate()
        .skip(app.review_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, txn)| {
            let type_cell = if txn.is_transfer() {
                Span::styled(
                    format!("{} ⇄", txn.txn_type.as_str()),
                    theme::transfer_style(),
                )
            } else {
                Span::styled(txn.txn_type.as_str(), theme::txn_type_style(txn.txn_type))
            };
            let amount_style = theme::txn_type_style(txn.txn_type);

            let style = if i == app.review_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(txn.date.clone()),
                Cell::from(truncate(app.account_name(txn.account_id), 16)),
                Cell::from(type_cell),
                Cell::from(Span::styled(format_amount(txn.signed_amount()), amount_style)),
                Cell::from(truncate(&txn.description, 40)),
                Cell::from(truncate(
                    txn.category_id
                        .and_then(|id| app.lookups.categories.name_of(id))
                        .unwrap_or("—"),
                    16,
                )),
                Cell::from(truncate(
                    txn.payee_id
                        .and_then(|id| app.lookups.payees.name_of(id))
                        .unwrap_or("—"),
                    16,
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(11),
        Constraint::Length(17),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Min(20),
        Constraint::Length(17),
        Constraint::Length(17),
    ];

    let net: rust_decimal::Decimal = app
        .review_transactions
        .iter()
        .map(|t| t.signed_amount())
        .sum();

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(
                    " Review ({}) {window} | {account_label} | net {} ",
                    app.review_transactions.len(),
                    format_amount(net)
                ),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}

