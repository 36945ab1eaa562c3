use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use textwrap::wrap;

use crate::app::rows::FieldRow;

pub(crate) fn render_fields(frame: &mut Frame<'_>, area: Rect, rows: &[FieldRow], focus: usize) {
    let block = Block::default().borders(Borders::ALL);
    if rows.is_empty() {
        frame.render_widget(Paragraph::new("This tab has no fields").block(block), area);
        return;
    }

    let width = area.width.saturating_sub(6).max(10) as usize;
    let items: Vec<ListItem<'_>> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| ListItem::new(row_lines(row, index == focus, width)))
        .collect();

    let mut state = ListState::default();
    state.select(Some(focus.min(rows.len() - 1)));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn row_lines(row: &FieldRow, focused: bool, width: usize) -> Vec<Line<'static>> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let mut lines = Vec::new();
    let mut header = vec![Span::styled(format!("{}: ", row.label), label_style)];
    if row.uploading {
        header.push(Span::styled(
            "uploading…",
            Style::default().fg(Color::Cyan),
        ));
    }

    if row.multiline {
        lines.push(Line::from(header));
        if row.value.is_empty() {
            lines.push(Line::styled("  (empty)", Style::default().fg(Color::DarkGray)));
        } else {
            for source in row.value.split('\n') {
                for wrapped in wrap(source, width) {
                    lines.push(Line::from(format!("  {wrapped}")));
                }
            }
        }
    } else {
        header.push(Span::raw(row.value.clone()));
        lines.push(Line::from(header));
    }

    if let Some(error) = &row.error {
        lines.push(Line::styled(
            format!("  ⚠ {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    lines
}
