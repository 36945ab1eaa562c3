use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::super::view::EditorView;

pub(crate) fn render_footer(frame: &mut Frame<'_>, area: Rect, view: &EditorView<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let actions = Paragraph::new(format!("Keys: {}", view.help.unwrap_or(" ")))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(actions, rows[0]);

    let mut status = view.status.to_string();
    if view.dirty {
        status.push_str(" • unsaved changes");
    }
    let badge = if view.error_count > 0 {
        Span::styled(
            format!("[! {}]", view.error_count),
            Style::default().fg(Color::Red),
        )
    } else {
        Span::styled("[ok]", Style::default().fg(Color::Green))
    };
    let line = Line::from(vec![
        Span::raw("Status: "),
        if view.status_alert {
            Span::styled(status, Style::default().fg(Color::Red))
        } else {
            Span::raw(status)
        },
        Span::raw(" "),
        badge,
    ]);
    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), rows[1]);
}
