use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::rows::FieldRow;

use super::components::{render_fields, render_footer, render_tab_strip};

pub(crate) struct EditorView<'a> {
    pub title: &'a str,
    pub editing: bool,
    pub tab_titles: &'a [String],
    pub active_tab: usize,
    pub rows: &'a [FieldRow],
    pub focus: usize,
    pub status: &'a str,
    pub status_alert: bool,
    pub dirty: bool,
    pub error_count: usize,
    pub help: Option<&'a str>,
}

pub(crate) fn draw(frame: &mut Frame<'_>, view: &EditorView<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let heading = if view.editing {
        format!("Edit {}", view.title)
    } else {
        format!("New {}", view.title)
    };
    render_tab_strip(frame, chunks[0], view.tab_titles, view.active_tab, &heading);
    render_fields(frame, chunks[1], view.rows, view.focus);
    render_footer(frame, chunks[2], view);
}
