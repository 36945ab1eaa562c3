use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
};
use unicode_width::UnicodeWidthStr;

const LEFT_CHEVRON: &str = "≪";
const RIGHT_CHEVRON: &str = "≫";
// divider plus the padding Tabs puts around each title
const TAB_CHROME: usize = 3;

pub(crate) fn render_tab_strip(
    frame: &mut Frame<'_>,
    area: Rect,
    titles: &[String],
    selected: usize,
    heading: &str,
) {
    let block = Block::default().title(heading.to_string()).borders(Borders::ALL);
    if titles.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let selected = selected.min(titles.len() - 1);
    let labels: Vec<String> = titles
        .iter()
        .enumerate()
        .map(|(index, title)| format!("{}. {title}", index + 1))
        .collect();
    let widths: Vec<usize> = labels
        .iter()
        .map(|label| UnicodeWidthStr::width(label.as_str()) + TAB_CHROME)
        .collect();
    let available = area.width.saturating_sub(2) as usize;
    let (start, end) = visible_range(&widths, selected, available);

    let muted = Style::default().fg(Color::DarkGray);
    let lines: Vec<Line<'_>> = labels[start..end]
        .iter()
        .enumerate()
        .map(|(offset, label)| {
            let index = start + offset;
            let mut spans = Vec::with_capacity(3);
            if index == start && start > 0 {
                spans.push(Span::styled(format!("{LEFT_CHEVRON} "), muted));
            }
            spans.push(Span::raw(label.clone()));
            if index + 1 == end && end < labels.len() {
                spans.push(Span::styled(format!(" {RIGHT_CHEVRON}"), muted));
            }
            Line::from(spans)
        })
        .collect();

    let tabs = Tabs::new(lines)
        .block(block)
        .select(selected - start)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

/// Widest run of tabs around `selected` that fits; the selected tab is
/// always included even when it alone overflows.
fn visible_range(widths: &[usize], selected: usize, available: usize) -> (usize, usize) {
    let mut start = selected;
    let mut end = selected + 1;
    let mut used = widths[selected];
    loop {
        let mut grew = false;
        if end < widths.len() && used + widths[end] <= available {
            used += widths[end];
            end += 1;
            grew = true;
        }
        if start > 0 && used + widths[start - 1] <= available {
            start -= 1;
            used += widths[start];
            grew = true;
        }
        if !grew {
            return (start, end);
        }
    }
}
