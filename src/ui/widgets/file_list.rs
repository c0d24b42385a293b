//! File browser list widget.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::fs::Entry;
use crate::ui::icons::icon_for;

/// Render the file browser list. The entry at `playing`, if any, is highlighted.
pub fn render_file_list(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    entries: &[Entry],
    playing: Option<usize>,
    state: &mut ListState,
) {
    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let item = ListItem::new(format!("{} {}", icon_for(entry.category), entry.name));
            if Some(i) == playing {
                item.style(Style::default().fg(Color::Yellow))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, state);
}
