//! Player information panel widget.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::audio::TrackMetadata;

/// Playback state shown by the panel.
pub struct PlayerStatus<'a> {
    pub metadata: Option<&'a TrackMetadata>,
    pub elapsed: u64,
    pub duration: u64,
    pub is_playing: bool,
    pub is_paused: bool,
    pub spectrum_on: bool,
}

/// Render the player information panel.
pub fn render_player_panel(f: &mut Frame<'_>, area: Rect, status: &PlayerStatus<'_>) {
    f.render_widget(
        Block::default().borders(Borders::ALL).title("2: Player"),
        area,
    );

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    let text = match status.metadata {
        Some(meta) => meta.display_lines().join("\n"),
        None => "No track playing".to_string(),
    };
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner[0]);

    let play_pause_icon = if !status.is_playing {
        Span::styled(" ⏵ ", Style::default().fg(Color::Gray))
    } else if status.is_paused {
        Span::styled(" ⏵ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(" ⏸ ", Style::default().fg(Color::Green))
    };
    let spectrum_style = if status.spectrum_on {
        Style::default().fg(Color::Rgb(255, 214, 49))
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let controls = Line::from(vec![
        Span::styled(" ⏮ ", Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(" ⏹ ", Style::default().fg(Color::Red)),
        Span::raw(" "),
        play_pause_icon,
        Span::raw(" "),
        Span::styled(" ⏭ ", Style::default().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled("▁▃▅▇ v", spectrum_style),
    ]);
    f.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center),
        inner[1],
    );

    let duration = status.duration.max(1);
    let ratio = (status.elapsed as f64 / duration as f64).clamp(0.0, 1.0);
    let time_label = format!(
        "{:02}:{:02} / {:02}:{:02}",
        status.elapsed / 60,
        status.elapsed % 60,
        duration / 60,
        duration % 60
    );
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC))
            .ratio(ratio)
            .label(time_label),
        inner[2],
    );
}
