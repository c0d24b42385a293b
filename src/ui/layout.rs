//! Layout computation for the player panels.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Visibility state for the player panels.
#[derive(Debug, Clone, Copy)]
pub struct PanelVisibility {
    pub files: bool,
    pub player: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            files: true,
            player: true,
        }
    }
}

impl PanelVisibility {
    /// Toggle a panel by number (1-2).
    pub fn toggle(&mut self, panel: usize) {
        match panel {
            1 => self.files = !self.files,
            2 => self.player = !self.player,
            _ => {}
        }
    }
}

/// Which panel a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Files,
    Player,
}

/// Split `area` into one column per visible panel.
///
/// The overlay floats above this layout and takes no room in it.
pub fn compute_layout(area: Rect, visibility: &PanelVisibility) -> Vec<(Panel, Rect)> {
    let mut panels = Vec::new();
    let mut weights = Vec::new();

    if visibility.files {
        panels.push(Panel::Files);
        weights.push(35u16);
    }
    if visibility.player {
        panels.push(Panel::Player);
        weights.push(65u16);
    }
    if panels.is_empty() {
        return Vec::new();
    }

    let sum: u16 = weights.iter().copied().sum();
    let constraints: Vec<Constraint> = weights
        .into_iter()
        .map(|w| Constraint::Percentage((w as u32 * 100 / sum as u32) as u16))
        .collect();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    panels.into_iter().zip(columns.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_panel_gives_its_room_away() {
        let area = Rect::new(0, 0, 100, 30);
        let mut visibility = PanelVisibility::default();
        assert_eq!(compute_layout(area, &visibility).len(), 2);

        visibility.toggle(1);
        let columns = compute_layout(area, &visibility);
        assert_eq!(columns, vec![(Panel::Player, area)]);

        visibility.toggle(2);
        assert!(compute_layout(area, &visibility).is_empty());
    }
}
