//! Window placement, band layout and drag bookkeeping for the overlay.

use ratatui::layout::Rect;

use crate::config::OverlayConfig;

/// Size of the area the overlay lives in, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Screen {
    pub width: u16,
    pub height: u16,
}

/// Position and size of the overlay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Geometry {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x
            && row >= self.y
            && (col - self.x) < self.width
            && (row - self.y) < self.height
    }

    /// The bottom-right cell, which works as a resize grip.
    pub fn is_grip(&self, col: u16, row: u16) -> bool {
        !self.is_empty()
            && col == self.x + self.width - 1
            && row == self.y + self.height - 1
    }
}

/// Keep a window of `size` placed at `(x, y)` from crossing the screen's
/// right and bottom edges.
pub fn adjust_move_coordinate(x: i32, y: i32, size: (u16, u16), screen: Screen) -> (u16, u16) {
    let (w, h) = (size.0 as i32, size.1 as i32);
    let (screen_w, screen_h) = (screen.width as i32, screen.height as i32);

    let mut x = x;
    let mut y = y;
    if x + w > screen_w {
        x = screen_w - w;
    }
    if y + h > screen_h {
        y = screen_h - h;
    }
    (x.max(0) as u16, y.max(0) as u16)
}

/// Band count and vertical scale, derived from the window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandLayout {
    pub bands: usize,
    pub band_width: u16,
    pub band_interval: u16,
    pub height: u16,
    /// Multiplier applied to incoming magnitudes
    pub height_scale: f32,
    atom: f32,
}

impl BandLayout {
    pub fn new(config: &OverlayConfig, bands: usize) -> Self {
        Self {
            bands,
            band_width: config.band_width,
            band_interval: config.band_interval,
            height: config.height,
            height_scale: config.height as f32 / config.atom,
            atom: config.atom,
        }
    }

    pub fn pitch(&self) -> u16 {
        self.band_width + self.band_interval
    }

    /// Width that shows every band.
    pub fn natural_width(&self) -> u16 {
        self.width_for(self.bands)
    }

    /// Width that shows `bands` bands.
    pub fn width_for(&self, bands: usize) -> u16 {
        let width = self.pitch() as usize * bands;
        width.min(u16::MAX as usize) as u16
    }

    /// Recompute from a new window size.
    pub fn configure(&mut self, width: u16, height: u16) {
        self.height = height;
        self.height_scale = height as f32 / self.atom;
        self.bands = match self.pitch() {
            0 => 0,
            pitch => (width / pitch) as usize,
        };
    }
}

/// What an in-progress pointer drag does to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    Resize,
}

/// Pointer drag, live between a press and its release.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragState {
    mode: Option<DragMode>,
    /// Window position (move) or size (resize) at press time
    origin: (i32, i32),
    /// Pointer position at press time
    pointer: (i32, i32),
}

impl DragState {
    pub fn start(&mut self, mode: DragMode, origin: (u16, u16), pointer: (u16, u16)) {
        self.mode = Some(mode);
        self.origin = (origin.0 as i32, origin.1 as i32);
        self.pointer = (pointer.0 as i32, pointer.1 as i32);
    }

    pub fn end(&mut self) {
        self.mode = None;
    }

    pub fn mode(&self) -> Option<DragMode> {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }

    /// Origin shifted by how far the pointer moved since the press.
    pub fn target(&self, col: u16, row: u16) -> (i32, i32) {
        (
            self.origin.0 + (col as i32 - self.pointer.0),
            self.origin.1 + (row as i32 - self.pointer.1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Screen = Screen {
        width: 100,
        height: 40,
    };

    #[test]
    fn window_is_pushed_back_from_right_and_bottom_edges() {
        assert_eq!(adjust_move_coordinate(90, 35, (20, 10), SCREEN), (80, 30));
        assert_eq!(adjust_move_coordinate(10, 5, (20, 10), SCREEN), (10, 5));
        assert_eq!(adjust_move_coordinate(80, 30, (20, 10), SCREEN), (80, 30));
    }

    #[test]
    fn oversized_window_sticks_to_origin() {
        assert_eq!(adjust_move_coordinate(5, 5, (120, 50), SCREEN), (0, 0));
        assert_eq!(adjust_move_coordinate(-3, -1, (10, 10), SCREEN), (0, 0));
    }

    #[test]
    fn configure_derives_bands_and_scale() {
        let mut layout = BandLayout::new(&OverlayConfig::default(), 32);
        assert_eq!(layout.natural_width(), 96);

        layout.configure(50, 16);
        assert_eq!(layout.bands, 16);
        assert_eq!(layout.height, 16);
        assert_eq!(layout.height_scale, 0.25);

        layout.configure(2, 4);
        assert_eq!(layout.bands, 0);
    }

    #[test]
    fn grip_is_the_bottom_right_cell() {
        let g = Geometry {
            x: 10,
            y: 5,
            width: 6,
            height: 3,
        };
        assert!(g.contains(10, 5));
        assert!(g.contains(15, 7));
        assert!(!g.contains(16, 7));
        assert!(!g.contains(9, 5));
        assert!(g.is_grip(15, 7));
        assert!(!g.is_grip(14, 7));
        assert!(!Geometry::default().is_grip(0, 0));
    }

    #[test]
    fn drag_target_follows_pointer_delta() {
        let mut drag = DragState::default();
        assert!(!drag.is_active());
        drag.start(DragMode::Move, (20, 10), (25, 12));
        assert_eq!(drag.mode(), Some(DragMode::Move));
        assert_eq!(drag.target(30, 11), (25, 9));
        assert_eq!(drag.target(0, 0), (-5, -2));
        drag.end();
        assert!(!drag.is_active());
    }
}
