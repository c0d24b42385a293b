//! Gradient bars painted into an offscreen layer and composited onto a buffer.

use ratatui::{buffer::Buffer, layout::Rect, style::Color};

use crate::config::Rgb;

/// Glyphs for a cell whose lower `n` eighths are covered.
const EIGHTHS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Colour of a two-stop linear gradient at offset `t`.
///
/// Offsets before the first stop take its colour, offsets after the last
/// stop take the last one.
pub fn gradient_at(stops: &[(f32, Rgb); 2], t: f32) -> Rgb {
    let [(p0, c0), (p1, c1)] = *stops;
    if t <= p0 || p1 <= p0 {
        return c0;
    }
    if t >= p1 {
        return c1;
    }
    let f = (t - p0) / (p1 - p0);
    (
        c0.0 + (c1.0 - c0.0) * f,
        c0.1 + (c1.1 - c0.1) * f,
        c0.2 + (c1.2 - c0.2) * f,
    )
}

/// `src` painted over `dst` with the given opacity.
pub fn blend(src: Rgb, dst: Rgb, alpha: f32) -> Rgb {
    let a = alpha.clamp(0.0, 1.0);
    (
        src.0 * a + dst.0 * (1.0 - a),
        src.1 * a + dst.1 * (1.0 - a),
        src.2 * a + dst.2 * (1.0 - a),
    )
}

pub fn to_color(rgb: Rgb) -> Color {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb(channel(rgb.0), channel(rgb.1), channel(rgb.2))
}

/// True-colour components of `color`, if it has any.
pub fn from_color(color: Color) -> Option<Rgb> {
    match color {
        Color::Rgb(r, g, b) => Some((r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)),
        _ => None,
    }
}

/// Offscreen group the bars are drawn into before compositing.
pub struct Layer {
    area: Rect,
    cells: Vec<Option<(char, Rgb)>>,
}

impl Layer {
    /// An empty (fully transparent) layer covering `area`.
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            cells: vec![None; area.width as usize * area.height as usize],
        }
    }

    /// Painted cell at layer-relative `(x, y)`.
    pub fn get(&self, x: u16, y: u16) -> Option<(char, Rgb)> {
        if x >= self.area.width || y >= self.area.height {
            return None;
        }
        self.cells[y as usize * self.area.width as usize + x as usize]
    }

    /// Fill a bar `width` cells wide at column `x` reaching from `top` (rows
    /// below the layer's top edge, fractional) down to the layer's bottom.
    ///
    /// The gradient runs from the bar's top to its bottom.
    pub fn fill_bar(&mut self, x: u16, width: u16, top: f32, stops: &[(f32, Rgb); 2]) {
        let bottom = self.area.height as f32;
        let length = bottom - top;
        if length <= 0.0 {
            return;
        }

        for row in 0..self.area.height {
            let coverage = (row as f32 + 1.0 - top).clamp(0.0, 1.0);
            let eighths = (coverage * 8.0).round() as usize;
            if eighths == 0 {
                continue;
            }
            let center = row as f32 + 1.0 - coverage / 2.0;
            let color = gradient_at(stops, (center - top) / length);

            for col in x..x.saturating_add(width).min(self.area.width) {
                let idx = row as usize * self.area.width as usize + col as usize;
                self.cells[idx] = Some((EIGHTHS[eighths], color));
            }
        }
    }

    /// Paint the layer onto `buf` with the given opacity.
    ///
    /// Unpainted cells leave `buf` untouched. Painted cells are blended
    /// against the cell's background, or `backdrop` when that is not a true
    /// colour.
    pub fn composite(&self, buf: &mut Buffer, alpha: f32, backdrop: Rgb) {
        for y in 0..self.area.height {
            for x in 0..self.area.width {
                let Some((glyph, color)) = self.get(x, y) else {
                    continue;
                };
                let pos = (self.area.x.saturating_add(x), self.area.y.saturating_add(y));
                if let Some(cell) = buf.cell_mut(pos) {
                    let under = from_color(cell.bg).unwrap_or(backdrop);
                    cell.set_char(glyph).set_fg(to_color(blend(color, under, alpha)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AMBER_STOPS;
    use ratatui::style::Style;

    #[test]
    fn gradient_pads_outside_its_stops() {
        assert_eq!(gradient_at(&AMBER_STOPS, 0.0), AMBER_STOPS[0].1);
        assert_eq!(gradient_at(&AMBER_STOPS, 1.0), AMBER_STOPS[1].1);

        let mid = gradient_at(&AMBER_STOPS, 0.55);
        assert!(mid.1 < AMBER_STOPS[0].1 .1 && mid.1 > AMBER_STOPS[1].1 .1);
    }

    #[test]
    fn half_opacity_averages_colours() {
        assert_eq!(blend((1.0, 0.0, 0.5), (0.0, 1.0, 0.5), 0.5), (0.5, 0.5, 0.5));
        assert_eq!(to_color((1.0, 0.5, 0.0)), Color::Rgb(255, 128, 0));
        assert_eq!(from_color(Color::Rgb(255, 0, 0)), Some((1.0, 0.0, 0.0)));
        assert_eq!(from_color(Color::Reset), None);
    }

    #[test]
    fn bar_reaches_the_bottom_with_a_partial_top() {
        let mut layer = Layer::new(Rect::new(0, 0, 4, 4));
        layer.fill_bar(1, 2, 1.5, &AMBER_STOPS);

        assert_eq!(layer.get(1, 0), None);
        assert_eq!(layer.get(1, 1).map(|c| c.0), Some('▄'));
        assert_eq!(layer.get(2, 2).map(|c| c.0), Some('█'));
        assert_eq!(layer.get(1, 3).map(|c| c.0), Some('█'));
        assert_eq!(layer.get(0, 3), None);
        assert_eq!(layer.get(3, 3), None);
    }

    #[test]
    fn bars_are_clipped_to_the_layer() {
        let mut layer = Layer::new(Rect::new(0, 0, 3, 2));
        layer.fill_bar(2, 5, -1.0, &AMBER_STOPS);
        assert!(layer.get(2, 0).is_some());
        assert_eq!(layer.get(3, 0), None);

        layer.fill_bar(0, 1, 2.0, &AMBER_STOPS);
        assert_eq!(layer.get(0, 1), None);
    }

    #[test]
    fn composite_blends_and_leaves_the_rest_alone() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 3));
        buf.set_string(0, 0, "player", Style::default());

        let mut layer = Layer::new(Rect::new(2, 1, 2, 2));
        layer.fill_bar(0, 1, 0.0, &[(0.0, (1.0, 1.0, 1.0)), (1.0, (1.0, 1.0, 1.0))]);
        layer.composite(&mut buf, 0.5, (0.0, 0.0, 0.0));

        assert_eq!(buf[(0, 0)].symbol(), "p");
        assert_eq!(buf[(2, 1)].symbol(), "█");
        assert_eq!(buf[(2, 1)].fg, Color::Rgb(128, 128, 128));
        assert_eq!(buf[(3, 1)].symbol(), " ");
    }
}
