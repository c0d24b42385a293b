use std::sync::{Arc, Mutex};

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use amberbars::audio::{Bus, Element, ElementState, MusicPlayer, SpectrumElement};
use amberbars::config::{Config, OverlayConfig, SpectrumConfig};
use amberbars::overlay::SpectrumOverlay;
use amberbars::plugin::SpectrumPlugin;

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

/// Overlay on a 120x40 screen, enabled on a fresh player.
fn shown_overlay() -> (MusicPlayer, SpectrumOverlay, Arc<Mutex<SpectrumElement>>) {
    let player = MusicPlayer::new();
    let element = Arc::new(Mutex::new(SpectrumElement::new(&SpectrumConfig::default())));
    let mut overlay = SpectrumOverlay::with_element(Some(element.clone()), OverlayConfig::default(), 32);
    overlay.set_screen(120, 40);
    overlay.enable(&player);
    (player, overlay, element)
}

#[test]
fn only_the_newest_frame_is_drawn() {
    let (_player, mut overlay, _) = shown_overlay();
    let signals = overlay.signals();

    // height 8 / atom 64 -> scale 0.125
    signals.on_spectrum_data(&[-64.0; 32]);
    signals.on_spectrum_data(&[-16.0; 32]);
    assert!(overlay.run_idle());
    assert!(!overlay.run_idle());

    assert_eq!(overlay.frame().map(|f| f[0]), Some(-2.0));
}

#[test]
fn bars_are_painted_at_half_opacity_from_the_left_margin() {
    let (_player, mut overlay, _) = shown_overlay();
    let g = overlay.geometry();
    overlay.signals().on_spectrum_data(&[0.0, -64.0, -32.0]);
    overlay.run_idle();

    let mut buf = Buffer::empty(Rect::new(0, 0, 120, 40));
    overlay.paint(&mut buf);

    let bottom = g.y + g.height - 1;
    // Margin column stays clear.
    assert_eq!(buf[(g.x, bottom)].symbol(), " ");
    // First bar: full height, two columns wide.
    assert_eq!(buf[(g.x + 1, g.y)].symbol(), "█");
    assert_eq!(buf[(g.x + 2, bottom)].symbol(), "█");
    assert_eq!(buf[(g.x + 3, bottom)].symbol(), " ");
    // Second bar is at -atom dB and has no height.
    assert_eq!(buf[(g.x + 4, bottom)].symbol(), " ");
    // Third bar covers the lower half.
    assert_eq!(buf[(g.x + 7, g.y + 3)].symbol(), " ");
    assert_eq!(buf[(g.x + 7, g.y + 4)].symbol(), "█");

    // Bottom of a bar is the darker amber stop blended with black.
    match buf[(g.x + 1, bottom)].fg {
        Color::Rgb(r, g, _) => assert_eq!((r, g), (128, 107)),
        other => panic!("expected a true colour, got {other:?}"),
    }
}

#[test]
fn hidden_overlay_paints_nothing() {
    let (player, mut overlay, _) = shown_overlay();
    overlay.signals().on_spectrum_data(&[0.0; 32]);
    overlay.run_idle();
    overlay.disable(&player);

    let mut buf = Buffer::empty(Rect::new(0, 0, 120, 40));
    (&overlay).render(buf.area, &mut buf);
    assert_eq!(buf, Buffer::empty(Rect::new(0, 0, 120, 40)));
}

#[test]
fn dragging_never_leaves_the_screen() {
    let (_player, mut overlay, _) = shown_overlay();
    let g = overlay.geometry();

    assert!(overlay.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), g.x + 1, g.y + 1)));
    overlay.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 119, 39));
    let moved = overlay.geometry();
    assert_eq!((moved.x + moved.width, moved.y + moved.height), (120, 40));

    overlay.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 0, 0));
    assert_eq!((overlay.geometry().x, overlay.geometry().y), (0, 0));

    overlay.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 0, 0));
    overlay.handle_mouse(mouse(MouseEventKind::Moved, 50, 20));
    assert_eq!((overlay.geometry().x, overlay.geometry().y), (0, 0));
}

#[test]
fn analysis_frames_flow_from_element_to_window() {
    let (_player, mut overlay, element) = shown_overlay();
    let bus = Bus::new();
    let signals = overlay.signals();
    bus.connect(move |event| signals.handle(event));

    let rate = 44_100;
    let tone: Vec<f32> = (0..rate / 10)
        .map(|n| 0.5 * (2.0 * std::f32::consts::PI * 1_000.0 * n as f32 / rate as f32).sin())
        .collect();
    element.lock().unwrap().process(&tone, 1, rate as u32, &bus);

    assert!(overlay.run_idle());
    let frame = overlay.frame().unwrap();
    assert_eq!(frame.len(), 32);
    // Scaled by 8 / 64 from a [-80, 0] dB range.
    assert!(frame.iter().all(|&m| (-10.0..=0.0).contains(&m)));
}

#[test]
fn disabling_stops_the_element() {
    let player = MusicPlayer::new();
    let mut plugin = SpectrumPlugin::new(&player, &Config::default());
    plugin.enable(&player);
    let id = plugin.overlay().spectrum_id().unwrap();
    assert!(player.has_filter(id));
    assert_eq!(plugin.overlay().spectrum_state(), Some(ElementState::Playing));

    plugin.disable(&player);
    assert!(!player.has_filter(id));
    assert_eq!(plugin.overlay().spectrum_state(), Some(ElementState::Null));
    assert_eq!(plugin.overlay().spectrum_bands(), Some(32));
}

#[test]
fn resize_pushes_band_count_to_element() {
    let (_player, mut overlay, element) = shown_overlay();
    overlay.configure(45, 16);
    assert_eq!(overlay.layout().bands, 15);
    assert_eq!(overlay.layout().height_scale, 0.25);
    assert_eq!(element.lock().unwrap().bands(), 15);
    assert_eq!(element.lock().unwrap().state(), ElementState::Playing);
}
