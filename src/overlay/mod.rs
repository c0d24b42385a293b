//! Floating spectrum window drawn on top of the player.
//!
//! The window is borderless and always painted last, so it sits above every
//! other panel. Magnitude frames arrive on the audio thread through
//! [`OverlaySignals`] and reach the window only via the [`IdleQueue`], which
//! the UI loop drains with [`SpectrumOverlay::run_idle`].

pub mod geometry;
pub mod idle;
pub mod paint;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use log::{debug, warn};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use crate::audio::{Element, ElementId, ElementState, MusicPlayer, PipelineEvent, SpectrumElement};
use crate::config::{Config, OverlayConfig};
use geometry::{adjust_move_coordinate, BandLayout, DragMode, DragState, Geometry, Screen};
use idle::IdleQueue;
use paint::Layer;

/// Smallest window height that still shows a bar.
const MIN_HEIGHT: u16 = 2;

/// The thread-safe half of the overlay, connected to the player's bus.
#[derive(Clone)]
pub struct OverlaySignals {
    frames: Sender<Vec<f32>>,
    height_scale: Arc<AtomicU32>,
    spectrum: Option<(ElementId, Arc<Mutex<SpectrumElement>>)>,
}

impl OverlaySignals {
    pub fn handle(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::SpectrumData(magnitudes) => self.on_spectrum_data(magnitudes),
            PipelineEvent::FilterRemoved(id) => self.on_filter_removed(*id),
        }
    }

    /// Scale a magnitude frame to the current window height and queue it for
    /// the UI thread.
    pub fn on_spectrum_data(&self, magnitudes: &[f32]) {
        let scale = f32::from_bits(self.height_scale.load(Ordering::Relaxed));
        let frame = magnitudes.iter().map(|m| m * scale).collect();
        let _ = self.frames.send(frame);
    }

    /// Stop our own element once the player has detached it.
    pub fn on_filter_removed(&self, id: ElementId) {
        let Some((own, element)) = &self.spectrum else {
            return;
        };
        if *own != id {
            return;
        }
        if let Ok(mut element) = element.lock() {
            element.set_state(ElementState::Null);
        }
    }
}

/// The spectrum window.
pub struct SpectrumOverlay {
    config: OverlayConfig,
    spectrum: Option<(ElementId, Arc<Mutex<SpectrumElement>>)>,
    layout: BandLayout,
    /// Band count the window opens with
    natural_bands: usize,
    geometry: Geometry,
    screen: Screen,
    drag: DragState,
    visible: bool,
    /// Latest scaled frame, drawn on every redraw until superseded
    frame: Option<Vec<f32>>,
    idle: IdleQueue<Vec<f32>>,
    height_scale: Arc<AtomicU32>,
    redraw_pending: bool,
}

impl SpectrumOverlay {
    /// Create the window and its analysis element, and listen to `player`.
    ///
    /// If the player cannot make a spectrum element the window still exists
    /// but never receives data.
    pub fn new(player: &MusicPlayer, config: &Config) -> Self {
        let spectrum = match player.registry().make_spectrum(&config.spectrum) {
            Ok(element) => Some(element),
            Err(err) => {
                warn!("spectrum visualization disabled: {err:#}");
                None
            }
        };

        let overlay = Self::with_element(spectrum, config.overlay.clone(), config.spectrum.bands);
        let signals = overlay.signals();
        player.connect(move |event| signals.handle(event));
        overlay
    }

    /// Create the window around an already-made element (or none).
    pub fn with_element(
        spectrum: Option<Arc<Mutex<SpectrumElement>>>,
        config: OverlayConfig,
        bands: usize,
    ) -> Self {
        let spectrum = spectrum.and_then(|element| {
            let id = element.lock().ok()?.id();
            Some((id, element))
        });
        let layout = BandLayout::new(&config, bands);
        let height_scale = Arc::new(AtomicU32::new(layout.height_scale.to_bits()));

        Self {
            config,
            spectrum,
            layout,
            natural_bands: bands.max(1),
            geometry: Geometry::default(),
            screen: Screen::default(),
            drag: DragState::default(),
            visible: false,
            frame: None,
            idle: IdleQueue::new(),
            height_scale,
            redraw_pending: false,
        }
    }

    /// Handle for the audio side.
    pub fn signals(&self) -> OverlaySignals {
        OverlaySignals {
            frames: self.idle.sender(),
            height_scale: self.height_scale.clone(),
            spectrum: self.spectrum.clone(),
        }
    }

    /// Whether an analysis element exists.
    pub fn has_spectrum(&self) -> bool {
        self.spectrum.is_some()
    }

    pub fn spectrum_id(&self) -> Option<ElementId> {
        self.spectrum.as_ref().map(|(id, _)| *id)
    }

    /// Band count the element is currently configured with.
    pub fn spectrum_bands(&self) -> Option<usize> {
        let (_, element) = self.spectrum.as_ref()?;
        element.lock().ok().map(|e| e.bands())
    }

    pub fn spectrum_state(&self) -> Option<ElementState> {
        let (_, element) = self.spectrum.as_ref()?;
        element.lock().ok().map(|e| e.state())
    }

    /// Attach the analysis element to `player` and show the window.
    pub fn enable(&mut self, player: &MusicPlayer) {
        if let Some((_, element)) = &self.spectrum {
            player.add_filter(element.clone());
        }
        self.visible = true;
        self.redraw_pending = true;
    }

    /// Detach the analysis element from `player` and hide the window.
    pub fn disable(&mut self, player: &MusicPlayer) {
        if let Some((id, _)) = &self.spectrum {
            player.remove_filter(*id);
        }
        self.visible = false;
        self.drag.end();
        self.redraw_pending = true;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Pick up the newest frame queued by the audio thread.
    /// Returns true if a redraw was queued.
    pub fn run_idle(&mut self) -> bool {
        match self.idle.take_latest() {
            Some(frame) => {
                self.frame = Some(frame);
                self.redraw_pending = true;
                true
            }
            None => false,
        }
    }

    /// Consume the pending redraw request, if any.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_pending)
    }

    /// The frame the next redraw will paint.
    pub fn frame(&self) -> Option<&[f32]> {
        self.frame.as_deref()
    }

    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// The window was resized to `width` x `height` cells.
    pub fn configure(&mut self, width: u16, height: u16) {
        self.layout.configure(width, height);
        self.height_scale
            .store(self.layout.height_scale.to_bits(), Ordering::Relaxed);

        if let Some((_, element)) = &self.spectrum {
            if let Ok(mut element) = element.lock() {
                element.set_bands(self.layout.bands);
            }
        }
        debug!(
            "overlay configured {width}x{height}: {} bands, scale {:.3}",
            self.layout.bands, self.layout.height_scale
        );
        self.redraw_pending = true;
    }

    /// The screen changed size. The first call with a usable screen also
    /// places the window; an empty screen leaves the window as it was.
    pub fn set_screen(&mut self, width: u16, height: u16) {
        self.screen = Screen { width, height };
        if width == 0 || height == 0 {
            return;
        }

        let first = self.geometry.is_empty();
        let (want_w, want_h) = if first {
            (self.layout.width_for(self.natural_bands), self.config.height)
        } else {
            (self.geometry.width, self.geometry.height)
        };
        let size = (want_w.min(width), want_h.min(height));

        let (x, y) = if first {
            let x = (width - size.0) / 2;
            let y = height.saturating_sub(size.1 + 1);
            (x as i32, y as i32)
        } else {
            (self.geometry.x as i32, self.geometry.y as i32)
        };
        let (x, y) = adjust_move_coordinate(x, y, size, self.screen);

        let resized = first || size != (self.geometry.width, self.geometry.height);
        self.geometry = Geometry {
            x,
            y,
            width: size.0,
            height: size.1,
        };
        if resized {
            self.configure(size.0, size.1);
        }
        self.redraw_pending = true;
    }

    /// Pointer button pressed at screen cell `(col, row)`.
    /// Returns true if the window took the press.
    pub fn on_button_press(&mut self, button: MouseButton, col: u16, row: u16) -> bool {
        if !self.visible || button != MouseButton::Left || !self.geometry.contains(col, row) {
            return false;
        }
        if self.geometry.is_grip(col, row) {
            let size = (self.geometry.width, self.geometry.height);
            self.drag.start(DragMode::Resize, size, (col, row));
        } else {
            let origin = (self.geometry.x, self.geometry.y);
            self.drag.start(DragMode::Move, origin, (col, row));
        }
        true
    }

    /// Pointer moved to screen cell `(col, row)`.
    pub fn on_motion(&mut self, col: u16, row: u16) {
        let Some(mode) = self.drag.mode() else {
            return;
        };
        let (tx, ty) = self.drag.target(col, row);

        match mode {
            DragMode::Move => {
                let x = tx.max(0);
                let y = ty.max(0);
                let size = (self.geometry.width, self.geometry.height);
                let (x, y) = adjust_move_coordinate(x, y, size, self.screen);
                if (x, y) != (self.geometry.x, self.geometry.y) {
                    self.geometry.x = x;
                    self.geometry.y = y;
                    self.redraw_pending = true;
                }
            }
            DragMode::Resize => {
                let max_w = self.screen.width.saturating_sub(self.geometry.x);
                let max_h = self.screen.height.saturating_sub(self.geometry.y);
                let min_w = self.config.margin + self.layout.pitch();
                let width = clamp_len(tx, min_w, max_w);
                let height = clamp_len(ty, MIN_HEIGHT, max_h);
                if (width, height) != (self.geometry.width, self.geometry.height) {
                    self.geometry.width = width;
                    self.geometry.height = height;
                    self.configure(width, height);
                }
            }
        }
    }

    pub fn on_button_release(&mut self) {
        self.drag.end();
    }

    /// Route a terminal mouse event. Returns true if the window consumed it.
    pub fn handle_mouse(&mut self, event: MouseEvent) -> bool {
        match event.kind {
            MouseEventKind::Down(button) => self.on_button_press(button, event.column, event.row),
            MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                let dragging = self.drag.is_active();
                self.on_motion(event.column, event.row);
                dragging
            }
            MouseEventKind::Up(_) => {
                let dragging = self.drag.is_active();
                self.on_button_release();
                dragging
            }
            _ => false,
        }
    }

    /// Paint the bars over whatever is already in `buf`.
    pub fn paint(&self, buf: &mut Buffer) {
        if !self.visible || self.geometry.is_empty() {
            return;
        }
        let Some(data) = self.frame.as_deref() else {
            return;
        };

        let mut layer = Layer::new(self.geometry.rect());
        let height = self.layout.height as f32;
        let mut start = self.config.margin;
        for &magnitude in data.iter().take(self.layout.bands) {
            if height + magnitude > 0.0 {
                layer.fill_bar(start, self.layout.band_width, -magnitude, &self.config.stops);
            }
            start = start.saturating_add(self.layout.pitch());
        }
        layer.composite(buf, self.config.opacity, self.config.backdrop);
    }
}

impl Widget for &SpectrumOverlay {
    /// The overlay positions itself; `area` is ignored.
    fn render(self, _area: Rect, buf: &mut Buffer) {
        self.paint(buf);
    }
}

fn clamp_len(value: i32, min: u16, max: u16) -> u16 {
    let value = value.max(min as i32).min(max as i32).max(0);
    value as u16
}
