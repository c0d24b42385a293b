//! Configuration for the spectrum overlay and its analysis element.
//!
//! There is no config file; defaults live here and the command line can
//! override a few of them.

use std::time::Duration;

/// An RGB colour with components in `0.0..=1.0`.
pub type Rgb = (f32, f32, f32);

/// Amber gradient stops painted from the top of each bar to its bottom.
pub const AMBER_STOPS: [(f32, Rgb); 2] = [
    (0.3, (1.0, 0.917_647_1, 0.576_470_6)),
    (0.8, (1.0, 0.839_215_7, 0.192_156_87)),
];

/// Settings for the spectrum analysis element.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumConfig {
    /// Initial number of frequency bands. Recomputed on every overlay resize.
    pub bands: usize,

    /// Floor, in dB, for reported magnitudes.
    /// Anything quieter is reported as exactly this value.
    pub threshold_db: i32,

    /// Whether the element posts magnitude frames on the bus.
    pub post_messages: bool,

    /// How much audio is averaged into one magnitude frame.
    pub interval: Duration,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            bands: 32,
            threshold_db: -80,
            post_messages: true,
            interval: Duration::from_millis(100),
        }
    }
}

/// Settings for the overlay window.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    /// Width of one bar in cells.
    pub band_width: u16,

    /// Gap between two bars in cells.
    pub band_interval: u16,

    /// Initial window height in rows.
    pub height: u16,

    /// Divisor turning the window height into the magnitude scale.
    /// A magnitude of `-atom` dB draws a zero-height bar.
    pub atom: f32,

    /// Blank columns before the first bar.
    pub margin: u16,

    /// Opacity of the bar layer when composited onto the player.
    pub opacity: f32,

    /// Colour assumed behind cells whose background is not a true colour.
    pub backdrop: Rgb,

    /// Gradient stops, `(offset, colour)`, top to bottom of a bar.
    pub stops: [(f32, Rgb); 2],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            band_width: 2,
            band_interval: 1,
            height: 8,
            atom: 64.0,
            margin: 1,
            opacity: 0.5,
            backdrop: (0.0, 0.0, 0.0),
            stops: AMBER_STOPS,
        }
    }
}

/// Everything the application needs at startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub overlay: OverlayConfig,
    pub spectrum: SpectrumConfig,
    /// Leave the spectrum factory out of the element registry.
    pub without_spectrum: bool,
}
