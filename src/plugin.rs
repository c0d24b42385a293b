//! On/off entry points for the spectrum overlay.

use log::info;

use crate::audio::MusicPlayer;
use crate::config::Config;
use crate::overlay::SpectrumOverlay;

/// The spectrum feature as the player sees it: something to switch on and off.
pub struct SpectrumPlugin {
    overlay: SpectrumOverlay,
    enabled: bool,
}

impl SpectrumPlugin {
    pub fn new(player: &MusicPlayer, config: &Config) -> Self {
        Self::from_overlay(SpectrumOverlay::new(player, config))
    }

    pub fn from_overlay(overlay: SpectrumOverlay) -> Self {
        Self {
            overlay,
            enabled: false,
        }
    }

    /// Attach the analysis filter to `player` and show the overlay.
    pub fn enable(&mut self, player: &MusicPlayer) {
        if self.enabled {
            return;
        }
        self.overlay.enable(player);
        self.enabled = true;
        info!(
            "spectrum overlay enabled{}",
            if self.overlay.has_spectrum() { "" } else { " (no analyzer)" }
        );
    }

    /// Detach the analysis filter from `player` and hide the overlay.
    pub fn disable(&mut self, player: &MusicPlayer) {
        if !self.enabled {
            return;
        }
        self.overlay.disable(player);
        self.enabled = false;
        info!("spectrum overlay disabled");
    }

    pub fn toggle(&mut self, player: &MusicPlayer) {
        if self.enabled {
            self.disable(player);
        } else {
            self.enable(player);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn overlay(&self) -> &SpectrumOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut SpectrumOverlay {
        &mut self.overlay
    }
}
