//! Application state management.

use std::{
    path::PathBuf,
    sync::mpsc::{Receiver, Sender},
    thread,
};

use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use log::{debug, warn};
use ratatui::{widgets::ListState, Frame};

use crate::{
    audio::{MusicPlayer, Registry, SpectrumElement, TrackMetadata},
    config::Config,
    fs::{load_entries, tail_path, Entry},
    plugin::SpectrumPlugin,
    ui::{
        keybindings::{key_to_action, NavigationAction},
        layout::{compute_layout, Panel, PanelVisibility},
        widgets::{render_file_list, render_player_panel, PlayerStatus},
    },
};

/// Main application state.
pub struct App {
    /// Current directory being browsed
    pub current_dir: PathBuf,
    pub entries: Vec<Entry>,
    /// List widget state
    pub state: ListState,
    pub selected: usize,

    pub player: MusicPlayer,
    /// Elapsed playback time in seconds
    pub elapsed: u64,
    /// Total track duration in seconds
    pub duration: u64,
    /// Index of currently playing track in entries (if any)
    pub current_track_index: Option<usize>,

    /// Metadata channel (background loader -> UI), tagged with the track
    /// generation the load was started for
    meta_tx: Sender<(u64, TrackMetadata)>,
    meta_rx: Receiver<(u64, TrackMetadata)>,
    /// Bumped on every play or stop; older metadata is dropped
    track_generation: u64,

    /// The spectrum overlay and its on/off switch
    pub spectrum: SpectrumPlugin,

    pub visibility: PanelVisibility,
}

impl App {
    /// Create the application browsing `dir`.
    pub fn new(dir: PathBuf, config: &Config) -> Result<Self> {
        let dir = dir.canonicalize()?;
        let mut state = ListState::default();
        state.select(Some(0));

        let registry = if config.without_spectrum {
            Registry::default().without(SpectrumElement::FACTORY)
        } else {
            Registry::default()
        };
        let player = MusicPlayer::with_registry(registry);
        let spectrum = SpectrumPlugin::new(&player, config);

        let (meta_tx, meta_rx) = std::sync::mpsc::channel::<(u64, TrackMetadata)>();

        Ok(Self {
            entries: load_entries(&dir),
            current_dir: dir,
            state,
            selected: 0,

            player,
            elapsed: 0,
            duration: 1,
            current_track_index: None,

            meta_tx,
            meta_rx,
            track_generation: 0,

            spectrum,
            visibility: PanelVisibility::default(),
        })
    }

    /// Handle a key event and return true if the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match key_to_action(&key) {
            NavigationAction::TogglePanel(d) => self.visibility.toggle(d),
            NavigationAction::Down => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
            }
            NavigationAction::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            NavigationAction::Enter => self.open_selected(),
            NavigationAction::TogglePause => {
                if self.player.is_paused() {
                    self.player.resume();
                } else {
                    self.player.pause();
                }
            }
            NavigationAction::Stop => {
                self.player.stop();
                self.elapsed = 0;
                self.current_track_index = None;
                self.track_generation += 1;
            }
            NavigationAction::NextTrack => self.play_adjacent_track(1),
            NavigationAction::PreviousTrack => self.play_adjacent_track(-1),
            NavigationAction::ToggleSpectrum => self.spectrum.toggle(&self.player),
            NavigationAction::Back => {
                if self.current_dir.pop() {
                    self.change_dir();
                }
            }
            NavigationAction::Quit => {
                self.spectrum.disable(&self.player);
                self.player.stop();
                return true;
            }
            NavigationAction::None => {}
        }

        self.state.select(Some(self.selected));
        false
    }

    /// Forward a mouse event to the overlay.
    pub fn on_mouse(&mut self, event: MouseEvent) {
        self.spectrum.overlay_mut().handle_mouse(event);
    }

    /// The terminal changed size.
    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.spectrum.overlay_mut().set_screen(width, height);
    }

    /// Run work queued for the UI thread. Returns true if a redraw is due.
    pub fn run_idle(&mut self) -> bool {
        self.process_metadata();
        let overlay = self.spectrum.overlay_mut();
        overlay.run_idle();
        overlay.take_redraw()
    }

    /// Draw the application UI. The overlay is painted last so it stays on top.
    pub fn draw(&mut self, f: &mut Frame<'_>) {
        for (panel, area) in compute_layout(f.area(), &self.visibility) {
            match panel {
                Panel::Files => {
                    let title = format!("1:  {}", tail_path(&self.current_dir, 3));
                    render_file_list(
                        f,
                        area,
                        &title,
                        &self.entries,
                        self.current_track_index,
                        &mut self.state,
                    );
                }
                Panel::Player => {
                    let status = PlayerStatus {
                        metadata: self.player.metadata.as_ref(),
                        elapsed: self.elapsed,
                        duration: self.duration,
                        is_playing: self.player.is_playing(),
                        is_paused: self.player.is_paused(),
                        spectrum_on: self.spectrum.is_enabled(),
                    };
                    render_player_panel(f, area, &status);
                }
            }
        }

        f.render_widget(self.spectrum.overlay(), f.area());
    }

    /// Process any pending metadata from background loader.
    pub fn process_metadata(&mut self) {
        while let Ok((generation, meta)) = self.meta_rx.try_recv() {
            if generation != self.track_generation {
                debug!("dropping metadata for an earlier track");
                continue;
            }
            self.duration = meta.duration_secs.max(1);
            self.player.metadata = Some(meta);
        }
    }

    /// Update elapsed time if playing.
    pub fn tick_elapsed(&mut self) {
        if self.player.is_playing() && !self.player.is_paused() {
            self.elapsed = (self.elapsed + 1).min(self.duration);
        }
    }

    fn change_dir(&mut self) {
        self.entries = load_entries(&self.current_dir);
        self.selected = 0;
        self.current_track_index = None;
    }

    fn open_selected(&mut self) {
        let Some(entry) = self.entries.get(self.selected) else {
            return;
        };
        if entry.is_dir() {
            self.current_dir.push(&entry.name);
            self.change_dir();
        } else if entry.category.is_playable() {
            self.play_entry(self.selected);
        }
    }

    fn play_entry(&mut self, index: usize) {
        let path = self.current_dir.join(&self.entries[index].name);
        if let Err(err) = self.player.play(&path) {
            warn!("cannot start playback: {err:#}");
            return;
        }

        self.track_generation += 1;
        self.player.metadata = None;
        self.elapsed = 0;
        self.duration = 1;
        self.current_track_index = Some(index);
        self.selected = index;
        self.state.select(Some(index));

        let tx = self.meta_tx.clone();
        let generation = self.track_generation;
        thread::spawn(move || match MusicPlayer::load_metadata(path) {
            Ok(meta) => {
                let _ = tx.send((generation, meta));
            }
            Err(err) => debug!("no metadata: {err:#}"),
        });
    }

    /// Play the next or previous audio track relative to the current one.
    /// `direction`: 1 for next, -1 for previous. Wraps around.
    fn play_adjacent_track(&mut self, direction: i32) {
        let audio_indices: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.category.is_playable())
            .map(|(i, _)| i)
            .collect();
        if audio_indices.is_empty() {
            return;
        }

        let len = audio_indices.len() as i32;
        let next_pos = match self
            .current_track_index
            .and_then(|idx| audio_indices.iter().position(|&i| i == idx))
        {
            Some(pos) => (pos as i32 + direction).rem_euclid(len),
            None if direction > 0 => 0,
            None => len - 1,
        };

        self.play_entry(audio_indices[next_pos as usize]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str, duration_secs: u64) -> TrackMetadata {
        TrackMetadata {
            title: Some(title.to_string()),
            duration_secs,
            ..TrackMetadata::default()
        }
    }

    #[test]
    fn metadata_for_an_earlier_track_is_dropped() {
        let mut app = App::new(std::env::temp_dir(), &Config::default()).unwrap();
        app.track_generation = 2;

        app.meta_tx.send((1, titled("old", 300))).unwrap();
        app.process_metadata();
        assert!(app.player.metadata.is_none());
        assert_eq!(app.duration, 1);

        app.meta_tx.send((2, titled("current", 120))).unwrap();
        app.meta_tx.send((1, titled("old", 300))).unwrap();
        app.process_metadata();
        let meta = app.player.metadata.as_ref().unwrap();
        assert_eq!(meta.title.as_deref(), Some("current"));
        assert_eq!(app.duration, 120);
    }
}
