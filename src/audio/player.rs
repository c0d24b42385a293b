//! Music playback engine using rodio, with a filter chain tapped off the output.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rodio::{Decoder, OutputStream, Sink, Source};

use super::metadata::{load_metadata, TrackMetadata};
use super::pipeline::{Bus, ElementId, FilterChain, PipelineEvent, PipelineTap, Registry, SharedElement};

/// Commands sent to the audio playback thread.
enum PlayerCommand {
    Play(PathBuf),
    Pause,
    Resume,
    Stop,
}

/// Player that can `play()`, `pause()`, `resume()`, or `stop()` a file.
///
/// Filters attached with [`MusicPlayer::add_filter`] see every decoded sample
/// of every track until they are removed again.
pub struct MusicPlayer {
    /// Sender to the audio thread for commands
    cmd_tx: Sender<PlayerCommand>,
    /// Flags mirrored from the audio thread for quick UI access
    is_playing_flag: Arc<AtomicBool>,
    is_paused_flag: Arc<AtomicBool>,
    /// Most-recent metadata (if any).
    pub metadata: Option<TrackMetadata>,
    filters: FilterChain,
    bus: Bus,
    registry: Registry,
}

impl MusicPlayer {
    /// Create an idle player with the default element registry.
    pub fn new() -> Self {
        Self::with_registry(Registry::default())
    }

    /// Create an idle player whose elements come from `registry`.
    pub fn with_registry(registry: Registry) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCommand>();

        let is_playing_flag = Arc::new(AtomicBool::new(false));
        let is_paused_flag = Arc::new(AtomicBool::new(false));
        let filters = FilterChain::new();
        let bus = Bus::new();

        let ap = is_playing_flag.clone();
        let az = is_paused_flag.clone();
        let chain = filters.clone();
        let tap_bus = bus.clone();

        // The audio thread owns the OutputStream for its whole life.
        thread::spawn(move || {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(err) => {
                    warn!("no audio output available: {err}");
                    while rx.recv().is_ok() {}
                    return;
                }
            };
            let mut sink: Option<Sink> = None;

            while let Ok(cmd) = rx.recv() {
                match cmd {
                    PlayerCommand::Play(path) => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }

                        let opened = Sink::try_new(&handle)
                            .context("creating sink")
                            .and_then(|new_sink| {
                                let source = open_source(&path)?;
                                new_sink.append(PipelineTap::new(source, chain.clone(), tap_bus.clone()));
                                Ok(new_sink)
                            });
                        match opened {
                            Ok(new_sink) => {
                                new_sink.play();
                                ap.store(true, Ordering::SeqCst);
                                az.store(false, Ordering::SeqCst);
                                sink = Some(new_sink);
                                info!("playing {}", path.display());
                            }
                            Err(err) => {
                                ap.store(false, Ordering::SeqCst);
                                warn!("cannot play {}: {err:#}", path.display());
                            }
                        }
                    }
                    PlayerCommand::Pause => {
                        if let Some(s) = &sink {
                            s.pause();
                            az.store(true, Ordering::SeqCst);
                        }
                    }
                    PlayerCommand::Resume => {
                        if let Some(s) = &sink {
                            s.play();
                            az.store(false, Ordering::SeqCst);
                        }
                    }
                    PlayerCommand::Stop => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        ap.store(false, Ordering::SeqCst);
                        az.store(false, Ordering::SeqCst);
                    }
                }
            }
            if let Some(s) = sink.take() {
                s.stop();
            }
            drop(stream);
        });

        Self {
            cmd_tx: tx,
            is_playing_flag,
            is_paused_flag,
            metadata: None,
            filters,
            bus,
            registry,
        }
    }

    /// Stop any existing playback and start playing `path`.
    pub fn play(&mut self, path: &Path) -> Result<()> {
        self.cmd_tx
            .send(PlayerCommand::Play(path.to_path_buf()))
            .context("audio thread has exited")
    }

    /// Load metadata for `path` without touching player state. This is safe to call
    /// from a background thread.
    pub fn load_metadata(path: PathBuf) -> Result<TrackMetadata> {
        load_metadata(path)
    }

    pub fn pause(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Pause);
    }

    pub fn resume(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Resume);
    }

    pub fn stop(&mut self) {
        let _ = self.cmd_tx.send(PlayerCommand::Stop);
    }

    /// Returns true if there's an active sink (i.e. playing or paused).
    pub fn is_playing(&self) -> bool {
        self.is_playing_flag.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused_flag.load(Ordering::SeqCst)
    }

    /// Element factories this player can instantiate.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Attach `element` to the output and start it.
    pub fn add_filter(&self, element: SharedElement) {
        let name = element.lock().map(|e| e.name().to_owned()).unwrap_or_default();
        if self.filters.add(element) {
            debug!("filter '{name}' attached ({} total)", self.filters.len());
        }
    }

    /// Detach the element with `id` and announce it on the bus.
    pub fn remove_filter(&self, id: ElementId) {
        if let Some(element) = self.filters.remove(id) {
            let name = element.lock().map(|e| e.name().to_owned()).unwrap_or_default();
            debug!("filter '{name}' ({id:?}) detached");
            self.bus.emit(&PipelineEvent::FilterRemoved(id));
        }
    }

    pub fn has_filter(&self, id: ElementId) -> bool {
        self.filters.contains(id)
    }

    /// Register a handler for pipeline signals.
    pub fn connect<F>(&self, handler: F)
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.bus.connect(handler);
    }
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self::new()
    }
}

fn open_source(path: &Path) -> Result<impl Source<Item = f32> + Send + use<>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let decoder = Decoder::new(BufReader::new(file)).context("decoding")?;
    Ok(decoder.convert_samples::<f32>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::pipeline::{Element, ElementState};
    use crate::audio::SpectrumElement;
    use crate::config::SpectrumConfig;
    use std::sync::Mutex;

    #[test]
    fn removing_a_filter_announces_it_once() {
        let player = MusicPlayer::new();
        let removed = Arc::new(Mutex::new(Vec::new()));
        let log = removed.clone();
        player.connect(move |event| {
            if let PipelineEvent::FilterRemoved(id) = event {
                log.lock().unwrap().push(*id);
            }
        });

        let element = Arc::new(Mutex::new(SpectrumElement::new(&SpectrumConfig::default())));
        let id = element.lock().unwrap().id();
        player.add_filter(element.clone());
        assert!(player.has_filter(id));
        assert_eq!(element.lock().unwrap().state(), ElementState::Playing);

        player.remove_filter(id);
        player.remove_filter(id);
        assert!(!player.has_filter(id));
        assert_eq!(*removed.lock().unwrap(), vec![id]);
    }

    #[test]
    fn playing_a_missing_file_is_not_fatal() {
        let mut player = MusicPlayer::new();
        assert!(player.play(Path::new("/definitely/not/here.ogg")).is_ok());
    }
}
