//! Filter plumbing between the playback thread and analysis elements.
//!
//! Decoded samples flow through a [`PipelineTap`], which hands them in blocks
//! to every element attached to the [`FilterChain`]. Elements talk back to
//! the rest of the program through the [`Bus`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use rodio::Source;

use super::spectrum::SpectrumElement;
use crate::config::SpectrumConfig;

/// Number of frames collected by the tap before the chain is fed.
const TAP_BLOCK_FRAMES: usize = 512;

/// Unique identity of a pipeline element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

impl ElementId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Processing state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// Stopped: input is ignored and nothing is accumulated.
    Null,
    Playing,
}

/// Signals raised by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// One magnitude frame, in dB per band.
    SpectrumData(Vec<f32>),
    /// An element was detached from the filter chain.
    FilterRemoved(ElementId),
}

/// A connected signal handler.
pub type Handler = Arc<dyn Fn(&PipelineEvent) + Send + Sync>;

/// Signal bus. Handlers run on whichever thread emits.
#[derive(Clone, Default)]
pub struct Bus {
    handlers: Arc<Mutex<Vec<Handler>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every future event.
    pub fn connect<F>(&self, handler: F)
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.push(Arc::new(handler));
        }
    }

    /// Deliver `event` to all handlers.
    ///
    /// The handler list is copied out first so a handler may lock elements
    /// or connect further handlers without deadlocking.
    pub fn emit(&self, event: &PipelineEvent) {
        let handlers: Vec<Handler> = match self.handlers.lock() {
            Ok(handlers) => handlers.clone(),
            Err(_) => return,
        };
        for handler in handlers {
            handler(event);
        }
    }
}

/// A filter that can be attached to the player's output.
pub trait Element: Send {
    fn id(&self) -> ElementId;

    /// Factory name of the element.
    fn name(&self) -> &str;

    fn state(&self) -> ElementState;

    fn set_state(&mut self, state: ElementState);

    /// Consume one block of interleaved samples.
    fn process(&mut self, samples: &[f32], channels: u16, sample_rate: u32, bus: &Bus);
}

/// An element shared between the chain and whoever created it.
pub type SharedElement = Arc<Mutex<dyn Element>>;

/// Ordered list of elements attached to the player.
#[derive(Clone, Default)]
pub struct FilterChain {
    elements: Arc<Mutex<Vec<(ElementId, SharedElement)>>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `element` and start it. Returns false if it was already attached.
    pub fn add(&self, element: SharedElement) -> bool {
        let id = match element.lock() {
            Ok(mut e) => {
                e.set_state(ElementState::Playing);
                e.id()
            }
            Err(_) => return false,
        };

        let Ok(mut elements) = self.elements.lock() else {
            return false;
        };
        if elements.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        elements.push((id, element));
        true
    }

    /// Detach the element with `id`, if attached.
    pub fn remove(&self, id: ElementId) -> Option<SharedElement> {
        let mut elements = self.elements.lock().ok()?;
        let pos = elements.iter().position(|(existing, _)| *existing == id)?;
        Some(elements.remove(pos).1)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements
            .lock()
            .map(|elements| elements.iter().any(|(existing, _)| *existing == id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.elements.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand a block of samples to every playing element.
    pub fn feed(&self, samples: &[f32], channels: u16, sample_rate: u32, bus: &Bus) {
        let elements: Vec<SharedElement> = match self.elements.lock() {
            Ok(elements) => elements.iter().map(|(_, e)| e.clone()).collect(),
            Err(_) => return,
        };
        for element in elements {
            if let Ok(mut e) = element.lock() {
                if e.state() == ElementState::Playing {
                    e.process(samples, channels, sample_rate, bus);
                }
            }
        }
    }
}

/// Source wrapper that passes samples through while feeding the filter chain.
pub struct PipelineTap<S> {
    source: S,
    chain: FilterChain,
    bus: Bus,
    pending: Vec<f32>,
}

impl<S> PipelineTap<S>
where
    S: Source<Item = f32>,
{
    pub fn new(source: S, chain: FilterChain, bus: Bus) -> Self {
        let capacity = TAP_BLOCK_FRAMES * source.channels().max(1) as usize;
        Self {
            source,
            chain,
            bus,
            pending: Vec::with_capacity(capacity),
        }
    }

    /// Feed every whole frame collected so far; a trailing partial frame
    /// stays pending for the next block.
    fn flush(&mut self) {
        let channels = self.source.channels().max(1);
        let whole = self.pending.len() - self.pending.len() % channels as usize;
        if whole == 0 {
            return;
        }
        self.chain.feed(
            &self.pending[..whole],
            channels,
            self.source.sample_rate(),
            &self.bus,
        );
        self.pending.drain(..whole);
    }
}

impl<S> Iterator for PipelineTap<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        match self.source.next() {
            Some(sample) => {
                self.pending.push(sample);
                if self.pending.len() >= TAP_BLOCK_FRAMES * self.source.channels().max(1) as usize {
                    self.flush();
                }
                Some(sample)
            }
            None => {
                self.flush();
                None
            }
        }
    }
}

impl<S> Source for PipelineTap<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.source.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.source.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.source.total_duration()
    }
}

/// Element factories available to the player.
#[derive(Debug, Clone)]
pub struct Registry {
    factories: Vec<&'static str>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            factories: vec![SpectrumElement::FACTORY],
        }
    }
}

impl Registry {
    /// A registry with no factories at all.
    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Drop the factory called `name`.
    pub fn without(mut self, name: &str) -> Self {
        self.factories.retain(|f| *f != name);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.factories.iter().any(|f| *f == name)
    }

    /// Create a spectrum analysis element.
    pub fn make_spectrum(&self, config: &SpectrumConfig) -> Result<Arc<Mutex<SpectrumElement>>> {
        if !self.has(SpectrumElement::FACTORY) {
            bail!("no element factory named '{}'", SpectrumElement::FACTORY);
        }
        Ok(Arc::new(Mutex::new(SpectrumElement::new(config))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::buffer::SamplesBuffer;

    struct Counter {
        id: ElementId,
        state: ElementState,
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl Counter {
        fn shared(seen: Arc<Mutex<Vec<usize>>>) -> (ElementId, Arc<Mutex<Counter>>) {
            let id = ElementId::next();
            let counter = Counter {
                id,
                state: ElementState::Null,
                seen,
            };
            (id, Arc::new(Mutex::new(counter)))
        }
    }

    impl Element for Counter {
        fn id(&self) -> ElementId {
            self.id
        }

        fn name(&self) -> &str {
            "counter"
        }

        fn state(&self) -> ElementState {
            self.state
        }

        fn set_state(&mut self, state: ElementState) {
            self.state = state;
        }

        fn process(&mut self, samples: &[f32], _channels: u16, _rate: u32, _bus: &Bus) {
            self.seen.lock().unwrap().push(samples.len());
        }
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(ElementId::next(), ElementId::next());
    }

    #[test]
    fn bus_delivers_to_every_handler() {
        let bus = Bus::new();
        let hits = Arc::new(Mutex::new(0));
        for _ in 0..2 {
            let hits = hits.clone();
            bus.connect(move |_| *hits.lock().unwrap() += 1);
        }
        bus.emit(&PipelineEvent::SpectrumData(vec![-10.0]));
        assert_eq!(*hits.lock().unwrap(), 2);
    }

    #[test]
    fn handler_may_connect_while_emitting() {
        let bus = Bus::new();
        let inner = bus.clone();
        bus.connect(move |_| inner.connect(|_| {}));
        bus.emit(&PipelineEvent::FilterRemoved(ElementId::next()));
        bus.emit(&PipelineEvent::FilterRemoved(ElementId::next()));
    }

    #[test]
    fn chain_attaches_once_and_starts_element() {
        let chain = FilterChain::new();
        let (id, counter) = Counter::shared(Arc::default());
        assert!(chain.add(counter.clone()));
        assert!(!chain.add(counter.clone()));
        assert_eq!(chain.len(), 1);
        assert!(chain.contains(id));
        assert_eq!(counter.lock().unwrap().state(), ElementState::Playing);

        assert!(chain.remove(id).is_some());
        assert!(chain.remove(id).is_none());
        assert!(chain.is_empty());
    }

    #[test]
    fn stopped_elements_are_not_fed() {
        let chain = FilterChain::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (_, counter) = Counter::shared(seen.clone());
        chain.add(counter.clone());

        chain.feed(&[0.0; 8], 2, 44_100, &Bus::new());
        counter.lock().unwrap().set_state(ElementState::Null);
        chain.feed(&[0.0; 8], 2, 44_100, &Bus::new());

        assert_eq!(*seen.lock().unwrap(), vec![8]);
    }

    #[test]
    fn tap_passes_samples_through_and_feeds_whole_frames() {
        let chain = FilterChain::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (_, counter) = Counter::shared(seen.clone());
        chain.add(counter);

        let input: Vec<f32> = (0..2_050).map(|i| i as f32 / 2_050.0).collect();
        let source = SamplesBuffer::new(2, 44_100, input.clone());
        let output: Vec<f32> = PipelineTap::new(source, chain, Bus::new()).collect();

        assert_eq!(output, input);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.iter().sum::<usize>(), 2_050);
        assert!(seen.iter().all(|len| len % 2 == 0));
    }

    #[test]
    fn partial_frame_waits_for_the_next_block() {
        let chain = FilterChain::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (_, counter) = Counter::shared(seen.clone());
        chain.add(counter);

        let source = SamplesBuffer::new(2, 44_100, vec![0.0f32; 4]);
        let mut tap = PipelineTap::new(source, chain, Bus::new());
        tap.pending.extend_from_slice(&[0.1, 0.2, 0.3]);
        tap.flush();
        assert_eq!(tap.pending, vec![0.3]);

        tap.pending.push(0.4);
        tap.flush();
        assert!(tap.pending.is_empty());
        assert_eq!(*seen.lock().unwrap(), vec![2, 2]);
    }

    #[test]
    fn registry_without_spectrum_refuses_to_make_it() {
        let config = SpectrumConfig::default();
        assert!(Registry::default().make_spectrum(&config).is_ok());

        let err = Registry::default()
            .without(SpectrumElement::FACTORY)
            .make_spectrum(&config)
            .err()
            .unwrap();
        assert!(err.to_string().contains("spectrum"));
        assert!(Registry::empty().make_spectrum(&config).is_err());
    }
}
