//! Spectrum analysis element: turns decoded audio into per-band magnitudes.

use std::sync::Arc;
use std::time::Duration;

use ringbuf::{traits::*, HeapRb};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::pipeline::{Bus, Element, ElementId, ElementState, PipelineEvent};
use crate::config::SpectrumConfig;

/// Analysis filter that posts one magnitude frame per interval.
///
/// Input is mixed down to mono and cut into non-overlapping windows of
/// `2 * bands - 2` samples, so every FFT bin below Nyquist is one band.
/// Power is averaged over all windows of an interval and reported in dB,
/// never below the threshold and never above zero.
pub struct SpectrumElement {
    id: ElementId,
    state: ElementState,
    bands: usize,
    threshold_db: i32,
    post_messages: bool,
    interval: Duration,

    fft: Arc<dyn Fft<f32>>,
    nfft: usize,
    window: Vec<f32>,
    input: HeapRb<f32>,
    scratch: Vec<Complex<f32>>,
    /// Accumulated power per band since the last posted frame
    power: Vec<f32>,
    num_fft: u32,
    frames_in_interval: u64,
}

impl SpectrumElement {
    /// Factory name in the element registry.
    pub const FACTORY: &'static str = "spectrum";

    pub fn new(config: &SpectrumConfig) -> Self {
        let bands = config.bands.max(1);
        let nfft = fft_len(bands);
        let fft = FftPlanner::new().plan_fft_forward(nfft);

        Self {
            id: ElementId::next(),
            state: ElementState::Null,
            bands,
            threshold_db: config.threshold_db,
            post_messages: config.post_messages,
            interval: config.interval,
            fft,
            nfft,
            window: hann(nfft),
            input: HeapRb::new(nfft),
            scratch: vec![Complex::new(0.0, 0.0); nfft],
            power: vec![0.0; bands],
            num_fft: 0,
            frames_in_interval: 0,
        }
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Change the number of bands. Anything accumulated so far is dropped.
    pub fn set_bands(&mut self, bands: usize) {
        let bands = bands.max(1);
        if bands == self.bands {
            return;
        }
        self.bands = bands;
        self.nfft = fft_len(bands);
        self.fft = FftPlanner::new().plan_fft_forward(self.nfft);
        self.window = hann(self.nfft);
        self.input = HeapRb::new(self.nfft);
        self.scratch = vec![Complex::new(0.0, 0.0); self.nfft];
        self.power = vec![0.0; bands];
        self.num_fft = 0;
        self.frames_in_interval = 0;
    }

    pub fn threshold_db(&self) -> i32 {
        self.threshold_db
    }

    pub fn set_threshold_db(&mut self, threshold_db: i32) {
        self.threshold_db = threshold_db;
    }

    pub fn set_post_messages(&mut self, post: bool) {
        self.post_messages = post;
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn reset(&mut self) {
        self.input.clear();
        self.power.iter_mut().for_each(|p| *p = 0.0);
        self.num_fft = 0;
        self.frames_in_interval = 0;
    }

    /// Run one FFT over the collected window and accumulate its power.
    fn analyze(&mut self) {
        for (slot, (sample, w)) in self
            .scratch
            .iter_mut()
            .zip(self.input.iter().zip(self.window.iter()))
        {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.input.clear();

        self.fft.process(&mut self.scratch);

        let norm = (self.nfft * self.nfft) as f32;
        for (acc, bin) in self.power.iter_mut().zip(self.scratch.iter()) {
            *acc += bin.norm_sqr() / norm;
        }
        self.num_fft += 1;
    }

    /// Average what was accumulated into a dB frame and start over.
    fn take_magnitudes(&mut self) -> Option<Vec<f32>> {
        if self.num_fft == 0 {
            return None;
        }
        let count = self.num_fft as f32;
        let floor = self.threshold_db as f32;
        let frame = self
            .power
            .iter()
            .map(|&p| (10.0 * (p / count).max(1e-20).log10()).clamp(floor, 0.0))
            .collect();

        self.power.iter_mut().for_each(|p| *p = 0.0);
        self.num_fft = 0;
        Some(frame)
    }
}

impl Element for SpectrumElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn name(&self) -> &str {
        Self::FACTORY
    }

    fn state(&self) -> ElementState {
        self.state
    }

    fn set_state(&mut self, state: ElementState) {
        if state == ElementState::Null {
            self.reset();
        }
        self.state = state;
    }

    fn process(&mut self, samples: &[f32], channels: u16, sample_rate: u32, bus: &Bus) {
        if self.state != ElementState::Playing || channels == 0 || sample_rate == 0 {
            return;
        }
        let channels = channels as usize;
        let interval_frames = (sample_rate as f64 * self.interval.as_secs_f64()).max(1.0) as u64;

        for frame in samples.chunks_exact(channels) {
            let mono = frame.iter().sum::<f32>() / channels as f32;
            let _ = self.input.try_push(mono);
            if self.input.is_full() {
                self.analyze();
            }

            self.frames_in_interval += 1;
            if self.frames_in_interval >= interval_frames {
                self.frames_in_interval = 0;
                if let Some(magnitudes) = self.take_magnitudes() {
                    if self.post_messages {
                        bus.emit(&PipelineEvent::SpectrumData(magnitudes));
                    }
                }
            }
        }
    }
}

fn fft_len(bands: usize) -> usize {
    (2 * bands).saturating_sub(2).max(2)
}

fn hann(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / len as f32).cos()))
        .collect()
}
