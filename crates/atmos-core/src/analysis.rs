//! Per-block speaker analysis on the audio thread: RMS, peak and three
//! spectral bands per routed channel, published to a [`MetricsSnapshot`].

use crate::constants::*;
use crate::error::Result;
use crate::layout::{ChannelLayout, SpeakerLayout};
use crate::snapshot::{FrequencyBands, MetricsSnapshot, SpeakerMetrics};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Bin limits separating the low, mid and high bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandSplit {
    /// First bin of the mid band.
    pub low_limit: usize,
    /// First bin of the high band.
    pub mid_limit: usize,
}

impl BandSplit {
    pub fn for_sample_rate(sample_rate: f64) -> Self {
        let nyquist_bin = FFT_SIZE / 2;
        let hz_per_bin = (sample_rate.max(1.0) / FFT_SIZE as f64) as f32;
        let low_limit =
            ((LOW_BAND_CUTOFF_HZ / hz_per_bin).ceil() as usize).clamp(1, nyquist_bin);
        let mid_limit = ((MID_BAND_CUTOFF_HZ / hz_per_bin).ceil() as usize)
            .clamp((low_limit + 1).min(nyquist_bin), nyquist_bin);
        Self {
            low_limit,
            mid_limit,
        }
    }
}

pub fn compute_rms(samples: impl IntoIterator<Item = f32>) -> f32 {
    let mut count = 0usize;
    let mut sum_squares = 0.0f64;
    for s in samples {
        sum_squares += s as f64 * s as f64;
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    (sum_squares / count as f64).sqrt() as f32
}

pub fn compute_peak(samples: impl IntoIterator<Item = f32>) -> f32 {
    samples.into_iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}

/// Symmetric Hann window scaled to unit mean.
pub fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f32;
    let mut window: Vec<f32> = (0..size)
        .map(|i| 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / denom).cos())
        .collect();
    let sum: f32 = window.iter().sum();
    if sum > 0.0 {
        let factor = size as f32 / sum;
        for w in &mut window {
            *w *= factor;
        }
    }
    window
}

/// Windowed magnitude spectrum reduced to three bands. Owns its buffers so
/// `analyse` never allocates.
pub struct BandAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    split: BandSplit,
}

impl BandAnalyser {
    pub fn new(sample_rate: f64) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let scratch_len = fft.get_inplace_scratch_len();
        Self {
            fft,
            window: hann_window(FFT_SIZE),
            buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            split: BandSplit::for_sample_rate(sample_rate),
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.split = BandSplit::for_sample_rate(sample_rate);
        self.buffer.fill(Complex::new(0.0, 0.0));
    }

    #[inline]
    pub fn split(&self) -> BandSplit {
        self.split
    }

    /// Zero-pads or truncates `samples` to the transform size.
    pub fn analyse(&mut self, samples: impl IntoIterator<Item = f32>) -> FrequencyBands {
        self.buffer.fill(Complex::new(0.0, 0.0));
        for (slot, s) in self.buffer.iter_mut().zip(samples) {
            slot.re = s;
        }
        for (slot, w) in self.buffer.iter_mut().zip(&self.window) {
            slot.re *= *w;
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let nyquist_bin = FFT_SIZE / 2;
        let BandSplit {
            low_limit,
            mid_limit,
        } = self.split;
        let mut bands = FrequencyBands::default();
        for (bin, value) in self.buffer.iter().enumerate().take(nyquist_bin).skip(1) {
            let magnitude = value.norm();
            if bin < low_limit {
                bands.low += magnitude;
            } else if bin < mid_limit {
                bands.mid += magnitude;
            } else {
                bands.high += magnitude;
            }
        }

        bands.low /= low_limit.saturating_sub(1).max(1) as f32;
        bands.mid /= mid_limit.saturating_sub(low_limit).max(1) as f32;
        bands.high /= nyquist_bin.saturating_sub(mid_limit).max(1) as f32;
        bands
    }
}

pub struct AnalysisEngine {
    layout: Arc<SpeakerLayout>,
    routes: Vec<Option<usize>>,
    bands: BandAnalyser,
    sample_rate: f64,
    block_metrics: Vec<SpeakerMetrics>,
    snapshot: Arc<MetricsSnapshot>,
}

impl AnalysisEngine {
    pub fn new(
        layout: Arc<SpeakerLayout>,
        channels: &ChannelLayout,
        snapshot: Arc<MetricsSnapshot>,
    ) -> Result<Self> {
        let routes = layout.route(channels)?;
        let speaker_count = layout.len();
        Ok(Self {
            layout,
            routes,
            bands: BandAnalyser::new(DEFAULT_SAMPLE_RATE),
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_metrics: vec![SpeakerMetrics::default(); speaker_count],
            snapshot,
        })
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.bands.set_sample_rate(sample_rate);
        let split = self.bands.split();
        log::info!(
            "[analysis] prepared at {:.0} Hz, fft={} low<{} mid<{} bins",
            sample_rate,
            FFT_SIZE,
            split.low_limit,
            split.mid_limit
        );
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    pub fn band_split(&self) -> BandSplit {
        self.bands.split()
    }

    #[inline]
    pub fn snapshot(&self) -> &Arc<MetricsSnapshot> {
        &self.snapshot
    }

    /// Metrics of the most recent block, as published.
    #[inline]
    pub fn block_metrics(&self) -> &[SpeakerMetrics] {
        &self.block_metrics
    }

    /// One slice per host channel, all of the same length.
    pub fn process_planar(&mut self, channels: &[&[f32]]) {
        self.block_metrics.fill(SpeakerMetrics::default());
        let count = channels.len().min(self.layout.len());
        for (ch, data) in channels.iter().enumerate().take(count) {
            if let Some(slot) = self.route(ch) {
                self.analyse_into(slot, data.iter().copied());
            }
        }
        self.snapshot.publish(&self.block_metrics);
    }

    /// Frames of `num_channels` interleaved samples.
    pub fn process_interleaved(&mut self, data: &[f32], num_channels: usize) {
        self.block_metrics.fill(SpeakerMetrics::default());
        if num_channels > 0 {
            let frames = data.len() / num_channels;
            let count = num_channels.min(self.layout.len());
            for ch in 0..count {
                if let Some(slot) = self.route(ch) {
                    let samples = data
                        .iter()
                        .skip(ch)
                        .step_by(num_channels)
                        .take(frames)
                        .copied();
                    self.analyse_into(slot, samples);
                }
            }
        }
        self.snapshot.publish(&self.block_metrics);
    }

    #[inline]
    fn route(&self, channel_index: usize) -> Option<usize> {
        self.routes.get(channel_index).copied().flatten()
    }

    fn analyse_into<I>(&mut self, slot: usize, samples: I)
    where
        I: Iterator<Item = f32> + Clone,
    {
        let Some(def) = self.layout.speakers().get(slot) else {
            return;
        };
        let is_lfe = def.is_lfe;
        let mut bands = self.bands.analyse(samples.clone());
        if is_lfe {
            bands.mid = 0.0;
            bands.high = 0.0;
        }
        let entry = &mut self.block_metrics[slot];
        entry.rms = compute_rms(samples.clone());
        entry.peak = compute_peak(samples);
        entry.bands = bands;
    }
}
