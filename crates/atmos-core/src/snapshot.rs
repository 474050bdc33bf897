//! Audio-thread -> UI-thread hand-off of per-speaker metrics.
//!
//! A spin lock guards a fixed-length array. Both sides hold it only for a
//! `copy_from_slice`, so neither side allocates or parks inside the lock.

use bytemuck::{Pod, Zeroable};
use spin::Mutex;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FrequencyBands {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl FrequencyBands {
    #[inline]
    pub fn total(&self) -> f32 {
        self.low + self.mid + self.high
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpeakerMetrics {
    pub rms: f32,
    pub peak: f32,
    pub bands: FrequencyBands,
}

impl SpeakerMetrics {
    /// Display level in `[0, 1]`: the louder of peak and RMS.
    #[inline]
    pub fn visual_level(&self) -> f32 {
        self.peak.max(self.rms).clamp(0.0, 1.0)
    }
}

pub struct MetricsSnapshot {
    latest: Mutex<Vec<SpeakerMetrics>>,
}

impl MetricsSnapshot {
    pub fn new(speaker_count: usize) -> Self {
        Self {
            latest: Mutex::new(vec![SpeakerMetrics::zeroed(); speaker_count]),
        }
    }

    pub fn len(&self) -> usize {
        self.latest.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole snapshot. Extra source entries are ignored.
    pub fn publish(&self, metrics: &[SpeakerMetrics]) {
        let mut latest = self.latest.lock();
        let n = latest.len().min(metrics.len());
        latest[..n].copy_from_slice(&metrics[..n]);
    }

    /// Copy the most recent complete snapshot into `dest`.
    pub fn copy_latest(&self, dest: &mut [SpeakerMetrics]) {
        let latest = self.latest.lock();
        let n = latest.len().min(dest.len());
        dest[..n].copy_from_slice(&latest[..n]);
    }
}
