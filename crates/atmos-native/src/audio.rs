// ---------------- Audio input (cpal) ----------------

use atmos_core::{
    AnalysisEngine, ChannelLayout, MetricsSnapshot, SpeakerLayout, DEFAULT_SAMPLE_RATE, FFT_SIZE,
};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rand::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Keeps the metrics feed alive for as long as it is held.
pub enum AudioSource {
    Device(cpal::Stream),
    Synthetic(SyntheticSignal),
}

/// Starts capture from the default input device, or the synthetic signal
/// when no usable device is present.
pub fn start_audio(
    layout: Arc<SpeakerLayout>,
    snapshot: Arc<MetricsSnapshot>,
) -> anyhow::Result<AudioSource> {
    match start_capture(Arc::clone(&layout), Arc::clone(&snapshot)) {
        Ok(stream) => Ok(AudioSource::Device(stream)),
        Err(err) => {
            log::warn!("[audio] input capture unavailable ({err:#}); using synthetic signal");
            Ok(AudioSource::Synthetic(SyntheticSignal::spawn(layout, snapshot)?))
        }
    }
}

fn start_capture(
    layout: Arc<SpeakerLayout>,
    snapshot: Arc<MetricsSnapshot>,
) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("no default input device"))?;
    let config = device.default_input_config()?;
    let sample_rate = config.sample_rate().0 as f64;
    let channels = config.channels() as usize;
    let channel_layout = ChannelLayout::seven_one_four_prefix(channels);

    let mut engine = AnalysisEngine::new(layout, &channel_layout, snapshot)?;
    engine.prepare(sample_rate);
    log::info!(
        "[audio] capturing {} ch at {:.0} Hz from {}",
        channels,
        sample_rate,
        device.name().unwrap_or_else(|_| "unknown device".into())
    );

    let err_fn = |err| log::error!("audio stream error: {err}");
    let stream_config: cpal::StreamConfig = config.clone().into();
    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                engine.process_interleaved(data, channels);
            },
            err_fn,
            None,
        )?,
        cpal::SampleFormat::I16 => {
            let mut scratch = Vec::with_capacity(scratch_capacity(config.buffer_size(), channels));
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    convert_into(&mut scratch, data, i16_to_f32);
                    engine.process_interleaved(&scratch, channels);
                },
                err_fn,
                None,
            )?
        }
        cpal::SampleFormat::U16 => {
            let mut scratch = Vec::with_capacity(scratch_capacity(config.buffer_size(), channels));
            device.build_input_stream(
                &stream_config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    convert_into(&mut scratch, data, u16_to_f32);
                    engine.process_interleaved(&scratch, channels);
                },
                err_fn,
                None,
            )?
        }
        other => anyhow::bail!("unsupported sample format {other:?}"),
    };
    stream.play()?;
    Ok(stream)
}

const FALLBACK_CALLBACK_FRAMES: usize = 4096;
const MAX_CALLBACK_FRAMES: usize = 16384;

// Samples one conversion callback can deliver, so the scratch buffer is
// allocated before the stream starts rather than inside the callback.
fn scratch_capacity(buffer_size: &cpal::SupportedBufferSize, channels: usize) -> usize {
    let frames = match *buffer_size {
        cpal::SupportedBufferSize::Range { max, .. } => (max as usize).min(MAX_CALLBACK_FRAMES),
        cpal::SupportedBufferSize::Unknown => FALLBACK_CALLBACK_FRAMES,
    };
    frames.max(FFT_SIZE) * channels.max(1)
}

// Reuses the scratch allocation once it has grown to the callback size.
fn convert_into<T: Copy>(scratch: &mut Vec<f32>, data: &[T], convert: fn(T) -> f32) {
    scratch.clear();
    scratch.extend(data.iter().map(|&s| convert(s)));
}

#[inline]
pub fn i16_to_f32(s: i16) -> f32 {
    s as f32 / 32768.0
}

#[inline]
pub fn u16_to_f32(s: u16) -> f32 {
    (s as f32 - 32768.0) / 32768.0
}

// ---------------- Synthetic test signal ----------------

const SYNTH_BLOCK_FRAMES: usize = FFT_SIZE;
const SYNTH_NOISE_LEVEL: f32 = 0.01;
const LFE_TONE_HZ: f32 = 45.0;

/// One tone per speaker at a distinct frequency with a slow swell, plus a
/// little noise, analysed on a background thread at block rate.
pub struct SyntheticSignal {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

/// Tone frequency for speaker `index`, spread over all three bands.
pub fn synthetic_tone_hz(index: usize, is_lfe: bool) -> f32 {
    if is_lfe {
        return LFE_TONE_HZ;
    }
    110.0 * 1.45f32.powi(index as i32)
}

impl SyntheticSignal {
    pub fn spawn(layout: Arc<SpeakerLayout>, snapshot: Arc<MetricsSnapshot>) -> anyhow::Result<Self> {
        let channels = layout.len();
        let mut engine =
            AnalysisEngine::new(Arc::clone(&layout), &ChannelLayout::seven_one_four(), snapshot)?;
        engine.prepare(DEFAULT_SAMPLE_RATE);
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let sample_rate = DEFAULT_SAMPLE_RATE as f32;

        let handle = thread::Builder::new()
            .name("synthetic-signal".into())
            .spawn(move || {
                let mut rng = StdRng::seed_from_u64(42);
                let tones: Vec<(f32, f32, f32)> = layout
                    .speakers()
                    .iter()
                    .enumerate()
                    .map(|(i, s)| {
                        let freq = synthetic_tone_hz(i, s.is_lfe);
                        let swell_hz = 0.05 + rng.gen::<f32>() * 0.25;
                        let swell_phase = rng.gen::<f32>() * std::f32::consts::TAU;
                        (freq, swell_hz, swell_phase)
                    })
                    .collect();
                let mut block = vec![0.0f32; SYNTH_BLOCK_FRAMES * channels];
                let mut sample_index: u64 = 0;
                let block_period =
                    Duration::from_secs_f64(SYNTH_BLOCK_FRAMES as f64 / sample_rate as f64);

                while flag.load(Ordering::Relaxed) {
                    for frame in 0..SYNTH_BLOCK_FRAMES {
                        let t = (sample_index + frame as u64) as f32 / sample_rate;
                        for (ch, &(freq, swell_hz, swell_phase)) in tones.iter().enumerate() {
                            let swell = 0.5 + 0.5 * (std::f32::consts::TAU * swell_hz * t + swell_phase).sin();
                            let tone = (std::f32::consts::TAU * freq * t).sin() * 0.6 * swell;
                            let noise = (rng.gen::<f32>() * 2.0 - 1.0) * SYNTH_NOISE_LEVEL;
                            block[frame * channels + ch] = tone + noise;
                        }
                    }
                    sample_index += SYNTH_BLOCK_FRAMES as u64;
                    engine.process_interleaved(&block, channels);
                    thread::sleep(block_period);
                }
            })?;

        log::info!("[audio] synthetic signal on {channels} channels");
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }
}

impl Drop for SyntheticSignal {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
