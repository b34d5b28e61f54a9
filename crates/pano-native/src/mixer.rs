//! cpal ambient mixer. Each emitter is a procedural tone plus lowpassed
//! noise, placed in stereo from the listener-relative direction.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use glam::Vec3;
use pano_core::{AmbientBackend, AudioSource, ListenerState, ViewerError, Waveform};
use std::f32::consts::{FRAC_PI_4, TAU};
use std::sync::{Arc, Mutex};

// per-sample smoothing toward targets (~20 ms gain, ~80 ms mute at 48 kHz)
const GAIN_SMOOTHING: f32 = 0.001;
const MUTE_SMOOTHING: f32 = 0.00025;

struct Voice {
    wave: Waveform,
    phase: f32,
    phase_inc: f32,
    tone_level: f32,
    noise_level: f32,
    lp_alpha: f32,
    lp_state: f32,
    gain: f32,
    gain_target: f32,
    left: f32,
    right: f32,
}

struct MixState {
    sample_rate: f32,
    voices: Vec<Voice>,
    master: f32,
    mute_env: f32,
    mute_target: f32,
    noise_seed: u32,
}

impl MixState {
    fn next_noise(&mut self) -> f32 {
        // xorshift32
        let mut x = self.noise_seed;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise_seed = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    fn mix_sample_stereo(&mut self) -> (f32, f32) {
        self.mute_env += (self.mute_target - self.mute_env) * MUTE_SMOOTHING;
        if self.voices.is_empty() || (self.mute_env < 1e-4 && self.mute_target == 0.0) {
            return (0.0, 0.0);
        }
        let mut left = 0.0f32;
        let mut right = 0.0f32;
        for i in 0..self.voices.len() {
            let n = self.next_noise();
            let v = &mut self.voices[i];
            v.gain += (v.gain_target - v.gain) * GAIN_SMOOTHING;
            let raw = render_wave_sample(v.phase, v.wave) * v.tone_level + n * v.noise_level;
            v.lp_state += (raw - v.lp_state) * v.lp_alpha;
            let s = v.lp_state * v.gain;
            left += s * v.left;
            right += s * v.right;
            v.phase += v.phase_inc;
            if v.phase > TAU {
                v.phase -= TAU;
            }
        }
        let out = self.master * self.mute_env;
        ((left * out).tanh(), (right * out).tanh())
    }
}

fn render_wave_sample(phase: f32, wave: Waveform) -> f32 {
    let t = phase / TAU;
    let saw = 2.0 * (t - t.floor()) - 1.0;
    match wave {
        Waveform::Sine => phase.sin(),
        Waveform::Saw => saw,
        Waveform::Triangle => 2.0 * saw.abs() - 1.0,
    }
}

/// Equal-power gains for `pan` in `[-1, 1]`.
#[inline]
fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

pub struct CpalAmbient {
    state: Arc<Mutex<MixState>>,
    positions: Vec<Vec3>,
    _stream: cpal::Stream,
}

fn audio_err(e: impl std::fmt::Display) -> ViewerError {
    ViewerError::AudioUnavailable(e.to_string())
}

impl CpalAmbient {
    pub fn new(master_gain: f32) -> Result<Self, ViewerError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| ViewerError::AudioUnavailable("no output device".into()))?;
        let config = device.default_output_config().map_err(audio_err)?;
        let state = Arc::new(Mutex::new(MixState {
            sample_rate: config.sample_rate().0 as f32,
            voices: Vec::new(),
            master: master_gain,
            mute_env: 1.0,
            mute_target: 1.0,
            noise_seed: 0x1234_ABCD,
        }));
        let format = config.sample_format();
        let config: cpal::StreamConfig = config.into();
        let stream = match format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, Arc::clone(&state)),
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, Arc::clone(&state)),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, Arc::clone(&state)),
            other => {
                return Err(ViewerError::AudioUnavailable(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(audio_err)?;
        stream.play().map_err(audio_err)?;
        log::info!(
            "[audio] cpal output {} Hz, {} channels",
            config.sample_rate.0,
            config.channels
        );
        Ok(Self {
            state,
            positions: Vec::new(),
            _stream: stream,
        })
    }

    fn with_state(&self, f: impl FnOnce(&mut MixState)) {
        match self.state.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(_) => log::warn!("[audio] mixer state poisoned"),
        }
    }
}

impl AmbientBackend for CpalAmbient {
    fn start(&mut self, sources: &[AudioSource]) -> Result<(), ViewerError> {
        self.positions = sources.iter().map(|s| s.position).collect();
        self.with_state(|st| {
            let sr = st.sample_rate;
            st.voices = sources
                .iter()
                .map(|s| {
                    let p = s.profile;
                    Voice {
                        wave: p.waveform,
                        phase: 0.0,
                        phase_inc: TAU * p.base_hz / sr,
                        tone_level: p.level * (1.0 - p.noise),
                        noise_level: p.level * p.noise,
                        lp_alpha: 1.0 - (-TAU * p.filter_hz / sr).exp(),
                        lp_state: 0.0,
                        gain: 0.0,
                        gain_target: 0.0,
                        left: FRAC_PI_4.cos(),
                        right: FRAC_PI_4.sin(),
                    }
                })
                .collect();
        });
        log::info!("[audio] {} emitters running", sources.len());
        Ok(())
    }

    fn set_listener(&mut self, listener: &ListenerState) {
        let pans: Vec<(f32, f32)> = self
            .positions
            .iter()
            .map(|p| pan_gains(listener.pan_for(*p)))
            .collect();
        self.with_state(|st| {
            for (v, (l, r)) in st.voices.iter_mut().zip(pans) {
                v.left = l;
                v.right = r;
            }
        });
    }

    fn set_source_gain(&mut self, index: usize, gain: f32) {
        self.with_state(|st| {
            if let Some(v) = st.voices.get_mut(index) {
                v.gain_target = gain;
            }
        });
    }

    fn set_muted(&mut self, muted: bool) {
        self.with_state(|st| st.mute_target = if muted { 0.0 } else { 1.0 });
    }

    fn stop(&mut self) {
        self.positions.clear();
        self.with_state(|st| st.voices.clear());
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    state: Arc<Mutex<MixState>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let err_fn = |err: cpal::StreamError| log::warn!("[audio] stream error: {err}");
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let Ok(mut guard) = state.lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            for frame in data.chunks_mut(channels.max(1)) {
                let (l, r) = guard.mix_sample_stereo();
                match frame {
                    [mono] => *mono = T::from_sample(0.5 * (l + r)),
                    [left, right, rest @ ..] => {
                        *left = T::from_sample(l);
                        *right = T::from_sample(r);
                        rest.fill(T::EQUILIBRIUM);
                    }
                    [] => {}
                }
            }
        },
        err_fn,
        None,
    )
}
