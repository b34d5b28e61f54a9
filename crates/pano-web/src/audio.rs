//! WebAudio ambient bed: one oscillator plus filtered noise per hotspot,
//! each behind its own gain and an HRTF `PannerNode`.

use pano_core::{AmbientBackend, AudioSource, ListenerState, ViewerError, Waveform};
use web_sys as web;

const NOISE_SECONDS: f32 = 2.0;
const MUTE_RAMP_SEC: f64 = 0.08;

struct Emitter {
    osc: web::OscillatorNode,
    noise: Option<web::AudioBufferSourceNode>,
    gain: web::GainNode,
    panner: web::PannerNode,
}

pub struct WebAmbient {
    ctx: web::AudioContext,
    mute: web::GainNode,
    noise_buffer: Option<web::AudioBuffer>,
    emitters: Vec<Emitter>,
}

fn create_gain(
    ctx: &web::AudioContext,
    value: f32,
    label: &str,
) -> Result<web::GainNode, ViewerError> {
    match web::GainNode::new(ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("[audio] {} GainNode error: {:?}", label, e);
            Err(ViewerError::AudioUnavailable(format!("{:?}", e)))
        }
    }
}

#[inline]
fn audio_err(e: wasm_bindgen::JsValue) -> ViewerError {
    ViewerError::AudioUnavailable(format!("{:?}", e))
}

impl WebAmbient {
    /// The context starts suspended in most browsers; call
    /// [`WebAmbient::resume`] from a user gesture.
    pub fn new(master_gain: f32) -> Result<Self, ViewerError> {
        let ctx = web::AudioContext::new().map_err(audio_err)?;
        let master = create_gain(&ctx, master_gain, "master")?;
        let mute = create_gain(&ctx, 1.0, "mute")?;
        mute.connect_with_audio_node(&master).map_err(audio_err)?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(audio_err)?;
        let noise_buffer = build_noise(&ctx);
        Ok(Self {
            ctx,
            mute,
            noise_buffer,
            emitters: Vec::new(),
        })
    }

    pub fn resume(&self) {
        if self.ctx.state() == web::AudioContextState::Suspended {
            _ = self.ctx.resume();
        }
    }

    #[allow(deprecated)]
    fn build_emitter(&self, source: &AudioSource) -> Result<Emitter, ViewerError> {
        let profile = source.profile;
        let osc = web::OscillatorNode::new(&self.ctx).map_err(audio_err)?;
        osc.set_type(match profile.waveform {
            Waveform::Sine => web::OscillatorType::Sine,
            Waveform::Saw => web::OscillatorType::Sawtooth,
            Waveform::Triangle => web::OscillatorType::Triangle,
        });
        osc.frequency().set_value(profile.base_hz);

        let filter = web::BiquadFilterNode::new(&self.ctx).map_err(audio_err)?;
        filter.set_type(web::BiquadFilterType::Lowpass);
        filter.frequency().set_value(profile.filter_hz);

        let tone = create_gain(&self.ctx, profile.level * (1.0 - profile.noise), "tone")?;
        osc.connect_with_audio_node(&tone).map_err(audio_err)?;
        tone.connect_with_audio_node(&filter).map_err(audio_err)?;

        let noise = match &self.noise_buffer {
            Some(buffer) if profile.noise > 0.0 => {
                let src = self.ctx.create_buffer_source().map_err(audio_err)?;
                src.set_buffer(Some(buffer));
                src.set_loop(true);
                let level = create_gain(&self.ctx, profile.level * profile.noise, "noise")?;
                src.connect_with_audio_node(&level).map_err(audio_err)?;
                level.connect_with_audio_node(&filter).map_err(audio_err)?;
                Some(src)
            }
            _ => None,
        };

        // silent until the engine computes the first distance gain
        let gain = create_gain(&self.ctx, 0.0, "emitter")?;
        let panner = web::PannerNode::new(&self.ctx).map_err(audio_err)?;
        panner.set_panning_model(web::PanningModelType::Hrtf);
        // distance attenuation is applied through `gain`, the panner only places
        panner.set_distance_model(web::DistanceModelType::Linear);
        panner.set_rolloff_factor(0.0);
        panner.set_ref_distance(source.ref_distance as f64);
        panner.set_max_distance(source.max_distance as f64);
        panner.position_x().set_value(source.position.x);
        panner.position_y().set_value(source.position.y);
        panner.position_z().set_value(source.position.z);

        filter.connect_with_audio_node(&gain).map_err(audio_err)?;
        gain.connect_with_audio_node(&panner).map_err(audio_err)?;
        panner.connect_with_audio_node(&self.mute).map_err(audio_err)?;

        osc.start().map_err(audio_err)?;
        if let Some(src) = &noise {
            src.start().map_err(audio_err)?;
        }
        Ok(Emitter {
            osc,
            noise,
            gain,
            panner,
        })
    }
}

impl AmbientBackend for WebAmbient {
    fn start(&mut self, sources: &[AudioSource]) -> Result<(), ViewerError> {
        self.stop();
        for source in sources {
            match self.build_emitter(source) {
                Ok(e) => self.emitters.push(e),
                Err(e) => {
                    self.stop();
                    return Err(e);
                }
            }
        }
        log::info!("[audio] {} emitters running", self.emitters.len());
        Ok(())
    }

    #[allow(deprecated)]
    fn set_listener(&mut self, listener: &ListenerState) {
        let l = self.ctx.listener();
        let p = listener.position;
        let f = listener.forward;
        let u = listener.up;
        l.set_position(p.x as f64, p.y as f64, p.z as f64);
        l.set_orientation(f.x as f64, f.y as f64, f.z as f64, u.x as f64, u.y as f64, u.z as f64);
    }

    fn set_source_gain(&mut self, index: usize, gain: f32) {
        if let Some(e) = self.emitters.get(index) {
            e.gain.gain().set_value(gain);
        }
    }

    fn set_muted(&mut self, muted: bool) {
        let target = if muted { 0.0 } else { 1.0 };
        let now = self.ctx.current_time();
        let param = self.mute.gain();
        _ = param.cancel_scheduled_values(now);
        _ = param.set_target_at_time(target, now, MUTE_RAMP_SEC / 3.0);
    }

    #[allow(deprecated)]
    fn stop(&mut self) {
        for e in self.emitters.drain(..) {
            _ = e.osc.stop();
            if let Some(src) = &e.noise {
                _ = src.stop();
            }
            _ = e.gain.disconnect();
            _ = e.panner.disconnect();
        }
    }
}

impl Drop for WebAmbient {
    fn drop(&mut self) {
        self.stop();
        _ = self.ctx.close();
    }
}

/// Looping white noise shared by every emitter.
fn build_noise(ctx: &web::AudioContext) -> Option<web::AudioBuffer> {
    let sr = ctx.sample_rate();
    let len = (sr * NOISE_SECONDS) as u32;
    let buffer = ctx.create_buffer(1, len, sr).ok()?;
    // xorshift32, deterministic
    let mut seed: u32 = 0x2545_F491;
    let mut samples = vec![0.0_f32; len as usize];
    for s in samples.iter_mut() {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        *s = (seed as f32 / u32::MAX as f32) * 2.0 - 1.0;
    }
    _ = buffer.copy_to_channel(&mut samples, 0);
    Some(buffer)
}
