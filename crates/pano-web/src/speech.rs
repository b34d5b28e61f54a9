//! `window.speechSynthesis` narration backend.

use pano_core::{SpeechBackend, SpeechSignal, Utterance, ViewerError};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Receives completion callbacks. Called from browser event handlers, so
/// implementations must not touch viewer state synchronously.
pub type SpeechSink = Rc<dyn Fn(u64, SpeechSignal)>;

struct Spoken {
    utterance: web::SpeechSynthesisUtterance,
    _on_end: Closure<dyn FnMut(web::SpeechSynthesisEvent)>,
    _on_error: Closure<dyn FnMut(web::SpeechSynthesisErrorEvent)>,
}

impl Spoken {
    /// Handlers are detached before the closures drop so a late `end`
    /// never reaches a freed closure.
    fn detach(&self) {
        self.utterance.set_onend(None);
        self.utterance.set_onerror(None);
    }
}

pub struct WebSpeech {
    synth: web::SpeechSynthesis,
    sink: SpeechSink,
    current: Option<Spoken>,
}

impl WebSpeech {
    pub fn new(sink: SpeechSink) -> Result<Self, ViewerError> {
        let window =
            web::window().ok_or_else(|| ViewerError::SpeechUnavailable("no window".into()))?;
        let synth = window
            .speech_synthesis()
            .map_err(|e| ViewerError::SpeechUnavailable(format!("{:?}", e)))?;
        // a previous page may have left the shared queue busy
        synth.cancel();
        Ok(Self {
            synth,
            sink,
            current: None,
        })
    }

    fn release(&mut self) {
        if let Some(spoken) = self.current.take() {
            spoken.detach();
        }
    }
}

impl SpeechBackend for WebSpeech {
    fn speak(&mut self, utterance: &Utterance<'_>) -> Result<(), ViewerError> {
        self.release();
        let utt = web::SpeechSynthesisUtterance::new_with_text(utterance.text)
            .map_err(|e| ViewerError::SpeechUnavailable(format!("{:?}", e)))?;
        utt.set_rate(utterance.rate);
        utt.set_pitch(utterance.pitch);
        if let Some(lang) = utterance.lang {
            utt.set_lang(lang);
        }

        let token = utterance.token;
        let sink = self.sink.clone();
        let on_end = Closure::wrap(Box::new(move |_ev: web::SpeechSynthesisEvent| {
            sink(token, SpeechSignal::Ended);
        }) as Box<dyn FnMut(_)>);
        let sink = self.sink.clone();
        let on_error = Closure::wrap(Box::new(move |ev: web::SpeechSynthesisErrorEvent| {
            sink(token, SpeechSignal::Error(format!("{:?}", ev.error())));
        }) as Box<dyn FnMut(_)>);
        utt.set_onend(Some(on_end.as_ref().unchecked_ref()));
        utt.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        self.synth.speak(&utt);
        log::debug!("[narration] speechSynthesis token={}", token);
        self.current = Some(Spoken {
            utterance: utt,
            _on_end: on_end,
            _on_error: on_error,
        });
        Ok(())
    }

    fn pause(&mut self) {
        self.synth.pause();
    }

    fn resume(&mut self) {
        self.synth.resume();
    }

    fn cancel(&mut self) {
        self.release();
        self.synth.cancel();
    }
}

impl Drop for WebSpeech {
    fn drop(&mut self) {
        self.cancel();
    }
}
