//! Stand-in narration for desktops without a speech engine: prints the
//! text and reports completion after a reading-time estimate.

use crate::UserEvent;
use pano_core::{SpeechBackend, SpeechSignal, Utterance, ViewerError};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use winit::event_loop::EventLoopProxy;

const WORDS_PER_SEC: f32 = 2.6;
const MIN_UTTERANCE: Duration = Duration::from_millis(1200);

enum Cmd {
    Speak { token: u64, duration: Duration },
    Pause,
    Resume,
    Cancel,
}

pub fn reading_time(text: &str, rate: f32) -> Duration {
    let words = text.split_whitespace().count() as f32;
    let secs = words / (WORDS_PER_SEC * rate.max(0.1));
    Duration::from_secs_f32(secs).max(MIN_UTTERANCE)
}

pub struct TimedSpeech {
    tx: Sender<Cmd>,
}

impl TimedSpeech {
    pub fn new(proxy: EventLoopProxy<UserEvent>) -> Result<Self, ViewerError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("pano-narration".into())
            .spawn(move || run(rx, proxy))
            .map_err(|e| ViewerError::SpeechUnavailable(e.to_string()))?;
        Ok(Self { tx })
    }

    fn send(&self, cmd: Cmd) -> Result<(), ViewerError> {
        self.tx
            .send(cmd)
            .map_err(|_| ViewerError::SpeechUnavailable("narration thread exited".into()))
    }
}

impl SpeechBackend for TimedSpeech {
    fn speak(&mut self, utterance: &Utterance<'_>) -> Result<(), ViewerError> {
        let duration = reading_time(utterance.text, utterance.rate);
        log::info!("[narration] » {}", utterance.text);
        self.send(Cmd::Speak {
            token: utterance.token,
            duration,
        })
    }

    fn pause(&mut self) {
        _ = self.send(Cmd::Pause);
    }

    fn resume(&mut self) {
        _ = self.send(Cmd::Resume);
    }

    fn cancel(&mut self) {
        _ = self.send(Cmd::Cancel);
    }
}

/// Owns the countdown for the single current utterance. Exits when the
/// backend is dropped.
fn run(rx: Receiver<Cmd>, proxy: EventLoopProxy<UserEvent>) {
    let mut current: Option<(u64, Duration)> = None;
    let mut paused = false;
    loop {
        let counting = match current {
            Some((_, remaining)) if !paused => Some(remaining),
            _ => None,
        };
        let cmd = match counting {
            Some(remaining) => {
                let started = Instant::now();
                match rx.recv_timeout(remaining) {
                    Ok(cmd) => {
                        if let Some((_, rem)) = current.as_mut() {
                            *rem = rem.saturating_sub(started.elapsed());
                        }
                        cmd
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if let Some((token, _)) = current.take() {
                            let signal = SpeechSignal::Ended;
                            if proxy.send_event(UserEvent::Speech { token, signal }).is_err() {
                                return;
                            }
                        }
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
            None => match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => return,
            },
        };
        match cmd {
            Cmd::Speak { token, duration } => {
                current = Some((token, duration));
                paused = false;
            }
            Cmd::Pause => paused = true,
            Cmd::Resume => paused = false,
            Cmd::Cancel => {
                current = None;
                paused = false;
            }
        }
    }
}
