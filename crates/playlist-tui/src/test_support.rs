//! Recording fake for `AudioBackend`, shared by unit tests.

use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use tokio::sync::mpsc;

use crate::audio::{AudioBackend, AudioEvent, AudioHandle, PlayFuture, PlaybackError};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Play,
    Pause,
    Rewind,
    SetMuted(bool),
    SetVolume(f32),
}

#[derive(Debug, Default)]
pub struct FakeLog {
    /// `(src, generation)` per `open`, in order.
    pub opened: Vec<(String, u64)>,
    /// `(generation, call)` in the order they were made.
    pub calls: Vec<(u64, Call)>,
    pub dropped: Vec<u64>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub log: Arc<Mutex<FakeLog>>,
    /// When set, every `play` rejects with this message.
    pub fail_play: Arc<Mutex<Option<String>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_play_with(&self, reason: &str) {
        *self.fail_play.lock().unwrap() = Some(reason.to_string());
    }

    pub fn opened(&self) -> Vec<(String, u64)> {
        self.log.lock().unwrap().opened.clone()
    }

    pub fn calls(&self) -> Vec<(u64, Call)> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, generation: u64) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|(g, _)| *g == generation)
            .map(|(_, c)| c)
            .collect()
    }

    pub fn dropped(&self) -> Vec<u64> {
        self.log.lock().unwrap().dropped.clone()
    }
}

impl AudioBackend for FakeBackend {
    fn open(
        &self,
        src: &str,
        generation: u64,
        _events: mpsc::Sender<AudioEvent>,
    ) -> Box<dyn AudioHandle> {
        self.log
            .lock()
            .unwrap()
            .opened
            .push((src.to_string(), generation));
        Box::new(FakeHandle {
            src: src.to_string(),
            generation,
            backend: self.clone(),
        })
    }
}

struct FakeHandle {
    src: String,
    generation: u64,
    backend: FakeBackend,
}

impl FakeHandle {
    fn record(&self, call: Call) {
        self.backend
            .log
            .lock()
            .unwrap()
            .calls
            .push((self.generation, call));
    }
}

impl AudioHandle for FakeHandle {
    fn src(&self) -> &str {
        &self.src
    }

    fn play(&self) -> PlayFuture {
        self.record(Call::Play);
        let result = match self.backend.fail_play.lock().unwrap().clone() {
            Some(reason) => Err(PlaybackError::StartFailed(reason)),
            None => Ok(()),
        };
        futures_util::future::ready(result).boxed()
    }

    fn pause(&self) {
        self.record(Call::Pause);
    }

    fn rewind(&self) {
        self.record(Call::Rewind);
    }

    fn set_muted(&self, muted: bool) {
        self.record(Call::SetMuted(muted));
    }

    fn set_volume(&self, level: f32) {
        self.record(Call::SetVolume(level));
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.backend.log.lock().unwrap().dropped.push(self.generation);
    }
}
