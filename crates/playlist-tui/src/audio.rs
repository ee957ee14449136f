//! Playback handles.
//!
//! An [`AudioHandle`] is bound to exactly one stream URL for its whole life
//! and is released by dropping it.  Readiness changes are reported
//! asynchronously as [`AudioEvent`]s tagged with the generation the handle
//! was opened for, so the owner can discard signals from a handle it has
//! already replaced.

use std::path::PathBuf;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use playlist_core::config::PlayerConfig;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::mpv::{MpvDriver, MpvEvent, MpvHandle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("playback could not start: {0}")]
    StartFailed(String),
    #[error("audio handle closed")]
    Closed,
}

/// Readiness notifications from a playback handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSignal {
    /// The source began (re)loading.
    LoadStart,
    /// Enough data is buffered to start.
    CanPlay,
    /// The source failed or the player went away.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioEvent {
    pub generation: u64,
    pub signal: AudioSignal,
}

pub type PlayFuture = BoxFuture<'static, Result<(), PlaybackError>>;

/// Native playback control bound to one source.
///
/// Everything except `play` is fire-and-forget; commands are applied in the
/// order they were issued.
pub trait AudioHandle: Send {
    fn src(&self) -> &str;
    /// Start (or resume) playback.  Resolves once the player accepted or
    /// rejected the request.
    fn play(&self) -> PlayFuture;
    fn pause(&self);
    /// Seek to position zero.  Ignored by sources that cannot seek.
    fn rewind(&self);
    fn set_muted(&self, muted: bool);
    /// `level` in 0.0..=1.0.
    fn set_volume(&self, level: f32);
}

/// Factory for playback handles.
pub trait AudioBackend: Send + Sync {
    fn open(&self, src: &str, generation: u64, events: mpsc::Sender<AudioEvent>)
        -> Box<dyn AudioHandle>;
}

// ── mpv-backed implementation ─────────────────────────────────────────────────

#[derive(Debug)]
enum Command {
    Play(oneshot::Sender<Result<(), PlaybackError>>),
    Pause,
    Rewind,
    SetMuted(bool),
    SetVolume(f32),
}

/// Opens one mpv process per handle.
#[derive(Debug, Clone)]
pub struct MpvBackend {
    binary: Option<PathBuf>,
    extra_args: Vec<String>,
    stderr_log: Option<PathBuf>,
}

impl MpvBackend {
    pub fn new(config: &PlayerConfig) -> Self {
        let binary = config.resolve_mpv_binary();
        match &binary {
            Some(path) => info!("audio: using mpv at {:?}", path),
            None => warn!("audio: mpv not found; playback will fail"),
        }
        Self {
            binary,
            extra_args: config.extra_args.clone(),
            stderr_log: None,
        }
    }

    pub fn with_stderr_log(mut self, path: PathBuf) -> Self {
        self.stderr_log = Some(path);
        self
    }

    fn driver(&self, generation: u64) -> MpvDriver {
        let socket = playlist_core::platform::mpv_socket_name(generation);
        let driver = MpvDriver::new(socket, self.binary.clone(), self.extra_args.clone());
        match &self.stderr_log {
            Some(path) => driver.with_stderr_log(path.clone()),
            None => driver,
        }
    }
}

impl AudioBackend for MpvBackend {
    fn open(
        &self,
        src: &str,
        generation: u64,
        events: mpsc::Sender<AudioEvent>,
    ) -> Box<dyn AudioHandle> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let element = Element {
            src: src.to_string(),
            generation,
            events,
        };
        let task = tokio::spawn(element.run(self.driver(generation), cmd_rx));
        Box::new(MpvAudio {
            src: src.to_string(),
            cmd_tx,
            task,
        })
    }
}

/// Handle side: a command queue into the element task.
struct MpvAudio {
    src: String,
    cmd_tx: mpsc::UnboundedSender<Command>,
    task: tokio::task::JoinHandle<()>,
}

impl MpvAudio {
    fn post(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            debug!("audio: element task gone, command dropped");
        }
    }
}

impl AudioHandle for MpvAudio {
    fn src(&self) -> &str {
        &self.src
    }

    fn play(&self) -> PlayFuture {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.post(Command::Play(reply_tx));
        async move { reply_rx.await.unwrap_or(Err(PlaybackError::Closed)) }.boxed()
    }

    fn pause(&self) {
        self.post(Command::Pause);
    }

    fn rewind(&self) {
        self.post(Command::Rewind);
    }

    fn set_muted(&self, muted: bool) {
        self.post(Command::SetMuted(muted));
    }

    fn set_volume(&self, level: f32) {
        self.post(Command::SetVolume(level.clamp(0.0, 1.0)));
    }
}

impl Drop for MpvAudio {
    fn drop(&mut self) {
        // Aborting drops the driver, which kills the mpv child.
        self.task.abort();
        debug!("audio: released {}", self.src);
    }
}

/// Task side: owns the mpv driver and serialises commands against it.
struct Element {
    src: String,
    generation: u64,
    events: mpsc::Sender<AudioEvent>,
}

impl Element {
    async fn emit(&self, signal: AudioSignal) {
        let _ = self
            .events
            .send(AudioEvent {
                generation: self.generation,
                signal,
            })
            .await;
    }

    async fn run(self, mut driver: MpvDriver, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
        let (mpv_tx, mpv_rx) = mpsc::channel::<MpvEvent>(64);

        match driver.spawn_and_connect(mpv_tx).await {
            Ok(mpv) => self.serve(&mpv, mpv_rx, &mut cmd_rx).await,
            Err(e) => {
                error!("audio: failed to start player for {}: {}", self.src, e);
                self.emit(AudioSignal::Error).await;
                self.drain_dead(&mut cmd_rx, &e.to_string()).await;
            }
        }

        driver.kill().await;
    }

    /// Preload the source, then apply commands and player events until the
    /// handle is released or the player goes away.
    async fn serve(
        &self,
        mpv: &MpvHandle,
        mut mpv_rx: mpsc::Receiver<MpvEvent>,
        cmd_rx: &mut mpsc::UnboundedReceiver<Command>,
    ) {
        if let Err(e) = mpv.load(&self.src).await {
            warn!("audio: loadfile failed: {}", e);
            self.emit(AudioSignal::Error).await;
        }

        // Set once the current file stopped for any reason; play reloads it.
        let mut ended = false;

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.apply(mpv, cmd, &mut ended).await,
                    None => break,
                },
                evt = mpv_rx.recv() => match evt {
                    Some(evt) => self.on_mpv_event(&evt, &mut ended).await,
                    None => {
                        warn!("audio: player connection lost for {}", self.src);
                        self.emit(AudioSignal::Error).await;
                        self.drain_dead(cmd_rx, "player exited").await;
                        break;
                    }
                },
            }
        }
    }

    async fn apply(&self, mpv: &MpvHandle, cmd: Command, ended: &mut bool) {
        match cmd {
            Command::Play(reply) => {
                let result = self.start(mpv, ended).await;
                let _ = reply.send(result);
            }
            Command::Pause => {
                if let Err(e) = mpv.set_pause(true).await {
                    warn!("audio: pause failed: {}", e);
                }
            }
            Command::Rewind => {
                if let Err(e) = mpv.rewind().await {
                    debug!("audio: rewind ignored: {}", e);
                }
            }
            Command::SetMuted(muted) => {
                if let Err(e) = mpv.set_mute(muted).await {
                    warn!("audio: mute failed: {}", e);
                }
            }
            Command::SetVolume(level) => {
                if let Err(e) = mpv.set_volume(level).await {
                    warn!("audio: volume failed: {}", e);
                }
            }
        }
    }

    async fn start(&self, mpv: &MpvHandle, ended: &mut bool) -> Result<(), PlaybackError> {
        let fail = |e: anyhow::Error| PlaybackError::StartFailed(e.to_string());
        if *ended || mpv.is_idle().await.unwrap_or(false) {
            debug!("audio: reloading {}", self.src);
            mpv.load(&self.src).await.map_err(fail)?;
            *ended = false;
        }
        mpv.set_pause(false).await.map_err(fail)
    }

    async fn on_mpv_event(&self, evt: &MpvEvent, ended: &mut bool) {
        match evt.event_name() {
            Some("start-file") => self.emit(AudioSignal::LoadStart).await,
            Some("file-loaded") => self.emit(AudioSignal::CanPlay).await,
            Some("end-file") => {
                *ended = true;
                match evt.end_reason() {
                    Some("error") => {
                        warn!(
                            "audio: stream error for {}: {}",
                            self.src,
                            evt.file_error().unwrap_or("unknown")
                        );
                        self.emit(AudioSignal::Error).await;
                    }
                    reason => debug!("audio: end-file reason={:?}", reason),
                }
            }
            _ => {}
        }
    }

    /// The player is unusable: fail every play request until the handle is
    /// released.
    async fn drain_dead(&self, cmd_rx: &mut mpsc::UnboundedReceiver<Command>, reason: &str) {
        while let Some(cmd) = cmd_rx.recv().await {
            if let Command::Play(reply) = cmd {
                let _ = reply.send(Err(PlaybackError::StartFailed(reason.to_string())));
            }
        }
    }
}
