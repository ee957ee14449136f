/// mpv IPC driver with separated reader/writer tasks.
///
/// ```text
///   MpvDriver::spawn_and_connect()
///         │
///         ├── writer_task   ← receives PendingRequest via mpsc, serialises → socket
///         └── reader_task   ← reads JSON lines from socket
///                                ├── response (has request_id) → matched oneshot::Sender
///                                └── event (start-file, end-file, …) → event_tx channel
/// ```
///
/// One driver owns one mpv process.  The process is killed when the driver
/// is dropped, and the reader task closes the event channel once the socket
/// goes away, which is how callers learn that the player is gone.
///
/// Platform notes:
/// - Unix:    Unix domain sockets
/// - Windows: Named pipes  \\.\pipe\<name>
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

/// How long to wait for mpv to answer a single IPC command.
const IPC_TIMEOUT: tokio::time::Duration = tokio::time::Duration::from_secs(5);

type Reply = oneshot::Sender<anyhow::Result<Value>>;
type PendingMap = Arc<Mutex<HashMap<u64, Reply>>>;

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line, '\n' terminated
    reply: Reply,
}

/// An unsolicited mpv message (no request_id).
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

impl MpvEvent {
    /// The event name, e.g. "start-file", "file-loaded", "end-file".
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }

    /// `reason` field of an `end-file` event ("eof", "stop", "error", …).
    pub fn end_reason(&self) -> Option<&str> {
        self.raw.get("reason")?.as_str()
    }

    /// `file_error` detail mpv attaches to `end-file` when reason is "error".
    pub fn file_error(&self) -> Option<&str> {
        self.raw.get("file_error")?.as_str()
    }
}

/// Cloneable handle to the writer task.  `send()` fires a command and
/// resolves with mpv's reply.
#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut raw = serde_json::to_string(&msg)?;
        raw.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload: raw,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(IPC_TIMEOUT, reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    pub async fn load(&self, url: &str) -> anyhow::Result<()> {
        debug!("mpv: loadfile {}", url);
        self.send(json!(["loadfile", url])).await?;
        Ok(())
    }

    pub async fn set_pause(&self, paused: bool) -> anyhow::Result<()> {
        self.send(json!(["set_property", "pause", paused])).await?;
        Ok(())
    }

    /// Seek back to the start.  Live streams are usually not seekable, in
    /// which case mpv answers with an error.
    pub async fn rewind(&self) -> anyhow::Result<()> {
        self.send(json!(["seek", 0, "absolute"])).await?;
        Ok(())
    }

    pub async fn set_mute(&self, muted: bool) -> anyhow::Result<()> {
        self.send(json!(["set_property", "mute", muted])).await?;
        Ok(())
    }

    /// `level` is 0.0..=1.0; mpv's own scale is percent.
    pub async fn set_volume(&self, level: f32) -> anyhow::Result<()> {
        let vol_pct = (level * 100.0).clamp(0.0, 100.0);
        self.send(json!(["set_property", "volume", vol_pct])).await?;
        Ok(())
    }

    /// True when mpv has nothing loaded (never loaded, or the file ended).
    pub async fn is_idle(&self) -> anyhow::Result<bool> {
        let resp = self.send(json!(["get_property", "idle-active"])).await?;
        Ok(resp["data"].as_bool().unwrap_or(true))
    }
}

/// Owns one mpv child process.
pub struct MpvDriver {
    socket_name: String,
    binary: Option<PathBuf>,
    extra_args: Vec<String>,
    stderr_log: Option<PathBuf>,
    process: Option<tokio::process::Child>,
}

impl MpvDriver {
    pub fn new(socket_name: String, binary: Option<PathBuf>, extra_args: Vec<String>) -> Self {
        Self {
            socket_name,
            binary,
            extra_args,
            stderr_log: None,
            process: None,
        }
    }

    /// Append mpv's stderr to this file instead of discarding it.
    pub fn with_stderr_log(mut self, path: PathBuf) -> Self {
        self.stderr_log = Some(path);
        self
    }

    fn command(&self) -> anyhow::Result<tokio::process::Command> {
        let binary = self
            .binary
            .clone()
            .ok_or_else(|| anyhow::anyhow!("mpv binary not found"))?;

        let stderr = match &self.stderr_log {
            Some(path) => std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map(std::process::Stdio::from)
                .unwrap_or_else(|e| {
                    warn!("mpv: cannot open stderr log {:?}: {}", path, e);
                    std::process::Stdio::null()
                }),
            None => std::process::Stdio::null(),
        };

        let mut cmd = tokio::process::Command::new(binary);
        // Start paused: the stream is fetched as soon as it is loaded but
        // nothing is heard until an explicit play.
        cmd.arg("--no-video")
            .arg("--idle=yes")
            .arg("--pause=yes")
            .arg("--force-window=no")
            .arg("--quiet")
            .arg(playlist_core::platform::mpv_socket_arg(&self.socket_name))
            .args(&self.extra_args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(stderr)
            .kill_on_drop(true);
        Ok(cmd)
    }

    #[cfg(unix)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        let socket_path = PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        let child = self.command()?.spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);

        // Wait for the socket to appear
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to {}", self.socket_name);
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(read_half, write_half, event_tx))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        let child = self.command()?.spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to named pipe {}", pipe_path);
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(read_half, write_half, event_tx));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }

    /// Kill the process if running.
    pub async fn kill(&mut self) {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }
    }
}

impl Drop for MpvDriver {
    fn drop(&mut self) {
        // The child itself is killed by `kill_on_drop`.
        #[cfg(unix)]
        if self.process.is_some() {
            let _ = std::fs::remove_file(&self.socket_name);
        }
    }
}

pub(crate) fn start_io_tasks<R, W>(read_half: R, write_half: W, event_tx: mpsc::Sender<MpvEvent>) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    // req_id → reply channel; the writer inserts, the reader resolves.
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);

    tokio::spawn(writer_task(write_half, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(BufReader::new(read_half), pending, event_tx));

    MpvHandle { tx: cmd_tx }
}

async fn fail_all(pending: &PendingMap, reason: &str) {
    let mut map = pending.lock().await;
    for (_, tx) in map.drain() {
        let _ = tx.send(Err(anyhow::anyhow!("{}", reason)));
    }
}

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap, event_tx: mpsc::Sender<MpvEvent>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                fail_all(&pending, "mpv IPC connection closed").await;
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };

                if let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) {
                    let mut map = pending.lock().await;
                    match map.remove(&req_id) {
                        Some(tx) => {
                            let _ = tx.send(reply_result(req_id, val));
                        }
                        None => debug!("mpv reader: response for unknown req={}", req_id),
                    }
                } else {
                    debug!("mpv reader: event {}", trimmed);
                    if event_tx.send(MpvEvent { raw: val }).await.is_err() {
                        // Nobody listens any more; the owner is shutting down.
                        break;
                    }
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                fail_all(&pending, &format!("mpv IPC read error: {}", e)).await;
                break;
            }
        }
    }
}

fn reply_result(req_id: u64, val: Value) -> anyhow::Result<Value> {
    if val["error"].as_str() == Some("success") {
        debug!("mpv reader: response req={} ok", req_id);
        Ok(val)
    } else {
        let err = val["error"].as_str().unwrap_or("unknown error").to_string();
        debug!("mpv reader: response req={} err={}", req_id, err);
        Err(anyhow::anyhow!("mpv error: {}", err))
    }
}

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register before writing so the reader can always match the reply.
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: send req={} payload={}", req.req_id, req.payload.trim());
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}
