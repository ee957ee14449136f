//! PlaybackPanel component: transport and volume controls for the active
//! station.
//!
//! Owns the playback handle for the current stream URL and the four UI
//! flags (`is_playing`, `is_loading`, `volume`, `is_muted`).  The drawn
//! surface is a pure function of props and flags.
//!
//! ```text
//! ┌ Reproductor ───────────────────── EN VIVO ┐
//! │ ◉ Reproduciendo  Cool - Playlist Group     │
//! │   /lovable-uploads/…png                    │
//! │                                            │
//! │   [ ⏸ ]   [ ■ ]   En vivo                  │
//! │                                            │
//! │   🔊 ██████████████▋──────────────  70%    │
//! └────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    audio::{AudioBackend, AudioEvent, AudioHandle, AudioSignal, PlayFuture, PlaybackError},
    component::Component,
    theme::{style_button, C_ACCENT, C_CONNECTING, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY},
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        spinner, volume_slider,
    },
};

pub const TITLE: &str = "Reproductor";
pub const DEFAULT_VOLUME: u8 = 70;
const VOLUME_STEP: u8 = 5;
const BUTTON_W: u16 = 7;
const LABEL_W: u16 = 5;

/// Inputs from the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelProps {
    pub stream_url: String,
    pub station_name: String,
    pub station_logo: String,
    pub is_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_loading: bool,
    /// 0..=100
    pub volume: u8,
    pub is_muted: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_loading: false,
            volume: DEFAULT_VOLUME,
            is_muted: false,
        }
    }
}

impl PlaybackState {
    /// Percentage shown next to the slider.
    pub fn display_volume(&self) -> u8 {
        if self.is_muted {
            0
        } else {
            self.volume
        }
    }

    pub fn shows_muted_icon(&self) -> bool {
        self.is_muted || self.volume == 0
    }
}

/// A play request in flight.  The owner awaits `future` and reports the
/// outcome through `PlaybackPanel::on_play_resolved` with `generation`.
pub struct PendingPlay {
    pub generation: u64,
    pub future: PlayFuture,
}

/// Hit-test rects recorded on the last draw.
#[derive(Debug, Clone, Copy, Default)]
struct ControlAreas {
    play: Rect,
    stop: Rect,
    mute: Rect,
    slider: Rect,
}

fn hit(r: Rect, col: u16, row: u16) -> bool {
    r.width > 0 && r.height > 0 && col >= r.x && col < r.right() && row >= r.y && row < r.bottom()
}

pub struct PlaybackPanel {
    backend: Arc<dyn AudioBackend>,
    events_tx: mpsc::Sender<AudioEvent>,
    props: Option<PanelProps>,
    state: PlaybackState,
    audio: Option<Box<dyn AudioHandle>>,
    generation: u64,
    spinner_frame: usize,
    areas: ControlAreas,
    dragging: bool,
}

impl PlaybackPanel {
    pub fn new(backend: Arc<dyn AudioBackend>, events_tx: mpsc::Sender<AudioEvent>) -> Self {
        Self {
            backend,
            events_tx,
            props: None,
            state: PlaybackState::default(),
            audio: None,
            generation: 0,
            spinner_frame: 0,
            areas: ControlAreas::default(),
            dragging: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.props.as_ref().map_or(false, |p| p.is_visible)
    }

    /// Generation of the current handle (0 before the first one).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Source the current handle is bound to.
    pub fn src(&self) -> Option<&str> {
        self.audio.as_ref().map(|a| a.src())
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Apply new props.  A different stream URL, or hiding the panel,
    /// releases the current handle and resets every flag.
    pub fn set_props(&mut self, props: Option<PanelProps>) {
        let wanted = props
            .as_ref()
            .filter(|p| p.is_visible)
            .map(|p| p.stream_url.clone());

        if wanted.as_deref() != self.src() {
            self.release();
            if let Some(url) = &wanted {
                self.acquire(url);
            }
        }
        self.props = props;
    }

    fn release(&mut self) {
        if let Some(audio) = self.audio.take() {
            info!("playback: releasing {}", audio.src());
        }
        self.state = PlaybackState::default();
        self.dragging = false;
    }

    fn acquire(&mut self, url: &str) {
        self.generation += 1;
        info!("playback: opening {} (generation {})", url, self.generation);
        let audio = self
            .backend
            .open(url, self.generation, self.events_tx.clone());
        audio.set_volume(self.state.volume as f32 / 100.0);
        self.audio = Some(audio);
    }

    /// Request playback.  `None` when there is no handle.
    pub fn play(&mut self) -> Option<PendingPlay> {
        let audio = self.audio.as_ref()?;
        self.state.is_loading = true;
        Some(PendingPlay {
            generation: self.generation,
            future: audio.play(),
        })
    }

    /// The play/pause button.  Disabled while loading.
    pub fn toggle_play(&mut self) -> Option<PendingPlay> {
        if self.state.is_loading {
            debug!("playback: toggle ignored while loading");
            return None;
        }
        if self.state.is_playing {
            self.pause();
            None
        } else {
            self.play()
        }
    }

    pub fn on_play_resolved(&mut self, generation: u64, result: Result<(), PlaybackError>) {
        if generation != self.generation || self.audio.is_none() {
            debug!("playback: stale play result for generation {}", generation);
            return;
        }
        match result {
            Ok(()) => {
                self.state.is_playing = true;
                self.state.is_loading = false;
            }
            Err(e) => {
                error!("Error playing audio: {}", e);
                self.state.is_loading = false;
            }
        }
    }

    pub fn pause(&mut self) {
        if let Some(audio) = &self.audio {
            audio.pause();
            self.state.is_playing = false;
        }
    }

    pub fn stop(&mut self) {
        if let Some(audio) = &self.audio {
            audio.pause();
            audio.rewind();
        }
        self.state.is_playing = false;
    }

    pub fn toggle_mute(&mut self) {
        if let Some(audio) = &self.audio {
            self.state.is_muted = !self.state.is_muted;
            audio.set_muted(self.state.is_muted);
        }
    }

    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.state.volume = volume;
        let audio = self.audio.as_ref();
        if let Some(audio) = audio {
            audio.set_volume(volume as f32 / 100.0);
        }
        if volume == 0 {
            self.state.is_muted = true;
            if let Some(audio) = audio {
                audio.set_muted(true);
            }
        } else if self.state.is_muted {
            self.state.is_muted = false;
            if let Some(audio) = audio {
                audio.set_muted(false);
            }
        }
    }

    pub fn on_audio_event(&mut self, event: AudioEvent) {
        if event.generation != self.generation || self.audio.is_none() {
            debug!("playback: stale {:?} for generation {}", event.signal, event.generation);
            return;
        }
        match event.signal {
            AudioSignal::LoadStart => self.state.is_loading = true,
            AudioSignal::CanPlay => self.state.is_loading = false,
            AudioSignal::Error => {
                self.state.is_loading = false;
                self.state.is_playing = false;
            }
        }
    }

    fn volume_step_up(&self) -> Action {
        Action::SetVolume(self.state.volume.saturating_add(VOLUME_STEP).min(100))
    }

    fn volume_step_down(&self) -> Action {
        Action::SetVolume(self.state.volume.saturating_sub(VOLUME_STEP))
    }

    fn slider_action(&self, column: u16) -> Option<Action> {
        let s = self.areas.slider;
        let offset = column.saturating_sub(s.x);
        volume_slider::value_at(offset, s.width).map(Action::SetVolume)
    }

    fn play_glyph(&self) -> &'static str {
        if self.state.is_loading {
            spinner::frame(self.spinner_frame)
        } else if self.state.is_playing {
            "⏸"
        } else {
            "▶"
        }
    }

    fn status_span(&self) -> Span<'static> {
        if self.state.is_loading {
            Span::styled("Cargando…", Style::default().fg(C_CONNECTING))
        } else if self.state.is_playing {
            Span::styled("En vivo", Style::default().fg(C_PLAYING))
        } else {
            Span::styled("Detenido", Style::default().fg(C_MUTED))
        }
    }
}

impl Component for PlaybackPanel {
    fn id(&self) -> ComponentId {
        ComponentId::PlaybackPanel
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.is_visible() {
            return vec![];
        }
        let action = match key.code {
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('p') => Action::TogglePlay,
            KeyCode::Char('s') => Action::Stop,
            KeyCode::Char('m') => Action::ToggleMute,
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => self.volume_step_up(),
            KeyCode::Left | KeyCode::Char('-') => self.volume_step_down(),
            KeyCode::Home => Action::SetVolume(0),
            KeyCode::End => Action::SetVolume(100),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                Action::SetVolume((c as u8 - b'0') * 10)
            }
            _ => return vec![],
        };
        vec![action]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        if !self.is_visible() {
            return vec![];
        }
        let (col, row) = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if hit(self.areas.play, col, row) {
                    return vec![Action::TogglePlay];
                }
                if hit(self.areas.stop, col, row) {
                    return vec![Action::Stop];
                }
                if hit(self.areas.mute, col, row) {
                    return vec![Action::ToggleMute];
                }
                if hit(self.areas.slider, col, row) {
                    let action = self.slider_action(col);
                    self.dragging = action.is_some();
                    return action.into_iter().collect();
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.dragging => {
                return self.slider_action(col).into_iter().collect();
            }
            MouseEventKind::Up(_) => self.dragging = false,
            MouseEventKind::ScrollUp => return vec![self.volume_step_up()],
            MouseEventKind::ScrollDown => return vec![self.volume_step_down()],
            _ => {}
        }
        vec![]
    }

    fn tick(&mut self, _state: &AppState) {
        if self.state.is_loading {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, _state: &AppState) {
        self.areas = ControlAreas::default();
        let Some(props) = self.props.as_ref().filter(|p| p.is_visible) else {
            return;
        };

        let badge = self.state.is_playing.then_some(Badge {
            text: "EN VIVO",
            color: C_PLAYING,
        });
        let block = pane_chrome(TITLE, focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([Constraint::Length(1); 6]).split(inner);

        // ── Heading ──────────────────────────────────────────────────────────
        let heading = Line::from(vec![
            Span::styled(" ◉ ", Style::default().fg(C_ACCENT)),
            Span::styled("Reproduciendo  ", Style::default().fg(C_SECONDARY)),
            Span::styled(
                props.station_name.clone(),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(heading), rows[0]);
        if !props.station_logo.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("   {}", props.station_logo),
                    Style::default().fg(C_MUTED),
                )),
                rows[1],
            );
        }

        // ── Transport ────────────────────────────────────────────────────────
        let transport = rows[3];
        let left = transport.x.saturating_add(2);
        let play = Rect::new(left, transport.y, BUTTON_W, transport.height)
            .intersection(transport);
        let stop = Rect::new(left + BUTTON_W + 2, transport.y, BUTTON_W, transport.height)
            .intersection(transport);
        let status = Rect::new(
            left + 2 * (BUTTON_W + 2),
            transport.y,
            transport.width.saturating_sub(2 * (BUTTON_W + 2) + 2),
            transport.height,
        )
        .intersection(transport);

        frame.render_widget(
            Paragraph::new(self.play_glyph())
                .alignment(Alignment::Center)
                .style(style_button(!self.state.is_loading)),
            play,
        );
        frame.render_widget(
            Paragraph::new("■")
                .alignment(Alignment::Center)
                .style(style_button(true)),
            stop,
        );
        frame.render_widget(Paragraph::new(self.status_span()), status);

        // ── Volume ───────────────────────────────────────────────────────────
        let vol_row = rows[5];
        let mute = Rect::new(left, vol_row.y, 2, vol_row.height).intersection(vol_row);
        let slider_x = left + 3;
        let slider_w = vol_row
            .right()
            .saturating_sub(slider_x + LABEL_W + 2)
            .max(1);
        let slider = Rect::new(slider_x, vol_row.y, slider_w, vol_row.height).intersection(vol_row);
        let label = Rect::new(slider_x + slider_w + 1, vol_row.y, LABEL_W, vol_row.height)
            .intersection(vol_row);

        let (icon, icon_color) = if self.state.shows_muted_icon() {
            ("🔇", C_MUTED)
        } else {
            ("🔊", C_PRIMARY)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(icon, Style::default().fg(icon_color))),
            mute,
        );
        frame.render_widget(
            Paragraph::new(volume_slider::slider_line(
                self.state.volume,
                slider.width as usize,
                self.state.is_muted,
            )),
            slider,
        );
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("{:>3}%", self.state.display_volume()),
                Style::default().fg(C_SECONDARY),
            )),
            label,
        );

        self.areas = ControlAreas {
            play,
            stop,
            mute,
            slider,
        };
    }

    fn min_height(&self) -> u16 {
        // borders + 6 content rows
        8
    }
}
