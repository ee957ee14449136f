//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - `tokio::mpsc` channels carry terminal events, audio signals and play
//!   results in from background tasks.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use playlist_core::catalog::Catalog;
use playlist_core::station::StationId;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    audio::{AudioBackend, AudioEvent, PlaybackError},
    component::Component,
    components::{
        header::Header,
        playback_panel::{PanelProps, PendingPlay, PlaybackPanel},
        station_selector::StationSelector,
    },
    focus::FocusRing,
    widgets::status_bar,
};

// ── Internal event bus ────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    Audio(AudioEvent),
    PlayResolved {
        generation: u64,
        result: Result<(), PlaybackError>,
    },
}

/// Last-drawn pane rects: used for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
struct PaneAreas {
    station_selector: Rect,
    playback_panel: Rect,
}

/// How long the terminal reader blocks before rechecking the inbox.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Forward terminal events into the loop's inbox until it is closed or the
/// source fails.  `next_event` yields `Ok(None)` when the poll window
/// passed without input.
fn forward_events<F>(tx: &mpsc::Sender<AppMessage>, mut next_event: F)
where
    F: FnMut(Duration) -> io::Result<Option<Event>>,
{
    while !tx.is_closed() {
        match next_event(INPUT_POLL) {
            Ok(Some(ev)) => {
                if tx.blocking_send(AppMessage::Event(ev)).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("terminal event read failed: {}", e);
                break;
            }
        }
    }
    debug!("terminal reader stopped");
}

fn poll_terminal(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

fn hit(r: Rect, col: u16, row: u16) -> bool {
    r.width > 0 && r.height > 0 && col >= r.x && col < r.right() && row >= r.y && row < r.bottom()
}

pub struct App {
    pub state: AppState,

    header: Header,
    station_selector: StationSelector,
    playback_panel: PlaybackPanel,
    focus: FocusRing,
    pane_areas: PaneAreas,

    msg_tx: mpsc::Sender<AppMessage>,
    msg_rx: mpsc::Receiver<AppMessage>,
    audio_rx: mpsc::Receiver<AudioEvent>,

    should_quit: bool,
}

impl App {
    pub fn new(catalog: Catalog, backend: Arc<dyn AudioBackend>) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(1024);
        let (audio_tx, audio_rx) = mpsc::channel(64);

        let state = AppState::new(catalog);
        let mut station_selector = StationSelector::new();
        station_selector.sync_stations(&state.catalog);
        let focus = FocusRing::new(vec![station_selector.id()]);

        Self {
            state,
            header: Header::new(),
            station_selector,
            playback_panel: PlaybackPanel::new(backend, audio_tx),
            focus,
            pane_areas: PaneAreas::default(),
            msg_tx,
            msg_rx,
            audio_rx,
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        // Closing the inbox stops the terminal reader at its next poll.
        self.msg_rx.close();
        self.playback_panel.set_props(None);
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("playlist-radio exiting");

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.msg_tx.clone();
        tokio::task::spawn_blocking(move || forward_events(&event_tx, poll_terminal));

        // Spinner animation.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }

            if self.should_quit {
                break;
            }

            tokio::select! {
                msg = self.next_message() => match msg {
                    Some(msg) => needs_redraw = self.handle_message(msg),
                    None => break,
                },
                _ = ui_tick.tick() => {
                    needs_redraw = self.playback_panel.state().is_loading;
                    self.station_selector.tick(&self.state);
                    self.playback_panel.tick(&self.state);
                }
            }
        }
        Ok(())
    }

    async fn next_message(&mut self) -> Option<AppMessage> {
        tokio::select! {
            Some(msg) = self.msg_rx.recv() => Some(msg),
            Some(evt) = self.audio_rx.recv() => Some(AppMessage::Audio(evt)),
            else => None,
        }
    }

    /// Returns whether a redraw is needed.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    for a in self.handle_key(key) {
                        self.dispatch(a);
                    }
                }
                Event::Mouse(mouse) => {
                    for a in self.handle_mouse(mouse) {
                        self.dispatch(a);
                    }
                }
                Event::Resize(w, h) => debug!("resize {}x{}", w, h),
                _ => return false,
            },
            AppMessage::Audio(evt) => self.playback_panel.on_audio_event(evt),
            AppMessage::PlayResolved { generation, result } => {
                self.playback_panel.on_play_resolved(generation, result)
            }
        }
        true
    }

    // ── Keyboard ──────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE => return vec![Action::Quit],
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::Quit]
            }
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            _ => {}
        }

        // Playback keys reach the panel from any focus.
        if self.playback_panel.is_visible()
            && matches!(
                key.code,
                KeyCode::Char(' ')
                    | KeyCode::Char('s')
                    | KeyCode::Char('m')
                    | KeyCode::Left
                    | KeyCode::Right
            )
        {
            return self.playback_panel.handle_key(key, &self.state);
        }

        let s = &self.state;
        match self.focus.current() {
            Some(ComponentId::StationSelector) => self.station_selector.handle_key(key, s),
            Some(ComponentId::PlaybackPanel) => self.playback_panel.handle_key(key, s),
            _ => vec![],
        }
    }

    // ── Mouse ─────────────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let areas = self.pane_areas;
        let s = &self.state;

        // A slider drag keeps going wherever the pointer wanders.
        if self.playback_panel.is_dragging() {
            return self
                .playback_panel
                .handle_mouse(event, areas.playback_panel, s);
        }

        if !matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        ) {
            return vec![];
        }

        let (col, row) = (event.column, event.row);
        let (id, mut actions) = if hit(areas.playback_panel, col, row) {
            (
                self.playback_panel.id(),
                self.playback_panel
                    .handle_mouse(event, areas.playback_panel, s),
            )
        } else if hit(areas.station_selector, col, row) {
            (
                self.station_selector.id(),
                self.station_selector
                    .handle_mouse(event, areas.station_selector, s),
            )
        } else {
            return vec![];
        };

        if matches!(event.kind, MouseEventKind::Down(_)) && !self.focus.is_focused(id) {
            actions.insert(0, Action::FocusPane(id));
        }
        actions
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = self.station_selector.on_action(&action, s);
            out.extend(self.playback_panel.on_action(&action, s));
            out
        };

        self.apply_action(action);

        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::SelectStation(id) => self.select_station(id),
            Action::TogglePlay => {
                if let Some(pending) = self.playback_panel.toggle_play() {
                    self.spawn_play(pending);
                }
            }
            Action::Stop => self.playback_panel.stop(),
            Action::ToggleMute => self.playback_panel.toggle_mute(),
            Action::SetVolume(v) => self.playback_panel.set_volume(v),
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),
            Action::Quit => self.should_quit = true,
        }
    }

    fn select_station(&mut self, id: StationId) {
        if self.state.catalog.get(&id).is_none() {
            warn!("selected unknown station '{}'", id);
        } else {
            info!("selected station '{}'", id);
        }
        self.state.selected_station = Some(id);

        let is_visible = self.state.selected_station.is_some();
        let props = self.state.selected().map(|s| PanelProps {
            stream_url: s.stream_url.clone(),
            station_name: s.name.clone(),
            station_logo: s.logo_url.clone(),
            is_visible,
        });
        self.playback_panel.set_props(props);
        debug!(
            "playback panel bound to generation {}",
            self.playback_panel.generation()
        );

        let mut ring = vec![self.station_selector.id()];
        if self.playback_panel.is_visible() {
            ring.push(self.playback_panel.id());
        }
        self.focus.set_items(ring);
    }

    /// Await the play request off-loop and post the outcome back.
    fn spawn_play(&self, pending: PendingPlay) {
        let PendingPlay { generation, future } = pending;
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let result = future.await;
            let _ = tx.send(AppMessage::PlayResolved { generation, result }).await;
        });
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        use crate::theme::C_BG;
        use ratatui::widgets::Block;
        let area = frame.area();

        frame.render_widget(
            Block::default().style(ratatui::style::Style::default().bg(C_BG)),
            area,
        );

        // ── Outer layout: header | sep | body | sep | footer | keys ──────────
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(self.header.min_height()),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let header_focused = self.focus.is_focused(self.header.id());
        self.header.draw(frame, outer[0], header_focused, &self.state);
        status_bar::draw_separator(frame, outer[1]);
        self.draw_body(frame, outer[2]);
        status_bar::draw_separator(frame, outer[3]);
        status_bar::draw_footer(frame, outer[4]);
        status_bar::draw_keys_bar(frame, outer[5], self.playback_panel.is_visible());
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let entries = self.state.catalog.len().max(1) as u16;
        let selector_h = (2 + 2 * entries).max(self.station_selector.min_height());
        let panel_h = if self.playback_panel.is_visible() {
            self.playback_panel.min_height()
        } else {
            0
        };

        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(selector_h),
                Constraint::Length(panel_h),
                Constraint::Min(0),
            ])
            .split(area);

        let selector_focused = self.focus.is_focused(self.station_selector.id());
        let panel_focused = self.focus.is_focused(self.playback_panel.id());
        let s = &self.state;
        self.station_selector.draw(frame, body[0], selector_focused, s);
        self.playback_panel.draw(frame, body[1], panel_focused, s);

        self.pane_areas = PaneAreas {
            station_selector: body[0],
            playback_panel: body[1],
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioSignal;
    use crate::components::playback_panel::PlaybackState;
    use crate::test_support::{Call, FakeBackend};
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::{MouseButton, MouseEvent};

    const COOL_URL: &str = "https://stream.zeno.fm/7tjjwkmvexqvv";

    fn two_stations() -> Catalog {
        Catalog::from_toml_str(
            r#"
            [[station]]
            id = "a"
            name = "Radio A"
            slogan = "Primera"
            stream_url = "http://a/stream"

            [[station]]
            id = "b"
            name = "Radio B"
            slogan = "Segunda"
            stream_url = "http://b/stream"
            "#,
        )
        .unwrap()
    }

    fn app_with(catalog: Catalog) -> (App, FakeBackend) {
        let backend = FakeBackend::new();
        let app = App::new(catalog, Arc::new(backend.clone()));
        (app, backend)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn pump(app: &mut App) {
        let msg = tokio::time::timeout(Duration::from_secs(1), app.next_message())
            .await
            .expect("no message within 1s")
            .expect("channels closed");
        app.handle_message(msg);
    }

    #[test]
    fn test_initial_screen_has_no_panel() {
        let (mut app, backend) = app_with(Catalog::builtin().unwrap());
        let text = screen(&mut app);
        assert!(text.contains("Playlist.com.ar"));
        assert!(text.contains("Tu estación de radio online favorita"));
        assert!(text.contains("Selecciona tu emisora"));
        assert!(text.contains("Cool - Playlist Group"));
        assert!(text.contains("© 2024 Playlist.com.ar - Todos los derechos reservados"));
        assert!(!text.contains("Reproduciendo"));
        assert!(backend.opened().is_empty());
        assert_eq!(app.state.selected_station, None);
    }

    #[tokio::test]
    async fn test_select_and_play_cool_playlist() {
        let (mut app, backend) = app_with(Catalog::builtin().unwrap());

        app.dispatch(Action::SelectStation(StationId::from("cool-playlist")));
        let text = screen(&mut app);
        assert!(text.contains("Reproduciendo"));
        assert!(text.contains("Cool - Playlist Group"));
        assert!(text.contains("●"));
        assert!(text.contains(" 70%"));

        app.dispatch(Action::TogglePlay);
        assert!(app.playback_panel.state().is_loading);
        assert_eq!(backend.opened(), vec![(COOL_URL.to_string(), 1)]);
        assert!(backend.calls_for(1).contains(&Call::Play));

        pump(&mut app).await;
        let st = app.playback_panel.state();
        assert!(st.is_playing);
        assert!(!st.is_loading);
    }

    #[tokio::test]
    async fn test_selecting_other_station_resets_panel() {
        let (mut app, backend) = app_with(two_stations());
        app.dispatch(Action::SelectStation(StationId::from("a")));
        app.dispatch(Action::SetVolume(10));
        app.dispatch(Action::ToggleMute);
        app.dispatch(Action::TogglePlay);
        pump(&mut app).await;
        assert!(app.playback_panel.state().is_playing);

        app.dispatch(Action::SelectStation(StationId::from("b")));
        assert_eq!(app.playback_panel.state(), PlaybackState::default());
        assert_eq!(app.playback_panel.src(), Some("http://b/stream"));
        assert_eq!(backend.dropped(), vec![1]);

        app.dispatch(Action::TogglePlay);
        assert!(backend.calls_for(2).contains(&Call::Play));
    }

    #[test]
    fn test_reselecting_same_station_keeps_playback() {
        let (mut app, backend) = app_with(two_stations());
        app.dispatch(Action::SelectStation(StationId::from("a")));
        app.dispatch(Action::SetVolume(30));
        app.dispatch(Action::SelectStation(StationId::from("a")));
        assert_eq!(backend.opened().len(), 1);
        assert_eq!(app.playback_panel.state().volume, 30);
    }

    #[tokio::test]
    async fn test_failed_play_is_absorbed() {
        let (mut app, backend) = app_with(two_stations());
        backend.fail_play_with("unreachable");
        app.dispatch(Action::SelectStation(StationId::from("a")));
        app.dispatch(Action::TogglePlay);
        pump(&mut app).await;
        let st = app.playback_panel.state();
        assert!(!st.is_playing);
        assert!(!st.is_loading);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_audio_error_signal_reverts_play_state() {
        let (mut app, _backend) = app_with(two_stations());
        app.dispatch(Action::SelectStation(StationId::from("a")));
        app.handle_message(AppMessage::PlayResolved {
            generation: 1,
            result: Ok(()),
        });
        assert!(app.playback_panel.state().is_playing);
        app.handle_message(AppMessage::Audio(AudioEvent {
            generation: 1,
            signal: AudioSignal::Error,
        }));
        assert!(!app.playback_panel.state().is_playing);
    }

    #[test]
    fn test_keyboard_flow() {
        let (mut app, _backend) = app_with(two_stations());

        // No panel yet: Space selects the cursor row.
        app.handle_message(AppMessage::Event(key(KeyCode::Down)));
        app.handle_message(AppMessage::Event(key(KeyCode::Char(' '))));
        assert_eq!(app.state.selected_station, Some(StationId::from("b")));

        // Panel visible: volume keys work while the selector has focus.
        assert!(app.focus.is_focused(ComponentId::StationSelector));
        app.handle_message(AppMessage::Event(key(KeyCode::Left)));
        assert_eq!(app.playback_panel.state().volume, 65);
        app.handle_message(AppMessage::Event(key(KeyCode::Char('m'))));
        assert!(app.playback_panel.state().is_muted);

        app.handle_message(AppMessage::Event(key(KeyCode::Tab)));
        assert!(app.focus.is_focused(ComponentId::PlaybackPanel));
        app.handle_message(AppMessage::Event(key(KeyCode::Char('0'))));
        assert_eq!(app.playback_panel.state().volume, 0);

        app.handle_message(AppMessage::Event(key(KeyCode::Char('q'))));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let (mut app, _backend) = app_with(two_stations());
        app.handle_message(AppMessage::Event(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        ))));
        assert!(app.should_quit);
    }

    #[test]
    fn test_click_row_selects_and_focuses() {
        let (mut app, _backend) = app_with(two_stations());
        screen(&mut app);
        let sel = app.pane_areas.station_selector;
        app.handle_message(AppMessage::Event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: sel.x + 3,
            row: sel.y + 3,
            modifiers: KeyModifiers::NONE,
        })));
        assert_eq!(app.state.selected_station, Some(StationId::from("b")));

        // The panel appears after the next draw; clicking it moves focus.
        screen(&mut app);
        let panel = app.pane_areas.playback_panel;
        assert!(panel.height > 0);
        app.handle_message(AppMessage::Event(Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: panel.x + 1,
            row: panel.y,
            modifiers: KeyModifiers::NONE,
        })));
        assert!(app.focus.is_focused(ComponentId::PlaybackPanel));
    }

    #[test]
    fn test_volume_slider_scenario_on_screen() {
        let (mut app, _backend) = app_with(Catalog::builtin().unwrap());
        app.dispatch(Action::SelectStation(StationId::from("cool-playlist")));

        app.dispatch(Action::SetVolume(0));
        let text = screen(&mut app);
        assert!(text.contains("  0%"));
        assert!(text.contains("🔇"));

        app.dispatch(Action::SetVolume(50));
        let text = screen(&mut app);
        assert!(text.contains(" 50%"));
        assert!(text.contains("🔊"));
        assert!(!text.contains("🔇"));
    }

    #[tokio::test]
    async fn test_terminal_reader_stops_when_inbox_closes() {
        let (tx, mut rx) = mpsc::channel(4);
        let reader = tokio::task::spawn_blocking(move || {
            forward_events(&tx, |_| {
                std::thread::sleep(Duration::from_millis(5));
                Ok(None)
            })
        });
        rx.close();
        tokio::time::timeout(Duration::from_secs(2), reader)
            .await
            .expect("terminal reader kept running after the inbox closed")
            .unwrap();
    }

    #[tokio::test]
    async fn test_terminal_reader_forwards_input() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut input = vec![key(KeyCode::Char('q'))];
        let reader = tokio::task::spawn_blocking(move || {
            forward_events(&tx, move |_| {
                std::thread::sleep(Duration::from_millis(5));
                Ok(input.pop())
            })
        });

        match tokio::time::timeout(Duration::from_secs(1), rx.recv()).await {
            Ok(Some(AppMessage::Event(Event::Key(k)))) => assert_eq!(k.code, KeyCode::Char('q')),
            other => panic!("expected forwarded key, got {:?}", other),
        }
        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), reader)
            .await
            .expect("terminal reader kept running after the inbox dropped")
            .unwrap();
    }

    #[tokio::test]
    async fn test_terminal_reader_stops_on_read_error() {
        let (tx, _rx) = mpsc::channel(4);
        let reader = tokio::task::spawn_blocking(move || {
            forward_events(&tx, |_| Err(io::Error::other("tty gone")))
        });
        tokio::time::timeout(Duration::from_secs(2), reader)
            .await
            .expect("terminal reader kept running after a read error")
            .unwrap();
    }

    #[test]
    fn test_focus_ring_follows_component_ids() {
        let (mut app, _backend) = app_with(two_stations());
        assert!(app.focus.is_focused(app.station_selector.id()));
        app.dispatch(Action::SelectStation(StationId::from("a")));
        app.dispatch(Action::FocusNext);
        assert!(app.focus.is_focused(app.playback_panel.id()));
        assert!(!app.focus.is_focused(app.header.id()));
    }
}
