//! Action enum: all user-initiated intents.

use playlist_core::station::StationId;

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Header,
    StationSelector,
    PlaybackPanel,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Selection ────────────────────────────────────────────────────────────
    SelectStation(StationId),

    // ── Playback ─────────────────────────────────────────────────────────────
    /// Play when stopped, pause when playing.  Ignored while loading.
    TogglePlay,
    Stop,
    ToggleMute,
    SetVolume(u8),

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
