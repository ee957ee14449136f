//! AppState: shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use playlist_core::catalog::Catalog;
use playlist_core::station::{Station, StationId};

pub struct AppState {
    pub catalog: Catalog,
    /// The one station whose playback panel is shown.  Set only through
    /// `Action::SelectStation`; there is no way back to `None`.
    pub selected_station: Option<StationId>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            selected_station: None,
        }
    }

    pub fn selected(&self) -> Option<&Station> {
        self.selected_station
            .as_ref()
            .and_then(|id| self.catalog.get(id))
    }

    pub fn is_selected(&self, id: &StationId) -> bool {
        self.selected_station.as_ref() == Some(id)
    }
}
