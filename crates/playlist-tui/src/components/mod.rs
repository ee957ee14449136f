pub mod header;
pub mod playback_panel;
pub mod station_selector;
