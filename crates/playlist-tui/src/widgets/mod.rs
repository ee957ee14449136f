pub mod pane_chrome;
pub mod scrollable_list;
pub mod spinner;
pub mod status_bar;
pub mod volume_slider;
