//! UI components for the map-notes client.

mod locate_button;
mod map_view;
mod menu;
mod status_bar;

pub use locate_button::LocateButton;
pub use map_view::MapView;
pub use menu::Menu;
pub use status_bar::StatusBar;
