//! Panels of the player UI. The spectrum overlay lives in `crate::overlay`.

pub mod file_list;
pub mod player_panel;

pub use file_list::render_file_list;
pub use player_panel::{render_player_panel, PlayerStatus};
