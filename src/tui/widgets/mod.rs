// TUI widget modules for each screen zone.

pub mod board;
pub mod game_log;
pub mod help_bar;
pub mod quit_confirm;
pub mod status_bar;
