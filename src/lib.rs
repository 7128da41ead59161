pub mod audio;
pub mod config;
pub mod event;
pub mod player;
pub mod playlist;
pub mod ui;
pub mod util;
