pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod events;
pub mod input;
pub mod logging;
pub mod mvi;
pub mod playback;
pub mod session;
pub mod shutdown;
pub mod terminal_guard;

pub use term_input::KeyCode;
