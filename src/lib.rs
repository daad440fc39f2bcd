pub mod browser;
pub mod config;
pub mod genres;
pub mod output;
pub mod score;
pub mod session;
pub mod stderr_buffer;
pub mod store;
pub mod tui;
