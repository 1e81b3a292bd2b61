//! Building blocks of the `foodscan` command-line scanner.
//!
//! - [`app`]: acquisition wired to lookup
//! - [`zbar`] and [`camera`]: decoder and camera adapters
//! - [`settings`]: `settings.toml` and platform directories
//! - [`render`]: tables for terminal output
//! - [`logging`]: `tracing-subscriber` setup

pub mod app;
pub mod camera;
pub mod logging;
pub mod render;
pub mod settings;
pub mod zbar;
