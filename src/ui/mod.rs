//! Terminal User Interface module.
//!
//! This module provides the TUI for the news reader, including:
//! - Main event loop (`run`)
//! - Input handling for the login, browse, detail and favorites screens
//! - Rendering for each screen plus the filter and help overlays
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Screen rendering dispatch
//! - `helpers` - Task spawning and pipeline dispatch
//! - `articles` - Article list widget
//! - `detail` - Article detail widget
//! - `favorites` - Saved articles widget
//! - `filters` - Filter editor overlay
//! - `help` - Keybinding help overlay
//! - `login` - Login screen
//! - `status` - Status bar widget

mod articles;
mod detail;
mod events;
mod favorites;
mod filters;
mod help;
mod helpers;
mod input;
mod login;
mod loop_runner;
mod render;
mod status;

pub use articles::format_relative_time;
pub use loop_runner::{run, Action};
