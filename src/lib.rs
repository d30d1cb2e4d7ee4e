//! Terminal news reader: headlines and search from a news API, saved
//! favorites, and a login gate.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod filters;
pub mod keybindings;
pub mod model;
pub mod pipeline;
pub mod platform;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
