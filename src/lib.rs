//! Turns a project directory into a single reviewable document, and a
//! textual structure listing back into folders and placeholder files.

pub mod app;
pub mod config;
pub mod core;
pub mod utils;
