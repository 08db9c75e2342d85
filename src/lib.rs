//! Interactive bump chart of Olympic country rankings.
//!
//! Everything except `app` and `ui` is renderer-independent: loading and
//! top-N selection live in [`data`], the chart geometry in [`chart`], and
//! the interaction state in [`state`].

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
