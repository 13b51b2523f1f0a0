//! orgtree: organizational hierarchy engine
//!
//! Builds mentor forests from flat member lists, converts them into render
//! trees, thins wide or deep trees for display, and drives the chart viewport.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
