//! Headless tabletop application
//!
//! Configuration loading, code-side scene construction and the fixed-step
//! frame loop shared by the `tabletop` binary and its tests.

pub mod config;
pub mod scene;
pub mod systems;
