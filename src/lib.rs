//! Simulation core for a falling-glyph effect: streaks of characters that
//! spawn, drop, fade and mutate under a live density target, with a
//! wrap-around depth axis for a forward-moving camera.
//!
//! The simulation lives in [`rain`]; [`app`] runs it on a fixed-cadence
//! worker thread and [`config`] / [`cli`] carry the ambient settings.

pub mod app;
pub mod cli;
pub mod config;
pub mod rain;
