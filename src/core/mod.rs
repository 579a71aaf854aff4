//! Core model: content, timers, the sector rotator, the contact form.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Timer-driven types take an explicit `now` so tests drive a virtual clock.

pub mod analytics;
pub mod contact;
pub mod content;
pub mod reveal;
pub mod rotator;
pub mod schedule;
pub mod transport;
