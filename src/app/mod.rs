//! Application orchestration: routing, state, the event loop plumbing and
//! input handling.

pub mod contact_runtime;
pub mod event;
pub mod handler;
pub mod router;
pub mod state;
