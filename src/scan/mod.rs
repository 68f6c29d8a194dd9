//! QR scan sessions
//!
//! A session turns decoder output into at most one attendance submission at
//! a time. The state machine lives in `controller`; `session` drives it from
//! async sources.

pub(crate) mod controller;
pub(crate) mod notice;
pub(crate) mod payload;
pub(crate) mod session;
pub(crate) mod state;

// Public API module - the only public interface for scan sessions
pub mod api;

#[cfg(test)]
mod tests;
