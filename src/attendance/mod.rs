//! Attendance submission backends
//!
//! The scan session only knows the [`traits::AttendanceApi`] seam. The HTTP
//! client talks to the events backend; the link launcher is the
//! pass-through variant for payloads that are plain links.

pub(crate) mod error;
pub(crate) mod http;
pub(crate) mod link;
pub(crate) mod traits;

// Public API module - the only public interface for attendance backends
pub mod api;
