pub mod app;
pub mod attendance;
pub mod core;
pub mod notifications;
pub mod scan;
