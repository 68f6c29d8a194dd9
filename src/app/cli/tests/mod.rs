//! CLI and config tests
