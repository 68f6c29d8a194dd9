//! Tests for the async scan session driver
