//! Tests for scoped subscriptions and the shared service
