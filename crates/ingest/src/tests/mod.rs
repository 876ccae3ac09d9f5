//! Crate-internal integration tests.
