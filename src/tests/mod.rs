//! Internal test modules - whitebox tests with crate access
//!
//! Harness-based acceptance tests drive the whole application (state,
//! runtime, view) against an in-memory hub.

mod acceptance_sessions;
