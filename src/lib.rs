//! Hub Monitor (hubmon)
//!
//! Terminal monitor for a remote agent hub: lists the hub's sessions, shows a
//! transcript that refreshes incrementally as the hub reports changes over its
//! event stream, and offers the operator controls (send a message, emergency
//! stop, connection test, settings, HTML export).
//!
//! Pure Core / Impure Shell: [`state::AppState`] consumes events and returns
//! effects; [`runtime::Runtime`] and [`view`] perform the I/O.

pub mod commands;
pub mod config;
pub mod directory;
pub mod export;
pub mod feed;
pub mod hub;
pub mod logging;
pub mod model;
pub mod parser;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod view;

#[cfg(test)]
mod test_harness;

#[cfg(test)]
mod tests;
