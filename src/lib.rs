//! confluence: multi-strategy signal fusion with risk-managed position tracking.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], and the command-line host in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
