//! Port traits the engine host depends on.

pub mod config_port;
pub mod feed_port;
