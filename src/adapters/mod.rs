//! Concrete adapter implementations for ports.

pub mod csv_feed_adapter;
pub mod file_config_adapter;
