//! Core domain types and logic.

pub mod alert;
pub mod config;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod indicator;
pub mod ledger;
pub mod observation;
pub mod portfolio;
pub mod position;
pub mod risk;
pub mod signal;
pub mod strategy;
