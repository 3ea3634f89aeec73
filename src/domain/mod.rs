//! Core domain types and logic.

pub mod company;
pub mod price_bar;
pub mod metrics;
pub mod fetch;
pub mod ranking;
pub mod run_config;
pub mod error;
