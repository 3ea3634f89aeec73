//! Concrete adapter implementations for ports.

pub mod company_list_adapter;
pub mod figures;
pub mod file_config_adapter;
pub mod results_csv_adapter;
pub mod yahoo_adapter;
