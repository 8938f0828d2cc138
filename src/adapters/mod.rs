//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_results_adapter;
pub mod file_config_adapter;
pub mod random_search;
