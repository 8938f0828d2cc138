//! Port traits decoupling the domain from concrete infrastructure.

pub mod config_port;
pub mod data_port;
pub mod results_port;
pub mod search_port;
