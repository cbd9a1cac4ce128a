pub mod analysis;
pub mod config;
pub mod output;
pub mod satellite;
pub mod server;
