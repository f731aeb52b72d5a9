// Library crate for the binary and integration tests.

pub mod audit;
pub mod config;
pub mod error;
pub mod log_capture;
pub mod pipeline;
pub mod report;
pub mod routes;
pub mod server;
pub mod settings;
pub mod state;
