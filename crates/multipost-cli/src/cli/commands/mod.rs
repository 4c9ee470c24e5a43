//! CLI command handlers.

mod config;
mod upload;

pub use config::run_config;
pub use upload::run_upload;
