pub mod config;
pub mod logging;

pub mod error;
pub mod file;
pub mod host;
pub mod options;
pub mod payload;
pub mod plugin;
pub mod progress;
pub mod transport;
