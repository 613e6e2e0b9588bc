//! Engine configuration and process-level setup

pub mod config;
pub mod constants;
pub mod logging;

pub use config::{EngineConfig, UnknownFieldPolicy};
pub use logging::init_logging;
