//! CLI command implementations.

mod config;
mod doctor;
mod info;
mod mcp;
mod transcript;

pub use config::run_config;
pub use doctor::run_doctor;
pub use info::run_info;
pub use mcp::run_mcp;
pub use transcript::run_transcript;
