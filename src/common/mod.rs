//! # Common Components
//!
//! Ambient utilities shared by the library and the binary.
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration and carrier format selection
//! - [`logging`]: `env_logger` setup for the command line

pub mod config;
pub mod logging;
