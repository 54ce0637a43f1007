//! Decronym command line interface library
//!
//! The binary in `main.rs` is a thin clap front end over these modules.

pub mod config;
pub mod credentials;
pub mod error;
pub mod orchestrators;
pub mod output;
pub mod paths;
pub mod terminal;

pub use config::{AppConfig, ConfigManager};
pub use error::{CliError, CliResult, ExitCode};
