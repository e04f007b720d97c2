//! dupfinder command line
//!
//! Thin layer over `dupfinder-core`: argument parsing, logging setup and
//! report output.

pub mod app;
pub mod cli;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::Cli;
pub use error::{CliError, CliResult};
