//! Vantage CLI - command-line client for the Vantage vector search platform
//!
//! Every command has the same shape: build one operation against the
//! platform, run it through the [`executor`], and hand the resulting
//! [`output::Printable`] to the [`output::Printer`].
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`client`] - Platform client trait, model types and HTTP implementation
//! - [`commands`] - One function per subcommand
//! - [`config`] - Config file loading and layered settings
//! - [`error`] - Error types and exit statuses
//! - [`executor`] - Runs an operation and classifies its failure
//! - [`output`] - Printable payloads and JSON/CSV rendering
//! - [`search`] - Search option assembly
//! - [`util`] - Masking and generic error messages
//! - [`validate`] - Local JSONL and Parquet validation

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod output;
pub mod search;
pub mod util;
pub mod validate;

pub use client::{HttpClient, VantageApi};
pub use config::{Config, Settings};
pub use error::{ApiError, ExitStatus, ValidationError};
pub use executor::{Classifier, CommandExecutor, Operation};
pub use output::{ContentKind, Destination, OutputFormat, Printable, Printer, RenderError};
