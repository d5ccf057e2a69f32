//! `umafix` rewrites UMA plugin sources after a package import.
//!
//! It provides the core logic for the `umafix` command-line tool. The main
//! components are:
//!
//! - `patterns`: Pure text rules. `AttributeRule` strips an attribute line above
//!   a field declaration, `PrefixRule` namespaces bare identifiers.
//! - `replacer`: Applies compiled rules to target files and reports an
//!   `Outcome` per file.
//! - `config`: The built-in UMA targets, YAML target files and project root
//!   resolution.
//! - `output_formatter`: Text and JSON reports.

pub mod cli;
pub mod config;
pub mod errors;
pub mod output_formatter;
pub mod patterns;
pub mod replacer;

// Re-export main types for easier access by library users.
pub use config::{ConfigLoader, Operation, PatchConfig, Target};
pub use errors::{Error, Result};
pub use output_formatter::{OutputFormat, OutputFormatter};
pub use patterns::Rule;
pub use replacer::{Outcome, Replacer, RunSummary};
