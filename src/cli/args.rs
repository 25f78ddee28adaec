//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rill - toolchain for the rill pipeline language.
#[derive(Debug, Parser)]
#[command(name = "rill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze the workspace and report diagnostics
    Lint(LintArgs),
}

/// Arguments for the `lint` command.
#[derive(Debug, Clone, clap::Args)]
pub struct LintArgs {
    /// Workspace directory (defaults to the current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Emit NDJSON records instead of human-readable lines
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Only run rules matching these patterns (comma-separated;
    /// substring, glob, or re:/.../ forms)
    #[arg(long, default_value = "")]
    pub rules: String,

    /// Maximum number of warnings tolerated; negative means unlimited
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub max_warn: i64,

    /// Fail the run if any warning survives
    #[arg(long)]
    pub failfast: bool,

    /// Attach legacy compatibility codes to emitted records
    #[arg(long)]
    pub compat_codes: bool,
}
