//! Rill - semantic analysis and lint diagnostics for the rill pipeline
//! language.
//!
//! The `rill lint` command loads the workspace manifest
//! (`rill.workspace`), runs every rule producer over the declared
//! packages and their `.rill` source units, applies the severity policy,
//! and renders deterministic NDJSON or human-readable diagnostics.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`diag`] - Diagnostic records and their rendered forms
//! - [`error`] - Error types and result aliases
//! - [`frontend`] - Source unit reading and syntax-tree value types
//! - [`graph`] - Pipeline graph construction and algorithms
//! - [`lint`] - Rule producers, severity policy, and orchestration
//! - [`workspace`] - Manifest loading and version constraints
//!
//! # Example
//!
//! ```no_run
//! use rill::lint::{run, LintOptions};
//!
//! let options = LintOptions {
//!     dir: "/path/to/workspace".into(),
//!     json: true,
//!     ..Default::default()
//! };
//! let outcome = run(&options, &mut std::io::stdout()).unwrap();
//! assert!(!outcome.failed);
//! ```

pub mod cli;
pub mod diag;
pub mod error;
pub mod frontend;
pub mod graph;
pub mod lint;
pub mod workspace;

pub use diag::{Diagnostic, Level, Position};
pub use error::{Result, RillError};
