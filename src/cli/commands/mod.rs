//! CLI command implementations.

pub mod lint;

pub use lint::LintCommand;
