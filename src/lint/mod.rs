//! Lint engine: rule producers, severity policy, and orchestration.
//!
//! Rule producers live under [`rules`] and never fail; they return
//! diagnostics and the policy layer in [`policy`] decides what survives
//! and at which level. [`engine`] wires producers, policy, and rendering
//! together for the `rill lint` command.

pub mod engine;
pub mod pattern;
pub mod policy;
pub mod pragma;
pub mod rules;

pub use engine::{run, LintOptions, LintOutcome};
