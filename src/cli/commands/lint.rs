//! Lint command implementation.
//!
//! Thin shell around [`crate::lint::engine`]: resolves the workspace
//! directory, maps CLI flags onto [`LintOptions`], and turns the outcome
//! into an exit code.

use std::path::PathBuf;

use crate::cli::args::LintArgs;
use crate::error::Result;
use crate::lint::{self, LintOptions, LintOutcome};

/// The lint command implementation.
pub struct LintCommand {
    options: LintOptions,
}

impl LintCommand {
    /// Build the command from parsed arguments.
    pub fn new(args: &LintArgs, verbose: bool) -> Self {
        let dir = args
            .dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        Self {
            options: LintOptions {
                dir,
                json: args.json,
                strict: args.strict,
                rules: args.rules.clone(),
                max_warn: args.max_warn,
                failfast: args.failfast,
                compat_codes: args.compat_codes,
                verbose,
            },
        }
    }

    /// Run lint, writing rendered diagnostics to stdout.
    pub fn execute(&self) -> Result<LintOutcome> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        lint::run(&self.options, &mut lock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> LintArgs {
        LintArgs {
            dir: Some(PathBuf::from("/tmp/ws")),
            json: true,
            strict: false,
            rules: "IMPORT".into(),
            max_warn: 2,
            failfast: false,
            compat_codes: true,
        }
    }

    #[test]
    fn flags_map_onto_options() {
        let cmd = LintCommand::new(&args(), true);
        assert_eq!(cmd.options.dir, PathBuf::from("/tmp/ws"));
        assert!(cmd.options.json);
        assert_eq!(cmd.options.rules, "IMPORT");
        assert_eq!(cmd.options.max_warn, 2);
        assert!(cmd.options.compat_codes);
        assert!(cmd.options.verbose);
    }

    #[test]
    fn missing_dir_falls_back_to_cwd() {
        let mut a = args();
        a.dir = None;
        let cmd = LintCommand::new(&a, false);
        assert!(cmd.options.dir.is_absolute() || cmd.options.dir == PathBuf::from("."));
    }
}
