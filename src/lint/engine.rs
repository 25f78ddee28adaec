//! The lint orchestrator: runs every producer over a workspace, applies
//! the severity policy, and renders the result.
//!
//! Producer order is fixed and deterministic: manifest rules, then the
//! cross-package analyses, then per-root source work with children
//! linted before their parents and the main package last. Rendering is
//! NDJSON (one record per line, terminated by a `SUMMARY` record) or the
//! human one-line form; both modes agree on the final counts.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::diag::{Diagnostic, Level};
use crate::error::{Result, RillError};
use crate::frontend::parse_source;
use crate::lint::pattern::parse_list;
use crate::lint::policy::{compat_code, Policy};
use crate::lint::pragma::PragmaTable;
use crate::lint::rules::{self, codes};
use crate::workspace::{Workspace, MANIFEST_NAME};

/// Options for one lint run.
#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Workspace directory (holds `rill.workspace`).
    pub dir: PathBuf,
    /// Emit NDJSON instead of the human form.
    pub json: bool,
    /// Promote warnings to errors (OR-ed with the manifest option).
    pub strict: bool,
    /// Comma-separated rule patterns; empty keeps every rule.
    pub rules: String,
    /// Warnings tolerated before the run fails; negative is unlimited.
    pub max_warn: i64,
    /// Fail the run if any warning survives.
    pub failfast: bool,
    /// Attach legacy `compat_code` entries to rendered records.
    pub compat_codes: bool,
    /// Mirror the NDJSON stream to `build/debug/lint.ndjson`.
    pub verbose: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            json: false,
            strict: false,
            rules: String::new(),
            max_warn: -1,
            failfast: false,
            compat_codes: false,
            verbose: false,
        }
    }
}

/// The result of a lint run.
#[derive(Debug, Clone)]
pub struct LintOutcome {
    /// Surviving diagnostics, in emission order.
    pub diagnostics: Vec<Diagnostic>,
    pub errors: usize,
    pub warnings: usize,
    /// Whether the run counts as failed.
    pub failed: bool,
}

/// Run lint over the workspace at `options.dir`, writing rendered output
/// to `out`.
pub fn run(options: &LintOptions, out: &mut dyn Write) -> Result<LintOutcome> {
    let ws = match Workspace::load(&options.dir) {
        Ok(ws) => ws,
        Err(err) => {
            let diag = load_failure_diag(&err);
            return render(options, vec![diag], out);
        }
    };

    let strict = options.strict || ws.strict_option();
    let policy = Policy::resolve(
        &ws.toolchain.linter,
        parse_list(&options.rules),
        ws.strict_option(),
        options.strict,
    );

    let mut diags = Vec::new();
    diags.extend(rules::workspace::check(&ws, &options.dir));
    diags.extend(rules::version_conflicts::check(&ws, strict));
    diags.extend(rules::import_cycles::check(&ws));

    for root in ws.lint_roots() {
        lint_root(&ws, &options.dir, &root, &mut diags);
    }

    tracing::debug!("collected {} raw findings", diags.len());
    render(options, policy.apply(diags), out)
}

fn lint_root(ws: &Workspace, dir: &Path, root: &str, diags: &mut Vec<Diagnostic>) {
    let mut sources: Vec<(String, String)> = Vec::new();
    for path in source_files(&dir.join(root)) {
        let Ok(text) = std::fs::read_to_string(&path) else {
            // unreadable units are skipped, not reported
            continue;
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = format!("{root}/{name}");

        diags.extend(rules::source::scan(&file, &text));
        match parse_source(&text) {
            Ok(ast) => {
                diags.extend(rules::pipeline::check(&file, &ast, &ws.toolchain.linter));
            }
            Err(failure) => {
                let d = rules::source::parse_failure(&file, &failure);
                let pragmas = PragmaTable::from_source(&text);
                if !pragmas.is_disabled(&d.code, d.pos.map(|p| p.line)) {
                    diags.push(d);
                }
            }
        }
        sources.push((file, text));
    }

    if let Some(pkg) = ws.find_package_by_root(root) {
        diags.extend(rules::source::unused_imports(&pkg.key, &pkg.import, &sources));
    }
}

fn source_files(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "rill"))
        .collect();
    files.sort();
    files
}

fn load_failure_diag(err: &RillError) -> Diagnostic {
    let code = match err {
        RillError::WorkspaceNotFound { .. } => codes::E_WS_MISSING,
        RillError::WorkspaceParse { .. } => codes::E_WS_PARSE,
        _ => codes::E_WS_SCHEMA,
    };
    Diagnostic::new(code, Level::Error, err.to_string(), MANIFEST_NAME)
}

fn render(
    options: &LintOptions,
    mut diags: Vec<Diagnostic>,
    out: &mut dyn Write,
) -> Result<LintOutcome> {
    let mut errors = diags.iter().filter(|d| d.level == Level::Error).count();
    let warnings = diags.iter().filter(|d| d.level == Level::Warn).count();

    if options.max_warn >= 0 && warnings as i64 > options.max_warn {
        diags.push(
            Diagnostic::new(
                codes::E_MAX_WARN_EXCEEDED,
                Level::Error,
                format!(
                    "{warnings} warning(s) exceed the configured maximum of {}",
                    options.max_warn
                ),
                MANIFEST_NAME,
            )
            .with_data("warnings", warnings)
            .with_data("max", options.max_warn),
        );
        errors += 1;
    }

    if options.compat_codes {
        for d in &mut diags {
            let compat = compat_code(&d.code);
            *d = d.clone().with_data("compat_code", compat);
        }
    }

    let rendered = if options.json {
        render_ndjson(&diags, errors, warnings, options.compat_codes)
    } else {
        render_human(&diags, errors, warnings)
    };
    out.write_all(rendered.as_bytes())?;

    if options.verbose {
        mirror_debug(options, &diags, errors, warnings)?;
    }

    let failed = errors > 0 || (options.failfast && warnings > 0);
    Ok(LintOutcome {
        diagnostics: diags,
        errors,
        warnings,
        failed,
    })
}

fn render_ndjson(
    diags: &[Diagnostic],
    errors: usize,
    warnings: usize,
    compat: bool,
) -> String {
    let now = Utc::now();
    let mut buf = String::new();
    for d in diags {
        buf.push_str(&d.to_ndjson(now));
        buf.push('\n');
    }
    let mut summary = Diagnostic::new(codes::SUMMARY, Level::Info, "lint completed", "")
        .with_data("errors", errors)
        .with_data("warnings", warnings);
    if compat {
        summary = summary.with_data("compat_code", compat_code(codes::SUMMARY));
    }
    buf.push_str(&summary.to_ndjson(now));
    buf.push('\n');
    buf
}

fn render_human(diags: &[Diagnostic], errors: usize, warnings: usize) -> String {
    if diags.is_empty() {
        return "lint: OK\n".into();
    }
    let mut buf = String::new();
    for d in diags {
        buf.push_str(&d.to_human());
        buf.push('\n');
    }
    buf.push_str(&format!("lint: {errors} error(s), {warnings} warning(s)\n"));
    buf
}

fn mirror_debug(
    options: &LintOptions,
    diags: &[Diagnostic],
    errors: usize,
    warnings: usize,
) -> Result<()> {
    let debug_dir = options.dir.join("build").join("debug");
    std::fs::create_dir_all(&debug_dir)?;
    let path = debug_dir.join("lint.ndjson");
    std::fs::write(&path, render_ndjson(diags, errors, warnings, options.compat_codes))?;
    tracing::debug!("mirrored lint records to {}", path.display());
    Ok(())
}
