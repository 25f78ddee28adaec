//! Textual source scans.
//!
//! These rules never need a syntax tree: they run line-by-line over the
//! raw unit text, so they still produce findings when the tolerant
//! reader gives up on a file.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::diag::{Diagnostic, Level};
use crate::frontend::{locate, ParseFailure};
use crate::lint::pragma::PragmaTable;
use crate::workspace::{is_local_import, split_import_constraint, MANIFEST_NAME};

use super::codes;

fn pointer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // address-of / pointer-type tokens at an expression boundary
    RE.get_or_init(|| Regex::new(r"(?:^|[\s(,=])([&*][A-Za-z_]\w*)").expect("pointer regex"))
}

fn own_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bown\s*\(").expect("own regex"))
}

fn release_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\brelease\s*\(").expect("release regex"))
}

/// Run the per-file text scans, pragma-filtered.
pub fn scan(file: &str, text: &str) -> Vec<Diagnostic> {
    let pragmas = PragmaTable::from_source(text);
    let skip = skipped_lines(text);
    let mut out = Vec::new();

    for caps in pointer_re().captures_iter(text) {
        let m = caps.get(1).expect("capture group");
        let pos = locate(text, m.start());
        if skip.contains(&pos.line) {
            continue;
        }
        out.push(
            Diagnostic::new(
                codes::W_RAW_POINTER,
                Level::Warn,
                format!("pointer-style token {:?}; rill memory is managed", m.as_str()),
                file,
            )
            .with_pos(pos)
            .with_data("token", m.as_str()),
        );
    }

    let first_own = own_re()
        .find_iter(text)
        .map(|m| locate(text, m.start()))
        .find(|p| !skip.contains(&p.line));
    let first_release = release_re()
        .find_iter(text)
        .map(|m| locate(text, m.start()))
        .find(|p| !skip.contains(&p.line));
    if let Some(release) = first_release {
        // an own anywhere on the release line or earlier covers it
        let owned = first_own.is_some_and(|own| own.line <= release.line);
        if !owned {
            out.push(
                Diagnostic::new(
                    codes::W_RAII_RELEASE_WITHOUT_OWN,
                    Level::Warn,
                    "release without a preceding own in this file",
                    file,
                )
                .with_pos(release),
            );
        }
    }

    out.sort_by_key(|d| d.pos.map(|p| p.offset).unwrap_or(usize::MAX));
    out.retain(|d| !pragmas.is_disabled(&d.code, d.pos.map(|p| p.line)));
    out
}

// Comment and pragma lines are exempt from the text scans.
fn skipped_lines(text: &str) -> HashSet<usize> {
    text.lines()
        .enumerate()
        .filter(|(_, raw)| {
            let trimmed = raw.trim_start();
            trimmed.starts_with("//") || trimmed.starts_with("#pragma")
        })
        .map(|(idx, _)| idx + 1)
        .collect()
}

/// The diagnostic for one unit the tolerant reader gave up on.
pub fn parse_failure(file: &str, failure: &ParseFailure) -> Diagnostic {
    Diagnostic::new(
        codes::W_PARSE_FAILED,
        Level::Warn,
        format!("unable to read unit: {}", failure.message),
        file,
    )
    .with_pos(failure.pos)
}

/// Flag non-local manifest imports whose final path segment never
/// appears in any source of the declaring package.
pub fn unused_imports(
    pkg_key: &str,
    imports: &[String],
    sources: &[(String, String)],
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for entry in imports {
        let (path, _) = split_import_constraint(entry);
        if is_local_import(path) {
            continue;
        }
        let segment = path.rsplit('/').next().unwrap_or(path);
        if segment.is_empty() {
            continue;
        }
        let used = sources.iter().any(|(_, text)| text.contains(segment));
        if !used {
            out.push(
                Diagnostic::new(
                    codes::W_IMPORT_UNUSED,
                    Level::Warn,
                    format!("import {path:?} is never referenced by package {pkg_key:?}"),
                    MANIFEST_NAME,
                )
                .with_data("package", pkg_key)
                .with_data("import", path),
            );
        }
    }
    out
}
