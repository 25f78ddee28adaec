//! Cross-package version constraint analysis.
//!
//! Import entries for the same path are collected across every declared
//! package and checked as one group, so two packages pinning different
//! exact versions of `registry/json` conflict even though each manifest
//! entry is individually valid. Per path, at most one finding of each
//! code is reported.

use std::collections::BTreeMap;

use crate::diag::{Diagnostic, Level};
use crate::workspace::constraints::{Constraint, Op};
use crate::workspace::{is_local_import, split_import_constraint, Workspace, MANIFEST_NAME};

use super::codes;

/// Run the conflict analysis over every declared package.
pub fn check(ws: &Workspace, strict: bool) -> Vec<Diagnostic> {
    // path -> (declaring package key, parsed constraint)
    let mut by_path: BTreeMap<&str, Vec<(&str, Constraint)>> = BTreeMap::new();
    for pkg in &ws.packages {
        for entry in &pkg.import {
            let (path, expr) = split_import_constraint(entry);
            let Some(expr) = expr else { continue };
            // unparsable constraints are the workspace rule's finding
            if let Ok(c) = Constraint::parse(expr) {
                by_path.entry(path).or_default().push((pkg.key.as_str(), c));
            }
        }
    }

    let mut out = Vec::new();
    for (path, constraints) in &by_path {
        check_path(ws, path, constraints, strict, &mut out);
    }
    out
}

fn check_path(
    ws: &Workspace,
    path: &str,
    constraints: &[(&str, Constraint)],
    strict: bool,
    out: &mut Vec<Diagnostic>,
) {
    // Local imports are measured against the declared package version
    // only; they never join the cross-package exact/range analysis.
    if is_local_import(path) {
        check_local(ws, path, constraints, out);
        return;
    }

    let exacts: Vec<&Constraint> = constraints
        .iter()
        .filter(|(_, c)| c.op == Op::Exact)
        .map(|(_, c)| c)
        .collect();
    let ranges: Vec<&Constraint> = constraints
        .iter()
        .filter(|(_, c)| matches!(c.op, Op::Caret | Op::Tilde | Op::Gt | Op::Gte))
        .map(|(_, c)| c)
        .collect();

    if strict {
        if let Some(pre) = exacts.iter().find(|c| c.is_prerelease()) {
            out.push(
                path_diag(
                    codes::E_IMPORT_PRERELEASE_FORBIDDEN,
                    format!("strict mode forbids pre-release pin for {path:?}"),
                    path,
                )
                .with_data("version", version_str(pre)),
            );
        }
    }

    let mut distinct: Vec<String> = exacts.iter().map(|c| version_str(c)).collect();
    distinct.sort();
    distinct.dedup();
    if distinct.len() >= 2 {
        out.push(
            path_diag(
                codes::E_IMPORT_CONSTRAINT_MULTI,
                format!("multiple exact versions required for {path:?}"),
                path,
            )
            .with_data("versions", distinct),
        );
        return;
    }

    if let Some(exact) = exacts.first() {
        let pin = exact.version.as_ref().expect("exact carries a version");
        if let Some(range) = ranges.iter().find(|r| !r.satisfies(pin)) {
            out.push(
                path_diag(
                    codes::E_IMPORT_CONSTRAINT,
                    format!(
                        "pinned version {pin} of {path:?} violates a declared range"
                    ),
                    path,
                )
                .with_data("version", pin.to_string())
                .with_data("range", range_str(range)),
            );
        }
    } else if !ranges.is_empty() {
        let mut intersection = ranges[0].bound();
        for range in &ranges[1..] {
            let Some(acc) = intersection else { break };
            intersection = match range.bound() {
                Some(b) => acc.intersect(&b),
                None => Some(acc),
            };
        }
        match intersection {
            None => out.push(path_diag(
                codes::E_IMPORT_CONSTRAINT,
                format!("version ranges for {path:?} do not intersect"),
                path,
            )),
            Some(_) => out.push(
                path_diag(
                    codes::W_IMPORT_SINGLE_VERSION,
                    format!("{path:?} is only range-constrained; pin an exact version"),
                    path,
                )
                .with_data("count", ranges.len()),
            ),
        }
    }
}

// A constrained local import must agree with the declared version.
fn check_local(
    ws: &Workspace,
    path: &str,
    constraints: &[(&str, Constraint)],
    out: &mut Vec<Diagnostic>,
) {
    let Some(local) = ws.find_package_by_root(path) else {
        return;
    };
    let Some(declared) = crate::workspace::constraints::Version::parse(&local.version) else {
        return;
    };
    if let Some(unmet) = constraints.iter().find(|(_, c)| !c.satisfies(&declared)) {
        out.push(
            path_diag(
                codes::E_IMPORT_CONSTRAINT,
                format!(
                    "local package {path:?} declares {declared}, which fails an import constraint"
                ),
                path,
            )
            .with_data("declared", declared.to_string())
            .with_data("constraint", range_str(&unmet.1)),
        );
    }
}

fn path_diag(code: &str, message: String, path: &str) -> Diagnostic {
    Diagnostic::new(code, level_of(code), message, MANIFEST_NAME).with_data("import", path)
}

fn level_of(code: &str) -> Level {
    if code.starts_with("E_") {
        Level::Error
    } else {
        Level::Warn
    }
}

fn version_str(c: &Constraint) -> String {
    c.version
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn range_str(c: &Constraint) -> String {
    let v = version_str(c);
    match c.op {
        Op::Exact => v,
        Op::Caret => format!("^{v}"),
        Op::Tilde => format!("~{v}"),
        Op::Gt => format!("> {v}"),
        Op::Gte => format!(">= {v}"),
        Op::Latest => "==latest".into(),
    }
}
