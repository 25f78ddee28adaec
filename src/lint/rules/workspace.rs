//! Manifest-level rules: package naming, version declarations, and the
//! per-entry import checks.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::diag::{Diagnostic, Level};
use crate::workspace::constraints::{Constraint, Version};
use crate::workspace::{is_local_import, split_import_constraint, Workspace, MANIFEST_NAME};

use super::codes;

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // lowercase, camelCase, or PascalCase; no underscores or digits first
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("name regex"))
}

fn import_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9._/\-]+$").expect("import path regex"))
}

/// Run every manifest rule. `dir` is the workspace root, used to check
/// local import paths on disk.
pub fn check(ws: &Workspace, dir: &Path) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for pkg in &ws.packages {
        if !pkg.name.is_empty() && !name_re().is_match(&pkg.name) {
            out.push(
                Diagnostic::new(
                    codes::W_PKG_NAME_STYLE,
                    Level::Warn,
                    format!(
                        "package name {:?} should be lowercase, camelCase, or PascalCase",
                        pkg.name
                    ),
                    MANIFEST_NAME,
                )
                .with_data("package", pkg.key.as_str()),
            );
        }
        if Version::parse(&pkg.version).is_none() {
            out.push(
                Diagnostic::new(
                    codes::E_WS_PKG_VERSION,
                    Level::Error,
                    format!(
                        "package {:?} declares invalid version {:?}",
                        pkg.key, pkg.version
                    ),
                    MANIFEST_NAME,
                )
                .with_data("package", pkg.key.as_str()),
            );
        }
        check_imports(ws, pkg.key.as_str(), &pkg.import, dir, &mut out);
    }
    out
}

fn check_imports(
    ws: &Workspace,
    pkg_key: &str,
    imports: &[String],
    dir: &Path,
    out: &mut Vec<Diagnostic>,
) {
    let mut seen = std::collections::HashSet::new();
    let mut normalized = Vec::with_capacity(imports.len());

    for entry in imports {
        let (path, constraint) = split_import_constraint(entry);

        if path.starts_with("../") {
            out.push(import_diag(
                codes::W_IMPORT_RELATIVE,
                format!("import {path:?} escapes the workspace"),
                pkg_key,
                path,
            ));
        } else if !import_path_re().is_match(path) {
            out.push(import_diag(
                codes::W_IMPORT_SYNTAX,
                format!("import path {path:?} contains invalid characters"),
                pkg_key,
                path,
            ));
        }

        if !seen.insert(path.to_string()) {
            out.push(import_diag(
                codes::W_IMPORT_DUPLICATE,
                format!("duplicate import {path:?}"),
                pkg_key,
                path,
            ));
        }

        if let Some(expr) = constraint {
            if Constraint::parse(expr).is_err() {
                out.push(import_diag(
                    codes::W_IMPORT_CONSTRAINT_INVALID,
                    format!("invalid version constraint {expr:?} on import {path:?}"),
                    pkg_key,
                    path,
                ));
            }
        }

        if is_local_import(path) {
            if !dir.join(path).exists() {
                out.push(import_diag(
                    codes::W_IMPORT_LOCAL_MISSING,
                    format!("local import {path:?} does not exist"),
                    pkg_key,
                    path,
                ));
            } else if ws.find_package_by_root(path).is_none() {
                out.push(import_diag(
                    codes::W_IMPORT_LOCAL_UNDECLARED,
                    format!("local import {path:?} is not a declared package root"),
                    pkg_key,
                    path,
                ));
            }
        }

        normalized.push(normalize_import(path));
    }

    let mut sorted = normalized.clone();
    sorted.sort();
    if normalized != sorted {
        out.push(
            Diagnostic::new(
                codes::W_IMPORT_ORDER,
                Level::Warn,
                format!("imports of package {pkg_key:?} are not sorted"),
                MANIFEST_NAME,
            )
            .with_data("package", pkg_key),
        );
    }
}

fn import_diag(code: &str, message: String, pkg_key: &str, path: &str) -> Diagnostic {
    Diagnostic::new(code, Level::Warn, message, MANIFEST_NAME)
        .with_data("package", pkg_key)
        .with_data("import", path)
}

// Order comparisons ignore the ./ prefix, trailing slashes, and case.
fn normalize_import(path: &str) -> String {
    path.strip_prefix("./")
        .unwrap_or(path)
        .trim_end_matches('/')
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Package;

    fn ws(packages: Vec<Package>) -> Workspace {
        Workspace {
            version: "1.0.0".into(),
            packages,
            ..Default::default()
        }
    }

    fn pkg(key: &str, name: &str, version: &str, import: &[&str]) -> Package {
        Package {
            key: key.into(),
            name: name.into(),
            version: version.into(),
            root: format!("./{key}"),
            import: import.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn codes_of(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn clean_package_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let w = ws(vec![pkg("main", "App", "0.1.0", &["registry/json >= 1.2.3"])]);
        assert!(check(&w, dir.path()).is_empty());
    }

    #[test]
    fn underscored_name_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let w = ws(vec![pkg("main", "my_app", "0.1.0", &[])]);
        assert_eq!(codes_of(&check(&w, dir.path())), vec!["W_PKG_NAME_STYLE"]);
    }

    #[test]
    fn invalid_version_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let w = ws(vec![pkg("main", "App", "one", &[])]);
        let diags = check(&w, dir.path());
        assert_eq!(codes_of(&diags), vec!["E_WS_PKG_VERSION"]);
        assert_eq!(diags[0].level, Level::Error);
    }

    #[test]
    fn duplicate_and_unsorted_imports() {
        let dir = tempfile::tempdir().unwrap();
        let w = ws(vec![pkg(
            "main",
            "App",
            "0.1.0",
            &["registry/zeta", "registry/alpha", "registry/zeta"],
        )]);
        let diags = check(&w, dir.path());
        assert!(codes_of(&diags).contains(&"W_IMPORT_DUPLICATE"));
        assert!(codes_of(&diags).contains(&"W_IMPORT_ORDER"));
    }

    #[test]
    fn order_normalizes_prefix_and_case() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("alpha")).unwrap();
        let mut w = ws(vec![pkg("main", "App", "0.1.0", &["./alpha", "Beta"])]);
        w.packages.push(pkg("alpha", "Alpha", "0.1.0", &[]));
        w.packages[1].root = "./alpha".into();
        assert!(check(&w, dir.path()).is_empty());
    }

    #[test]
    fn parent_escaping_import_is_relative_not_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let w = ws(vec![pkg("main", "App", "0.1.0", &["../outside"])]);
        assert_eq!(codes_of(&check(&w, dir.path())), vec!["W_IMPORT_RELATIVE"]);
    }

    #[test]
    fn bad_charset_is_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let w = ws(vec![pkg("main", "App", "0.1.0", &["registry/js on!"])]);
        // the entry splits at whitespace: path "registry/js", constraint "on!"
        let diags = check(&w, dir.path());
        assert!(codes_of(&diags).contains(&"W_IMPORT_CONSTRAINT_INVALID"));

        let w = ws(vec![pkg("main", "App", "0.1.0", &["registry/j$on"])]);
        assert_eq!(codes_of(&check(&w, dir.path())), vec!["W_IMPORT_SYNTAX"]);
    }

    #[test]
    fn local_import_missing_vs_undeclared() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();
        let w = ws(vec![pkg("main", "App", "0.1.0", &["./ghost", "./lib"])]);
        let diags = check(&w, dir.path());
        assert!(codes_of(&diags).contains(&"W_IMPORT_LOCAL_MISSING"));
        assert!(codes_of(&diags).contains(&"W_IMPORT_LOCAL_UNDECLARED"));
    }

    #[test]
    fn declared_local_import_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();
        let mut w = ws(vec![pkg("main", "App", "0.1.0", &["./lib"])]);
        let mut lib = pkg("lib", "Lib", "0.2.0", &[]);
        lib.root = "./lib".into();
        w.packages.push(lib);
        assert!(check(&w, dir.path()).is_empty());
    }
}
