//! Workspace manifest loading and queries.
//!
//! The `rill.workspace` file (YAML) declares the toolchain configuration
//! and the package set: every package has a key (`main` is required), a
//! display name, a semantic version, a workspace-relative root, and a
//! list of import entries. An import entry is a path optionally followed
//! by a version constraint, e.g. `"registry/json >= 1.2.3"`.
//!
//! Loading distinguishes three hard failures: missing file, unparsable
//! YAML, and schema violations (no version, no main package). Everything
//! else is the lint rules' business.

pub mod constraints;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RillError};

/// Manifest file name, fixed at the workspace root.
pub const MANIFEST_NAME: &str = "rill.workspace";

/// Root manifest structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    /// Workspace schema version.
    pub version: String,
    /// Toolchain configuration.
    pub toolchain: Toolchain,
    /// Declared packages.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
}

/// Toolchain-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    /// Linter configuration.
    pub linter: LinterConfig,
}

/// Linter configuration consumed from the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinterConfig {
    /// Option tokens; the presence of `strict` enables strict promotion.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Per-rule-code severity overrides: `off`, `info`, `warn`, `error`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, String>,
    /// Path-prefix suppression entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suppress: Vec<SuppressEntry>,
    /// Decorator names the decorator rule family must flag.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_decorators: Vec<String>,
}

/// One path-prefix suppression entry: the listed codes are dropped for
/// files under the prefix. Overlapping prefixes act independently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressEntry {
    /// Workspace-relative path prefix, e.g. `./vendor`.
    pub path: String,
    /// Rule codes suppressed under the prefix.
    pub codes: Vec<String>,
}

/// One declared package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    /// Lookup key; `main` designates the entry package.
    pub key: String,
    /// Display name, subject to the naming style rule.
    pub name: String,
    /// Declared semantic version.
    pub version: String,
    /// Workspace-relative source root, e.g. `./src`.
    pub root: String,
    /// Import entries (path with optional constraint expression).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub import: Vec<String>,
}

impl Workspace {
    /// Load and schema-validate a manifest from `dir/rill.workspace`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_NAME);
        if !path.exists() {
            return Err(RillError::WorkspaceNotFound { path });
        }
        let text = std::fs::read_to_string(&path).map_err(|e| RillError::WorkspaceParse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let ws: Workspace =
            serde_yaml::from_str(&text).map_err(|e| RillError::WorkspaceParse {
                path: path.clone(),
                message: e.to_string(),
            })?;
        ws.validate()?;
        Ok(ws)
    }

    /// Schema validation: a version and a `main` package are required.
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(RillError::WorkspaceSchema {
                message: "missing workspace version".into(),
            });
        }
        if self.find_package("main").is_none() {
            return Err(RillError::WorkspaceSchema {
                message: "missing main package".into(),
            });
        }
        Ok(())
    }

    /// Whether the manifest requests strict promotion.
    pub fn strict_option(&self) -> bool {
        self.toolchain.linter.options.iter().any(|o| o == "strict")
    }

    /// Find a package by key.
    pub fn find_package(&self, key: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.key == key)
    }

    /// Find a package by declared root path.
    pub fn find_package_by_root(&self, root: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.root == root)
    }

    /// Roots to lint, children before parents: the main package's local
    /// imports in child-first DFS order, then the main root itself, with
    /// duplicates removed.
    pub fn lint_roots(&self) -> Vec<String> {
        let mut order = Vec::new();
        if let Some(main) = self.find_package("main") {
            order = self.local_import_roots(main);
            if !main.root.is_empty() && !order.iter().any(|r| r == &main.root) {
                order.push(main.root.clone());
            }
        }
        order
    }

    /// Local (`./`) import roots reachable from `pkg`, children first,
    /// deduplicated.
    pub fn local_import_roots(&self, pkg: &Package) -> Vec<String> {
        let mut visited = std::collections::HashSet::new();
        let mut order = Vec::new();
        self.collect_local_roots(pkg, &mut visited, &mut order);
        order
    }

    fn collect_local_roots(
        &self,
        pkg: &Package,
        visited: &mut std::collections::HashSet<String>,
        order: &mut Vec<String>,
    ) {
        for entry in &pkg.import {
            let (path, _) = split_import_constraint(entry);
            if !is_local_import(path) || !visited.insert(path.to_string()) {
                continue;
            }
            if let Some(child) = self.find_package_by_root(path) {
                self.collect_local_roots(child, visited, order);
            }
            order.push(path.to_string());
        }
    }
}

/// Split an import entry like `"registry/json >= 1.2.3"` into the path
/// and the optional constraint expression.
pub fn split_import_constraint(entry: &str) -> (&str, Option<&str>) {
    let entry = entry.trim();
    match entry.split_once(char::is_whitespace) {
        Some((path, rest)) => {
            let rest = rest.trim();
            if rest.is_empty() {
                (path, None)
            } else {
                (path, Some(rest))
            }
        }
        None => (entry, None),
    }
}

/// A local import stays inside the workspace: `./` prefixed, never `../`.
pub fn is_local_import(path: &str) -> bool {
    path.starts_with("./") && !path.starts_with("../")
}
